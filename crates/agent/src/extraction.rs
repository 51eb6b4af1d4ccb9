//! Pulls the structured requirements block out of model text.
//!
//! The model appends a JSON object wrapped in `<REQUIREMENTS>` tags to each
//! reply, sometimes inside a ```json fence. The block feeds the requirements
//! record and never reaches the user.

use lumopack_core::domain::requirements::RequirementsRecord;
use serde::Serialize;

pub const OPEN_TAG: &str = "<REQUIREMENTS>";
pub const CLOSE_TAG: &str = "</REQUIREMENTS>";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Extracted,
    Absent,
    Malformed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    pub visible_reply: String,
    pub record: RequirementsRecord,
    pub outcome: ExtractionOutcome,
}

#[derive(Clone, Debug, Default)]
pub struct RequirementsExtractor;

impl RequirementsExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Only the first block carries data; every block is stripped from the
    /// visible reply. Absent or malformed blocks yield an empty record.
    pub fn extract(&self, text: &str) -> Extraction {
        let (visible_reply, payloads) = split_blocks(text);

        let Some(payload) = payloads.into_iter().next() else {
            return Extraction {
                visible_reply,
                record: RequirementsRecord::default(),
                outcome: ExtractionOutcome::Absent,
            };
        };

        let (record, outcome) = match payload {
            Block::Closed(body) => match serde_json::from_str::<RequirementsRecord>(strip_fence(&body)) {
                Ok(record) => (record, ExtractionOutcome::Extracted),
                Err(error) => (
                    RequirementsRecord::default(),
                    ExtractionOutcome::Malformed(format!("invalid requirements json: {error}")),
                ),
            },
            Block::Unterminated => (
                RequirementsRecord::default(),
                ExtractionOutcome::Malformed(format!("missing closing {CLOSE_TAG} tag")),
            ),
        };

        Extraction { visible_reply, record, outcome }
    }

    /// Visible part of a reply with every requirements block removed.
    pub fn strip(&self, text: &str) -> String {
        split_blocks(text).0
    }
}

enum Block {
    Closed(String),
    Unterminated,
}

fn split_blocks(text: &str) -> (String, Vec<Block>) {
    let mut visible = String::with_capacity(text.len());
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(OPEN_TAG) {
        visible.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN_TAG.len()..];
        match after_open.find(CLOSE_TAG) {
            Some(end) => {
                blocks.push(Block::Closed(after_open[..end].to_string()));
                rest = &after_open[end + CLOSE_TAG.len()..];
            }
            None => {
                // the remainder belongs to the broken block
                blocks.push(Block::Unterminated);
                rest = "";
            }
        }
    }
    visible.push_str(rest);

    (visible.trim().to_string(), blocks)
}

fn strip_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // drop the language tag on the opening fence line
    let inner = match inner.find('\n') {
        Some(newline) if !inner[..newline].trim_start().starts_with('{') => &inner[newline + 1..],
        _ => inner,
    };
    inner.trim()
}
