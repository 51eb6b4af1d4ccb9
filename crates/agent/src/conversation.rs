use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lumopack_core::config::LlmConfig;
use lumopack_core::domain::requirements::RequirementsRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extraction::{ExtractionOutcome, RequirementsExtractor};
use crate::llm::LlmClient;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// One model reply split into what the user sees and what was extracted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTurn {
    pub reply: String,
    pub extracted: RequirementsRecord,
    pub outcome: ExtractionOutcome,
}

#[async_trait]
pub trait ConversationModel: Send + Sync {
    async fn converse(
        &self,
        history: &[ChatMessage],
        message: &str,
        current: &RequirementsRecord,
    ) -> Result<ModelTurn>;
}

const SYSTEM_PROMPT: &str = "You are a packaging design consultant guiding a customer through \
a corrugated box order in twelve steps: product type, box type, inner packaging, dimensions, \
quantity, structure checkpoint, mood and tone, logo, special features, design checkpoint, \
quotation and order confirmation. Ask one question at a time and never state prices. After \
every reply append the requirements learned so far as a JSON object wrapped in \
<REQUIREMENTS></REQUIREMENTS> tags, including current_step and the confirmation flags.";

pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// `ConversationModel` backed by a plain text-completion client.
pub struct LlmConversation<C> {
    client: C,
    extractor: RequirementsExtractor,
    history_window: usize,
    max_retries: u32,
    timeout: Option<Duration>,
}

impl<C> LlmConversation<C>
where
    C: LlmClient,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            extractor: RequirementsExtractor::new(),
            history_window: DEFAULT_HISTORY_WINDOW,
            max_retries: 0,
            timeout: None,
        }
    }

    /// Retries and per-attempt timeout from the `[llm]` config section.
    pub fn from_config(client: C, config: &LlmConfig) -> Self {
        Self::new(client)
            .with_max_retries(config.max_retries)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Bounds each completion attempt; an attempt that runs out counts as a
    /// failure and is retried like any other.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build_prompt(
        &self,
        history: &[ChatMessage],
        message: &str,
        current: &RequirementsRecord,
    ) -> Result<String> {
        let requirements =
            serde_json::to_string(current).context("serialize current requirements")?;
        let skip = history.len().saturating_sub(self.history_window);

        let mut prompt = String::new();
        prompt.push_str(SYSTEM_PROMPT);
        prompt.push_str("\n\nCurrent requirements: ");
        prompt.push_str(&requirements);
        prompt.push_str("\n\n");
        for entry in &history[skip..] {
            prompt.push_str(entry.role.as_str());
            prompt.push_str(": ");
            prompt.push_str(&entry.content);
            prompt.push('\n');
        }
        prompt.push_str("user: ");
        prompt.push_str(message);
        prompt.push_str("\nassistant:");
        Ok(prompt)
    }

    async fn complete_once(&self, prompt: &str) -> Result<String> {
        let Some(limit) = self.timeout else {
            return self.client.complete(prompt).await;
        };
        match tokio::time::timeout(limit, self.client.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("model call timed out after {limit:?}")),
        }
    }

    async fn complete_with_retries(&self, prompt: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.complete_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(error) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        event_name = "agent.llm.retry",
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "model call failed; retrying"
                    );
                }
                Err(error) => {
                    return Err(error.context(format!("model call failed after {} attempt(s)", attempt + 1)))
                }
            }
        }
    }
}

#[async_trait]
impl<C> ConversationModel for LlmConversation<C>
where
    C: LlmClient,
{
    async fn converse(
        &self,
        history: &[ChatMessage],
        message: &str,
        current: &RequirementsRecord,
    ) -> Result<ModelTurn> {
        let prompt = self.build_prompt(history, message, current)?;
        let raw = self.complete_with_retries(&prompt).await?;
        let extraction = self.extractor.extract(&raw);

        if let ExtractionOutcome::Malformed(reason) = &extraction.outcome {
            warn!(
                event_name = "agent.extraction.malformed",
                reason = %reason,
                "model reply carried an unreadable requirements block"
            );
        } else {
            debug!(
                event_name = "agent.extraction.completed",
                outcome = ?extraction.outcome,
                "requirements block processed"
            );
        }

        Ok(ModelTurn {
            reply: extraction.visible_reply,
            extracted: extraction.record,
            outcome: extraction.outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use lumopack_core::config::AppConfig;
    use lumopack_core::domain::product::ProductType;
    use lumopack_core::domain::requirements::RequirementsRecord;

    use super::{ChatMessage, ConversationModel, LlmConversation};
    use crate::extraction::ExtractionOutcome;
    use crate::llm::LlmClient;

    struct ScriptedClient {
        reply: String,
        failures_before_success: u32,
        delay: Option<Duration>,
        calls: AtomicU32,
        last_prompt: Mutex<String>,
    }

    impl ScriptedClient {
        fn new(reply: &str, failures_before_success: u32) -> Self {
            Self {
                reply: reply.to_string(),
                failures_before_success,
                delay: None,
                calls: AtomicU32::new(0),
                last_prompt: Mutex::new(String::new()),
            }
        }

        fn stalling(delay: Duration) -> Self {
            Self { delay: Some(delay), ..Self::new("too late", 0) }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<String> {
            *self.last_prompt.lock().expect("prompt lock") = prompt.to_string();
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if call < self.failures_before_success {
                return Err(anyhow!("upstream timeout"));
            }
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn converse_splits_reply_and_requirements() {
        let client = ScriptedClient::new(
            "Lovely. Which box style?<REQUIREMENTS>{\"product_type\": \"food_grade\", \"current_step\": 2}</REQUIREMENTS>",
            0,
        );
        let conversation = LlmConversation::new(client);

        let turn = conversation
            .converse(&[], "I sell cookies", &RequirementsRecord::default())
            .await
            .expect("turn");

        assert_eq!(turn.reply, "Lovely. Which box style?");
        assert_eq!(turn.outcome, ExtractionOutcome::Extracted);
        assert_eq!(turn.extracted.product_type, Some(ProductType::FoodGrade));
    }

    #[tokio::test]
    async fn prompt_carries_requirements_and_recent_history_only() {
        let conversation = LlmConversation::new(ScriptedClient::new("ok", 0)).with_history_window(2);
        let history = vec![
            ChatMessage::user("first message"),
            ChatMessage::assistant("second message"),
            ChatMessage::user("third message"),
        ];
        let current = RequirementsRecord { quantity: Some(800), ..RequirementsRecord::default() };

        let prompt = conversation.build_prompt(&history, "fourth message", &current).expect("prompt");

        assert!(prompt.contains("\"quantity\":800"));
        assert!(!prompt.contains("first message"));
        assert!(prompt.contains("assistant: second message"));
        assert!(prompt.ends_with("user: fourth message\nassistant:"));
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let conversation =
            LlmConversation::new(ScriptedClient::new("fine", 2)).with_max_retries(2);

        let turn = conversation
            .converse(&[], "hello", &RequirementsRecord::default())
            .await
            .expect("third attempt succeeds");

        assert_eq!(turn.reply, "fine");
        assert_eq!(turn.outcome, ExtractionOutcome::Absent);
        assert_eq!(conversation.client.calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_the_error() {
        let conversation =
            LlmConversation::new(ScriptedClient::new("never", 5)).with_max_retries(1);

        let error = conversation
            .converse(&[], "hello", &RequirementsRecord::default())
            .await
            .expect_err("should fail");

        assert!(error.to_string().contains("2 attempt(s)"));
        let prompt = conversation.client.last_prompt.lock().expect("prompt lock").clone();
        assert!(prompt.contains("user: hello"));
    }

    #[tokio::test]
    async fn stalled_attempts_time_out_and_count_as_failures() {
        let conversation = LlmConversation::new(ScriptedClient::stalling(Duration::from_secs(5)))
            .with_timeout(Duration::from_millis(20))
            .with_max_retries(1);

        let error = conversation
            .converse(&[], "hello", &RequirementsRecord::default())
            .await
            .expect_err("should time out");

        let chain = format!("{error:#}");
        assert!(chain.contains("timed out"), "{chain}");
        assert!(chain.contains("2 attempt(s)"), "{chain}");
        assert_eq!(conversation.client.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn llm_section_drives_retries_and_timeout() {
        let mut config = AppConfig::default();
        config.llm.max_retries = 4;
        config.llm.timeout_secs = 7;

        let conversation = LlmConversation::from_config(ScriptedClient::new("ok", 0), &config.llm);

        assert_eq!(conversation.max_retries, 4);
        assert_eq!(conversation.timeout, Some(Duration::from_secs(7)));
    }
}
