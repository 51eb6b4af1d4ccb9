//! Conversation runtime for the box-design assistant.
//!
//! Each turn flows through a fixed pipeline:
//! 1. **Model** (`conversation`) - the `ConversationModel` seam; the default
//!    `LlmConversation` wraps any `LlmClient` text completion.
//! 2. **Extraction** (`extraction`) - the tagged requirements block is parsed
//!    and removed from the visible reply.
//! 3. **Guardrails** (`guardrails`) - workflow claims the conversation has not
//!    earned are dropped from the update.
//! 4. **Runtime** (`runtime`) - merge into the caller's record, run the
//!    conversation gate, attach a quotation when the design is confirmed.
//!
//! The model never prices anything. Quotations come from the deterministic
//! engine in `lumopack-core`.

pub mod conversation;
pub mod extraction;
pub mod guardrails;
pub mod llm;
pub mod runtime;

pub use conversation::{ChatMessage, ConversationModel, LlmConversation, ModelTurn, Role};
pub use extraction::{Extraction, ExtractionOutcome, RequirementsExtractor};
pub use llm::LlmClient;
pub use runtime::{AgentRuntime, ChatRequest, ChatResponse};
