pub mod engine;
pub mod states;

pub use engine::{ConversationGate, GateSettings};
pub use states::{ConversationStep, GateAction, GateDecision};
