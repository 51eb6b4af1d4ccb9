use lumopack_core::config::AppConfig;
use lumopack_core::cpq::{DeterministicQuotationEngine, QuotationEngine};
use lumopack_core::domain::quotation::Quotation;
use lumopack_core::domain::requirements::{Merge, RequirementsRecord};
use lumopack_core::errors::{ApplicationError, DomainError, InterfaceError};
use lumopack_core::flows::{ConversationGate, ConversationStep, GateDecision, GateSettings};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::conversation::{ChatMessage, ConversationModel};
use crate::extraction::ExtractionOutcome;
use crate::guardrails::{GuardrailPolicy, GuardrailViolation};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default)]
    pub current_requirements: RequirementsRecord,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatResponse {
    pub correlation_id: String,
    pub response: String,
    /// What this turn's reply contributed, after guardrails.
    pub extracted_data: RequirementsRecord,
    pub extraction: ExtractionOutcome,
    /// Caller state with `extracted_data` merged in.
    pub requirements: RequirementsRecord,
    pub current_step: Option<u8>,
    pub gate: GateDecision,
    pub guardrail_violations: Vec<GuardrailViolation>,
    pub show_quotation: bool,
    pub quotation_data: Option<Quotation>,
    pub quick_replies: Vec<String>,
}

/// Runs one conversation turn. Holds no per-conversation state: the caller
/// sends the accumulated record with every request.
pub struct AgentRuntime<M, E = DeterministicQuotationEngine> {
    model: M,
    engine: E,
    gate: ConversationGate,
    guardrails: GuardrailPolicy,
}

impl<M> AgentRuntime<M>
where
    M: ConversationModel,
{
    pub fn new(model: M) -> Self {
        Self::with_engine(model, DeterministicQuotationEngine::default(), ConversationGate::default())
    }

    /// Gate and guardrails follow the `[conversation]` section.
    pub fn from_config(model: M, config: &AppConfig) -> Self {
        let gate = ConversationGate::new(GateSettings::from(&config.conversation));
        Self::with_engine(model, DeterministicQuotationEngine::default(), gate)
    }
}

impl<M, E> AgentRuntime<M, E>
where
    M: ConversationModel,
    E: QuotationEngine,
{
    pub fn with_engine(model: M, engine: E, gate: ConversationGate) -> Self {
        let guardrails = GuardrailPolicy {
            quotation_step: gate.settings().quotation_step,
            ..GuardrailPolicy::default()
        };
        Self { model, engine, gate, guardrails }
    }

    pub fn with_guardrails(mut self, guardrails: GuardrailPolicy) -> Self {
        self.guardrails = guardrails;
        self
    }

    pub async fn handle_turn(&self, request: ChatRequest) -> Result<ChatResponse, InterfaceError> {
        let correlation_id = Uuid::new_v4().to_string();
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ApplicationError::from(DomainError::invalid_argument(
                "message",
                "must not be empty",
            ))
            .into_interface(correlation_id));
        }

        info!(
            event_name = "agent.turn.started",
            correlation_id = %correlation_id,
            history_len = request.conversation_history.len(),
            current_step = request.current_requirements.step(),
            "conversation turn started"
        );

        let turn = self
            .model
            .converse(&request.conversation_history, message, &request.current_requirements)
            .await
            .map_err(|err| {
                error!(
                    event_name = "agent.turn.model_failed",
                    correlation_id = %correlation_id,
                    error = %format!("{err:#}"),
                    "conversation model call failed"
                );
                ApplicationError::Integration(format!("{err:#}")).into_interface(&correlation_id)
            })?;

        let (extracted, violations) = self
            .guardrails
            .evaluate(&request.current_requirements, &turn.extracted)
            .into_update(turn.extracted);
        for violation in &violations {
            warn!(
                event_name = "agent.guardrail.degraded",
                correlation_id = %correlation_id,
                reason_code = violation.reason_code(),
                field = violation.field(),
                "dropped workflow claim from model update"
            );
        }

        let mut requirements = request.current_requirements;
        requirements.merge(extracted.clone());

        let mut gate = self.gate.evaluate(&requirements);
        let quotation = if gate.generates_quotation() {
            match self.engine.generate_quotation(&requirements) {
                Ok(quotation) => Some(quotation.rounded_for_display()),
                Err(err) => {
                    warn!(
                        event_name = "agent.quotation.rejected",
                        correlation_id = %correlation_id,
                        error = %err,
                        "requirements could not be priced"
                    );
                    gate.advisories.push(err.to_string());
                    None
                }
            }
        } else {
            None
        };

        let current_step = requirements.current_step;
        let show_quotation = quotation.is_some();
        let grand_total = quotation.as_ref().map(|q| q.pricing.grand_total.to_string());
        info!(
            event_name = "agent.turn.completed",
            correlation_id = %correlation_id,
            action = ?gate.action,
            show_quotation,
            grand_total = ?grand_total,
            "conversation turn completed"
        );

        Ok(ChatResponse {
            correlation_id,
            response: turn.reply,
            extracted_data: extracted,
            extraction: turn.outcome,
            requirements,
            current_step,
            gate,
            guardrail_violations: violations,
            show_quotation,
            quotation_data: quotation,
            quick_replies: quick_replies(current_step),
        })
    }
}

/// Suggested answers the client can offer as buttons for a step.
pub fn quick_replies(step: Option<u8>) -> Vec<String> {
    let options: &[&str] = match step.and_then(ConversationStep::from_number) {
        Some(ConversationStep::ProductType) => &["General goods", "Non-food", "Food-grade", "Cosmetics"],
        Some(ConversationStep::BoxType) => &["RSC (standard)", "Die-cut (brand showcase)"],
        Some(ConversationStep::InnerPackaging) => &["No inner", "Shredded paper", "Bubble wrap", "Air pillow"],
        Some(ConversationStep::StructureCheckpoint | ConversationStep::DesignCheckpoint) => {
            &["Confirm", "Request changes"]
        }
        Some(ConversationStep::MoodTone) => &["Skip", "Minimal", "Premium", "Vibrant", "Elegant"],
        Some(ConversationStep::Logo) => &["No logo", "Add logo"],
        Some(ConversationStep::SpecialFeatures) => {
            &["None", "Gloss coating", "Matte coating", "Emboss", "Foil stamping"]
        }
        Some(ConversationStep::OrderConfirmation) => &["Confirm order", "Revise mockup"],
        _ => &[],
    };
    options.iter().map(|option| option.to_string()).collect()
}
