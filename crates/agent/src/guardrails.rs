use lumopack_core::domain::requirements::RequirementsRecord;
use lumopack_core::flows::ConversationStep;
use serde::Serialize;

/// Workflow claims in a model update that the runtime refuses to take at
/// face value. Data fields are never touched; only step and confirmation
/// flags are checked against what the conversation has actually reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailViolation {
    StepOutOfRange,
    DesignConfirmedBeforeStructure,
    OrderConfirmedBeforeQuotation,
    OrderConfirmedBeforeDesign,
}

impl GuardrailViolation {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::StepOutOfRange => "step_out_of_range",
            Self::DesignConfirmedBeforeStructure => "design_confirmed_before_structure",
            Self::OrderConfirmedBeforeQuotation => "order_confirmed_before_quotation",
            Self::OrderConfirmedBeforeDesign => "order_confirmed_before_design",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::StepOutOfRange => "current_step",
            Self::DesignConfirmedBeforeStructure => "confirmed_design",
            Self::OrderConfirmedBeforeQuotation | Self::OrderConfirmedBeforeDesign => {
                "confirmed_order"
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Degrade { update: RequirementsRecord, violations: Vec<GuardrailViolation> },
}

impl GuardrailDecision {
    pub fn into_update(self, original: RequirementsRecord) -> (RequirementsRecord, Vec<GuardrailViolation>) {
        match self {
            Self::Allow => (original, Vec::new()),
            Self::Degrade { update, violations } => (update, violations),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub enforce_checkpoint_order: bool,
    pub quotation_step: u8,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self { enforce_checkpoint_order: true, quotation_step: ConversationStep::Quotation.number() }
    }
}

impl GuardrailPolicy {
    pub fn evaluate(
        &self,
        current: &RequirementsRecord,
        update: &RequirementsRecord,
    ) -> GuardrailDecision {
        let mut cleaned = update.clone();
        let mut violations = Vec::new();

        if let Some(step) = update.current_step {
            if ConversationStep::from_number(step).is_none() {
                cleaned.current_step = None;
                violations.push(GuardrailViolation::StepOutOfRange);
            }
        }

        if self.enforce_checkpoint_order {
            let structure_confirmed =
                cleaned.confirmed_structure.unwrap_or_else(|| current.structure_confirmed());
            if cleaned.confirmed_design == Some(true) && !structure_confirmed {
                cleaned.confirmed_design = None;
                violations.push(GuardrailViolation::DesignConfirmedBeforeStructure);
            }

            let reached_step = current.step().max(cleaned.step());
            let design_confirmed =
                cleaned.confirmed_design.unwrap_or_else(|| current.design_confirmed());
            if cleaned.confirmed_order == Some(true) {
                if reached_step < self.quotation_step {
                    cleaned.confirmed_order = None;
                    violations.push(GuardrailViolation::OrderConfirmedBeforeQuotation);
                } else if !design_confirmed {
                    cleaned.confirmed_order = None;
                    violations.push(GuardrailViolation::OrderConfirmedBeforeDesign);
                }
            }
        }

        if violations.is_empty() {
            GuardrailDecision::Allow
        } else {
            GuardrailDecision::Degrade { update: cleaned, violations }
        }
    }
}
