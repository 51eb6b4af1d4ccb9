use crate::config::ConversationConfig;
use crate::domain::requirements::RequirementsRecord;
use crate::flows::states::{ConversationStep, GateAction, GateDecision};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateSettings {
    pub quotation_step: u8,
    pub minimum_order_quantity: u32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            quotation_step: ConversationStep::Quotation.number(),
            minimum_order_quantity: 500,
        }
    }
}

impl From<&ConversationConfig> for GateSettings {
    fn from(config: &ConversationConfig) -> Self {
        Self {
            quotation_step: config.quotation_step,
            minimum_order_quantity: config.minimum_order_quantity,
        }
    }
}

/// Decides what the conversation needs next and whether a record is ready
/// to be priced.
#[derive(Clone, Debug, Default)]
pub struct ConversationGate {
    settings: GateSettings,
}

impl ConversationGate {
    pub fn new(settings: GateSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> GateSettings {
        self.settings
    }

    pub fn should_quote(&self, record: &RequirementsRecord) -> bool {
        record.design_confirmed() && record.step() >= self.settings.quotation_step
    }

    pub fn evaluate(&self, record: &RequirementsRecord) -> GateDecision {
        let missing_fields = missing_required_fields(record);
        let advisories = self.advisories(record);

        let action = if record.order_confirmed() && record.design_confirmed() {
            GateAction::OrderConfirmed
        } else if self.should_quote(record) {
            GateAction::GenerateQuotation
        } else if !missing_fields.is_empty() {
            GateAction::PromptForMissingFields(missing_fields.clone())
        } else if !record.structure_confirmed() {
            GateAction::AwaitStructureConfirmation
        } else if !record.design_confirmed() {
            if record.step() >= ConversationStep::DesignCheckpoint.number() {
                GateAction::AwaitDesignConfirmation
            } else {
                GateAction::CollectDesignDetails
            }
        } else {
            GateAction::AdvanceToQuotation
        };

        GateDecision {
            step: ConversationStep::from_number(record.step()),
            action,
            missing_fields,
            advisories,
        }
    }

    fn advisories(&self, record: &RequirementsRecord) -> Vec<String> {
        let mut advisories = Vec::new();
        if let Some(quantity) = record.quantity {
            if quantity < self.settings.minimum_order_quantity {
                advisories.push(format!(
                    "quantity {quantity} is below the minimum order of {} boxes",
                    self.settings.minimum_order_quantity
                ));
            }
        }
        advisories
    }
}

/// Structure fields that must be collected before the first checkpoint.
pub fn missing_required_fields(record: &RequirementsRecord) -> Vec<String> {
    let mut missing = Vec::new();
    if record.product_type.is_none() {
        missing.push("product_type".to_string());
    }
    if record.box_type.is_none() {
        missing.push("box_type".to_string());
    }
    if record.dimensions.and_then(|dimensions| dimensions.to_geometry()).is_none() {
        missing.push("dimensions".to_string());
    }
    if record.quantity.is_none() {
        missing.push("quantity".to_string());
    }
    missing
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::geometry::{BoxGeometry, Dimensions};
    use crate::domain::product::{BoxType, ProductType};
    use crate::domain::requirements::RequirementsRecord;
    use crate::flows::engine::{missing_required_fields, ConversationGate, GateSettings};
    use crate::flows::states::{ConversationStep, GateAction};

    fn structured_record() -> RequirementsRecord {
        let geometry =
            BoxGeometry::new(Decimal::from(25), Decimal::from(35), Decimal::from(20)).expect("ok");
        RequirementsRecord {
            product_type: Some(ProductType::NonFood),
            box_type: Some(BoxType::Rsc),
            dimensions: Some(Dimensions::from(geometry)),
            quantity: Some(1_000),
            current_step: Some(6),
            ..RequirementsRecord::default()
        }
    }

    #[test]
    fn empty_record_prompts_for_every_structure_field() {
        let decision = ConversationGate::default().evaluate(&RequirementsRecord::default());

        let expected = ["product_type", "box_type", "dimensions", "quantity"].map(String::from);
        assert_eq!(decision.action, GateAction::PromptForMissingFields(expected.to_vec()));
        assert_eq!(decision.missing_fields, expected);
        assert_eq!(decision.step, None);
        assert!(!decision.generates_quotation());
    }

    #[test]
    fn complete_structure_waits_for_first_checkpoint() {
        let decision = ConversationGate::default().evaluate(&structured_record());

        assert_eq!(decision.action, GateAction::AwaitStructureConfirmation);
        assert_eq!(decision.step, Some(ConversationStep::StructureCheckpoint));
        assert!(decision.missing_fields.is_empty());
    }

    #[test]
    fn design_stage_progresses_to_second_checkpoint() {
        let gate = ConversationGate::default();
        let mut record = structured_record();
        record.confirmed_structure = Some(true);
        record.current_step = Some(8);
        assert_eq!(gate.evaluate(&record).action, GateAction::CollectDesignDetails);

        record.current_step = Some(10);
        assert_eq!(gate.evaluate(&record).action, GateAction::AwaitDesignConfirmation);
    }

    #[test]
    fn quotation_requires_confirmed_design_and_quoting_step() {
        let gate = ConversationGate::default();
        let mut record = structured_record();
        record.confirmed_structure = Some(true);
        record.confirmed_design = Some(true);
        record.current_step = Some(10);

        assert!(!gate.should_quote(&record));
        assert_eq!(gate.evaluate(&record).action, GateAction::AdvanceToQuotation);

        record.current_step = Some(11);
        assert!(gate.should_quote(&record));
        assert!(gate.evaluate(&record).generates_quotation());

        record.confirmed_design = Some(false);
        assert!(!gate.should_quote(&record));
    }

    #[test]
    fn quoting_step_is_configurable() {
        let gate = ConversationGate::new(GateSettings { quotation_step: 9, ..GateSettings::default() });
        let record = RequirementsRecord {
            confirmed_design: Some(true),
            current_step: Some(9),
            ..RequirementsRecord::default()
        };
        assert!(gate.should_quote(&record));
    }

    #[test]
    fn order_confirmation_without_design_does_not_quote() {
        let gate = ConversationGate::default();
        let mut record = structured_record();
        record.confirmed_structure = Some(true);
        record.confirmed_order = Some(true);
        record.current_step = Some(12);

        let decision = gate.evaluate(&record);
        assert_eq!(decision.action, GateAction::AwaitDesignConfirmation);
        assert!(!decision.generates_quotation());

        record.confirmed_design = Some(true);
        let decision = gate.evaluate(&record);
        assert_eq!(decision.action, GateAction::OrderConfirmed);
        assert!(decision.generates_quotation());
    }

    #[test]
    fn small_orders_are_advisory_only() {
        let mut record = structured_record();
        record.quantity = Some(200);
        record.confirmed_design = Some(true);
        record.current_step = Some(11);

        let decision = ConversationGate::default().evaluate(&record);

        assert_eq!(decision.action, GateAction::GenerateQuotation);
        assert_eq!(decision.advisories.len(), 1);
        assert!(decision.advisories[0].contains("below the minimum order of 500"));
    }

    #[test]
    fn incomplete_dimensions_count_as_missing() {
        let record = RequirementsRecord {
            dimensions: Some(Dimensions { width: Some(Decimal::from(5)), ..Dimensions::default() }),
            ..structured_record()
        };
        assert_eq!(missing_required_fields(&record), ["dimensions"]);
    }
}
