use serde::{Deserialize, Serialize};

/// Steps of the guided box-design conversation, numbered as the model
/// reports them in `current_step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStep {
    ProductType,
    BoxType,
    InnerPackaging,
    Dimensions,
    Quantity,
    StructureCheckpoint,
    MoodTone,
    Logo,
    SpecialFeatures,
    DesignCheckpoint,
    Quotation,
    OrderConfirmation,
}

impl ConversationStep {
    pub const ALL: [ConversationStep; 12] = [
        Self::ProductType,
        Self::BoxType,
        Self::InnerPackaging,
        Self::Dimensions,
        Self::Quantity,
        Self::StructureCheckpoint,
        Self::MoodTone,
        Self::Logo,
        Self::SpecialFeatures,
        Self::DesignCheckpoint,
        Self::Quotation,
        Self::OrderConfirmation,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Self::ProductType => 1,
            Self::BoxType => 2,
            Self::InnerPackaging => 3,
            Self::Dimensions => 4,
            Self::Quantity => 5,
            Self::StructureCheckpoint => 6,
            Self::MoodTone => 7,
            Self::Logo => 8,
            Self::SpecialFeatures => 9,
            Self::DesignCheckpoint => 10,
            Self::Quotation => 11,
            Self::OrderConfirmation => 12,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    pub fn is_checkpoint(&self) -> bool {
        matches!(self, Self::StructureCheckpoint | Self::DesignCheckpoint)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateAction {
    PromptForMissingFields(Vec<String>),
    AwaitStructureConfirmation,
    CollectDesignDetails,
    AwaitDesignConfirmation,
    AdvanceToQuotation,
    GenerateQuotation,
    OrderConfirmed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub step: Option<ConversationStep>,
    pub action: GateAction,
    pub missing_fields: Vec<String>,
    /// Business-rule notes that never block pricing.
    pub advisories: Vec<String>,
}

impl GateDecision {
    pub fn generates_quotation(&self) -> bool {
        matches!(self.action, GateAction::GenerateQuotation | GateAction::OrderConfirmed)
    }
}
