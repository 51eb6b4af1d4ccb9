pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod structural;

pub use config::{AppConfig, ConfigError, LoadOptions};
pub use cpq::catalog::{Lookup, PriceCatalog};
pub use cpq::{DeterministicQuotationEngine, QuotationEngine};
pub use domain::geometry::{BoxGeometry, Dimensions};
pub use domain::product::{BoxType, MaterialId, ProductType};
pub use domain::quotation::{Quotation, QuotationPricing};
pub use domain::requirements::{Merge, RequirementsRecord};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{ConversationGate, ConversationStep, GateAction, GateDecision, GateSettings};
pub use structural::{SafetyStatus, StructuralCheckInput, StructuralCheckResult};
