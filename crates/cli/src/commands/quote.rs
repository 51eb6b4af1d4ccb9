use std::fs;
use std::io::{self, Read};
use std::path::Path;

use lumopack_core::cpq::{DeterministicQuotationEngine, QuotationEngine};
use lumopack_core::domain::requirements::RequirementsRecord;
use lumopack_core::errors::DomainError;
use tracing::info;

use super::{CommandResult, EXIT_FAILURE, EXIT_INVALID_INPUT};

pub fn run(file: Option<&Path>, exact: bool) -> CommandResult {
    let raw = match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|error| format!("could not read `{}`: {error}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map(|_| buffer)
                .map_err(|error| format!("could not read stdin: {error}"))
        }
    };

    match raw {
        Ok(raw) => run_with_input(&raw, exact),
        Err(message) => CommandResult::failure("quote", "io", message, EXIT_INVALID_INPUT),
    }
}

/// Blank input prices the empty record.
pub fn run_with_input(raw: &str, exact: bool) -> CommandResult {
    let record = if raw.trim().is_empty() {
        RequirementsRecord::default()
    } else {
        match serde_json::from_str::<RequirementsRecord>(raw) {
            Ok(record) => record,
            Err(error) => {
                return CommandResult::failure(
                    "quote",
                    "invalid_input",
                    format!("requirements must be a JSON object: {error}"),
                    EXIT_INVALID_INPUT,
                )
            }
        }
    };

    let engine = DeterministicQuotationEngine::default();
    match engine.generate_quotation(&record) {
        Ok(quotation) => {
            let quotation = if exact { quotation } else { quotation.rounded_for_display() };
            info!(
                event_name = "cli.quote.generated",
                quantity = quotation.quantity,
                grand_total = %quotation.pricing.grand_total,
                "quotation generated"
            );
            let message = format!(
                "{} {} x {}: {} {}",
                quotation.box_type,
                quotation.material,
                quotation.quantity,
                quotation.pricing.grand_total,
                quotation.pricing.currency
            );
            CommandResult::success_with_data("quote", message, &quotation)
        }
        Err(error @ DomainError::InvalidArgument { .. }) => {
            CommandResult::failure("quote", "invalid_input", error.to_string(), EXIT_INVALID_INPUT)
        }
        Err(error) => CommandResult::failure("quote", "internal", error.to_string(), EXIT_FAILURE),
    }
}
