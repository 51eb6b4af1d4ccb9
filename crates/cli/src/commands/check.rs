use clap::Args;
use lumopack_core::errors::DomainError;
use lumopack_core::structural::{self, StructuralCheckInput, DEFAULT_FLUTE};

use super::{CommandResult, EXIT_FAILURE, EXIT_INVALID_INPUT};

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[arg(long, help = "Box length in centimetres")]
    pub length: f64,
    #[arg(long, help = "Box width in centimetres")]
    pub width: f64,
    #[arg(long, help = "Box height in centimetres")]
    pub height: f64,
    #[arg(long, default_value = DEFAULT_FLUTE, help = "Flute code: A, B, C, E or BC")]
    pub flute: String,
    #[arg(long, allow_negative_numbers = true, help = "Payload weight per box in kilograms")]
    pub weight: f64,
}

pub fn run(args: &CheckArgs) -> CommandResult {
    let input = StructuralCheckInput {
        length: args.length,
        width: args.width,
        height: args.height,
        flute_type: args.flute.clone(),
        weight: args.weight,
    };

    match structural::evaluate(&input) {
        Ok(result) => {
            let result = result.rounded_for_display();
            let message = format!(
                "safety score {} ({:?}) for flute {}",
                result.safety_score, result.status, input.flute_type
            );
            CommandResult::success_with_data("check", message, &result)
        }
        Err(error @ DomainError::InvalidArgument { .. }) => {
            CommandResult::failure("check", "invalid_input", error.to_string(), EXIT_INVALID_INPUT)
        }
        Err(error) => CommandResult::failure("check", "internal", error.to_string(), EXIT_FAILURE),
    }
}
