//! Box compression check for corrugated shipping boxes.
//!
//! Estimates box compression strength with the simplified McKee formula and
//! compares it with the load on the bottom box of a five-high stack.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::cpq::catalog::Lookup;
use crate::errors::DomainError;

pub const DEFAULT_FLUTE: &str = "C";

const CM_TO_INCH: f64 = 0.3937;
const MM_TO_INCH: f64 = 0.03937;
const LB_TO_KG: f64 = 0.453592;
const MCKEE_CONSTANT: f64 = 5.87;
/// Boxes resting on the bottom box of a five-high stack.
const BOXES_ABOVE_BOTTOM: f64 = 4.0;
/// Score reported when there is no load to carry.
const UNLOADED_SCORE: f64 = 100.0;
const DANGER_BELOW: f64 = 1.5;
const WARNING_BELOW: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FluteSpec {
    pub ect_lb_per_in: f64,
    pub thickness_mm: f64,
}

static FLUTES: OnceLock<BTreeMap<&'static str, FluteSpec>> = OnceLock::new();

pub fn flute_catalog() -> &'static BTreeMap<&'static str, FluteSpec> {
    FLUTES.get_or_init(|| {
        [
            ("A", FluteSpec { ect_lb_per_in: 5.0, thickness_mm: 4.5 }),
            ("B", FluteSpec { ect_lb_per_in: 4.0, thickness_mm: 2.5 }),
            ("C", FluteSpec { ect_lb_per_in: 4.2, thickness_mm: 3.6 }),
            ("E", FluteSpec { ect_lb_per_in: 3.0, thickness_mm: 1.5 }),
            ("BC", FluteSpec { ect_lb_per_in: 7.0, thickness_mm: 6.1 }),
        ]
        .into_iter()
        .collect()
    })
}

/// Flute by exact code; anything else, including lowercase or padded codes,
/// is evaluated as C flute.
pub fn resolve_flute(code: &str) -> Lookup<&'static FluteSpec> {
    let catalog = flute_catalog();
    match catalog.get(code) {
        Some(spec) => Lookup::Found(spec),
        None => Lookup::FallbackUsed(&catalog[DEFAULT_FLUTE]),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyStatus {
    Safe,
    Warning,
    Danger,
}

impl SafetyStatus {
    pub fn classify(safety_score: f64) -> Self {
        if safety_score < DANGER_BELOW {
            Self::Danger
        } else if safety_score < WARNING_BELOW {
            Self::Warning
        } else {
            Self::Safe
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Danger => "Switch to Flute BC (Double Wall)",
            Self::Warning | Self::Safe => "Design is optimal (Safe).",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuralCheckInput {
    /// Centimetres.
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub flute_type: String,
    /// Kilograms per box.
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuralCheckResult {
    pub max_load_kg: f64,
    pub current_load: f64,
    pub safety_score: f64,
    pub status: SafetyStatus,
    pub recommendation: String,
}

impl StructuralCheckResult {
    pub fn rounded_for_display(&self) -> Self {
        Self {
            max_load_kg: round2(self.max_load_kg),
            safety_score: round2(self.safety_score),
            ..self.clone()
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn evaluate(input: &StructuralCheckInput) -> Result<StructuralCheckResult, DomainError> {
    let sides = [("length", input.length), ("width", input.width), ("height", input.height)];
    for (field, value) in sides {
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::invalid_argument(
                field,
                format!("must be a positive number of centimetres, got {value}"),
            ));
        }
    }
    if !input.weight.is_finite() {
        return Err(DomainError::invalid_argument("weight", "must be a finite number of kilograms"));
    }

    let flute = resolve_flute(&input.flute_type);
    if flute.is_fallback() {
        tracing::debug!(
            event_name = "structural.flute.fallback_used",
            flute_type = %input.flute_type,
            "unknown flute code; evaluating as C flute"
        );
    }
    let spec = flute.value();

    let perimeter_in = 2.0 * (input.length + input.width) * CM_TO_INCH;
    let thickness_in = spec.thickness_mm * MM_TO_INCH;
    let bct_lbs = MCKEE_CONSTANT * spec.ect_lb_per_in * (thickness_in * perimeter_in).sqrt();
    let max_load_kg = bct_lbs * LB_TO_KG;

    let stack_load = input.weight * BOXES_ABOVE_BOTTOM;
    let safety_score = if stack_load > 0.0 { max_load_kg / stack_load } else { UNLOADED_SCORE };
    let status = SafetyStatus::classify(safety_score);

    Ok(StructuralCheckResult {
        max_load_kg,
        current_load: stack_load,
        safety_score,
        status,
        recommendation: status.recommendation().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{evaluate, resolve_flute, SafetyStatus, StructuralCheckInput};
    use crate::errors::DomainError;

    fn input(length: f64, width: f64, flute: &str, weight: f64) -> StructuralCheckInput {
        StructuralCheckInput {
            length,
            width,
            height: 15.0,
            flute_type: flute.to_string(),
            weight,
        }
    }

    #[test]
    fn reference_example_is_dangerous() {
        let result = evaluate(&input(30.0, 20.0, "C", 10.0)).expect("evaluate");

        assert!((result.max_load_kg - 26.42).abs() < 0.01, "max load {}", result.max_load_kg);
        assert_eq!(result.current_load, 40.0);
        assert!((result.safety_score - 0.66).abs() < 0.01);
        assert_eq!(result.status, SafetyStatus::Danger);
        assert_eq!(result.recommendation, "Switch to Flute BC (Double Wall)");
    }

    #[test]
    fn unknown_flute_behaves_like_c() {
        let reference = evaluate(&input(40.0, 30.0, "C", 3.0)).expect("evaluate");
        for code in ["Z", "", "double", "F", "a", "b", "e", "bc", " BC ", "A "] {
            let result = evaluate(&input(40.0, 30.0, code, 3.0)).expect("evaluate");
            assert_eq!(result, reference, "flute `{code}`");
        }
        assert!(resolve_flute("Z").is_fallback());
        assert!(resolve_flute("bc").is_fallback());
        for code in ["A", "B", "C", "E", "BC"] {
            assert!(!resolve_flute(code).is_fallback(), "flute `{code}`");
        }
    }

    #[test]
    fn unloaded_boxes_are_always_safe() {
        for weight in [0.0, -2.5] {
            let result = evaluate(&input(10.0, 10.0, "E", weight)).expect("evaluate");
            assert_eq!(result.safety_score, 100.0);
            assert_eq!(result.status, SafetyStatus::Safe);
            assert_eq!(result.recommendation, "Design is optimal (Safe).");
        }
    }

    #[test]
    fn larger_footprint_carries_more_load() {
        let mut previous = evaluate(&input(10.0, 10.0, "B", 5.0)).expect("evaluate");
        for step in 1..20 {
            let grow = f64::from(step) * 5.0;
            let by_length = evaluate(&input(10.0 + grow, 10.0, "B", 5.0)).expect("evaluate");
            let by_width = evaluate(&input(10.0, 10.0 + grow, "B", 5.0)).expect("evaluate");

            assert!(by_length.max_load_kg > previous.max_load_kg);
            assert!(by_width.safety_score >= previous.safety_score);
            previous = by_length;
        }
    }

    #[test]
    fn thresholds_are_exclusive_upper_bounds() {
        assert_eq!(SafetyStatus::classify(1.4999), SafetyStatus::Danger);
        assert_eq!(SafetyStatus::classify(1.5), SafetyStatus::Warning);
        assert_eq!(SafetyStatus::classify(2.9999), SafetyStatus::Warning);
        assert_eq!(SafetyStatus::classify(3.0), SafetyStatus::Safe);
    }

    #[test]
    fn double_wall_outperforms_single_wall() {
        let single = evaluate(&input(30.0, 20.0, "C", 10.0)).expect("evaluate");
        let double = evaluate(&input(30.0, 20.0, "BC", 10.0)).expect("evaluate");
        assert!(double.max_load_kg > single.max_load_kg);
    }

    #[test]
    fn rejects_non_positive_or_non_finite_dimensions() {
        let error = evaluate(&input(0.0, 20.0, "C", 1.0)).expect_err("zero length");
        assert!(matches!(error, DomainError::InvalidArgument { field: "length", .. }));

        let error = evaluate(&input(10.0, f64::NAN, "C", 1.0)).expect_err("nan width");
        assert!(matches!(error, DomainError::InvalidArgument { field: "width", .. }));

        let error = evaluate(&input(10.0, 10.0, "C", f64::INFINITY)).expect_err("inf weight");
        assert!(matches!(error, DomainError::InvalidArgument { field: "weight", .. }));
    }

    #[test]
    fn display_rounding_keeps_two_places() {
        let result =
            evaluate(&input(30.0, 20.0, "C", 10.0)).expect("evaluate").rounded_for_display();
        assert_eq!(result.max_load_kg, 26.42);
        assert_eq!(result.safety_score, 0.66);
        assert_eq!(result.status, SafetyStatus::Danger);
    }
}
