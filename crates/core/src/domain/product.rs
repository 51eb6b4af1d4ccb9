use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog key of a board material, e.g. `corrugated_standard`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub String);

impl MaterialId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What goes inside the box. Values the catalog does not know are kept
/// verbatim in `Other` so the material lookup can report a fallback.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    General,
    NonFood,
    FoodGrade,
    Cosmetics,
    Other(String),
}

impl ProductType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::General => "general",
            Self::NonFood => "non_food",
            Self::FoodGrade => "food_grade",
            Self::Cosmetics => "cosmetics",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ProductType {
    fn from(value: String) -> Self {
        match normalize_key(&value).as_str() {
            "general" | "general_goods" => Self::General,
            "non_food" | "nonfood" => Self::NonFood,
            "food_grade" | "food" => Self::FoodGrade,
            "cosmetics" | "cosmetic" => Self::Cosmetics,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoxType {
    #[serde(rename = "RSC", alias = "rsc")]
    Rsc,
    #[serde(rename = "Die-cut", alias = "DieCut", alias = "die_cut", alias = "diecut")]
    DieCut,
}

impl BoxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsc => "RSC",
            Self::DieCut => "Die-cut",
        }
    }

    /// Waste allowance of the production process. It appears on both sides of
    /// the factor ratio and therefore never moves a price.
    pub fn production_factor(&self) -> Decimal {
        match self {
            Self::Rsc => Decimal::new(11, 1),
            Self::DieCut => Decimal::new(15, 1),
        }
    }
}

impl Default for BoxType {
    fn default() -> Self {
        Self::Rsc
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownBoxType(pub String);

impl fmt::Display for UnknownBoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown box type `{}` (expected RSC or Die-cut)", self.0)
    }
}

impl std::error::Error for UnknownBoxType {}

impl FromStr for BoxType {
    type Err = UnknownBoxType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(value);
        if key.starts_with("rsc") {
            return Ok(Self::Rsc);
        }
        if key.starts_with("die_cut") || key.starts_with("diecut") {
            return Ok(Self::DieCut);
        }
        Err(UnknownBoxType(value.to_string()))
    }
}

/// Lowercases and folds spaces and hyphens into underscores.
pub fn normalize_key(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|ch| if ch == ' ' || ch == '-' { '_' } else { ch })
        .collect()
}
