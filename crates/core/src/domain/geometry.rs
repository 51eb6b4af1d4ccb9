use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Longest side accepted, in centimetres. Keeps every pricing product well
/// inside `Decimal` range for any `u32` quantity.
pub const MAX_SIDE_CM: i64 = 10_000;

fn check_side(field: &'static str, value: Decimal) -> Result<(), DomainError> {
    if value <= Decimal::ZERO {
        return Err(DomainError::invalid_argument(field, format!("must be positive, got {value}")));
    }
    if value > Decimal::from(MAX_SIDE_CM) {
        return Err(DomainError::invalid_argument(
            field,
            format!("must not exceed {MAX_SIDE_CM} cm, got {value}"),
        ));
    }
    Ok(())
}

/// External box dimensions in centimetres.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub width: Decimal,
    pub length: Decimal,
    pub height: Decimal,
}

impl BoxGeometry {
    pub fn new(width: Decimal, length: Decimal, height: Decimal) -> Result<Self, DomainError> {
        for (field, value) in [("width", width), ("length", length), ("height", height)] {
            check_side(field, value)?;
        }
        Ok(Self { width, length, height })
    }

    /// 10 x 10 x 10 cm, used when a record carries no dimensions.
    pub fn reference() -> Self {
        let ten = Decimal::from(10);
        Self { width: ten, length: ten, height: ten }
    }

    pub fn surface_area(&self) -> Decimal {
        let two = Decimal::from(2);
        two * (self.width * self.length + self.width * self.height + self.length * self.height)
    }
}

/// Dimensions as collected during a conversation; any side may still be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub width: Option<Decimal>,
    pub length: Option<Decimal>,
    pub height: Option<Decimal>,
}

impl Dimensions {
    pub fn merge(&mut self, update: Dimensions) {
        if update.width.is_some() {
            self.width = update.width;
        }
        if update.length.is_some() {
            self.length = update.length;
        }
        if update.height.is_some() {
            self.height = update.height;
        }
    }

    /// Complete geometry, or `None` while a side is missing or out of range.
    pub fn to_geometry(&self) -> Option<BoxGeometry> {
        BoxGeometry::new(self.width?, self.length?, self.height?).ok()
    }

    /// Rejects any side already given that is longer than [`MAX_SIDE_CM`].
    /// Missing and non-positive sides are left to the caller's defaults.
    pub fn check_upper_bounds(&self) -> Result<(), DomainError> {
        for (field, value) in [("width", self.width), ("length", self.length), ("height", self.height)] {
            if let Some(value) = value.filter(|value| *value > Decimal::from(MAX_SIDE_CM)) {
                return Err(DomainError::invalid_argument(
                    field,
                    format!("must not exceed {MAX_SIDE_CM} cm, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

impl From<BoxGeometry> for Dimensions {
    fn from(value: BoxGeometry) -> Self {
        Self { width: Some(value.width), length: Some(value.length), height: Some(value.height) }
    }
}
