use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::geometry::Dimensions;
use crate::domain::product::{normalize_key, BoxType, ProductType};

/// Field-by-field overlay: every value present in `update` replaces the
/// current one, absent values leave the current one untouched.
pub trait Merge {
    fn merge(&mut self, update: Self);
}

fn overlay<T>(slot: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *slot = update;
    }
}

fn overlay_group<T: Merge>(slot: &mut Option<T>, update: Option<T>) {
    match (slot.as_mut(), update) {
        (Some(current), Some(update)) => current.merge(update),
        (None, Some(update)) => *slot = Some(update),
        (_, None) => {}
    }
}

/// Requirements accumulated over a design conversation. Every field is
/// optional; the record is rebuilt from caller state on each turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsRecord {
    pub product_type: Option<ProductType>,
    #[serde(deserialize_with = "lenient_box_type")]
    pub box_type: Option<BoxType>,
    pub inner: Option<InnerSelections>,
    pub dimensions: Option<Dimensions>,
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: Option<u32>,
    pub mood_tone: Option<String>,
    pub logo: Option<LogoSpec>,
    pub special_features: Option<SpecialFeatures>,
    #[serde(deserialize_with = "lenient_step")]
    pub current_step: Option<u8>,
    #[serde(deserialize_with = "lenient_flag")]
    pub is_checkpoint: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub confirmed_structure: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub confirmed_design: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub confirmed_order: Option<bool>,
}

impl RequirementsRecord {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn step(&self) -> u8 {
        self.current_step.unwrap_or(0)
    }

    pub fn structure_confirmed(&self) -> bool {
        self.confirmed_structure.unwrap_or(false)
    }

    pub fn design_confirmed(&self) -> bool {
        self.confirmed_design.unwrap_or(false)
    }

    pub fn order_confirmed(&self) -> bool {
        self.confirmed_order.unwrap_or(false)
    }
}

impl Merge for RequirementsRecord {
    fn merge(&mut self, update: Self) {
        overlay(&mut self.product_type, update.product_type);
        overlay(&mut self.box_type, update.box_type);
        overlay_group(&mut self.inner, update.inner);
        overlay_group(&mut self.dimensions, update.dimensions);
        overlay(&mut self.quantity, update.quantity);
        overlay(&mut self.mood_tone, update.mood_tone);
        overlay_group(&mut self.logo, update.logo);
        overlay_group(&mut self.special_features, update.special_features);
        overlay(&mut self.current_step, update.current_step);
        overlay(&mut self.is_checkpoint, update.is_checkpoint);
        overlay(&mut self.confirmed_structure, update.confirmed_structure);
        overlay(&mut self.confirmed_design, update.confirmed_design);
        overlay(&mut self.confirmed_order, update.confirmed_order);
    }
}

impl Merge for Dimensions {
    fn merge(&mut self, update: Self) {
        Dimensions::merge(self, update);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InnerSelections {
    pub cushioning: Option<String>,
    pub moisture_coating: Option<String>,
    pub food_coating: Option<String>,
}

impl Merge for InnerSelections {
    fn merge(&mut self, update: Self) {
        overlay(&mut self.cushioning, update.cushioning);
        overlay(&mut self.moisture_coating, update.moisture_coating);
        overlay(&mut self.food_coating, update.food_coating);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoSpec {
    #[serde(deserialize_with = "lenient_flag")]
    pub has_logo: Option<bool>,
    pub position: Option<String>,
}

impl Merge for LogoSpec {
    fn merge(&mut self, update: Self) {
        overlay(&mut self.has_logo, update.has_logo);
        overlay(&mut self.position, update.position);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialFeatures {
    pub gloss_coating: Option<String>,
    pub matte_coating: Option<String>,
    pub emboss: Option<EmbossSpec>,
    pub foil: Option<FoilSpec>,
}

impl Merge for SpecialFeatures {
    fn merge(&mut self, update: Self) {
        overlay(&mut self.gloss_coating, update.gloss_coating);
        overlay(&mut self.matte_coating, update.matte_coating);
        overlay_group(&mut self.emboss, update.emboss);
        overlay_group(&mut self.foil, update.foil);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbossSpec {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub has_block: Option<bool>,
}

impl Merge for EmbossSpec {
    fn merge(&mut self, update: Self) {
        overlay(&mut self.kind, update.kind);
        overlay(&mut self.has_block, update.has_block);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoilSpec {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub has_block: Option<bool>,
}

impl Merge for FoilSpec {
    fn merge(&mut self, update: Self) {
        overlay(&mut self.kind, update.kind);
        overlay(&mut self.color, update.color);
        overlay(&mut self.has_block, update.has_block);
    }
}

/// A selection counts only when it names something; blanks and explicit
/// refusals ("none", "no") read as not selected.
pub fn selection(value: &Option<String>) -> Option<&str> {
    let value = value.as_deref()?.trim();
    match normalize_key(value).as_str() {
        "" | "none" | "no" | "null" | "n/a" => None,
        _ => Some(value),
    }
}

fn lenient_box_type<'de, D>(deserializer: D) -> Result<Option<BoxType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| raw.parse::<BoxType>().ok()))
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0 && n.fract() == 0.0).map(|n| n as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(raw) => {
            let digits = raw.chars().filter(|ch| !ch.is_whitespace() && *ch != ',').collect::<String>();
            digits.parse::<u32>().ok()
        }
        _ => None,
    })
}

/// Any integer or numeric string. Values outside `u8` saturate; anything
/// else reads as absent.
fn lenient_step<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let step = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|n| n.fract() == 0.0).map(|n| n as i64)),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(step.map(|step| u8::try_from(step.clamp(0, i64::from(u8::MAX))).unwrap_or(u8::MAX)))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => Some(flag),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(raw) => match normalize_key(&raw).as_str() {
            "true" | "yes" | "y" | "1" | "confirmed" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}
