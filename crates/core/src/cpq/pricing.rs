use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cpq::catalog::{FoilTier, PriceCatalog};
use crate::domain::geometry::BoxGeometry;
use crate::domain::product::BoxType;
use crate::domain::requirements::{selection, InnerSelections, SpecialFeatures};

/// Surface area of the 10 x 10 x 10 cm reference box every base cost is quoted for.
pub const BASE_AREA_CM2: i64 = 600;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub steps: Vec<PricingTraceStep>,
}

impl PricingTrace {
    pub fn push(&mut self, stage: &str, detail: impl Into<String>, amount: Decimal) {
        self.steps.push(PricingTraceStep {
            stage: stage.to_string(),
            detail: detail.into(),
            amount,
        });
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.steps.iter().any(|step| step.stage == stage)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxPrice {
    pub factor: Decimal,
    pub base_cost: Decimal,
    pub price_per_box: Decimal,
    pub total_price: Decimal,
    pub material_fallback: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerBreakdown {
    pub cushioning: Decimal,
    pub moisture_coating: Decimal,
    pub food_coating: Decimal,
    pub total: Decimal,
}

/// One-time block charge plus a per-unit rate extended over the order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishingCharge {
    pub block: Decimal,
    pub rate: Decimal,
    pub per_unit: Decimal,
    pub total: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturesBreakdown {
    pub gloss_coating: Decimal,
    pub matte_coating: Decimal,
    pub emboss: FinishingCharge,
    pub foil: FinishingCharge,
    pub total: Decimal,
}

/// Round to specified decimal places using banker's rounding.
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Surface-area multiplier against the reference box, never below 1.0.
///
/// The production factor of the box type scales both the requested and the
/// reference area, so it cancels out of the ratio.
pub fn geometry_factor(geometry: &BoxGeometry, box_type: BoxType) -> Decimal {
    let production_factor = box_type.production_factor();
    let area = geometry.surface_area() * production_factor;
    let base_area = Decimal::from(BASE_AREA_CM2) * production_factor;
    (area / base_area).max(Decimal::ONE)
}

pub fn price_box(
    catalog: &PriceCatalog,
    geometry: &BoxGeometry,
    box_type: BoxType,
    material: &str,
    quantity: u32,
) -> BoxPrice {
    let factor = geometry_factor(geometry, box_type);
    let base = catalog.base_box_cost(box_type, material);
    let material_fallback = base.is_fallback();
    let base_cost = base.value().midpoint();
    let price_per_box = base_cost * factor;

    BoxPrice {
        factor,
        base_cost,
        price_per_box,
        total_price: price_per_box * Decimal::from(quantity),
        material_fallback,
    }
}

pub fn price_inner(
    catalog: &PriceCatalog,
    inner: Option<&InnerSelections>,
    factor: Decimal,
    quantity: u32,
) -> InnerBreakdown {
    price_inner_with_trace(catalog, inner, factor, quantity, &mut PricingTrace::default())
}

pub fn price_inner_with_trace(
    catalog: &PriceCatalog,
    inner: Option<&InnerSelections>,
    factor: Decimal,
    quantity: u32,
    trace: &mut PricingTrace,
) -> InnerBreakdown {
    let Some(inner) = inner else {
        return InnerBreakdown::default();
    };
    let quantity = Decimal::from(quantity);
    let mut breakdown = InnerBreakdown::default();

    if let Some(name) = selection(&inner.cushioning) {
        match catalog.cushioning(name) {
            Some(entry) => {
                breakdown.cushioning =
                    entry.price.midpoint() * (entry.kg_per_box * factor) * quantity;
                trace.push(
                    "inner.cushioning",
                    format!(
                        "{name}: midpoint * kg_per_box({}) * factor * quantity",
                        entry.kg_per_box
                    ),
                    breakdown.cushioning,
                );
            }
            None => trace.push("inner.cushioning.unrecognized", name, Decimal::ZERO),
        }
    }

    if let Some(name) = selection(&inner.moisture_coating) {
        match catalog.moisture_coating(name) {
            Some(entry) => {
                breakdown.moisture_coating = entry.midpoint() * quantity;
                trace.push(
                    "inner.moisture_coating",
                    format!("{name}: midpoint * quantity"),
                    breakdown.moisture_coating,
                );
            }
            None => trace.push("inner.moisture_coating.unrecognized", name, Decimal::ZERO),
        }
    }

    if let Some(name) = selection(&inner.food_coating) {
        match catalog.food_coating(name) {
            Some(entry) => {
                breakdown.food_coating = entry.midpoint() * quantity;
                trace.push(
                    "inner.food_coating",
                    format!("{name}: midpoint * quantity"),
                    breakdown.food_coating,
                );
            }
            None => trace.push("inner.food_coating.unrecognized", name, Decimal::ZERO),
        }
    }

    breakdown.total = breakdown.cushioning + breakdown.moisture_coating + breakdown.food_coating;
    breakdown
}

pub fn price_special_features(
    catalog: &PriceCatalog,
    features: Option<&SpecialFeatures>,
    factor: Decimal,
    quantity: u32,
) -> FeaturesBreakdown {
    price_special_features_with_trace(
        catalog,
        features,
        factor,
        quantity,
        &mut PricingTrace::default(),
    )
}

pub fn price_special_features_with_trace(
    catalog: &PriceCatalog,
    features: Option<&SpecialFeatures>,
    factor: Decimal,
    quantity: u32,
    trace: &mut PricingTrace,
) -> FeaturesBreakdown {
    let Some(features) = features else {
        return FeaturesBreakdown::default();
    };
    let quantity = Decimal::from(quantity);
    let mut breakdown = FeaturesBreakdown::default();

    if let Some(name) = selection(&features.gloss_coating) {
        match catalog.gloss_coating(name) {
            Some(entry) => {
                breakdown.gloss_coating = entry.midpoint() * factor * quantity;
                trace.push(
                    "features.gloss_coating",
                    format!("{name}: midpoint * factor * quantity"),
                    breakdown.gloss_coating,
                );
            }
            None => trace.push("features.gloss_coating.unrecognized", name, Decimal::ZERO),
        }
    }

    if let Some(name) = selection(&features.matte_coating) {
        match catalog.matte_coating(name) {
            Some(entry) => {
                breakdown.matte_coating = entry.midpoint() * factor * quantity;
                trace.push(
                    "features.matte_coating",
                    format!("{name}: midpoint * factor * quantity"),
                    breakdown.matte_coating,
                );
            }
            None => trace.push("features.matte_coating.unrecognized", name, Decimal::ZERO),
        }
    }

    if let Some(emboss) = &features.emboss {
        if let Some(kind) = selection(&emboss.kind) {
            let block = if emboss.has_block.unwrap_or(false) {
                Decimal::ZERO
            } else {
                catalog.emboss_block_cost()
            };
            let rate = catalog.emboss_rate(kind);
            if rate.is_fallback() {
                trace.push("features.emboss.rate_fallback", kind, rate.value());
            }
            let rate = rate.value();
            let per_unit = rate * quantity;
            breakdown.emboss = FinishingCharge { block, rate, per_unit, total: block + per_unit };
            trace.push(
                "features.emboss",
                format!("{kind}: block({block}) + rate({rate}) * quantity"),
                breakdown.emboss.total,
            );
        }
    }

    if let Some(foil) = &features.foil {
        if let Some(kind) = selection(&foil.kind) {
            let block = if foil.has_block.unwrap_or(false) {
                Decimal::ZERO
            } else {
                let lookup = catalog.foil_block_cost(kind);
                if lookup.is_fallback() {
                    trace.push("features.foil.block_fallback", kind, lookup.value());
                }
                lookup.value()
            };
            let tier = FoilTier::classify(kind);
            let rate = catalog.foil_unit_rate(tier);
            let per_unit = rate * quantity;
            breakdown.foil = FinishingCharge { block, rate, per_unit, total: block + per_unit };
            trace.push(
                "features.foil",
                format!("{kind} ({tier:?} tier): block({block}) + rate({rate}) * quantity"),
                breakdown.foil.total,
            );
        }
    }

    breakdown.total = breakdown.gloss_coating
        + breakdown.matte_coating
        + breakdown.emboss.total
        + breakdown.foil.total;
    breakdown
}
