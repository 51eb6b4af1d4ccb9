use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::pricing::{
    round_money, FeaturesBreakdown, FinishingCharge, InnerBreakdown, PricingTrace,
};
use crate::domain::geometry::BoxGeometry;
use crate::domain::product::{BoxType, MaterialId, ProductType};
use crate::domain::requirements::{InnerSelections, SpecialFeatures};

const MONEY_PLACES: u32 = 2;
const FACTOR_PLACES: u32 = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationPricing {
    pub currency: String,
    pub factor: Decimal,
    pub box_price_per_unit: Decimal,
    pub box_total: Decimal,
    pub inner_breakdown: InnerBreakdown,
    pub inner_total: Decimal,
    pub features_breakdown: FeaturesBreakdown,
    pub features_total: Decimal,
    pub grand_total: Decimal,
    pub price_per_unit: Decimal,
    pub trace: PricingTrace,
}

/// Itemized price for one requirements record. Recomputed on every request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    pub product_type: Option<ProductType>,
    pub box_type: BoxType,
    pub material: MaterialId,
    pub dimensions: BoxGeometry,
    pub quantity: u32,
    pub inner: Option<InnerSelections>,
    pub special_features: Option<SpecialFeatures>,
    pub pricing: QuotationPricing,
}

impl Quotation {
    /// Copy with money rounded to satang and the factor to four places.
    /// Totals are rounded independently, so rounded parts may not add up to
    /// the rounded total.
    pub fn rounded_for_display(&self) -> Self {
        let mut display = self.clone();
        let pricing = &mut display.pricing;

        pricing.factor = round_money(pricing.factor, FACTOR_PLACES);
        pricing.box_price_per_unit = money(pricing.box_price_per_unit);
        pricing.box_total = money(pricing.box_total);
        pricing.inner_total = money(pricing.inner_total);
        pricing.features_total = money(pricing.features_total);
        pricing.grand_total = money(pricing.grand_total);
        pricing.price_per_unit = money(pricing.price_per_unit);

        let inner = &mut pricing.inner_breakdown;
        inner.cushioning = money(inner.cushioning);
        inner.moisture_coating = money(inner.moisture_coating);
        inner.food_coating = money(inner.food_coating);
        inner.total = money(inner.total);

        let features = &mut pricing.features_breakdown;
        features.gloss_coating = money(features.gloss_coating);
        features.matte_coating = money(features.matte_coating);
        round_charge(&mut features.emboss);
        round_charge(&mut features.foil);
        features.total = money(features.total);

        for step in &mut pricing.trace.steps {
            step.amount = money(step.amount);
        }

        display
    }
}

fn money(amount: Decimal) -> Decimal {
    round_money(amount, MONEY_PLACES)
}

fn round_charge(charge: &mut FinishingCharge) {
    charge.block = money(charge.block);
    charge.rate = money(charge.rate);
    charge.per_unit = money(charge.per_unit);
    charge.total = money(charge.total);
}
