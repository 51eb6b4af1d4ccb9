pub mod catalog;
pub mod pricing;

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::geometry::BoxGeometry;
use crate::domain::product::{BoxType, MaterialId};
use crate::domain::quotation::{Quotation, QuotationPricing};
use crate::domain::requirements::RequirementsRecord;
use crate::errors::DomainError;

use self::{
    catalog::PriceCatalog,
    pricing::{price_box, price_inner_with_trace, price_special_features_with_trace, PricingTrace},
};

pub const DEFAULT_QUANTITY: u32 = 500;

pub trait QuotationEngine: Send + Sync {
    fn generate_quotation(&self, record: &RequirementsRecord) -> Result<Quotation, DomainError>;
}

pub struct DeterministicQuotationEngine {
    catalog: &'static PriceCatalog,
}

impl DeterministicQuotationEngine {
    pub fn new(catalog: &'static PriceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'static PriceCatalog {
        self.catalog
    }
}

impl Default for DeterministicQuotationEngine {
    fn default() -> Self {
        Self::new(PriceCatalog::standard())
    }
}

impl QuotationEngine for DeterministicQuotationEngine {
    fn generate_quotation(&self, record: &RequirementsRecord) -> Result<Quotation, DomainError> {
        generate_quotation(self.catalog, record)
    }
}

/// Prices a possibly partial record. Missing dimensions, box type and
/// quantity take the documented defaults; a zero quantity or a side longer
/// than [`MAX_SIDE_CM`](crate::domain::geometry::MAX_SIDE_CM) is rejected.
pub fn generate_quotation(
    catalog: &PriceCatalog,
    record: &RequirementsRecord,
) -> Result<Quotation, DomainError> {
    let quantity = record.quantity.unwrap_or(DEFAULT_QUANTITY);
    if quantity == 0 {
        return Err(DomainError::invalid_argument("quantity", "must be at least 1"));
    }
    if let Some(dimensions) = &record.dimensions {
        dimensions.check_upper_bounds()?;
    }

    let mut trace = PricingTrace::default();

    let dimensions = match record.dimensions.and_then(|dimensions| dimensions.to_geometry()) {
        Some(geometry) => geometry,
        None => {
            let reference = BoxGeometry::reference();
            trace.push("default.dimensions", "10 x 10 x 10 cm", reference.surface_area());
            reference
        }
    };
    let box_type = record.box_type.unwrap_or_else(|| {
        trace.push("default.box_type", BoxType::default().as_str(), Decimal::ZERO);
        BoxType::default()
    });
    if record.quantity.is_none() {
        trace.push("default.quantity", DEFAULT_QUANTITY.to_string(), Decimal::from(quantity));
    }

    let material = catalog.material_for(record.product_type.as_ref(), box_type);
    if material.is_fallback() {
        debug!(
            event_name = "cpq.catalog.fallback_used",
            table = "materials",
            product_type = record.product_type.as_ref().map(|p| p.as_str()).unwrap_or("<unset>"),
            "product type not mapped; using generic board"
        );
        trace.push("fallback.material", material.value(), Decimal::ZERO);
    }
    let material = MaterialId(material.value().to_string());

    let box_price = price_box(catalog, &dimensions, box_type, material.as_str(), quantity);
    if box_price.material_fallback {
        debug!(
            event_name = "cpq.catalog.fallback_used",
            table = "base_box",
            material = material.as_str(),
            "material has no base cost; using generic board"
        );
        trace.push("fallback.base_cost", material.as_str(), box_price.base_cost);
    }
    trace.push(
        "factor",
        format!("surface_area({}) / {}", dimensions.surface_area(), pricing::BASE_AREA_CM2),
        box_price.factor,
    );
    trace.push(
        "box",
        format!("{box_type} {material}: base({}) * factor * quantity", box_price.base_cost),
        box_price.total_price,
    );

    let factor = box_price.factor;
    let inner_breakdown =
        price_inner_with_trace(catalog, record.inner.as_ref(), factor, quantity, &mut trace);
    let features_breakdown = price_special_features_with_trace(
        catalog,
        record.special_features.as_ref(),
        factor,
        quantity,
        &mut trace,
    );

    let inner_total = inner_breakdown.total;
    let features_total = features_breakdown.total;
    let grand_total = box_price.total_price + inner_total + features_total;
    let price_per_unit = grand_total / Decimal::from(quantity);
    trace.push("grand_total", "box + inner + features", grand_total);

    Ok(Quotation {
        product_type: record.product_type.clone(),
        box_type,
        material,
        dimensions,
        quantity,
        inner: record.inner.clone(),
        special_features: record.special_features.clone(),
        pricing: QuotationPricing {
            currency: catalog.currency.to_string(),
            factor,
            box_price_per_unit: box_price.price_per_box,
            box_total: box_price.total_price,
            inner_breakdown,
            inner_total,
            features_breakdown,
            features_total,
            grand_total,
            price_per_unit,
            trace,
        },
    })
}
