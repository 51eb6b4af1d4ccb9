use lumopack_core::cpq::catalog::PriceCatalog;
use lumopack_core::structural::{flute_catalog, FluteSpec};
use serde::Serialize;
use std::collections::BTreeMap;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct CatalogDump {
    prices: &'static PriceCatalog,
    flutes: &'static BTreeMap<&'static str, FluteSpec>,
}

pub fn run() -> CommandResult {
    let dump = CatalogDump { prices: PriceCatalog::standard(), flutes: flute_catalog() };
    let message = format!(
        "{} catalog: {} material rules, {} flutes",
        dump.prices.currency,
        dump.prices.materials.len(),
        dump.flutes.len()
    );
    CommandResult::success_with_data("catalog", message, &dump)
}
