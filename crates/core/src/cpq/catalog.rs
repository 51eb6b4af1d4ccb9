//! Static price tables for boxes, inner packaging and finishing.
//!
//! Every entry is a `{min, max}` range and pricing always uses the midpoint.
//! Lookups that may substitute a default return [`Lookup`] so callers can
//! tell an exact hit from a fallback.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::product::{normalize_key, BoxType, ProductType};

pub const GENERIC_MATERIAL: &str = "corrugated_standard";
pub const DEFAULT_EMBOSS_KIND: &str = "emboss";

/// Outcome of a catalog lookup that never fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    FallbackUsed(T),
}

impl<T> Lookup<T> {
    pub fn value(self) -> T {
        match self {
            Self::Found(value) | Self::FallbackUsed(value) => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::FallbackUsed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::FallbackUsed(value) => Lookup::FallbackUsed(f(value)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
    pub unit: &'static str,
}

impl PriceRange {
    fn new(min: Decimal, max: Decimal, unit: &'static str) -> Self {
        Self { min, max, unit }
    }

    pub fn midpoint(&self) -> Decimal {
        (self.min + self.max) / Decimal::from(2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CushioningPrice {
    #[serde(flatten)]
    pub price: PriceRange,
    pub kg_per_box: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BoxPriceTable {
    pub generic: PriceRange,
    pub materials: BTreeMap<String, PriceRange>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MaterialRule {
    pub product_type: ProductType,
    /// `None` applies the rule to every box type.
    pub box_type: Option<BoxType>,
    pub material: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmbossPricing {
    pub block: PriceRange,
    pub per_box: BTreeMap<String, PriceRange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FoilTier {
    Base,
    Detail,
    Embossed,
}

impl FoilTier {
    /// Picks the per-unit tier from the wording of a foil type.
    pub fn classify(kind: &str) -> Self {
        let kind = kind.to_lowercase();
        if kind.contains("emboss") {
            Self::Embossed
        } else if kind.contains("fine") || kind.contains("large") {
            Self::Detail
        } else {
            Self::Base
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FoilPricing {
    pub block: BTreeMap<String, PriceRange>,
    pub block_fallback: Decimal,
    pub per_unit: BTreeMap<FoilTier, PriceRange>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriceCatalog {
    pub currency: &'static str,
    pub rsc: BoxPriceTable,
    pub die_cut: BoxPriceTable,
    pub materials: Vec<MaterialRule>,
    pub cushioning: BTreeMap<String, CushioningPrice>,
    pub moisture_coating: BTreeMap<String, PriceRange>,
    pub food_coating: BTreeMap<String, PriceRange>,
    pub gloss_coating: BTreeMap<String, PriceRange>,
    pub matte_coating: BTreeMap<String, PriceRange>,
    pub emboss: EmbossPricing,
    pub foil: FoilPricing,
}

static STANDARD_CATALOG: OnceLock<PriceCatalog> = OnceLock::new();

impl PriceCatalog {
    /// Process-wide catalog, built once and never mutated.
    pub fn standard() -> &'static PriceCatalog {
        STANDARD_CATALOG.get_or_init(build_standard_catalog)
    }

    pub fn box_table(&self, box_type: BoxType) -> &BoxPriceTable {
        match box_type {
            BoxType::Rsc => &self.rsc,
            BoxType::DieCut => &self.die_cut,
        }
    }

    /// Base unit cost of the reference-size box. Unknown materials use the
    /// generic corrugated entry of the same box type.
    pub fn base_box_cost(&self, box_type: BoxType, material: &str) -> Lookup<&PriceRange> {
        let table = self.box_table(box_type);
        let key = normalize_key(material);
        if key == GENERIC_MATERIAL {
            return Lookup::Found(&table.generic);
        }
        match table.materials.get(&key) {
            Some(range) => Lookup::Found(range),
            None => Lookup::FallbackUsed(&table.generic),
        }
    }

    pub fn material_for(
        &self,
        product_type: Option<&ProductType>,
        box_type: BoxType,
    ) -> Lookup<&str> {
        let rule = product_type.and_then(|product_type| {
            self.materials.iter().find(|rule| {
                &rule.product_type == product_type
                    && rule.box_type.map_or(true, |rule_box| rule_box == box_type)
            })
        });

        match rule {
            Some(rule) => Lookup::Found(rule.material.as_str()),
            None => Lookup::FallbackUsed(GENERIC_MATERIAL),
        }
    }

    pub fn cushioning(&self, name: &str) -> Option<&CushioningPrice> {
        self.cushioning.get(&normalize_key(name))
    }

    pub fn moisture_coating(&self, name: &str) -> Option<&PriceRange> {
        self.moisture_coating.get(&normalize_key(name))
    }

    pub fn food_coating(&self, name: &str) -> Option<&PriceRange> {
        self.food_coating.get(&normalize_key(name))
    }

    pub fn gloss_coating(&self, name: &str) -> Option<&PriceRange> {
        self.gloss_coating.get(&normalize_key(name))
    }

    pub fn matte_coating(&self, name: &str) -> Option<&PriceRange> {
        self.matte_coating.get(&normalize_key(name))
    }

    pub fn emboss_block_cost(&self) -> Decimal {
        self.emboss.block.midpoint()
    }

    /// Per-box emboss rate; unknown emboss styles are charged as plain emboss.
    pub fn emboss_rate(&self, kind: &str) -> Lookup<Decimal> {
        if let Some(range) = self.emboss.per_box.get(&normalize_key(kind)) {
            return Lookup::Found(range.midpoint());
        }
        let fallback = self
            .emboss
            .per_box
            .get(DEFAULT_EMBOSS_KIND)
            .map(PriceRange::midpoint)
            .unwrap_or(Decimal::ZERO);
        Lookup::FallbackUsed(fallback)
    }

    /// Foil block cost by exact type name, with a flat fallback price.
    pub fn foil_block_cost(&self, kind: &str) -> Lookup<Decimal> {
        match self.foil.block.get(kind) {
            Some(range) => Lookup::Found(range.midpoint()),
            None => Lookup::FallbackUsed(self.foil.block_fallback),
        }
    }

    pub fn foil_unit_rate(&self, tier: FoilTier) -> Decimal {
        self.foil.per_unit.get(&tier).map(PriceRange::midpoint).unwrap_or(Decimal::ZERO)
    }

    /// Inverted or non-positive ranges and material rules that no box table
    /// can price. Empty for a healthy catalog.
    pub fn integrity_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut check = |name: String, range: &PriceRange| {
            if range.min <= Decimal::ZERO || range.min > range.max {
                issues.push(format!("{name}: invalid range {}..{}", range.min, range.max));
            }
        };

        for (label, table) in [("rsc", &self.rsc), ("die_cut", &self.die_cut)] {
            check(format!("{label}.generic"), &table.generic);
            for (material, range) in &table.materials {
                check(format!("{label}.{material}"), range);
            }
        }
        for (name, price) in &self.cushioning {
            check(format!("cushioning.{name}"), &price.price);
        }
        let coatings = [
            ("moisture_coating", &self.moisture_coating),
            ("food_coating", &self.food_coating),
            ("gloss_coating", &self.gloss_coating),
            ("matte_coating", &self.matte_coating),
            ("emboss.per_box", &self.emboss.per_box),
            ("foil.block", &self.foil.block),
        ];
        for (label, entries) in coatings {
            for (name, range) in entries {
                check(format!("{label}.{name}"), range);
            }
        }
        check("emboss.block".to_string(), &self.emboss.block);
        for (tier, range) in &self.foil.per_unit {
            check(format!("foil.per_unit.{tier:?}"), range);
        }

        for rule in &self.materials {
            for box_type in [BoxType::Rsc, BoxType::DieCut] {
                let applies = rule.box_type.map_or(true, |rule_box| rule_box == box_type);
                if applies && self.base_box_cost(box_type, &rule.material).is_fallback() {
                    issues.push(format!(
                        "material `{}` for {} has no {} price",
                        rule.material,
                        rule.product_type.as_str(),
                        box_type
                    ));
                }
            }
        }

        issues
    }
}

const PER_BOX: &str = "THB/box";
const PER_KG: &str = "THB/kg";
const PER_BLOCK: &str = "THB/block";

fn thb(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn range(min_cents: i64, max_cents: i64, unit: &'static str) -> PriceRange {
    PriceRange::new(thb(min_cents), thb(max_cents), unit)
}

fn table<V>(entries: impl IntoIterator<Item = (&'static str, V)>) -> BTreeMap<String, V> {
    entries.into_iter().map(|(name, value)| (name.to_string(), value)).collect()
}

fn cushioning(min_cents: i64, max_cents: i64, grams_per_box: i64) -> CushioningPrice {
    CushioningPrice {
        price: range(min_cents, max_cents, PER_KG),
        kg_per_box: Decimal::new(grams_per_box, 3),
    }
}

fn material_rule(product_type: ProductType, material: &str) -> MaterialRule {
    MaterialRule { product_type, box_type: None, material: material.to_string() }
}

fn build_standard_catalog() -> PriceCatalog {
    PriceCatalog {
        currency: "THB",
        rsc: BoxPriceTable {
            generic: range(400, 600, PER_BOX),
            materials: table([
                ("corrugated_kraft", range(450, 650, PER_BOX)),
                ("corrugated_food_grade", range(600, 800, PER_BOX)),
                ("corrugated_white_coated", range(700, 900, PER_BOX)),
            ]),
        },
        die_cut: BoxPriceTable {
            generic: range(600, 900, PER_BOX),
            materials: table([
                ("corrugated_kraft", range(650, 950, PER_BOX)),
                ("corrugated_food_grade", range(800, 1_100, PER_BOX)),
                ("corrugated_white_coated", range(900, 1_200, PER_BOX)),
            ]),
        },
        materials: vec![
            material_rule(ProductType::General, GENERIC_MATERIAL),
            material_rule(ProductType::NonFood, "corrugated_kraft"),
            material_rule(ProductType::FoodGrade, "corrugated_food_grade"),
            material_rule(ProductType::Cosmetics, "corrugated_white_coated"),
        ],
        cushioning: table([
            ("shredded_paper", cushioning(4_000, 6_000, 50)),
            ("bubble_wrap", cushioning(9_000, 13_000, 30)),
            ("air_pillow", cushioning(15_000, 21_000, 10)),
        ]),
        moisture_coating: table([
            ("water_based_barrier", range(40, 60, PER_BOX)),
            ("wax_coating", range(80, 120, PER_BOX)),
        ]),
        food_coating: table([
            ("pe_coating", range(100, 140, PER_BOX)),
            ("food_safe_varnish", range(60, 90, PER_BOX)),
        ]),
        gloss_coating: table([
            ("gloss_varnish", range(30, 50, PER_BOX)),
            ("gloss_uv", range(60, 90, PER_BOX)),
            ("gloss_lamination", range(150, 210, PER_BOX)),
        ]),
        matte_coating: table([
            ("matte_varnish", range(35, 55, PER_BOX)),
            ("matte_lamination", range(170, 230, PER_BOX)),
        ]),
        emboss: EmbossPricing {
            block: range(150_000, 250_000, PER_BLOCK),
            per_box: table([
                (DEFAULT_EMBOSS_KIND, range(50, 90, PER_BOX)),
                ("deboss", range(50, 90, PER_BOX)),
                ("multi_level_emboss", range(120, 180, PER_BOX)),
            ]),
        },
        foil: FoilPricing {
            block: table([
                ("standard_foil", range(100_000, 200_000, PER_BLOCK)),
                ("fine_detail_foil", range(200_000, 300_000, PER_BLOCK)),
                ("large_pattern_foil", range(250_000, 350_000, PER_BLOCK)),
                ("embossed_foil", range(350_000, 450_000, PER_BLOCK)),
            ]),
            block_fallback: thb(150_000),
            per_unit: [
                (FoilTier::Base, range(60, 100, PER_BOX)),
                (FoilTier::Detail, range(100, 140, PER_BOX)),
                (FoilTier::Embossed, range(160, 240, PER_BOX)),
            ]
            .into_iter()
            .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{FoilTier, Lookup, PriceCatalog, GENERIC_MATERIAL};
    use crate::domain::product::{BoxType, ProductType};

    #[test]
    fn standard_catalog_is_consistent() {
        assert_eq!(PriceCatalog::standard().integrity_issues(), Vec::<String>::new());
    }

    #[test]
    fn integrity_check_reports_inverted_ranges_and_orphan_materials() {
        let mut catalog = PriceCatalog::standard().clone();
        catalog.gloss_coating.get_mut("gloss_uv").expect("gloss_uv").min = Decimal::from(5);
        catalog.materials[1].material = "corrugated_bamboo".to_string();

        let issues = catalog.integrity_issues();

        assert!(issues.iter().any(|issue| issue.starts_with("gloss_coating.gloss_uv")));
        assert!(issues.iter().any(|issue| issue.contains("corrugated_bamboo")));
    }

    #[test]
    fn midpoint_is_used_for_every_range() {
        let catalog = PriceCatalog::standard();
        assert_eq!(catalog.rsc.generic.midpoint(), Decimal::new(500, 2));
        assert_eq!(catalog.emboss_block_cost(), Decimal::from(2_000));
    }

    #[test]
    fn base_cost_hit_and_fallback_are_distinguishable() {
        let catalog = PriceCatalog::standard();

        let hit = catalog.base_box_cost(BoxType::DieCut, "corrugated_kraft");
        assert!(!hit.is_fallback());
        assert_eq!(hit.value().midpoint(), Decimal::from(8));

        let miss = catalog.base_box_cost(BoxType::DieCut, "unobtainium");
        assert!(miss.is_fallback());
        assert_eq!(miss.value(), &catalog.die_cut.generic);

        let generic = catalog.base_box_cost(BoxType::Rsc, GENERIC_MATERIAL);
        assert_eq!(generic, Lookup::Found(&catalog.rsc.generic));
    }

    #[test]
    fn material_mapping_falls_back_to_generic_board() {
        let catalog = PriceCatalog::standard();

        assert_eq!(
            catalog.material_for(Some(&ProductType::FoodGrade), BoxType::Rsc),
            Lookup::Found("corrugated_food_grade")
        );
        assert_eq!(
            catalog.material_for(Some(&ProductType::Other("furniture".to_string())), BoxType::Rsc),
            Lookup::FallbackUsed(GENERIC_MATERIAL)
        );
        assert_eq!(catalog.material_for(None, BoxType::DieCut), Lookup::FallbackUsed(GENERIC_MATERIAL));
    }

    #[test]
    fn foil_block_lookup_is_verbatim_with_flat_fallback() {
        let catalog = PriceCatalog::standard();

        assert_eq!(catalog.foil_block_cost("fine_detail_foil"), Lookup::Found(Decimal::from(2_500)));
        assert_eq!(
            catalog.foil_block_cost("Fine Detail Foil"),
            Lookup::FallbackUsed(Decimal::from(1_500))
        );
    }

    #[test]
    fn foil_tier_follows_type_wording() {
        assert_eq!(FoilTier::classify("embossed_foil"), FoilTier::Embossed);
        assert_eq!(FoilTier::classify("Fine detail gold"), FoilTier::Detail);
        assert_eq!(FoilTier::classify("large_pattern_foil"), FoilTier::Detail);
        assert_eq!(FoilTier::classify("standard_foil"), FoilTier::Base);
    }

    #[test]
    fn unknown_emboss_style_uses_plain_emboss_rate() {
        let catalog = PriceCatalog::standard();
        assert_eq!(catalog.emboss_rate("deboss"), Lookup::Found(Decimal::new(70, 2)));
        assert_eq!(catalog.emboss_rate("laser"), Lookup::FallbackUsed(Decimal::new(70, 2)));
    }

    #[test]
    fn catalog_dump_contains_every_table() {
        let dump = serde_json::to_value(PriceCatalog::standard()).expect("serialize");
        for key in [
            "rsc",
            "die_cut",
            "materials",
            "cushioning",
            "moisture_coating",
            "food_coating",
            "gloss_coating",
            "matte_coating",
            "emboss",
            "foil",
        ] {
            assert!(dump.get(key).is_some(), "missing table {key}");
        }
        assert_eq!(dump["cushioning"]["bubble_wrap"]["unit"], "THB/kg");
        assert!(dump["foil"]["per_unit"].get("embossed").is_some());
    }
}
