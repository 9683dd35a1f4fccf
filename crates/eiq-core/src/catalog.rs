//! Product catalog interface.
//!
//! The calculation core never reaches into a repository singleton: everything
//! it needs from the catalog arrives through the [`ProductLookup`] capability,
//! which returns an immutable [`ProductSnapshot`] per product name. A simple
//! in-memory implementation ships here for tests and the CLI.

use crate::units::ConcentrationUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One active ingredient's share of a product, snapshotted from the catalog
/// at calculation time.
///
/// `Option` fields model missing or unparseable catalog cells (the source
/// data stores `"--"` placeholders); a `None` never fails a calculation, the
/// ingredient is simply skipped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveIngredientContribution {
    pub name: String,
    /// Published EIQ score per pound of this active ingredient.
    pub eiq_per_lb: Option<f64>,
    /// Concentration of this ingredient in the product, in `concentration_unit`.
    pub concentration: Option<f64>,
    #[serde(default = "percent")]
    pub concentration_unit: ConcentrationUnit,
}

fn percent() -> ConcentrationUnit {
    ConcentrationUnit::Percent
}

impl ActiveIngredientContribution {
    /// True when both the EIQ score and the concentration are present and
    /// finite, i.e. this ingredient can contribute to a real calculation.
    pub fn is_usable(&self) -> bool {
        matches!(self.eiq_per_lb, Some(e) if e.is_finite())
            && matches!(self.concentration, Some(c) if c.is_finite())
    }
}

/// Product category; adjuvants and biologicals are exempt from EIQ totals.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    Herbicide,
    Insecticide,
    Fungicide,
    Adjuvant,
    Biological,
    Other(String),
}

impl ProductType {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "herbicide" => ProductType::Herbicide,
            "insecticide" => ProductType::Insecticide,
            "fungicide" => ProductType::Fungicide,
            "adjuvant" => ProductType::Adjuvant,
            "biological" => ProductType::Biological,
            _ => ProductType::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ProductType::Herbicide => "Herbicide",
            ProductType::Insecticide => "Insecticide",
            ProductType::Fungicide => "Fungicide",
            ProductType::Adjuvant => "Adjuvant",
            ProductType::Biological => "Biological",
            ProductType::Other(s) => s,
        }
    }
}

impl From<String> for ProductType {
    fn from(s: String) -> Self {
        ProductType::from_label(&s)
    }
}

impl From<ProductType> for String {
    fn from(t: ProductType) -> Self {
        t.label().to_string()
    }
}

/// Immutable per-product snapshot handed to the calculation core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub product_type: ProductType,
    #[serde(default)]
    pub ingredients: Vec<ActiveIngredientContribution>,
}

impl ProductSnapshot {
    /// True when at least one ingredient carries real EIQ data; products
    /// without any fall back to estimation.
    pub fn has_usable_eiq_data(&self) -> bool {
        self.ingredients.iter().any(|ai| ai.is_usable())
    }

    /// Adjuvant and biological products never contribute to EIQ totals.
    pub fn is_eiq_exempt(&self) -> bool {
        matches!(
            self.product_type,
            ProductType::Adjuvant | ProductType::Biological
        )
    }
}

/// Injected catalog capability: resolve a product name to its snapshot.
///
/// A miss is an ordinary `None`, never an error; the validator turns it into
/// an `InvalidProduct` state.
pub trait ProductLookup {
    fn resolve(&self, name: &str) -> Option<ProductSnapshot>;
}

/// In-memory catalog keyed by product name. Backs tests and the CLI; the
/// desktop application injects its own repository-backed implementation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryCatalog {
    products: BTreeMap<String, ProductSnapshot>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products(products: impl IntoIterator<Item = ProductSnapshot>) -> Self {
        let mut catalog = Self::new();
        for p in products {
            catalog.insert(p);
        }
        catalog
    }

    pub fn insert(&mut self, product: ProductSnapshot) {
        self.products.insert(product.name.clone(), product);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductLookup for MemoryCatalog {
    fn resolve(&self, name: &str) -> Option<ProductSnapshot> {
        self.products.get(name.trim()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(eiq: Option<f64>, pct: Option<f64>) -> ActiveIngredientContribution {
        ActiveIngredientContribution {
            name: "glyphosate".to_string(),
            eiq_per_lb: eiq,
            concentration: pct,
            concentration_unit: ConcentrationUnit::Percent,
        }
    }

    #[test]
    fn usable_requires_both_fields_finite() {
        assert!(ingredient(Some(15.3), Some(41.0)).is_usable());
        assert!(!ingredient(None, Some(41.0)).is_usable());
        assert!(!ingredient(Some(15.3), None).is_usable());
        assert!(!ingredient(Some(f64::NAN), Some(41.0)).is_usable());
    }

    #[test]
    fn snapshot_usability_is_any_not_all() {
        let p = ProductSnapshot {
            name: "Mix".to_string(),
            product_type: ProductType::Herbicide,
            ingredients: vec![ingredient(None, None), ingredient(Some(20.0), Some(10.0))],
        };
        assert!(p.has_usable_eiq_data());
        assert!(!p.is_eiq_exempt());

        let empty = ProductSnapshot {
            name: "Mystery".to_string(),
            product_type: ProductType::Herbicide,
            ingredients: vec![],
        };
        assert!(!empty.has_usable_eiq_data());
    }

    #[test]
    fn adjuvants_and_biologicals_are_exempt() {
        for label in ["adjuvant", "Biological"] {
            let p = ProductSnapshot {
                name: "Helper".to_string(),
                product_type: ProductType::from_label(label),
                ingredients: vec![],
            };
            assert!(p.is_eiq_exempt(), "{label} should be exempt");
        }
    }

    #[test]
    fn memory_catalog_resolves_trimmed_names() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(ProductSnapshot {
            name: "Herbicide-X".to_string(),
            product_type: ProductType::Herbicide,
            ingredients: vec![ingredient(Some(30.0), Some(50.0))],
        });
        assert!(catalog.resolve("Herbicide-X").is_some());
        assert!(catalog.resolve(" Herbicide-X ").is_some());
        assert!(catalog.resolve("herbicide-x").is_none());
        assert!(catalog.resolve("Nope").is_none());
    }

    #[test]
    fn product_type_labels_round_trip() {
        let t: ProductType = serde_json::from_str("\"Sticker/Spreader\"").unwrap();
        assert_eq!(t, ProductType::Other("Sticker/Spreader".to_string()));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"Sticker/Spreader\"");
        assert_eq!(ProductType::from_label("FUNGICIDE"), ProductType::Fungicide);
    }
}
