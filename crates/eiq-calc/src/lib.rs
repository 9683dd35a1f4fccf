#![deny(warnings)]

//! Pure Field EIQ math.
//!
//! Field EIQ adjusts a published per-pound EIQ score for real application
//! conditions: the active-ingredient concentration fraction and the applied
//! mass per unit area. Everything here is a plain function of standardized
//! inputs; unit handling lives in `eiq_core::units` and partial catalog data
//! is skipped, never propagated as an error.

use eiq_core::catalog::ActiveIngredientContribution;
use eiq_core::units::{canonical_rate, concentration_fraction, RateUnit};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Conservative Field EIQ assumed when estimation has no siblings to average.
pub const DEFAULT_ESTIMATED_FIELD_EIQ: f64 = 30.0;

/// Field EIQ values at or above this are fumigation-scale outliers and are
/// kept out of the estimation pool so one fumigation cannot dominate the mean.
pub const ESTIMATION_POOL_CUTOFF: f64 = 1_000.0;

/// Field EIQ contribution of a single active ingredient.
///
/// `eiq_per_lb × (concentration% / 100) × canonical_rate × applications`.
/// A missing rate yields zero; a zero rate or concentration is a legitimate
/// zero contribution, not an error.
pub fn field_eiq_for_ingredient(
    eiq_per_lb: f64,
    concentration_percent: f64,
    rate: Option<f64>,
    rate_unit: &RateUnit,
    applications: u32,
) -> f64 {
    let Some(rate) = canonical_rate(rate, rate_unit) else {
        return 0.0;
    };
    let value = eiq_per_lb * (concentration_percent / 100.0) * rate * f64::from(applications);
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One ingredient's share of a record's Field EIQ, for detail views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientShare {
    pub name: String,
    pub field_eiq: f64,
}

/// Per-ingredient Field EIQ breakdown for a record.
///
/// Ingredients with missing or non-finite EIQ or concentration data are
/// skipped so that one malformed catalog row cannot zero out or abort a
/// multi-ingredient product. Zero usable ingredients produce an empty
/// breakdown, never an error.
pub fn field_eiq_breakdown(
    ingredients: &[ActiveIngredientContribution],
    rate: Option<f64>,
    rate_unit: &RateUnit,
    applications: u32,
) -> Vec<IngredientShare> {
    let mut shares = Vec::with_capacity(ingredients.len());
    for ai in ingredients {
        if !ai.is_usable() {
            debug!(ingredient = ai.name.as_str(), "skipping ingredient without usable EIQ data");
            continue;
        }
        let fraction = match concentration_fraction(ai.concentration, &ai.concentration_unit) {
            Some(f) => f,
            None => continue,
        };
        let eiq = ai.eiq_per_lb.unwrap_or(0.0);
        shares.push(IngredientShare {
            name: ai.name.clone(),
            field_eiq: field_eiq_for_ingredient(eiq, fraction * 100.0, rate, rate_unit, applications),
        });
    }
    shares
}

/// Total Field EIQ for a record: the sum over its usable ingredients.
pub fn field_eiq_for_record(
    ingredients: &[ActiveIngredientContribution],
    rate: Option<f64>,
    rate_unit: &RateUnit,
    applications: u32,
) -> f64 {
    field_eiq_breakdown(ingredients, rate, rate_unit, applications)
        .iter()
        .map(|s| s.field_eiq)
        .sum()
}

/// True when a computed Field EIQ may seed the estimation pool.
pub fn qualifies_for_estimation_pool(field_eiq: f64) -> bool {
    field_eiq.is_finite() && field_eiq > 0.0 && field_eiq < ESTIMATION_POOL_CUTOFF
}

/// Arithmetic mean of the pool, or [`DEFAULT_ESTIMATED_FIELD_EIQ`] when the
/// pool is empty.
pub fn estimate_from_pool(pool: &[f64]) -> f64 {
    if pool.is_empty() {
        return DEFAULT_ESTIMATED_FIELD_EIQ;
    }
    pool.iter().sum::<f64>() / pool.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use eiq_core::units::ConcentrationUnit;
    use proptest::prelude::*;

    fn ai(name: &str, eiq: Option<f64>, pct: Option<f64>) -> ActiveIngredientContribution {
        ActiveIngredientContribution {
            name: name.to_string(),
            eiq_per_lb: eiq,
            concentration: pct,
            concentration_unit: ConcentrationUnit::Percent,
        }
    }

    #[test]
    fn worked_example_from_label_data() {
        // 30 EIQ/lb at 50% concentration, 2 lbs/acre, one application.
        let v = field_eiq_for_ingredient(30.0, 50.0, Some(2.0), &RateUnit::LbsPerAcre, 1);
        assert!((v - 30.0).abs() < 1e-12);

        let total = field_eiq_for_record(
            &[ai("active-a", Some(30.0), Some(50.0))],
            Some(2.0),
            &RateUnit::LbsPerAcre,
            1,
        );
        assert!((total - 30.0).abs() < 1e-12);
    }

    #[test]
    fn empty_ingredient_list_is_zero() {
        assert_eq!(
            field_eiq_for_record(&[], Some(2.0), &RateUnit::LbsPerAcre, 1),
            0.0
        );
    }

    #[test]
    fn malformed_ingredient_is_skipped_not_fatal() {
        let total = field_eiq_for_record(
            &[
                ai("good", Some(30.0), Some(50.0)),
                ai("no-eiq", None, Some(10.0)),
                ai("no-conc", Some(12.0), None),
                ai("nan", Some(f64::NAN), Some(5.0)),
            ],
            Some(2.0),
            &RateUnit::LbsPerAcre,
            1,
        );
        assert!((total - 30.0).abs() < 1e-12);
    }

    #[test]
    fn zero_usable_ingredients_is_zero_not_an_error() {
        let total = field_eiq_for_record(
            &[ai("a", None, None), ai("b", None, Some(3.0))],
            Some(2.0),
            &RateUnit::LbsPerAcre,
            3,
        );
        assert_eq!(total, 0.0);
    }

    #[test]
    fn missing_rate_yields_zero() {
        assert_eq!(
            field_eiq_for_ingredient(30.0, 50.0, None, &RateUnit::LbsPerAcre, 1),
            0.0
        );
    }

    #[test]
    fn applications_scale_linearly() {
        let one = field_eiq_for_ingredient(30.0, 50.0, Some(2.0), &RateUnit::LbsPerAcre, 1);
        let three = field_eiq_for_ingredient(30.0, 50.0, Some(2.0), &RateUnit::LbsPerAcre, 3);
        assert!((three - 3.0 * one).abs() < 1e-12);
    }

    #[test]
    fn breakdown_lists_usable_ingredients_only() {
        let shares = field_eiq_breakdown(
            &[ai("good", Some(20.0), Some(25.0)), ai("bad", None, None)],
            Some(1.0),
            &RateUnit::LbsPerAcre,
            1,
        );
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].name, "good");
        assert!((shares[0].field_eiq - 5.0).abs() < 1e-12);
    }

    #[test]
    fn non_percent_concentration_units_are_standardized() {
        let mut gl = ai("liquid", Some(10.0), Some(500.0));
        gl.concentration_unit = ConcentrationUnit::GramsPerLiter;
        // 500 g/l is a 0.5 fraction under density 1.
        let total = field_eiq_for_record(&[gl], Some(1.0), &RateUnit::LbsPerAcre, 1);
        assert!((total - 5.0).abs() < 1e-12);
    }

    #[test]
    fn estimation_mean_and_default() {
        assert_eq!(estimate_from_pool(&[]), DEFAULT_ESTIMATED_FIELD_EIQ);
        assert!((estimate_from_pool(&[10.0, 20.0, 60.0]) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn estimation_pool_membership() {
        assert!(qualifies_for_estimation_pool(42.0));
        assert!(!qualifies_for_estimation_pool(0.0));
        assert!(!qualifies_for_estimation_pool(-1.0));
        assert!(!qualifies_for_estimation_pool(ESTIMATION_POOL_CUTOFF));
        assert!(!qualifies_for_estimation_pool(f64::NAN));
    }

    proptest! {
        #[test]
        fn record_total_is_order_invariant(
            eiqs in proptest::collection::vec((1.0f64..100.0, 1.0f64..100.0), 1..6),
            rate in 0.1f64..50.0,
        ) {
            let ingredients: Vec<_> = eiqs
                .iter()
                .enumerate()
                .map(|(i, (e, p))| ai(&format!("ai-{i}"), Some(*e), Some(*p)))
                .collect();
            let mut reversed = ingredients.clone();
            reversed.reverse();
            let a = field_eiq_for_record(&ingredients, Some(rate), &RateUnit::LbsPerAcre, 1);
            let b = field_eiq_for_record(&reversed, Some(rate), &RateUnit::LbsPerAcre, 1);
            prop_assert!((a - b).abs() < 1e-9 * a.abs().max(1.0));
        }

        #[test]
        fn contributions_are_nonnegative(
            eiq in 0.0f64..200.0,
            pct in 0.0f64..100.0,
            rate in 0.0f64..100.0,
            apps in 1u32..5,
        ) {
            let v = field_eiq_for_ingredient(eiq, pct, Some(rate), &RateUnit::KgPerHa, apps);
            prop_assert!(v >= 0.0);
        }
    }
}
