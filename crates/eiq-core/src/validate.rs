//! Record validation state machine.
//!
//! A record always lands in exactly one of the five [`ValidationState`]s,
//! decided by the first failing tier: incompleteness, then data validity,
//! then product resolution, then EIQ-data availability. Issues accumulate
//! through the deciding tier, so a record can carry the soft rate warning
//! alongside the error that decided its state. The validator never panics
//! and never returns `Err`: every input resolves to a defined state plus a
//! diagnostic trail.

use crate::catalog::ProductLookup;
use crate::{ApplicationRecord, Severity, ValidationIssue, ValidationResult, ValidationState};

/// Rates above this are flagged as probable data-entry typos. Soft warning
/// only; it never downgrades the state on its own.
pub const RATE_WARNING_THRESHOLD: f64 = 10_000.0;

/// Validate one application record against the catalog.
///
/// Pure in its inputs: the state depends only on the record's current field
/// values and the catalog lookup outcome.
pub fn validate_record(
    record: &ApplicationRecord,
    catalog: &impl ProductLookup,
) -> ValidationResult {
    let mut issues = Vec::new();

    // Tier 1: incompleteness. A zero rate counts as not entered; a negative
    // rate is present-but-invalid and falls through to tier 2.
    if record.product_name.trim().is_empty() {
        issues.push(ValidationIssue::error(
            "product_name",
            "Product name is required",
        ));
    }
    if record.rate.map_or(true, |r| r == 0.0) {
        issues.push(ValidationIssue::error("rate", "Application rate is required"));
    }
    if record
        .rate_unit
        .as_ref()
        .map_or(true, |u| u.label().trim().is_empty())
    {
        issues.push(ValidationIssue::error("rate_unit", "Rate unit is required"));
    }
    if !issues.is_empty() {
        return ValidationResult::new(ValidationState::Incomplete, issues, false);
    }

    // Tier 2: data validity. Only error-severity issues force InvalidData.
    let rate = record.rate.unwrap_or(0.0);
    if !rate.is_finite() {
        issues.push(ValidationIssue::error(
            "rate",
            "Application rate is not a number",
        ));
    } else if rate < 0.0 {
        issues.push(ValidationIssue::error(
            "rate",
            "Application rate cannot be negative",
        ));
    } else if rate > RATE_WARNING_THRESHOLD {
        issues.push(ValidationIssue::warning(
            "rate",
            format!("Application rate {rate} is unusually high; check for a data-entry error"),
        ));
    }
    if let Some(area) = record.area {
        if !area.is_finite() {
            issues.push(ValidationIssue::error(
                "area",
                "Application area is not a number",
            ));
        } else if area < 0.0 {
            issues.push(ValidationIssue::error(
                "area",
                "Application area cannot be negative",
            ));
        }
    }
    if issues.iter().any(|i| i.severity == Severity::Error) {
        return ValidationResult::new(ValidationState::InvalidData, issues, false);
    }

    // Tier 3: product resolution.
    let Some(product) = catalog.resolve(&record.product_name) else {
        issues.push(ValidationIssue::error(
            "product_name",
            format!("Product '{}' not found in catalog", record.product_name),
        ));
        return ValidationResult::new(ValidationState::InvalidProduct, issues, false);
    };

    // Tier 4: structurally sound and resolved. Adjuvants and biologicals are
    // valid with a zero contribution and must not attract an estimate.
    if product.is_eiq_exempt() {
        issues.push(ValidationIssue::info(
            "status",
            "Adjuvant or biological product - excluded from EIQ totals",
        ));
        return ValidationResult::new(ValidationState::Valid, issues, true);
    }

    if product.has_usable_eiq_data() {
        ValidationResult::new(ValidationState::Valid, issues, true)
    } else {
        issues.push(ValidationIssue::info(
            "eiq",
            "Field EIQ will be estimated (product lacks ingredient EIQ data)",
        ));
        ValidationResult::new(ValidationState::ValidEstimated, issues, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        ActiveIngredientContribution, MemoryCatalog, ProductSnapshot, ProductType,
    };
    use crate::units::{ConcentrationUnit, RateUnit};
    use crate::{RecordDraft, RecordId};

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::from_products([
            ProductSnapshot {
                name: "Herbicide-X".to_string(),
                product_type: ProductType::Herbicide,
                ingredients: vec![ActiveIngredientContribution {
                    name: "active-a".to_string(),
                    eiq_per_lb: Some(30.0),
                    concentration: Some(50.0),
                    concentration_unit: ConcentrationUnit::Percent,
                }],
            },
            ProductSnapshot {
                name: "Mystery-Mix".to_string(),
                product_type: ProductType::Insecticide,
                ingredients: vec![ActiveIngredientContribution {
                    name: "unlisted".to_string(),
                    eiq_per_lb: None,
                    concentration: Some(10.0),
                    concentration_unit: ConcentrationUnit::Percent,
                }],
            },
            ProductSnapshot {
                name: "Sticker".to_string(),
                product_type: ProductType::Adjuvant,
                ingredients: vec![],
            },
        ])
    }

    fn record(name: &str, rate: Option<f64>, unit: Option<RateUnit>) -> ApplicationRecord {
        ApplicationRecord::from_draft(
            RecordId(1),
            RecordDraft {
                product_name: name.to_string(),
                rate,
                rate_unit: unit,
                ..RecordDraft::default()
            },
        )
    }

    #[test]
    fn empty_record_is_incomplete_with_three_issues() {
        let rec = record("", Some(0.0), None);
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::Incomplete);
        assert_eq!(result.issues.len(), 3);
        assert!(!result.can_calculate_eiq);
        let fields: Vec<&str> = result.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, ["product_name", "rate", "rate_unit"]);
    }

    #[test]
    fn missing_rate_alone_is_incomplete() {
        let rec = record("Herbicide-X", None, Some(RateUnit::LbsPerAcre));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::Incomplete);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].field, "rate");
    }

    #[test]
    fn negative_rate_is_invalid_data() {
        let rec = record("Herbicide-X", Some(-5.0), Some(RateUnit::LbsPerAcre));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::InvalidData);
        assert!(!result.can_calculate_eiq);
        assert!(result
            .issues
            .iter()
            .any(|i| i.field == "rate" && i.severity == Severity::Error));
    }

    #[test]
    fn negative_area_accumulates_with_negative_rate() {
        let mut rec = record("Herbicide-X", Some(-1.0), Some(RateUnit::LbsPerAcre));
        rec.area = Some(-40.0);
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::InvalidData);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn huge_rate_warns_but_stays_valid() {
        let rec = record("Herbicide-X", Some(20_000.0), Some(RateUnit::LbsPerAcre));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::Valid);
        assert!(result.can_calculate_eiq);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Warning);
    }

    #[test]
    fn unknown_product_is_invalid_product() {
        let rec = record("No-Such-Product", Some(2.0), Some(RateUnit::LbsPerAcre));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::InvalidProduct);
        assert!(!result.can_calculate_eiq);
        assert_eq!(result.issues[0].field, "product_name");
    }

    #[test]
    fn warning_survives_into_later_deciding_tier() {
        let rec = record("No-Such-Product", Some(20_000.0), Some(RateUnit::LbsPerAcre));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::InvalidProduct);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].severity, Severity::Warning);
        assert_eq!(result.issues[1].severity, Severity::Error);
    }

    #[test]
    fn resolvable_product_with_data_is_valid() {
        let rec = record("Herbicide-X", Some(2.0), Some(RateUnit::LbsPerAcre));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::Valid);
        assert!(result.can_calculate_eiq);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn missing_ingredient_data_means_estimated() {
        let rec = record("Mystery-Mix", Some(1.0), Some(RateUnit::LPerHa));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::ValidEstimated);
        assert!(result.can_calculate_eiq);
        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Info && i.field == "eiq"));
    }

    #[test]
    fn adjuvant_is_valid_not_estimated() {
        let rec = record("Sticker", Some(1.0), Some(RateUnit::PtPerAcre));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::Valid);
        assert!(result.can_calculate_eiq);
        assert!(result.issues.iter().any(|i| i.severity == Severity::Info));
    }

    #[test]
    fn unrecognized_rate_unit_is_still_complete() {
        let rec = record(
            "Herbicide-X",
            Some(2.0),
            Some(RateUnit::Unknown("fl oz/cwt".to_string())),
        );
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::Valid);
    }

    #[test]
    fn nan_rate_is_invalid_data_not_a_panic() {
        let rec = record("Herbicide-X", Some(f64::NAN), Some(RateUnit::LbsPerAcre));
        let result = validate_record(&rec, &catalog());
        assert_eq!(result.state, ValidationState::InvalidData);
    }
}
