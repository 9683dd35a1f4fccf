//! Display helpers for the UI and reporting layer.
//!
//! Pure string/color derivations from computed values and validation results;
//! no widget code here. Rounding to two decimals happens only at this layer.

use eiq_core::{ValidationResult, ValidationState};

/// Impact banding thresholds on the Field EIQ scale.
const MODERATE_IMPACT_FLOOR: f64 = 33.3;
const HIGH_IMPACT_FLOOR: f64 = 66.6;

/// Displayable Field EIQ string, two decimals per acre.
pub fn format_field_eiq(field_eiq: f64) -> String {
    if !(field_eiq.is_finite() && field_eiq > 0.0) {
        return "0.00 /ac".to_string();
    }
    format!("{field_eiq:.2} /ac")
}

/// Impact category label and background color hint for a Field EIQ value.
pub fn impact_category(field_eiq: f64) -> (&'static str, &'static str) {
    if field_eiq < MODERATE_IMPACT_FLOOR {
        ("Low Environmental Impact", "#E6F5E6")
    } else if field_eiq < HIGH_IMPACT_FLOOR {
        ("Moderate Environmental Impact", "#FFF5E6")
    } else {
        ("High Environmental Impact", "#F5E6E6")
    }
}

/// Row background color hint for a validation state.
pub fn state_color(state: ValidationState) -> &'static str {
    match state {
        ValidationState::Valid => "#E6F5E6",
        ValidationState::ValidEstimated => "#E6F0FA",
        ValidationState::InvalidProduct => "#F5E6E6",
        ValidationState::InvalidData => "#FDEBD0",
        ValidationState::Incomplete => "#F0F0F0",
    }
}

/// Compact status glyph and label for a validation state.
pub fn status_label(state: ValidationState) -> &'static str {
    match state {
        ValidationState::Valid => "\u{2713} Valid",
        ValidationState::ValidEstimated => "\u{2713} Valid (Est.)",
        ValidationState::InvalidProduct => "\u{2717} Invalid Product",
        ValidationState::InvalidData => "\u{26A0} Invalid Data",
        ValidationState::Incomplete => "\u{25EF} Incomplete",
    }
}

/// Status label with an issue count suffix for multi-issue problem states.
pub fn format_status(result: &ValidationResult) -> String {
    let base = status_label(result.state);
    let healthy = matches!(
        result.state,
        ValidationState::Valid | ValidationState::ValidEstimated
    );
    if !healthy && result.issues.len() > 1 {
        format!("{base} ({} issues)", result.issues.len())
    } else {
        base.to_string()
    }
}

/// Tooltip text: every issue message, one per line, prefixed by its field.
pub fn tooltip(result: &ValidationResult) -> String {
    if result.issues.is_empty() {
        return "Application is valid".to_string();
    }
    result
        .issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("\n")
}
