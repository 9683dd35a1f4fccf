#![deny(warnings)]

//! Core domain model for the FieldEIQ planner.
//!
//! This crate defines the serializable record and validation types shared
//! across the workspace, the unit tagged-unions with their conversion tables,
//! the product catalog interface, and the record validation state machine.

pub mod catalog;
pub mod units;
pub mod validate;

pub use catalog::{
    ActiveIngredientContribution, MemoryCatalog, ProductLookup, ProductSnapshot, ProductType,
};
pub use units::{AreaUnit, ConcentrationUnit, RateUnit};
pub use validate::{validate_record, RATE_WARNING_THRESHOLD};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque stable identity for an application record.
///
/// Assigned once by the owning scenario at creation and never reused; keys the
/// per-record validation cache so reordering or deleting rows cannot attach a
/// stale result to the wrong record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One planned pesticide application within a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Stable identity assigned by the owning scenario.
    pub id: RecordId,
    /// Product name as entered or imported; resolved against the catalog.
    pub product_name: String,
    /// Product type as imported (display only; EIQ exemption uses the
    /// catalog's type, not this field).
    pub product_type: Option<String>,
    /// Application rate in `rate_unit`, if entered.
    pub rate: Option<f64>,
    /// Unit for `rate`; `None` when the cell is blank.
    pub rate_unit: Option<RateUnit>,
    /// Treated area in `area_unit`, if entered.
    pub area: Option<f64>,
    /// Unit for `area`.
    pub area_unit: AreaUnit,
    /// Number of applications at this rate (>= 1).
    pub applications_count: u32,
    /// Planned application date.
    pub date: Option<NaiveDate>,
    /// Application method (display only).
    pub method: Option<String>,
    /// Last computed Field EIQ for this record; derived, 0.0 until the
    /// scenario recalculates.
    pub cached_field_eiq: f64,
    /// Active-ingredient group tags (display only).
    pub ai_groups: Vec<String>,
}

impl ApplicationRecord {
    /// Build a record from draft fields under a scenario-assigned id.
    pub fn from_draft(id: RecordId, draft: RecordDraft) -> Self {
        Self {
            id,
            product_name: draft.product_name,
            product_type: draft.product_type,
            rate: draft.rate,
            rate_unit: draft.rate_unit,
            area: draft.area,
            area_unit: draft.area_unit,
            applications_count: draft.applications_count,
            date: draft.date,
            method: draft.method,
            cached_field_eiq: 0.0,
            ai_groups: draft.ai_groups,
        }
    }
}

/// Field values for a record prior to insertion; the owning scenario assigns
/// the [`RecordId`]. This is also the import shape for scenario files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordDraft {
    pub product_name: String,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub rate_unit: Option<RateUnit>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub area_unit: AreaUnit,
    #[serde(default = "one_application")]
    pub applications_count: u32,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub ai_groups: Vec<String>,
}

fn one_application() -> u32 {
    1
}

impl Default for RecordDraft {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            product_type: None,
            rate: None,
            rate_unit: None,
            area: None,
            area_unit: AreaUnit::default(),
            applications_count: 1,
            date: None,
            method: None,
            ai_groups: vec![],
        }
    }
}

/// Severity of a single validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One diagnostic raised during record validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Record field the issue points at, e.g. `"rate"`.
    pub field: String,
    /// Human-readable message for tooltips and status lines.
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn info(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Info,
        }
    }
}

/// Validation states for an application record, exactly one per record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Structurally sound, product resolved, real ingredient EIQ data.
    Valid,
    /// Structurally sound but the Field EIQ is an estimate (product lacks
    /// usable ingredient EIQ data).
    ValidEstimated,
    /// Product name does not resolve against the catalog.
    InvalidProduct,
    /// A field value is out of range (negative rate or area).
    InvalidData,
    /// A required field is missing.
    Incomplete,
}

impl ValidationState {
    /// All states, in display order.
    pub const ALL: [ValidationState; 5] = [
        ValidationState::Valid,
        ValidationState::ValidEstimated,
        ValidationState::InvalidProduct,
        ValidationState::InvalidData,
        ValidationState::Incomplete,
    ];
}

/// Outcome of validating one record: a state plus every issue raised up to
/// and including the deciding tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub state: ValidationState,
    /// Ordered by evaluation tier; the first issue serves compact displays.
    pub issues: Vec<ValidationIssue>,
    pub can_calculate_eiq: bool,
}

impl ValidationResult {
    pub fn new(state: ValidationState, issues: Vec<ValidationIssue>, can_calculate_eiq: bool) -> Self {
        Self {
            state,
            issues,
            can_calculate_eiq,
        }
    }

    /// Combined message from all issues.
    pub fn message(&self) -> String {
        if self.issues.is_empty() {
            return "Application is valid".to_string();
        }
        self.issues
            .iter()
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// The most important (first-raised) message.
    pub fn primary_message(&self) -> &str {
        self.issues
            .first()
            .map(|i| i.message.as_str())
            .unwrap_or("Application is valid")
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}
