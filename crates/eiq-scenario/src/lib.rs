#![deny(warnings)]

//! Scenario ownership and aggregation.
//!
//! A [`Scenario`] owns its application records, assigns each a stable
//! [`RecordId`], and keeps the per-record validation cache keyed by that id so
//! reordering or deleting rows can never attach a stale result to the wrong
//! record. The cache goes stale exactly when one of the four trigger fields
//! (product name, rate, rate unit, area) is edited.
//!
//! Recalculation is synchronous, idempotent, and two-pass: real Field EIQs
//! first, then estimates for records whose product lacks usable ingredient
//! data, averaged from the real pass so estimates never bootstrap off each
//! other.

pub mod report;

use chrono::NaiveDate;
use eiq_calc::{estimate_from_pool, field_eiq_for_record, qualifies_for_estimation_pool};
use eiq_core::catalog::ProductLookup;
use eiq_core::units::{area_in, AreaUnit, RateUnit};
use eiq_core::{
    validate_record, ApplicationRecord, RecordDraft, RecordId, ValidationResult, ValidationState,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

/// Errors from scenario mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    /// The id does not name a record in this scenario.
    #[error("no record with id {0}")]
    UnknownRecord(RecordId),
}

/// A single field edit to an application record.
///
/// Only the four trigger-field variants invalidate the record's cached
/// validation; everything else is display-only and leaves the cache alone.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldEdit {
    ProductName(String),
    Rate(Option<f64>),
    RateUnit(Option<RateUnit>),
    Area(Option<f64>),
    AreaUnit(AreaUnit),
    ApplicationsCount(u32),
    Date(Option<NaiveDate>),
    Method(Option<String>),
}

impl FieldEdit {
    /// True for edits that make a cached validation stale.
    pub fn is_validation_trigger(&self) -> bool {
        matches!(
            self,
            FieldEdit::ProductName(_)
                | FieldEdit::Rate(_)
                | FieldEdit::RateUnit(_)
                | FieldEdit::Area(_)
        )
    }
}

/// Count of records per validation state; all five states always present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    counts: BTreeMap<ValidationState, usize>,
}

impl ValidationSummary {
    pub fn count(&self, state: ValidationState) -> usize {
        self.counts.get(&state).copied().unwrap_or(0)
    }

    /// Records in any state other than `Valid`/`ValidEstimated`.
    pub fn problem_count(&self) -> usize {
        self.count(ValidationState::InvalidProduct)
            + self.count(ValidationState::InvalidData)
            + self.count(ValidationState::Incomplete)
    }
}

/// An ordered collection of application records over one field.
///
/// Totals are always derived from the records, never stored as source of
/// truth. Callers edit fields through [`Scenario::edit`] and must call
/// [`Scenario::recalculate`] in the same logical turn before reading derived
/// values again.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    records: Vec<ApplicationRecord>,
    pub field_area: f64,
    pub field_area_unit: AreaUnit,
    next_id: u64,
    #[serde(skip)]
    cache: HashMap<RecordId, ValidationResult>,
}

impl Scenario {
    pub fn new(field_area: f64, field_area_unit: AreaUnit) -> Self {
        Self {
            records: Vec::new(),
            field_area,
            field_area_unit,
            next_id: 1,
            cache: HashMap::new(),
        }
    }

    /// Insert a record from draft fields, assigning the next stable id.
    pub fn add_record(&mut self, draft: RecordDraft) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.push(ApplicationRecord::from_draft(id, draft));
        id
    }

    /// Remove a record and its cached validation. Removing a row never
    /// disturbs the validation of any other row.
    pub fn remove_record(&mut self, id: RecordId) -> Result<(), ScenarioError> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.cache.remove(&id);
        if self.records.len() == before {
            return Err(ScenarioError::UnknownRecord(id));
        }
        Ok(())
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&ApplicationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Cached validation for a record, if current.
    pub fn validation(&self, id: RecordId) -> Option<&ValidationResult> {
        self.cache.get(&id)
    }

    /// Apply one field edit, invalidating the cached validation only when a
    /// trigger field changed.
    pub fn edit(&mut self, id: RecordId, edit: FieldEdit) -> Result<(), ScenarioError> {
        let Some(rec) = self.records.iter_mut().find(|r| r.id == id) else {
            return Err(ScenarioError::UnknownRecord(id));
        };
        let invalidate = edit.is_validation_trigger();
        match edit {
            FieldEdit::ProductName(v) => rec.product_name = v,
            FieldEdit::Rate(v) => rec.rate = v,
            FieldEdit::RateUnit(v) => rec.rate_unit = v,
            FieldEdit::Area(v) => rec.area = v,
            FieldEdit::AreaUnit(v) => rec.area_unit = v,
            FieldEdit::ApplicationsCount(v) => rec.applications_count = v,
            FieldEdit::Date(v) => rec.date = v,
            FieldEdit::Method(v) => rec.method = v,
        }
        if invalidate {
            self.cache.remove(&id);
        }
        Ok(())
    }

    /// Revalidate stale records and recompute every cached Field EIQ.
    ///
    /// Two passes: real values for records with usable ingredient data, then
    /// estimates for `ValidEstimated` records, averaged from the real pool.
    /// Safe to invoke repeatedly; a second call with no intervening edits
    /// changes nothing.
    pub fn recalculate(&mut self, catalog: &impl ProductLookup) {
        for rec in &self.records {
            if !self.cache.contains_key(&rec.id) {
                self.cache.insert(rec.id, validate_record(rec, catalog));
            }
        }

        // Pass 1: real Field EIQs. Ineligible records and EIQ-exempt products
        // carry zero.
        for rec in &mut self.records {
            let state = self.cache.get(&rec.id).map(|r| r.state);
            rec.cached_field_eiq = if state == Some(ValidationState::Valid) {
                match catalog.resolve(&rec.product_name) {
                    Some(product) if !product.is_eiq_exempt() => field_eiq_for_record(
                        &product.ingredients,
                        rec.rate,
                        rec.rate_unit.as_ref().unwrap_or(&RateUnit::LbsPerAcre),
                        rec.applications_count,
                    ),
                    _ => 0.0,
                }
            } else {
                0.0
            };
        }

        // Pass 2: estimates from the real pool only.
        let pool: Vec<f64> = self
            .records
            .iter()
            .filter(|r| {
                self.cache.get(&r.id).map(|v| v.state) == Some(ValidationState::Valid)
                    && qualifies_for_estimation_pool(r.cached_field_eiq)
            })
            .map(|r| r.cached_field_eiq)
            .collect();
        for rec in &mut self.records {
            if self.cache.get(&rec.id).map(|v| v.state) == Some(ValidationState::ValidEstimated) {
                rec.cached_field_eiq = estimate_from_pool(&pool);
            }
        }

        debug!(
            records = self.records.len(),
            pool = pool.len(),
            "scenario recalculated"
        );
    }

    /// Sum of cached Field EIQs over records eligible for calculation; both
    /// real and estimated values contribute, everything else counts zero.
    pub fn total_field_eiq(&self) -> f64 {
        self.records
            .iter()
            .filter(|r| self.can_calculate(r.id))
            .map(|r| r.cached_field_eiq)
            .sum()
    }

    /// Area-weighted Field EIQ: `Σ(record EIQ × standardized area) / field
    /// area`, with every record area standardized to the scenario's field
    /// area unit. A non-positive field area yields 0.0, never a division
    /// error; records without an area contribute zero weight.
    pub fn area_weighted_eiq(&self) -> f64 {
        if !(self.field_area.is_finite() && self.field_area > 0.0) {
            return 0.0;
        }
        let weighted: f64 = self
            .records
            .iter()
            .filter(|r| self.can_calculate(r.id))
            .map(|r| {
                let area = area_in(r.area, &r.area_unit, &self.field_area_unit).unwrap_or(0.0);
                r.cached_field_eiq * area
            })
            .sum();
        weighted / self.field_area
    }

    /// Validation histogram across all records, from the cache.
    pub fn validation_summary(&self) -> ValidationSummary {
        let mut counts = BTreeMap::new();
        for state in ValidationState::ALL {
            counts.insert(state, 0);
        }
        for rec in &self.records {
            if let Some(result) = self.cache.get(&rec.id) {
                *counts.entry(result.state).or_insert(0) += 1;
            }
        }
        ValidationSummary { counts }
    }

    fn can_calculate(&self, id: RecordId) -> bool {
        self.cache.get(&id).is_some_and(|r| r.can_calculate_eiq)
    }
}
