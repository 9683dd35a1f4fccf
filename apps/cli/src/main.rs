#![deny(warnings)]

//! Headless scenario runner: load (or build) a spray scenario, recalculate
//! every Field EIQ, and print per-record lines plus scenario totals.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use eiq_core::catalog::{
    ActiveIngredientContribution, MemoryCatalog, ProductSnapshot, ProductType,
};
use eiq_core::units::{AreaUnit, ConcentrationUnit, RateUnit};
use eiq_core::{RecordDraft, ValidationState};
use eiq_scenario::report::{format_field_eiq, format_status, impact_category};
use eiq_scenario::{Scenario, ValidationSummary};
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// On-disk scenario shape: a catalog slice plus record drafts.
#[derive(Debug, Deserialize)]
struct ScenarioFile {
    field_area: f64,
    #[serde(default)]
    field_area_unit: AreaUnit,
    #[serde(default)]
    products: Vec<ProductSnapshot>,
    #[serde(default)]
    applications: Vec<RecordDraft>,
}

fn parse_args() -> (Option<String>, bool) {
    let mut scenario: Option<String> = None;
    let mut verbose = false;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => scenario = it.next(),
            "--verbose" => verbose = true,
            _ => {}
        }
    }
    (scenario, verbose)
}

fn load_scenario(path: &str) -> Result<(MemoryCatalog, Scenario)> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let is_yaml = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let file: ScenarioFile = if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("parsing {path} as YAML"))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("parsing {path} as JSON"))?
    };

    let catalog = MemoryCatalog::from_products(file.products);
    let mut scenario = Scenario::new(file.field_area, file.field_area_unit);
    for draft in file.applications {
        scenario.add_record(draft);
    }
    Ok((catalog, scenario))
}

/// Small built-in scenario exercising the full state range.
fn demo_scenario() -> (MemoryCatalog, Scenario) {
    let catalog = MemoryCatalog::from_products([
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
            ingredients: vec![],
        },
    ]);

    let mut scenario = Scenario::new(120.0, AreaUnit::Acre);
    scenario.add_record(RecordDraft {
        product_name: "Herbicide-X".to_string(),
        rate: Some(2.0),
        rate_unit: Some(RateUnit::LbsPerAcre),
        area: Some(120.0),
        date: NaiveDate::from_ymd_opt(2026, 5, 14),
        method: Some("broadcast".to_string()),
        ..RecordDraft::default()
    });
    scenario.add_record(RecordDraft {
        product_name: "Mystery-Mix".to_string(),
        rate: Some(1.5),
        rate_unit: Some(RateUnit::LPerHa),
        area: Some(60.0),
        ..RecordDraft::default()
    });
    scenario.add_record(RecordDraft {
        product_name: "Discontinued-Z".to_string(),
        rate: Some(1.0),
        rate_unit: Some(RateUnit::QtPerAcre),
        ..RecordDraft::default()
    });
    (catalog, scenario)
}

fn print_summary(summary: &ValidationSummary) {
    println!(
        "Validation | valid: {} | estimated: {} | invalid product: {} | invalid data: {} | incomplete: {}",
        summary.count(ValidationState::Valid),
        summary.count(ValidationState::ValidEstimated),
        summary.count(ValidationState::InvalidProduct),
        summary.count(ValidationState::InvalidData),
        summary.count(ValidationState::Incomplete),
    );
}

fn main() -> Result<()> {
    let (scenario_path, verbose) = parse_args();
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(?scenario_path, "starting FieldEIQ runner");
    let (catalog, mut scenario) = match scenario_path.as_deref() {
        Some(path) => load_scenario(path)?,
        None => demo_scenario(),
    };
    info!(
        products = catalog.len(),
        records = scenario.records().len(),
        "scenario loaded"
    );

    scenario.recalculate(&catalog);

    for rec in scenario.records() {
        let status = scenario
            .validation(rec.id)
            .map(format_status)
            .unwrap_or_else(|| "?".to_string());
        let rate = match (rec.rate, rec.rate_unit.as_ref()) {
            (Some(r), Some(u)) => format!("{r} {u}"),
            _ => "-".to_string(),
        };
        println!(
            "{:<28} {:>14}  {:>12}  {}",
            rec.product_name,
            rate,
            format_field_eiq(rec.cached_field_eiq),
            status
        );
    }

    let total = scenario.total_field_eiq();
    let (rating, _) = impact_category(total);
    println!(
        "Totals | field EIQ: {} | area-weighted: {} | {}",
        format_field_eiq(total),
        format_field_eiq(scenario.area_weighted_eiq()),
        rating
    );
    print_summary(&scenario.validation_summary());

    Ok(())
}
