//! Unit tagged-unions and the fixed conversion tables behind them.
//!
//! Canonical forms used by all internal arithmetic:
//! - application rate: pounds of product per acre (EIQ scores are per pound
//!   of active ingredient); liquid rates convert under a density-1 (water)
//!   assumption, the standard Cornell simplification;
//! - concentration: decimal fraction in [0, 1];
//! - area: hectares, used only as the pivot when standardizing between units.
//!
//! Unrecognized units never fail a conversion: the value passes through
//! unchanged with a logged warning, and the original label is preserved in the
//! `Unknown` variant. No rounding happens here; rounding is display-only.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Pounds per US gallon of water; used for density-1 liquid conversions.
const LBS_PER_GALLON: f64 = 8.345_4;

/// Unit of measure for an application rate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RateUnit {
    LbsPerAcre,
    OzPerAcre,
    FlOzPerAcre,
    PtPerAcre,
    QtPerAcre,
    GalPerAcre,
    KgPerHa,
    GPerHa,
    LPerHa,
    MlPerHa,
    MlPerAcre,
    /// Unrecognized label, preserved verbatim for display and re-export.
    Unknown(String),
}

impl RateUnit {
    /// Every tabulated (non-`Unknown`) unit.
    pub const TABULATED: [RateUnit; 11] = [
        RateUnit::LbsPerAcre,
        RateUnit::OzPerAcre,
        RateUnit::FlOzPerAcre,
        RateUnit::PtPerAcre,
        RateUnit::QtPerAcre,
        RateUnit::GalPerAcre,
        RateUnit::KgPerHa,
        RateUnit::GPerHa,
        RateUnit::LPerHa,
        RateUnit::MlPerHa,
        RateUnit::MlPerAcre,
    ];

    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "lbs/acre" | "lb/acre" => RateUnit::LbsPerAcre,
            "oz/acre" => RateUnit::OzPerAcre,
            "fl oz/acre" => RateUnit::FlOzPerAcre,
            "pt/acre" => RateUnit::PtPerAcre,
            "qt/acre" => RateUnit::QtPerAcre,
            "gal/acre" => RateUnit::GalPerAcre,
            "kg/ha" => RateUnit::KgPerHa,
            "g/ha" => RateUnit::GPerHa,
            "l/ha" => RateUnit::LPerHa,
            "ml/ha" => RateUnit::MlPerHa,
            "ml/acre" => RateUnit::MlPerAcre,
            other => RateUnit::Unknown(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RateUnit::LbsPerAcre => "lbs/acre",
            RateUnit::OzPerAcre => "oz/acre",
            RateUnit::FlOzPerAcre => "fl oz/acre",
            RateUnit::PtPerAcre => "pt/acre",
            RateUnit::QtPerAcre => "qt/acre",
            RateUnit::GalPerAcre => "gal/acre",
            RateUnit::KgPerHa => "kg/ha",
            RateUnit::GPerHa => "g/ha",
            RateUnit::LPerHa => "l/ha",
            RateUnit::MlPerHa => "ml/ha",
            RateUnit::MlPerAcre => "ml/acre",
            RateUnit::Unknown(s) => s,
        }
    }

    /// Multiplier to canonical lbs/acre; `None` for `Unknown`.
    fn factor_to_lbs_per_acre(&self) -> Option<f64> {
        let f = match self {
            RateUnit::LbsPerAcre => 1.0,
            RateUnit::OzPerAcre => 0.062_5,
            RateUnit::FlOzPerAcre => LBS_PER_GALLON / 128.0,
            RateUnit::PtPerAcre => LBS_PER_GALLON / 8.0,
            RateUnit::QtPerAcre => LBS_PER_GALLON / 4.0,
            RateUnit::GalPerAcre => LBS_PER_GALLON,
            RateUnit::KgPerHa => 0.892_179,
            RateUnit::GPerHa => 0.000_892_179,
            RateUnit::LPerHa => 0.892_179,
            RateUnit::MlPerHa => 0.000_892_179,
            RateUnit::MlPerAcre => 0.002_204_62,
            RateUnit::Unknown(_) => return None,
        };
        Some(f)
    }
}

impl From<String> for RateUnit {
    fn from(s: String) -> Self {
        RateUnit::from_label(&s)
    }
}

impl From<RateUnit> for String {
    fn from(u: RateUnit) -> Self {
        u.label().to_string()
    }
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit of measure for an active-ingredient concentration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConcentrationUnit {
    Percent,
    GramsPerLiter,
    PoundsPerGallon,
    Unknown(String),
}

impl ConcentrationUnit {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "%" => ConcentrationUnit::Percent,
            "g/l" => ConcentrationUnit::GramsPerLiter,
            "lb/gal" => ConcentrationUnit::PoundsPerGallon,
            other => ConcentrationUnit::Unknown(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ConcentrationUnit::Percent => "%",
            ConcentrationUnit::GramsPerLiter => "g/l",
            ConcentrationUnit::PoundsPerGallon => "lb/gal",
            ConcentrationUnit::Unknown(s) => s,
        }
    }
}

impl From<String> for ConcentrationUnit {
    fn from(s: String) -> Self {
        ConcentrationUnit::from_label(&s)
    }
}

impl From<ConcentrationUnit> for String {
    fn from(u: ConcentrationUnit) -> Self {
        u.label().to_string()
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit of measure for a treated or field area.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AreaUnit {
    Acre,
    Hectare,
    SquareMeter,
    Unknown(String),
}

impl AreaUnit {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "acre" | "acres" | "ac" => AreaUnit::Acre,
            "ha" | "hectare" | "hectares" => AreaUnit::Hectare,
            "m2" | "sq m" => AreaUnit::SquareMeter,
            other => AreaUnit::Unknown(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AreaUnit::Acre => "acre",
            AreaUnit::Hectare => "ha",
            AreaUnit::SquareMeter => "m2",
            AreaUnit::Unknown(s) => s,
        }
    }

    fn hectares_per_unit(&self) -> Option<f64> {
        let f = match self {
            AreaUnit::Acre => 0.404_686,
            AreaUnit::Hectare => 1.0,
            AreaUnit::SquareMeter => 0.000_1,
            AreaUnit::Unknown(_) => return None,
        };
        Some(f)
    }
}

impl Default for AreaUnit {
    fn default() -> Self {
        AreaUnit::Acre
    }
}

impl From<String> for AreaUnit {
    fn from(s: String) -> Self {
        AreaUnit::from_label(&s)
    }
}

impl From<AreaUnit> for String {
    fn from(u: AreaUnit) -> Self {
        u.label().to_string()
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Convert an application rate to canonical lbs/acre.
///
/// `None` propagates to `None`; zero is a legitimate zero-contribution value.
/// Unrecognized units pass the value through unchanged with a warning, never
/// an error.
pub fn canonical_rate(rate: Option<f64>, unit: &RateUnit) -> Option<f64> {
    let rate = rate?;
    match unit.factor_to_lbs_per_acre() {
        Some(f) => Some(rate * f),
        None => {
            warn!(
                unit = unit.label(),
                rate, "unrecognized rate unit; value passed through unchanged"
            );
            Some(rate)
        }
    }
}

/// Convert a concentration to a decimal fraction in [0, 1].
///
/// Unrecognized units are assumed to already be percent, matching how the
/// catalog stores bare numbers.
pub fn concentration_fraction(value: Option<f64>, unit: &ConcentrationUnit) -> Option<f64> {
    let value = value?;
    let fraction = match unit {
        ConcentrationUnit::Percent => value * 0.01,
        ConcentrationUnit::GramsPerLiter => value * 0.001,
        ConcentrationUnit::PoundsPerGallon => value / LBS_PER_GALLON,
        ConcentrationUnit::Unknown(label) => {
            debug!(unit = label.as_str(), "unrecognized concentration unit; assuming percent");
            value * 0.01
        }
    };
    Some(fraction)
}

/// Standardize an area value from one unit to another, pivoting through
/// hectares. If either unit is unrecognized the value passes through
/// unchanged with a warning.
pub fn area_in(value: Option<f64>, from: &AreaUnit, to: &AreaUnit) -> Option<f64> {
    let value = value?;
    match (from.hectares_per_unit(), to.hectares_per_unit()) {
        (Some(f), Some(t)) => Some(value * f / t),
        _ => {
            warn!(
                from = from.label(),
                to = to.label(),
                "unrecognized area unit; value passed through unchanged"
            );
            Some(value)
        }
    }
}
