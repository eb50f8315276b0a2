use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit system requested from the weather service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    #[default]
    Metric,
    Imperial,
}

impl UnitMode {
    /// Value of the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitMode::Metric => "metric",
            UnitMode::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitMode::Metric => UnitMode::Imperial,
            UnitMode::Imperial => UnitMode::Metric,
        }
    }

    pub const fn all() -> &'static [UnitMode] {
        &[UnitMode::Metric, UnitMode::Imperial]
    }
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown unit mode '{0}'. Supported: metric, imperial.")]
pub struct UnknownUnitMode(pub String);

impl FromStr for UnitMode {
    type Err = UnknownUnitMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitMode::Metric),
            "imperial" => Ok(UnitMode::Imperial),
            _ => Err(UnknownUnitMode(value.to_string())),
        }
    }
}

/// One weather condition descriptor, e.g. `Clouds` / `broken clouds`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub main: String,
    pub description: String,
}

/// A single 3-hour forecast entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub conditions: Vec<Condition>,
}

impl RawSample {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// Current conditions for a city, in the units the service was asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSnapshot {
    pub city: String,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub conditions: Vec<Condition>,
}

impl CurrentSnapshot {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// Per-day forecast summary produced by [`crate::forecast::aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date_label: String,
    pub avg_temperature: f64,
    pub main: String,
    pub description: String,
}
