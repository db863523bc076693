//! Chart parameters
//!
//! `Metric` and `Scale` are closed sets. Their wire keys match the column
//! names of the feed and derived table.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::ChartError;
use crate::data::Record;

/// Y-axis metric of the line chart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Cumulative positive tests
    #[serde(rename = "positive")]
    Positive,
    /// Cumulative test results
    #[serde(rename = "totalTestResults")]
    TotalTestResults,
    /// Day-over-day increase of positive
    #[serde(rename = "perc_increase")]
    PercIncrease,
    /// Five-observation rolling mean of the daily increase
    #[serde(rename = "perc_five_increase")]
    PercFiveIncrease,
    /// Deaths per positive test
    #[serde(rename = "perc_death")]
    PercDeath,
    /// Hospitalizations per positive test
    #[serde(rename = "perc_hosp")]
    PercHosp,
}

impl Metric {
    /// All metrics, in selector order
    pub fn all() -> &'static [Metric] {
        &[
            Metric::Positive,
            Metric::TotalTestResults,
            Metric::PercIncrease,
            Metric::PercFiveIncrease,
            Metric::PercDeath,
            Metric::PercHosp,
        ]
    }

    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Positive => "positive",
            Metric::TotalTestResults => "totalTestResults",
            Metric::PercIncrease => "perc_increase",
            Metric::PercFiveIncrease => "perc_five_increase",
            Metric::PercDeath => "perc_death",
            Metric::PercHosp => "perc_hosp",
        }
    }

    /// Selector label
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Positive => "Positive tests",
            Metric::TotalTestResults => "Total test results",
            Metric::PercIncrease => "Daily increase in positive tests",
            Metric::PercFiveIncrease => "5-day average increase in positive tests",
            Metric::PercDeath => "Deaths per positive test",
            Metric::PercHosp => "Hospitalizations per positive test",
        }
    }

    /// Value of this metric in a record
    pub fn value_of(&self, record: &Record) -> Option<f64> {
        match self {
            Metric::Positive => record.positive.map(|v| v as f64),
            Metric::TotalTestResults => record.total_test_results.map(|v| v as f64),
            Metric::PercIncrease => record.perc_increase,
            Metric::PercFiveIncrease => record.perc_five_increase,
            Metric::PercDeath => record.perc_death,
            Metric::PercHosp => record.perc_hosp,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::all()
            .iter()
            .copied()
            .find(|m| m.key() == s)
            .ok_or_else(|| ChartError::InvalidMetric(s.to_string()))
    }
}

/// Y-axis scale of the line chart
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

impl Scale {
    pub fn all() -> &'static [Scale] {
        &[Scale::Linear, Scale::Log]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Scale::Linear => "linear",
            Scale::Log => "log",
        }
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Scale {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scale::all()
            .iter()
            .copied()
            .find(|scale| scale.key() == s)
            .ok_or_else(|| ChartError::InvalidScale(s.to_string()))
    }
}
