//! Chart specification types
//!
//! A `ChartSpec` is built once per interaction and never modified; a new
//! one replaces the previous chart on the surface.

use chrono::NaiveDate;
use serde::Serialize;

use super::params::Scale;

/// Complete description of one chart
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSpec {
    /// Traces, drawn in order
    #[serde(rename = "data")]
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

/// One drawable series
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    /// Line series over dates
    Scatter {
        name: String,
        mode: String,
        x: Vec<NaiveDate>,
        /// Missing values serialize as `null` and break the line
        y: Vec<Option<f64>>,
    },
    /// Region-colored map
    Choropleth {
        locations: Vec<String>,
        z: Vec<Option<f64>>,
        locationmode: String,
        colorbar: ColorBar,
    },
}

impl Trace {
    /// A line trace
    pub fn line(name: impl Into<String>, x: Vec<NaiveDate>, y: Vec<Option<f64>>) -> Self {
        Trace::Scatter {
            name: name.into(),
            mode: "lines".to_string(),
            x,
            y,
        }
    }

    /// Trace name, if it has one
    pub fn name(&self) -> Option<&str> {
        match self {
            Trace::Scatter { name, .. } => Some(name),
            Trace::Choropleth { .. } => None,
        }
    }
}

/// Color bar legend of a choropleth
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColorBar {
    pub title: String,
}

/// Figure layout
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// Axis title and scale
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Axis {
    pub title: String,
    #[serde(rename = "type")]
    pub scale: Scale,
}

/// Map projection scope
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Geo {
    pub scope: String,
}

/// Free text placed relative to the plotting area
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub xref: String,
    pub yref: String,
    pub x: f64,
    pub y: f64,
    pub showarrow: bool,
}

impl Annotation {
    /// Caption below the bottom-right corner of the plot
    pub fn caption(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            x: 1.0,
            y: -0.15,
            showarrow: false,
        }
    }
}
