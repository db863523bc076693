//! Tabs, controls and rendered views

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use super::controller::ControlError;
use crate::chart::{ChartSpec, Metric, Scale};

/// Dashboard tab
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    /// Line chart of a metric over time for selected states
    StatePositive,
    /// Choropleth of the latest positive counts
    UsStateMap,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::StatePositive, Tab::UsStateMap]
    }

    /// Wire id
    pub fn id(&self) -> &'static str {
        match self {
            Tab::StatePositive => "state-positive",
            Tab::UsStateMap => "us-state-map",
        }
    }

    /// Tab strip label
    pub fn label(&self) -> &'static str {
        match self {
            Tab::StatePositive => "State Positive Tests",
            Tab::UsStateMap => "US State Heatmap",
        }
    }

    /// Heading rendered above the tab content
    pub fn heading(&self) -> &'static str {
        match self {
            Tab::StatePositive => "State Positive Tests over Time",
            Tab::UsStateMap => "State Heatmap of Positive Tests",
        }
    }

    /// Controls mounted while this tab is active
    pub fn controls(&self) -> &'static [ControlId] {
        match self {
            Tab::StatePositive => &[
                ControlId::StateSelect,
                ControlId::ScaleSelect,
                ControlId::MetricSelect,
            ],
            Tab::UsStateMap => &[],
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tab {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::all()
            .iter()
            .copied()
            .find(|t| t.id() == s)
            .ok_or_else(|| ControlError::UnknownTab(s.to_string()))
    }
}

/// Input controls of the line chart tab
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ControlId {
    StateSelect,
    ScaleSelect,
    MetricSelect,
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlId::StateSelect => write!(f, "state-select"),
            ControlId::ScaleSelect => write!(f, "scale-select"),
            ControlId::MetricSelect => write!(f, "metric-select"),
        }
    }
}

/// A value change emitted by the UI
///
/// Values arrive as the raw strings the controls emit; the controller
/// validates them against the closed sets.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    TabSelected(String),
    StatesChanged(Vec<String>),
    ScaleChanged(String),
    MetricChanged(String),
}

impl ControlEvent {
    /// Control the event targets; `None` for the tab strip, which is always mounted
    pub fn target(&self) -> Option<ControlId> {
        match self {
            ControlEvent::TabSelected(_) => None,
            ControlEvent::StatesChanged(_) => Some(ControlId::StateSelect),
            ControlEvent::ScaleChanged(_) => Some(ControlId::ScaleSelect),
            ControlEvent::MetricChanged(_) => Some(ControlId::MetricSelect),
        }
    }
}

/// Current value of every line chart control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlValues {
    pub states: BTreeSet<String>,
    pub metric: Metric,
    pub scale: Scale,
}

/// Selector entry for a metric
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricOption {
    pub key: Metric,
    pub label: &'static str,
}

impl MetricOption {
    pub fn all() -> Vec<MetricOption> {
        Metric::all()
            .iter()
            .map(|m| MetricOption {
                key: *m,
                label: m.label(),
            })
            .collect()
    }
}

/// Options and current values of the mounted controls
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ControlPanel {
    pub state_options: Vec<String>,
    pub states: Vec<String>,
    pub scale_options: Vec<Scale>,
    pub scale: Scale,
    pub metric_options: Vec<MetricOption>,
    pub metric: Metric,
}

/// Fully rendered content of a tab
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "tab", rename_all = "kebab-case")]
pub enum TabView {
    StatePositive {
        heading: String,
        controls: ControlPanel,
        chart: ChartSpec,
    },
    UsStateMap {
        heading: String,
        chart: ChartSpec,
    },
}

impl TabView {
    pub fn tab(&self) -> Tab {
        match self {
            TabView::StatePositive { .. } => Tab::StatePositive,
            TabView::UsStateMap { .. } => Tab::UsStateMap,
        }
    }

    pub fn chart(&self) -> &ChartSpec {
        match self {
            TabView::StatePositive { chart, .. } | TabView::UsStateMap { chart, .. } => chart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_ids() {
        assert_eq!("state-positive".parse::<Tab>().unwrap(), Tab::StatePositive);
        assert_eq!("us-state-map".parse::<Tab>().unwrap(), Tab::UsStateMap);
        assert!(matches!("map".parse::<Tab>(), Err(ControlError::UnknownTab(_))));
        assert!(matches!(" us-state-map".parse::<Tab>(), Err(ControlError::UnknownTab(_))));
        assert_eq!(serde_json::to_string(&Tab::UsStateMap).unwrap(), "\"us-state-map\"");
    }

    #[test]
    fn test_mounted_controls() {
        assert_eq!(Tab::StatePositive.controls().len(), 3);
        assert!(Tab::UsStateMap.controls().is_empty());
        assert_eq!(
            ControlEvent::MetricChanged("positive".into()).target(),
            Some(ControlId::MetricSelect)
        );
        assert_eq!(ControlEvent::TabSelected("x".into()).target(), None);
    }

    #[test]
    fn test_metric_options_cover_all_metrics() {
        let options = MetricOption::all();
        assert_eq!(options.len(), 6);
        let json = serde_json::to_value(&options[1]).unwrap();
        assert_eq!(json["key"], "totalTestResults");
    }
}
