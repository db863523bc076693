//! Per-state line chart

use std::collections::{BTreeMap, BTreeSet};

use super::error::ChartResult;
use super::params::{Metric, Scale};
use super::spec::{Annotation, Axis, ChartSpec, Layout, Trace};
use crate::data::Table;

/// Full set of line chart inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChartParams {
    pub states: BTreeSet<String>,
    pub metric: Metric,
    pub scale: Scale,
}

impl LineChartParams {
    /// Parse raw control values
    ///
    /// State codes are trimmed and upper-cased; blanks are ignored.
    pub fn parse<I, S>(states: I, metric: &str, scale: &str) -> ChartResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            states: normalize_states(states),
            metric: metric.parse()?,
            scale: scale.parse()?,
        })
    }

    /// Build the chart for these parameters
    pub fn build(&self, table: &Table) -> ChartSpec {
        build_line_chart(table, &self.states, self.metric, self.scale)
    }
}

/// Trim, upper-case and de-duplicate state codes
pub fn normalize_states<I, S>(states: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    states
        .into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Build the time series chart for the selected states
///
/// One trace per selected state that has rows, ordered by state code, with
/// dates ascending. Values are not transformed; `scale` only sets the y axis
/// type. An empty selection gives a chart with no traces.
pub fn build_line_chart(
    table: &Table,
    states: &BTreeSet<String>,
    metric: Metric,
    scale: Scale,
) -> ChartSpec {
    let mut series: BTreeMap<&str, (Vec<_>, Vec<_>)> = BTreeMap::new();

    if !states.is_empty() {
        for record in table.records() {
            if states.contains(&record.state) {
                let (x, y) = series.entry(record.state.as_str()).or_default();
                x.push(record.date);
                y.push(metric.value_of(record));
            }
        }
    }

    let traces = series
        .into_iter()
        .map(|(state, (x, y))| Trace::line(state, x, y))
        .collect();

    ChartSpec {
        traces,
        layout: Layout {
            title: format!("{} by state", metric.label()),
            xaxis: Some(Axis {
                title: "Date".to_string(),
                scale: Scale::Linear,
            }),
            yaxis: Some(Axis {
                title: metric.label().to_string(),
                scale,
            }),
            geo: None,
            annotations: vec![Annotation::caption(super::as_of_caption(table.latest()))],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartError;
    use crate::data::types::fixtures::record;
    use chrono::NaiveDate;

    fn table() -> Table {
        Table::from_records(vec![
            record("MD", "2020-03-20", Some(10)),
            record("VA", "2020-03-20", Some(4)),
            record("MD", "2020-03-21", Some(20)),
            record("VA", "2020-03-21", None),
            record("MD", "2020-03-22", Some(0)),
        ])
    }

    fn states(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_selection_has_no_traces() {
        let chart = build_line_chart(&table(), &BTreeSet::new(), Metric::Positive, Scale::Linear);
        assert!(chart.traces.is_empty());
        assert_eq!(chart.layout.annotations.len(), 1);
    }

    #[test]
    fn test_single_state_log_scale() {
        let table = table();
        let chart = build_line_chart(&table, &states(&["MD"]), Metric::Positive, Scale::Log);

        assert_eq!(chart.traces.len(), 1);
        match &chart.traces[0] {
            Trace::Scatter { name, x, y, .. } => {
                assert_eq!(name, "MD");
                let expected_x: Vec<NaiveDate> = table.for_state("MD").map(|r| r.date).collect();
                assert_eq!(x, &expected_x);
                assert!(x.windows(2).all(|w| w[0] < w[1]));
                assert_eq!(y, &vec![Some(10.0), Some(20.0), Some(0.0)]);
            }
            other => panic!("Expected Scatter, got {:?}", other),
        }
        assert_eq!(chart.layout.yaxis.as_ref().unwrap().scale, Scale::Log);
    }

    #[test]
    fn test_traces_ordered_by_state_and_missing_values_kept() {
        let chart = build_line_chart(&table(), &states(&["VA", "MD"]), Metric::Positive, Scale::Linear);

        let names: Vec<_> = chart.traces.iter().filter_map(|t| t.name()).collect();
        assert_eq!(names, vec!["MD", "VA"]);
        match &chart.traces[1] {
            Trace::Scatter { y, .. } => assert_eq!(y, &vec![Some(4.0), None]),
            other => panic!("Expected Scatter, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_state_yields_no_trace() {
        let chart = build_line_chart(&table(), &states(&["ZZ"]), Metric::Positive, Scale::Linear);
        assert!(chart.traces.is_empty());
    }

    #[test]
    fn test_caption_uses_load_time_latest_date() {
        let chart = build_line_chart(&table(), &states(&["VA"]), Metric::Positive, Scale::Linear);
        // VA's own last row is 03-21, the caption still reports the table's latest date
        assert_eq!(chart.layout.annotations[0].text, "Data as of 2020-03-22");
    }

    #[test]
    fn test_builder_is_idempotent() {
        let table = table();
        let selection = states(&["MD", "VA"]);
        let first = build_line_chart(&table, &selection, Metric::PercIncrease, Scale::Log);
        let second = build_line_chart(&table, &selection, Metric::PercIncrease, Scale::Log);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_params_parse() {
        let params = LineChartParams::parse([" md", "VA", "", "md"], "perc_hosp", "log").unwrap();
        assert_eq!(params.states, states(&["MD", "VA"]));
        assert_eq!(params.metric, Metric::PercHosp);
        assert_eq!(params.scale, Scale::Log);

        let err = LineChartParams::parse(["MD"], "bogus", "log").unwrap_err();
        assert_eq!(err, ChartError::InvalidMetric("bogus".to_string()));
        let err = LineChartParams::parse(["MD"], "positive", "cubic").unwrap_err();
        assert_eq!(err, ChartError::InvalidScale("cubic".to_string()));
    }
}
