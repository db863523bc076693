//! Per-session controller
//!
//! A `DashboardSession` is the state machine behind one connected client.
//! Events are applied one at a time through [`DashboardSession::handle`];
//! each either produces exactly one update or is rejected and leaves the
//! session untouched.

use std::sync::Arc;
use thiserror::Error;

use super::context::AppContext;
use super::controls::{ControlEvent, ControlId, ControlPanel, ControlValues, MetricOption, Tab, TabView};
use crate::chart::{build_line_chart, line::normalize_states, ChartError, ChartSpec, Metric, Scale};

/// Output of a handled event
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// The active tab was (re)mounted and must be replaced wholesale
    Tab(TabView),
    /// The line chart was rebuilt
    Chart(ChartSpec),
}

/// Rejected control events
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// Metric or scale outside its closed set
    #[error(transparent)]
    Invalid(#[from] ChartError),

    #[error("Unknown tab: {0}")]
    UnknownTab(String),

    #[error("Control {control} is not mounted on tab {tab}")]
    NotMounted { control: ControlId, tab: Tab },
}

impl ControlError {
    /// Stable error code for clients
    pub fn code(&self) -> &'static str {
        match self {
            ControlError::Invalid(e) => e.code(),
            ControlError::UnknownTab(_) => "UNKNOWN_TAB",
            ControlError::NotMounted { .. } => "CONTROL_NOT_MOUNTED",
        }
    }
}

/// Tab and control state of one client
pub struct DashboardSession {
    context: Arc<AppContext>,
    tab: Tab,
    controls: ControlValues,
}

impl DashboardSession {
    /// Start on the line chart tab with default control values
    pub fn new(context: Arc<AppContext>) -> Self {
        let controls = context.defaults().clone();
        Self {
            context,
            tab: Tab::StatePositive,
            controls,
        }
    }

    /// Active tab
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Current control values
    pub fn controls(&self) -> &ControlValues {
        &self.controls
    }

    /// Render the active tab
    pub fn render(&self) -> TabView {
        match self.tab {
            Tab::StatePositive => TabView::StatePositive {
                heading: self.tab.heading().to_string(),
                controls: self.control_panel(),
                chart: self.recompute(),
            },
            Tab::UsStateMap => TabView::UsStateMap {
                heading: self.tab.heading().to_string(),
                chart: self.context.map_chart().clone(),
            },
        }
    }

    /// Apply one control event
    ///
    /// Values are validated before anything is stored, so a rejected event
    /// leaves tab, controls and the displayed chart as they were.
    pub fn handle(&mut self, event: ControlEvent) -> Result<Update, ControlError> {
        if let Some(control) = event.target() {
            self.ensure_mounted(control)?;
        }

        match event {
            ControlEvent::TabSelected(raw) => {
                let tab: Tab = raw.parse()?;
                if tab == self.tab {
                    // Already mounted, controls stay as they are
                    return Ok(Update::Tab(self.render()));
                }
                self.tab = tab;
                if tab == Tab::StatePositive {
                    // Freshly mounted controls start from their defaults
                    self.controls = self.context.defaults().clone();
                }
                tracing::debug!(tab = %tab, "Tab mounted");
                return Ok(Update::Tab(self.render()));
            }
            ControlEvent::StatesChanged(states) => {
                self.controls.states = normalize_states(states);
            }
            ControlEvent::ScaleChanged(raw) => {
                self.controls.scale = raw.parse::<Scale>()?;
            }
            ControlEvent::MetricChanged(raw) => {
                self.controls.metric = raw.parse::<Metric>()?;
            }
        }

        tracing::debug!(
            states = self.controls.states.len(),
            metric = %self.controls.metric,
            scale = %self.controls.scale,
            "Line chart recomputed"
        );
        Ok(Update::Chart(self.recompute()))
    }

    fn ensure_mounted(&self, control: ControlId) -> Result<(), ControlError> {
        if self.tab.controls().contains(&control) {
            Ok(())
        } else {
            Err(ControlError::NotMounted {
                control,
                tab: self.tab,
            })
        }
    }

    /// Line chart from the full current control state
    fn recompute(&self) -> ChartSpec {
        build_line_chart(
            self.context.table(),
            &self.controls.states,
            self.controls.metric,
            self.controls.scale,
        )
    }

    fn control_panel(&self) -> ControlPanel {
        ControlPanel {
            state_options: self.context.table().states().to_vec(),
            states: self.controls.states.iter().cloned().collect(),
            scale_options: Scale::all().to_vec(),
            scale: self.controls.scale,
            metric_options: MetricOption::all(),
            metric: self.controls.metric,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Trace;
    use crate::config::DashboardConfig;
    use crate::data::parse_feed;

    const FEED: &str = "\
dateChecked,state,positive,totalTestResults
2020-03-20,MD,10,100
2020-03-21,MD,20,200
2020-03-22,MD,0,200
2020-03-20,VA,5,50
2020-03-21,VA,8,80
2020-03-22,VA,7,70
2020-03-22,NY,70,700
";

    fn context() -> Arc<AppContext> {
        let (table, report) = parse_feed(FEED).unwrap();
        Arc::new(AppContext::new(table, report, "test", &DashboardConfig::default()))
    }

    fn chart(update: Update) -> ChartSpec {
        match update {
            Update::Chart(chart) => chart,
            other => panic!("Expected Chart, got {:?}", other),
        }
    }

    fn trace_names(chart: &ChartSpec) -> Vec<String> {
        chart.traces.iter().filter_map(|t| t.name()).map(str::to_string).collect()
    }

    #[test]
    fn test_initial_render() {
        let session = DashboardSession::new(context());
        assert_eq!(session.tab(), Tab::StatePositive);

        match session.render() {
            TabView::StatePositive { heading, controls, chart } => {
                assert_eq!(heading, "State Positive Tests over Time");
                assert_eq!(controls.state_options, vec!["MD", "NY", "VA"]);
                assert_eq!(controls.states, vec!["MD"]);
                assert_eq!(controls.metric_options.len(), 6);
                assert_eq!(trace_names(&chart), vec!["MD"]);
            }
            other => panic!("Expected StatePositive, got {:?}", other),
        }
    }

    #[test]
    fn test_recompute_uses_all_current_values() {
        let mut session = DashboardSession::new(context());

        session.handle(ControlEvent::ScaleChanged("log".into())).unwrap();
        session.handle(ControlEvent::MetricChanged("perc_increase".into())).unwrap();
        let update = session
            .handle(ControlEvent::StatesChanged(vec!["VA".into(), "MD".into()]))
            .unwrap();
        let chart = chart(update);

        // The states change alone still carries the earlier scale and metric
        assert_eq!(trace_names(&chart), vec!["MD", "VA"]);
        assert_eq!(chart.layout.yaxis.as_ref().unwrap().scale, Scale::Log);
        assert_eq!(
            chart.layout.yaxis.as_ref().unwrap().title,
            Metric::PercIncrease.label()
        );

        // Same result as building directly from the full state
        let direct = build_line_chart(
            session.context.table(),
            &session.controls().states,
            Metric::PercIncrease,
            Scale::Log,
        );
        assert_eq!(chart, direct);
    }

    #[test]
    fn test_empty_selection_gives_empty_chart() {
        let mut session = DashboardSession::new(context());
        let chart = chart(session.handle(ControlEvent::StatesChanged(Vec::new())).unwrap());
        assert!(chart.traces.is_empty());
    }

    #[test]
    fn test_invalid_values_are_inert() {
        let mut session = DashboardSession::new(context());
        session.handle(ControlEvent::ScaleChanged("log".into())).unwrap();
        let before = session.render();

        let err = session
            .handle(ControlEvent::MetricChanged("negative".into()))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_METRIC");

        let err = session
            .handle(ControlEvent::ScaleChanged("sqrt".into()))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_SCALE");

        let err = session
            .handle(ControlEvent::TabSelected("settings".into()))
            .unwrap_err();
        assert_eq!(err, ControlError::UnknownTab("settings".to_string()));

        assert_eq!(session.tab(), Tab::StatePositive);
        assert_eq!(session.render(), before);
    }

    #[test]
    fn test_map_tab_uses_prebuilt_choropleth() {
        let context = context();
        let mut session = DashboardSession::new(Arc::clone(&context));

        let update = session
            .handle(ControlEvent::TabSelected("us-state-map".into()))
            .unwrap();
        match update {
            Update::Tab(view) => {
                assert_eq!(view.tab(), Tab::UsStateMap);
                assert_eq!(view.chart(), context.map_chart());
                assert!(matches!(view.chart().traces[0], Trace::Choropleth { .. }));
            }
            other => panic!("Expected Tab, got {:?}", other),
        }
    }

    #[test]
    fn test_line_controls_not_mounted_on_map_tab() {
        let mut session = DashboardSession::new(context());
        session
            .handle(ControlEvent::TabSelected("us-state-map".into()))
            .unwrap();

        let err = session
            .handle(ControlEvent::StatesChanged(vec!["NY".into()]))
            .unwrap_err();
        assert_eq!(
            err,
            ControlError::NotMounted {
                control: ControlId::StateSelect,
                tab: Tab::UsStateMap,
            }
        );
        assert_eq!(err.code(), "CONTROL_NOT_MOUNTED");
        assert_eq!(session.controls().states.len(), 1);
    }

    #[test]
    fn test_remounting_line_tab_resets_controls() {
        let mut session = DashboardSession::new(context());
        session.handle(ControlEvent::MetricChanged("totalTestResults".into())).unwrap();
        session.handle(ControlEvent::TabSelected("us-state-map".into())).unwrap();

        let update = session
            .handle(ControlEvent::TabSelected("state-positive".into()))
            .unwrap();
        assert!(matches!(update, Update::Tab(TabView::StatePositive { .. })));
        assert_eq!(session.controls().metric, Metric::Positive);
    }

    #[test]
    fn test_reselecting_active_tab_keeps_controls() {
        let mut session = DashboardSession::new(context());
        session.handle(ControlEvent::StatesChanged(vec!["VA".into()])).unwrap();
        session.handle(ControlEvent::ScaleChanged("log".into())).unwrap();

        let update = session
            .handle(ControlEvent::TabSelected("state-positive".into()))
            .unwrap();
        match update {
            Update::Tab(TabView::StatePositive { controls, chart, .. }) => {
                assert_eq!(controls.states, vec!["VA"]);
                assert_eq!(controls.scale, Scale::Log);
                assert_eq!(trace_names(&chart), vec!["VA"]);
            }
            other => panic!("Expected StatePositive tab, got {:?}", other),
        }
        assert_eq!(session.controls().scale, Scale::Log);
        assert_eq!(session.controls().states.iter().collect::<Vec<_>>(), vec!["VA"]);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let context = context();
        let mut first = DashboardSession::new(Arc::clone(&context));
        let second = DashboardSession::new(Arc::clone(&context));

        first.handle(ControlEvent::StatesChanged(vec!["NY".into()])).unwrap();
        assert_eq!(second.controls().states.iter().collect::<Vec<_>>(), vec!["MD"]);
        assert_eq!(context.table().len(), 7);
    }
}
