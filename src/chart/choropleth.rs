//! Latest-day choropleth

use super::spec::{Annotation, ChartSpec, ColorBar, Geo, Layout, Trace};
use crate::data::{log10_positive, Snapshot};

/// Build the US state map of log10(positive) from the snapshot
///
/// Uses the same zero-as-one substitution as the table's `logPos` column.
pub fn build_choropleth(snapshot: &Snapshot) -> ChartSpec {
    let (locations, z): (Vec<String>, Vec<Option<f64>>) = snapshot
        .entries
        .iter()
        .map(|entry| (entry.state.clone(), log10_positive(entry.positive)))
        .unzip();

    ChartSpec {
        traces: vec![Trace::Choropleth {
            locations,
            z,
            locationmode: "USA-states".to_string(),
            colorbar: ColorBar {
                title: "log10(positive)".to_string(),
            },
        }],
        layout: Layout {
            title: "Positive tests by state".to_string(),
            geo: Some(Geo {
                scope: "usa".to_string(),
            }),
            annotations: vec![Annotation::caption(super::as_of_caption(snapshot.as_of))],
            ..Default::default()
        },
    }
}
