/// Text descendant charts: name labels and the tree renderer.
pub mod names;
pub mod render;

pub use names::NameFormatter;
pub use render::{ChartOptions, ChartRenderer};

use crate::config::ChartConfig;
use crate::graph::ingest::{Event, ingest};
use crate::graph::select::{SelectError, select};

/// Ingest `events`, select around the configured root and render the chart.
///
/// `config` is expected to be validated. Nothing is rendered when the root
/// cannot be found.
pub fn build_chart<I>(events: I, config: &ChartConfig) -> Result<Vec<String>, SelectError>
where
    I: IntoIterator<Item = Event>,
{
    let root = config.root_id();
    let mut graph = ingest(events, root.is_some());
    select(&mut graph, root.as_deref(), config.mode())?;
    Ok(ChartRenderer::new(&graph, config.chart_options()).render(root.as_deref()))
}
