use log::{error, info};

use super::{Graph, GraphData};
use crate::error::DataError;

const BRAND_UNIVERSE_JSON: &str = include_str!("../../assets/graph.json");

/// Parses and validates the embedded brand-universe dataset.
pub fn brand_universe() -> Result<Graph, DataError> {
	from_json(BRAND_UNIVERSE_JSON)
}

pub(crate) fn from_json(json: &str) -> Result<Graph, DataError> {
	let data: GraphData = serde_json::from_str(json)?;
	let graph = Graph::new(data).inspect_err(|e| error!("rejected graph dataset: {e}"))?;
	info!(
		"graph loaded: {} nodes, {} links",
		graph.len(),
		graph.links().len()
	);
	Ok(graph)
}
