//! The single "focused node" slot shared by the scene and the overlay.

use log::{debug, warn};

use crate::graph::{Graph, NodeIdx};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	current: Option<NodeIdx>,
}

impl Selection {
	/// Selects by id; unknown ids leave the slot untouched.
	pub fn select(&mut self, graph: &Graph, id: &str) -> bool {
		match graph.index_of(id) {
			Some(idx) => {
				self.current = Some(idx);
				debug!("selected {id}");
				true
			}
			None => {
				warn!("ignoring selection of unknown node `{id}`");
				false
			}
		}
	}

	pub fn select_idx(&mut self, graph: &Graph, idx: NodeIdx) -> bool {
		if idx >= graph.len() {
			warn!("ignoring selection of out-of-range node {idx}");
			return false;
		}
		self.current = Some(idx);
		true
	}

	pub fn clear(&mut self) {
		self.current = None;
	}

	pub fn current(&self) -> Option<NodeIdx> {
		self.current
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::brand_universe;

	#[test]
	fn starts_empty_and_clears() {
		let graph = brand_universe().unwrap();
		let mut selection = Selection::default();
		assert_eq!(selection.current(), None);

		assert!(selection.select(&graph, "NorWave"));
		assert_eq!(selection.current(), graph.index_of("NorWave"));
		selection.clear();
		assert_eq!(selection.current(), None);
	}

	#[test]
	fn never_holds_an_unknown_node() {
		let graph = brand_universe().unwrap();
		let mut selection = Selection::default();
		selection.select(&graph, "NorX");

		assert!(!selection.select(&graph, "NorNothing"));
		assert!(!selection.select_idx(&graph, graph.len()));
		assert_eq!(selection.current(), graph.index_of("NorX"));
	}

	#[test]
	fn later_selection_replaces_earlier() {
		let graph = brand_universe().unwrap();
		let mut selection = Selection::default();
		selection.select(&graph, "NorX");
		selection.select(&graph, "NorScan");
		assert_eq!(selection.current(), graph.index_of("NorScan"));
	}
}
