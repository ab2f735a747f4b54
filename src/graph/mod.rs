//! Validated, immutable node/link sets with O(1) id lookup.

mod data;
mod types;

use std::collections::HashMap;

pub use data::brand_universe;
pub use types::{Category, GraphData, GraphNode};

use crate::error::DataError;

/// Dense index of a node inside a [`Graph`].
pub type NodeIdx = usize;

/// Anything that can resolve a node id to its node.
pub trait NodeLookup {
	fn lookup(&self, id: &str) -> Option<&GraphNode>;

	fn parent_of(&self, node: &GraphNode) -> Option<&GraphNode> {
		node.parent.as_deref().and_then(|id| self.lookup(id))
	}
}

impl NodeLookup for [GraphNode] {
	fn lookup(&self, id: &str) -> Option<&GraphNode> {
		self.iter().find(|n| n.id == id)
	}
}

pub struct Graph {
	nodes: Vec<GraphNode>,
	links: Vec<(NodeIdx, NodeIdx)>,
	index: HashMap<String, NodeIdx>,
}

impl Graph {
	/// Validates `data` and builds the id index. Any dangling reference rejects
	/// the whole dataset.
	pub fn new(data: GraphData) -> Result<Self, DataError> {
		let mut index = HashMap::with_capacity(data.nodes.len());
		for (i, node) in data.nodes.iter().enumerate() {
			if index.insert(node.id.clone(), i).is_some() {
				return Err(DataError::DuplicateNode(node.id.clone()));
			}
		}

		for node in &data.nodes {
			if node.category == Category::Dimension && node.color.is_none() {
				return Err(DataError::MissingDimensionColor(node.id.clone()));
			}
			if let Some(parent) = &node.parent {
				if !index.contains_key(parent) {
					return Err(DataError::UnknownParent {
						node: node.id.clone(),
						parent: parent.clone(),
					});
				}
			}
			if let Some(tool) = node.tools.iter().find(|t| !index.contains_key(*t)) {
				return Err(DataError::UnknownTool {
					node: node.id.clone(),
					tool: tool.clone(),
				});
			}
		}

		let links = data
			.links
			.iter()
			.map(|link| {
				let resolve = |id: &String| {
					index.get(id).copied().ok_or_else(|| DataError::UnknownLinkEndpoint {
						from: link.source.clone(),
						to: link.target.clone(),
						missing: id.clone(),
					})
				};
				Ok((resolve(&link.source)?, resolve(&link.target)?))
			})
			.collect::<Result<Vec<_>, DataError>>()?;

		Ok(Self {
			nodes: data.nodes,
			links,
			index,
		})
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, idx: NodeIdx) -> &GraphNode {
		&self.nodes[idx]
	}

	pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
		self.index.get(id).copied()
	}

	/// Links as index pairs, in dataset order (duplicates preserved).
	pub fn links(&self) -> &[(NodeIdx, NodeIdx)] {
		&self.links
	}

	/// Resolves a node's `tools` ids into `(index, node)` pairs.
	pub fn tools_of(&self, node: &GraphNode) -> Vec<(NodeIdx, &GraphNode)> {
		node.tools
			.iter()
			.filter_map(|id| self.index_of(id).map(|i| (i, &self.nodes[i])))
			.collect()
	}
}

impl NodeLookup for Graph {
	fn lookup(&self, id: &str) -> Option<&GraphNode> {
		self.index_of(id).map(|i| &self.nodes[i])
	}
}

#[cfg(test)]
mod tests {
	use super::types::GraphLink;
	use super::*;
	use crate::color::Color;

	fn blue() -> Color {
		Color::from_hex("#007FFF").unwrap()
	}

	fn small() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode::new("HUB", Category::Core),
				GraphNode::new("NorX", Category::Dimension).with_color(blue()),
				GraphNode::new("NorScan", Category::Tool).with_parent("NorX"),
			],
			links: vec![
				GraphLink::new("HUB", "NorX"),
				GraphLink::new("NorX", "NorScan"),
				GraphLink::new("NorX", "NorScan"),
			],
		}
	}

	#[test]
	fn builds_index_and_keeps_duplicate_links() {
		let graph = Graph::new(small()).unwrap();
		assert_eq!(graph.len(), 3);
		assert_eq!(graph.index_of("NorScan"), Some(2));
		assert_eq!(graph.links(), &[(0, 1), (1, 2), (1, 2)]);
	}

	#[test]
	fn resolves_parent() {
		let graph = Graph::new(small()).unwrap();
		let tool = graph.node(2);
		assert_eq!(graph.parent_of(tool).map(|p| p.id.as_str()), Some("NorX"));
		assert!(graph.parent_of(graph.node(0)).is_none());
	}

	#[test]
	fn rejects_unknown_parent() {
		let mut data = small();
		data.nodes[2].parent = Some("NorQ".into());
		assert!(matches!(
			Graph::new(data),
			Err(DataError::UnknownParent { parent, .. }) if parent == "NorQ"
		));
	}

	#[test]
	fn rejects_dangling_link() {
		let mut data = small();
		data.links.push(GraphLink::new("HUB", "ghost"));
		assert!(matches!(
			Graph::new(data),
			Err(DataError::UnknownLinkEndpoint { missing, .. }) if missing == "ghost"
		));
	}

	#[test]
	fn rejects_duplicate_ids_and_colorless_dimensions() {
		let mut data = small();
		data.nodes.push(GraphNode::new("HUB", Category::Concept));
		assert!(matches!(Graph::new(data), Err(DataError::DuplicateNode(_))));

		let mut data = small();
		data.nodes[1].color = None;
		assert!(matches!(Graph::new(data), Err(DataError::MissingDimensionColor(_))));
	}

	#[test]
	fn rejects_unknown_tool_and_resolves_known_ones() {
		let mut data = small();
		data.nodes[1].tools = vec!["NorScan".into()];
		let graph = Graph::new(data.clone()).unwrap();
		let tools = graph.tools_of(graph.node(1));
		assert_eq!(tools.len(), 1);
		assert_eq!(tools[0].0, 2);

		data.nodes[1].tools.push("NorLost".into());
		assert!(matches!(Graph::new(data), Err(DataError::UnknownTool { .. })));
	}
}
