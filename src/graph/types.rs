use serde::Deserialize;

use crate::color::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
	Core,
	Dimension,
	Tool,
	State,
	Concept,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	pub id: String,
	#[serde(rename = "group")]
	pub category: Category,
	pub label: String,
	#[serde(default)]
	pub color: Option<Color>,
	#[serde(default)]
	pub parent: Option<String>,
	#[serde(default)]
	pub tagline: Option<String>,
	#[serde(default, rename = "desc")]
	pub description: Option<String>,
	#[serde(default)]
	pub strengths: Vec<String>,
	#[serde(default, rename = "toolsList")]
	pub tools: Vec<String>,
}

#[cfg(test)]
impl GraphNode {
	pub fn new(id: &str, category: Category) -> Self {
		Self {
			id: id.into(),
			category,
			label: id.into(),
			color: None,
			parent: None,
			tagline: None,
			description: None,
			strengths: Vec::new(),
			tools: Vec::new(),
		}
	}

	pub fn with_color(mut self, color: Color) -> Self {
		self.color = Some(color);
		self
	}

	pub fn with_parent(mut self, parent: &str) -> Self {
		self.parent = Some(parent.into());
		self
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

#[cfg(test)]
impl GraphLink {
	pub fn new(source: &str, target: &str) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}
