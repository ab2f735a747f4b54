//! Billboard labels: brand prefix in a neutral color, the rest in the node's accent,
//! laid out from measured segment widths into one pixel-sized image.

use crate::color::Color;
use crate::graph::{Category, GraphNode, NodeLookup};

/// Measures rendered text width in pixels for the label font.
pub trait TextMeasure {
	fn measure(&self, text: &str) -> f64;
}

#[derive(Clone, Debug)]
pub struct LabelStyle {
	pub font_px: f64,
	pub font_weight: u16,
	pub font_family: &'static str,
	pub brand_prefix: &'static str,
	pub prefix_color: Color,
	pub padding_px: f64,
	/// Pixels per world unit when the label image is placed in the scene.
	pub world_scale: f64,
	/// Vertical offset of the label's top edge from the node origin.
	pub offset_y: f64,
}

impl Default for LabelStyle {
	fn default() -> Self {
		Self {
			font_px: 60.0,
			font_weight: 700,
			font_family: "Arial, sans-serif",
			brand_prefix: "Nor",
			prefix_color: Color::WHITE,
			padding_px: 10.0,
			world_scale: 14.12,
			offset_y: -17.0,
		}
	}
}

impl LabelStyle {
	pub fn font(&self) -> String {
		format!("{} {}px {}", self.font_weight, self.font_px, self.font_family)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelSegment {
	pub text: String,
	pub color: Color,
	/// Left edge in image pixels.
	pub x: f64,
}

/// Pixel layout of one label image.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLayout {
	pub segments: Vec<LabelSegment>,
	pub width_px: f64,
	pub height_px: f64,
	/// Vertical middle line the text is centred on.
	pub baseline_y: f64,
	pub world_scale: f64,
	pub offset_y: f64,
}

impl LabelLayout {
	/// Size of the label quad in world units.
	pub fn world_size(&self) -> (f64, f64) {
		(self.width_px / self.world_scale, self.height_px / self.world_scale)
	}
}

/// Accent color a node's label suffix is drawn in.
pub fn resolve_accent<L: NodeLookup + ?Sized>(node: &GraphNode, lookup: &L) -> Color {
	match node.category {
		Category::Dimension => node.color.unwrap_or(Color::WHITE),
		Category::Tool => lookup
			.parent_of(node)
			.and_then(|p| p.color)
			.unwrap_or(Color::TOOL_FALLBACK),
		Category::Core | Category::State | Category::Concept => Color::WHITE,
	}
}

/// Splits `text` into the brand prefix and the rest. Labels without the prefix
/// come back whole as the second half.
pub fn split_brand<'a>(text: &'a str, prefix: &'a str) -> (&'a str, &'a str) {
	match text.strip_prefix(prefix) {
		Some(rest) => (prefix, rest),
		None => ("", text),
	}
}

pub fn layout_label(
	text: &str,
	accent: Color,
	style: &LabelStyle,
	measure: &impl TextMeasure,
) -> LabelLayout {
	let (prefix, suffix) = split_brand(text, style.brand_prefix);

	let width = |s: &str| if s.is_empty() { 0.0 } else { measure.measure(s) };
	let (prefix_width, suffix_width) = (width(prefix), width(suffix));
	let text_height = style.font_px * 1.5;

	let mut segments = Vec::with_capacity(2);
	if !prefix.is_empty() {
		segments.push(LabelSegment {
			text: prefix.into(),
			color: style.prefix_color,
			x: style.padding_px,
		});
	}
	if !suffix.is_empty() {
		segments.push(LabelSegment {
			text: suffix.into(),
			color: accent,
			x: style.padding_px + prefix_width,
		});
	}

	LabelLayout {
		segments,
		width_px: (prefix_width + suffix_width + 2.0 * style.padding_px).ceil(),
		height_px: (text_height + style.padding_px).ceil(),
		baseline_y: text_height / 2.0 + style.padding_px / 2.0,
		world_scale: style.world_scale,
		offset_y: style.offset_y,
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::graph::{Category, GraphNode};

	/// Every character is `px` wide.
	pub(crate) struct Monospace(pub f64);

	impl TextMeasure for Monospace {
		fn measure(&self, text: &str) -> f64 {
			text.chars().count() as f64 * self.0
		}
	}

	fn blue() -> Color {
		Color::from_hex("#007FFF").unwrap()
	}

	fn nodes() -> Vec<GraphNode> {
		vec![
			GraphNode::new("NorX", Category::Dimension).with_color(blue()),
			GraphNode::new("NorScan", Category::Tool).with_parent("NorX"),
			GraphNode::new("NorLost", Category::Tool).with_parent("NorGone"),
			GraphNode::new("NorSolo", Category::Tool),
			GraphNode::new("NorBlind", Category::State).with_parent("NorScan"),
		]
	}

	#[test]
	fn tool_inherits_parent_dimension_color() {
		let nodes = nodes();
		assert_eq!(resolve_accent(&nodes[1], nodes.as_slice()).to_hex(), "#007FFF");
		assert_eq!(resolve_accent(&nodes[0], nodes.as_slice()), blue());
	}

	#[test]
	fn tool_without_resolvable_parent_falls_back() {
		let nodes = nodes();
		assert_eq!(resolve_accent(&nodes[2], nodes.as_slice()), Color::TOOL_FALLBACK);
		assert_eq!(resolve_accent(&nodes[3], nodes.as_slice()), Color::TOOL_FALLBACK);
	}

	#[test]
	fn other_categories_use_neutral() {
		let nodes = nodes();
		assert_eq!(resolve_accent(&nodes[4], nodes.as_slice()), Color::WHITE);
	}

	#[test]
	fn segments_are_contiguous() {
		let style = LabelStyle::default();
		let layout = layout_label("NorScan", blue(), &style, &Monospace(30.0));

		assert_eq!(layout.segments.len(), 2);
		let (prefix, suffix) = (&layout.segments[0], &layout.segments[1]);
		assert_eq!((prefix.text.as_str(), prefix.color), ("Nor", Color::WHITE));
		assert_eq!((suffix.text.as_str(), suffix.color), ("Scan", blue()));
		assert_eq!(prefix.x, 10.0);
		assert_eq!(suffix.x, 10.0 + 90.0);
		assert_eq!(layout.width_px, 7.0 * 30.0 + 20.0);
		assert_eq!(layout.height_px, 100.0);
	}

	#[test]
	fn unbranded_label_is_all_accent() {
		let layout = layout_label("NEXUS", Color::WHITE, &LabelStyle::default(), &Monospace(10.0));
		assert_eq!(layout.segments.len(), 1);
		assert_eq!(layout.segments[0].text, "NEXUS");
		assert_eq!(layout.segments[0].x, 10.0);
	}

	#[test]
	fn brand_split() {
		assert_eq!(split_brand("NorWave", "Nor"), ("Nor", "Wave"));
		assert_eq!(split_brand("Noah's Arc", "Nor"), ("", "Noah's Arc"));
		assert_eq!(split_brand("Nor", "Nor"), ("Nor", ""));
	}

	#[test]
	fn world_size_uses_fixed_scale() {
		let style = LabelStyle {
			world_scale: 10.0,
			..LabelStyle::default()
		};
		let layout = layout_label("NorX", blue(), &style, &Monospace(20.0));
		assert_eq!(layout.world_size(), (10.0, 10.0));
	}
}
