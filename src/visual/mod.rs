//! Node visual factory: category + parent metadata in, procedural geometry, light,
//! label and declared animation out. Never looks at simulated positions.

pub mod geometry;
pub mod label;

use std::f64::consts::TAU;

pub use geometry::Mesh;
pub use label::{LabelLayout, LabelStyle, TextMeasure, layout_label, resolve_accent, split_brand};

use crate::color::Color;
use crate::graph::{Category, GraphNode, NodeLookup};
use crate::math::Vec3;

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
	/// Stroked edges of a mesh.
	Wireframe { mesh: Mesh, color: Color, opacity: f64 },
	/// Filled sphere, drawn as a shaded disc.
	Sphere { radius: f64, color: Color, opacity: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Part {
	pub shape: Shape,
	/// Whether the visual's self-rotation applies to this part.
	pub spins: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
	pub color: Color,
	pub intensity: f64,
	/// Falloff distance in world units.
	pub range: f64,
}

/// Continuous animation a visual asks the scene to apply every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Animation {
	Still,
	/// Angular velocity in radians per second around x and y.
	Spin { x: f64, y: f64 },
	/// Uniform scale oscillation: `1 + amplitude * sin(TAU * hz * t)`.
	Pulse { hz: f64, amplitude: f64 },
}

/// Per-frame mutable transform state of one visual; owned by the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
	pub rotation: Vec3,
	pub scale: f64,
}

impl Default for VisualState {
	fn default() -> Self {
		Self {
			rotation: Vec3::ZERO,
			scale: 1.0,
		}
	}
}

impl Animation {
	/// Advances `state` to scene time `time` after a frame of `dt` seconds.
	pub fn apply(&self, state: &mut VisualState, time: f64, dt: f64) {
		match *self {
			Self::Still => {}
			Self::Spin { x, y } => {
				state.rotation.x = (state.rotation.x + x * dt) % TAU;
				state.rotation.y = (state.rotation.y + y * dt) % TAU;
			}
			Self::Pulse { hz, amplitude } => {
				state.scale = 1.0 + amplitude * (TAU * hz * time).sin();
			}
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub category: Category,
	pub accent: Color,
	pub parts: Vec<Part>,
	pub light: PointLight,
	pub label: LabelLayout,
	pub animation: Animation,
}

impl NodeVisual {
	/// Bounding radius at rest scale, used for picking.
	pub fn radius(&self) -> f64 {
		self.parts
			.iter()
			.map(|p| match &p.shape {
				Shape::Wireframe { mesh, .. } => mesh.radius(),
				Shape::Sphere { radius, .. } => *radius,
			})
			.fold(0.0, f64::max)
	}
}

/// Builds visuals; holds the shared crystal mesh so it is generated once.
pub struct VisualFactory {
	label_style: LabelStyle,
	tool_crystal: Mesh,
}

impl Default for VisualFactory {
	fn default() -> Self {
		Self::new(LabelStyle::default())
	}
}

impl VisualFactory {
	pub fn new(label_style: LabelStyle) -> Self {
		Self {
			label_style,
			tool_crystal: Mesh::truncated_octahedron(1.98375),
		}
	}

	pub fn label_style(&self) -> &LabelStyle {
		&self.label_style
	}

	pub fn build<L: NodeLookup + ?Sized>(
		&self,
		node: &GraphNode,
		lookup: &L,
		measure: &impl TextMeasure,
	) -> NodeVisual {
		let accent = resolve_accent(node, lookup);
		let (parts, light, animation) = match node.category {
			Category::Core => core(),
			Category::Dimension => dimension(accent),
			Category::Tool => self.tool(accent),
			Category::State => state(),
			Category::Concept => concept(),
		};
		NodeVisual {
			category: node.category,
			accent,
			parts,
			light,
			label: layout_label(&node.label, accent, &self.label_style, measure),
			animation,
		}
	}

	fn tool(&self, accent: Color) -> (Vec<Part>, PointLight, Animation) {
		let parts = vec![
			spinning(Shape::Wireframe {
				mesh: self.tool_crystal.clone(),
				color: accent,
				opacity: 0.95,
			}),
			spinning(Shape::Wireframe {
				mesh: self.tool_crystal.clone(),
				color: Color::WHITE,
				opacity: 0.3,
			}),
			fixed(Shape::Sphere {
				radius: 5.29,
				color: accent,
				opacity: 0.12,
			}),
		];
		let light = PointLight {
			color: accent,
			intensity: 0.8,
			range: 40.0,
		};
		(parts, light, Animation::Spin { x: 0.12, y: 0.18 })
	}
}

fn fixed(shape: Shape) -> Part {
	Part { shape, spins: false }
}

fn spinning(shape: Shape) -> Part {
	Part { shape, spins: true }
}

fn core() -> (Vec<Part>, PointLight, Animation) {
	let parts = vec![
		fixed(Shape::Sphere {
			radius: 20.7,
			color: Color::WHITE,
			opacity: 0.9,
		}),
		fixed(Shape::Wireframe {
			mesh: Mesh::icosahedron(21.85, 1),
			color: Color::CORE_CYAN,
			opacity: 0.3,
		}),
	];
	let light = PointLight {
		color: Color::CORE_CYAN,
		intensity: 2.0,
		range: 200.0,
	};
	(parts, light, Animation::Pulse { hz: 0.25, amplitude: 0.04 })
}

fn dimension(accent: Color) -> (Vec<Part>, PointLight, Animation) {
	let parts = vec![
		fixed(Shape::Wireframe {
			mesh: Mesh::icosahedron(11.5, 0),
			color: accent,
			opacity: 0.9,
		}),
		fixed(Shape::Wireframe {
			mesh: Mesh::octahedron(6.9),
			color: accent,
			opacity: 0.5,
		}),
		fixed(Shape::Sphere {
			radius: 9.2,
			color: accent,
			opacity: 0.2,
		}),
	];
	let light = PointLight {
		color: accent,
		intensity: 1.5,
		range: 120.0,
	};
	(parts, light, Animation::Still)
}

fn state() -> (Vec<Part>, PointLight, Animation) {
	let parts = vec![fixed(Shape::Sphere {
		radius: 5.75,
		color: Color::STATE_RED,
		opacity: 0.7,
	})];
	let light = PointLight {
		color: Color::STATE_RED,
		intensity: 0.6,
		range: 40.0,
	};
	(parts, light, Animation::Pulse { hz: 0.8, amplitude: 0.15 })
}

fn concept() -> (Vec<Part>, PointLight, Animation) {
	let parts = vec![fixed(Shape::Wireframe {
		mesh: Mesh::octahedron(6.9),
		color: Color::CONCEPT_GOLD,
		opacity: 0.8,
	})];
	let light = PointLight {
		color: Color::CONCEPT_GOLD,
		intensity: 0.8,
		range: 50.0,
	};
	(parts, light, Animation::Still)
}
