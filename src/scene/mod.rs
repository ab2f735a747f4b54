//! Scene/camera controller: owns the layout, node visuals, background cages and
//! camera, and applies every per-frame mutation from one `frame` call.

pub mod camera;

use std::f64::consts::TAU;

use log::debug;

pub use camera::{Camera, CameraTween, Fog, OrbitControls, OrbitSettings, Projected, Viewport};

use crate::color::Color;
use crate::graph::{Graph, NodeIdx};
use crate::layout::{ForceLayout, LayoutConfig};
use crate::math::Vec3;
use crate::visual::{Mesh, NodeVisual, TextMeasure, VisualFactory, VisualState};

#[derive(Clone, Debug)]
pub struct SceneConfig {
	pub camera_distance: f64,
	pub fov_deg: f64,
	pub orbit: OrbitSettings,
	pub fog: Fog,
	/// Camera distance kept from a focused node.
	pub standoff: f64,
	/// Seconds the focus transition takes.
	pub focus_duration: f64,
	pub enable_node_drag: bool,
	/// Smallest on-screen pick radius, in pixels.
	pub min_pick_radius: f64,
	pub particles_per_link: usize,
	/// Link lengths a particle travels per second.
	pub particle_speed: f64,
}

impl Default for SceneConfig {
	fn default() -> Self {
		Self {
			camera_distance: 400.0,
			fov_deg: 50.0,
			orbit: OrbitSettings::default(),
			fog: Fog {
				color: Color::BACKGROUND,
				near: 200.0,
				far: 800.0,
			},
			standoff: 150.0,
			focus_duration: 1.0,
			enable_node_drag: false,
			min_pick_radius: 8.0,
			particles_per_link: 2,
			particle_speed: 0.18,
		}
	}
}

pub struct SceneObject {
	pub node: NodeIdx,
	pub visual: NodeVisual,
	pub state: VisualState,
	pub position: Vec3,
}

/// Decorative wireframe shell that slowly turns and breathes. Never picked.
#[derive(Clone, Debug)]
pub struct BackgroundCage {
	pub mesh: Mesh,
	pub color: Color,
	pub opacity: f64,
	pub rotation: Vec3,
	pub scale: f64,
	/// Radians per second.
	spin: Vec3,
	breath_amplitude: f64,
	/// Radians of breathing phase per second.
	breath_rate: f64,
}

impl BackgroundCage {
	fn new(mesh: Mesh, opacity: f64, spin: Vec3, breath_amplitude: f64, breath_rate: f64) -> Self {
		Self {
			mesh,
			color: Color::CAGE_BLUE,
			opacity,
			rotation: Vec3::ZERO,
			scale: 1.0,
			spin,
			breath_amplitude,
			breath_rate,
		}
	}

	fn advance(&mut self, time: f64, dt: f64) {
		self.rotation += self.spin * dt;
		self.rotation = Vec3::new(
			self.rotation.x % TAU,
			self.rotation.y % TAU,
			self.rotation.z % TAU,
		);
		self.scale = 1.0 + (time * self.breath_rate).sin() * self.breath_amplitude;
	}

	pub fn world_vertex(&self, v: Vec3) -> Vec3 {
		v.rotate_euler(self.rotation) * self.scale
	}
}

fn default_cages() -> Vec<BackgroundCage> {
	vec![
		BackgroundCage::new(
			Mesh::icosahedron(500.0, 2),
			0.15,
			Vec3::new(0.006, 0.012, 0.0),
			0.05,
			0.3,
		),
		BackgroundCage::new(
			Mesh::icosahedron(680.0, 1),
			0.08,
			Vec3::new(0.0, -0.007, 0.003),
			0.03,
			0.21,
		),
	]
}

struct Drag {
	node: NodeIdx,
	depth: f64,
}

pub struct SceneController {
	config: SceneConfig,
	camera: Camera,
	controls: OrbitControls,
	layout: ForceLayout,
	objects: Vec<SceneObject>,
	links: Vec<(NodeIdx, NodeIdx)>,
	cages: Vec<BackgroundCage>,
	tween: Option<CameraTween>,
	drag: Option<Drag>,
	viewport: Viewport,
	time: f64,
}

impl SceneController {
	/// Builds every node visual once and runs the layout warm-up.
	pub fn new(
		graph: &Graph,
		layout_config: LayoutConfig,
		config: SceneConfig,
		factory: &VisualFactory,
		measure: &impl TextMeasure,
		viewport: Viewport,
	) -> Self {
		let layout = ForceLayout::new(graph.len(), graph.links(), layout_config);
		let objects = graph
			.nodes()
			.iter()
			.enumerate()
			.map(|(idx, node)| SceneObject {
				node: idx,
				visual: factory.build(node, graph, measure),
				state: VisualState::default(),
				position: layout.position(idx),
			})
			.collect();

		Self {
			camera: Camera::looking_at_origin(config.camera_distance, config.fov_deg),
			controls: OrbitControls::new(config.orbit.clone()),
			config,
			layout,
			objects,
			links: graph.links().to_vec(),
			cages: default_cages(),
			tween: None,
			drag: None,
			viewport,
			time: 0.0,
		}
	}

	/// The single per-frame update: simulation, transforms, animations, cages,
	/// controls, then any running camera transition.
	pub fn frame(&mut self, dt: f64) {
		self.time += dt;

		if let Some(tick) = self.layout.step() {
			for obj in &mut self.objects {
				obj.position = self.layout.position(obj.node);
			}
			if self.layout.is_cooled() {
				debug!("layout cooled after {} ticks (alpha {:.4})", tick.index, tick.alpha);
			}
		}
		for obj in &mut self.objects {
			obj.visual.animation.apply(&mut obj.state, self.time, dt);
		}
		for cage in &mut self.cages {
			cage.advance(self.time, dt);
		}

		self.controls.update(&mut self.camera);
		if let Some(tween) = &mut self.tween {
			if tween.advance(dt, &mut self.camera) {
				self.tween = None;
			}
		}
	}

	/// Starts (or re-targets) the camera transition onto a node.
	pub fn focus(&mut self, idx: NodeIdx) {
		let node = self.objects[idx].position;
		let eye = camera::focus_position(node, self.config.standoff);
		self.tween = Some(CameraTween::new(&self.camera, eye, node, self.config.focus_duration));
	}

	/// Front-most node under the screen point, if any.
	pub fn pick(&self, sx: f64, sy: f64) -> Option<NodeIdx> {
		self.objects
			.iter()
			.filter_map(|obj| {
				let p = self.camera.project(obj.position, self.viewport)?;
				let radius = (obj.visual.radius() * obj.state.scale * p.scale)
					.max(self.config.min_pick_radius);
				let (dx, dy) = (p.x - sx, p.y - sy);
				(dx * dx + dy * dy <= radius * radius).then_some((obj.node, p.depth))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(idx, _)| idx)
	}

	/// Pins the node under the pointer so it follows drag motion.
	pub fn begin_drag(&mut self, idx: NodeIdx) -> bool {
		if !self.config.enable_node_drag {
			return false;
		}
		let position = self.objects[idx].position;
		let Some(p) = self.camera.project(position, self.viewport) else {
			return false;
		};
		self.layout.pin(idx, position);
		self.layout.reheat();
		self.drag = Some(Drag {
			node: idx,
			depth: p.depth,
		});
		true
	}

	pub fn drag_by(&mut self, dx: f64, dy: f64) {
		let Some(drag) = &self.drag else {
			return;
		};
		let idx = drag.node;
		let delta = self.camera.screen_delta(dx, dy, drag.depth, self.viewport);
		let position = self.layout.position(idx) + delta;
		self.layout.pin(idx, position);
		self.objects[idx].position = position;
	}

	pub fn end_drag(&mut self) {
		if let Some(drag) = self.drag.take() {
			self.layout.unpin(drag.node);
		}
	}

	pub fn orbit(&mut self, dx: f64, dy: f64) {
		self.controls.rotate(dx, dy, self.viewport);
	}

	pub fn zoom(&mut self, delta_y: f64) {
		self.controls.zoom(delta_y);
	}

	pub fn pan(&mut self, dx: f64, dy: f64) {
		self.controls.pan(dx, dy, &self.camera, self.viewport);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport = Viewport { width, height };
	}

	/// World positions of the directional particles travelling along each link.
	pub fn link_particles(&self) -> impl Iterator<Item = Vec3> + '_ {
		let count = self.config.particles_per_link;
		let phase = self.time * self.config.particle_speed;
		self.links.iter().flat_map(move |&(s, t)| {
			let (a, b) = (self.objects[s].position, self.objects[t].position);
			(0..count).map(move |k| {
				let u = (phase + k as f64 / count as f64).fract();
				a.lerp(b, u)
			})
		})
	}

	pub fn project(&self, point: Vec3) -> Option<Projected> {
		self.camera.project(point, self.viewport)
	}

	#[cfg(test)]
	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	#[cfg(test)]
	pub fn tween(&self) -> Option<&CameraTween> {
		self.tween.as_ref()
	}

	pub fn objects(&self) -> &[SceneObject] {
		&self.objects
	}

	pub fn links(&self) -> &[(NodeIdx, NodeIdx)] {
		&self.links
	}

	pub fn cages(&self) -> &[BackgroundCage] {
		&self.cages
	}

	pub fn fog(&self) -> &Fog {
		&self.config.fog
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	#[cfg(test)]
	pub fn layout(&self) -> &ForceLayout {
		&self.layout
	}
}
