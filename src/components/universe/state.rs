use crate::graph::NodeIdx;
use crate::scene::SceneController;

/// Pointer travel, in pixels, below which a press/release counts as a click.
pub const CLICK_SLOP: f64 = 5.0;

/// Per-second approach rate of the hover highlight.
const HIGHLIGHT_RATE: f64 = 8.0;

/// Step used for the very first frame, before there is a previous timestamp.
const FIRST_FRAME_DT: f64 = 1.0 / 60.0;
/// Longest step a single frame may take, in seconds; covers backgrounded tabs.
const MAX_FRAME_DT: f64 = 0.1;

pub const BUTTON_PRIMARY: i16 = 0;
pub const BUTTON_SECONDARY: i16 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
	Orbit,
	Pan,
	DragNode,
}

#[derive(Clone, Debug)]
struct PointerState {
	gesture: Gesture,
	last_x: f64,
	last_y: f64,
	travel: f64,
}

pub struct UniverseState {
	pub scene: SceneController,
	pub hovered: Option<NodeIdx>,
	/// Node the highlight is drawn on; lingers while it fades out.
	pub highlighted: Option<NodeIdx>,
	/// 0..=1 highlight strength.
	pub highlight_t: f64,
	pointer: Option<PointerState>,
	last_frame_ms: Option<f64>,
}

impl UniverseState {
	pub fn new(scene: SceneController) -> Self {
		Self {
			scene,
			hovered: None,
			highlighted: None,
			highlight_t: 0.0,
			pointer: None,
			last_frame_ms: None,
		}
	}

	/// Advances to the animation-frame timestamp `now_ms` by the real elapsed time.
	pub fn frame_at(&mut self, now_ms: f64) {
		let dt = match self.last_frame_ms.replace(now_ms) {
			Some(prev) => ((now_ms - prev) / 1000.0).clamp(0.0, MAX_FRAME_DT),
			None => FIRST_FRAME_DT,
		};
		self.tick(dt);
	}

	pub fn tick(&mut self, dt: f64) {
		self.scene.frame(dt);

		let target = if self.hovered.is_some() { 1.0 } else { 0.0 };
		self.highlight_t += (target - self.highlight_t) * (HIGHLIGHT_RATE * dt).min(1.0);
		if self.hovered.is_some() {
			self.highlighted = self.hovered;
		} else if self.highlight_t < 0.01 {
			self.highlight_t = 0.0;
			self.highlighted = None;
		}
	}

	pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) {
		let gesture = match button {
			BUTTON_SECONDARY => Gesture::Pan,
			_ => match self.scene.pick(x, y) {
				Some(idx) if self.scene.begin_drag(idx) => Gesture::DragNode,
				_ => Gesture::Orbit,
			},
		};
		self.pointer = Some(PointerState {
			gesture,
			last_x: x,
			last_y: y,
			travel: 0.0,
		});
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let Some(pointer) = &mut self.pointer else {
			self.hovered = self.scene.pick(x, y);
			return;
		};
		let (dx, dy) = (x - pointer.last_x, y - pointer.last_y);
		pointer.last_x = x;
		pointer.last_y = y;
		pointer.travel += dx.hypot(dy);

		match pointer.gesture {
			Gesture::Orbit => self.scene.orbit(dx, dy),
			Gesture::Pan => self.scene.pan(dx, dy),
			Gesture::DragNode => self.scene.drag_by(dx, dy),
		}
	}

	/// Ends the gesture; returns the node under the pointer when it was a click.
	pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<NodeIdx> {
		let pointer = self.pointer.take()?;
		if pointer.gesture == Gesture::DragNode {
			self.scene.end_drag();
		}
		if pointer.gesture == Gesture::Pan || pointer.travel >= CLICK_SLOP {
			return None;
		}
		self.scene.pick(x, y)
	}

	pub fn pointer_leave(&mut self) {
		if let Some(pointer) = self.pointer.take() {
			if pointer.gesture == Gesture::DragNode {
				self.scene.end_drag();
			}
		}
		self.hovered = None;
	}

	pub fn wheel(&mut self, delta_y: f64) {
		self.scene.zoom(delta_y);
	}

	pub fn cursor(&self) -> &'static str {
		match (&self.pointer, self.hovered) {
			(Some(_), _) => "grabbing",
			(None, Some(_)) => "pointer",
			(None, None) => "grab",
		}
	}
}
