use std::f64::consts::{PI, TAU};

use crate::color::Color;
use crate::math::{Vec3, ease_out_quad};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

/// A world point mapped to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub x: f64,
	pub y: f64,
	/// Distance along the view direction.
	pub depth: f64,
	/// Pixels per world unit at this depth.
	pub scale: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	pub position: Vec3,
	pub target: Vec3,
	/// Vertical field of view in radians.
	pub fov_y: f64,
	pub near: f64,
}

impl Camera {
	pub fn looking_at_origin(distance: f64, fov_deg: f64) -> Self {
		Self {
			position: Vec3::new(0.0, 0.0, distance),
			target: Vec3::ZERO,
			fov_y: fov_deg.to_radians(),
			near: 1.0,
		}
	}

	/// (right, up, forward) unit vectors.
	pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
		let forward = (self.target - self.position).normalize_or_zero();
		let mut right = forward.cross(Vec3::Y).normalize_or_zero();
		if right == Vec3::ZERO {
			right = Vec3::X;
		}
		(right, right.cross(forward), forward)
	}

	pub fn focal_length(&self, viewport: Viewport) -> f64 {
		viewport.height / 2.0 / (self.fov_y / 2.0).tan()
	}

	pub fn distance(&self) -> f64 {
		self.position.distance(self.target)
	}

	/// `None` when the point is behind the near plane.
	pub fn project(&self, point: Vec3, viewport: Viewport) -> Option<Projected> {
		let (right, up, forward) = self.basis();
		let rel = point - self.position;
		let depth = rel.dot(forward);
		if depth < self.near {
			return None;
		}
		let scale = self.focal_length(viewport) / depth;
		Some(Projected {
			x: viewport.width / 2.0 + rel.dot(right) * scale,
			y: viewport.height / 2.0 - rel.dot(up) * scale,
			depth,
			scale,
		})
	}

	/// World-space displacement for a screen drag of (dx, dy) pixels at `depth`.
	pub fn screen_delta(&self, dx: f64, dy: f64, depth: f64, viewport: Viewport) -> Vec3 {
		let (right, up, _) = self.basis();
		let per_px = depth / self.focal_length(viewport);
		right * (dx * per_px) - up * (dy * per_px)
	}
}

#[derive(Clone, Debug)]
pub struct OrbitSettings {
	/// Fraction of pending motion applied per frame; 0 disables damping.
	pub damping: f64,
	pub rotate_speed: f64,
	pub zoom_speed: f64,
	pub min_distance: f64,
	pub max_distance: f64,
}

impl Default for OrbitSettings {
	fn default() -> Self {
		Self {
			damping: 0.05,
			rotate_speed: 0.5,
			zoom_speed: 0.8,
			min_distance: 20.0,
			max_distance: 1500.0,
		}
	}
}

/// Orbit/zoom/pan around the camera target with damped inertia.
#[derive(Clone, Debug)]
pub struct OrbitControls {
	settings: OrbitSettings,
	theta_delta: f64,
	phi_delta: f64,
	zoom_scale: f64,
	pan_offset: Vec3,
}

impl OrbitControls {
	pub fn new(settings: OrbitSettings) -> Self {
		Self {
			settings,
			theta_delta: 0.0,
			phi_delta: 0.0,
			zoom_scale: 1.0,
			pan_offset: Vec3::ZERO,
		}
	}

	pub fn rotate(&mut self, dx: f64, dy: f64, viewport: Viewport) {
		let k = TAU * self.settings.rotate_speed / viewport.height;
		self.theta_delta -= dx * k;
		self.phi_delta -= dy * k;
	}

	/// Positive `delta_y` (wheel down) moves away from the target.
	pub fn zoom(&mut self, delta_y: f64) {
		let step = 0.95f64.powf(self.settings.zoom_speed);
		if delta_y > 0.0 {
			self.zoom_scale /= step;
		} else if delta_y < 0.0 {
			self.zoom_scale *= step;
		}
	}

	pub fn pan(&mut self, dx: f64, dy: f64, camera: &Camera, viewport: Viewport) {
		self.pan_offset += camera.screen_delta(-dx, -dy, camera.distance(), viewport);
	}

	pub fn update(&mut self, camera: &mut Camera) {
		let offset = camera.position - camera.target;
		let radius = offset.length().max(f64::EPSILON);
		let mut theta = offset.x.atan2(offset.z);
		let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

		let damping = self.settings.damping;
		let apply = if damping > 0.0 { damping } else { 1.0 };
		theta += self.theta_delta * apply;
		phi = (phi + self.phi_delta * apply).clamp(1e-6, PI - 1e-6);
		let radius = (radius * self.zoom_scale)
			.clamp(self.settings.min_distance, self.settings.max_distance);
		camera.target += self.pan_offset * apply;

		camera.position = camera.target
			+ Vec3::new(
				radius * phi.sin() * theta.sin(),
				radius * phi.cos(),
				radius * phi.sin() * theta.cos(),
			);

		let keep = if damping > 0.0 { 1.0 - damping } else { 0.0 };
		self.theta_delta *= keep;
		self.phi_delta *= keep;
		self.pan_offset *= keep;
		self.zoom_scale = 1.0;
	}
}

/// Camera position that frames `node` from `standoff` further out along the
/// origin→node ray. A node at the origin is framed from +z.
pub fn focus_position(node: Vec3, standoff: f64) -> Vec3 {
	let len = node.length();
	if len < 1e-9 {
		return node + Vec3::Z * standoff;
	}
	node * (1.0 + standoff / len)
}

/// Eased interpolation of camera position and look-at target.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraTween {
	from_position: Vec3,
	from_target: Vec3,
	pub to_position: Vec3,
	pub to_target: Vec3,
	elapsed: f64,
	duration: f64,
}

impl CameraTween {
	pub fn new(camera: &Camera, to_position: Vec3, to_target: Vec3, duration: f64) -> Self {
		Self {
			from_position: camera.position,
			from_target: camera.target,
			to_position,
			to_target,
			elapsed: 0.0,
			duration,
		}
	}

	/// Moves the camera; returns `true` once the tween has finished.
	pub fn advance(&mut self, dt: f64, camera: &mut Camera) -> bool {
		self.elapsed += dt;
		let t = if self.duration > 0.0 {
			(self.elapsed / self.duration).min(1.0)
		} else {
			1.0
		};
		let k = ease_out_quad(t);
		camera.position = self.from_position.lerp(self.to_position, k);
		camera.target = self.from_target.lerp(self.to_target, k);
		t >= 1.0
	}
}

/// Linear depth fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
	pub color: Color,
	pub near: f64,
	pub far: f64,
}

impl Fog {
	/// 1 at or before `near`, 0 at or beyond `far`.
	pub fn visibility(&self, depth: f64) -> f64 {
		1.0 - ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
	}
}

#[cfg(test)]
mod tests {
	use approx::assert_relative_eq;

	use super::*;

	const VIEW: Viewport = Viewport {
		width: 800.0,
		height: 600.0,
	};

	#[test]
	fn target_projects_to_center() {
		let camera = Camera::looking_at_origin(400.0, 50.0);
		let p = camera.project(Vec3::ZERO, VIEW).unwrap();
		assert_relative_eq!(p.x, 400.0);
		assert_relative_eq!(p.y, 300.0);
		assert_relative_eq!(p.depth, 400.0);
	}

	#[test]
	fn screen_axes_match_world_axes() {
		let camera = Camera::looking_at_origin(400.0, 50.0);
		let right = camera.project(Vec3::new(10.0, 0.0, 0.0), VIEW).unwrap();
		let up = camera.project(Vec3::new(0.0, 10.0, 0.0), VIEW).unwrap();
		assert!(right.x > 400.0);
		assert!(up.y < 300.0);
		assert!(camera.project(Vec3::new(0.0, 0.0, 500.0), VIEW).is_none());
	}

	#[test]
	fn screen_delta_inverts_projection() {
		let camera = Camera::looking_at_origin(400.0, 50.0);
		let moved = camera.screen_delta(25.0, -10.0, 400.0, VIEW);
		let p = camera.project(moved, VIEW).unwrap();
		assert_relative_eq!(p.x, 425.0, epsilon = 1e-9);
		assert_relative_eq!(p.y, 290.0, epsilon = 1e-9);
	}

	#[test]
	fn focus_position_is_colinear_at_standoff() {
		let node = Vec3::new(30.0, -40.0, 120.0);
		let eye = focus_position(node, 150.0);
		assert_relative_eq!(node.cross(eye).length(), 0.0, epsilon = 1e-9);
		assert!(eye.dot(node) > 0.0);
		assert_relative_eq!(eye.length() / node.length(), 1.0 + 150.0 / node.length());
		assert_relative_eq!(eye.distance(node), 150.0, epsilon = 1e-9);
	}

	#[test]
	fn focus_on_origin_backs_off_along_z() {
		assert_eq!(focus_position(Vec3::ZERO, 150.0), Vec3::new(0.0, 0.0, 150.0));
	}

	#[test]
	fn tween_eases_to_destination() {
		let mut camera = Camera::looking_at_origin(400.0, 50.0);
		let to = Vec3::new(100.0, 0.0, 100.0);
		let mut tween = CameraTween::new(&camera, to, Vec3::new(10.0, 0.0, 0.0), 1.0);

		assert!(!tween.advance(0.5, &mut camera));
		let halfway = camera.position;
		// ease-out covers more than half the way in half the time
		assert!(halfway.distance(to) < Vec3::new(0.0, 0.0, 400.0).distance(to) / 2.0);

		assert!(tween.advance(0.6, &mut camera));
		assert_eq!(camera.position, to);
		assert_eq!(camera.target, Vec3::new(10.0, 0.0, 0.0));
	}

	#[test]
	fn damped_orbit_preserves_distance_and_settles() {
		let mut camera = Camera::looking_at_origin(400.0, 50.0);
		let mut controls = OrbitControls::new(OrbitSettings::default());
		controls.rotate(120.0, 40.0, VIEW);
		for _ in 0..600 {
			controls.update(&mut camera);
		}
		assert_relative_eq!(camera.distance(), 400.0, epsilon = 1e-6);
		assert!(camera.position.x < 0.0);

		let settled = camera.position;
		controls.update(&mut camera);
		assert!(camera.position.distance(settled) < 1e-6);
	}

	#[test]
	fn wheel_zooms_within_limits() {
		let mut camera = Camera::looking_at_origin(400.0, 50.0);
		let mut controls = OrbitControls::new(OrbitSettings::default());
		controls.zoom(100.0);
		controls.update(&mut camera);
		assert!(camera.distance() > 400.0);

		for _ in 0..500 {
			controls.zoom(-100.0);
			controls.update(&mut camera);
		}
		assert_relative_eq!(camera.distance(), 20.0, epsilon = 1e-9);
	}

	#[test]
	fn pan_moves_target_and_eye_together() {
		let mut camera = Camera::looking_at_origin(400.0, 50.0);
		let mut controls = OrbitControls::new(OrbitSettings {
			damping: 0.0,
			..OrbitSettings::default()
		});
		controls.pan(50.0, 0.0, &camera, VIEW);
		controls.update(&mut camera);
		assert!(camera.target.x < 0.0);
		assert_relative_eq!(camera.position.x, camera.target.x, epsilon = 1e-9);
		assert_relative_eq!(camera.distance(), 400.0, epsilon = 1e-9);
	}

	#[test]
	fn fog_fades_linearly() {
		let fog = Fog {
			color: Color::BACKGROUND,
			near: 200.0,
			far: 800.0,
		};
		assert_eq!(fog.visibility(100.0), 1.0);
		assert_relative_eq!(fog.visibility(500.0), 0.5);
		assert_eq!(fog.visibility(900.0), 0.0);
	}
}
