//! Small 3D vector type and easing curves shared by the layout, geometry and camera.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// A point or direction in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Vec3 {
	pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
	pub const X: Self = Self::new(1.0, 0.0, 0.0);
	pub const Y: Self = Self::new(0.0, 1.0, 0.0);
	pub const Z: Self = Self::new(0.0, 0.0, 1.0);

	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	pub fn dot(self, other: Self) -> f64 {
		self.x * other.x + self.y * other.y + self.z * other.z
	}

	pub fn cross(self, other: Self) -> Self {
		Self::new(
			self.y * other.z - self.z * other.y,
			self.z * other.x - self.x * other.z,
			self.x * other.y - self.y * other.x,
		)
	}

	pub fn length_squared(self) -> f64 {
		self.dot(self)
	}

	pub fn length(self) -> f64 {
		self.length_squared().sqrt()
	}

	pub fn distance(self, other: Self) -> f64 {
		(self - other).length()
	}

	/// Unit vector in the same direction, or zero for a degenerate input.
	pub fn normalize_or_zero(self) -> Self {
		let len = self.length();
		if len > f64::EPSILON {
			self / len
		} else {
			Self::ZERO
		}
	}

	pub fn lerp(self, other: Self, t: f64) -> Self {
		self + (other - self) * t
	}

	#[cfg(test)]
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
	}

	pub fn rotate_x(self, angle: f64) -> Self {
		let (s, c) = angle.sin_cos();
		Self::new(self.x, self.y * c - self.z * s, self.y * s + self.z * c)
	}

	pub fn rotate_y(self, angle: f64) -> Self {
		let (s, c) = angle.sin_cos();
		Self::new(self.x * c + self.z * s, self.y, -self.x * s + self.z * c)
	}

	/// Applies an XYZ euler rotation (x first, then y, then z).
	pub fn rotate_euler(self, euler: Self) -> Self {
		let (s, c) = euler.z.sin_cos();
		let v = self.rotate_x(euler.x).rotate_y(euler.y);
		Self::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
	}
}

impl Add for Vec3 {
	type Output = Self;
	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
	}
}

impl Sub for Vec3 {
	type Output = Self;
	fn sub(self, rhs: Self) -> Self {
		Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
	}
}

impl Mul<f64> for Vec3 {
	type Output = Self;
	fn mul(self, rhs: f64) -> Self {
		Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
	}
}

impl Div<f64> for Vec3 {
	type Output = Self;
	fn div(self, rhs: f64) -> Self {
		Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
	}
}

impl Neg for Vec3 {
	type Output = Self;
	fn neg(self) -> Self {
		Self::new(-self.x, -self.y, -self.z)
	}
}

impl AddAssign for Vec3 {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl SubAssign for Vec3 {
	fn sub_assign(&mut self, rhs: Self) {
		*self = *self - rhs;
	}
}

impl MulAssign<f64> for Vec3 {
	fn mul_assign(&mut self, rhs: f64) {
		*self = *self * rhs;
	}
}

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn ease_out_quad(t: f64) -> f64 {
	t * (2.0 - t)
}

#[cfg(test)]
mod tests {
	use std::f64::consts::FRAC_PI_2;

	use approx::assert_relative_eq;

	use super::*;

	#[test]
	fn cross_follows_right_hand_rule() {
		assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
		assert_eq!(Vec3::Y.cross(Vec3::X), -Vec3::Z);
	}

	#[test]
	fn quarter_turns_move_axes() {
		let v = Vec3::Z.rotate_y(FRAC_PI_2);
		assert_relative_eq!(v.x, 1.0, epsilon = 1e-12);
		assert_relative_eq!(v.z, 0.0, epsilon = 1e-12);

		let v = Vec3::Y.rotate_x(FRAC_PI_2);
		assert_relative_eq!(v.z, 1.0, epsilon = 1e-12);
	}

	#[test]
	fn normalizing_zero_stays_zero() {
		assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
		assert_relative_eq!(Vec3::new(3.0, 4.0, 0.0).normalize_or_zero().length(), 1.0);
	}

	#[test]
	fn easing_hits_endpoints() {
		for ease in [ease_out_cubic, ease_out_quad] {
			assert_relative_eq!(ease(0.0), 0.0);
			assert_relative_eq!(ease(1.0), 1.0);
		}
	}
}
