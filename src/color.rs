//! RGB colors parsed from the dataset's hex strings, plus the fixed palette the
//! renderer and overlay draw from.

use std::fmt;

use serde::Deserialize;

use crate::error::DataError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Color {
	pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
	/// Accent used for a TOOL whose parent carries no color.
	pub const TOOL_FALLBACK: Self = Self::rgb(0x88, 0x88, 0x88);
	pub const CORE_CYAN: Self = Self::rgb(0x00, 0xFF, 0xFF);
	pub const STATE_RED: Self = Self::rgb(0xFF, 0x33, 0x33);
	pub const CONCEPT_GOLD: Self = Self::rgb(0xFF, 0xD7, 0x00);
	pub const BACKGROUND: Self = Self::rgb(0x02, 0x04, 0x10);
	pub const CAGE_BLUE: Self = Self::rgb(0x1E, 0x3A, 0x8A);
	pub const LINK_BLUE: Self = Self::rgb(0x64, 0x96, 0xFF);
	pub const PARTICLE_BLUE: Self = Self::rgb(0x64, 0xC8, 0xFF);

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Parses `#RRGGBB` (the leading `#` is optional).
	pub fn from_hex(s: &str) -> Option<Self> {
		let hex = s.strip_prefix('#').unwrap_or(s);
		if hex.len() != 6 || !hex.is_ascii() {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	pub fn to_hex(self) -> String {
		format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
	}

	/// CSS `rgba(...)` string for canvas fill/stroke styles.
	pub fn rgba(self, alpha: f64) -> String {
		format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

impl TryFrom<String> for Color {
	type Error = DataError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::from_hex(&value).ok_or(DataError::InvalidColor(value))
	}
}

/// The five dimension accents, used by the overlay for its glow styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accent {
	Blue,
	Purple,
	Orange,
	Emerald,
	Cyan,
}

impl Accent {
	/// Total over every color: anything outside the palette maps to `Blue`.
	pub fn from_color(color: Color) -> Self {
		match color.to_hex().as_str() {
			"#7F4FC9" => Self::Purple,
			"#F28500" => Self::Orange,
			"#009E60" => Self::Emerald,
			"#66D3FA" => Self::Cyan,
			_ => Self::Blue,
		}
	}

	pub fn color(self) -> Color {
		match self {
			Self::Blue => Color::rgb(0x00, 0x7F, 0xFF),
			Self::Purple => Color::rgb(0x7F, 0x4F, 0xC9),
			Self::Orange => Color::rgb(0xF2, 0x85, 0x00),
			Self::Emerald => Color::rgb(0x00, 0x9E, 0x60),
			Self::Cyan => Color::rgb(0x66, 0xD3, 0xFA),
		}
	}

	/// Inline style for the overlay card border and glow.
	pub fn card_style(self) -> String {
		let color = self.color();
		format!(
			"border-color: {}; box-shadow: 0 0 24px {};",
			color.rgba(0.6),
			color.rgba(0.35)
		)
	}
}
