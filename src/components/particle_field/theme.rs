//! Colors and visual styles for the 2D particle effects.

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	#[serde(default = "opaque")]
	pub a: f64,
}

fn opaque() -> f64 {
	1.0
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		self.lerp(Color::rgba(255, 255, 255, self.a), factor)
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// Multiply the RGB channels, keeping alpha.
	pub fn shade(self, factor: f64) -> Self {
		let f = factor.max(0.0);
		let scale = |c: u8| (c as f64 * f).min(255.0) as u8;
		Self {
			r: scale(self.r),
			g: scale(self.g),
			b: scale(self.b),
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
		}
	}
}

pub const PURPLE: Color = Color::rgb(168, 85, 247);
pub const GREEN: Color = Color::rgb(52, 211, 153);
pub const BLUE: Color = Color::rgb(59, 130, 246);

/// Three evenly spaced color stops.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Gradient {
	pub stops: [Color; 3],
}

impl Gradient {
	/// Color at `t` in [0, 1]; values outside are clamped.
	pub fn sample(&self, t: f64) -> Color {
		let t = t.clamp(0.0, 1.0);
		if t < 0.5 {
			self.stops[0].lerp(self.stops[1], t * 2.0)
		} else {
			self.stops[1].lerp(self.stops[2], (t - 0.5) * 2.0)
		}
	}
}

impl Default for Gradient {
	fn default() -> Self {
		Self {
			stops: [PURPLE, GREEN, BLUE],
		}
	}
}

/// How a particle field is painted.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FieldStyle {
	/// Horizontal color ramp across the canvas width.
	pub gradient: Gradient,
	/// Solid fill behind the particles; `None` leaves the canvas transparent.
	pub background: Option<Color>,
	/// Fade the whole field while scrolling fast.
	pub scroll_fade: bool,
	/// Stretch particles vertically with scroll intensity.
	pub scroll_stretch: bool,
	/// Twinkle speed in radians per second, 0 disables.
	pub twinkle_speed: f64,
}

impl Default for FieldStyle {
	fn default() -> Self {
		Self {
			gradient: Gradient::default(),
			background: None,
			scroll_fade: true,
			scroll_stretch: true,
			twinkle_speed: 1.5,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gradient_hits_each_stop() {
		let gradient = Gradient::default();
		assert_eq!(gradient.sample(0.0), PURPLE);
		assert_eq!(gradient.sample(0.5), GREEN);
		assert_eq!(gradient.sample(1.0), BLUE);
		assert_eq!(gradient.sample(-3.0), PURPLE);
	}

	#[test]
	fn css_formats() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.500)");
	}

	#[test]
	fn style_overrides_parse_from_json() {
		let json = r#"{ "background": { "r": 10, "g": 11, "b": 12 }, "twinkle_speed": 0 }"#;
		let style: FieldStyle = serde_json::from_str(json).unwrap();
		assert_eq!(style.background, Some(Color::rgb(10, 11, 12)));
		assert_eq!(style.twinkle_speed, 0.0);
		assert!(style.scroll_fade);
	}
}
