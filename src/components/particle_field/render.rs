//! Canvas rendering for particle fields and liquid lines.
//!
//! Particles are filled circles, or ellipses stretched vertically while the
//! page scrolls fast. Colors come from a horizontal gradient and are
//! recomputed every frame since positions change.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::field::ParticleField;
use super::liquid::LiquidLines;
use super::scroll::ScrollCoupler;
use super::theme::FieldStyle;

/// Below this stretch factor particles are drawn as plain circles.
const STRETCH_EPSILON: f64 = 0.01;

fn clear(ctx: &CanvasRenderingContext2d, style: &FieldStyle, width: f64, height: f64) {
	ctx.clear_rect(0.0, 0.0, width, height);
	if let Some(background) = style.background {
		ctx.set_fill_style_str(&background.to_css());
		ctx.fill_rect(0.0, 0.0, width, height);
	}
}

/// Paint the whole field.
pub fn render_field(
	ctx: &CanvasRenderingContext2d,
	field: &ParticleField,
	style: &FieldStyle,
	scroll: &ScrollCoupler,
) {
	let (width, height) = (field.width(), field.height());
	clear(ctx, style, width, height);

	let opacity = if style.scroll_fade {
		scroll.background_opacity()
	} else {
		1.0
	};
	let stretch = if style.scroll_stretch {
		scroll.stretch()
	} else {
		1.0
	};
	let inv_width = if width > 0.0 { 1.0 / width } else { 0.0 };

	for p in field.particles() {
		let alpha = if style.twinkle_speed > 0.0 {
			field.twinkle_alpha(p, style.twinkle_speed)
		} else {
			p.alpha
		} * opacity;
		if alpha < 0.01 {
			continue;
		}

		let (x, y) = (p.body.position.x, p.body.position.y);
		let color = style.gradient.sample(x * inv_width + p.tint).with_alpha(alpha);
		ctx.set_fill_style_str(&color.to_css());
		ctx.begin_path();
		if stretch > 1.0 + STRETCH_EPSILON {
			let _ = ctx.ellipse(x, y, p.size, p.size * stretch, 0.0, 0.0, TAU);
		} else {
			let _ = ctx.arc(x, y, p.size, 0.0, TAU);
		}
		ctx.fill();
	}
}

/// Paint every liquid line for this frame.
pub fn render_liquid(
	ctx: &CanvasRenderingContext2d,
	lines: &mut LiquidLines,
	scroll: &ScrollCoupler,
	width: f64,
	height: f64,
	time: f64,
) {
	ctx.clear_rect(0.0, 0.0, width, height);
	let intensity = scroll.intensity();
	let line_width = lines.config().line_width * scroll.stretch();
	ctx.set_line_width(line_width);

	for index in 0..lines.config().lines {
		let color = lines.color(index, 1.0);
		ctx.set_stroke_style_str(&color.to_css());
		let points = lines.line(index, width, height, time, intensity);
		let Some((first, rest)) = points.split_first() else {
			continue;
		};
		ctx.begin_path();
		ctx.move_to(first.x, first.y);
		for point in rest {
			ctx.line_to(point.x, point.y);
		}
		ctx.stroke();
	}
}
