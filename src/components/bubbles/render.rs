//! Canvas rendering for the bubble scene.
//!
//! Bubble meshes are projected in software and painted back to front as
//! flat-shaded triangles. Draw order:
//! 1. Bubbles sorted far to near, each with its texture clipped to the
//!    projected disc under a translucent shaded shell
//! 2. Dashed ring on the hovered bubble
//! 3. Burst particles, additively blended

use std::f64::consts::TAU;

use glam::DVec3;
use web_sys::CanvasRenderingContext2d;

use super::camera::{Camera, Projected};
use super::textures::TextureCache;
use super::world::{Bubble, BubbleWorld};
use crate::components::particle_field::theme::{BLUE, Color, GREEN, PURPLE};
use crate::physics::smooth_step;

const PALETTE: [Color; 3] = [PURPLE, GREEN, BLUE];
const HOVER_RING: Color = Color::rgba(255, 255, 255, 0.7);

/// Bubbles smaller than this are skipped.
const MIN_SCALE: f64 = 0.01;

fn light_direction() -> DVec3 {
	DVec3::new(-0.4, 0.6, 0.7).normalize()
}

/// Paint the whole scene.
pub fn render_world(
	ctx: &CanvasRenderingContext2d,
	world: &BubbleWorld,
	camera: &Camera,
	textures: &TextureCache,
	width: f64,
	height: f64,
) {
	ctx.clear_rect(0.0, 0.0, width, height);

	let mut visible: Vec<(&Bubble, Projected)> = world
		.bubbles()
		.iter()
		.filter(|b| b.scale > MIN_SCALE)
		.filter_map(|b| camera.project(b.body.position).map(|p| (b, p)))
		.collect();
	visible.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

	for (bubble, center) in &visible {
		draw_bubble(ctx, world, camera, textures, bubble, center);
	}

	if let Some((bubble, center)) = visible.iter().find(|(b, _)| b.hovered) {
		draw_hover_ring(ctx, world.visual_radius(bubble) * center.scale, center);
	}

	draw_burst(ctx, world, camera);
}

fn draw_bubble(
	ctx: &CanvasRenderingContext2d,
	world: &BubbleWorld,
	camera: &Camera,
	textures: &TextureCache,
	bubble: &Bubble,
	center: &Projected,
) {
	let radius = world.visual_radius(bubble);
	let screen_radius = radius * center.scale;
	let texture = textures.ready(bubble.id);

	if let Some(image) = texture {
		ctx.save();
		ctx.begin_path();
		let _ = ctx.arc(center.screen.x, center.screen.y, screen_radius * 0.95, 0.0, TAU);
		ctx.clip();
		let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
			image,
			center.screen.x - screen_radius,
			center.screen.y - screen_radius,
			screen_radius * 2.0,
			screen_radius * 2.0,
		);
		ctx.restore();
	}

	let base = PALETTE[bubble.id.0 as usize % PALETTE.len()];
	let shell_alpha = if texture.is_some() { 0.2 } else { 0.8 };
	let light = light_direction();
	let eye = camera.eye();
	let working = &bubble.surface.working;
	let normals = &bubble.surface.normals;

	for &[a, b, c] in world.mesh().triangles() {
		let corners = [a, b, c].map(|i| bubble.body.position + working[i] * radius);
		let normal = (normals[a] + normals[b] + normals[c]).normalize_or_zero();
		let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
		let facing = normal.dot((eye - centroid).normalize_or_zero());
		if facing <= 0.0 {
			continue;
		}
		let [Some(p0), Some(p1), Some(p2)] = corners.map(|c| camera.project(c)) else {
			continue;
		};

		let lambert = normal.dot(light).max(0.0);
		let rim = smooth_step(1.0 - facing);
		let color = base
			.lighten(rim * 0.5)
			.shade(0.55 + 0.45 * lambert)
			.with_alpha((shell_alpha * bubble.scale + rim * 0.35).min(1.0));
		ctx.set_fill_style_str(&color.to_css());
		ctx.begin_path();
		ctx.move_to(p0.screen.x, p0.screen.y);
		ctx.line_to(p1.screen.x, p1.screen.y);
		ctx.line_to(p2.screen.x, p2.screen.y);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_hover_ring(ctx: &CanvasRenderingContext2d, screen_radius: f64, center: &Projected) {
	ctx.set_stroke_style_str(&HOVER_RING.to_css());
	ctx.set_line_width(1.5);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(&6.0.into(), &6.0.into()));
	ctx.begin_path();
	let _ = ctx.arc(center.screen.x, center.screen.y, screen_radius * 1.12, 0.0, TAU);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_burst(ctx: &CanvasRenderingContext2d, world: &BubbleWorld, camera: &Camera) {
	let explosion = world.explosion();
	if !explosion.is_visible() {
		return;
	}
	let fade = if explosion.is_closing() {
		explosion.progress()
	} else {
		1.0
	};
	let _ = ctx.set_global_composite_operation("lighter");
	for i in 0..explosion.len() {
		let Some(particle) = explosion.burst_particle(i, world.time()) else {
			break;
		};
		let Some(projected) = camera.project(particle.position) else {
			continue;
		};
		ctx.set_fill_style_str(&particle.color.with_alpha(0.8 * fade).to_css());
		ctx.begin_path();
		let _ = ctx.arc(projected.screen.x, projected.screen.y, particle.size, 0.0, TAU);
		ctx.fill();
	}
	let _ = ctx.set_global_composite_operation("source-over");
}
