use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use super::state::UniverseState;
use crate::color::Color;
use crate::math::{Vec3, ease_out_cubic};
use crate::scene::{Projected, SceneController, SceneObject, Viewport};
use crate::visual::{LabelLayout, LabelStyle, Mesh, Shape, TextMeasure};

const LINK_ALPHA: f64 = 0.2;
const PARTICLE_ALPHA: f64 = 0.8;
/// Fraction of a light's range drawn as its glow.
const GLOW_REACH: f64 = 0.35;

/// Measures label text with the canvas' own font metrics.
pub struct CanvasTextMeasure<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasTextMeasure<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d, style: &LabelStyle) -> Self {
		ctx.set_font(&style.font());
		Self { ctx }
	}
}

impl TextMeasure for CanvasTextMeasure<'_> {
	fn measure(&self, text: &str) -> f64 {
		self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
	}
}

/// Rasterises every node label once into its own offscreen canvas.
pub fn label_images(
	document: &Document,
	objects: &[SceneObject],
	style: &LabelStyle,
) -> Vec<Option<HtmlCanvasElement>> {
	objects
		.iter()
		.map(|obj| label_image(document, &obj.visual.label, style))
		.collect()
}

fn label_image(
	document: &Document,
	label: &LabelLayout,
	style: &LabelStyle,
) -> Option<HtmlCanvasElement> {
	let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
	canvas.set_width(label.width_px as u32);
	canvas.set_height(label.height_px as u32);
	let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;

	ctx.set_font(&style.font());
	ctx.set_text_baseline("middle");
	for segment in &label.segments {
		ctx.set_fill_style_str(&segment.color.to_hex());
		ctx.fill_text(&segment.text, segment.x, label.baseline_y).ok()?;
	}
	Some(canvas)
}

pub fn render(
	state: &UniverseState,
	ctx: &CanvasRenderingContext2d,
	labels: &[Option<HtmlCanvasElement>],
) {
	let scene = &state.scene;
	let Viewport { width, height } = scene.viewport();
	ctx.set_fill_style_str(&scene.fog().color.to_hex());
	ctx.fill_rect(0.0, 0.0, width, height);

	draw_cages(scene, ctx);
	draw_links(scene, ctx);
	draw_nodes(state, ctx, labels);
	ctx.set_global_alpha(1.0);
}

fn stroke_mesh(
	scene: &SceneController,
	ctx: &CanvasRenderingContext2d,
	mesh: &Mesh,
	to_world: impl Fn(Vec3) -> Vec3,
) {
	let projected: Vec<Option<Projected>> = mesh
		.vertices
		.iter()
		.map(|&v| scene.project(to_world(v)))
		.collect();

	ctx.begin_path();
	for &[a, b] in &mesh.edges {
		if let (Some(p), Some(q)) = (projected[a as usize], projected[b as usize]) {
			ctx.move_to(p.x, p.y);
			ctx.line_to(q.x, q.y);
		}
	}
	ctx.stroke();
}

fn draw_cages(scene: &SceneController, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_width(1.0);
	for cage in scene.cages() {
		ctx.set_stroke_style_str(&cage.color.rgba(cage.opacity));
		stroke_mesh(scene, ctx, &cage.mesh, |v| cage.world_vertex(v));
	}
}

fn draw_links(scene: &SceneController, ctx: &CanvasRenderingContext2d) {
	let fog = scene.fog();
	let objects = scene.objects();

	ctx.set_line_width(1.0);
	for &(s, t) in scene.links() {
		let (Some(p), Some(q)) = (
			scene.project(objects[s].position),
			scene.project(objects[t].position),
		) else {
			continue;
		};
		let alpha = LINK_ALPHA * fog.visibility((p.depth + q.depth) / 2.0);
		ctx.set_stroke_style_str(&Color::LINK_BLUE.rgba(alpha));
		ctx.begin_path();
		ctx.move_to(p.x, p.y);
		ctx.line_to(q.x, q.y);
		ctx.stroke();
	}

	for particle in scene.link_particles() {
		let Some(p) = scene.project(particle) else {
			continue;
		};
		let alpha = PARTICLE_ALPHA * fog.visibility(p.depth);
		ctx.set_fill_style_str(&Color::PARTICLE_BLUE.rgba(alpha));
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, (0.8 * p.scale).max(1.0), 0.0, 2.0 * PI);
		ctx.fill();
	}
}

fn draw_nodes(
	state: &UniverseState,
	ctx: &CanvasRenderingContext2d,
	labels: &[Option<HtmlCanvasElement>],
) {
	let scene = &state.scene;
	let mut visible: Vec<(&SceneObject, Projected)> = scene
		.objects()
		.iter()
		.filter_map(|obj| Some((obj, scene.project(obj.position)?)))
		.collect();
	// far to near
	visible.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

	let highlight = ease_out_cubic(state.highlight_t);
	for (obj, p) in visible {
		let fog = scene.fog().visibility(p.depth);
		let hovered = state.highlighted == Some(obj.node);
		let size = obj.state.scale;

		let light = &obj.visual.light;
		let boost = if hovered { 1.0 + 0.6 * highlight } else { 1.0 };
		let glow = light.range * GLOW_REACH * p.scale * size * boost;
		if let Ok(gradient) = ctx.create_radial_gradient(p.x, p.y, 0.0, p.x, p.y, glow) {
			let alpha = (0.25 * light.intensity).min(0.6) * fog * boost;
			let _ = gradient.add_color_stop(0.0, &light.color.rgba(alpha));
			let _ = gradient.add_color_stop(1.0, &light.color.rgba(0.0));
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, glow, 0.0, 2.0 * PI);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
		}

		for part in &obj.visual.parts {
			match &part.shape {
				Shape::Sphere { radius, color, opacity } => {
					ctx.set_fill_style_str(&color.rgba(opacity * fog));
					ctx.begin_path();
					let _ = ctx.arc(p.x, p.y, radius * size * p.scale, 0.0, 2.0 * PI);
					ctx.fill();
				}
				Shape::Wireframe { mesh, color, opacity } => {
					let rotation = if part.spins {
						obj.state.rotation
					} else {
						Vec3::ZERO
					};
					ctx.set_stroke_style_str(&color.rgba(opacity * fog));
					ctx.set_line_width(1.0);
					stroke_mesh(scene, ctx, mesh, |v| {
						v.rotate_euler(rotation) * size + obj.position
					});
				}
			}
		}

		if hovered && highlight > 0.01 {
			ctx.set_stroke_style_str(&obj.visual.accent.rgba(0.7 * highlight * fog));
			ctx.set_line_width(1.5);
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, obj.visual.radius() * size * p.scale + 4.0, 0.0, 2.0 * PI);
			ctx.stroke();
		}

		if let Some(Some(image)) = labels.get(obj.node) {
			draw_label(scene, ctx, obj, image, fog);
		}
	}
}

fn draw_label(
	scene: &SceneController,
	ctx: &CanvasRenderingContext2d,
	obj: &SceneObject,
	image: &HtmlCanvasElement,
	fog: f64,
) {
	let label = &obj.visual.label;
	let Some(anchor) = scene.project(obj.position + Vec3::Y * label.offset_y) else {
		return;
	};
	let (w, h) = label.world_size();
	let (dw, dh) = (w * anchor.scale, h * anchor.scale);
	ctx.set_global_alpha(fog);
	let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
		image,
		anchor.x - dw / 2.0,
		anchor.y,
		dw,
		dh,
	);
	ctx.set_global_alpha(1.0);
}
