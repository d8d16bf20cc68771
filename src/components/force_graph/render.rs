//! Canvas rendering for the force graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Links, arrows and particles (world space)
//! 3. Dimmed nodes, then lit nodes on top
//! 4. Vignette (screen space)

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use crate::graph::NodeShape;

use super::particles::particle_offsets;
use super::scale::{ScaleConfig, ScaledValues};
use super::state::{EdgeInfo, ForceGraphState};
use super::theme::{Color, Theme};

/// Opacity kept by elements outside the active highlight.
const DIMMED_ALPHA: f64 = 0.3;

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_links(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

/// Alpha of an element that is outside the highlight, given the dim factor.
fn dimmed(lit: bool, dim: f64) -> f64 {
	if lit {
		1.0
	} else {
		1.0 - (1.0 - DIMMED_ALPHA) * smooth_step(dim)
	}
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let background = &theme.background;
	let gradient = background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				state.width.max(state.height) * 0.8,
			)
			.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let Ok(gradient) = ctx.create_radial_gradient(
		state.width / 2.0,
		state.height / 2.0,
		state.width.min(state.height) * 0.3,
		state.width / 2.0,
		state.height / 2.0,
		state.width.max(state.height) * 0.7,
	) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(
		1.0,
		&Color::rgba(0, 0, 0, theme.background.vignette).to_css(),
	);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_links(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let positions = state.positions();
	let dim = state.highlight.dim();

	for (i, edge) in state.edges().iter().enumerate() {
		if !edge.style.visible {
			continue;
		}
		let (Some(&(x1, y1, source_size)), Some(&(x2, y2, target_size))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let lit = state.highlight.is_lit(&edge.link.source)
			&& state.highlight.is_lit(&edge.link.target);
		let alpha = dimmed(lit, dim);
		let geometry = LinkGeometry {
			x1,
			y1,
			ux: dx / dist,
			uy: dy / dist,
			dist,
			source_radius: scale.node_radius * source_size,
			target_radius: scale.node_radius * target_size,
		};

		draw_link_line(ctx, edge, &geometry, scale, theme, alpha);
		draw_link_particles(ctx, edge, &geometry, scale, theme, state.flow_time, i, alpha);
	}
}

/// Unit direction and trimmed extent of one link.
struct LinkGeometry {
	x1: f64,
	y1: f64,
	ux: f64,
	uy: f64,
	dist: f64,
	source_radius: f64,
	target_radius: f64,
}

impl LinkGeometry {
	fn at(&self, along: f64) -> (f64, f64) {
		(self.x1 + self.ux * along, self.y1 + self.uy * along)
	}
}

fn draw_link_line(
	ctx: &CanvasRenderingContext2d,
	edge: &EdgeInfo,
	g: &LinkGeometry,
	scale: &ScaledValues,
	theme: &Theme,
	alpha: f64,
) {
	let style = &edge.style;
	let color = style.color.unwrap_or(theme.edge.color);
	let arrow = style.arrow_length * scale.arrow_unit;
	let draw_arrow = arrow > 0.0 && !scale.cull_arrows();

	let start = g.source_radius;
	let tip = g.dist - g.target_radius;
	let end = if draw_arrow { tip - arrow } else { tip };
	if end <= start {
		return;
	}

	ctx.set_global_alpha(alpha);
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(style.width * scale.line_unit);
	ctx.begin_path();
	let (sx, sy) = g.at(start);
	let (ex, ey) = g.at(end);
	ctx.move_to(sx, sy);
	ctx.line_to(ex, ey);
	ctx.stroke();

	if draw_arrow {
		let arrow_color = style.color.unwrap_or(theme.edge.arrow_color);
		ctx.set_global_alpha(alpha * scale.arrow_alpha);
		ctx.set_fill_style_str(&arrow_color.to_css());
		let (tx, ty) = g.at(tip);
		let (bx, by) = g.at(tip - arrow);
		let (px, py) = (-g.uy * arrow * 0.5, g.ux * arrow * 0.5);
		ctx.begin_path();
		ctx.move_to(tx, ty);
		ctx.line_to(bx + px, by + py);
		ctx.line_to(bx - px, by - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

#[allow(clippy::too_many_arguments)]
fn draw_link_particles(
	ctx: &CanvasRenderingContext2d,
	edge: &EdgeInfo,
	g: &LinkGeometry,
	scale: &ScaledValues,
	theme: &Theme,
	time: f64,
	seed: usize,
	alpha: f64,
) {
	let radius = edge.style.particle_width * scale.particle_unit / 2.0;
	if radius <= 0.0 {
		return;
	}
	let color = edge.style.color.unwrap_or(theme.edge.particle_color);
	ctx.set_global_alpha(alpha);
	ctx.set_fill_style_str(&color.to_css());
	for t in particle_offsets(time, scale.particle_speed, seed) {
		let (x, y) = g.at(t * g.dist);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let dim = state.highlight.dim();

	// Pass 1: dimmed nodes, pass 2: lit nodes on top
	for lit_pass in [false, true] {
		state.graph.visit_nodes(|node| {
			let lit = state.highlight.is_lit(&node.data.user_data.id);
			if lit != lit_pass {
				return;
			}
			let Some(style) = state.node_style(node.index()) else {
				return;
			};
			let (x, y) = (node.x() as f64, node.y() as f64);
			let radius = scale.node_radius * node.data.user_data.size;
			let alpha = dimmed(lit, dim);

			ctx.set_global_alpha(alpha);
			if let Some(ring) = style.ring {
				trace_shape(ctx, style.shape, x, y, radius + scale.ring_offset + scale.ring_width);
				ctx.set_fill_style_str(&ring.to_css());
				ctx.fill();
			}
			draw_node_body(ctx, style.shape, style.fill, x, y, radius, scale, theme);

			ctx.set_fill_style_str(&style.badge_color.to_css());
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			ctx.set_font(&format!("bold {}px sans-serif", radius * scale.badge_ratio));
			let _ = ctx.fill_text(style.badge, x, y);

			if alpha > 0.5 {
				ctx.set_fill_style_str(&theme.node.label_color.to_css());
				ctx.set_text_baseline("top");
				ctx.set_font(&scale.label_font);
				let _ = ctx.fill_text(&style.label, x, y + radius + scale.ring_offset * 2.0);
			}
			ctx.set_global_alpha(1.0);
		});
	}
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

#[allow(clippy::too_many_arguments)]
fn draw_node_body(
	ctx: &CanvasRenderingContext2d,
	shape: NodeShape,
	fill: Color,
	x: f64,
	y: f64,
	radius: f64,
	scale: &ScaledValues,
	theme: &Theme,
) {
	trace_shape(ctx, shape, x, y, radius);
	let gradient = theme
		.node
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
				.ok()
		})
		.flatten();
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &fill.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &fill.to_css());
			let _ = gradient.add_color_stop(1.0, &fill.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&fill.to_css()),
	}
	ctx.fill();

	if theme.node.border_width > 0.0 {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / scale.k);
		ctx.stroke();
	}
}

/// Begins a path outlining a node of the given shape.
fn trace_shape(ctx: &CanvasRenderingContext2d, shape: NodeShape, x: f64, y: f64, radius: f64) {
	ctx.begin_path();
	match shape {
		NodeShape::Circle => {
			let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		}
		NodeShape::Hexagon => {
			for (i, (px, py)) in hexagon_points(x, y, radius).into_iter().enumerate() {
				if i == 0 {
					ctx.move_to(px, py);
				} else {
					ctx.line_to(px, py);
				}
			}
			ctx.close_path();
		}
	}
}

/// Corners of a pointy-top hexagon centered on `(x, y)`.
fn hexagon_points(x: f64, y: f64, radius: f64) -> [(f64, f64); 6] {
	std::array::from_fn(|i| {
		let angle = PI / 3.0 * i as f64 - PI / 2.0;
		(x + radius * angle.cos(), y + radius * angle.sin())
	})
}
