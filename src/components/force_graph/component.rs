//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, clicking, panning and zooming. An animation loop
//! runs via `requestAnimationFrame`, stepping the physics simulation and
//! rendering each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use crate::graph::{DisplayNodeInfo, ProcessedGraph, RenderDirectives};

use super::render;
use super::scale::ScaleConfig;
use super::state::{ClickOutcome, DragState, ForceGraphState};
use super::theme::Theme;

/// Pointer travel, in pixels, after which a press on a node becomes a drag.
const CLICK_TOLERANCE: f64 = 3.0;

/// Bundles graph simulation state with visual configuration.
struct GraphContext {
	state: ForceGraphState,
	scale: ScaleConfig,
	theme: Theme,
}

type Shared<T> = Rc<RefCell<Option<T>>>;

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// `data` is the processed snapshot to lay out; the simulation restarts when
/// it changes. `directives` decide how links and nodes are drawn while no node
/// is hovered or pinned, and can change without restarting the layout.
/// Hovering a node or link highlights its neighbourhood; clicking a node or
/// link pins that highlight until it is clicked again. `on_select` receives the
/// details of a pinned node, and `None` once a click clears the highlight.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
/// Explicit `width`/`height` override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<ProcessedGraph>,
	#[prop(into)] directives: Signal<RenderDirectives>,
	#[prop(optional)] theme: Option<Theme>,
	#[prop(optional, into)] on_select: Option<Callback<Option<DisplayNodeInfo>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let theme = theme.unwrap_or_default();
	let context: Shared<GraphContext> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let processed = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let state = ForceGraphState::new(processed, directives.get_untracked(), w, h);
		let restarted = {
			let mut slot = context_init.borrow_mut();
			match slot.as_mut() {
				Some(c) => {
					c.state = state;
					true
				}
				None => {
					*slot = Some(GraphContext {
						state,
						scale: ScaleConfig::default(),
						theme: theme.clone(),
					});
					false
				}
			}
		};
		if restarted {
			return;
		}

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("topology-diff: canvas has no 2d context");
			return;
		};

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(viewport_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let dt = 0.016;
				if c.state.animation_running {
					c.state.tick(dt);
				}
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_dir = context.clone();
	Effect::new(move |_| {
		let directives = directives.get();
		if let Some(ref mut c) = *context_dir.borrow_mut() {
			c.state.set_directives(directives);
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			if let Some(idx) = c.state.node_at_position(x, y, &c.scale) {
				let mut start = (0.0, 0.0);
				c.state.graph.visit_nodes(|node| {
					if node.index() == idx {
						start = (node.x(), node.y());
					}
				});
				c.state.drag = DragState {
					active: true,
					node_idx: Some(idx),
					start_x: x,
					start_y: y,
					node_start_x: start.0,
					node_start_y: start.1,
					moved: false,
				};
			} else {
				c.state.pan.active = true;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.transform.x;
				c.state.pan.transform_start_y = c.state.transform.y;
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if !c.state.drag.active {
				c.state.hover_at(x, y, &c.scale);
			}

			if c.state.drag.active {
				let (sx, sy) = (x - c.state.drag.start_x, y - c.state.drag.start_y);
				if (sx * sx + sy * sy).sqrt() > CLICK_TOLERANCE {
					c.state.drag.moved = true;
				}
				if let (Some(idx), true) = (c.state.drag.node_idx, c.state.drag.moved) {
					let k = c.state.transform.k;
					let (nx, ny) = (
						c.state.drag.node_start_x + (sx / k) as f32,
						c.state.drag.node_start_y + (sy / k) as f32,
					);
					c.state.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if c.state.pan.active {
				c.state.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let outcome = {
			let mut slot = context_mu.borrow_mut();
			let Some(c) = slot.as_mut() else {
				return;
			};
			let (drag, pan) = (c.state.drag.clone(), c.state.pan.clone());
			c.state.drag = DragState::default();
			c.state.pan.active = false;
			match (drag.active, drag.node_idx) {
				(true, Some(idx)) if !drag.moved => {
					Some(ClickOutcome::Node(c.state.click_node(idx)))
				}
				_ if pan.active => pointer_position(canvas_ref, &ev)
					.filter(|&(x, y)| {
						(x - pan.start_x).hypot(y - pan.start_y) <= CLICK_TOLERANCE
					})
					.and_then(|(x, y)| c.state.click_at(x, y, &c.scale)),
				_ => None,
			}
		};
		if let Some(on_select) = on_select {
			match outcome {
				Some(ClickOutcome::Node(info)) => on_select.run(info),
				Some(ClickOutcome::Link { pinned: false }) => on_select.run(None),
				_ => {}
			}
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.drag = DragState::default();
			c.state.pan.active = false;
			c.state.set_hover(None);
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (c.state.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / c.state.transform.k;
			c.state.transform.x = x - (x - c.state.transform.x) * ratio;
			c.state.transform.y = y - (y - c.state.transform.y) * ratio;
			c.state.transform.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
