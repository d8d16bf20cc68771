//! Simulation state and interaction tracking for one canvas.
//!
//! Wraps the `force_graph` physics simulation with the node and link styles
//! resolved from the current [`RenderDirectives`], the pan/zoom transform and
//! the hover/click highlight.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::graph::{
	DisplayNodeInfo, GraphLink, GraphNode, HighlightInfo, LinkDirective, NodeDirective, NodeKind, ProcessedGraph,
	RenderDirectives,
};

use super::scale::{ScaleConfig, ScaledValues};

/// Per-node data attached to each node in the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	/// Radius multiplier (services are larger than endpoints).
	pub size: f64,
}

/// One drawn or layout-only edge.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub link: GraphLink,
	pub style: LinkDirective,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	/// Set once the pointer moved far enough to count as a drag, not a click.
	pub moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// What the pointer is over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverTarget {
	Node(String),
	Link(GraphLink),
}

/// Result of a click on the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
	/// Details of the clicked node while its highlight is pinned.
	Node(Option<DisplayNodeInfo>),
	Link { pinned: bool },
}

/// Hover and click highlight with a smoothed dimming factor.
///
/// A clicked node pins its highlight until it is clicked again; while nothing
/// is pinned, hovering a node or link highlights it.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hover: Option<HoverTarget>,
	hovered: HighlightInfo,
	pinned: HighlightInfo,
	/// 0.0 = no dimming, 1.0 = everything outside the highlight fully dimmed.
	dim: f64,
}

impl HighlightState {
	/// Returns `true` when the active highlight changed.
	pub fn set_hover(&mut self, target: Option<HoverTarget>, processed: &ProcessedGraph) -> bool {
		if self.hover == target {
			return false;
		}
		self.hovered = match &target {
			Some(HoverTarget::Node(id)) => HighlightInfo::on_node(processed, id),
			Some(HoverTarget::Link(link)) => HighlightInfo::on_link(processed, link),
			None => HighlightInfo::default(),
		};
		self.hover = target;
		self.pinned.is_empty()
	}

	/// Pins a node highlight, or clears it when the node is already focused.
	/// Returns `true` when a highlight is pinned afterwards.
	pub fn toggle_pin(&mut self, id: &str, processed: &ProcessedGraph) -> bool {
		self.pinned = self.pinned.toggle_node(processed, id);
		!self.pinned.is_empty()
	}

	/// Same as [`Self::toggle_pin`] for a link.
	pub fn toggle_pin_link(&mut self, link: &GraphLink, processed: &ProcessedGraph) -> bool {
		self.pinned = self.pinned.toggle_link(processed, link);
		!self.pinned.is_empty()
	}

	/// The highlight currently in effect, if any.
	pub fn active(&self) -> Option<&HighlightInfo> {
		[&self.pinned, &self.hovered]
			.into_iter()
			.find(|info| !info.is_empty())
	}

	pub fn is_lit(&self, id: &str) -> bool {
		self.active().is_none_or(|info| info.nodes.contains(id))
	}

	/// Exponential smoothing of the dimming factor towards its target.
	pub fn tick(&mut self, dt: f64) {
		const SPEED: f64 = 6.0;
		let target = if self.active().is_some() { 1.0 } else { 0.0 };
		self.dim += (target - self.dim) * (1.0 - (-SPEED * dt).exp());
	}

	pub fn dim(&self) -> f64 {
		self.dim
	}
}

/// Physics simulation plus everything needed to draw one frame.
///
/// Created when the component mounts or its graph changes, then mutated each
/// frame by the animation loop.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	processed: ProcessedGraph,
	base: RenderDirectives,
	styles: HashMap<DefaultNodeIdx, NodeDirective>,
	edges: Vec<EdgeInfo>,
}

impl ForceGraphState {
	pub fn new(
		processed: ProcessedGraph,
		directives: RenderDirectives,
		width: f64,
		height: f64,
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut id_to_idx = HashMap::new();
		let nodes = &processed.graph.nodes;

		for (i, node) in nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / nodes.len() as f64;
			let (x, y) = ((100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32);
			let size = match node.kind() {
				NodeKind::Service => 1.6,
				NodeKind::External => 1.3,
				NodeKind::Endpoint => 1.0,
			};
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					size,
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		let mut edges = Vec::new();
		for link in &processed.graph.links {
			if let (Some(&source), Some(&target)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				graph.add_edge(source, target, EdgeData::default());
				edges.push(EdgeInfo {
					source,
					target,
					link: link.clone(),
					style: LinkDirective::default(),
				});
			}
		}

		let mut state = Self {
			graph,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			processed,
			base: directives,
			styles: HashMap::new(),
			edges,
		};
		state.restyle();
		state
	}

	/// Replaces the directives used while nothing is highlighted.
	pub fn set_directives(&mut self, directives: RenderDirectives) {
		if self.base != directives {
			self.base = directives;
			self.restyle();
		}
	}

	/// Resolves node and link styles from the active directives.
	fn restyle(&mut self) {
		let highlighted = self.highlight.active().map(RenderDirectives::for_highlight);
		let directives = highlighted.as_ref().unwrap_or(&self.base);

		for edge in &mut self.edges {
			edge.style = directives.link(&edge.link);
		}
		let by_id: HashMap<&str, &GraphNode> = self
			.processed
			.graph
			.nodes
			.iter()
			.map(|n| (n.id.as_str(), n))
			.collect();
		let mut styles = HashMap::new();
		self.graph.visit_nodes(|node| {
			if let Some(data) = by_id.get(node.data.user_data.id.as_str()) {
				styles.insert(node.index(), directives.node(data));
			}
		});
		self.styles = styles;
	}

	pub fn edges(&self) -> &[EdgeInfo] {
		&self.edges
	}

	pub fn node_style(&self, idx: DefaultNodeIdx) -> Option<&NodeDirective> {
		self.styles.get(&idx)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Node positions and size multipliers by index, for drawing edges and
	/// hit testing.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64, f64)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(
				node.index(),
				(node.x() as f64, node.y() as f64, node.data.user_data.size),
			);
		});
		positions
	}

	pub fn node_at_position(
		&self,
		sx: f64,
		sy: f64,
		config: &ScaleConfig,
	) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let node_hit_radius = scale.hit_radius * node.data.user_data.size;
			if (dx * dx + dy * dy).sqrt() < node_hit_radius {
				found = Some(node.index());
			}
		});
		found
	}

	/// Closest visible link within the link hit distance.
	pub fn link_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<&GraphLink> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let positions = self.positions();
		self.edges
			.iter()
			.filter(|edge| edge.style.visible)
			.filter_map(|edge| {
				let &(ax, ay, _) = positions.get(&edge.source)?;
				let &(bx, by, _) = positions.get(&edge.target)?;
				Some((segment_distance((gx, gy), (ax, ay), (bx, by)), &edge.link))
			})
			.filter(|(d, _)| *d < scale.link_hit_distance)
			.min_by(|(a, _), (b, _)| a.total_cmp(b))
			.map(|(_, link)| link)
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut id = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				id = Some(node.data.user_data.id.clone());
			}
		});
		id
	}

	/// Hover the node or, failing that, the link under the pointer.
	pub fn hover_at(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		let target = match self.node_at_position(sx, sy, config) {
			Some(idx) => self.node_id(idx).map(HoverTarget::Node),
			None => self
				.link_at_position(sx, sy, config)
				.cloned()
				.map(HoverTarget::Link),
		};
		self.set_hover(target);
	}

	pub fn set_hover(&mut self, target: Option<HoverTarget>) {
		if self.highlight.set_hover(target, &self.processed) {
			self.restyle();
		}
	}

	/// Pins or unpins the highlight of a clicked node, returning the node's
	/// details while it stays pinned.
	pub fn click_node(&mut self, idx: DefaultNodeIdx) -> Option<DisplayNodeInfo> {
		let id = self.node_id(idx)?;
		let pinned = self.highlight.toggle_pin(&id, &self.processed);
		self.restyle();
		pinned
			.then(|| self.processed.graph.node(&id).map(DisplayNodeInfo::from_node))
			.flatten()
	}

	/// Pins or unpins the highlight of a clicked link. Returns `false` when
	/// the click cleared the highlight.
	pub fn click_link(&mut self, link: &GraphLink) -> bool {
		let pinned = self.highlight.toggle_pin_link(link, &self.processed);
		self.restyle();
		pinned
	}

	/// Clicks whatever is under the pointer: a node first, then a link.
	pub fn click_at(&mut self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<ClickOutcome> {
		if let Some(idx) = self.node_at_position(sx, sy, config) {
			return Some(ClickOutcome::Node(self.click_node(idx)));
		}
		let link = self.link_at_position(sx, sy, config)?.clone();
		Some(ClickOutcome::Link {
			pinned: self.click_link(&link),
		})
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;
		self.highlight.tick(dt as f64);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq < f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
