//! Render directives derived from diff, pair and highlight results.
//!
//! A [`RenderDirectives`] value is plain data built by one of its factories;
//! the canvas asks it how to draw each link and node. Nothing here holds state
//! beyond the id sets it was built from, so it is rebuilt whenever the
//! underlying difference or highlight changes.

use std::collections::HashSet;

use crate::components::force_graph::theme::Color;

use super::diff::{GraphDifferenceInfo, ServicePairDiff};
use super::model::{GraphLink, GraphNode, LinkId, NodeKind};
use super::processor::HighlightInfo;

const ADDED_LINK: Color = Color::rgb(0, 255, 0);
const DELETED_LINK: Color = Color::rgb(255, 0, 0);
const ADDED_RING: Color = Color::rgba(0, 255, 0, 0.5);
const DELETED_RING: Color = Color::rgba(255, 0, 0, 0.5);
const FOCUS_RING: Color = Color::rgb(0, 0, 128);
const HIGHLIGHT_RING: Color = Color::rgb(255, 165, 0);

/// Endpoint labels longer than this are shortened in the middle.
const MAX_LABEL_CHARS: usize = 30;
const LABEL_KEEP_CHARS: usize = 15;

/// Outline of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
	Hexagon,
	Circle,
}

/// How to draw one link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkDirective {
	/// Arrow head length, in node-radius units.
	pub arrow_length: f64,
	pub width: f64,
	/// Size of the particles flowing along the link.
	pub particle_width: f64,
	/// `None` keeps the theme's edge color.
	pub color: Option<Color>,
	/// `false` for layout anchors: nothing is drawn.
	pub visible: bool,
}

impl Default for LinkDirective {
	fn default() -> Self {
		Self {
			arrow_length: 3.0,
			width: 1.0,
			particle_width: 4.0,
			color: None,
			visible: true,
		}
	}
}

impl LinkDirective {
	fn hidden() -> Self {
		Self {
			arrow_length: 0.0,
			width: 0.0,
			particle_width: 0.0,
			color: Some(Color::TRANSPARENT),
			visible: false,
		}
	}

	fn emphasized(color: Option<Color>) -> Self {
		Self {
			arrow_length: 6.0,
			width: 4.0,
			color,
			..Self::default()
		}
	}
}

/// How to draw one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDirective {
	pub kind: NodeKind,
	pub shape: NodeShape,
	pub fill: Color,
	/// Text drawn inside the node (`SRV`, `EP`, `EX`).
	pub badge: &'static str,
	/// Readable on top of `fill`.
	pub badge_color: Color,
	pub label: String,
	/// Ring drawn behind the node, if any.
	pub ring: Option<Color>,
}

/// Drawing rules for one graph view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderDirectives {
	show_difference: bool,
	added_nodes: HashSet<String>,
	deleted_nodes: HashSet<String>,
	added_links: HashSet<LinkId>,
	deleted_links: HashSet<LinkId>,
	highlight: Option<HighlightInfo>,
}

impl RenderDirectives {
	/// Default styling, no rings and no colored links.
	pub fn plain() -> Self {
		Self::default()
	}

	/// Emphasizes the hovered or clicked node and its neighbourhood.
	pub fn for_highlight(info: &HighlightInfo) -> Self {
		Self {
			highlight: Some(info.clone()),
			..Self::default()
		}
	}

	/// Rings added and deleted nodes when `show_difference` is set; links keep
	/// their default style.
	pub fn with_difference(show_difference: bool, info: &GraphDifferenceInfo) -> Self {
		Self {
			show_difference,
			added_nodes: info.added_node_ids.iter().cloned().collect(),
			deleted_nodes: info.deleted_node_ids.iter().cloned().collect(),
			..Self::default()
		}
	}

	/// Rings changed nodes and colors changed links of the whole graph.
	pub fn for_diff(info: &GraphDifferenceInfo) -> Self {
		Self {
			added_links: info.added_link_ids.iter().cloned().collect(),
			deleted_links: info.deleted_link_ids.iter().cloned().collect(),
			..Self::with_difference(true, info)
		}
	}

	/// Like [`Self::for_diff`], limited to the record of one service pair.
	/// A pair without link differences has no record and draws plain.
	pub fn for_service_pair(info: &GraphDifferenceInfo, first: &str, second: &str) -> Self {
		match info.pair(first, second) {
			Some(pair) => Self::from_pair(pair),
			None => Self {
				show_difference: true,
				..Self::default()
			},
		}
	}

	fn from_pair(pair: &ServicePairDiff) -> Self {
		Self {
			show_difference: true,
			added_nodes: pair.added_node_ids.iter().cloned().collect(),
			deleted_nodes: pair.deleted_node_ids.iter().cloned().collect(),
			added_links: pair.added_link_ids.iter().cloned().collect(),
			deleted_links: pair.deleted_link_ids.iter().cloned().collect(),
			highlight: None,
		}
	}

	/// Directive for one link.
	pub fn link(&self, link: &GraphLink) -> LinkDirective {
		if link.is_anchor() {
			return LinkDirective::hidden();
		}
		let id = link.id();
		if let Some(highlight) = &self.highlight {
			return if highlight.links.contains(&id) {
				LinkDirective {
					arrow_length: 6.0,
					width: 7.0,
					particle_width: 6.0,
					..LinkDirective::default()
				}
			} else {
				LinkDirective::default()
			};
		}
		if self.added_links.contains(&id) {
			LinkDirective::emphasized(Some(ADDED_LINK))
		} else if self.deleted_links.contains(&id) {
			LinkDirective::emphasized(Some(DELETED_LINK))
		} else {
			LinkDirective::default()
		}
	}

	/// Directive for one node.
	pub fn node(&self, node: &GraphNode) -> NodeDirective {
		let kind = node.kind();
		let fill = Color::generate_from_string(&node.group);
		NodeDirective {
			kind,
			shape: match kind {
				NodeKind::Service => NodeShape::Hexagon,
				NodeKind::Endpoint | NodeKind::External => NodeShape::Circle,
			},
			fill,
			badge: kind.badge(),
			badge_color: fill.decide_foreground(),
			label: match kind {
				NodeKind::Endpoint => shorten_label(&node.name),
				_ => node.name.clone(),
			},
			ring: self.ring(&node.id),
		}
	}

	fn ring(&self, id: &str) -> Option<Color> {
		if let Some(highlight) = &self.highlight {
			return if highlight.focus.as_deref() == Some(id) {
				Some(FOCUS_RING)
			} else if highlight.nodes.contains(id) {
				Some(HIGHLIGHT_RING)
			} else {
				None
			};
		}
		if !self.show_difference {
			return None;
		}
		match (self.added_nodes.contains(id), self.deleted_nodes.contains(id)) {
			(true, false) => Some(ADDED_RING),
			(false, true) => Some(DELETED_RING),
			_ => None,
		}
	}
}

/// Keeps the first and last characters of long endpoint paths.
fn shorten_label(name: &str) -> String {
	let chars: Vec<char> = name.chars().collect();
	if chars.len() <= MAX_LABEL_CHARS {
		return name.to_string();
	}
	let head: String = chars[..LABEL_KEEP_CHARS].iter().collect();
	let tail: String = chars[chars.len() - LABEL_KEEP_CHARS..].iter().collect();
	format!("{head} ... {tail}")
}
