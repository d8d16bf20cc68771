//! Per-node adjacency for interactive display.
//!
//! The processed graph keeps the snapshot untouched and exposes an id-keyed
//! lookup table alongside it, so hover highlighting compares ids instead of
//! object identity.

use std::collections::{HashMap, HashSet};

use super::model::{GraphData, GraphLink, LinkId};

/// Derived cross references of one node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeAdjacency {
	/// Resolved dependency node ids, in dependency order.
	pub highlight: Vec<String>,
	/// Ids of the snapshot links listed in the node's `linkInBetween`.
	pub links: Vec<LinkId>,
}

/// A snapshot plus its adjacency table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessedGraph {
	pub graph: GraphData,
	adjacency: HashMap<String, NodeAdjacency>,
}

impl ProcessedGraph {
	/// Adjacency of a node; `None` for ids not in the snapshot.
	pub fn adjacency(&self, id: &str) -> Option<&NodeAdjacency> {
		self.adjacency.get(id)
	}

	pub fn node_count(&self) -> usize {
		self.graph.nodes.len()
	}
}

/// Builds the adjacency table for `graph`.
///
/// Dependencies that do not name a node of the snapshot are dropped, as are
/// `linkInBetween` entries without a matching snapshot link.
pub fn process(graph: GraphData) -> ProcessedGraph {
	let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
	let link_ids: HashSet<LinkId> = graph.links.iter().map(GraphLink::id).collect();

	let adjacency = graph
		.nodes
		.iter()
		.map(|node| {
			let mut seen = HashSet::new();
			let highlight = node
				.dependencies
				.iter()
				.filter(|d| node_ids.contains(d.as_str()) && seen.insert(d.as_str()))
				.cloned()
				.collect();
			let links = node
				.link_in_between
				.iter()
				.map(GraphLink::id)
				.filter(|id| link_ids.contains(id))
				.collect();
			(node.id.clone(), NodeAdjacency { highlight, links })
		})
		.collect();

	ProcessedGraph { graph, adjacency }
}

/// Nodes and links lit up by the current hover or click.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightInfo {
	pub nodes: HashSet<String>,
	pub links: HashSet<LinkId>,
	/// The clicked node, if the highlight came from a node.
	pub focus: Option<String>,
}

impl HighlightInfo {
	/// Highlight a node, its dependencies and its outgoing links.
	pub fn on_node(processed: &ProcessedGraph, id: &str) -> Self {
		let Some(adjacency) = processed.adjacency(id) else {
			return Self::default();
		};
		let mut nodes: HashSet<String> = adjacency.highlight.iter().cloned().collect();
		nodes.insert(id.to_string());
		Self {
			nodes,
			links: adjacency.links.iter().cloned().collect(),
			focus: Some(id.to_string()),
		}
	}

	/// Highlight a link, its reverse link and both of its endpoints.
	pub fn on_link(processed: &ProcessedGraph, link: &GraphLink) -> Self {
		let mut info = Self::default();
		info.links.insert(link.id());
		let reverse = LinkId::new(&link.target, &link.source);
		let has_reverse = processed
			.adjacency(&link.target)
			.is_some_and(|adj| adj.links.contains(&reverse));
		if has_reverse {
			info.links.insert(reverse);
		}
		info.nodes.insert(link.source.clone());
		info.nodes.insert(link.target.clone());
		info
	}

	/// Clicking the focused node again clears the highlight.
	pub fn toggle_node(&self, processed: &ProcessedGraph, id: &str) -> Self {
		if self.focus.as_deref() == Some(id) {
			Self::default()
		} else {
			Self::on_node(processed, id)
		}
	}

	/// Clicking a link that is already lit by a link highlight clears it.
	pub fn toggle_link(&self, processed: &ProcessedGraph, link: &GraphLink) -> Self {
		if self.focus.is_none() && self.links.contains(&link.id()) {
			Self::default()
		} else {
			Self::on_link(processed, link)
		}
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}
}
