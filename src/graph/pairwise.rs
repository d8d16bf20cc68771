//! Focused sub-graph and relationship of two selected services.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;
use serde::Serialize;

use super::model::{GraphData, GraphLink, GraphNode};

/// Topological relationship between two selected services.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Relationship {
	/// Neither service exists in the graph, or the selection is invalid.
	#[default]
	#[serde(rename = "no matching services in graph")]
	NoMatchingServices,
	/// Exactly one of the two services exists.
	#[serde(rename = "only one matching service")]
	OnlyOneMatchingService,
	/// At least one call link runs between the two services.
	#[serde(rename = "direct dependency")]
	DirectDependency,
	/// Both exist but no call link connects them.
	#[serde(rename = "indirect dependency")]
	IndirectDependency,
}

impl Relationship {
	/// The classification tag.
	pub fn as_str(self) -> &'static str {
		match self {
			Relationship::NoMatchingServices => "no matching services in graph",
			Relationship::OnlyOneMatchingService => "only one matching service",
			Relationship::DirectDependency => "direct dependency",
			Relationship::IndirectDependency => "indirect dependency",
		}
	}

	/// Explanation shown under a pair graph, if the relationship needs one.
	pub fn message(self) -> Option<&'static str> {
		match self {
			Relationship::NoMatchingServices => {
				Some("These two given services do not exist in this version.")
			}
			Relationship::IndirectDependency => {
				Some("These two given services do not have a direct dependency in this version.")
			}
			_ => None,
		}
	}
}

impl fmt::Display for Relationship {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Sub-graph of two services plus their relationship.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServicePairGraph {
	/// Self-consistent copy: node adjacency only refers to kept links.
	pub graph: GraphData,
	pub relationship: Relationship,
}

impl ServicePairGraph {
	/// Links that are actual calls, without the layout anchor.
	pub fn real_links(&self) -> impl Iterator<Item = &GraphLink> {
		self.graph.links.iter().filter(|l| l.kind.is_call())
	}

	/// The layout anchor added for indirectly related services.
	pub fn anchor(&self) -> Option<&GraphLink> {
		self.graph.links.iter().find(|l| l.is_anchor())
	}
}

/// Extracts the sub-graph of `first` and `second` from `graph` and classifies
/// how they relate.
///
/// Keeps every call link whose endpoints both belong to one of the two
/// services and every node grouped under either of them. When both services
/// exist without a link between them, an anchor link `first -> second` is
/// appended so the layout keeps them near each other.
pub fn pairwise(graph: &GraphData, first: &str, second: &str) -> ServicePairGraph {
	if first.is_empty() || second.is_empty() || first == second {
		return ServicePairGraph::default();
	}

	let groups: HashMap<&str, &str> = graph
		.nodes
		.iter()
		.map(|n| (n.id.as_str(), n.group.as_str()))
		.collect();
	let owner = |id: &str| groups.get(id).copied().unwrap_or(id).to_string();
	let in_pair = |id: &str| {
		let owner = owner(id);
		owner == first || owner == second
	};

	let mut links: Vec<GraphLink> = graph
		.links
		.iter()
		.filter(|l| l.kind.is_call() && in_pair(&l.source) && in_pair(&l.target))
		.cloned()
		.collect();

	let nodes: Vec<GraphNode> = graph
		.nodes
		.iter()
		.filter(|n| n.group == first || n.group == second)
		.map(|n| restrict_to(n, &links))
		.collect();

	let has = |id: &str| nodes.iter().any(|n| n.id == id);
	let relationship = match (has(first), has(second)) {
		(false, false) => Relationship::NoMatchingServices,
		(true, false) | (false, true) => Relationship::OnlyOneMatchingService,
		(true, true) => {
			let direct = links
				.iter()
				.any(|l| owner(&l.source) != owner(&l.target));
			if direct {
				Relationship::DirectDependency
			} else {
				Relationship::IndirectDependency
			}
		}
	};

	if relationship == Relationship::IndirectDependency {
		links.push(GraphLink::anchor(first, second));
	}

	debug!(
		"topology-diff: pair {first} / {second}: {relationship}, {} nodes, {} links",
		nodes.len(),
		links.len()
	);

	ServicePairGraph {
		graph: GraphData { nodes, links },
		relationship,
	}
}

/// Copy of `node` whose links and dependencies only refer to `links`.
fn restrict_to(node: &GraphNode, links: &[GraphLink]) -> GraphNode {
	let link_in_between: Vec<GraphLink> = links
		.iter()
		.filter(|l| l.source == node.id)
		.cloned()
		.collect();
	let mut seen = HashSet::new();
	let dependencies = link_in_between
		.iter()
		.filter(|l| seen.insert(l.target.as_str()))
		.map(|l| l.target.clone())
		.collect();
	GraphNode {
		dependencies,
		link_in_between,
		..node.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn graph(services: &[&str], endpoints: &[(&str, &str)], links: &[(&str, &str)]) -> GraphData {
		let mut nodes: Vec<GraphNode> = services.iter().map(|s| GraphNode::service(*s, *s)).collect();
		nodes.extend(endpoints.iter().map(|(id, group)| GraphNode::new(*id, *group, *id)));
		for node in &mut nodes {
			node.link_in_between = links
				.iter()
				.filter(|(s, _)| *s == node.id)
				.map(|(s, t)| GraphLink::new(*s, *t))
				.collect();
			node.dependencies = node.link_in_between.iter().map(|l| l.target.clone()).collect();
		}
		GraphData {
			nodes,
			links: links.iter().map(|(s, t)| GraphLink::new(*s, *t)).collect(),
		}
	}

	#[test]
	fn invalid_selection() {
		let g = graph(&["a", "b"], &[], &[("a", "b")]);
		assert_eq!(pairwise(&g, "", "b"), ServicePairGraph::default());
		assert_eq!(pairwise(&g, "a", "a").relationship, Relationship::NoMatchingServices);
		assert!(pairwise(&g, "a", "").graph.is_empty());
	}

	#[test]
	fn restricts_adjacency_to_kept_links() {
		let g = graph(
			&["a", "b", "c"],
			&[("a/x", "a")],
			&[("a", "b"), ("a", "c"), ("a/x", "b"), ("a/x", "c")],
		);
		let pair = pairwise(&g, "a", "b");
		assert_eq!(pair.relationship, Relationship::DirectDependency);
		assert_eq!(pair.graph.nodes.len(), 3);
		assert_eq!(pair.graph.links.len(), 2);

		let a = pair.graph.node("a").unwrap();
		assert_eq!(a.dependencies, vec!["b".to_string()]);
		assert_eq!(a.link_in_between, vec![GraphLink::new("a", "b")]);
		let ax = pair.graph.node("a/x").unwrap();
		assert_eq!(ax.dependencies, vec!["b".to_string()]);

		// source untouched
		assert_eq!(g.node("a").unwrap().dependencies.len(), 2);
	}

	#[test]
	fn endpoint_cross_link_is_direct() {
		let g = graph(
			&["a", "b"],
			&[("a/x", "a"), ("b/y", "b")],
			&[("a/x", "b/y")],
		);
		assert_eq!(pairwise(&g, "b", "a").relationship, Relationship::DirectDependency);
	}

	#[test]
	fn internal_links_only_is_indirect() {
		let g = graph(&["a", "b"], &[("a/x", "a")], &[("a", "a/x")]);
		let pair = pairwise(&g, "a", "b");
		assert_eq!(pair.relationship, Relationship::IndirectDependency);
		assert_eq!(pair.real_links().count(), 1);
		assert_eq!(pair.anchor(), Some(&GraphLink::anchor("a", "b")));
	}

	#[test]
	fn relationship_tags_and_messages() {
		let json = serde_json::to_value(Relationship::OnlyOneMatchingService).unwrap();
		assert_eq!(json, "only one matching service");
		assert_eq!(Relationship::DirectDependency.to_string(), "direct dependency");
		assert!(Relationship::DirectDependency.message().is_none());
		assert!(Relationship::IndirectDependency.message().is_some());
	}
}
