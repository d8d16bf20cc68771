//! Set differences between two dependency graph snapshots.
//!
//! [`compare`] takes the newer snapshot first: nodes and links that only it
//! contains are reported as added, those only in the older one as deleted.
//! The result is recomputed in full on every call and owns no resources.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::Serialize;

use super::model::{EXTERNAL_NODE_ID, GraphData, GraphLink, LinkId, NodeKind};

/// Pairwise breakdowns are only produced above this many services.
const MIN_SERVICES_FOR_PAIRS: usize = 2;

/// How a service changed between the two snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
	/// Only the newer snapshot has the service node.
	Added,
	/// Only the older snapshot has the service node.
	Deleted,
	/// Present in both, with something owned by it added or deleted.
	Modified,
	/// Present in both and untouched.
	Unchanged,
}

impl ServiceState {
	pub fn as_str(self) -> &'static str {
		match self {
			ServiceState::Added => "added",
			ServiceState::Deleted => "deleted",
			ServiceState::Modified => "modified",
			ServiceState::Unchanged => "unchanged",
		}
	}
}

/// Differences restricted to one unordered pair of services.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePairDiff {
	pub service_id_pair: [String; 2],
	pub service_states: [ServiceState; 2],
	pub added_node_ids: Vec<String>,
	pub deleted_node_ids: Vec<String>,
	pub added_link_ids: Vec<LinkId>,
	pub deleted_link_ids: Vec<LinkId>,
}

impl ServicePairDiff {
	/// Whether this record is for `first` and `second`, in either order.
	pub fn involves(&self, first: &str, second: &str) -> bool {
		let [a, b] = &self.service_id_pair;
		(a == first && b == second) || (a == second && b == first)
	}

	/// State recorded for one side of the pair.
	pub fn state_of(&self, service_id: &str) -> Option<ServiceState> {
		self.service_id_pair
			.iter()
			.position(|id| id == service_id)
			.map(|i| self.service_states[i])
	}
}

/// Result of comparing two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDifferenceInfo {
	pub added_node_ids: Vec<String>,
	pub deleted_node_ids: Vec<String>,
	pub added_link_ids: Vec<LinkId>,
	pub deleted_link_ids: Vec<LinkId>,
	/// Service ids of both snapshots in discovery order, external node excluded.
	pub all_service_node_ids: Vec<String>,
	pub diffs_between_two_services: Vec<ServicePairDiff>,
}

impl GraphDifferenceInfo {
	/// The pair record for two services, if they have link differences.
	pub fn pair(&self, first: &str, second: &str) -> Option<&ServicePairDiff> {
		self.diffs_between_two_services
			.iter()
			.find(|p| p.involves(first, second))
	}

	pub fn is_added_node(&self, id: &str) -> bool {
		self.added_node_ids.iter().any(|n| n == id)
	}

	pub fn is_deleted_node(&self, id: &str) -> bool {
		self.deleted_node_ids.iter().any(|n| n == id)
	}

	/// `true` when the snapshots have the same nodes and links.
	pub fn is_empty(&self) -> bool {
		self.added_node_ids.is_empty()
			&& self.deleted_node_ids.is_empty()
			&& self.added_link_ids.is_empty()
			&& self.deleted_link_ids.is_empty()
	}
}

/// Resolves node ids to their owning service across both snapshots.
struct Ownership<'a> {
	groups: HashMap<&'a str, &'a str>,
}

impl<'a> Ownership<'a> {
	fn new(newer: &'a GraphData, older: &'a GraphData) -> Self {
		let mut groups = HashMap::new();
		for node in newer.nodes.iter().chain(&older.nodes) {
			groups.entry(node.id.as_str()).or_insert(node.group.as_str());
		}
		Self { groups }
	}

	/// Ids unknown to both snapshots own themselves.
	fn owner<'b>(&self, id: &'b str) -> &'b str
	where
		'a: 'b,
	{
		self.groups.get(id).copied().unwrap_or(id)
	}

	fn link_owners<'b>(&self, link: &'b LinkId) -> Option<(&'b str, &'b str)>
	where
		'a: 'b,
	{
		link.endpoints()
			.map(|(source, target)| (self.owner(source), self.owner(target)))
	}
}

/// Items of `items` missing from `other`, first occurrence only.
fn ordered_difference<T>(items: &[T], other: &HashSet<T>) -> Vec<T>
where
	T: Clone + Eq + std::hash::Hash,
{
	let mut seen = HashSet::new();
	items
		.iter()
		.filter(|item| !other.contains(*item) && seen.insert(*item))
		.cloned()
		.collect()
}

fn id_set<T>(items: &[T]) -> HashSet<T>
where
	T: Clone + Eq + std::hash::Hash,
{
	items.iter().cloned().collect()
}

fn node_ids(graph: &GraphData) -> Vec<String> {
	graph.nodes.iter().map(|n| n.id.clone()).collect()
}

/// Real call links only; layout anchors never count as differences.
fn link_ids(graph: &GraphData) -> Vec<LinkId> {
	graph
		.links
		.iter()
		.filter(|l| l.kind.is_call())
		.map(GraphLink::id)
		.collect()
}

fn all_service_ids(newer: &GraphData, older: &GraphData) -> Vec<String> {
	let mut seen = HashSet::new();
	newer
		.service_ids()
		.chain(older.service_ids())
		.filter(|id| seen.insert(*id))
		.map(str::to_string)
		.collect()
}

/// Compares two snapshots; either side missing yields an empty result.
pub fn compare(newer: Option<&GraphData>, older: Option<&GraphData>) -> GraphDifferenceInfo {
	let (Some(newer), Some(older)) = (newer, older) else {
		return GraphDifferenceInfo::default();
	};

	let (newer_nodes, older_nodes) = (node_ids(newer), node_ids(older));
	let (newer_links, older_links) = (link_ids(newer), link_ids(older));

	let mut info = GraphDifferenceInfo {
		added_node_ids: ordered_difference(&newer_nodes, &id_set(&older_nodes)),
		deleted_node_ids: ordered_difference(&older_nodes, &id_set(&newer_nodes)),
		added_link_ids: ordered_difference(&newer_links, &id_set(&older_links)),
		deleted_link_ids: ordered_difference(&older_links, &id_set(&newer_links)),
		all_service_node_ids: all_service_ids(newer, older),
		diffs_between_two_services: Vec::new(),
	};

	if info.all_service_node_ids.len() > MIN_SERVICES_FOR_PAIRS {
		info.diffs_between_two_services = pair_diffs(&info, newer, older);
	}

	debug!(
		"topology-diff: +{} -{} nodes, +{} -{} links, {} services, {} changed pairs",
		info.added_node_ids.len(),
		info.deleted_node_ids.len(),
		info.added_link_ids.len(),
		info.deleted_link_ids.len(),
		info.all_service_node_ids.len(),
		info.diffs_between_two_services.len()
	);
	info
}

fn service_states<'a>(
	info: &'a GraphDifferenceInfo,
	owners: &Ownership<'a>,
	newer: &GraphData,
	older: &GraphData,
) -> HashMap<&'a str, ServiceState> {
	let mut touched: HashSet<&str> = HashSet::new();
	for id in info.added_node_ids.iter().chain(&info.deleted_node_ids) {
		touched.insert(owners.owner(id));
	}
	for link in info.added_link_ids.iter().chain(&info.deleted_link_ids) {
		if let Some((source, target)) = owners.link_owners(link) {
			touched.insert(source);
			touched.insert(target);
		}
	}

	info.all_service_node_ids
		.iter()
		.map(|id| {
			let state = if info.is_added_node(id) {
				ServiceState::Added
			} else if info.is_deleted_node(id) {
				ServiceState::Deleted
			} else if newer.contains_node(id) && older.contains_node(id) && touched.contains(id.as_str())
			{
				ServiceState::Modified
			} else {
				ServiceState::Unchanged
			};
			(id.as_str(), state)
		})
		.collect()
}

fn pair_diffs(info: &GraphDifferenceInfo, newer: &GraphData, older: &GraphData) -> Vec<ServicePairDiff> {
	let owners = Ownership::new(newer, older);
	let states = service_states(info, &owners, newer, older);
	let services = &info.all_service_node_ids;

	let nodes_of = |ids: &[String], pair: [&str; 2]| -> Vec<String> {
		ids.iter()
			.filter(|id| pair.contains(&owners.owner(id)))
			.cloned()
			.collect()
	};
	let links_of = |ids: &[LinkId], pair: [&str; 2]| -> Vec<LinkId> {
		ids.iter()
			.filter(|link| {
				owners
					.link_owners(link)
					.is_some_and(|(source, target)| pair.contains(&source) && pair.contains(&target))
			})
			.cloned()
			.collect()
	};

	let mut pairs = Vec::new();
	for (i, first) in services.iter().enumerate() {
		for second in &services[i + 1..] {
			let pair = [first.as_str(), second.as_str()];
			let added_link_ids = links_of(&info.added_link_ids, pair);
			let deleted_link_ids = links_of(&info.deleted_link_ids, pair);
			if added_link_ids.is_empty() && deleted_link_ids.is_empty() {
				continue;
			}
			let state = |id: &str| states.get(id).copied().unwrap_or(ServiceState::Unchanged);
			pairs.push(ServicePairDiff {
				service_id_pair: [first.clone(), second.clone()],
				service_states: [state(first), state(second)],
				added_node_ids: nodes_of(&info.added_node_ids, pair),
				deleted_node_ids: nodes_of(&info.deleted_node_ids, pair),
				added_link_ids,
				deleted_link_ids,
			});
		}
	}
	pairs
}

/// An added or deleted endpoint of a service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EndpointChange {
	pub id: String,
	pub name: String,
}

/// Node differences of one service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceChangeGroup {
	pub service_id: String,
	/// Service id with its first tab shown as a dot.
	pub display_name: String,
	pub state: ServiceState,
	pub endpoints: Vec<EndpointChange>,
}

/// Added and deleted nodes grouped by owning service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GroupedChanges {
	pub added: Vec<ServiceChangeGroup>,
	pub deleted: Vec<ServiceChangeGroup>,
}

/// Groups the node differences of `info` by owning service.
///
/// Added nodes are looked up in `newer`, deleted ones in `older`. The external
/// node never forms a group.
pub fn group_changes(info: &GraphDifferenceInfo, newer: &GraphData, older: &GraphData) -> GroupedChanges {
	GroupedChanges {
		added: group_nodes(&info.added_node_ids, newer, ServiceState::Added),
		deleted: group_nodes(&info.deleted_node_ids, older, ServiceState::Deleted),
	}
}

fn group_nodes(ids: &[String], graph: &GraphData, whole: ServiceState) -> Vec<ServiceChangeGroup> {
	let nodes: Vec<_> = ids.iter().filter_map(|id| graph.node(id)).collect();

	let mut groups: Vec<ServiceChangeGroup> = Vec::new();
	for node in &nodes {
		if node.group == EXTERNAL_NODE_ID || groups.iter().any(|g| g.service_id == node.group) {
			continue;
		}
		let service_changed = nodes.iter().any(|n| n.id == node.group);
		groups.push(ServiceChangeGroup {
			service_id: node.group.clone(),
			display_name: node.group.replacen('\t', ".", 1),
			state: if service_changed { whole } else { ServiceState::Modified },
			endpoints: nodes
				.iter()
				.filter(|n| n.group == node.group && n.kind() == NodeKind::Endpoint)
				.map(|n| EndpointChange {
					id: n.id.clone(),
					name: n.name.clone(),
				})
				.collect(),
		});
	}
	groups
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::model::GraphNode;

	fn graph(services: &[&str], endpoints: &[(&str, &str)], links: &[(&str, &str)]) -> GraphData {
		let mut nodes: Vec<GraphNode> = services.iter().map(|s| GraphNode::service(*s, *s)).collect();
		nodes.extend(endpoints.iter().map(|(id, group)| GraphNode::new(*id, *group, *id)));
		GraphData {
			nodes,
			links: links.iter().map(|(s, t)| GraphLink::new(*s, *t)).collect(),
		}
	}

	#[test]
	fn missing_input_is_empty() {
		let g = graph(&["a"], &[], &[]);
		assert_eq!(compare(None, Some(&g)), GraphDifferenceInfo::default());
		assert_eq!(compare(Some(&g), None), GraphDifferenceInfo::default());
		assert!(compare(None, None).is_empty());
	}

	#[test]
	fn node_and_link_differences() {
		let newer = graph(&["a", "b", "c"], &[("a/x", "a")], &[("a", "b"), ("a/x", "c")]);
		let older = graph(&["a", "b", "d"], &[], &[("a", "b"), ("b", "d")]);
		let info = compare(Some(&newer), Some(&older));

		assert_eq!(info.added_node_ids, vec!["c", "a/x"]);
		assert_eq!(info.deleted_node_ids, vec!["d"]);
		assert_eq!(info.added_link_ids, vec![LinkId::new("a/x", "c")]);
		assert_eq!(info.deleted_link_ids, vec![LinkId::new("b", "d")]);
		assert_eq!(info.all_service_node_ids, vec!["a", "b", "c", "d"]);
	}

	#[test]
	fn external_node_is_not_a_service() {
		let newer = graph(&["a", "b", EXTERNAL_NODE_ID], &[], &[]);
		let older = graph(&["a", "c"], &[], &[]);
		let info = compare(Some(&newer), Some(&older));
		assert_eq!(info.all_service_node_ids, vec!["a", "b", "c"]);
		assert_eq!(info.added_node_ids, vec!["b", EXTERNAL_NODE_ID]);
	}

	#[test]
	fn pair_records_and_states() {
		let newer = graph(
			&["a", "b", "c"],
			&[("a/x", "a")],
			&[("a", "b"), ("a/x", "c")],
		);
		let older = graph(&["a", "b", "d"], &[], &[("a", "b"), ("b", "d")]);
		let info = compare(Some(&newer), Some(&older));

		let ac = info.pair("c", "a").unwrap();
		assert_eq!(ac.service_id_pair, ["a".to_string(), "c".to_string()]);
		assert_eq!(ac.service_states, [ServiceState::Modified, ServiceState::Added]);
		assert_eq!(ac.added_node_ids, vec!["c", "a/x"]);
		assert_eq!(ac.added_link_ids, vec![LinkId::new("a/x", "c")]);

		let bd = info.pair("b", "d").unwrap();
		assert_eq!(bd.state_of("b"), Some(ServiceState::Modified));
		assert_eq!(bd.state_of("d"), Some(ServiceState::Deleted));
		assert_eq!(bd.deleted_node_ids, vec!["d"]);

		// a-b kept its only link
		assert!(info.pair("a", "b").is_none());
		assert_eq!(info.diffs_between_two_services.len(), 2);
	}

	#[test]
	fn internal_link_counts_for_every_pair_of_its_service() {
		let newer = graph(&["a", "b", "c"], &[("a/x", "a")], &[("a/x", "a")]);
		let older = graph(&["a", "b", "c"], &[("a/x", "a")], &[]);
		let info = compare(Some(&newer), Some(&older));

		assert_eq!(info.diffs_between_two_services.len(), 2);
		let ab = info.pair("a", "b").unwrap();
		assert_eq!(ab.service_states, [ServiceState::Modified, ServiceState::Unchanged]);
		assert_eq!(ab.added_link_ids, vec![LinkId::new("a/x", "a")]);
		assert!(ab.added_node_ids.is_empty());
		assert!(info.pair("a", "c").is_some());
		assert!(info.pair("b", "c").is_none());
	}

	#[test]
	fn grouping_by_service() {
		let newer = graph(
			&["s\tns\tv1", "t", EXTERNAL_NODE_ID],
			&[("s\tns\tv1\tGET\t/a", "s\tns\tv1"), ("t/x", "t")],
			&[],
		);
		let older = graph(&["t", "u"], &[("u/y", "u")], &[]);
		let info = compare(Some(&newer), Some(&older));
		let grouped = group_changes(&info, &newer, &older);

		assert_eq!(grouped.added.len(), 2);
		let s = &grouped.added[0];
		assert_eq!(s.state, ServiceState::Added);
		assert_eq!(s.display_name, "s.ns\tv1");
		assert_eq!(s.endpoints.len(), 1);
		let t = &grouped.added[1];
		assert_eq!(t.service_id, "t");
		assert_eq!(t.state, ServiceState::Modified);
		assert_eq!(t.endpoints[0].id, "t/x");

		assert_eq!(grouped.deleted.len(), 1);
		assert_eq!(grouped.deleted[0].state, ServiceState::Deleted);
		assert_eq!(grouped.deleted[0].endpoints.len(), 1);
	}
}
