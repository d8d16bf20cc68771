//! End-to-end checks over JSON snapshots shaped like the backend payload.

use std::collections::HashSet;

use serde_json::json;
use topology_diff::graph::{
	GraphData, GraphLink, LinkId, Relationship, RenderDirectives, ServiceState, compare,
	group_changes, pairwise, process,
};

fn snapshot(value: serde_json::Value) -> GraphData {
	serde_json::from_value(value).expect("fixture is a valid snapshot")
}

fn older() -> GraphData {
	snapshot(json!({
		"nodes": [
			{ "id": "orders", "group": "orders", "name": "orders",
			  "dependencies": ["payments"],
			  "linkInBetween": [{ "source": "orders", "target": "payments" }] },
			{ "id": "orders\tGET /orders", "group": "orders", "name": "GET /orders" },
			{ "id": "payments", "group": "payments", "name": "payments" },
			{ "id": "users", "group": "users", "name": "users",
			  "dependencies": ["null"],
			  "linkInBetween": [{ "source": "users", "target": "null" }] },
			{ "id": "null", "group": "null", "name": "external" }
		],
		"links": [
			{ "source": "orders", "target": "payments" },
			{ "source": "users", "target": "null" }
		]
	}))
}

fn newer() -> GraphData {
	snapshot(json!({
		"nodes": [
			{ "id": "orders", "group": "orders", "name": "orders",
			  "dependencies": ["payments", "shipping"],
			  "linkInBetween": [
				{ "source": "orders", "target": "payments" },
				{ "source": "orders", "target": "shipping" }
			  ] },
			{ "id": "orders\tPOST /orders", "group": "orders", "name": "POST /orders" },
			{ "id": "payments", "group": "payments", "name": "payments" },
			{ "id": "users", "group": "users", "name": "users",
			  "dependencies": ["payments"],
			  "linkInBetween": [{ "source": "users", "target": "payments" }] },
			{ "id": "shipping", "group": "shipping", "name": "shipping" },
			{ "id": "null", "group": "null", "name": "external" }
		],
		"links": [
			{ "source": "orders", "target": "payments" },
			{ "source": "orders", "target": "shipping" },
			{ "source": "users", "target": "payments" }
		]
	}))
}

fn ids(items: &[&str]) -> Vec<String> {
	items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn compare_is_idempotent() {
	let (a, b) = (newer(), older());
	assert_eq!(compare(Some(&a), Some(&b)), compare(Some(&a), Some(&b)));
}

#[test]
fn added_and_deleted_swap_when_arguments_swap() {
	let (a, b) = (newer(), older());
	let forward = compare(Some(&a), Some(&b));
	let backward = compare(Some(&b), Some(&a));
	assert_eq!(forward.added_node_ids, backward.deleted_node_ids);
	assert_eq!(forward.deleted_node_ids, backward.added_node_ids);
	assert_eq!(forward.added_link_ids, backward.deleted_link_ids);
	assert_eq!(forward.deleted_link_ids, backward.added_link_ids);
}

#[test]
fn added_nodes_are_exactly_the_new_ids() {
	let (a, b) = (newer(), older());
	let info = compare(Some(&a), Some(&b));
	let expected: HashSet<&str> = a
		.nodes
		.iter()
		.map(|n| n.id.as_str())
		.filter(|id| !b.contains_node(id))
		.collect();
	let actual: HashSet<&str> = info.added_node_ids.iter().map(String::as_str).collect();
	assert_eq!(actual, expected);
	assert_eq!(info.added_node_ids, ids(&["orders\tPOST /orders", "shipping"]));
	assert_eq!(info.deleted_node_ids, ids(&["orders\tGET /orders"]));
	assert_eq!(
		info.added_link_ids,
		vec![LinkId::new("orders", "shipping"), LinkId::new("users", "payments")]
	);
	assert_eq!(info.deleted_link_ids, vec![LinkId::new("users", "null")]);
	assert_eq!(info.all_service_node_ids, ids(&["orders", "payments", "users", "shipping"]));
}

#[test]
fn pairs_without_link_changes_are_omitted() {
	let info = compare(Some(&newer()), Some(&older()));
	let pairs: Vec<&[String; 2]> = info
		.diffs_between_two_services
		.iter()
		.map(|p| &p.service_id_pair)
		.collect();
	assert_eq!(
		pairs,
		vec![
			&["orders".to_string(), "shipping".to_string()],
			&["payments".to_string(), "users".to_string()],
		]
	);
	// orders -> payments exists in both versions
	assert!(info.pair("orders", "payments").is_none());

	let orders_shipping = info.pair("shipping", "orders").expect("pair recorded");
	assert_eq!(orders_shipping.state_of("orders"), Some(ServiceState::Modified));
	assert_eq!(orders_shipping.state_of("shipping"), Some(ServiceState::Added));
	assert_eq!(
		orders_shipping.added_node_ids,
		ids(&["orders\tPOST /orders", "shipping"])
	);
	assert_eq!(orders_shipping.deleted_node_ids, ids(&["orders\tGET /orders"]));

	let payments_users = info.pair("payments", "users").expect("pair recorded");
	assert_eq!(payments_users.added_link_ids, vec![LinkId::new("users", "payments")]);
	assert!(payments_users.deleted_link_ids.is_empty());
}

#[test]
fn two_services_never_get_pair_records() {
	let a = snapshot(json!({
		"nodes": [
			{ "id": "a", "group": "a", "name": "a" },
			{ "id": "b", "group": "b", "name": "b" },
			{ "id": "null", "group": "null", "name": "external" }
		],
		"links": [{ "source": "a", "target": "b" }]
	}));
	let b = snapshot(json!({
		"nodes": [
			{ "id": "a", "group": "a", "name": "a" },
			{ "id": "b", "group": "b", "name": "b" }
		],
		"links": [{ "source": "b", "target": "a" }]
	}));
	let info = compare(Some(&a), Some(&b));
	assert_eq!(info.all_service_node_ids.len(), 2);
	assert_eq!(info.added_link_ids.len(), 1);
	assert_eq!(info.deleted_link_ids.len(), 1);
	assert!(info.diffs_between_two_services.is_empty());
}

#[test]
fn difference_serializes_in_camel_case() {
	let info = compare(Some(&newer()), Some(&older()));
	let value = serde_json::to_value(&info).unwrap();
	assert_eq!(value["addedLinkIds"][0], "orders==>shipping");
	let first = &value["diffsBetweenTwoServices"][0];
	assert_eq!(first["serviceIdPair"], json!(["orders", "shipping"]));
	assert_eq!(first["serviceStates"], json!(["modified", "added"]));
}

#[test]
fn changes_grouped_by_service() {
	let (a, b) = (newer(), older());
	let info = compare(Some(&a), Some(&b));
	let grouped = group_changes(&info, &a, &b);

	let added: Vec<(&str, ServiceState)> = grouped
		.added
		.iter()
		.map(|g| (g.service_id.as_str(), g.state))
		.collect();
	assert_eq!(
		added,
		vec![("orders", ServiceState::Modified), ("shipping", ServiceState::Added)]
	);
	assert_eq!(grouped.added[0].endpoints[0].name, "POST /orders");
	assert!(grouped.added[1].endpoints.is_empty());

	assert_eq!(grouped.deleted.len(), 1);
	assert_eq!(grouped.deleted[0].service_id, "orders");
	assert_eq!(grouped.deleted[0].state, ServiceState::Modified);
}

fn chain() -> GraphData {
	snapshot(json!({
		"nodes": [
			{ "id": "A", "group": "A", "name": "A", "dependencies": ["C"],
			  "linkInBetween": [{ "source": "A", "target": "C" }] },
			{ "id": "B", "group": "B", "name": "B" },
			{ "id": "C", "group": "C", "name": "C", "dependencies": ["B"],
			  "linkInBetween": [{ "source": "C", "target": "B" }] }
		],
		"links": [
			{ "source": "A", "target": "C" },
			{ "source": "C", "target": "B" }
		]
	}))
}

#[test]
fn direct_dependency() {
	let graph = snapshot(json!({
		"nodes": [
			{ "id": "A", "group": "A", "name": "A", "dependencies": ["B"],
			  "linkInBetween": [{ "source": "A", "target": "B" }] },
			{ "id": "B", "group": "B", "name": "B" }
		],
		"links": [{ "source": "A", "target": "B" }]
	}));
	let pair = pairwise(&graph, "A", "B");
	assert_eq!(pair.relationship, Relationship::DirectDependency);
	assert_eq!(pair.relationship.to_string(), "direct dependency");
	assert_eq!(pair.graph.nodes.len(), 2);
	assert_eq!(pair.graph.links, vec![GraphLink::new("A", "B")]);
	assert!(pair.anchor().is_none());
}

#[test]
fn indirect_dependency_gets_an_anchor() {
	let graph = chain();
	let pair = pairwise(&graph, "A", "B");
	assert_eq!(pair.relationship, Relationship::IndirectDependency);
	assert_eq!(pair.relationship.as_str(), "indirect dependency");
	assert_eq!(pair.graph.nodes.len(), 2);
	assert_eq!(pair.real_links().count(), 0);

	let anchor = pair.anchor().expect("anchor link");
	assert!(anchor.connects("A", "B"));
	assert!(graph.link("A", "B").is_none());
	assert!(!RenderDirectives::plain().link(anchor).visible);
}

#[test]
fn missing_services() {
	let graph = chain();
	assert_eq!(
		pairwise(&graph, "A", "Z").relationship,
		Relationship::OnlyOneMatchingService
	);
	let none = pairwise(&graph, "Y", "Z");
	assert_eq!(none.relationship, Relationship::NoMatchingServices);
	assert_eq!(none.relationship.to_string(), "no matching services in graph");
	assert!(none.graph.nodes.is_empty());
}

#[test]
fn processing_keeps_the_snapshot() {
	let graph = newer();
	let processed = process(graph.clone());
	assert_eq!(processed.graph.nodes.len(), graph.nodes.len());
	assert_eq!(processed.graph.links, graph.links);
	let orders = processed.adjacency("orders").expect("orders adjacency");
	assert_eq!(orders.highlight, ids(&["payments", "shipping"]));
}

#[test]
fn duplicate_links_share_an_id() {
	let doubled = snapshot(json!({
		"nodes": [
			{ "id": "a", "group": "a", "name": "a" },
			{ "id": "b", "group": "b", "name": "b" }
		],
		"links": [
			{ "source": "a", "target": "b" },
			{ "source": "a", "target": "b" }
		]
	}));
	let single = snapshot(json!({
		"nodes": [
			{ "id": "a", "group": "a", "name": "a" },
			{ "id": "b", "group": "b", "name": "b" }
		],
		"links": [{ "source": "a", "target": "b" }]
	}));
	assert_eq!(doubled.links[0].id(), doubled.links[1].id());
	assert!(compare(Some(&doubled), Some(&single)).is_empty());

	let empty = GraphData::default();
	let info = compare(Some(&doubled), Some(&empty));
	assert_eq!(info.added_link_ids, vec![LinkId::new("a", "b")]);
}

#[test]
fn pair_directives_follow_the_pair_record() {
	let info = compare(Some(&newer()), Some(&older()));
	let directives = RenderDirectives::for_service_pair(&info, "orders", "shipping");
	let added = directives.link(&GraphLink::new("orders", "shipping"));
	assert_eq!((added.arrow_length, added.width), (6.0, 4.0));
	assert!(added.color.is_some());
	let elsewhere = directives.link(&GraphLink::new("users", "payments"));
	assert!(elsewhere.color.is_none());
}

#[test]
fn links_to_the_external_node_form_no_pair() {
	let base = json!([
		{ "id": "a", "group": "a", "name": "a" },
		{ "id": "b", "group": "b", "name": "b" },
		{ "id": "c", "group": "c", "name": "c" },
		{ "id": "null", "group": "null", "name": "external" }
	]);
	let older = snapshot(json!({ "nodes": base, "links": [] }));
	let newer = snapshot(json!({
		"nodes": base,
		"links": [{ "source": "a", "target": "null" }]
	}));
	let info = compare(Some(&newer), Some(&older));
	assert_eq!(info.added_link_ids, vec![LinkId::new("a", "null")]);
	assert_eq!(info.all_service_node_ids, ids(&["a", "b", "c"]));
	assert!(info.diffs_between_two_services.is_empty());
}
