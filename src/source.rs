//! Snapshots and view configuration embedded in the page.
//!
//! The host page supplies the latest snapshot, the tagged historical snapshots
//! and the view configuration as `<script type="application/json">` elements.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::graph::GraphData;

/// Element holding the latest [`GraphData`].
pub const LATEST_GRAPH_ELEMENT: &str = "latest-graph";
/// Element holding an array of [`TaggedGraphData`].
pub const TAGGED_GRAPHS_ELEMENT: &str = "tagged-graphs";
/// Element holding the [`ViewConfig`].
pub const CONFIG_ELEMENT: &str = "diff-config";

/// Version name that always resolves to the latest snapshot.
pub const LATEST_TAG: &str = "latest";

#[derive(Debug, Error)]
pub enum SourceError {
	#[error("no document available")]
	NoDocument,

	#[error("element #{0} not found")]
	MissingElement(String),

	#[error("element #{0} is not a script element")]
	NotAScript(String),

	#[error("failed to parse #{id}: {source}")]
	Parse {
		id: String,
		#[source]
		source: serde_json::Error,
	},
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Parses the JSON text of element `id`.
pub fn parse_json<T: DeserializeOwned>(id: &str, text: &str) -> Result<T> {
	serde_json::from_str(text).map_err(|source| SourceError::Parse {
		id: id.to_string(),
		source,
	})
}

/// Reads and parses the JSON content of the script element `id`.
pub fn load_json<T: DeserializeOwned>(id: &str) -> Result<T> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(SourceError::NoDocument)?;
	let element = document
		.get_element_by_id(id)
		.ok_or_else(|| SourceError::MissingElement(id.to_string()))?;
	let script: HtmlScriptElement = element
		.dyn_into()
		.map_err(|_| SourceError::NotAScript(id.to_string()))?;
	let text = script.text().map_err(|_| SourceError::NotAScript(id.to_string()))?;
	parse_json(id, &text)
}

/// A historical snapshot saved under a tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedGraphData {
	pub tag: String,
	/// Creation time in milliseconds since the epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time: Option<i64>,
	pub graph_data: GraphData,
}

/// The latest snapshot plus the tagged ones, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct TagStore {
	latest: GraphData,
	tagged: Vec<TaggedGraphData>,
}

impl TagStore {
	/// Later entries replace earlier ones with the same tag.
	pub fn new(latest: GraphData, tagged: impl IntoIterator<Item = TaggedGraphData>) -> Self {
		let mut store = Self {
			latest,
			tagged: Vec::new(),
		};
		for entry in tagged {
			store.insert(entry);
		}
		store
	}

	pub fn latest(&self) -> &GraphData {
		&self.latest
	}

	pub fn tags(&self) -> impl Iterator<Item = &str> {
		self.tagged.iter().map(|t| t.tag.as_str())
	}

	pub fn get(&self, tag: &str) -> Option<&TaggedGraphData> {
		self.tagged.iter().find(|t| t.tag == tag)
	}

	/// Adds a snapshot, returning the one it replaced.
	pub fn insert(&mut self, entry: TaggedGraphData) -> Option<TaggedGraphData> {
		match self.tagged.iter_mut().find(|t| t.tag == entry.tag) {
			Some(existing) => Some(std::mem::replace(existing, entry)),
			None => {
				self.tagged.push(entry);
				None
			}
		}
	}

	pub fn remove(&mut self, tag: &str) -> Option<TaggedGraphData> {
		let index = self.tagged.iter().position(|t| t.tag == tag)?;
		Some(self.tagged.remove(index))
	}

	/// Snapshot of a version: `latest` (any case) or a tag.
	pub fn resolve(&self, version: &str) -> Option<&GraphData> {
		if version.eq_ignore_ascii_case(LATEST_TAG) {
			Some(&self.latest)
		} else {
			self.get(version).map(|t| &t.graph_data)
		}
	}

	/// The newest tag by time; untimed tags count as oldest, ties go to the
	/// later insertion.
	pub fn most_recent_tag(&self) -> Option<&str> {
		self.tagged
			.iter()
			.enumerate()
			.max_by_key(|(i, t)| (t.time, *i))
			.map(|(_, t)| t.tag.as_str())
	}
}

/// Which versions to compare and how to show them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
	/// Version drawn on the left; its additions are green.
	pub newer: String,
	/// Version drawn on the right; `None` picks the most recent tag.
	pub older: Option<String>,
	/// Ring added and deleted nodes.
	pub show_difference: bool,
	/// Draw endpoint nodes, not just services.
	pub show_endpoints: bool,
	/// Services to isolate in the pair view.
	pub service_pair: Option<[String; 2]>,
	/// Theme name, see [`Theme::by_name`](crate::components::force_graph::Theme::by_name).
	pub theme: String,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			newer: LATEST_TAG.to_string(),
			older: None,
			show_difference: true,
			show_endpoints: true,
			service_pair: None,
			theme: "dark".to_string(),
		}
	}
}

impl ViewConfig {
	/// The older version to compare against, if one exists.
	pub fn older_version<'a>(&'a self, store: &'a TagStore) -> Option<&'a str> {
		self.older.as_deref().or_else(|| store.most_recent_tag())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::GraphNode;

	fn tagged(tag: &str, time: Option<i64>, service: &str) -> TaggedGraphData {
		TaggedGraphData {
			tag: tag.to_string(),
			time,
			graph_data: GraphData {
				nodes: vec![GraphNode::service(service, service)],
				links: Vec::new(),
			},
		}
	}

	#[test]
	fn parse_errors_name_the_element() {
		let err = parse_json::<GraphData>(LATEST_GRAPH_ELEMENT, "{ nodes: ").unwrap_err();
		assert!(matches!(err, SourceError::Parse { ref id, .. } if id == "latest-graph"));
		assert!(err.to_string().starts_with("failed to parse #latest-graph"));
	}

	#[test]
	fn parses_tagged_snapshots() {
		let raw = r#"[
			{ "_id": "65f0", "tag": "v1", "time": 1700000000000,
			  "graphData": { "nodes": [{ "id": "a", "group": "a", "name": "A" }], "links": [] } },
			{ "tag": "v2", "graphData": { "nodes": [], "links": [] } }
		]"#;
		let entries: Vec<TaggedGraphData> = parse_json(TAGGED_GRAPHS_ELEMENT, raw).unwrap();
		assert_eq!(entries[0].time, Some(1_700_000_000_000));
		assert_eq!(entries[0].graph_data.nodes.len(), 1);
		assert_eq!(entries[1].time, None);
	}

	#[test]
	fn store_insert_replace_remove() {
		let mut store = TagStore::new(GraphData::default(), [tagged("v1", Some(1), "a")]);
		assert!(store.insert(tagged("v2", Some(2), "b")).is_none());
		let replaced = store.insert(tagged("v1", Some(3), "c")).unwrap();
		assert_eq!(replaced.graph_data.nodes[0].id, "a");
		assert_eq!(store.tags().collect::<Vec<_>>(), vec!["v1", "v2"]);
		assert_eq!(store.get("v1").unwrap().time, Some(3));

		assert!(store.remove("v1").is_some());
		assert!(store.remove("v1").is_none());
		assert_eq!(store.tags().collect::<Vec<_>>(), vec!["v2"]);
	}

	#[test]
	fn resolves_latest_case_insensitively() {
		let latest = GraphData {
			nodes: vec![GraphNode::service("now", "now")],
			links: Vec::new(),
		};
		let store = TagStore::new(latest.clone(), [tagged("v1", None, "a")]);
		assert_eq!(store.latest(), &latest);
		assert_eq!(store.resolve("latest"), Some(&latest));
		assert_eq!(store.resolve("LaTeSt"), Some(&latest));
		assert_eq!(store.resolve("v1").unwrap().nodes[0].id, "a");
		assert!(store.resolve("v9").is_none());
	}

	#[test]
	fn most_recent_tag_prefers_time() {
		let store = TagStore::new(
			GraphData::default(),
			[tagged("b", Some(20), "x"), tagged("a", Some(10), "x"), tagged("c", None, "x")],
		);
		assert_eq!(store.most_recent_tag(), Some("b"));
		let untimed = TagStore::new(GraphData::default(), [tagged("a", None, "x"), tagged("b", None, "x")]);
		assert_eq!(untimed.most_recent_tag(), Some("b"));
		assert_eq!(TagStore::default().most_recent_tag(), None);
	}

	#[test]
	fn config_defaults() {
		let config: ViewConfig = parse_json(CONFIG_ELEMENT, r#"{ "servicePair": ["a", "b"] }"#).unwrap();
		assert_eq!(config.newer, "latest");
		assert!(config.show_difference && config.show_endpoints);
		assert_eq!(config.service_pair, Some(["a".to_string(), "b".to_string()]));
		assert_eq!(config.theme, "dark");

		let store = TagStore::new(GraphData::default(), [tagged("v1", None, "a")]);
		assert_eq!(config.older_version(&store), Some("v1"));
		let pinned = ViewConfig {
			older: Some("v0".into()),
			..ViewConfig::default()
		};
		assert_eq!(pinned.older_version(&store), Some("v0"));
	}
}
