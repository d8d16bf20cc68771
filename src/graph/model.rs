//! Dependency graph snapshot model.
//!
//! A snapshot is a flat list of nodes (services, endpoints and the synthetic
//! external-systems node) plus the directed call links between them. Links are
//! identified by their `(source, target)` pair, never by position.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel id of the node standing in for systems outside the monitored mesh.
pub const EXTERNAL_NODE_ID: &str = "null";

/// What a node represents, derived from its `id`/`group` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// A deployed service as a whole (`id == group`).
	Service,
	/// One API operation owned by the service named in `group`.
	Endpoint,
	/// The external-systems sentinel.
	External,
}

impl NodeKind {
	/// Short badge drawn inside the node.
	pub fn badge(self) -> &'static str {
		match self {
			NodeKind::Service => "SRV",
			NodeKind::Endpoint => "EP",
			NodeKind::External => "EX",
		}
	}
}

/// Distinguishes real call edges from layout-only helpers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
	/// An observed call between two nodes.
	#[default]
	Call,
	/// Invisible edge that only keeps two nodes close in the force layout.
	LayoutAnchor,
}

impl LinkKind {
	/// `true` for real call edges.
	pub fn is_call(&self) -> bool {
		matches!(self, LinkKind::Call)
	}
}

/// A directed edge between two node ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Calling node id.
	pub source: String,
	/// Called node id.
	pub target: String,
	/// Omitted from JSON for ordinary calls.
	#[serde(default, skip_serializing_if = "LinkKind::is_call")]
	pub kind: LinkKind,
}

impl GraphLink {
	/// A regular call link.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind: LinkKind::Call,
		}
	}

	/// A layout anchor between two nodes; never a real dependency.
	pub fn anchor(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			kind: LinkKind::LayoutAnchor,
			..Self::new(source, target)
		}
	}

	/// Canonical identity of this link.
	pub fn id(&self) -> LinkId {
		LinkId::new(&self.source, &self.target)
	}

	pub fn is_anchor(&self) -> bool {
		self.kind == LinkKind::LayoutAnchor
	}

	/// Whether this link connects `source` to `target` exactly.
	pub fn connects(&self, source: &str, target: &str) -> bool {
		self.source == source && self.target == target
	}
}

/// Canonical link identity: `"{source}==>{target}"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
	const SEPARATOR: &'static str = "==>";

	pub fn new(source: &str, target: &str) -> Self {
		Self(format!("{source}{}{target}", Self::SEPARATOR))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Splits the identity back into `(source, target)`.
	pub fn endpoints(&self) -> Option<(&str, &str)> {
		self.0.split_once(Self::SEPARATOR)
	}
}

impl fmt::Display for LinkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A service, endpoint or external node of a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Unique within one snapshot.
	pub id: String,
	/// Owning service id; equal to `id` for services and the external node.
	pub group: String,
	/// Display label.
	pub name: String,
	/// Ids of the nodes this node calls, in call order.
	#[serde(default)]
	pub dependencies: Vec<String>,
	/// Links whose source is this node.
	#[serde(default)]
	pub link_in_between: Vec<GraphLink>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>, group: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			group: group.into(),
			name: name.into(),
			dependencies: Vec::new(),
			link_in_between: Vec::new(),
		}
	}

	/// A service node, grouped under itself.
	pub fn service(id: impl Into<String>, name: impl Into<String>) -> Self {
		let id = id.into();
		Self::new(id.clone(), id, name)
	}

	/// Single discriminator for service / endpoint / external nodes.
	pub fn kind(&self) -> NodeKind {
		if self.id == EXTERNAL_NODE_ID {
			NodeKind::External
		} else if self.id == self.group {
			NodeKind::Service
		} else {
			NodeKind::Endpoint
		}
	}

	pub fn is_service(&self) -> bool {
		self.kind() == NodeKind::Service
	}
}

/// A complete snapshot: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	/// The link with exactly this source and target, if any.
	pub fn link(&self, source: &str, target: &str) -> Option<&GraphLink> {
		self.links.iter().find(|l| l.connects(source, target))
	}

	/// Service node ids in enumeration order, external sentinel excluded.
	pub fn service_ids(&self) -> impl Iterator<Item = &str> {
		self.nodes
			.iter()
			.filter(|n| n.is_service())
			.map(|n| n.id.as_str())
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}

	/// Copy with endpoint nodes and every link touching them removed.
	pub fn without_endpoints(&self) -> GraphData {
		let nodes: Vec<GraphNode> = self
			.nodes
			.iter()
			.filter(|n| n.kind() != NodeKind::Endpoint)
			.cloned()
			.collect();
		let kept = |id: &str| nodes.iter().any(|n| n.id == id);
		let links: Vec<GraphLink> = self
			.links
			.iter()
			.filter(|l| kept(&l.source) && kept(&l.target))
			.cloned()
			.collect();
		let nodes = nodes
			.iter()
			.map(|n| GraphNode {
				dependencies: n.dependencies.iter().filter(|d| kept(d)).cloned().collect(),
				link_in_between: n
					.link_in_between
					.iter()
					.filter(|l| kept(&l.target))
					.cloned()
					.collect(),
				..n.clone()
			})
			.collect();
		GraphData { nodes, links }
	}
}

/// Details of a clicked node, parsed from its tab-separated id.
///
/// Ids have the form `service\tnamespace\tversion\tmethod\tlabel`; services
/// carry only the first three parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayNodeInfo {
	pub kind: NodeKind,
	pub name: String,
	pub service: Option<String>,
	pub namespace: Option<String>,
	pub version: Option<String>,
	pub method: Option<String>,
	pub label_name: Option<String>,
	/// `service\tnamespace\tversion`, when the id has all three parts.
	pub unique_service_name: Option<String>,
}

impl DisplayNodeInfo {
	pub fn from_node(node: &GraphNode) -> Self {
		let mut parts = node.id.split('\t').map(str::to_string);
		let service = parts.next().filter(|s| !s.is_empty());
		let namespace = parts.next();
		let version = parts.next();
		let unique_service_name = match (&service, &namespace, &version) {
			(Some(s), Some(n), Some(v)) => Some(format!("{s}\t{n}\t{v}")),
			_ => None,
		};
		Self {
			kind: node.kind(),
			name: node.name.clone(),
			method: parts.next(),
			label_name: parts.next(),
			service,
			namespace,
			version,
			unique_service_name,
		}
	}
}
