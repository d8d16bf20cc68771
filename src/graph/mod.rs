//! Dependency graph snapshots and the computations over them.
//!
//! Everything in this module is a pure function of its inputs: processing a
//! snapshot for display, comparing two snapshots, isolating a service pair
//! and turning the results into render directives.

pub mod diff;
pub mod directives;
pub mod model;
pub mod pairwise;
pub mod processor;

pub use diff::{
	EndpointChange, GraphDifferenceInfo, GroupedChanges, ServiceChangeGroup, ServicePairDiff,
	ServiceState, compare, group_changes,
};
pub use directives::{LinkDirective, NodeDirective, NodeShape, RenderDirectives};
pub use model::{
	DisplayNodeInfo, EXTERNAL_NODE_ID, GraphData, GraphLink, GraphNode, LinkId, LinkKind,
	NodeKind,
};
pub use pairwise::{Relationship, ServicePairGraph, pairwise};
pub use processor::{HighlightInfo, NodeAdjacency, ProcessedGraph, process};
