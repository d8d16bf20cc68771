//! Force-directed graph visualization component.
//!
//! Renders an interactive force-directed dependency graph on an HTML canvas:
//! - Physics-based node positioning via force simulation
//! - Services drawn as hexagons, endpoints and external systems as circles
//! - Difference rings and colored links driven by [`RenderDirectives`]
//! - Hover and click highlighting, pan, zoom and node dragging
//!
//! # Example
//!
//! ```ignore
//! use topology_diff::graph::{process, RenderDirectives};
//! use topology_diff::ForceGraphCanvas;
//!
//! let processed = process(snapshot);
//! view! {
//!     <ForceGraphCanvas
//!         data=Signal::stored(processed)
//!         directives=Signal::stored(RenderDirectives::plain())
//!     />
//! }
//! ```
//!
//! [`RenderDirectives`]: crate::graph::RenderDirectives

mod component;
mod particles;
mod render;
mod scale;
mod state;
pub mod theme;

pub use component::ForceGraphCanvas;
pub use theme::{Color, Theme};
