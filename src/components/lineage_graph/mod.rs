mod component;
pub mod graph;
pub mod highlight;
pub mod importance;
pub mod layout;
mod render;
mod state;
mod types;

pub use component::LineageGraphCanvas;
pub use layout::{LayoutPolicy, LayoutToggles};
pub use types::{
	Column, EndpointRef, GraphDataError, LineageData, LineageLink, LineageNode, NodeKind, QueryStats,
	TableStats,
};
