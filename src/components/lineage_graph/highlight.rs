//! Focus highlighting as an explicit state machine.
//!
//! [`Highlight`] records *what* is focused; [`Highlight::node_style`] and
//! [`Highlight::edge_style`] turn that into paint. Transitions are
//! synchronous and leave no residue, so the styles depend on the current
//! state alone.

use std::collections::HashSet;

use super::graph::{EdgeKind, LineageGraph};

pub const DIMMED_NODE_OPACITY: f64 = 0.2;
pub const DIMMED_EDGE_OPACITY: f64 = 0.1;
pub const RESTING_EDGE_OPACITY: f64 = 0.6;
pub const FOCUS_LABEL_OPACITY: f64 = 1.0;
pub const NEIGHBOR_LABEL_OPACITY: f64 = 0.9;

const ACCENT_COLOR: &str = "#7367F0";
const QUERY_EDGE_COLOR: &str = "#a8a8a8";
const TABLE_EDGE_COLOR: &str = "#28C76F";

const RESTING_STROKE: f64 = 1.5;
const FOCUS_STROKE: f64 = 3.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Highlight {
	#[default]
	Idle,
	Focused {
		node: usize,
		neighbors: HashSet<usize>,
		/// Indices into the graph's edge slots.
		edges: HashSet<usize>,
	},
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub opacity: f64,
	pub label_opacity: f64,
	pub stroke_width: f64,
	/// Glow and enlarged outline around the focused node.
	pub emphasized: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub opacity: f64,
	pub color: &'static str,
	pub width: f64,
	pub dashed: bool,
}

impl NodeStyle {
	/// Interpolates every numeric channel; `emphasized` follows `to`.
	pub fn blend(from: &Self, to: &Self, t: f64) -> Self {
		Self {
			opacity: lerp(from.opacity, to.opacity, t),
			label_opacity: lerp(from.label_opacity, to.label_opacity, t),
			stroke_width: lerp(from.stroke_width, to.stroke_width, t),
			emphasized: to.emphasized,
		}
	}
}

impl EdgeStyle {
	fn resting(kind: EdgeKind) -> Self {
		match kind {
			EdgeKind::Query => Self {
				opacity: RESTING_EDGE_OPACITY,
				color: QUERY_EDGE_COLOR,
				width: 1.5,
				dashed: false,
			},
			EdgeKind::TableToTable => Self {
				opacity: RESTING_EDGE_OPACITY,
				color: TABLE_EDGE_COLOR,
				width: 2.0,
				dashed: true,
			},
		}
	}

	/// Interpolates opacity and width; colour and dash follow `to`.
	pub fn blend(from: &Self, to: &Self, t: f64) -> Self {
		Self {
			opacity: lerp(from.opacity, to.opacity, t),
			width: lerp(from.width, to.width, t),
			..*to
		}
	}
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
	if t >= 1.0 { b } else { a + (b - a) * t }
}

impl Highlight {
	/// Focuses `idx`. Returns `false` when `idx` was already focused, in
	/// which case nothing changes. Any other focus is dropped first.
	pub fn focus(&mut self, graph: &LineageGraph, idx: usize) -> bool {
		if self.focused() == Some(idx) {
			return false;
		}
		self.reset();
		*self = Self::Focused {
			node: idx,
			neighbors: graph.direct_neighbors(idx),
			edges: graph.incident_edges(idx),
		};
		true
	}

	/// Returns to `Idle`. Returns `false` when already idle.
	pub fn reset(&mut self) -> bool {
		!matches!(std::mem::take(self), Self::Idle)
	}

	pub fn focused(&self) -> Option<usize> {
		match self {
			Self::Idle => None,
			Self::Focused { node, .. } => Some(*node),
		}
	}

	pub fn is_idle(&self) -> bool {
		matches!(self, Self::Idle)
	}

	/// Paint for node `idx`. `resting_label` is the label opacity the label
	/// policy assigns when nothing is focused.
	pub fn node_style(&self, idx: usize, resting_label: f64) -> NodeStyle {
		match self {
			Self::Idle => NodeStyle {
				opacity: 1.0,
				label_opacity: resting_label,
				stroke_width: RESTING_STROKE,
				emphasized: false,
			},
			Self::Focused { node, .. } if *node == idx => NodeStyle {
				opacity: 1.0,
				label_opacity: FOCUS_LABEL_OPACITY,
				stroke_width: FOCUS_STROKE,
				emphasized: true,
			},
			Self::Focused { neighbors, .. } if neighbors.contains(&idx) => NodeStyle {
				opacity: 1.0,
				label_opacity: NEIGHBOR_LABEL_OPACITY,
				stroke_width: RESTING_STROKE,
				emphasized: false,
			},
			Self::Focused { .. } => NodeStyle {
				opacity: DIMMED_NODE_OPACITY,
				label_opacity: 0.0,
				stroke_width: RESTING_STROKE,
				emphasized: false,
			},
		}
	}

	/// Paint for edge slot `edge_idx` of kind `kind`.
	pub fn edge_style(&self, edge_idx: usize, kind: EdgeKind) -> EdgeStyle {
		let resting = EdgeStyle::resting(kind);
		match self {
			Self::Idle => resting,
			Self::Focused { edges, .. } if edges.contains(&edge_idx) => EdgeStyle {
				opacity: 1.0,
				color: ACCENT_COLOR,
				width: 2.5,
				..resting
			},
			Self::Focused { .. } => EdgeStyle {
				opacity: DIMMED_EDGE_OPACITY,
				..resting
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lineage_graph::graph::tests::{graph, query, table};

	fn sample() -> LineageGraph {
		// q1 reads a, writes b; q2 reads c; a feeds b directly
		graph(
			vec![
				table("a", "public", 10),
				table("b", "public", 5),
				table("c", "sales", 1),
				query("q1", 100.0),
				query("q2", 5.0),
			],
			&[("a", "q1"), ("q1", "b"), ("c", "q2"), ("a", "b")],
		)
	}

	#[test]
	fn focus_dims_everything_outside_the_neighbourhood() {
		let g = sample();
		let mut h = Highlight::default();
		assert!(h.focus(&g, 3));

		let focus = h.node_style(3, 0.0);
		assert_eq!(focus.opacity, 1.0);
		assert_eq!(focus.label_opacity, FOCUS_LABEL_OPACITY);
		assert!(focus.emphasized);

		for neighbor in [0, 1] {
			let style = h.node_style(neighbor, 0.0);
			assert_eq!(style.opacity, 1.0);
			assert_eq!(style.label_opacity, NEIGHBOR_LABEL_OPACITY);
			assert!(!style.emphasized);
		}

		for other in [2, 4] {
			// even a label the resting policy would show stays hidden
			let style = h.node_style(other, 1.0);
			assert_eq!(style.opacity, DIMMED_NODE_OPACITY);
			assert_eq!(style.label_opacity, 0.0);
		}
	}

	#[test]
	fn focus_accents_incident_edges_only() {
		let g = sample();
		let mut h = Highlight::default();
		h.focus(&g, 0);

		let q_edge = h.edge_style(0, EdgeKind::Query);
		assert_eq!(q_edge.opacity, 1.0);
		assert_eq!(q_edge.color, ACCENT_COLOR);

		let table_edge = h.edge_style(3, EdgeKind::TableToTable);
		assert_eq!(table_edge.color, ACCENT_COLOR);
		assert!(table_edge.dashed);

		let untouched = h.edge_style(2, EdgeKind::Query);
		assert_eq!(untouched.opacity, DIMMED_EDGE_OPACITY);
		assert_eq!(untouched.color, QUERY_EDGE_COLOR);
	}

	#[test]
	fn refocusing_the_same_node_is_a_no_op() {
		let g = sample();
		let mut h = Highlight::default();
		assert!(h.focus(&g, 3));
		let once = h.clone();
		assert!(!h.focus(&g, 3));
		assert_eq!(h, once);
	}

	#[test]
	fn switching_focus_does_not_stack() {
		let g = sample();
		let mut h = Highlight::default();
		h.focus(&g, 3);
		h.focus(&g, 4);

		let mut fresh = Highlight::default();
		fresh.focus(&g, 4);
		assert_eq!(h, fresh);
		// q1's neighbours are no longer lit
		assert_eq!(h.node_style(0, 0.0).opacity, DIMMED_NODE_OPACITY);
	}

	#[test]
	fn reset_restores_resting_styles() {
		let g = sample();
		let mut h = Highlight::default();
		assert!(!h.reset());
		h.focus(&g, 2);
		assert!(h.reset());
		assert!(h.is_idle());

		let style = h.node_style(4, 0.9);
		assert_eq!(style.opacity, 1.0);
		assert_eq!(style.label_opacity, 0.9);
		assert_eq!(h.edge_style(1, EdgeKind::Query).opacity, RESTING_EDGE_OPACITY);
	}

	#[test]
	fn blending_moves_between_styles() {
		let idle = Highlight::Idle.node_style(0, 0.0);
		let dimmed = NodeStyle {
			opacity: DIMMED_NODE_OPACITY,
			label_opacity: 0.0,
			stroke_width: RESTING_STROKE,
			emphasized: false,
		};
		assert_eq!(NodeStyle::blend(&idle, &dimmed, 0.0).opacity, 1.0);
		assert_eq!(NodeStyle::blend(&idle, &dimmed, 1.0), dimmed);
		assert!((NodeStyle::blend(&idle, &dimmed, 0.5).opacity - 0.6).abs() < 1e-9);
	}
}
