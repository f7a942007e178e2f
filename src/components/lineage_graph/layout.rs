//! Target positions fed to the simulation under each layout policy.

use serde::Deserialize;

use super::graph::LineageGraph;

const TABLE_COLUMN: f64 = 0.3;
const QUERY_COLUMN: f64 = 0.7;
const SCHEMA_SPAN_START: f64 = 0.2;
const SCHEMA_SPAN: f64 = 0.6;
/// Queries sit this far along the way from the centre to their schema.
const QUERY_SCHEMA_PULL: f64 = 0.7;

const RADIAL_MIN: f64 = 50.0;
const RADIAL_BASE: f64 = 300.0;
const RADIAL_STRENGTH: f64 = 0.1;

/// The three user switches. Each may flip at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutToggles {
	pub schema_grouping: bool,
	pub connectivity: bool,
	pub floating_labels: bool,
}

impl Default for LayoutToggles {
	fn default() -> Self {
		Self {
			schema_grouping: true,
			connectivity: true,
			floating_labels: true,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutPolicy {
	SchemaGrouped,
	SimpleSplit,
}

impl LayoutToggles {
	pub fn policy(&self) -> LayoutPolicy {
		if self.schema_grouping {
			LayoutPolicy::SchemaGrouped
		} else {
			LayoutPolicy::SimpleSplit
		}
	}
}

/// Pull towards a ring around the viewport centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialTarget {
	pub cx: f64,
	pub cy: f64,
	pub radius: f64,
	pub strength: f64,
}

/// Where one node wants to be and how hard it is pulled there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTarget {
	pub x: f64,
	pub x_strength: f64,
	pub y: f64,
	pub y_strength: f64,
	pub radial: Option<RadialTarget>,
}

/// Horizontal centre of each schema column, evenly spread over 20%-80% of
/// the width. A lone schema sits at 20%.
pub fn schema_columns(schema_count: usize, width: f64) -> Vec<f64> {
	let gaps = schema_count.saturating_sub(1).max(1) as f64;
	(0..schema_count)
		.map(|i| width * (SCHEMA_SPAN_START + (i as f64 / gaps) * SCHEMA_SPAN))
		.collect()
}

/// Ring radius for the connectivity pull: busier nodes sit closer in.
pub fn radial_radius(connections: u32) -> f64 {
	if connections == 0 {
		RADIAL_BASE
	} else {
		(RADIAL_BASE / (connections as f64).sqrt()).max(RADIAL_MIN)
	}
}

/// Target for every node, in graph order.
pub fn targets(
	graph: &LineageGraph,
	toggles: LayoutToggles,
	width: f64,
	height: f64,
) -> Vec<NodeTarget> {
	let columns = schema_columns(graph.schemas().len(), width);
	let column_of = |schema: Option<&str>| {
		schema
			.and_then(|s| graph.schemas().iter().position(|known| known == s))
			.map(|i| columns[i])
	};

	(0..graph.len())
		.map(|idx| {
			let node = graph.node(idx);
			let mut target = match toggles.policy() {
				LayoutPolicy::SchemaGrouped if node.is_table() => {
					let (slot, count) = graph.table_slot(idx).unwrap_or((0, 1));
					let gaps = count.saturating_sub(1).max(1) as f64;
					NodeTarget {
						x: column_of(node.schema()).unwrap_or(width / 2.0),
						x_strength: 0.9,
						y: height * (SCHEMA_SPAN_START + (slot as f64 / gaps) * SCHEMA_SPAN),
						y_strength: 0.7,
						radial: None,
					}
				}
				LayoutPolicy::SchemaGrouped => {
					let center = width / 2.0;
					let column = column_of(graph.most_connected_schema(idx)).unwrap_or(center);
					NodeTarget {
						x: column * QUERY_SCHEMA_PULL + center * (1.0 - QUERY_SCHEMA_PULL),
						x_strength: 0.4,
						y: height / 2.0,
						y_strength: 0.3,
						radial: None,
					}
				}
				LayoutPolicy::SimpleSplit => NodeTarget {
					x: width * if node.is_table() { TABLE_COLUMN } else { QUERY_COLUMN },
					x_strength: 0.1,
					y: height / 2.0,
					y_strength: 0.1,
					radial: None,
				},
			};
			if toggles.connectivity {
				target.radial = Some(RadialTarget {
					cx: width / 2.0,
					cy: height / 2.0,
					radius: radial_radius(graph.connection_count(idx)),
					strength: RADIAL_STRENGTH,
				});
			}
			target
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lineage_graph::graph::tests::{graph, query, table};

	const W: f64 = 1000.0;
	const H: f64 = 600.0;

	fn grouped_only() -> LayoutToggles {
		LayoutToggles {
			schema_grouping: true,
			connectivity: false,
			floating_labels: false,
		}
	}

	fn sample() -> LineageGraph {
		graph(
			vec![
				table("a", "public", 0),
				table("b", "public", 0),
				table("c", "public", 0),
				table("x", "sales", 0),
				query("q1", 0.0),
				query("q2", 0.0),
			],
			&[("q1", "x"), ("q1", "a"), ("x", "q1"), ("q2", "b")],
		)
	}

	#[test]
	fn schema_columns_span_the_middle() {
		assert_eq!(schema_columns(0, W), Vec::<f64>::new());
		assert_eq!(schema_columns(1, W), vec![200.0]);
		assert_eq!(schema_columns(2, W), vec![200.0, 800.0]);
		assert_eq!(schema_columns(3, W), vec![200.0, 500.0, 800.0]);
	}

	#[test]
	fn tables_stack_within_their_schema_column() {
		let g = sample();
		let t = targets(&g, grouped_only(), W, H);
		assert_eq!((t[0].x, t[0].y), (200.0, 120.0));
		assert_eq!((t[1].x, t[1].y), (200.0, 300.0));
		assert_eq!((t[2].x, t[2].y), (200.0, 480.0));
		// a lone table sits at the top of its column
		assert_eq!((t[3].x, t[3].y), (800.0, 120.0));
		assert_eq!(t[0].x_strength, 0.9);
		assert_eq!(t[0].y_strength, 0.7);
	}

	#[test]
	fn queries_lean_towards_their_busiest_schema() {
		let g = sample();
		let t = targets(&g, grouped_only(), W, H);
		// q1 touches sales twice, public once
		assert_eq!(t[4].x, 800.0 * 0.7 + 500.0 * 0.3);
		assert_eq!(t[5].x, 200.0 * 0.7 + 500.0 * 0.3);
		assert_eq!(t[4].y, 300.0);
		assert_eq!(t[4].x_strength, 0.4);
	}

	#[test]
	fn unconnected_queries_fall_back_to_the_first_schema() {
		let g = graph(vec![table("x", "sales", 0), table("a", "public", 0), query("q", 0.0)], &[]);
		let t = targets(&g, grouped_only(), W, H);
		assert_eq!(t[2].x, 200.0 * 0.7 + 500.0 * 0.3);

		let queries_only = graph(vec![query("q", 0.0)], &[]);
		let t = targets(&queries_only, grouped_only(), W, H);
		assert_eq!(t[0].x, 500.0);
	}

	#[test]
	fn simple_split_separates_tables_and_queries() {
		let g = sample();
		let toggles = LayoutToggles {
			schema_grouping: false,
			..grouped_only()
		};
		let t = targets(&g, toggles, W, H);
		assert_eq!((t[0].x, t[0].y), (300.0, 300.0));
		assert_eq!((t[4].x, t[4].y), (700.0, 300.0));
		assert_eq!(t[4].x_strength, 0.1);
	}

	#[test]
	fn connectivity_adds_a_radial_pull() {
		assert_eq!(radial_radius(0), 300.0);
		assert_eq!(radial_radius(1), 300.0);
		assert_eq!(radial_radius(4), 150.0);
		assert_eq!(radial_radius(100), 50.0);

		let g = sample();
		let t = targets(&g, LayoutToggles::default(), W, H);
		let radial = t[4].radial.expect("connectivity enabled");
		assert_eq!((radial.cx, radial.cy), (500.0, 300.0));
		assert_eq!(radial.radius, 300.0 / 3f64.sqrt());
		assert!(targets(&g, grouped_only(), W, H)[4].radial.is_none());
	}

	#[test]
	fn toggle_cycles_do_not_drift() {
		let g = sample();
		let mut toggles = LayoutToggles::default();
		let before = targets(&g, toggles, W, H);
		toggles.schema_grouping = false;
		assert_ne!(targets(&g, toggles, W, H), before);
		toggles.schema_grouping = true;
		assert_eq!(targets(&g, toggles, W, H), before);
	}
}
