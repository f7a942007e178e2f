//! Node importance and the label visibility policy built on it.
//!
//! Importance blends a node's own activity (query time for queries, query
//! count for tables) with how connected it is. Each term is a log ratio
//! against a reference value. Terms are not saturated, so activity well past
//! the reference keeps ranking higher.

use std::collections::HashSet;

use super::graph::LineageGraph;
use super::types::{LineageNode, NodeKind};

/// Cumulative query time (ms) at which the time term reaches 1.
const QUERY_TIME_REFERENCE: f64 = 10_000.0;
/// Query count at which the table activity term reaches 1.
const TABLE_QUERIES_REFERENCE: f64 = 50.0;
/// Connection count at which the connectivity term reaches 1.
const CONNECTIONS_REFERENCE: f64 = 20.0;

/// Share of the graph, in percent, that keeps a permanent label.
const TOP_N_PERCENT: usize = 15;
const TOP_N_MIN: usize = 5;
const TOP_N_MAX: usize = 20;

pub const MIN_THRESHOLD: f64 = 0.3;
pub const MAX_THRESHOLD: f64 = 0.7;

pub const TOP_LABEL_OPACITY: f64 = 1.0;
pub const IMPORTANT_LABEL_OPACITY: f64 = 0.9;

const TABLE_COLOR: &str = "#28C76F";
const QUERY_COLOR_CHEAP: (u8, u8, u8) = (0x00, 0xCF, 0xE8);
const QUERY_COLOR_EXPENSIVE: (u8, u8, u8) = (0xEA, 0x54, 0x55);

/// `ln(value + 1) / ln(reference)`, zero for non-positive values.
fn log_ratio(value: f64, reference: f64) -> f64 {
	if value.is_nan() || value <= 0.0 {
		return 0.0;
	}
	value.ln_1p() / reference.ln()
}

/// Visual importance of a node given its connection count.
pub fn score(node: &LineageNode, connections: u32) -> f64 {
	let conn = log_ratio(connections as f64, CONNECTIONS_REFERENCE);
	match &node.kind {
		NodeKind::Query(q) => 0.7 * log_ratio(q.total_time, QUERY_TIME_REFERENCE) + 0.3 * conn,
		NodeKind::Table(t) => {
			0.5 * conn + 0.5 * log_ratio(t.total_queries as f64, TABLE_QUERIES_REFERENCE)
		}
	}
}

/// Importance of node `idx` in `graph`.
pub fn node_score(graph: &LineageGraph, idx: usize) -> f64 {
	score(graph.node(idx), graph.connection_count(idx))
}

/// Label cutoff derived from node density (nodes per million square pixels).
/// Denser views raise the bar.
pub fn threshold(total_nodes: usize, width: f64, height: f64) -> f64 {
	let area = width * height;
	if !(area > 0.0) {
		return MAX_THRESHOLD;
	}
	let density = total_nodes as f64 / area * 1_000_000.0;
	(density / 15.0).clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}

/// How many nodes keep a label no matter what.
pub fn top_n_count(total_nodes: usize) -> usize {
	(total_nodes * TOP_N_PERCENT)
		.div_ceil(100)
		.clamp(TOP_N_MIN, TOP_N_MAX)
}

/// Ids of the most important nodes, highest score first. Equal scores keep
/// input order.
pub fn select_top_nodes(graph: &LineageGraph) -> HashSet<String> {
	let mut scored: Vec<(usize, f64)> = (0..graph.len())
		.map(|idx| (idx, node_score(graph, idx)))
		.collect();
	scored.sort_by(|a, b| b.1.total_cmp(&a.1));
	scored
		.into_iter()
		.take(top_n_count(graph.len()))
		.map(|(idx, _)| graph.node(idx).id.clone())
		.collect()
}

/// Resting label opacity for node `idx`: always shown when among the top
/// nodes, shown when above `threshold`, otherwise hidden.
pub fn label_opacity(
	graph: &LineageGraph,
	idx: usize,
	top_nodes: &HashSet<String>,
	threshold: f64,
) -> f64 {
	if top_nodes.contains(&graph.node(idx).id) {
		TOP_LABEL_OPACITY
	} else if node_score(graph, idx) > threshold {
		IMPORTANT_LABEL_OPACITY
	} else {
		0.0
	}
}

/// Baseline label opacity for every node at the given viewport size.
pub fn label_opacities(
	graph: &LineageGraph,
	top_nodes: &HashSet<String>,
	width: f64,
	height: f64,
) -> Vec<f64> {
	let cutoff = threshold(graph.len(), width, height);
	(0..graph.len())
		.map(|idx| label_opacity(graph, idx, top_nodes, cutoff))
		.collect()
}

/// Radius grows with importance; larger viewports scale everything up.
pub fn node_radius(graph: &LineageGraph, idx: usize, width: f64, height: f64) -> f64 {
	let size_factor = (width.min(height) / 1000.0).max(1.0);
	let (min, max) = match graph.node(idx).kind {
		NodeKind::Query(_) => (4.0, 18.0),
		NodeKind::Table(_) => (5.0, 16.0),
	};
	size_factor * (min + node_score(graph, idx) * (max - min))
}

/// Tables share one colour; queries shift from cool to hot as their total
/// time approaches ten seconds.
pub fn node_color(node: &LineageNode) -> String {
	match &node.kind {
		NodeKind::Table(_) => TABLE_COLOR.to_string(),
		NodeKind::Query(q) => {
			let t = (q.total_time / QUERY_TIME_REFERENCE).clamp(0.0, 1.0);
			let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
			let (c, e) = (QUERY_COLOR_CHEAP, QUERY_COLOR_EXPENSIVE);
			format!("rgb({}, {}, {})", lerp(c.0, e.0), lerp(c.1, e.1), lerp(c.2, e.2))
		}
	}
}

pub fn node_label(node: &LineageNode) -> String {
	match &node.kind {
		NodeKind::Table(t) => t.display_name.clone().unwrap_or_else(|| node.id.clone()),
		NodeKind::Query(_) => node.id.split('_').next().unwrap_or_default().to_string(),
	}
}
