use std::collections::{HashMap, HashSet};

use super::types::{LineageData, LineageNode, NodeKind};

/// An edge whose endpoints both resolved to known nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedEdge {
	pub source: usize,
	pub target: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
	/// Direct table-to-table lineage.
	TableToTable,
	/// Any edge with a query on either end.
	Query,
}

/// Indexed view of [`LineageData`]. Built once; only the simulation moves
/// things afterwards, and it does not live here.
#[derive(Clone, Debug, Default)]
pub struct LineageGraph {
	nodes: Vec<LineageNode>,
	index_by_id: HashMap<String, usize>,
	/// One slot per input link, `None` when an endpoint did not resolve.
	edges: Vec<Option<ResolvedEdge>>,
	connection_counts: Vec<u32>,
	schemas: Vec<String>,
	tables_by_schema: HashMap<String, Vec<usize>>,
}

impl LineageGraph {
	pub fn new(data: &LineageData) -> Self {
		let nodes = data.nodes.clone();
		let mut index_by_id = HashMap::with_capacity(nodes.len());
		for (i, node) in nodes.iter().enumerate() {
			index_by_id.entry(node.id.clone()).or_insert(i);
		}

		let mut connection_counts = vec![0; nodes.len()];
		let edges = data
			.links
			.iter()
			.map(|link| {
				let source = index_by_id.get(link.source.id()).copied();
				let target = index_by_id.get(link.target.id()).copied();
				match (source, target) {
					(Some(source), Some(target)) => {
						connection_counts[source] += 1;
						connection_counts[target] += 1;
						Some(ResolvedEdge { source, target })
					}
					_ => {
						log::debug!(
							"Edge {} -> {} has an unknown endpoint; ignoring",
							link.source.id(),
							link.target.id()
						);
						None
					}
				}
			})
			.collect();

		let mut schemas = Vec::new();
		let mut tables_by_schema: HashMap<String, Vec<usize>> = HashMap::new();
		for (i, node) in nodes.iter().enumerate() {
			if let Some(schema) = node.schema() {
				if !tables_by_schema.contains_key(schema) {
					schemas.push(schema.to_string());
				}
				tables_by_schema.entry(schema.to_string()).or_default().push(i);
			}
		}

		Self {
			nodes,
			index_by_id,
			edges,
			connection_counts,
			schemas,
			tables_by_schema,
		}
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn nodes(&self) -> &[LineageNode] {
		&self.nodes
	}

	pub fn node(&self, idx: usize) -> &LineageNode {
		&self.nodes[idx]
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index_by_id.get(id).copied()
	}

	pub fn connection_count(&self, idx: usize) -> u32 {
		self.connection_counts[idx]
	}

	/// Every input link in order; unresolved links are `None`.
	pub fn edge_slots(&self) -> &[Option<ResolvedEdge>] {
		&self.edges
	}

	pub fn edges(&self) -> impl Iterator<Item = (usize, ResolvedEdge)> + '_ {
		self.edges
			.iter()
			.enumerate()
			.filter_map(|(i, e)| e.map(|e| (i, e)))
	}

	pub fn edge_kind(&self, edge: ResolvedEdge) -> EdgeKind {
		if self.nodes[edge.source].is_table() && self.nodes[edge.target].is_table() {
			EdgeKind::TableToTable
		} else {
			EdgeKind::Query
		}
	}

	/// Nodes sharing an edge with `idx` in either direction. Scans the whole
	/// edge list on every call.
	pub fn direct_neighbors(&self, idx: usize) -> HashSet<usize> {
		let mut neighbors = HashSet::new();
		for (_, edge) in self.edges() {
			if edge.source == idx {
				neighbors.insert(edge.target);
			} else if edge.target == idx {
				neighbors.insert(edge.source);
			}
		}
		neighbors
	}

	/// Indices of edges touching `idx`.
	pub fn incident_edges(&self, idx: usize) -> HashSet<usize> {
		self.edges()
			.filter(|(_, e)| e.source == idx || e.target == idx)
			.map(|(i, _)| i)
			.collect()
	}

	/// Distinct table schemas in order of first appearance.
	pub fn schemas(&self) -> &[String] {
		&self.schemas
	}

	pub fn tables_in_schema(&self, schema: &str) -> &[usize] {
		self.tables_by_schema
			.get(schema)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Position of table `idx` within its schema and the schema's table count.
	pub fn table_slot(&self, idx: usize) -> Option<(usize, usize)> {
		let tables = self.tables_in_schema(self.nodes[idx].schema()?);
		let pos = tables.iter().position(|&t| t == idx)?;
		Some((pos, tables.len()))
	}

	/// The schema whose tables `idx` touches most often. Ties keep the
	/// earlier schema; no table neighbours at all falls back to the first
	/// discovered schema.
	pub fn most_connected_schema(&self, idx: usize) -> Option<&str> {
		let mut counts = vec![0usize; self.schemas.len()];
		for (_, edge) in self.edges() {
			let other = if edge.source == idx {
				edge.target
			} else if edge.target == idx {
				edge.source
			} else {
				continue;
			};
			if let Some(schema) = self.nodes[other].schema() {
				if let Some(pos) = self.schemas.iter().position(|s| s == schema) {
					counts[pos] += 1;
				}
			}
		}

		let mut best = 0;
		let mut max = 0;
		for (i, &count) in counts.iter().enumerate() {
			if count > max {
				max = count;
				best = i;
			}
		}
		self.schemas.get(best).map(String::as_str)
	}

	/// Tables linked to table `idx` by a direct table-to-table edge, paired
	/// with `true` when the edge points away from `idx`.
	pub fn related_tables(&self, idx: usize) -> Vec<(&str, bool)> {
		if !self.nodes[idx].is_table() {
			return Vec::new();
		}
		self.edges()
			.filter(|(_, e)| self.edge_kind(*e) == EdgeKind::TableToTable)
			.filter_map(|(_, e)| {
				if e.source == idx && e.target != idx {
					Some((self.nodes[e.target].id.as_str(), true))
				} else if e.target == idx && e.source != idx {
					Some((self.nodes[e.source].id.as_str(), false))
				} else {
					None
				}
			})
			.collect()
	}

	/// Page holding the full details of a node. Queries are addressed by
	/// their position among query nodes.
	pub fn detail_path(&self, idx: usize) -> Option<String> {
		let node = self.nodes.get(idx)?;
		match node.kind {
			NodeKind::Table(_) => Some(format!("/table_details/{}", node.id)),
			NodeKind::Query(_) => {
				let position = self.nodes[..idx].iter().filter(|n| !n.is_table()).count();
				Some(format!("/query_details/{}", position))
			}
		}
	}
}
