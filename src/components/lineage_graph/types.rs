use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Failure to obtain a usable lineage graph from the page.
#[derive(Debug, Error)]
pub enum GraphDataError {
	#[error("Lineage data not available")]
	Missing,
	#[error("Lineage data is malformed: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// Treats an explicit JSON `null` the same as an absent field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_schema() -> String {
	"public".into()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Column {
	pub name: String,
	#[serde(rename = "type", default, deserialize_with = "null_default")]
	pub data_type: String,
	#[serde(default, deserialize_with = "null_default")]
	pub is_primary_key: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TableStats {
	#[serde(default = "default_schema")]
	pub schema: String,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default, deserialize_with = "null_default")]
	pub total_queries: u64,
	#[serde(default, deserialize_with = "null_default")]
	pub read_queries: u64,
	#[serde(default, deserialize_with = "null_default")]
	pub write_queries: u64,
	#[serde(default, deserialize_with = "null_default")]
	pub columns: Vec<Column>,
}

impl Default for TableStats {
	fn default() -> Self {
		Self {
			schema: default_schema(),
			display_name: None,
			total_queries: 0,
			read_queries: 0,
			write_queries: 0,
			columns: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct QueryStats {
	/// Cumulative execution time in milliseconds.
	#[serde(default, deserialize_with = "null_default")]
	pub total_time: f64,
	#[serde(default, deserialize_with = "null_default")]
	pub calls: u64,
	#[serde(default, deserialize_with = "null_default")]
	pub rows: u64,
	#[serde(default, deserialize_with = "null_default")]
	pub preview: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
	Table(TableStats),
	Query(QueryStats),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LineageNode {
	pub id: String,
	#[serde(flatten)]
	pub kind: NodeKind,
}

impl LineageNode {
	pub fn table(id: impl Into<String>, stats: TableStats) -> Self {
		Self {
			id: id.into(),
			kind: NodeKind::Table(stats),
		}
	}

	pub fn query(id: impl Into<String>, stats: QueryStats) -> Self {
		Self {
			id: id.into(),
			kind: NodeKind::Query(stats),
		}
	}

	pub fn is_table(&self) -> bool {
		matches!(self.kind, NodeKind::Table(_))
	}

	/// Schema for tables; queries carry none.
	pub fn schema(&self) -> Option<&str> {
		match &self.kind {
			NodeKind::Table(t) => Some(t.schema.as_str()),
			NodeKind::Query(_) => None,
		}
	}
}

/// An edge endpoint, either a bare id or a node object that already
/// carries one (as left behind by a simulation that resolved the link).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EndpointRef {
	Id(String),
	Node { id: String },
}

impl EndpointRef {
	pub fn id(&self) -> &str {
		match self {
			Self::Id(id) | Self::Node { id } => id,
		}
	}
}

impl From<&str> for EndpointRef {
	fn from(id: &str) -> Self {
		Self::Id(id.to_string())
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LineageLink {
	pub source: EndpointRef,
	pub target: EndpointRef,
}

impl LineageLink {
	pub fn new(source: &str, target: &str) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

/// The lineage graph as handed over by the page.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LineageData {
	pub nodes: Vec<LineageNode>,
	#[serde(alias = "edges")]
	pub links: Vec<LineageLink>,
}

impl LineageData {
	pub fn from_json(json: &str) -> Result<Self, GraphDataError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Reads `window.lineageData`, as injected by the server-rendered page.
	pub fn from_window() -> Result<Self, GraphDataError> {
		let window = web_sys::window().ok_or(GraphDataError::Missing)?;
		let value = js_sys::Reflect::get(&window, &"lineageData".into())
			.map_err(|_| GraphDataError::Missing)?;
		if value.is_undefined() || value.is_null() {
			return Err(GraphDataError::Missing);
		}
		let json = js_sys::JSON::stringify(&value)
			.ok()
			.and_then(|s| s.as_string())
			.ok_or(GraphDataError::Missing)?;
		Self::from_json(&json)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_tables_and_queries() {
		let data = LineageData::from_json(
			r#"{
				"nodes": [
					{"id": "orders", "type": "table", "schema": "sales", "total_queries": 40,
					 "columns": [{"name": "id", "type": "integer", "is_primary_key": true}]},
					{"id": "Query_12", "type": "query", "total_time": 500.5, "calls": 3,
					 "rows": 10, "preview": "SELECT * FROM orders"}
				],
				"links": [{"source": "Query_12", "target": "orders"}]
			}"#,
		)
		.unwrap();

		assert_eq!(data.nodes.len(), 2);
		let NodeKind::Table(t) = &data.nodes[0].kind else {
			panic!("expected table");
		};
		assert_eq!(t.schema, "sales");
		assert_eq!(t.total_queries, 40);
		assert!(t.columns[0].is_primary_key);
		let NodeKind::Query(q) = &data.nodes[1].kind else {
			panic!("expected query");
		};
		assert_eq!(q.total_time, 500.5);
		assert_eq!(data.links[0].source.id(), "Query_12");
	}

	#[test]
	fn absent_and_null_stats_default_to_zero() {
		let data = LineageData::from_json(
			r#"{"nodes": [
				{"id": "t", "type": "table", "total_queries": null},
				{"id": "q", "type": "query", "total_time": null}
			], "links": []}"#,
		)
		.unwrap();

		assert_eq!(data.nodes[0].schema(), Some("public"));
		assert_eq!(data.nodes[0].kind, NodeKind::Table(TableStats::default()));
		assert_eq!(data.nodes[1].kind, NodeKind::Query(QueryStats::default()));
	}

	#[test]
	fn accepts_edges_alias_and_resolved_endpoints() {
		let data = LineageData::from_json(
			r#"{"nodes": [{"id": "a", "type": "table"}, {"id": "b", "type": "query"}],
				"edges": [{"source": {"id": "b", "x": 1.0}, "target": "a"}]}"#,
		)
		.unwrap();

		assert_eq!(data.links, vec![LineageLink::new("b", "a")]);
	}

	#[test]
	fn missing_collections_are_rejected() {
		assert!(matches!(
			LineageData::from_json(r#"{"nodes": []}"#),
			Err(GraphDataError::Malformed(_))
		));
		assert!(matches!(
			LineageData::from_json(r#"{"links": []}"#),
			Err(GraphDataError::Malformed(_))
		));
	}
}
