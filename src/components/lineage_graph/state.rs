use std::collections::HashSet;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};

use super::graph::LineageGraph;
use super::highlight::{EdgeStyle, Highlight, NodeStyle};
use super::importance;
use super::layout::{self, LayoutToggles, NodeTarget};
use super::types::{LineageData, NodeKind};
use crate::config::GraphConfig;

/// Minimum pointer distance, in world space, that still hits a node.
pub const HIT_RADIUS: f64 = 8.0;
const MAX_TOOLTIP_COLUMNS: usize = 5;
/// Pointer travel, in pixels, that turns a press into a drag.
const DRAG_SLOP: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	/// Index into the [`LineageGraph`].
	pub model: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// A schema column as drawn behind the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaColumn {
	pub name: String,
	pub x: f64,
	pub tables: usize,
}

/// Everything the lineage view needs between events: the simulation, the
/// graph model, the frozen set of always-labelled nodes and the current
/// focus. Owned by the hosting component.
pub struct VisualizationContext {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	/// Progress of the current highlight fade, 0..=1.
	pub highlight_t: f64,
	model: LineageGraph,
	config: GraphConfig,
	top_nodes: HashSet<String>,
	resting_labels: Vec<f64>,
	highlight: Highlight,
	selected: Option<usize>,
	toggles: LayoutToggles,
	targets: Vec<NodeTarget>,
	radii: Vec<f64>,
	labels: Vec<String>,
	colors: Vec<String>,
}

impl VisualizationContext {
	pub fn new(data: &LineageData, config: GraphConfig, width: f64, height: f64) -> Self {
		let model = LineageGraph::new(data);
		let toggles = config.toggles;
		let targets = layout::targets(&model, toggles, width, height);
		let top_nodes = importance::select_top_nodes(&model);
		let resting_labels = importance::label_opacities(&model, &top_nodes, width, height);

		let mut graph = ForceGraph::new(config.simulation());
		let mut handles = Vec::with_capacity(model.len());
		for (i, target) in targets.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / model.len().max(1) as f64;
			handles.push(graph.add_node(NodeData {
				x: (target.x + 20.0 * angle.cos()) as f32,
				y: (target.y + 20.0 * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo { model: i },
			}));
		}
		for (_, edge) in model.edges() {
			if edge.source != edge.target {
				graph.add_edge(handles[edge.source], handles[edge.target], EdgeData::default());
			}
		}

		let labels = model.nodes().iter().map(importance::node_label).collect();
		let colors = model.nodes().iter().map(importance::node_color).collect();
		log::info!(
			"Lineage graph ready: {} nodes, {} edges, {} pinned labels",
			model.len(),
			model.edge_slots().len(),
			top_nodes.len()
		);

		let mut ctx = Self {
			graph,
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			animation_running: true,
			highlight_t: 0.0,
			model,
			config,
			top_nodes,
			resting_labels,
			highlight: Highlight::Idle,
			selected: None,
			toggles,
			targets,
			radii: Vec::new(),
			labels,
			colors,
		};
		ctx.radii = ctx.compute_radii();
		ctx
	}

	pub fn model(&self) -> &LineageGraph {
		&self.model
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Nodes that keep their label whatever the viewport; fixed at creation.
	pub fn top_nodes(&self) -> &HashSet<String> {
		&self.top_nodes
	}

	pub fn highlight(&self) -> &Highlight {
		&self.highlight
	}

	pub fn selected(&self) -> Option<usize> {
		self.selected
	}

	pub fn toggles(&self) -> LayoutToggles {
		self.toggles
	}

	pub fn targets(&self) -> &[NodeTarget] {
		&self.targets
	}

	pub fn radius(&self, idx: usize) -> f64 {
		self.radii[idx]
	}

	pub fn label(&self, idx: usize) -> &str {
		&self.labels[idx]
	}

	pub fn color(&self, idx: usize) -> &str {
		&self.colors[idx]
	}

	/// Label opacity with nothing focused, as of the last reset.
	pub fn resting_label(&self, idx: usize) -> f64 {
		self.resting_labels[idx]
	}

	fn compute_radii(&self) -> Vec<f64> {
		(0..self.model.len())
			.map(|i| importance::node_radius(&self.model, i, self.width, self.height))
			.collect()
	}

	pub fn focus(&mut self, idx: usize) -> bool {
		let previous = self.highlight.focused();
		if self.highlight.focused() == Some(idx) {
			return false;
		}
		if previous.is_some() {
			self.reset();
		}
		self.highlight.focus(&self.model, idx);
		self.highlight_t = 0.0;
		log::debug!("Focus {}", self.model.node(idx).id);
		true
	}

	/// Drops any focus and re-derives every resting label from the current
	/// viewport. The pinned top nodes are not re-ranked.
	pub fn reset(&mut self) {
		self.highlight.reset();
		self.highlight_t = 0.0;
		self.resting_labels =
			importance::label_opacities(&self.model, &self.top_nodes, self.width, self.height);
	}

	/// Pointer moved onto `node`, or off every node. Leaving falls back to
	/// the clicked selection, if there is one.
	pub fn set_hover(&mut self, node: Option<usize>) {
		match node {
			Some(idx) => {
				self.focus(idx);
			}
			None if self.highlight.is_idle() => {}
			None => {
				let selected = self.selected;
				if selected != self.highlight.focused() {
					self.reset();
				}
				if let Some(idx) = selected {
					self.focus(idx);
				}
			}
		}
	}

	/// Clicking a node selects it; clicking the selection again clears it.
	pub fn toggle_selection(&mut self, idx: usize) {
		if self.selected == Some(idx) {
			self.clear_selection();
		} else {
			self.selected = Some(idx);
			self.focus(idx);
		}
	}

	pub fn clear_selection(&mut self) {
		self.selected = None;
		self.reset();
	}

	fn eased_t(&self) -> f64 {
		let t = self.highlight_t.clamp(0.0, 1.0);
		1.0 - (1.0 - t).powi(3)
	}

	pub fn node_style(&self, idx: usize) -> NodeStyle {
		let resting = self.resting_labels[idx];
		let target = self.highlight.node_style(idx, resting);
		if self.highlight.is_idle() {
			return target;
		}
		NodeStyle::blend(&Highlight::Idle.node_style(idx, resting), &target, self.eased_t())
	}

	pub fn edge_style(&self, edge_idx: usize) -> Option<EdgeStyle> {
		let edge = self.model.edge_slots().get(edge_idx).copied().flatten()?;
		let kind = self.model.edge_kind(edge);
		let target = self.highlight.edge_style(edge_idx, kind);
		if self.highlight.is_idle() {
			return Some(target);
		}
		let idle = Highlight::Idle.edge_style(edge_idx, kind);
		Some(EdgeStyle::blend(&idle, &target, self.eased_t()))
	}

	pub fn set_toggles(&mut self, toggles: LayoutToggles) {
		if toggles == self.toggles {
			return;
		}
		log::info!(
			"Layout: schema grouping {}, connectivity {}, floating labels {}",
			toggles.schema_grouping,
			toggles.connectivity,
			toggles.floating_labels
		);
		self.toggles = toggles;
		self.targets = layout::targets(&self.model, toggles, self.width, self.height);
		self.animation_running = true;
	}

	pub fn set_schema_grouping(&mut self, on: bool) {
		self.set_toggles(LayoutToggles {
			schema_grouping: on,
			..self.toggles
		});
	}

	pub fn set_connectivity(&mut self, on: bool) {
		self.set_toggles(LayoutToggles {
			connectivity: on,
			..self.toggles
		});
	}

	pub fn set_floating_labels(&mut self, on: bool) {
		self.set_toggles(LayoutToggles {
			floating_labels: on,
			..self.toggles
		});
	}

	/// Schema columns to decorate, only while grouping more than one schema.
	pub fn schema_columns(&self) -> Vec<SchemaColumn> {
		let schemas = self.model.schemas();
		if !self.toggles.schema_grouping || schemas.len() < 2 {
			return Vec::new();
		}
		schemas
			.iter()
			.zip(layout::schema_columns(schemas.len(), self.width))
			.map(|(name, x)| SchemaColumn {
				name: name.clone(),
				x,
				tables: self.model.tables_in_schema(name).len(),
			})
			.collect()
	}

	pub fn schema_region_width(&self) -> f64 {
		let count = self.model.schemas().len().max(1) as f64;
		self.width * (0.9 / count).min(0.3)
	}

	/// Current simulation coordinates, indexed like the graph model.
	pub fn positions(&self) -> Vec<(f64, f64)> {
		let mut positions = vec![(0.0, 0.0); self.model.len()];
		self.graph.visit_nodes(|node| {
			positions[node.data.user_data.model] = (node.x() as f64, node.y() as f64);
		});
		positions
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let idx = node.data.user_data.model;
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < self.radii[idx].max(HIT_RADIUS) {
				found = Some(idx);
			}
		});
		found
	}

	fn handle_at_position(&self, sx: f64, sy: f64) -> Option<(DefaultNodeIdx, f32, f32)> {
		let idx = self.node_at_position(sx, sy)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.model == idx {
				found = Some((node.index(), node.x(), node.y()));
			}
		});
		found
	}

	/// Starts dragging the node under the pointer, or panning when there is
	/// none.
	pub fn press(&mut self, x: f64, y: f64) {
		if let Some((handle, nx, ny)) = self.handle_at_position(x, y) {
			self.drag = DragState {
				active: true,
				node_idx: Some(handle),
				moved: false,
				start_x: x,
				start_y: y,
				node_start_x: nx,
				node_start_y: ny,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			if !self.pan.active {
				self.set_hover(hovered);
			}
		}

		if self.drag.active {
			let Some(handle) = self.drag.node_idx else {
				return;
			};
			let (dx, dy) = (
				(x - self.drag.start_x) / self.transform.k,
				(y - self.drag.start_y) / self.transform.k,
			);
			if (dx * dx + dy * dy).sqrt() * self.transform.k > DRAG_SLOP {
				self.drag.moved = true;
			}
			if !self.drag.moved {
				return;
			}
			let (nx, ny) = (
				self.drag.node_start_x + dx as f32,
				self.drag.node_start_y + dy as f32,
			);
			self.graph.visit_nodes_mut(|node| {
				if node.index() == handle {
					node.data.x = nx;
					node.data.y = ny;
					node.data.is_anchor = true;
				}
			});
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Ends a press. Returns the node when the press was a click on it
	/// rather than a drag.
	pub fn release(&mut self) -> Option<usize> {
		let clicked = match (self.drag.active, self.drag.moved, self.drag.node_idx) {
			(true, false, Some(handle)) => {
				let mut model = None;
				self.graph.visit_nodes(|node| {
					if node.index() == handle {
						model = Some(node.data.user_data.model);
					}
				});
				model
			}
			_ => None,
		};
		if let Some(handle) = self.drag.node_idx.filter(|_| self.drag.active) {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == handle {
					node.data.is_anchor = false;
				}
			});
		}
		self.drag = DragState::default();
		self.pan.active = false;
		clicked
	}

	pub fn leave(&mut self) {
		self.release();
		self.set_hover(None);
	}

	/// Zooms by `factor` keeping the screen point (`sx`, `sy`) fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(self.config.min_zoom, self.config.max_zoom);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn zoom_in(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, self.config.zoom_step);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, 1.0 / self.config.zoom_step);
	}

	/// Centres the bounding box of all nodes and scales it to the viewport.
	pub fn zoom_to_fit(&mut self) {
		let positions = self.positions();
		if positions.is_empty() {
			return;
		}
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for (i, &(x, y)) in positions.iter().enumerate() {
			let r = self.radii[i];
			min_x = min_x.min(x - r);
			min_y = min_y.min(y - r);
			max_x = max_x.max(x + r);
			max_y = max_y.max(y + r);
		}
		let (bw, bh) = (max_x - min_x, max_y - min_y);
		let extent = (bw / self.width).max(bh / self.height);
		if !(extent > 0.0) || !extent.is_finite() {
			return;
		}
		let k = (self.config.fit_factor / extent).clamp(self.config.min_zoom, self.config.max_zoom);
		self.transform = ViewTransform {
			x: self.width / 2.0 - k * (min_x + bw / 2.0),
			y: self.height / 2.0 - k * (min_y + bh / 2.0),
			k,
		};
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.apply_targets(dt as f64);

		if !self.highlight.is_idle() {
			let duration = self.config.highlight_duration.max(f64::EPSILON);
			self.highlight_t = (self.highlight_t + dt as f64 / duration).min(1.0);
		}
	}

	/// Nudges every free node towards its layout target.
	fn apply_targets(&mut self, dt: f64) {
		let gain = (self.config.target_rate * dt).min(1.0);
		let targets = &self.targets;
		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			let Some(t) = targets.get(node.data.user_data.model) else {
				return;
			};
			let (mut x, mut y) = (node.data.x as f64, node.data.y as f64);
			x += (t.x - x) * t.x_strength * gain;
			y += (t.y - y) * t.y_strength * gain;
			if let Some(radial) = t.radial {
				let (dx, dy) = (x - radial.cx, y - radial.cy);
				let r = (dx * dx + dy * dy).sqrt();
				if r > 1e-6 {
					let k = (radial.radius - r) / r * radial.strength * gain;
					x += dx * k;
					y += dy * k;
				}
			}
			node.data.x = x as f32;
			node.data.y = y as f32;
		});
	}

	/// New viewport size. Layout targets follow immediately; resting labels
	/// catch up on the next reset.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.targets = layout::targets(&self.model, self.toggles, width, height);
		self.radii = self.compute_radii();
	}

	/// Tooltip text for node `idx`, header first.
	pub fn tooltip(&self, idx: usize) -> Vec<String> {
		let node = self.model.node(idx);
		match &node.kind {
			NodeKind::Table(t) => {
				let name = t.display_name.as_deref().unwrap_or(&node.id);
				let mut lines = vec![
					name.to_string(),
					format!("Schema: {}", t.schema),
					format!("Read queries: {}", t.read_queries),
					format!("Write queries: {}", t.write_queries),
					format!("Total queries: {}", t.total_queries),
				];
				for column in t.columns.iter().take(MAX_TOOLTIP_COLUMNS) {
					let pk = if column.is_primary_key { " (PK)" } else { "" };
					lines.push(format!("  {} {}{}", column.name, column.data_type, pk));
				}
				if t.columns.len() > MAX_TOOLTIP_COLUMNS {
					lines.push(format!(
						"  + {} more columns...",
						t.columns.len() - MAX_TOOLTIP_COLUMNS
					));
				}
				for (other, outgoing) in self.model.related_tables(idx) {
					let arrow = if outgoing { "→" } else { "←" };
					lines.push(format!("{} {} {}", name, arrow, other));
				}
				lines.push("Double-click for details".into());
				lines
			}
			NodeKind::Query(q) => vec![
				format!("Query {}", node.id),
				q.preview.clone(),
				format!("Total time: {:.2} ms", q.total_time),
				format!("Calls: {}", q.calls),
				format!("Rows: {}", q.rows),
				"Double-click for details".into(),
			],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lineage_graph::highlight::{DIMMED_NODE_OPACITY, NEIGHBOR_LABEL_OPACITY};
	use crate::components::lineage_graph::graph::tests::{query, table};
	use crate::components::lineage_graph::types::{Column, LineageLink};

	/// Twelve quiet queries around a handful of tables.
	fn sample() -> LineageData {
		let mut nodes = vec![
			table("orders", "public", 40),
			table("users", "public", 2),
			table("audit_log", "audit", 0),
		];
		let mut links = vec![LineageLink::new("orders", "audit_log")];
		for i in 0..12 {
			let id = format!("Query_{i}");
			links.push(LineageLink::new(&id, if i % 2 == 0 { "orders" } else { "users" }));
			nodes.push(query(&id, i as f64));
		}
		LineageData { nodes, links }
	}

	fn ctx() -> VisualizationContext {
		VisualizationContext::new(&sample(), GraphConfig::default(), 1000.0, 600.0)
	}

	fn labels(ctx: &VisualizationContext) -> Vec<f64> {
		(0..ctx.model().len()).map(|i| ctx.node_style(i).label_opacity).collect()
	}

	#[test]
	fn focus_hides_labels_outside_the_neighbourhood() {
		let mut ctx = ctx();
		assert!(ctx.focus(1));
		ctx.highlight_t = 1.0;

		// users is pinned, its queries are neighbours, everything else dims
		assert_eq!(ctx.node_style(3).label_opacity, 0.0);
		assert_eq!(ctx.node_style(3).opacity, DIMMED_NODE_OPACITY);
		assert_eq!(ctx.node_style(4).label_opacity, NEIGHBOR_LABEL_OPACITY);
		assert!(ctx.node_style(1).emphasized);
	}

	#[test]
	fn refocus_is_idempotent() {
		let mut ctx = ctx();
		ctx.focus(0);
		ctx.highlight_t = 1.0;
		let once = labels(&ctx);
		assert!(!ctx.focus(0));
		assert_eq!(ctx.highlight_t, 1.0);
		assert_eq!(labels(&ctx), once);
	}

	#[test]
	fn reset_restores_resting_policy_regardless_of_history() {
		let mut ctx = ctx();
		let resting = labels(&ctx);
		for idx in [0, 5, 2, 2, 9, 1] {
			ctx.focus(idx);
			ctx.tick(0.016);
		}
		ctx.toggle_selection(4);
		ctx.reset();
		assert!(ctx.highlight().is_idle());
		assert_eq!(labels(&ctx), resting);
	}

	#[test]
	fn reset_honours_the_current_viewport_but_keeps_top_nodes() {
		let mut ctx = ctx();
		let top = ctx.top_nodes().clone();
		// a tiny viewport pushes the threshold to its ceiling
		ctx.resize(10.0, 10.0);
		ctx.reset();
		assert_eq!(ctx.top_nodes(), &top);
		let threshold = importance::threshold(ctx.model().len(), 10.0, 10.0);
		assert_eq!(threshold, importance::MAX_THRESHOLD);
		for idx in 0..ctx.model().len() {
			let expected = importance::label_opacity(ctx.model(), idx, &top, threshold);
			assert_eq!(ctx.resting_label(idx), expected);
		}
	}

	#[test]
	fn hover_leave_returns_to_the_selection() {
		let mut ctx = ctx();
		ctx.toggle_selection(0);
		ctx.set_hover(Some(2));
		assert_eq!(ctx.highlight().focused(), Some(2));
		ctx.set_hover(None);
		assert_eq!(ctx.highlight().focused(), Some(0));

		ctx.toggle_selection(0);
		assert_eq!(ctx.selected(), None);
		assert!(ctx.highlight().is_idle());
		ctx.set_hover(Some(2));
		ctx.set_hover(None);
		assert!(ctx.highlight().is_idle());
	}

	#[test]
	fn toggles_rebuild_targets_reversibly() {
		let mut ctx = ctx();
		let top = ctx.top_nodes().clone();
		let before = ctx.targets().to_vec();
		ctx.set_schema_grouping(false);
		assert_ne!(ctx.targets(), before.as_slice());
		ctx.set_schema_grouping(true);
		assert_eq!(ctx.targets(), before.as_slice());

		ctx.set_connectivity(false);
		assert!(ctx.targets().iter().all(|t| t.radial.is_none()));
		ctx.set_floating_labels(false);
		assert!(!ctx.toggles().floating_labels);
		ctx.set_connectivity(true);
		ctx.set_schema_grouping(false);
		ctx.reset();
		assert_eq!(ctx.top_nodes(), &top);
	}

	#[test]
	fn schema_columns_only_when_grouping_several_schemas() {
		let mut ctx = ctx();
		let columns = ctx.schema_columns();
		assert_eq!(columns.len(), 2);
		assert_eq!(columns[0].name, "public");
		assert_eq!(columns[0].tables, 2);
		assert_eq!(columns[1].x, 800.0);
		assert_eq!(ctx.schema_region_width(), 300.0);

		ctx.set_schema_grouping(false);
		assert!(ctx.schema_columns().is_empty());
	}

	#[test]
	fn ticking_pulls_nodes_towards_targets() {
		let data = LineageData {
			nodes: vec![table("t", "public", 0), query("q_1", 0.0)],
			links: vec![],
		};
		let config = GraphConfig {
			force_charge: 0.0,
			force_spring: 0.0,
			toggles: LayoutToggles {
				schema_grouping: false,
				connectivity: false,
				floating_labels: false,
			},
			..Default::default()
		};
		let mut ctx = VisualizationContext::new(&data, config, 1000.0, 600.0);
		let distance = |ctx: &VisualizationContext| {
			let (x, _) = ctx.positions()[0];
			(x - ctx.targets()[0].x).abs()
		};
		let before = distance(&ctx);
		for _ in 0..30 {
			ctx.tick(0.016);
		}
		assert!(distance(&ctx) < before);
	}

	#[test]
	fn zoom_respects_the_scale_extent() {
		let mut ctx = ctx();
		for _ in 0..50 {
			ctx.zoom_in();
		}
		assert_eq!(ctx.transform.k, ctx.config().max_zoom);
		for _ in 0..50 {
			ctx.zoom_out();
		}
		assert_eq!(ctx.transform.k, ctx.config().min_zoom);
		ctx.zoom_to_fit();
		assert!(ctx.transform.k >= ctx.config().min_zoom);
		assert!(ctx.transform.k <= ctx.config().max_zoom);
	}

	#[test]
	fn tooltips_summarise_nodes() {
		let mut data = sample();
		if let NodeKind::Query(q) = &mut data.nodes[3].kind {
			q.calls = 2;
			q.preview = "SELECT 1".into();
		}
		if let NodeKind::Table(t) = &mut data.nodes[0].kind {
			t.columns = (0..7)
				.map(|i| Column {
					name: format!("c{i}"),
					data_type: "int".into(),
					is_primary_key: i == 0,
				})
				.collect();
		}
		let ctx = VisualizationContext::new(&data, GraphConfig::default(), 1000.0, 600.0);

		let table = ctx.tooltip(0);
		assert_eq!(table[0], "orders");
		assert!(table.contains(&"  c0 int (PK)".to_string()));
		assert!(table.contains(&"  + 2 more columns...".to_string()));
		assert!(table.contains(&"orders → audit_log".to_string()));

		let query = ctx.tooltip(3);
		assert_eq!(query[0], "Query Query_0");
		assert_eq!(query[2], "Total time: 0.00 ms");
		assert_eq!(query[3], "Calls: 2");
	}
}
