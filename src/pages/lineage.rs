use leptos::prelude::*;

use crate::components::lineage_graph::{LineageData, LineageGraphCanvas};
use crate::config::GraphConfig;

/// Lineage view over the graph the server injected into the page.
#[component]
pub fn Lineage() -> impl IntoView {
	let data = match LineageData::from_window() {
		Ok(data) => data,
		Err(e) => {
			log::error!("{}", e);
			return view! {
				<div class="lineage-page">
					<div class="alert alert-danger">{e.to_string()}</div>
				</div>
			}
			.into_any();
		}
	};
	log::info!(
		"Loaded lineage graph: {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	let graph_data = Signal::derive(move || data.clone());

	view! {
		<div class="lineage-page">
			<h1>"Data Lineage"</h1>
			<p class="subtitle">
				"Hover a node to trace its connections, click to pin it, double-click for details."
			</p>
			<div class="lineage-graph-container">
				<LineageGraphCanvas data=graph_data config=GraphConfig::from_window() />
			</div>
		</div>
	}
	.into_any()
}
