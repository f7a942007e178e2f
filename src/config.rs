//! Tunables for the lineage view.

use force_graph::SimulationParameters;
use serde::Deserialize;

use crate::components::lineage_graph::LayoutToggles;

/// Everything the lineage canvas can be tuned with. Every field has a
/// default, so a partial JSON object is a valid override.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	/// How quickly nodes close on their layout targets, per second.
	pub target_rate: f64,
	/// Canvas height in pixels; the width follows the container.
	pub height: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub zoom_step: f64,
	/// Zoom-to-fit overshoot; above 1 crops the outermost nodes.
	pub fit_factor: f64,
	/// Seconds for the highlight fade.
	pub highlight_duration: f64,
	pub toggles: LayoutToggles,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			force_charge: 200.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			target_rate: 6.0,
			height: 600.0,
			min_zoom: 0.1,
			max_zoom: 4.0,
			zoom_step: 1.3,
			fit_factor: 1.5,
			highlight_duration: 0.3,
			toggles: LayoutToggles::default(),
		}
	}
}

impl GraphConfig {
	pub fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}

	/// Reads overrides from `window.lineageConfig`, falling back to the
	/// defaults when it is absent or unreadable.
	pub fn from_window() -> Self {
		let Some(window) = web_sys::window() else {
			return Self::default();
		};
		let value = match js_sys::Reflect::get(&window, &"lineageConfig".into()) {
			Ok(v) if !v.is_undefined() && !v.is_null() => v,
			_ => return Self::default(),
		};
		let json = js_sys::JSON::stringify(&value)
			.ok()
			.and_then(|s| s.as_string())
			.unwrap_or_default();
		serde_json::from_str(&json).unwrap_or_else(|e| {
			log::warn!("Ignoring lineageConfig: {}", e);
			Self::default()
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_overrides_keep_remaining_defaults() {
		let config: GraphConfig =
			serde_json::from_str(r#"{"height": 800, "toggles": {"connectivity": false}}"#).unwrap();
		assert_eq!(config.height, 800.0);
		assert!(!config.toggles.connectivity);
		assert!(config.toggles.schema_grouping);
		assert_eq!(config.max_zoom, GraphConfig::default().max_zoom);
	}
}
