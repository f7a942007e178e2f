use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::VisualizationContext;

const BACKGROUND: &str = "#f8f7fa";
const LABEL_FONT_PX: f64 = 11.0;
const ARROW_SIZE: f64 = 7.0;

fn accent(alpha: f64) -> String {
	format!("rgba(115, 103, 240, {:.3})", alpha)
}

/// Rough text width for label backgrounds.
fn label_width(text: &str) -> f64 {
	text.chars().count() as f64 * 6.0
}

pub fn render(state: &VisualizationContext, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let positions = state.positions();
	draw_schema_regions(state, ctx);
	draw_edges(state, ctx, &positions);
	draw_nodes(state, ctx, &positions);
	ctx.restore();
	draw_schema_headers(state, ctx);
	draw_tooltip(state, ctx, &positions);
}

fn draw_schema_regions(state: &VisualizationContext, ctx: &CanvasRenderingContext2d) {
	let columns = state.schema_columns();
	if columns.is_empty() {
		return;
	}
	let region_width = state.schema_region_width();
	for (i, column) in columns.iter().enumerate() {
		ctx.set_fill_style_str(&accent(0.03 + (i % 2) as f64 * 0.03));
		ctx.begin_path();
		ctx.rect(
			column.x - region_width / 2.0,
			30.0,
			region_width,
			state.height - 60.0,
		);
		ctx.fill();
	}

	ctx.set_stroke_style_str(&accent(0.2));
	ctx.set_line_width(0.5);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(3.0),
		&JsValue::from_f64(3.0),
	));
	for pair in columns.windows(2) {
		let x = (pair[0].x + pair[1].x) / 2.0;
		ctx.begin_path();
		ctx.move_to(x, 50.0);
		ctx.line_to(x, state.height - 40.0);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_edges(state: &VisualizationContext, ctx: &CanvasRenderingContext2d, positions: &[(f64, f64)]) {
	for (i, edge) in state.model().edges() {
		let Some(style) = state.edge_style(i) else {
			continue;
		};
		let ((x1, y1), (x2, y2)) = (positions[edge.source], positions[edge.target]);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (r1, r2) = (state.radius(edge.source), state.radius(edge.target));
		let (ux, uy) = (dx / dist, dy / dist);

		ctx.set_global_alpha(style.opacity);
		ctx.set_stroke_style_str(style.color);
		ctx.set_line_width(style.width);
		if style.dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(5.0),
				&JsValue::from_f64(5.0),
			));
		}
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + ARROW_SIZE), y2 - uy * (r2 + ARROW_SIZE));
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(style.color);
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &VisualizationContext, ctx: &CanvasRenderingContext2d, positions: &[(f64, f64)]) {
	// Dimmed nodes first so the highlighted ones paint over them.
	let mut order: Vec<usize> = (0..positions.len()).collect();
	order.sort_by(|&a, &b| {
		state
			.node_style(a)
			.opacity
			.total_cmp(&state.node_style(b).opacity)
	});

	for idx in order {
		let (x, y) = positions[idx];
		let style = state.node_style(idx);
		let radius = state.radius(idx);
		let is_table = state.model().node(idx).is_table();

		if style.emphasized {
			let glow_radius = radius * 2.2;
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let _ = gradient.add_color_stop(0.0, "rgba(115, 103, 240, 0.35)");
				let _ = gradient.add_color_stop(1.0, "rgba(115, 103, 240, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.set_global_alpha(style.opacity);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.color(idx));
		ctx.fill();
		ctx.set_stroke_style_str("#ffffff");
		ctx.set_line_width(style.stroke_width);
		ctx.stroke();

		if style.label_opacity > 0.0 {
			let label = state.label(idx);
			let width = label_width(label);
			// tables label to the left, queries to the right
			let (box_x, text_x) = if is_table {
				(x - radius - width - 11.0, x - radius - 5.0 - width)
			} else {
				(x + radius + 2.0, x + radius + 5.0)
			};
			ctx.set_global_alpha(style.opacity * style.label_opacity);
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
			ctx.fill_rect(box_x, y - 10.0, width + 6.0, 20.0);
			ctx.set_fill_style_str("#333333");
			ctx.set_font(&format!("{}px sans-serif", LABEL_FONT_PX));
			let _ = ctx.fill_text(label, text_x, y + LABEL_FONT_PX * 0.35);
		}
	}
	ctx.set_global_alpha(1.0);
}

/// Schema names pinned to the top edge, following pan and zoom sideways.
fn draw_schema_headers(state: &VisualizationContext, ctx: &CanvasRenderingContext2d) {
	if !state.toggles().floating_labels {
		return;
	}
	let k = state.transform.k;
	for column in state.schema_columns() {
		let x = state.transform.x + column.x * k;
		ctx.set_fill_style_str("#ffffff");
		ctx.set_stroke_style_str(&accent(0.3));
		ctx.set_line_width(1.0);
		ctx.begin_path();
		ctx.rect(x - 50.0, 5.0, 100.0, 40.0);
		ctx.fill();
		ctx.stroke();

		ctx.set_fill_style_str("#7367F0");
		ctx.set_text_align("center");
		ctx.set_font("bold 12px sans-serif");
		let _ = ctx.fill_text(&column.name, x, 22.0);
		ctx.set_font("10px sans-serif");
		let plural = if column.tables == 1 { "" } else { "s" };
		let _ = ctx.fill_text(&format!("{} table{}", column.tables, plural), x, 38.0);
		ctx.set_text_align("start");
	}
}

fn draw_tooltip(state: &VisualizationContext, ctx: &CanvasRenderingContext2d, positions: &[(f64, f64)]) {
	let Some(idx) = state.highlight().focused() else {
		return;
	};
	let lines = state.tooltip(idx);
	let (gx, gy) = positions[idx];
	let (sx, sy) = (
		state.transform.x + gx * state.transform.k + 14.0,
		state.transform.y + gy * state.transform.k - 28.0,
	);
	let width = lines.iter().map(|l| label_width(l)).fold(0.0, f64::max) + 16.0;
	let height = lines.len() as f64 * 16.0 + 10.0;
	let x = sx.min(state.width - width - 4.0).max(4.0);
	let y = sy.min(state.height - height - 4.0).max(4.0);

	ctx.set_global_alpha(0.9);
	ctx.set_fill_style_str("#2f2b3d");
	ctx.begin_path();
	ctx.rect(x, y, width, height);
	ctx.fill();
	ctx.set_global_alpha(1.0);

	for (i, line) in lines.iter().enumerate() {
		let bold = i == 0;
		ctx.set_font(if bold { "bold 12px sans-serif" } else { "11px sans-serif" });
		ctx.set_fill_style_str("#ffffff");
		let _ = ctx.fill_text(line, x + 8.0, y + 18.0 + i as f64 * 16.0);
	}
}
