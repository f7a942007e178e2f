use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::VisualizationContext;
use super::types::LineageData;
use crate::config::GraphConfig;

type SharedState = Rc<RefCell<Option<VisualizationContext>>>;

fn with_state(state: &SharedState, f: impl FnOnce(&mut VisualizationContext)) {
	if let Some(ref mut s) = *state.borrow_mut() {
		f(s);
	}
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn container_width(canvas: &HtmlCanvasElement) -> f64 {
	canvas
		.parent_element()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(800.0)
}

#[component]
pub fn LineageGraphCanvas(
	#[prop(into)] data: Signal<LineageData>,
	#[prop(optional)] config: GraphConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	let toggles = config.toggles;
	let height = config.height;

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let w = container_width(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(height as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				log::error!("Canvas 2D context unavailable");
				return;
			}
		};
		let mut context = VisualizationContext::new(&data.get(), config.clone(), w, height);
		context.zoom_to_fit();
		*state_init.borrow_mut() = Some(context);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let nw = container_width(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			with_state(&state_resize, |s| s.resize(nw, height));
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			with_state(&state_md, |s| s.press(x, y));
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			with_state(&state_mm, |s| s.pointer_move(x, y));
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		with_state(&state_mu, |s| {
			if let Some(idx) = s.release() {
				s.toggle_selection(idx);
			}
		});
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&state_ml, |s| s.leave());
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let mut target = None;
		with_state(&state_dc, |s| {
			target = s
				.node_at_position(x, y)
				.and_then(|idx| s.model().detail_path(idx));
		});
		if let (Some(path), Some(window)) = (target, web_sys::window()) {
			log::info!("Opening {}", path);
			let _ = window.location().set_href(&path);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			with_state(&state_wh, |s| s.zoom_at(x, y, factor));
		}
	};

	let state_sg = state.clone();
	let on_schema_grouping = move |ev: Event| {
		let on = event_target_checked(&ev);
		with_state(&state_sg, |s| s.set_schema_grouping(on));
	};
	let state_cl = state.clone();
	let on_connectivity = move |ev: Event| {
		let on = event_target_checked(&ev);
		with_state(&state_cl, |s| s.set_connectivity(on));
	};
	let state_fl = state.clone();
	let on_floating_labels = move |ev: Event| {
		let on = event_target_checked(&ev);
		with_state(&state_fl, |s| s.set_floating_labels(on));
	};

	let (state_zi, state_zo, state_zf, state_rs) =
		(state.clone(), state.clone(), state.clone(), state.clone());

	view! {
		<div class="lineage-controls">
			<label>
				<input type="checkbox" prop:checked=toggles.schema_grouping on:change=on_schema_grouping />
				" Group by schema"
			</label>
			<label>
				<input type="checkbox" prop:checked=toggles.connectivity on:change=on_connectivity />
				" Connectivity layout"
			</label>
			<label>
				<input type="checkbox" prop:checked=toggles.floating_labels on:change=on_floating_labels />
				" Floating schema labels"
			</label>
			<button on:click=move |_| with_state(&state_zi, |s| s.zoom_in())>"+"</button>
			<button on:click=move |_| with_state(&state_zo, |s| s.zoom_out())>"-"</button>
			<button on:click=move |_| with_state(&state_zf, |s| s.zoom_to_fit())>"Fit"</button>
			<button on:click=move |_| with_state(&state_rs, |s| s.clear_selection())>"Reset selection"</button>
		</div>
		<canvas
			node_ref=canvas_ref
			class="lineage-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
