use std::time::Duration;

use leptos::ev::{MouseEvent, SubmitEvent};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::connection::{
	ConnectMode, CredentialAction, DISCONNECT_PATH, Endpoint, FollowUp, Outcome, StatusLevel,
	StatusMessage, analyze_outcome, connect_outcome, connected_from_window, post_form,
};
use crate::credentials::{AutoConnect, CredentialCache, Credentials, LocalStorage};

type Status = RwSignal<Option<StatusMessage>>;

fn cache() -> Option<CredentialCache<LocalStorage>> {
	CredentialCache::browser()
		.map_err(|e| log::error!("Credential cache unavailable: {}", e))
		.ok()
}

fn follow(follow_up: FollowUp) {
	let Some(window) = web_sys::window() else {
		return;
	};
	match follow_up {
		FollowUp::Stay => {}
		FollowUp::Reload { delay_ms } => set_timeout(
			move || {
				let _ = window.location().reload();
			},
			Duration::from_millis(delay_ms),
		),
		FollowUp::Navigate { path, delay_ms } => set_timeout(
			move || {
				let _ = window.location().set_href(path);
			},
			Duration::from_millis(delay_ms),
		),
	}
}

fn apply(outcome: Outcome, submitted: Option<&Credentials>, status: Status) {
	match outcome.credentials {
		CredentialAction::Save => {
			if let (Some(credentials), Some(cache)) = (submitted, cache()) {
				if let Err(e) = cache.save(credentials) {
					log::error!("Error saving credentials: {}", e);
				}
			}
		}
		CredentialAction::Delete => {
			if let Some(cache) = cache() {
				cache.delete();
			}
		}
		CredentialAction::Keep => {}
	}
	status.set(Some(outcome.status));
	follow(outcome.follow_up);
}

fn connect(mode: ConnectMode, credentials: Credentials, status: Status) {
	spawn_local(async move {
		let result = post_form(Endpoint::Connect, &credentials.fields())
			.await
			.map_err(|e| e.to_string());
		apply(connect_outcome(mode, &result), Some(&credentials), status);
	});
}

fn status_view(status: Status) -> impl IntoView {
	move || {
		status
			.get()
			.map(|s| view! { <div class=s.level.class()>{s.text}</div> })
	}
}

/// Connection form, cached-credential handling and the analysis trigger.
#[component]
pub fn Connect() -> impl IntoView {
	let connected = connected_from_window();
	let status: Status = RwSignal::new(None);
	let analysis: Status = RwSignal::new(None);
	let analyzing = RwSignal::new(false);
	let saved = RwSignal::new(None::<String>);
	let form = RwSignal::new(Credentials {
		host: "localhost".into(),
		port: "5432".into(),
		..Default::default()
	});
	let remember = RwSignal::new(true);
	let limit = RwSignal::new("20".to_string());
	let min_calls = RwSignal::new("5".to_string());

	if let Some(cache) = cache() {
		match cache.plan_auto_connect(connected) {
			AutoConnect::Connect(credentials) => {
				log::info!("Auto-connecting as {}", credentials.summary());
				status.set(Some(StatusMessage::new(
					StatusLevel::Info,
					"Auto-connecting using saved credentials...",
				)));
				connect(ConnectMode::Auto, credentials, status);
			}
			AutoConnect::OfferSaved => {
				if let Some(credentials) = cache.load() {
					saved.set(Some(format!(
						"{} (expires in ~{} hours)",
						credentials.summary(),
						cache.hours_until_expiration()
					)));
				}
			}
			AutoConnect::AlreadyConnected | AutoConnect::Nothing => {}
		}
	}

	let use_saved = move |_: MouseEvent| {
		saved.set(None);
		let Some(cache) = cache() else {
			return;
		};
		cache.set_manual_disconnect(false);
		match cache.load() {
			Some(credentials) => {
				status.set(Some(StatusMessage::new(
					StatusLevel::Info,
					"Connecting with saved credentials...",
				)));
				connect(ConnectMode::Saved, credentials, status);
			}
			None => status.set(Some(StatusMessage::new(
				StatusLevel::Danger,
				"Stored credentials not found or expired",
			))),
		}
	};

	let clear_saved = move |_: MouseEvent| {
		if let Some(cache) = cache() {
			cache.delete();
		}
		saved.set(None);
		status.set(Some(StatusMessage::new(
			StatusLevel::Success,
			"Stored credentials deleted",
		)));
		set_timeout(move || status.set(None), Duration::from_millis(2000));
	};

	let on_connect = move |ev: SubmitEvent| {
		ev.prevent_default();
		if let Some(cache) = cache() {
			cache.set_manual_disconnect(false);
		}
		status.set(Some(StatusMessage::new(
			StatusLevel::Info,
			"Connecting to database...",
		)));
		let mode = ConnectMode::Manual {
			remember: remember.get_untracked(),
		};
		connect(mode, form.get_untracked(), status);
	};

	let on_analyze = move |ev: SubmitEvent| {
		ev.prevent_default();
		analyzing.set(true);
		analysis.set(Some(StatusMessage::new(
			StatusLevel::Info,
			"Running analysis... This may take a few moments.",
		)));
		let (limit, min_calls) = (limit.get_untracked(), min_calls.get_untracked());
		spawn_local(async move {
			let fields = [("limit", limit.as_str()), ("min_calls", min_calls.as_str())];
			let result = post_form(Endpoint::Analyze, &fields)
				.await
				.map_err(|e| e.to_string());
			analyzing.set(false);
			apply(analyze_outcome(&result), None, analysis);
		});
	};

	let on_disconnect = move |_: MouseEvent| {
		if let Some(cache) = cache() {
			cache.set_manual_disconnect(true);
		}
	};

	view! {
		<div class="connect-page">
			<h1>"PostgreSQL Data Lineage"</h1>

			<section class="connection">
				<h2>"Database connection"</h2>
				{move || {
					saved
						.get()
						.map(|summary| {
							view! {
								<div class="alert alert-info">
									"Disconnected. Saved credentials available: "
									{summary}
									<button on:click=use_saved>"Use Saved Credentials"</button>
									<button on:click=clear_saved>"Clear"</button>
								</div>
							}
						})
				}}
				{status_view(status)}
				{if connected {
					view! {
						<div class="connected">
							"Connected. "
							<a href=DISCONNECT_PATH on:click=on_disconnect>"Disconnect"</a>
						</div>
					}
						.into_any()
				} else {
					view! {
						<form on:submit=on_connect>
							<input
								type="text"
								placeholder="Host"
								prop:value=move || form.get().host
								on:input=move |ev| form.update(|f| f.host = event_target_value(&ev))
							/>
							<input
								type="text"
								placeholder="Port"
								prop:value=move || form.get().port
								on:input=move |ev| form.update(|f| f.port = event_target_value(&ev))
							/>
							<input
								type="text"
								placeholder="Database"
								prop:value=move || form.get().database
								on:input=move |ev| form.update(|f| f.database = event_target_value(&ev))
							/>
							<input
								type="text"
								placeholder="User"
								prop:value=move || form.get().user
								on:input=move |ev| form.update(|f| f.user = event_target_value(&ev))
							/>
							<input
								type="password"
								placeholder="Password"
								prop:value=move || form.get().password
								on:input=move |ev| form.update(|f| f.password = event_target_value(&ev))
							/>
							<label>
								<input
									type="checkbox"
									prop:checked=move || remember.get()
									on:change=move |ev| remember.set(event_target_checked(&ev))
								/>
								" Remember credentials (obfuscated, expires in 24 hours)"
							</label>
							<button type="submit">"Connect"</button>
						</form>
					}
						.into_any()
				}}
			</section>

			<section class="analysis">
				<h2>"Lineage analysis"</h2>
				<form on:submit=on_analyze>
					<label>
						"Top queries "
						<input
							type="number"
							prop:value=move || limit.get()
							on:input=move |ev| limit.set(event_target_value(&ev))
						/>
					</label>
					<label>
						"Minimum calls "
						<input
							type="number"
							prop:value=move || min_calls.get()
							on:input=move |ev| min_calls.set(event_target_value(&ev))
						/>
					</label>
					<button type="submit" disabled=move || !connected || analyzing.get()>
						"Analyze"
					</button>
				</form>
				{status_view(analysis)}
			</section>
		</div>
	}
}
