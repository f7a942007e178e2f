//! Talking to the backend's `/connect` and `/analyze` form endpoints.
//!
//! Requests go out through `reqwest`'s browser client; what the page does with the
//! answer is decided by the pure `*_outcome` functions so it can be tested
//! without a browser.

use serde::Deserialize;
use thiserror::Error;

pub const LINEAGE_PATH: &str = "/lineage";
pub const DISCONNECT_PATH: &str = "/disconnect";

const MANUAL_RELOAD_MS: u64 = 1500;
const AUTO_RELOAD_MS: u64 = 1000;
const REDIRECT_MS: u64 = 1500;

/// Body of every form endpoint reply.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ActionResponse {
	pub success: bool,
	#[serde(default)]
	pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
	Connect,
	Analyze,
}

impl Endpoint {
	pub fn path(self) -> &'static str {
		match self {
			Self::Connect => "/connect",
			Self::Analyze => "/analyze",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
	Info,
	Secondary,
	Success,
	Warning,
	Danger,
}

impl StatusLevel {
	pub fn class(self) -> &'static str {
		match self {
			Self::Info => "alert alert-info",
			Self::Secondary => "alert alert-secondary",
			Self::Success => "alert alert-success",
			Self::Warning => "alert alert-warning",
			Self::Danger => "alert alert-danger",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
	pub level: StatusLevel,
	pub text: String,
}

impl StatusMessage {
	pub fn new(level: StatusLevel, text: impl Into<String>) -> Self {
		Self {
			level,
			text: text.into(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectMode {
	/// Submitted from the form; `remember` is the checkbox state.
	Manual { remember: bool },
	/// Replayed from the credential cache on page load.
	Auto,
	/// The user chose the cached credentials after a manual disconnect.
	Saved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialAction {
	Keep,
	Save,
	Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUp {
	Stay,
	Reload { delay_ms: u64 },
	Navigate { path: &'static str, delay_ms: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
	pub status: StatusMessage,
	pub credentials: CredentialAction,
	pub follow_up: FollowUp,
}

pub fn connect_outcome(mode: ConnectMode, result: &Result<ActionResponse, String>) -> Outcome {
	use StatusLevel::*;
	match (mode, result) {
		(ConnectMode::Manual { remember }, Ok(r)) if r.success => Outcome {
			status: StatusMessage::new(Success, &r.message),
			credentials: if remember {
				CredentialAction::Save
			} else {
				CredentialAction::Keep
			},
			follow_up: FollowUp::Reload {
				delay_ms: MANUAL_RELOAD_MS,
			},
		},
		(ConnectMode::Auto | ConnectMode::Saved, Ok(r)) if r.success => Outcome {
			status: StatusMessage::new(Success, &r.message),
			credentials: CredentialAction::Keep,
			follow_up: FollowUp::Reload {
				delay_ms: AUTO_RELOAD_MS,
			},
		},
		(ConnectMode::Manual { .. } | ConnectMode::Saved, Ok(r)) => Outcome {
			status: StatusMessage::new(Danger, &r.message),
			credentials: CredentialAction::Keep,
			follow_up: FollowUp::Stay,
		},
		(ConnectMode::Auto, Ok(r)) => Outcome {
			status: StatusMessage::new(Warning, format!("Auto-connect failed: {}", r.message)),
			credentials: CredentialAction::Delete,
			follow_up: FollowUp::Stay,
		},
		(ConnectMode::Manual { .. } | ConnectMode::Saved, Err(e)) => Outcome {
			status: StatusMessage::new(Danger, format!("Error: {}", e)),
			credentials: CredentialAction::Keep,
			follow_up: FollowUp::Stay,
		},
		(ConnectMode::Auto, Err(e)) => Outcome {
			status: StatusMessage::new(Danger, format!("Auto-connect error: {}", e)),
			credentials: CredentialAction::Delete,
			follow_up: FollowUp::Stay,
		},
	}
}

pub fn analyze_outcome(result: &Result<ActionResponse, String>) -> Outcome {
	let (status, follow_up) = match result {
		Ok(r) if r.success => (
			StatusMessage::new(StatusLevel::Success, &r.message),
			FollowUp::Navigate {
				path: LINEAGE_PATH,
				delay_ms: REDIRECT_MS,
			},
		),
		Ok(r) => (StatusMessage::new(StatusLevel::Danger, &r.message), FollowUp::Stay),
		Err(e) => (
			StatusMessage::new(StatusLevel::Danger, format!("Error: {}", e)),
			FollowUp::Stay,
		),
	};
	Outcome {
		status,
		credentials: CredentialAction::Keep,
		follow_up,
	}
}

/// `window.lineageConnected`, set by the host page when a session exists.
pub fn connected_from_window() -> bool {
	web_sys::window()
		.and_then(|w| js_sys::Reflect::get(&w, &"lineageConnected".into()).ok())
		.and_then(|v| v.as_bool())
		.unwrap_or(false)
}

#[derive(Debug, Error)]
pub enum RequestError {
	#[error("{0}")]
	Http(#[from] reqwest::Error),
	#[error("unexpected reply: {0}")]
	Reply(#[from] serde_json::Error),
	#[error("page origin unavailable")]
	NoOrigin,
}

/// Absolute URL of `endpoint` on the page's own origin.
fn endpoint_url(endpoint: Endpoint) -> Result<String, RequestError> {
	let origin = web_sys::window()
		.and_then(|w| w.location().origin().ok())
		.ok_or(RequestError::NoOrigin)?;
	Ok(format!("{}{}", origin.trim_end_matches('/'), endpoint.path()))
}

/// POSTs `fields` as a form and parses the JSON reply.
pub async fn post_form(
	endpoint: Endpoint,
	fields: &[(&str, &str)],
) -> Result<ActionResponse, RequestError> {
	let url = endpoint_url(endpoint)?;
	let response = reqwest::Client::new().post(&url).form(fields).send().await?;
	let body = response.text().await?;
	let reply = serde_json::from_str(&body).inspect_err(|e| {
		log::warn!("{} replied with something other than JSON: {}", endpoint.path(), e);
	})?;
	Ok(reply)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn reply(success: bool, message: &str) -> Result<ActionResponse, String> {
		Ok(ActionResponse {
			success,
			message: message.into(),
		})
	}

	#[test]
	fn manual_connect_saves_only_when_remembered() {
		let remembered = connect_outcome(ConnectMode::Manual { remember: true }, &reply(true, "Connected"));
		assert_eq!(remembered.status, StatusMessage::new(StatusLevel::Success, "Connected"));
		assert_eq!(remembered.credentials, CredentialAction::Save);
		assert_eq!(remembered.follow_up, FollowUp::Reload { delay_ms: 1500 });

		let forgotten = connect_outcome(ConnectMode::Manual { remember: false }, &reply(true, "Connected"));
		assert_eq!(forgotten.credentials, CredentialAction::Keep);
	}

	#[test]
	fn manual_connect_failures_surface_the_reason() {
		let refused = connect_outcome(ConnectMode::Manual { remember: true }, &reply(false, "bad password"));
		assert_eq!(refused.status, StatusMessage::new(StatusLevel::Danger, "bad password"));
		assert_eq!(refused.credentials, CredentialAction::Keep);
		assert_eq!(refused.follow_up, FollowUp::Stay);

		let offline = connect_outcome(ConnectMode::Manual { remember: true }, &Err("Failed to fetch".into()));
		assert_eq!(offline.status.text, "Error: Failed to fetch");
	}

	#[test]
	fn failed_auto_connect_drops_the_cached_credentials() {
		let refused = connect_outcome(ConnectMode::Auto, &reply(false, "expired"));
		assert_eq!(refused.status, StatusMessage::new(StatusLevel::Warning, "Auto-connect failed: expired"));
		assert_eq!(refused.credentials, CredentialAction::Delete);

		let offline = connect_outcome(ConnectMode::Auto, &Err("timeout".into()));
		assert_eq!(offline.status, StatusMessage::new(StatusLevel::Danger, "Auto-connect error: timeout"));
		assert_eq!(offline.credentials, CredentialAction::Delete);

		let ok = connect_outcome(ConnectMode::Auto, &reply(true, "Connected"));
		assert_eq!(ok.credentials, CredentialAction::Keep);
		assert_eq!(ok.follow_up, FollowUp::Reload { delay_ms: 1000 });
	}

	#[test]
	fn successful_analysis_moves_on_to_the_lineage_view() {
		let done = analyze_outcome(&reply(true, "Analysis complete"));
		assert_eq!(done.status.level, StatusLevel::Success);
		assert_eq!(
			done.follow_up,
			FollowUp::Navigate {
				path: LINEAGE_PATH,
				delay_ms: 1500
			}
		);

		let failed = analyze_outcome(&reply(false, "Not connected to a database"));
		assert_eq!(failed.status.level, StatusLevel::Danger);
		assert_eq!(failed.follow_up, FollowUp::Stay);
	}

	#[test]
	fn reconnecting_with_saved_credentials_reloads_sooner_and_keeps_them() {
		let ok = connect_outcome(ConnectMode::Saved, &reply(true, "Connected"));
		assert_eq!(ok.status.level, StatusLevel::Success);
		assert_eq!(ok.credentials, CredentialAction::Keep);
		assert_eq!(ok.follow_up, FollowUp::Reload { delay_ms: 1000 });

		let refused = connect_outcome(ConnectMode::Saved, &reply(false, "bad password"));
		assert_eq!(refused.status, StatusMessage::new(StatusLevel::Danger, "bad password"));
		assert_eq!(refused.credentials, CredentialAction::Keep);

		let offline = connect_outcome(ConnectMode::Saved, &Err("timeout".into()));
		assert_eq!(offline.status.text, "Error: timeout");
	}

	#[test]
	fn replies_parse_leniently() {
		let parsed: ActionResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
		assert_eq!(Ok(parsed), reply(true, ""));
		let err = serde_json::from_str::<ActionResponse>("<html>500</html>").unwrap_err();
		assert!(RequestError::from(err).to_string().starts_with("unexpected reply"));
	}
}
