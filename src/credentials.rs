//! Browser-side cache of database connection credentials.
//!
//! Entries are base64 over `json | key-check` and expire after a day. This
//! keeps them out of casual view in devtools; it is not encryption and
//! must not be treated as a secret store.

use std::cell::RefCell;
use std::collections::HashMap;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const KEY_STORAGE_KEY: &str = "pg_lineage_encryption_key";
pub const CREDENTIALS_KEY: &str = "pg_lineage_credentials";
pub const MANUAL_DISCONNECT_KEY: &str = "pg_lineage_manual_disconnect";

const KEY_CHECK_LEN: usize = 8;
const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;
const TIME_TO_LIVE_MS: f64 = 24.0 * HOUR_MS;

#[derive(Debug, Error)]
pub enum CredentialError {
	#[error("credential storage unavailable: {0}")]
	Storage(String),
	#[error("stored credentials are not valid base64: {0}")]
	Decode(#[from] base64::DecodeError),
	#[error("stored credentials have an unexpected layout")]
	Format,
	#[error("stored credentials are not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("encryption key mismatch")]
	KeyMismatch,
}

/// The form fields `/connect` accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	pub host: String,
	pub port: String,
	pub database: String,
	pub user: String,
	pub password: String,
}

impl Credentials {
	pub fn fields(&self) -> [(&'static str, &str); 5] {
		[
			("host", &self.host),
			("port", &self.port),
			("database", &self.database),
			("user", &self.user),
			("password", &self.password),
		]
	}

	/// `user@host/database`, never the password.
	pub fn summary(&self) -> String {
		format!("{}@{}/{}", self.user, self.host, self.database)
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
	credentials: Credentials,
	/// Milliseconds since the epoch.
	expires_at: f64,
}

/// Key/value persistence the cache writes through.
pub trait CredentialStore {
	fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;
	fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;
	fn remove(&self, key: &str) -> Result<(), CredentialError>;
}

/// `window.localStorage`.
pub struct LocalStorage(web_sys::Storage);

impl LocalStorage {
	pub fn new() -> Result<Self, CredentialError> {
		web_sys::window()
			.ok_or_else(|| CredentialError::Storage("no window".into()))?
			.local_storage()
			.map_err(js_error)?
			.map(Self)
			.ok_or_else(|| CredentialError::Storage("localStorage disabled".into()))
	}
}

fn js_error(err: wasm_bindgen::JsValue) -> CredentialError {
	CredentialError::Storage(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl CredentialStore for LocalStorage {
	fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
		self.0.get_item(key).map_err(js_error)
	}

	fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
		self.0.set_item(key, value).map_err(js_error)
	}

	fn remove(&self, key: &str) -> Result<(), CredentialError> {
		self.0.remove_item(key).map_err(js_error)
	}
}

#[derive(Default)]
pub struct MemoryStore(RefCell<HashMap<String, String>>);

impl CredentialStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
		Ok(self.0.borrow().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
		self.0.borrow_mut().insert(key.into(), value.into());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), CredentialError> {
		self.0.borrow_mut().remove(key);
		Ok(())
	}
}

/// What the connection page should do with cached credentials on load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutoConnect {
	AlreadyConnected,
	/// The user disconnected by hand; offer the cached entry instead of
	/// reconnecting silently.
	OfferSaved,
	Connect(Credentials),
	Nothing,
}

type Clock = Box<dyn Fn() -> f64>;
type KeyGen = Box<dyn Fn() -> Result<String, CredentialError>>;

pub struct CredentialCache<S> {
	store: S,
	now: Clock,
	generate_key: KeyGen,
}

impl CredentialCache<LocalStorage> {
	/// Cache over `localStorage`, the wall clock and `crypto.getRandomValues`.
	pub fn browser() -> Result<Self, CredentialError> {
		Ok(Self::new(
			LocalStorage::new()?,
			Box::new(js_sys::Date::now),
			Box::new(random_key),
		))
	}
}

/// 16 random bytes as 32 lowercase hex digits.
fn random_key() -> Result<String, CredentialError> {
	let crypto = web_sys::window()
		.ok_or_else(|| CredentialError::Storage("no window".into()))?
		.crypto()
		.map_err(js_error)?;
	let mut bytes = [0u8; 16];
	crypto.get_random_values_with_u8_array(&mut bytes).map_err(js_error)?;
	Ok(bytes.iter().map(|b| format!("{:02x}", b)).collect())
}

impl<S: CredentialStore> CredentialCache<S> {
	pub fn new(store: S, now: Clock, generate_key: KeyGen) -> Self {
		Self {
			store,
			now,
			generate_key,
		}
	}

	fn key(&self) -> Result<String, CredentialError> {
		if let Some(key) = self.store.get(KEY_STORAGE_KEY)? {
			return Ok(key);
		}
		let key = (self.generate_key)()?;
		self.store.set(KEY_STORAGE_KEY, &key)?;
		Ok(key)
	}

	fn key_check(key: &str) -> String {
		key.chars().take(KEY_CHECK_LEN).collect()
	}

	pub fn encode<T: Serialize>(&self, payload: &T) -> Result<String, CredentialError> {
		let json = serde_json::to_string(payload)?;
		let check = Self::key_check(&self.key()?);
		Ok(BASE64_STANDARD.encode(format!("{}|{}", json, check)))
	}

	pub fn decode<T: for<'de> Deserialize<'de>>(&self, encoded: &str) -> Result<T, CredentialError> {
		let bytes = BASE64_STANDARD.decode(encoded.trim())?;
		let text = String::from_utf8(bytes).map_err(|_| CredentialError::Format)?;
		// the check never contains '|', the JSON might
		let (json, check) = text.rsplit_once('|').ok_or(CredentialError::Format)?;
		if check != Self::key_check(&self.key()?) {
			return Err(CredentialError::KeyMismatch);
		}
		Ok(serde_json::from_str(json)?)
	}

	fn entry(&self) -> Result<Option<StoredEntry>, CredentialError> {
		match self.store.get(CREDENTIALS_KEY)? {
			Some(encoded) => self.decode(&encoded).map(Some),
			None => Ok(None),
		}
	}

	pub fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
		let entry = StoredEntry {
			credentials: credentials.clone(),
			expires_at: (self.now)() + TIME_TO_LIVE_MS,
		};
		let encoded = self.encode(&entry)?;
		self.store.set(CREDENTIALS_KEY, &encoded)?;
		log::info!("Saved credentials for {}", credentials.summary());
		Ok(())
	}

	/// The cached credentials, if present and unexpired. Expired entries are
	/// deleted; unreadable ones are logged and ignored.
	pub fn load(&self) -> Option<Credentials> {
		let entry = match self.entry() {
			Ok(entry) => entry?,
			Err(e) => {
				log::error!("Error loading credentials: {}", e);
				return None;
			}
		};
		if entry.expires_at < (self.now)() {
			log::info!("Stored credentials expired");
			self.delete();
			return None;
		}
		Some(entry.credentials)
	}

	pub fn delete(&self) {
		if let Err(e) = self.store.remove(CREDENTIALS_KEY) {
			log::error!("Error deleting credentials: {}", e);
		}
	}

	/// Whole hours left on the cached entry, rounded; 0 when none is stored.
	pub fn hours_until_expiration(&self) -> u32 {
		match self.entry() {
			Ok(Some(entry)) => ((entry.expires_at - (self.now)()) / HOUR_MS).round().max(0.0) as u32,
			Ok(None) => 0,
			Err(e) => {
				log::error!("Error calculating credential expiration: {}", e);
				0
			}
		}
	}

	pub fn manual_disconnect(&self) -> bool {
		matches!(self.store.get(MANUAL_DISCONNECT_KEY), Ok(Some(v)) if v == "true")
	}

	pub fn set_manual_disconnect(&self, on: bool) {
		let result = if on {
			self.store.set(MANUAL_DISCONNECT_KEY, "true")
		} else {
			self.store.remove(MANUAL_DISCONNECT_KEY)
		};
		if let Err(e) = result {
			log::warn!("Could not update disconnect flag: {}", e);
		}
	}

	pub fn plan_auto_connect(&self, already_connected: bool) -> AutoConnect {
		if already_connected {
			return AutoConnect::AlreadyConnected;
		}
		match self.load() {
			Some(_) if self.manual_disconnect() => AutoConnect::OfferSaved,
			Some(credentials) => AutoConnect::Connect(credentials),
			None => AutoConnect::Nothing,
		}
	}
}
