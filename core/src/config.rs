// checkflow/src/config.rs

//! Configuration for the check-processing pipeline.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static configuration for a [`crate::processor::CheckProcessor`].
///
/// Everything except the endpoints has a default matching the deployed
/// system; the endpoints must be supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
  /// Base URL of the document store hosting both databases.
  pub store_url: String,

  /// Database holding the incoming check documents and their image
  /// attachments.
  #[serde(default = "default_source_database")]
  pub source_database: String,

  /// Database receiving the processed check documents.
  #[serde(default = "default_destination_database")]
  pub destination_database: String,

  /// Base URL of the action platform API used to invoke the OCR action,
  /// up to and including the API version segment.
  pub api_base: String,

  /// Name of the OCR action, resolved inside the invocation namespace.
  #[serde(default = "default_ocr_action")]
  pub ocr_action: String,

  /// Target width of the resized check image in pixels. Aspect ratio is
  /// preserved.
  #[serde(default = "default_resize_width")]
  pub resize_width: u32,

  /// Client-side timeout applied to every remote call, in seconds. The
  /// original system waited forever; a bound here is a deliberate addition.
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
}

fn default_source_database() -> String {
  "incoming-checks".to_string()
}

fn default_destination_database() -> String {
  "processed-checks".to_string()
}

fn default_ocr_action() -> String {
  "parse-image".to_string()
}

fn default_resize_width() -> u32 {
  150
}

fn default_request_timeout_secs() -> u64 {
  30
}

impl ProcessorConfig {
  /// Validates field constraints before any client is built from this config.
  pub fn validate(&self) -> Result<()> {
    if self.store_url.trim().is_empty() {
      bail!("store_url must not be empty");
    }
    if self.api_base.trim().is_empty() {
      bail!("api_base must not be empty");
    }
    if self.source_database.is_empty() || self.destination_database.is_empty() {
      bail!("database names must not be empty");
    }
    if self.source_database == self.destination_database {
      bail!("source and destination databases must differ");
    }
    if self.ocr_action.is_empty() {
      bail!("ocr_action must not be empty");
    }
    if self.resize_width == 0 {
      bail!("resize_width must be positive");
    }
    if self.request_timeout_secs == 0 {
      bail!("request_timeout_secs must be positive");
    }
    Ok(())
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}

/// Credentials for the document store, also forwarded to the OCR action so it
/// can read the source attachment itself.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreCredentials {
  pub username: String,
  pub password: String,
}

// Keeps the password out of logs; params structs get dumped at DEBUG.
impl std::fmt::Debug for StoreCredentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StoreCredentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// The per-invocation payload supplied by the host: the id of the record that
/// fired the trigger, store credentials, and the namespace the OCR action is
/// registered under.
#[derive(Clone, Deserialize)]
pub struct ActionParams {
  #[serde(rename = "_id")]
  pub id: String,
  pub username: String,
  pub password: String,
  pub namespace: String,
}

impl std::fmt::Debug for ActionParams {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ActionParams")
      .field("id", &self.id)
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .field("namespace", &self.namespace)
      .finish()
  }
}

impl ActionParams {
  pub fn credentials(&self) -> StoreCredentials {
    StoreCredentials {
      username: self.username.clone(),
      password: self.password.clone(),
    }
  }
}
