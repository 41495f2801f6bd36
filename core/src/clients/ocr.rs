// checkflow/src/clients/ocr.rs

//! Client for the remote OCR action that reads the original check image and
//! extracts the machine-readable fields.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ProcessorConfig, StoreCredentials};

/// The two fields the OCR action extracts from a check image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrFields {
  pub account: String,
  pub routing: String,
}

/// A remote procedure that parses a stored check image.
///
/// The call is blocking from the pipeline's point of view: the invocation
/// suspends until the action returns its result or errors.
#[async_trait]
pub trait OcrClient: Send + Sync {
  async fn parse_check(&self, record_id: &str) -> Result<OcrFields>;
}

/// Request body for the OCR action: enough for it to fetch the image itself.
#[derive(Serialize)]
struct OcrRequest<'a> {
  username: &'a str,
  password: &'a str,
  database: &'a str,
  record_id: &'a str,
}

/// Reply envelope of a blocking action invocation. Anything that does not
/// deserialize to this shape is treated as a protocol error.
#[derive(Deserialize)]
struct ActivationReply {
  result: OcrFields,
}

/// Invokes the OCR action over the action platform's HTTP API.
///
/// The target is fully qualified from the configured API base, the
/// invocation namespace, and the action name.
pub struct HttpOcrClient {
  http: reqwest::Client,
  action_url: String,
  credentials: StoreCredentials,
  source_database: String,
}

impl HttpOcrClient {
  pub fn new(
    config: &ProcessorConfig,
    credentials: StoreCredentials,
    namespace: &str,
  ) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(config.request_timeout())
      .build()
      .context("failed to build HTTP client for the OCR action")?;

    let action_url = format!(
      "{}/namespaces/{}/actions/{}?blocking=true",
      config.api_base.trim_end_matches('/'),
      urlencoding::encode(namespace),
      urlencoding::encode(&config.ocr_action),
    );

    Ok(Self {
      http,
      action_url,
      credentials,
      source_database: config.source_database.clone(),
    })
  }

  /// The fully qualified invocation target.
  pub fn action_url(&self) -> &str {
    &self.action_url
  }
}

#[async_trait]
impl OcrClient for HttpOcrClient {
  async fn parse_check(&self, record_id: &str) -> Result<OcrFields> {
    debug!(%record_id, url = %self.action_url, "Invoking OCR action");

    let response = self
      .http
      .post(&self.action_url)
      .basic_auth(&self.credentials.username, Some(&self.credentials.password))
      .json(&OcrRequest {
        username: &self.credentials.username,
        password: &self.credentials.password,
        database: &self.source_database,
        record_id,
      })
      .send()
      .await
      .context("OCR action unreachable")?;

    let status = response.status();
    if !status.is_success() {
      bail!("OCR action returned status {status}");
    }

    let reply: ActivationReply = response
      .json()
      .await
      .context("OCR reply did not match the expected {result: {account, routing}} shape")?;

    Ok(reply.result)
  }
}
