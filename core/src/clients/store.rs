// checkflow/src/clients/store.rs

//! Clients for the source and destination document databases.
//!
//! The pipeline only ever reads one attachment from the source database and
//! performs one multipart create against the destination database, so the
//! traits expose exactly those two operations.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::debug;

use crate::clients::multipart;
use crate::config::StoreCredentials;
use crate::record::ProcessedCheck;
use std::time::Duration;

/// One binary attachment accompanying a document insert.
#[derive(Debug, Clone, Copy)]
pub struct Attachment<'a> {
  pub name: &'a str,
  pub content_type: &'a str,
  pub data: &'a [u8],
}

/// Read side: the database the trigger record and its image live in.
#[async_trait]
pub trait SourceStore: Send + Sync {
  /// Retrieves attachment `name` of document `doc_id` as raw bytes.
  async fn fetch_attachment(&self, doc_id: &str, name: &str) -> Result<Bytes>;
}

/// Write side: the database receiving the processed check.
#[async_trait]
pub trait DestinationStore: Send + Sync {
  /// Inserts `doc` keyed by its id together with one binary attachment, as a
  /// single multipart create. An existing document under the same id is a
  /// failure, not an overwrite.
  async fn insert_with_attachment(
    &self,
    doc: &ProcessedCheck,
    attachment: Attachment<'_>,
  ) -> Result<()>;
}

/// HTTP client for one database of the document store. Constructed once per
/// database; implements whichever side of the pipeline that database plays.
pub struct HttpDocumentStore {
  http: reqwest::Client,
  base_url: String,
  database: String,
  credentials: StoreCredentials,
}

impl HttpDocumentStore {
  pub fn new(
    store_url: &str,
    database: &str,
    credentials: StoreCredentials,
    timeout: Duration,
  ) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build HTTP client for the document store")?;

    Ok(Self {
      http,
      base_url: store_url.trim_end_matches('/').to_string(),
      database: urlencoding::encode(database).into_owned(),
      credentials,
    })
  }

  /// URL of one attachment of one document.
  pub fn attachment_url(&self, doc_id: &str, name: &str) -> String {
    format!(
      "{}/{}/{}/{}",
      self.base_url,
      self.database,
      urlencoding::encode(doc_id),
      urlencoding::encode(name),
    )
  }

  /// URL of one document.
  pub fn document_url(&self, doc_id: &str) -> String {
    format!(
      "{}/{}/{}",
      self.base_url,
      self.database,
      urlencoding::encode(doc_id),
    )
  }
}

#[async_trait]
impl SourceStore for HttpDocumentStore {
  async fn fetch_attachment(&self, doc_id: &str, name: &str) -> Result<Bytes> {
    let url = self.attachment_url(doc_id, name);
    debug!(%doc_id, %name, %url, "Fetching source attachment");

    let response = self
      .http
      .get(&url)
      .basic_auth(&self.credentials.username, Some(&self.credentials.password))
      .send()
      .await
      .context("source store unreachable")?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
      bail!("attachment '{name}' of document '{doc_id}' not found");
    }
    if !status.is_success() {
      bail!("source store returned status {status} for attachment '{name}'");
    }

    response
      .bytes()
      .await
      .context("failed to read attachment body")
  }
}

#[async_trait]
impl DestinationStore for HttpDocumentStore {
  async fn insert_with_attachment(
    &self,
    doc: &ProcessedCheck,
    attachment: Attachment<'_>,
  ) -> Result<()> {
    let url = self.document_url(&doc.id);
    debug!(doc_id = %doc.id, %url, "Inserting processed check");

    let encoded = multipart::encode_related(doc, &attachment)?;
    let response = self
      .http
      .put(&url)
      .basic_auth(&self.credentials.username, Some(&self.credentials.password))
      .header(CONTENT_TYPE, encoded.content_type)
      .body(encoded.body)
      .send()
      .await
      .context("destination store unreachable")?;

    let status = response.status();
    if status == StatusCode::CONFLICT {
      bail!("document '{}' already exists in the destination store", doc.id);
    }
    if !status.is_success() {
      bail!("destination store returned status {status} for document '{}'", doc.id);
    }

    Ok(())
  }
}
