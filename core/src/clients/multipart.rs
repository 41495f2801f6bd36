// checkflow/src/clients/multipart.rs

//! Encoder for the document store's multipart create: one `multipart/related`
//! body carrying the JSON document followed by the raw attachment bytes.
//!
//! The JSON part must declare the attachment in an `_attachments` stanza with
//! `follows: true`, the content type, and the exact byte length; the store
//! pairs the stanza with the body part that follows.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::clients::store::Attachment;

/// An encoded `multipart/related` request body together with the
/// `Content-Type` header value that describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedBody {
  pub content_type: String,
  pub body: Vec<u8>,
}

/// Encodes `doc` plus one attachment with a random part boundary.
pub fn encode_related<D: Serialize>(doc: &D, attachment: &Attachment<'_>) -> Result<RelatedBody> {
  let boundary = Uuid::new_v4().simple().to_string();
  encode_related_with_boundary(doc, attachment, &boundary)
}

/// Encodes `doc` plus one attachment using the caller's boundary.
pub fn encode_related_with_boundary<D: Serialize>(
  doc: &D,
  attachment: &Attachment<'_>,
  boundary: &str,
) -> Result<RelatedBody> {
  let mut doc_value =
    serde_json::to_value(doc).context("document did not serialize to JSON")?;
  let stanza = json!({
    attachment.name: {
      "follows": true,
      "content_type": attachment.content_type,
      "length": attachment.data.len(),
    }
  });
  doc_value
    .as_object_mut()
    .context("document must serialize to a JSON object")?
    .insert("_attachments".to_string(), stanza);
  let doc_json = serde_json::to_vec(&doc_value).context("failed to serialize document part")?;

  let mut body = Vec::with_capacity(doc_json.len() + attachment.data.len() + 128);
  body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
  body.extend_from_slice(b"Content-Type: application/json\r\n\r\n");
  body.extend_from_slice(&doc_json);
  body.extend_from_slice(format!("\r\n--{boundary}\r\n\r\n").as_bytes());
  body.extend_from_slice(attachment.data);
  body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

  Ok(RelatedBody {
    content_type: format!("multipart/related; boundary=\"{boundary}\""),
    body,
  })
}
