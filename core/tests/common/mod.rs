// tests/common/mod.rs
#![allow(dead_code)] // Allow unused helpers in this common test module

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tracing::Level;

use checkflow::{
  Attachment, DestinationStore, OcrClient, OcrFields, PipelineError, ProcessedCheck, SourceStore,
};

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Mock OCR action ---

pub struct MockOcr {
  reply: Result<OcrFields, String>,
  calls: AtomicUsize,
}

impl MockOcr {
  pub fn replying(account: &str, routing: &str) -> Self {
    Self {
      reply: Ok(OcrFields {
        account: account.to_string(),
        routing: routing.to_string(),
      }),
      calls: AtomicUsize::new(0),
    }
  }

  pub fn failing(message: &str) -> Self {
    Self {
      reply: Err(message.to_string()),
      calls: AtomicUsize::new(0),
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl OcrClient for MockOcr {
  async fn parse_check(&self, _record_id: &str) -> Result<OcrFields> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    match &self.reply {
      Ok(fields) => Ok(fields.clone()),
      Err(message) => Err(anyhow::anyhow!("{message}")),
    }
  }
}

// --- In-memory source database ---

#[derive(Default)]
pub struct InMemorySource {
  attachments: HashMap<String, Bytes>,
  fetches: AtomicUsize,
}

impl InMemorySource {
  pub fn with_attachment(doc_id: &str, data: Vec<u8>) -> Self {
    let mut attachments = HashMap::new();
    attachments.insert(doc_id.to_string(), Bytes::from(data));
    Self {
      attachments,
      fetches: AtomicUsize::new(0),
    }
  }

  pub fn empty() -> Self {
    Self::default()
  }

  pub fn insert_attachment(&mut self, doc_id: &str, data: Vec<u8>) {
    self.attachments.insert(doc_id.to_string(), Bytes::from(data));
  }

  pub fn fetches(&self) -> usize {
    self.fetches.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl SourceStore for InMemorySource {
  async fn fetch_attachment(&self, doc_id: &str, name: &str) -> Result<Bytes> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    assert_eq!(doc_id, name, "the pipeline names the attachment after the document");
    self
      .attachments
      .get(doc_id)
      .cloned()
      .ok_or_else(|| anyhow::anyhow!("attachment of document '{doc_id}' not found"))
  }
}

// --- Recording destination database ---

pub struct InsertedDoc {
  pub doc: ProcessedCheck,
  pub attachment_name: String,
  pub content_type: String,
  pub data: Bytes,
}

#[derive(Default)]
pub struct RecordingDestination {
  inserted: Mutex<Vec<InsertedDoc>>,
  attempts: AtomicUsize,
  fail_with: Option<String>,
}

impl RecordingDestination {
  pub fn accepting() -> Self {
    Self::default()
  }

  pub fn failing(message: &str) -> Self {
    Self {
      fail_with: Some(message.to_string()),
      ..Default::default()
    }
  }

  pub fn attempts(&self) -> usize {
    self.attempts.load(Ordering::SeqCst)
  }

  pub fn inserted(&self) -> parking_lot::MutexGuard<'_, Vec<InsertedDoc>> {
    self.inserted.lock()
  }
}

#[async_trait]
impl DestinationStore for RecordingDestination {
  async fn insert_with_attachment(
    &self,
    doc: &ProcessedCheck,
    attachment: Attachment<'_>,
  ) -> Result<()> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    if let Some(message) = &self.fail_with {
      return Err(anyhow::anyhow!("{message}"));
    }
    self.inserted.lock().push(InsertedDoc {
      doc: doc.clone(),
      attachment_name: attachment.name.to_string(),
      content_type: attachment.content_type.to_string(),
      data: Bytes::copy_from_slice(attachment.data),
    });
    Ok(())
  }
}

// --- Fixtures ---

/// A small flat-color JPEG standing in for a scanned check image.
pub fn sample_check_jpeg(width: u32, height: u32) -> Vec<u8> {
  let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
    width,
    height,
    image::Rgb([235, 235, 220]),
  ));
  let mut buf = std::io::Cursor::new(Vec::new());
  img
    .write_to(&mut buf, image::ImageFormat::Jpeg)
    .expect("JPEG encoding of the sample image");
  buf.into_inner()
}

// --- Error type for engine-level tests ---

#[derive(Debug, thiserror::Error)]
pub enum TestError {
  #[error("engine fault: {0}")]
  Engine(String),

  #[error("test handler failed: {0}")]
  Handler(String),
}

impl From<PipelineError> for TestError {
  fn from(pe: PipelineError) -> Self {
    TestError::Engine(format!("{pe:?}"))
  }
}
