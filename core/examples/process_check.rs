// checkflow/examples/process_check.rs

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tracing::info;

use checkflow::{
  Attachment, CheckProcessor, DestinationStore, OcrClient, OcrFields, ProcessedCheck, SourceStore,
};

// 1. In-memory collaborators standing in for the OCR action and both
//    databases. The real deployment wires HttpOcrClient/HttpDocumentStore via
//    CheckProcessor::from_params instead.

struct FixedOcr {
  fields: OcrFields,
}

#[async_trait]
impl OcrClient for FixedOcr {
  async fn parse_check(&self, _record_id: &str) -> Result<OcrFields> {
    Ok(self.fields.clone())
  }
}

struct InMemorySource {
  attachments: HashMap<String, Bytes>,
}

#[async_trait]
impl SourceStore for InMemorySource {
  async fn fetch_attachment(&self, doc_id: &str, _name: &str) -> Result<Bytes> {
    self
      .attachments
      .get(doc_id)
      .cloned()
      .ok_or_else(|| anyhow::anyhow!("attachment of document '{doc_id}' not found"))
  }
}

#[derive(Default)]
struct RecordingDestination {
  inserted: Mutex<Vec<(ProcessedCheck, usize)>>,
}

#[async_trait]
impl DestinationStore for RecordingDestination {
  async fn insert_with_attachment(
    &self,
    doc: &ProcessedCheck,
    attachment: Attachment<'_>,
  ) -> Result<()> {
    self
      .inserted
      .lock()
      .push((doc.clone(), attachment.data.len()));
    Ok(())
  }
}

fn sample_check_jpeg() -> Vec<u8> {
  let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
    640,
    280,
    image::Rgb([235, 235, 220]),
  ));
  let mut buf = std::io::Cursor::new(Vec::new());
  img
    .write_to(&mut buf, image::ImageFormat::Jpeg)
    .expect("JPEG encoding of the sample image");
  buf.into_inner()
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .init();

  info!("--- Check Processing Example ---");

  let trigger_id = "acct42^19.99";

  // 2. Seed the source database with the original check image.
  let mut attachments = HashMap::new();
  attachments.insert(trigger_id.to_string(), Bytes::from(sample_check_jpeg()));

  let destination = Arc::new(RecordingDestination::default());
  let processor = CheckProcessor::new(
    Arc::new(FixedOcr {
      fields: OcrFields {
        account: "acct7".to_string(),
        routing: "rt001".to_string(),
      },
    }),
    Arc::new(InMemorySource { attachments }),
    destination.clone(),
    150,
  );

  // 3. Run one invocation end to end.
  let receipt = processor.process(trigger_id).await?;
  info!(
    record_id = %receipt.record_id,
    attachment_bytes = receipt.attachment_bytes,
    "Invocation succeeded"
  );

  // 4. Inspect what landed in the destination database.
  for (doc, bytes) in destination.inserted.lock().iter() {
    info!(
      id = %doc.id,
      from = %doc.from_account,
      routing = %doc.routing_number,
      to = %doc.to_account,
      amount = %doc.amount,
      attachment_bytes = bytes,
      "Processed check document"
    );
  }

  Ok(())
}
