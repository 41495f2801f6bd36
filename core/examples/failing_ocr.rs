// checkflow/examples/failing_ocr.rs
//
// Demonstrates the fail-fast behavior: when the OCR action errors, the fetch,
// resize, and write steps never run, and the invocation reports the OCR error
// as its failure cause.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, warn};

use checkflow::{
  Attachment, CheckError, CheckProcessor, DestinationStore, OcrClient, OcrFields, ProcessedCheck,
  SourceStore,
};

struct UnreachableOcr;

#[async_trait]
impl OcrClient for UnreachableOcr {
  async fn parse_check(&self, _record_id: &str) -> Result<OcrFields> {
    anyhow::bail!("connection refused")
  }
}

#[derive(Default)]
struct CountingSource {
  fetches: AtomicUsize,
}

#[async_trait]
impl SourceStore for CountingSource {
  async fn fetch_attachment(&self, _doc_id: &str, _name: &str) -> Result<Bytes> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    Ok(Bytes::new())
  }
}

#[derive(Default)]
struct CountingDestination {
  inserts: AtomicUsize,
}

#[async_trait]
impl DestinationStore for CountingDestination {
  async fn insert_with_attachment(
    &self,
    _doc: &ProcessedCheck,
    _attachment: Attachment<'_>,
  ) -> Result<()> {
    self.inserts.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .init();

  let source = Arc::new(CountingSource::default());
  let destination = Arc::new(CountingDestination::default());
  let processor = CheckProcessor::new(
    Arc::new(UnreachableOcr),
    source.clone(),
    destination.clone(),
    150,
  );

  match processor.process("acct42^19.99").await {
    Ok(receipt) => info!(?receipt, "unexpected success"),
    Err(CheckError::RemoteCall { record_id, source }) => {
      warn!(%record_id, cause = %source, "Invocation failed at the OCR step");
    }
    Err(other) => warn!(error = %other, "Invocation failed elsewhere"),
  }

  info!(
    source_fetches = source.fetches.load(Ordering::SeqCst),
    destination_inserts = destination.inserts.load(Ordering::SeqCst),
    "No downstream step executed"
  );

  Ok(())
}
