// checkflow/src/processor.rs

//! The check-processing orchestrator: one `Pipeline` instance wiring the five
//! steps (parse, ocr, resize, read, write) over a shared `CheckContext`.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempPath;
use tracing::{debug, info, instrument};

use crate::clients::{
  Attachment, DestinationStore, HttpDocumentStore, HttpOcrClient, OcrClient, SourceStore,
};
use crate::config::{ActionParams, ProcessorConfig};
use crate::context::ContextData;
use crate::error::{CheckError, CheckResult};
use crate::pipeline::{Pipeline, PipelineControl};
use crate::record::CheckRecord;
use crate::transform::CheckResizer;

/// Step names, in execution order.
pub const STEPS: [&str; 5] = ["parse", "ocr", "resize", "read", "write"];

/// Content type declared on the archived attachment.
pub const RESIZED_CONTENT_TYPE: &str = "image/jpeg";

/// Shared state of one invocation, mutated in place by the steps.
///
/// `record` is set by the parse step, `resized_path` by the resize step (the
/// temp file is deleted when the context drops, whichever way the invocation
/// ends), and `resized_bytes` by the read step.
#[derive(Default)]
pub struct CheckContext {
  pub trigger_id: String,
  pub record: Option<CheckRecord>,
  pub resized_path: Option<TempPath>,
  pub resized_bytes: Option<Bytes>,
}

impl CheckContext {
  pub fn new(trigger_id: &str) -> Self {
    Self {
      trigger_id: trigger_id.to_string(),
      ..Default::default()
    }
  }
}

/// Outcome of a successful invocation, reported back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReceipt {
  pub record_id: String,
  /// Size of the archived attachment.
  pub attachment_bytes: usize,
}

/// Orchestrates check processing against injected collaborators.
///
/// The processor holds no per-invocation state: the host may call
/// [`CheckProcessor::process`] concurrently for distinct trigger events, and
/// each call gets its own context and temp file.
pub struct CheckProcessor {
  ocr: Arc<dyn OcrClient>,
  source: Arc<dyn SourceStore>,
  destination: Arc<dyn DestinationStore>,
  resizer: CheckResizer,
}

impl CheckProcessor {
  pub fn new(
    ocr: Arc<dyn OcrClient>,
    source: Arc<dyn SourceStore>,
    destination: Arc<dyn DestinationStore>,
    resize_width: u32,
  ) -> Self {
    Self {
      ocr,
      source,
      destination,
      resizer: CheckResizer::new(resize_width),
    }
  }

  /// Builds a processor wired to the real HTTP collaborators described by
  /// `config`, authenticated with the invocation's credentials.
  pub fn from_params(config: &ProcessorConfig, params: &ActionParams) -> anyhow::Result<Self> {
    config.validate()?;
    let credentials = params.credentials();

    let ocr = HttpOcrClient::new(config, credentials.clone(), &params.namespace)?;
    let source = HttpDocumentStore::new(
      &config.store_url,
      &config.source_database,
      credentials.clone(),
      config.request_timeout(),
    )?;
    let destination = HttpDocumentStore::new(
      &config.store_url,
      &config.destination_database,
      credentials,
      config.request_timeout(),
    )?;

    Ok(Self::new(
      Arc::new(ocr),
      Arc::new(source),
      Arc::new(destination),
      config.resize_width,
    ))
  }

  /// Runs the full pipeline for one trigger event.
  ///
  /// Strictly sequential; the first failing step aborts the rest and its
  /// error is the invocation's failure result. The source store is never
  /// written, so re-triggering the same id after a failure is safe.
  #[instrument(name = "CheckProcessor::process", skip(self), err(Display))]
  pub async fn process(&self, trigger_id: &str) -> CheckResult<ProcessReceipt> {
    let pipeline = self.build_pipeline();
    let ctx = ContextData::new(CheckContext::new(trigger_id));

    pipeline.run(ctx.clone()).await?;

    let guard = ctx.read();
    let record_id = guard
      .record
      .as_ref()
      .map(|r| r.id.clone())
      .unwrap_or_else(|| trigger_id.to_string());
    let attachment_bytes = guard.resized_bytes.as_ref().map(Bytes::len).unwrap_or(0);
    info!(%record_id, attachment_bytes, "Check processed");

    Ok(ProcessReceipt {
      record_id,
      attachment_bytes,
    })
  }

  /// Assembles the five-step pipeline. Handlers close over clones of the
  /// injected collaborators; context guards are always dropped before the
  /// handler awaits.
  fn build_pipeline(&self) -> Pipeline<CheckContext, CheckError> {
    let mut pipeline = Pipeline::<CheckContext, CheckError>::new(&STEPS);

    pipeline.on("parse", |ctx: ContextData<CheckContext>| async move {
      let trigger_id = ctx.read().trigger_id.clone();
      let record = CheckRecord::parse(&trigger_id)?;
      debug!(record_id = %record.id, to_account = %record.to_account, amount = %record.amount, "Parsed trigger id");
      ctx.write().record = Some(record);
      Ok::<_, CheckError>(PipelineControl::Continue)
    });

    let ocr_client = Arc::clone(&self.ocr);
    pipeline.on("ocr", move |ctx: ContextData<CheckContext>| {
      let ocr_client = Arc::clone(&ocr_client);
      async move {
        let record_id = {
          let guard = ctx.read();
          let record = guard.record.as_ref().expect("parse step populates the record");
          record.id.clone()
        };
        info!(%record_id, "Executing OCR parse of check");
        let fields =
          ocr_client
            .parse_check(&record_id)
            .await
            .map_err(|source| CheckError::RemoteCall {
              record_id: record_id.clone(),
              source,
            })?;
        let mut guard = ctx.write();
        let record = guard.record.as_mut().expect("parse step populates the record");
        record.merge_ocr(fields.account, fields.routing);
        Ok::<_, CheckError>(PipelineControl::Continue)
      }
    });

    let source_store = Arc::clone(&self.source);
    let resizer = self.resizer;
    pipeline.on("resize", move |ctx: ContextData<CheckContext>| {
      let source_store = Arc::clone(&source_store);
      async move {
        let record_id = {
          let guard = ctx.read();
          let record = guard.record.as_ref().expect("parse step populates the record");
          record.id.clone()
        };
        info!(%record_id, "Creating resized image");
        let original = source_store
          .fetch_attachment(&record_id, &record_id)
          .await
          .map_err(|source| CheckError::SourceRead {
            record_id: record_id.clone(),
            source,
          })?;
        let resized_path = resizer.resize_to_temp(&record_id, &original)?;
        ctx.write().resized_path = Some(resized_path);
        Ok::<_, CheckError>(PipelineControl::Continue)
      }
    });

    pipeline.on("read", |ctx: ContextData<CheckContext>| async move {
      let path: PathBuf = {
        let guard = ctx.read();
        let resized = guard
          .resized_path
          .as_ref()
          .expect("resize step leaves the resized file path");
        resized.to_path_buf()
      };
      let data = tokio::fs::read(&path)
        .await
        .map_err(|source| CheckError::LocalIo {
          path: path.clone(),
          source,
        })?;
      debug!(path = %path.display(), bytes = data.len(), "Read resized image");
      ctx.write().resized_bytes = Some(Bytes::from(data));
      Ok::<_, CheckError>(PipelineControl::Continue)
    });

    let destination_store = Arc::clone(&self.destination);
    pipeline.on("write", move |ctx: ContextData<CheckContext>| {
      let destination_store = Arc::clone(&destination_store);
      async move {
        let (doc, data) = {
          let guard = ctx.read();
          let record = guard.record.as_ref().expect("parse step populates the record");
          let doc = record.to_document()?;
          let data = guard
            .resized_bytes
            .clone()
            .expect("read step loads the resized bytes");
          (doc, data)
        };
        info!(record_id = %doc.id, bytes = data.len(), "Inserting into the processed database");
        destination_store
          .insert_with_attachment(
            &doc,
            Attachment {
              name: &doc.id,
              content_type: RESIZED_CONTENT_TYPE,
              data: &data,
            },
          )
          .await
          .map_err(|source| CheckError::DestinationWrite {
            record_id: doc.id.clone(),
            source,
          })?;
        Ok::<_, CheckError>(PipelineControl::Continue)
      }
    });

    pipeline
  }
}
