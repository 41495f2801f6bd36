// checkflow/src/error.rs
use std::path::PathBuf;

use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Faults in the step engine itself, as opposed to the check-processing domain.
///
/// These indicate a mis-assembled pipeline (a step declared without a handler,
/// a handler registered for an unknown step) rather than a failed invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for step: {step_name}")]
  HandlerMissing { step_name: String },
}

/// Everything that can terminate a check-processing invocation.
///
/// One variant per pipeline step failure mode. Every variant is terminal for
/// the invocation that raised it: the remaining steps are skipped and the
/// error is surfaced to the host as the invocation's failure result. Nothing
/// is retried and nothing is rolled back.
#[derive(Debug, Error)]
pub enum CheckError {
  /// The trigger id did not split into `<toAccount>^<amount>`.
  #[error("Malformed trigger id '{trigger_id}': {reason}")]
  Parse {
    trigger_id: String,
    reason: &'static str,
  },

  /// The remote OCR action was unreachable, reported failure, or replied
  /// with something other than `{ result: { account, routing } }`.
  #[error("OCR action call failed for record '{record_id}'. Source: {source}")]
  RemoteCall {
    record_id: String,
    #[source]
    source: AnyhowError,
  },

  /// The source store could not produce the original attachment bytes.
  #[error("Failed to fetch source attachment for record '{record_id}'. Source: {source}")]
  SourceRead {
    record_id: String,
    #[source]
    source: AnyhowError,
  },

  /// The image could not be decoded, resized, or re-encoded.
  #[error("Image transform failed for record '{record_id}'. Source: {source}")]
  Transform {
    record_id: String,
    #[source]
    source: AnyhowError,
  },

  /// Writing or reading the per-invocation temp file failed.
  #[error("Local I/O failure on {path:?}. Source: {source}")]
  LocalIo {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The destination store rejected the multipart insert (conflict on an
  /// existing id, connectivity loss, non-2xx status).
  #[error("Destination write failed for record '{record_id}'. Source: {source}")]
  DestinationWrite {
    record_id: String,
    #[source]
    source: AnyhowError,
  },

  /// A business field was still empty when the write step was reached.
  /// The original system wrote such records silently; rejecting them here is
  /// a deliberate tightening.
  #[error("Record '{record_id}' is missing required field '{field}' before write")]
  IncompleteRecord {
    record_id: String,
    field: &'static str,
  },

  /// A fault in the step engine rather than in check processing.
  #[error(transparent)]
  Pipeline(#[from] PipelineError),
}

pub type CheckResult<T, E = CheckError> = std::result::Result<T, E>;
