// src/lib.rs

//! Checkflow: an asynchronous processing pipeline for deposited check images.
//!
//! A new check image lands in the incoming database and triggers one
//! invocation here, which:
//!  - Parses the trigger id into destination account and amount.
//!  - Invokes the remote OCR action (blocking) for the source account and
//!    routing number.
//!  - Fetches the original image and produces a resized archival copy.
//!  - Reads the resized bytes back into memory.
//!  - Inserts a combined document + attachment into the processed database.
//!
//! Steps run strictly in sequence; the first failure aborts the rest and is
//! reported as the invocation's failure result. Nothing is retried and the
//! source database is never written, so re-triggering a failed id is safe.

pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod record;
pub mod transform;

// --- Re-exports for the Public API ---

pub use crate::clients::{
  Attachment, DestinationStore, HttpDocumentStore, HttpOcrClient, OcrClient, OcrFields,
  SourceStore,
};
pub use crate::config::{ActionParams, ProcessorConfig, StoreCredentials};
pub use crate::context::ContextData;
pub use crate::error::{CheckError, CheckResult, PipelineError};
pub use crate::pipeline::{Handler, Pipeline, PipelineControl, PipelineResult, StepDef};
pub use crate::processor::{
  CheckContext, CheckProcessor, ProcessReceipt, RESIZED_CONTENT_TYPE, STEPS,
};
pub use crate::record::{CheckRecord, ProcessedCheck, TRIGGER_DELIMITER};
pub use crate::transform::CheckResizer;
