// checkflow/src/clients/mod.rs

//! Typed clients for the pipeline's external collaborators: the remote OCR
//! action and the two document databases. Each collaborator sits behind a
//! trait so tests can swap in in-memory fakes.

pub mod multipart;
pub mod ocr;
pub mod store;

pub use multipart::{encode_related, RelatedBody};
pub use ocr::{HttpOcrClient, OcrClient, OcrFields};
pub use store::{Attachment, DestinationStore, HttpDocumentStore, SourceStore};
