// checkflow/src/transform.rs

//! Resizing of the check image into the archival copy.
//!
//! The original bytes are decoded, scaled down to a fixed target width with
//! the aspect ratio preserved, re-encoded as JPEG, and written to a uniquely
//! named temp file. The returned `TempPath` deletes the file on drop, so the
//! resized copy cannot outlive its invocation on any exit path.

use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use tempfile::TempPath;
use tracing::debug;

use crate::error::{CheckError, CheckResult};

#[derive(Debug, Clone, Copy)]
pub struct CheckResizer {
  width: u32,
}

impl CheckResizer {
  /// `width` is the target width in pixels.
  pub fn new(width: u32) -> Self {
    Self { width }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  /// Produces the resized JPEG on disk and hands back its scoped path.
  ///
  /// Decode and encode failures are `CheckError::Transform`; failure to
  /// obtain the temp file is `CheckError::LocalIo`.
  pub fn resize_to_temp(&self, record_id: &str, original: &[u8]) -> CheckResult<TempPath> {
    let img = image::load_from_memory(original).map_err(|e| CheckError::Transform {
      record_id: record_id.to_string(),
      source: e.into(),
    })?;

    let resized = img.resize(self.width, u32::MAX, FilterType::Triangle);
    debug!(
      %record_id,
      original_w = img.width(),
      original_h = img.height(),
      resized_w = resized.width(),
      resized_h = resized.height(),
      "Resized check image"
    );

    let mut file = tempfile::Builder::new()
      .prefix("check-")
      .suffix(".jpg")
      .tempfile()
      .map_err(|e| CheckError::LocalIo {
        path: std::env::temp_dir(),
        source: e,
      })?;

    resized
      .write_to(file.as_file_mut(), ImageFormat::Jpeg)
      .map_err(|e| CheckError::Transform {
        record_id: record_id.to_string(),
        source: e.into(),
      })?;

    Ok(file.into_temp_path())
  }
}
