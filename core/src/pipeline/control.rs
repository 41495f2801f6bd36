// checkflow/src/pipeline/control.rs

//! Signals for controlling pipeline flow and the outcome of a pipeline run.

/// Signal from a step handler indicating whether the pipeline should continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Continue with the next step.
  Continue,
  /// Halt the pipeline immediately without error. No further steps run.
  Stop,
}

/// Outcome of a full pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran to completion.
  Completed,
  /// A handler returned `PipelineControl::Stop` before the last step.
  Stopped,
}
