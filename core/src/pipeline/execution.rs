// checkflow/src/pipeline/execution.rs

//! Contains the `Pipeline::run()` method, responsible for executing the
//! pipeline's steps strictly in order with fail-fast semantics.

use crate::context::ContextData;
use crate::error::PipelineError;
use crate::pipeline::control::{PipelineControl, PipelineResult};
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes the pipeline against the given shared context.
  ///
  /// Steps run strictly in declaration order. The first handler error aborts
  /// the remaining steps and becomes the returned error; a handler returning
  /// `PipelineControl::Stop` halts without error. A declared step with no
  /// registered handler yields `PipelineError::HandlerMissing`, converted
  /// into `Err` via the `From<PipelineError>` bound.
  #[instrument(
        name = "Pipeline::run",
        skip_all,
        fields(
            context_data_type = %std::any::type_name::<TData>(),
            num_steps = self.steps.len(),
        ),
        err(Display)
    )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name_str = step_def.name.as_str();

      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_name_str,
        step_index = step_idx
      );
      let _step_span_guard = step_span.enter();
      event!(Level::DEBUG, "Processing step.");

      let handler_fn = match self.handlers.get(step_name_str) {
        Some(handler_fn) => handler_fn,
        None => {
          event!(Level::ERROR, "Step has no handler.");
          return Err(Err::from(PipelineError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      match handler_fn(ctx_data.clone()).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, "Pipeline stopped by handler.");
          return Ok(PipelineResult::Stopped);
        }
        Err(e) => {
          event!(Level::ERROR, error = %e, "Step handler failed; aborting remaining steps.");
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
