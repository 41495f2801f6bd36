// checkflow/src/pipeline/definition.rs

//! Contains the `Pipeline<TData, Err>` struct definition and methods for its
//! construction and handler registration.

use crate::context::ContextData;
use crate::error::PipelineError;
use crate::pipeline::control::PipelineControl;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Definition of a pipeline step. Steps are identified by name and executed
/// in declaration order.
#[derive(Debug, Clone)]
pub struct StepDef {
  pub name: String,
}

/// Type alias for a pipeline step handler.
///
/// A handler is an asynchronous function that receives a clone of the shared
/// `ContextData<TData>` and resolves to `Result<PipelineControl, Err>`.
///
/// Handlers are responsible for:
/// 1. Acquiring locks (`.read()` / `.write()`) on the `ContextData` to access
///    or modify state.
/// 2. Ensuring lock guards are dropped BEFORE any `.await` suspension point.
/// 3. Returning `PipelineControl::Continue` to proceed or
///    `PipelineControl::Stop` to halt the pipeline without error.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// A sequential pipeline, generic over an underlying context data type `TData`
/// and an error type `Err` that its handlers return.
///
/// `Err` must be `From<PipelineError>` so engine-level faults (a declared step
/// with no handler) surface through the same error channel as handler
/// failures.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Ordered list of step definitions for this pipeline.
  pub(crate) steps: Vec<StepDef>,

  /// One handler per step, keyed by step name.
  pub(crate) handlers: HashMap<String, Handler<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a new `Pipeline` from an ordered list of step names.
  pub fn new(step_names: &[&str]) -> Self {
    let steps = step_names
      .iter()
      .map(|name| StepDef {
        name: (*name).to_string(),
      })
      .collect();

    Self {
      steps,
      handlers: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Panics if the step was never declared. Registration against an unknown
  /// step is a programming error (e.g. a typo), not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Pipeline setup error: step '{}' not found in pipeline definition.",
        step_name
      );
    }
  }

  /// Registers the handler for a given step.
  ///
  /// The `handler_fn` takes `ContextData<TData>` and returns a `Future`
  /// resolving to `Result<PipelineControl, UserErr>`, where `UserErr` must be
  /// convertible into the pipeline's `Err` type.
  ///
  /// Panics if the step is unknown or already has a handler; both are setup
  /// errors.
  pub fn on<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    if self.handlers.contains_key(step_name) {
      panic!(
        "Pipeline setup error: step '{}' already has a handler.",
        step_name
      );
    }
    let final_handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.handlers.insert(step_name.to_string(), final_handler);
  }
}
