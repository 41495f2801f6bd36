// checkflow/src/context.rs

//! Shared, lock-guarded context threaded through a pipeline run.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A wrapper for pipeline context data providing shared ownership and interior
/// mutability via `parking_lot::RwLock`.
///
/// Every step handler receives a clone of the same `ContextData` and acquires
/// a guard to inspect or mutate the state the previous steps left behind.
///
/// IMPORTANT: the guards are blocking and MUST NOT be held across `.await`
/// suspension points. Read what you need, drop the guard, then await.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  /// Acquires a read lock. The returned guard MUST be dropped before any
  /// `.await` point.
  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  /// Acquires a write lock. The returned guard MUST be dropped before any
  /// `.await` point.
  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
