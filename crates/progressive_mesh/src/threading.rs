//! Work submission abstraction.
//!
//! LOD builds are fire-and-forget jobs: the job itself sends its result over
//! the completion channel, so a queue only has to run closures somewhere.
//!
//! - [`RayonWorkQueue`]: `rayon::spawn` on the global pool, or on a dedicated
//!   pool sized by [`WorkerConfig`]. Works wherever rayon does (native,
//!   wasm-bindgen-rayon, emscripten with pthreads).
//! - [`InlineWorkQueue`]: runs the job on the calling thread. For tests and
//!   targets without threads.
//!
//! A panicking job on the global pool aborts the process, as `rayon::spawn`
//! does without a panic handler. This includes the topology check of a debug
//! build. A dedicated pool logs the panic and keeps its threads running.
//!
//! # Usage
//!
//! ```ignore
//! let queue = Arc::new(RayonWorkQueue::global());
//! queue.submit(Box::new(move || expensive_build()));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LodError, LodResult};

/// Unit of work submitted to a [`WorkQueue`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere to run jobs off the main thread.
pub trait WorkQueue: Send + Sync {
  /// Queue `job` (non-blocking).
  fn submit(&self, job: Job);

  /// Jobs queued or running.
  fn pending_count(&self) -> usize;

  /// Threads jobs may run on.
  fn num_threads(&self) -> usize;
}

/// Worker pool configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkerConfig {
  /// Dedicated pool size. `None` uses rayon's global pool.
  pub num_threads: Option<usize>,
  /// Thread name prefix of a dedicated pool.
  pub thread_name: Option<String>,
}

impl WorkerConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_threads(mut self, num_threads: usize) -> Self {
    self.num_threads = Some(num_threads);
    self
  }

  pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
    self.thread_name = Some(name.into());
    self
  }
}

/// Decrements the pending counter when a job finishes, panicking or not.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::AcqRel);
  }
}

/// [`WorkQueue`] backed by rayon.
#[derive(Clone)]
pub struct RayonWorkQueue {
  /// Dedicated pool; `None` spawns on the global pool.
  pool: Option<Arc<rayon::ThreadPool>>,
  pending: Arc<AtomicUsize>,
}

impl RayonWorkQueue {
  /// Spawn on rayon's global pool.
  pub fn global() -> Self {
    Self {
      pool: None,
      pending: Arc::new(AtomicUsize::new(0)),
    }
  }

  /// Build a queue from `config`: a dedicated pool when a thread count is
  /// given, the global pool otherwise.
  ///
  /// A dedicated pool installs a panic handler that logs the failed job.
  pub fn with_config(config: &WorkerConfig) -> LodResult<Self> {
    let Some(num_threads) = config.num_threads else {
      return Ok(Self::global());
    };

    let mut builder = rayon::ThreadPoolBuilder::new()
      .num_threads(num_threads)
      .panic_handler(|payload| {
        let message = payload
          .downcast_ref::<&str>()
          .copied()
          .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
          .unwrap_or("non-string panic payload");
        log::error!("LOD worker job panicked: {message}");
      });
    if let Some(prefix) = config.thread_name.clone() {
      builder = builder.thread_name(move |i| format!("{prefix}-{i}"));
    }
    let pool = builder
      .build()
      .map_err(|err| LodError::WorkerPool(err.to_string()))?;

    log::debug!("LOD worker pool started with {} threads", pool.current_num_threads());

    Ok(Self {
      pool: Some(Arc::new(pool)),
      pending: Arc::new(AtomicUsize::new(0)),
    })
  }
}

impl Default for RayonWorkQueue {
  fn default() -> Self {
    Self::global()
  }
}

impl WorkQueue for RayonWorkQueue {
  fn submit(&self, job: Job) {
    self.pending.fetch_add(1, Ordering::AcqRel);
    let guard = PendingGuard(Arc::clone(&self.pending));
    let task = move || {
      let _guard = guard;
      job();
    };

    match &self.pool {
      Some(pool) => pool.spawn(task),
      None => rayon::spawn(task),
    }
  }

  fn pending_count(&self) -> usize {
    self.pending.load(Ordering::Acquire)
  }

  fn num_threads(&self) -> usize {
    match &self.pool {
      Some(pool) => pool.current_num_threads(),
      None => rayon::current_num_threads(),
    }
  }
}

/// [`WorkQueue`] running every job synchronously inside `submit`.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineWorkQueue;

impl WorkQueue for InlineWorkQueue {
  fn submit(&self, job: Job) {
    job();
  }

  fn pending_count(&self) -> usize {
    0
  }

  fn num_threads(&self) -> usize {
    1
  }
}

// =============================================================================
// Tests
// =============================================================================
