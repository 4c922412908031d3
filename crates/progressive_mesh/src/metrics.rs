//! Engine-agnostic metrics for LOD generation.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//! [`LodMetrics`] lives on the injector, so it is only touched from the main
//! thread.
//!
//! # Usage
//!
//! ```ignore
//! use progressive_mesh::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let report = injector.process_frame(&mut meshes);
//! let average = injector.metrics().build_timings.average();
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window of recent values.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl RollingWindow<u64> {
    pub fn sum(&self) -> u64 {
        self.buffer.iter().sum()
    }

    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }

    pub fn max(&self) -> Option<u64> {
        self.buffer.iter().copied().max()
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128)
    }
}

/// Injection-side statistics.
#[derive(Debug, Clone, Default)]
pub struct LodMetrics {
    /// Worker time (simplify + bake) of recent builds, microseconds.
    pub build_timings: RollingWindow<u64>,
    /// Main-thread time of recent injections, microseconds.
    pub inject_timings: RollingWindow<u64>,
    /// Builds installed on a mesh.
    pub builds_injected: u64,
    /// Builds rejected at injection (structure changed in flight).
    pub builds_failed: u64,
    /// Builds whose mesh was gone by the time they completed.
    pub builds_discarded: u64,
    /// Triangles installed per LOD level index, summed over builds.
    pub triangles_per_level: Vec<u64>,
}

impl LodMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean worker time of recent builds, microseconds.
    pub fn average_build_us(&self) -> f64 {
        self.build_timings.average()
    }

    /// Slowest recent build, microseconds.
    pub fn peak_build_us(&self) -> Option<u64> {
        self.build_timings.max()
    }

    /// Mean main-thread time of recent injections, microseconds.
    pub fn average_inject_us(&self) -> f64 {
        self.inject_timings.average()
    }

    /// Reset timings. Counters are cumulative and kept.
    pub fn reset(&mut self) {
        self.build_timings.clear();
        self.inject_timings.clear();
    }

    /// Record an injected build.
    pub fn record_injection(&mut self, build_us: u64, inject_us: u64, triangles: &[usize]) {
        if !is_enabled() {
            return;
        }
        self.builds_injected += 1;
        self.build_timings.push(build_us);
        self.inject_timings.push(inject_us);

        if self.triangles_per_level.len() < triangles.len() {
            self.triangles_per_level.resize(triangles.len(), 0);
        }
        for (total, &count) in self.triangles_per_level.iter_mut().zip(triangles) {
            *total += count as u64;
        }
    }

    pub fn record_failure(&mut self) {
        if is_enabled() {
            self.builds_failed += 1;
        }
    }

    pub fn record_discard(&mut self) {
        if is_enabled() {
            self.builds_discarded += 1;
        }
    }
}
