//! # Telemetry History
//!
//! Fixed-capacity rolling history of orientation samples.
//!
//! `TelemetryHistory` is the single shared mutable resource between the
//! ingestion worker (sole writer) and the render scheduler / sample logger
//! (readers). The raw buffer is never handed to another execution context;
//! all sharing goes through [`SharedHistory`], whose operations each take one
//! short exclusive critical section, so readers see either the pre- or
//! post-append state and never an interleaving.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Default history depth (matches the vehicle's live chart window)
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One decoded orientation report, immutable once created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    /// Seconds since the session started
    pub elapsed_s: f64,
    /// Roll angle in degrees
    pub roll_deg: f64,
    /// Pitch angle in degrees
    pub pitch_deg: f64,
    /// Yaw angle in degrees
    pub yaw_deg: f64,
}

/// Time-ordered rolling buffer of [`OrientationSample`]
///
/// Holds at most `capacity` samples; appending at capacity evicts the single
/// oldest sample first (strict FIFO). Insertion order is receipt order, which
/// is monotonic in elapsed time.
#[derive(Debug)]
pub struct TelemetryHistory {
    samples: VecDeque<OrientationSample>,
    capacity: usize,
}

impl TelemetryHistory {
    /// Create an empty history with the given fixed capacity
    ///
    /// A zero capacity is clamped to 1 so `append` can never fail.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest if the buffer is full
    ///
    /// O(1) amortized; never fails.
    pub fn append(&mut self, sample: OrientationSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// The most recent sample, or `None` if the history is empty
    pub fn latest(&self) -> Option<OrientationSample> {
        self.samples.back().copied()
    }

    /// An independently-owned copy of the buffer in arrival order
    pub fn snapshot(&self) -> Vec<OrientationSample> {
        self.samples.iter().copied().collect()
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the history holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Fixed capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Concurrency-safe handle to a [`TelemetryHistory`]
///
/// Cheap to clone; all clones reference the same buffer. Each operation locks
/// for the duration of that operation only, so the ingestion worker holds no
/// lock while blocked on the link.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<TelemetryHistory>>,
}

impl SharedHistory {
    /// Create a shared history with the given fixed capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TelemetryHistory::with_capacity(capacity))),
        }
    }

    /// Append a sample under a single exclusive critical section
    pub fn append(&self, sample: OrientationSample) {
        self.lock().append(sample);
    }

    /// Snapshot the full buffer, consistent at a single instant
    pub fn snapshot(&self) -> Vec<OrientationSample> {
        self.lock().snapshot()
    }

    /// The most recent sample, or `None` if the history is empty
    pub fn latest(&self) -> Option<OrientationSample> {
        self.lock().latest()
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the history holds no samples
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock only means a panic elsewhere mid-operation; the buffer
    // itself is always structurally valid, so recover the guard.
    fn lock(&self) -> std::sync::MutexGuard<'_, TelemetryHistory> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
