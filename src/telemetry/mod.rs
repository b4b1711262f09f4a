//! # Telemetry Module
//!
//! Attitude telemetry ingestion and the shared rolling history.
//!
//! This module handles:
//! - The fixed-capacity, time-ordered orientation history (FIFO eviction)
//! - Race-free sharing between the ingestion writer and snapshot readers
//! - The background worker that feeds the history from the link

pub mod history;
pub mod ingest;

pub use history::{OrientationSample, SharedHistory, TelemetryHistory, DEFAULT_HISTORY_CAPACITY};
pub use ingest::IngestionWorker;
