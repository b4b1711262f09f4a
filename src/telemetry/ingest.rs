//! # Ingestion Worker
//!
//! Long-lived background loop pulling attitude reports off the link.
//!
//! This module handles:
//! - Blocking on the link for the next ATTITUDE report
//! - Radians to degrees conversion (exact 180/π via `f64::to_degrees`)
//! - Elapsed-time stamping relative to session start
//! - Appending to the shared history without holding a lock across I/O
//!
//! A malformed or unrelated message is a no-op; the loop simply receives
//! again. Only a transport-level disconnect ends the loop, transitioning the
//! session to its terminal state. The stop flag is checked between receives
//! so shutdown is deterministic rather than relying on process exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::link::{AttitudeReport, LinkTransport};
use crate::session::Session;
use crate::telemetry::history::{OrientationSample, SharedHistory};

/// Number of appended samples between status log messages
const LOG_INTERVAL_SAMPLES: u64 = 100;

/// Convert a raw attitude report into an orientation sample
///
/// Angles are converted with `f64::to_degrees` (the exact 180/π factor, not
/// the 57.2958 shorthand, so long runs do not drift).
pub fn sample_from_report(report: &AttitudeReport, elapsed_s: f64) -> OrientationSample {
    OrientationSample {
        elapsed_s,
        roll_deg: report.roll_rad.to_degrees(),
        pitch_deg: report.pitch_rad.to_degrees(),
        yaw_deg: report.yaw_rad.to_degrees(),
    }
}

/// Background reader feeding the telemetry history
///
/// Runs on a dedicated thread, so an absent vehicle blocks only this
/// worker and never the control context.
pub struct IngestionWorker {
    link: Arc<dyn LinkTransport>,
    history: SharedHistory,
    session: Arc<Session>,
    stop: Arc<AtomicBool>,
    started_at: Instant,
}

impl IngestionWorker {
    pub fn new(
        link: Arc<dyn LinkTransport>,
        history: SharedHistory,
        session: Arc<Session>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            link,
            history,
            session,
            stop,
            started_at: Instant::now(),
        }
    }

    /// Run the receive loop until stopped or the link fails
    ///
    /// Consumes the worker; returns when the stop flag is raised between
    /// receives or when the transport disconnects. On disconnect the session
    /// is marked `Disconnected` before returning.
    pub fn run(self) {
        info!("ingestion worker started on {}", self.link.endpoint());
        let mut appended: u64 = 0;

        while !self.stop.load(Ordering::Relaxed) {
            match self.link.recv_report() {
                Ok(Some(report)) => {
                    let elapsed_s = self.started_at.elapsed().as_secs_f64();
                    self.history.append(sample_from_report(&report, elapsed_s));

                    appended += 1;
                    if appended % LOG_INTERVAL_SAMPLES == 0 {
                        debug!("ingested {} attitude reports", appended);
                    }
                }
                Ok(None) => {
                    // Skipped message, wait for the next one
                    continue;
                }
                Err(e) => {
                    warn!("telemetry link lost: {e}");
                    self.session.mark_disconnected();
                    break;
                }
            }
        }

        info!("ingestion worker stopped after {} reports", appended);
    }
}
