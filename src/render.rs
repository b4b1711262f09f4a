//! # Render Module
//!
//! Periodic hand-off of history snapshots to the plotting collaborator.
//!
//! This module handles:
//! - Taking a consistent history snapshot on each tick
//! - Gating redraws on the session's render flag without stopping the timer
//! - The [`AttitudePlotter`] seam the chart backend implements
//!
//! The scheduler fires on a fixed period regardless of how many samples
//! arrived in the interval; it always renders the latest snapshot and never
//! replays intermediate states. An empty snapshot renders an empty chart.

use std::sync::Arc;
use tracing::trace;

use crate::session::Session;
use crate::telemetry::history::{OrientationSample, SharedHistory};

/// Default redraw period in milliseconds
pub const DEFAULT_RENDER_INTERVAL_MS: u64 = 1000;

/// Plotting collaborator seam
///
/// Receives the full ordered history on each redraw; the core never inspects
/// the backend's internals. An empty slice means "clear the chart".
pub trait AttitudePlotter: Send {
    fn redraw(&mut self, samples: &[OrientationSample]);
}

/// Periodic renderer decoupled in time from ingestion
///
/// The owner drives `tick` from a timer (the binary uses
/// `tokio::time::interval`); the scheduler itself only decides whether and
/// what to draw.
pub struct RenderScheduler {
    history: SharedHistory,
    session: Arc<Session>,
    plotter: Box<dyn AttitudePlotter>,
}

impl RenderScheduler {
    pub fn new(
        history: SharedHistory,
        session: Arc<Session>,
        plotter: Box<dyn AttitudePlotter>,
    ) -> Self {
        Self {
            history,
            session,
            plotter,
        }
    }

    /// One scheduler tick: snapshot and redraw if rendering is active
    ///
    /// Pausing skips the redraw only; the caller's timer keeps running so a
    /// resume needs no restart.
    pub fn tick(&mut self) {
        if !self.session.render_active() {
            trace!("render paused, skipping redraw");
            return;
        }

        let snapshot = self.history.snapshot();
        trace!("redrawing {} samples", snapshot.len());
        self.plotter.redraw(&snapshot);
    }
}

/// Plotter stand-in that renders the newest sample to the log
///
/// Used by the headless binary; a real chart backend implements
/// [`AttitudePlotter`] instead.
#[derive(Debug, Default)]
pub struct TracePlotter;

impl AttitudePlotter for TracePlotter {
    fn redraw(&mut self, samples: &[OrientationSample]) {
        match samples.last() {
            Some(sample) => tracing::info!(
                "attitude t={:+8.2}s roll={:+7.2}° pitch={:+7.2}° yaw={:+7.2}° ({} samples)",
                sample.elapsed_s,
                sample.roll_deg,
                sample.pitch_deg,
                sample.yaw_deg,
                samples.len()
            ),
            None => tracing::info!("attitude chart empty, waiting for telemetry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Captures every redraw for assertions
    struct RecordingPlotter {
        frames: Arc<Mutex<Vec<Vec<OrientationSample>>>>,
    }

    fn recording_plotter() -> (Box<dyn AttitudePlotter>, Arc<Mutex<Vec<Vec<OrientationSample>>>>) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        (
            Box::new(RecordingPlotter {
                frames: frames.clone(),
            }),
            frames,
        )
    }

    impl AttitudePlotter for RecordingPlotter {
        fn redraw(&mut self, samples: &[OrientationSample]) {
            self.frames.lock().unwrap().push(samples.to_vec());
        }
    }

    fn sample(i: usize) -> OrientationSample {
        OrientationSample {
            elapsed_s: i as f64,
            roll_deg: i as f64,
            pitch_deg: 0.0,
            yaw_deg: 0.0,
        }
    }

    fn running_session() -> Arc<Session> {
        let session = Arc::new(Session::new());
        session.mark_ready();
        session.mark_running();
        session
    }

    #[test]
    fn test_tick_renders_empty_snapshot() {
        let history = SharedHistory::with_capacity(50);
        let (plotter, frames) = recording_plotter();
        let mut scheduler = RenderScheduler::new(history, running_session(), plotter);

        scheduler.tick();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 1, "empty history still renders");
        assert!(frames[0].is_empty());
    }

    #[test]
    fn test_tick_hands_over_full_ordered_snapshot() {
        let history = SharedHistory::with_capacity(50);
        for i in 0..5 {
            history.append(sample(i));
        }
        let (plotter, frames) = recording_plotter();
        let mut scheduler = RenderScheduler::new(history, running_session(), plotter);

        scheduler.tick();

        let frames = frames.lock().unwrap();
        assert_eq!(frames[0], (0..5).map(sample).collect::<Vec<_>>());
    }

    #[test]
    fn test_paused_session_skips_redraw_without_stopping() {
        let history = SharedHistory::with_capacity(50);
        let session = running_session();
        let (plotter, frames) = recording_plotter();
        let mut scheduler = RenderScheduler::new(history, session.clone(), plotter);

        session.toggle_render();
        scheduler.tick();
        scheduler.tick();
        assert!(frames.lock().unwrap().is_empty());

        // Resume: the same scheduler picks up again on the next tick
        session.toggle_render();
        scheduler.tick();
        assert_eq!(frames.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_tick_always_renders_latest_not_intermediate() {
        let history = SharedHistory::with_capacity(50);
        let (plotter, frames) = recording_plotter();
        let mut scheduler = RenderScheduler::new(history.clone(), running_session(), plotter);

        // Many appends between two ticks: only the final state is drawn
        history.append(sample(0));
        history.append(sample(1));
        history.append(sample(2));
        scheduler.tick();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 3);
    }

    #[test]
    fn test_trace_plotter_tolerates_empty_and_full() {
        let mut plotter = TracePlotter;
        plotter.redraw(&[]);
        plotter.redraw(&[sample(1)]);
    }
}
