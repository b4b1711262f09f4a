//! # Session Module
//!
//! Session-level state machine and operator status line.
//!
//! This module handles:
//! - The `Connecting → Ready → (Running ⇄ PausedRender) → Disconnected` lifecycle
//! - Gating the render scheduler without stopping its timer
//! - The status indicator string shown to the operator
//!
//! `Disconnected` is terminal: it is entered only on an unrecoverable
//! transport failure and no transition leaves it.

use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake with the vehicle in progress; no other component may act
    Connecting,
    /// Handshake complete, workers not yet started
    Ready,
    /// Ingestion, rendering and dispatch all active
    Running,
    /// Rendering paused; ingestion and dispatch remain active
    PausedRender,
    /// Transport failed permanently (terminal)
    Disconnected,
}

/// Shared session handle
///
/// Exactly one instance exists per process, created before any worker and
/// referenced by all of them (`Arc<Session>`). Interior mutability keeps the
/// handle shareable across the ingestion thread and the control context.
#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
    status: Mutex<String>,
}

impl Session {
    /// Create a new session in the `Connecting` state
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Connecting),
            status: Mutex::new(String::from("Connecting to vehicle...")),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the handshake as complete (`Connecting → Ready`)
    pub fn mark_ready(&self) {
        self.transition(|state| match state {
            SessionState::Connecting => Some(SessionState::Ready),
            _ => None,
        });
    }

    /// Start the running phase (`Ready → Running`)
    pub fn mark_running(&self) {
        self.transition(|state| match state {
            SessionState::Ready => Some(SessionState::Running),
            _ => None,
        });
    }

    /// Toggle the render gate (`Running ⇄ PausedRender`)
    ///
    /// Returns `true` if rendering is active after the toggle. Ingestion and
    /// dispatch are unaffected. No-op in any other state.
    pub fn toggle_render(&self) -> bool {
        self.transition(|state| match state {
            SessionState::Running => Some(SessionState::PausedRender),
            SessionState::PausedRender => Some(SessionState::Running),
            _ => None,
        });
        self.render_active()
    }

    /// Whether the render scheduler should redraw on its next tick
    pub fn render_active(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Enter the terminal `Disconnected` state
    ///
    /// Valid from every non-terminal state; dispatch attempts fail fast
    /// afterwards.
    pub fn mark_disconnected(&self) {
        self.transition(|state| match state {
            SessionState::Disconnected => None,
            _ => Some(SessionState::Disconnected),
        });
        self.set_status("Link lost - telemetry stopped");
    }

    /// Whether the session has entered the terminal state
    pub fn is_disconnected(&self) -> bool {
        self.state() == SessionState::Disconnected
    }

    /// Update the operator-facing status line
    pub fn set_status(&self, message: impl Into<String>) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = message.into();
    }

    /// Read the operator-facing status line
    pub fn status(&self) -> String {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn transition(&self, next: impl FnOnce(SessionState) -> Option<SessionState>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match next(*state) {
            Some(new_state) => *state = new_state,
            None => warn!("ignored invalid session transition from {:?}", *state),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_connecting() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(!session.render_active());
    }

    #[test]
    fn test_nominal_lifecycle() {
        let session = Session::new();
        session.mark_ready();
        assert_eq!(session.state(), SessionState::Ready);
        session.mark_running();
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.render_active());
    }

    #[test]
    fn test_render_toggle() {
        let session = Session::new();
        session.mark_ready();
        session.mark_running();

        assert!(!session.toggle_render(), "first toggle should pause");
        assert_eq!(session.state(), SessionState::PausedRender);

        assert!(session.toggle_render(), "second toggle should resume");
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_toggle_before_running_is_noop() {
        let session = Session::new();
        session.toggle_render();
        assert_eq!(session.state(), SessionState::Connecting);
    }

    #[test]
    fn test_cannot_skip_handshake() {
        let session = Session::new();
        session.mark_running();
        assert_eq!(
            session.state(),
            SessionState::Connecting,
            "Running requires Ready first"
        );
    }

    #[test]
    fn test_disconnected_is_terminal() {
        let session = Session::new();
        session.mark_ready();
        session.mark_running();
        session.mark_disconnected();
        assert!(session.is_disconnected());

        // No transition leaves the terminal state
        session.mark_ready();
        session.mark_running();
        session.toggle_render();
        assert!(session.is_disconnected());
        assert!(!session.render_active());
    }

    #[test]
    fn test_disconnect_reachable_from_paused() {
        let session = Session::new();
        session.mark_ready();
        session.mark_running();
        session.toggle_render();
        session.mark_disconnected();
        assert!(session.is_disconnected());
    }

    #[test]
    fn test_status_line() {
        let session = Session::new();
        session.set_status("Command sent");
        assert_eq!(session.status(), "Command sent");

        session.mark_disconnected();
        assert_eq!(session.status(), "Link lost - telemetry stopped");
    }
}
