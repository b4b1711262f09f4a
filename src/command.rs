//! # Command Module
//!
//! Manual thrust-vector validation and dispatch.
//!
//! This module handles:
//! - Parsing operator input into a validated [`CommandVector`]
//! - Fire-and-forget MANUAL_CONTROL dispatch (`rotation = 0, buttons = 0`)
//! - Failing fast once the session has disconnected
//!
//! Dispatch is independent of ingestion cadence: each call is stateless and
//! may interleave freely with the background receive loop. Rejecting bad
//! operator input is a local, recoverable error reflected in the session
//! status line, never a crash.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{HoverConsoleError, Result};
use crate::link::{LinkTransport, MANUAL_CONTROL_MAX, MANUAL_CONTROL_MIN};
use crate::session::Session;

/// A validated 3-axis thrust command
///
/// Ephemeral: constructed from operator input, dispatched once, discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandVector {
    /// Forward/backward thrust
    pub forward: i16,
    /// Left/right thrust
    pub lateral: i16,
    /// Up/down thrust
    pub vertical: i16,
}

impl CommandVector {
    /// Parse raw operator input into a command vector
    ///
    /// Each field must be an integer within the link's accepted axis range
    /// (−1000..=1000, the MAVLink MANUAL_CONTROL convention).
    ///
    /// # Errors
    ///
    /// Returns `InvalidCommandInput` naming the first offending field.
    pub fn parse(forward: &str, lateral: &str, vertical: &str) -> Result<Self> {
        Ok(Self {
            forward: parse_axis("forward", forward)?,
            lateral: parse_axis("lateral", lateral)?,
            vertical: parse_axis("vertical", vertical)?,
        })
    }
}

fn parse_axis(name: &str, raw: &str) -> Result<i16> {
    let value: i16 = raw.trim().parse().map_err(|_| {
        HoverConsoleError::InvalidCommandInput(format!("{name} must be an integer, got {raw:?}"))
    })?;

    if !(MANUAL_CONTROL_MIN..=MANUAL_CONTROL_MAX).contains(&value) {
        return Err(HoverConsoleError::InvalidCommandInput(format!(
            "{name} must be between {MANUAL_CONTROL_MIN} and {MANUAL_CONTROL_MAX}, got {value}"
        )));
    }

    Ok(value)
}

/// Sends validated command vectors over the link
///
/// Holds no state between calls.
pub struct CommandDispatcher {
    link: Arc<dyn LinkTransport>,
    session: Arc<Session>,
}

impl CommandDispatcher {
    pub fn new(link: Arc<dyn LinkTransport>, session: Arc<Session>) -> Self {
        Self { link, session }
    }

    /// Dispatch a validated vector to the vehicle
    ///
    /// Success means "handed to the transport"; the link offers no delivery
    /// acknowledgment. Updates the session status line either way.
    ///
    /// # Errors
    ///
    /// * `TransportDisconnect` - the session is already down (fail fast, no
    ///   send attempted) or the transport rejected the write
    pub fn send(&self, vector: CommandVector) -> Result<()> {
        if self.session.is_disconnected() {
            self.session.set_status("Command not sent - link is down");
            return Err(HoverConsoleError::TransportDisconnect(
                "session is disconnected".into(),
            ));
        }

        self.link.send_manual_control(
            vector.forward,
            vector.lateral,
            vector.vertical,
            0, // no rotation
            0, // no button flags
        )?;

        debug!(
            "dispatched command forward={} lateral={} vertical={}",
            vector.forward, vector.lateral, vector.vertical
        );
        self.session.set_status("Command sent");
        Ok(())
    }

    /// Parse raw operator input and dispatch it
    ///
    /// Invalid input is rejected before any send attempt and reflected in
    /// the status line.
    pub fn send_raw(&self, forward: &str, lateral: &str, vertical: &str) -> Result<()> {
        match CommandVector::parse(forward, lateral, vertical) {
            Ok(vector) => self.send(vector),
            Err(e) => {
                warn!("rejected command input: {e}");
                self.session.set_status(format!("Rejected: {e}"));
                Err(e)
            }
        }
    }
}
