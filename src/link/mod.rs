//! # Link Module
//!
//! MAVLink transport to the vehicle autopilot.
//!
//! This module handles:
//! - Opening the link from a MAVLink connection string (UDP, TCP or serial)
//! - The blocking heartbeat handshake that gates the rest of the session
//! - Blocking receive of ATTITUDE reports for the ingestion worker
//! - Fire-and-forget MANUAL_CONTROL sends for the command dispatcher
//!
//! The rest of the crate only sees the [`LinkTransport`] trait, so the
//! concrete transport (UDP vs serial) stays a configuration detail. A
//! malformed or unrelated inbound message surfaces as `Ok(None)` and is
//! skipped by the caller; only a transport-level failure is an error.

use mavlink::common::{MavMessage, MANUAL_CONTROL_DATA};
use mavlink::error::MessageReadError;
use mavlink::{MavConnection, MavHeader};
use tracing::{debug, info, warn};

use crate::error::{HoverConsoleError, Result};

/// Default MAVLink endpoint (UDP listen on the standard GCS port)
pub const DEFAULT_ENDPOINT: &str = "udpin:0.0.0.0:14550";

/// System ID this console reports itself as (conventional GCS ID)
pub const GCS_SYSTEM_ID: u8 = 255;

/// Component ID this console reports itself as
pub const GCS_COMPONENT_ID: u8 = 190;

/// Minimum accepted value for a MANUAL_CONTROL axis
pub const MANUAL_CONTROL_MIN: i16 = -1000;

/// Maximum accepted value for a MANUAL_CONTROL axis
pub const MANUAL_CONTROL_MAX: i16 = 1000;

/// One decoded ATTITUDE report, angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeReport {
    pub roll_rad: f64,
    pub pitch_rad: f64,
    pub yaw_rad: f64,
}

/// Transport seam between the console core and the vehicle link
///
/// Implementations must allow `recv_report` and `send_manual_control` to be
/// called concurrently from different threads: a blocked receive must never
/// stall a send.
pub trait LinkTransport: Send + Sync {
    /// Block until the next inbound message and decode it
    ///
    /// # Returns
    ///
    /// * `Ok(Some(report))` - an ATTITUDE report was received
    /// * `Ok(None)` - a non-attitude or malformed message; skip and receive again
    /// * `Err(TransportDisconnect)` - the link failed permanently
    fn recv_report(&self) -> Result<Option<AttitudeReport>>;

    /// Hand a manual control vector to the transport
    ///
    /// Fire and forget: success means "handed to the transport", not
    /// "received by the vehicle".
    fn send_manual_control(
        &self,
        forward: i16,
        lateral: i16,
        vertical: i16,
        rotation: i16,
        buttons: u16,
    ) -> Result<()>;

    /// The endpoint this link was opened against
    fn endpoint(&self) -> &str;
}

/// MAVLink link to the vehicle
///
/// Wraps a `mavlink` crate connection. The underlying connection serializes
/// reads and writes on separate internal locks, so the ingestion worker's
/// blocking receive does not hold up command dispatch.
pub struct MavlinkLink {
    conn: Box<dyn MavConnection<MavMessage> + Send + Sync>,
    endpoint: String,
    target_system: u8,
}

impl std::fmt::Debug for MavlinkLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MavlinkLink")
            .field("endpoint", &self.endpoint)
            .field("target_system", &self.target_system)
            .finish_non_exhaustive()
    }
}

impl MavlinkLink {
    /// Open the link and perform the heartbeat handshake
    ///
    /// Blocks until the first HEARTBEAT arrives from the vehicle; the caller
    /// is responsible for bounding this wait (the binary wraps it in a
    /// timeout). The heartbeat's system ID becomes the command target.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - MAVLink connection string, e.g. `udpin:0.0.0.0:14550`
    ///   or `serial:/dev/ttyACM0:57600`
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the endpoint cannot be opened or the link
    /// fails before a heartbeat is seen.
    pub fn connect(endpoint: &str) -> Result<Self> {
        debug!("opening MAVLink endpoint {}", endpoint);
        let conn = mavlink::connect::<MavMessage>(endpoint).map_err(|e| {
            HoverConsoleError::Connection(format!("failed to open {endpoint}: {e}"))
        })?;

        // Handshake: nothing else may act until the vehicle proves alive.
        let target_system = loop {
            match conn.recv() {
                Ok((header, MavMessage::HEARTBEAT(_))) => break header.system_id,
                Ok((_, other)) => {
                    debug!("ignoring pre-handshake message: {}", message_name(&other));
                }
                Err(MessageReadError::Io(e)) => {
                    return Err(HoverConsoleError::Connection(format!(
                        "link failed while waiting for heartbeat: {e}"
                    )));
                }
                Err(e) => {
                    warn!("malformed message during handshake: {e}");
                }
            }
        };

        info!(
            "heartbeat received from system {} at {}",
            target_system, endpoint
        );
        Ok(Self {
            conn,
            endpoint: endpoint.to_string(),
            target_system,
        })
    }

    /// System ID of the vehicle that answered the handshake
    pub fn target_system(&self) -> u8 {
        self.target_system
    }

    fn header(&self) -> MavHeader {
        MavHeader {
            system_id: GCS_SYSTEM_ID,
            component_id: GCS_COMPONENT_ID,
            sequence: 0,
        }
    }
}

impl LinkTransport for MavlinkLink {
    fn recv_report(&self) -> Result<Option<AttitudeReport>> {
        match self.conn.recv() {
            Ok((_, MavMessage::ATTITUDE(attitude))) => Ok(Some(AttitudeReport {
                roll_rad: f64::from(attitude.roll),
                pitch_rad: f64::from(attitude.pitch),
                yaw_rad: f64::from(attitude.yaw),
            })),
            Ok((_, other)) => {
                debug!("skipping non-attitude message: {}", message_name(&other));
                Ok(None)
            }
            Err(MessageReadError::Io(e)) => Err(HoverConsoleError::TransportDisconnect(format!(
                "receive failed on {}: {e}",
                self.endpoint
            ))),
            Err(e) => {
                // Single bad message: skip it and receive again.
                warn!("malformed message on {}: {e}", self.endpoint);
                Ok(None)
            }
        }
    }

    fn send_manual_control(
        &self,
        forward: i16,
        lateral: i16,
        vertical: i16,
        rotation: i16,
        buttons: u16,
    ) -> Result<()> {
        let message = MavMessage::MANUAL_CONTROL(MANUAL_CONTROL_DATA {
            target: self.target_system,
            x: forward,
            y: lateral,
            z: vertical,
            r: rotation,
            buttons,
            ..Default::default()
        });

        self.conn.send(&self.header(), &message).map_err(|e| {
            HoverConsoleError::TransportDisconnect(format!(
                "send failed on {}: {e}",
                self.endpoint
            ))
        })?;

        debug!(
            "sent MANUAL_CONTROL x={} y={} z={} r={} buttons={}",
            forward, lateral, vertical, rotation, buttons
        );
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn message_name(message: &MavMessage) -> &'static str {
    match message {
        MavMessage::HEARTBEAT(_) => "HEARTBEAT",
        MavMessage::ATTITUDE(_) => "ATTITUDE",
        MavMessage::SYS_STATUS(_) => "SYS_STATUS",
        MavMessage::STATUSTEXT(_) => "STATUSTEXT",
        _ => "other",
    }
}
