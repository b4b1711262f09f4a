//! # Hover Console Library
//!
//! Operator console core for a 3DOF hovercraft Pixhawk testbed.
//!
//! This library provides the telemetry ingestion and cross-context
//! data-sharing core: a background MAVLink reader that never blocks the
//! control surface, a bounded rolling attitude history shared with a
//! periodic renderer, a manual-control command path independent of the
//! ingestion cadence, and an append-only sample log.

pub mod command;
pub mod config;
pub mod error;
pub mod link;
pub mod render;
pub mod samplelog;
pub mod session;
pub mod telemetry;
