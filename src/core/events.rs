//! Core Events
//!
//! This module defines the events used for communication between the telemetry
//! channel and the monitor session. Events are central to the application's
//! event-driven architecture: all core state is mutated only in response to
//! them, in the order the transport produced them.

use crate::model::telemetry::VitalsReading;

/// Lifecycle and data events emitted by a telemetry channel.
///
/// For a single connection attempt, exactly one `Opened` or `Errored` event
/// precedes any `Message` event. After `Errored` or `Closed` the channel is
/// terminal; a new channel must be opened to resume ingestion.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelEvent {
    /// The transport handshake completed and the connection is live.
    Opened,
    /// A decoded vitals reading arrived on the live connection.
    Message(VitalsReading),
    /// The transport failed, either during connect or mid-stream.
    ///
    /// # Fields
    /// - `String`: A human-readable description of the failure.
    Errored(String),
    /// The connection was closed by the remote end.
    Closed,
}
