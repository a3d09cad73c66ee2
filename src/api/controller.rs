//! Controller Module
//!
//! This module defines the mutating traits of the application: the telemetry
//! channel lifecycle, the event-ingestion API of the monitor model, and the
//! transport seams the channel component is built against. Keeping the
//! transport behind traits lets tests drive a channel with a mocked link
//! instead of a live websocket.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::events::ChannelEvent;

use super::model::MonitorModelApi;

/// TelemetryApi trait
///
/// This trait defines the asynchronous API for the lifecycle of a telemetry
/// channel. A channel instance supports at most one connection attempt over
/// its lifetime; reconnection means constructing and opening a new channel.
#[async_trait]
pub trait TelemetryApi {
    /// Open a connection to the given endpoint.
    ///
    /// Emits exactly one `Opened` or `Errored` event before any `Message`
    /// event. Returns an error only on misuse (the channel was already
    /// opened); transport failures are reported through events.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The transport URL to connect to.
    async fn open(&mut self, endpoint: &str) -> Result<()>;

    /// Close the channel.
    ///
    /// Idempotent. When this method returns, no further events from this
    /// channel will be delivered.
    async fn close(&mut self) -> Result<()>;
}

/// MonitorApi trait
///
/// This trait extends the read-only `MonitorModelApi` with the single
/// mutation path of the core: applying a channel event. The state machine,
/// the rolling buffers, and the latest-snapshot store are all updated
/// synchronously within one call, so readers never observe a partially
/// applied event.
#[async_trait]
pub trait MonitorApi: MonitorModelApi {
    /// Apply a channel event to the session state.
    ///
    /// # Arguments
    ///
    /// * `event` - The `ChannelEvent` to apply, in transport order.
    async fn apply_event(&mut self, event: ChannelEvent) -> Result<()>;
}

/// TransportLink trait
///
/// An established transport connection delivering raw text frames. Returned
/// by a [`TransportConnector`] and consumed by the channel's reader task.
#[async_trait]
pub trait TransportLink: Send + 'static {
    /// Receive the next text frame.
    ///
    /// # Returns
    /// `Ok(Some(frame))` for a frame, `Ok(None)` when the remote end closed
    /// the connection cleanly, `Err` on a transport failure.
    async fn next_frame(&mut self) -> Result<Option<String>>;

    /// Shut the connection down.
    async fn shutdown(&mut self) -> Result<()>;
}

/// TransportConnector trait
///
/// Factory for transport connections. The production implementation speaks
/// websocket; tests substitute a mock.
#[async_trait]
pub trait TransportConnector: Send + Sync + 'static {
    /// The link type produced by a successful connect.
    type Link: TransportLink;

    /// Establish a connection to `endpoint`.
    async fn connect(&self, endpoint: &str) -> Result<Self::Link>;
}
