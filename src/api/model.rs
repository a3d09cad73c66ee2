//! This module defines the read only API for interacting with the monitor
//! model. It is the boundary the presentation layer pulls from: connection
//! state, rolling channel histories, and the latest full reading.

use std::{fmt::Debug, sync::Arc};
use time::Duration;
use tokio::sync::RwLock;

use crate::model::telemetry::{ConnectionState, VitalChannel, VitalsReading};

/// `MonitorModelApi` trait.
///
/// Defines the read-only interface over a monitor session's state. All
/// getters are pull-based; the presentation layer decides its own refresh
/// cadence.
pub trait MonitorModelApi: Debug + Send + Sync {
    /// Retrieves the current connection state.
    ///
    /// # Returns
    /// A reference to the `ConnectionState` derived from channel events.
    fn get_connection_state(&self) -> &ConnectionState;

    /// Retrieves the rolling history of a plotted channel.
    ///
    /// The returned vector is a copy taken under the model lock, so it is
    /// always a consistent view: exactly `capacity` samples, oldest first,
    /// positionally stable for the x-axis.
    ///
    /// # Returns
    /// `None` if the channel is not plotted by this session.
    fn get_history(&self, channel: VitalChannel) -> Option<Vec<f64>>;

    /// Retrieves the most recent full reading.
    ///
    /// # Returns
    /// `None` until the first message of the session arrives.
    fn get_latest_reading(&self) -> Option<&VitalsReading>;

    /// Retrieves the channels this session plots.
    fn get_channels(&self) -> Vec<VitalChannel>;

    /// Retrieves the number of readings ingested so far.
    fn get_reading_count(&self) -> usize;

    /// Retrieves the elapsed time since the session was constructed.
    ///
    /// # Returns
    /// A `Duration` representing the elapsed time.
    fn get_elapsed_time(&self) -> Duration;
}

pub type ModelHandle<T> = Arc<RwLock<T>>;
