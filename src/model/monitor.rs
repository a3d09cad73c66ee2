//! Monitor Model
//!
//! This module defines the model for a live monitoring session: the
//! fixed-capacity rolling buffers that feed the chart, the latest-snapshot
//! store, and the connection state. All of it is owned by one session and
//! mutated only through [`MonitorApi::apply_event`].

use crate::api::controller::MonitorApi;
use crate::api::model::MonitorModelApi;
use crate::core::constants::{HISTORY_CAPACITY, HISTORY_FILL_VALUE, MISSING_SAMPLE_FALLBACK};
use crate::core::events::ChannelEvent;
use crate::model::telemetry::{ConnectionState, VitalChannel, VitalsReading};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use time::{Duration, OffsetDateTime};

/// Fixed-capacity sample sequence for plotting.
///
/// The buffer holds exactly `capacity` samples from construction onward: a
/// push appends at the tail and evicts the head, so indices `0..capacity`
/// are positionally stable for the x-axis and ordered oldest to newest.
#[derive(Debug, Clone)]
pub struct RollingBuffer {
    /// Stored samples, oldest at the front.
    samples: VecDeque<f64>,
    /// Fixed number of samples, set at construction.
    capacity: usize,
}

impl RollingBuffer {
    /// Creates a buffer of exactly `capacity` samples, all `fill_value`.
    pub fn new(capacity: usize, fill_value: f64) -> Self {
        let mut samples = VecDeque::with_capacity(capacity);
        samples.resize(capacity, fill_value);
        Self { samples, capacity }
    }

    /// Appends `sample` as the new tail and evicts the current head.
    ///
    /// The length invariant holds before and after every call.
    pub fn push(&mut self, sample: f64) {
        if self.capacity == 0 {
            return;
        }
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    /// Returns the current contents, oldest to newest.
    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Current number of samples; always equals the capacity.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` only for a zero-capacity buffer.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The fixed capacity set at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Represents the state of one monitoring session.
///
/// # Fields
/// - `state`: Connection state machine, derived from channel events
/// - `histories`: One rolling buffer per plotted channel
/// - `latest`: Most recent full reading, `None` before the first message
/// - `reading_count`: Number of readings ingested
/// - `start_time`: Construction time, for elapsed-time display
#[derive(Debug)]
pub struct MonitorModel {
    state: ConnectionState,
    histories: Vec<(VitalChannel, RollingBuffer)>,
    latest: Option<VitalsReading>,
    reading_count: usize,
    start_time: OffsetDateTime,
}

impl MonitorModel {
    /// Creates a model plotting the given channels.
    ///
    /// # Arguments
    /// - `channels`: The channels to keep a rolling history for.
    /// - `capacity`: History length per channel, fixed for the session.
    pub fn new(channels: &[VitalChannel], capacity: usize) -> Self {
        Self {
            state: ConnectionState::Connecting,
            histories: channels
                .iter()
                .map(|&c| (c, RollingBuffer::new(capacity, HISTORY_FILL_VALUE)))
                .collect(),
            latest: None,
            reading_count: 0,
            start_time: OffsetDateTime::now_utc(),
        }
    }

    /// Ingests one reading into the buffers and the latest-snapshot store.
    ///
    /// A channel whose field is absent from the reading gets the chart
    /// fallback so the series stays positionally aligned across channels.
    fn ingest(&mut self, reading: VitalsReading) -> Result<()> {
        if !self.state.is_connected() {
            return Err(anyhow!(
                "reading received while {}, dropping it",
                self.state
            ));
        }
        for (channel, history) in self.histories.iter_mut() {
            history.push(channel.extract(&reading).unwrap_or(MISSING_SAMPLE_FALLBACK));
        }
        self.latest = Some(reading);
        self.reading_count += 1;
        Ok(())
    }
}

impl Default for MonitorModel {
    fn default() -> Self {
        Self::new(&[VitalChannel::HeartRate], HISTORY_CAPACITY)
    }
}

#[async_trait]
impl MonitorApi for MonitorModel {
    async fn apply_event(&mut self, event: ChannelEvent) -> Result<()> {
        // The state transition never suppresses a reading: a Message that
        // arrives in a non-connected state is rejected by ingest while the
        // state machine stays untouched by it.
        let next = self.state.transition(&event);
        let result = match event {
            ChannelEvent::Message(reading) => self.ingest(reading),
            _ => Ok(()),
        };
        self.state = next;
        result
    }
}

impl MonitorModelApi for MonitorModel {
    fn get_connection_state(&self) -> &ConnectionState {
        &self.state
    }

    fn get_history(&self, channel: VitalChannel) -> Option<Vec<f64>> {
        self.histories
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, history)| history.snapshot())
    }

    fn get_latest_reading(&self) -> Option<&VitalsReading> {
        self.latest.as_ref()
    }

    fn get_channels(&self) -> Vec<VitalChannel> {
        self.histories.iter().map(|(c, _)| *c).collect()
    }

    fn get_reading_count(&self) -> usize {
        self.reading_count
    }

    fn get_elapsed_time(&self) -> Duration {
        OffsetDateTime::now_utc() - self.start_time
    }
}
