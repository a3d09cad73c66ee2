//! Telemetry Model
//!
//! This module defines the data structures for vitals telemetry readings and
//! the connection state machine. It provides abstractions for:
//! - Structured vitals payloads with optional nested field groups
//! - Per-channel scalar extraction for plotting
//! - Event-driven connection state tracking

use crate::core::constants::{DISCONNECTED_MSG, DISPLAY_PLACEHOLDER};
use crate::core::events::ChannelEvent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One telemetry sample as produced by the monitoring source.
///
/// Every field group is optional: the wire schema is source-defined and the
/// client must tolerate absent groups and absent fields within a group.
/// Unknown fields are ignored on decode.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VitalsReading {
    /// Cardiac signals (ECG magnitude and heart rate).
    pub vitals: Option<CardiacVitals>,
    /// Body temperature probes.
    pub temperature: Option<TemperatureVitals>,
    /// Pulse oximetry readings.
    pub spo2: Option<OximetryVitals>,
    /// Non-invasive blood pressure readings.
    #[serde(rename = "bloodPressure")]
    pub blood_pressure: Option<BloodPressureVitals>,
}

/// Cardiac group of a [`VitalsReading`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CardiacVitals {
    /// ECG signal magnitude.
    pub ecg: Option<f64>,
    /// Heart rate in beats per minute.
    pub hr: Option<f64>,
}

/// Temperature group of a [`VitalsReading`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TemperatureVitals {
    /// Primary probe temperature in °C.
    pub temp1: Option<f64>,
    /// Secondary probe temperature in °C.
    pub temp2: Option<f64>,
}

/// Pulse oximetry group of a [`VitalsReading`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OximetryVitals {
    /// Oxygen saturation in percent.
    #[serde(rename = "spo2Value")]
    pub spo2_value: Option<f64>,
    /// Pulse rate reported by the oximeter in beats per minute.
    #[serde(rename = "pulseRate")]
    pub pulse_rate: Option<f64>,
}

/// Blood pressure group of a [`VitalsReading`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BloodPressureVitals {
    /// Systolic pressure in mmHg.
    pub systolic: Option<f64>,
    /// Diastolic pressure in mmHg.
    pub diastolic: Option<f64>,
    /// Mean arterial pressure in mmHg.
    pub mean: Option<f64>,
    /// Pulse rate reported by the cuff in beats per minute.
    #[serde(rename = "pulseRate")]
    pub pulse_rate: Option<f64>,
}

impl VitalsReading {
    /// Heart rate in BPM, if present.
    pub fn heart_rate(&self) -> Option<f64> {
        self.vitals.as_ref().and_then(|v| v.hr)
    }

    /// ECG signal magnitude, if present.
    pub fn ecg(&self) -> Option<f64> {
        self.vitals.as_ref().and_then(|v| v.ecg)
    }

    /// Oxygen saturation in percent, if present.
    pub fn oxygen_saturation(&self) -> Option<f64> {
        self.spo2.as_ref().and_then(|s| s.spo2_value)
    }
}

/// Formats an optional vitals field for text display.
///
/// Absent fields render as the placeholder, never as a number. A fabricated
/// zero in a displayed field would be indistinguishable from a real reading.
pub fn display_vital(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.0}", v))
        .unwrap_or_else(|| DISPLAY_PLACEHOLDER.to_string())
}

/// Identifies one plottable scalar series extracted from incoming readings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VitalChannel {
    /// Heart rate from the cardiac group.
    HeartRate,
    /// Oxygen saturation from the oximetry group.
    OxygenSaturation,
}

impl VitalChannel {
    /// Extracts this channel's scalar from a reading, if the field is present.
    pub fn extract(&self, reading: &VitalsReading) -> Option<f64> {
        match self {
            VitalChannel::HeartRate => reading.heart_rate(),
            VitalChannel::OxygenSaturation => reading.oxygen_saturation(),
        }
    }
}

impl fmt::Display for VitalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VitalChannel::HeartRate => write!(f, "heart rate"),
            VitalChannel::OxygenSaturation => write!(f, "oxygen saturation"),
        }
    }
}

/// Connection state of a telemetry channel, derived purely from channel
/// events.
///
/// Exactly one value holds at any time. `Error` is terminal for the current
/// channel instance: recovery requires opening a new channel, which starts a
/// fresh state machine in `Connecting`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConnectionState {
    /// Initial state while the transport handshake is in flight.
    #[default]
    Connecting,
    /// The connection is live and readings may arrive.
    Connected,
    /// The connection failed or was closed; the message describes why.
    Error(String),
}

impl ConnectionState {
    /// Returns the state that follows `self` after observing `event`.
    ///
    /// `Message` events never change state; `Error` absorbs all further
    /// events.
    pub fn transition(&self, event: &ChannelEvent) -> ConnectionState {
        if let ConnectionState::Error(_) = self {
            return self.clone();
        }
        match event {
            ChannelEvent::Opened => ConnectionState::Connected,
            ChannelEvent::Message(_) => self.clone(),
            ChannelEvent::Errored(msg) => ConnectionState::Error(msg.clone()),
            ChannelEvent::Closed => ConnectionState::Error(DISCONNECTED_MSG.to_string()),
        }
    }

    /// `true` while the channel is live and readings are being ingested.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}
