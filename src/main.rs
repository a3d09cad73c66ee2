//! Vitals Monitor Client
//!
//! This tool attaches to a streaming vital-signs telemetry endpoint,
//! maintains bounded rolling histories of the plotted channels, and keeps
//! the latest full reading available for display. It integrates modules for
//! the websocket channel, the connection state machine, and the monitor
//! session that feeds a presentation layer.

use crate::api::controller::TelemetryApi;
use crate::api::model::MonitorModelApi;
use crate::components::session::MonitorSession;
use crate::components::telemetry::{TelemetryChannel, WsConnector};
use crate::core::constants::{DEFAULT_ENDPOINT, EVENT_BUS_CAPACITY, HISTORY_CAPACITY};
use crate::model::monitor::MonitorModel;
use crate::model::telemetry::{display_vital, ConnectionState, VitalChannel};
use env_logger::Env;
use log::{error, info, trace};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Core utilities shared throughout the application.
mod core {
    /// Application-wide constants.
    pub mod constants;
    /// Event system for channel-to-session communication.
    pub mod events;
}

/// Trait definitions forming the application's seams.
mod api {
    /// Mutating APIs and transport seams.
    pub mod controller;
    /// Read-only model APIs for the presentation layer.
    pub mod model;
}

/// Data models representing the application's domain.
mod model {
    /// Rolling buffers and the monitor session state.
    pub mod monitor;
    /// Vitals readings and the connection state machine.
    pub mod telemetry;
}

/// Components implementing the application's behavior.
mod components {
    /// Event-consumer session owning the core state.
    pub mod session;
    /// Websocket telemetry channel.
    pub mod telemetry;
}

/// Main entry point of the application.
///
/// Initializes logging, wires the event bus, session, and telemetry channel,
/// and periodically prints the latest vitals until the connection ends or
/// the user interrupts.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        Env::default()
            .filter_or("VITALS_LOG_LEVEL", "info")
            .write_style_or("VITALS_LOG_STYLE", "always"),
    )
    .init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let (event_bus, _) = broadcast::channel(EVENT_BUS_CAPACITY);
    let model = Arc::new(RwLock::new(MonitorModel::new(
        &[VitalChannel::HeartRate, VitalChannel::OxygenSaturation],
        HISTORY_CAPACITY,
    )));
    let mut session = MonitorSession::start(model.clone(), event_bus.subscribe());
    let mut channel = TelemetryChannel::new(WsConnector, event_bus.clone());

    info!("connecting to {}", endpoint);
    channel.open(&endpoint).await?;

    let mut ticker = tokio::time::interval(tokio::time::Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
            _ = ticker.tick() => {
                let lck = model.read().await;
                match lck.get_connection_state() {
                    state @ ConnectionState::Error(_) => {
                        // Terminal for this channel; reconnecting means
                        // starting a fresh session.
                        error!("{}", state);
                        break;
                    }
                    state => {
                        let reading = lck.get_latest_reading();
                        info!(
                            "[{:.0}s] {} | hr {} bpm | spo2 {} % | {} readings",
                            lck.get_elapsed_time().as_seconds_f64(),
                            state,
                            display_vital(reading.and_then(|r| r.heart_rate())),
                            display_vital(reading.and_then(|r| r.oxygen_saturation())),
                            lck.get_reading_count()
                        );
                        for channel in lck.get_channels() {
                            if let Some(history) = lck.get_history(channel) {
                                let tail: Vec<f64> =
                                    history.iter().rev().take(10).rev().copied().collect();
                                trace!("{} tail: {:?}", channel, tail);
                            }
                        }
                    }
                }
            }
        }
    }

    channel.close().await?;
    session.shutdown().await?;
    Ok(())
}
