//! Monitor Session Component
//!
//! This module defines the session object that owns all core state for one
//! active view: it subscribes to the event bus and applies channel events to
//! the monitor model in the order they were produced. Tearing the session
//! down stops the consumer task, so no event can mutate a disposed model.
use crate::api::controller::MonitorApi;
use crate::api::model::{ModelHandle, MonitorModelApi};
use crate::core::events::ChannelEvent;
use anyhow::Result;
use log::{trace, warn};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Owns the monitor model and the event-consumer task for one view lifetime.
///
/// # Type Parameters
/// - `MT`: Monitor model type driven by this session
pub struct MonitorSession<MT: MonitorApi + 'static> {
    model: Arc<RwLock<MT>>,
    listener_handle: Option<JoinHandle<()>>,
}

impl<MT: MonitorApi + 'static> MonitorSession<MT> {
    /// Starts a session consuming `events` into `model`.
    ///
    /// Events are applied one at a time; each handler invocation runs to
    /// completion under the model's write lock before the next event is
    /// taken, so readers always observe a consistent view.
    ///
    /// # Arguments
    /// - `model`: The shared monitor model to drive.
    /// - `events`: A subscription to the channel event bus.
    pub fn start(model: Arc<RwLock<MT>>, mut events: Receiver<ChannelEvent>) -> Self {
        let consumer = model.clone();
        let listener_handle = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let mut lck = consumer.write().await;
                        if let Err(e) = lck.apply_event(event).await {
                            warn!("event dropped: {}", e);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("event bus lagged, {} events lost", skipped);
                    }
                    Err(RecvError::Closed) => {
                        trace!("event bus closed, session consumer stopping");
                        break;
                    }
                }
            }
        }));
        Self {
            model,
            listener_handle,
        }
    }

    /// Returns the read-only handle the presentation layer pulls from.
    pub fn model(&self) -> ModelHandle<dyn MonitorModelApi> {
        self.model.clone()
    }

    /// Stops the consumer task.
    ///
    /// When this method returns, no further event can mutate the model,
    /// regardless of subsequent transport activity.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(handle) = self.listener_handle.take() {
            handle.abort();
            let _ = handle.await;
        }
        Ok(())
    }
}

impl<MT: MonitorApi + 'static> Drop for MonitorSession<MT> {
    /// Stops the consumer when the session is dropped without an explicit
    /// shutdown.
    fn drop(&mut self) {
        if let Some(handle) = &self.listener_handle {
            handle.abort();
        }
    }
}
