//! Telemetry Channel Component
//!
//! This module implements the telemetry channel over a websocket transport.
//! It handles the connection lifecycle, frame decoding, and delivery of
//! channel events onto the application event bus in transport order.
use crate::api::controller::{TelemetryApi, TransportConnector, TransportLink};
use crate::core::constants::CONNECT_FAILED_MSG;
use crate::core::events::ChannelEvent;
use crate::model::telemetry::VitalsReading;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use log::{trace, warn};
use tokio::net::TcpStream;
use tokio::sync::broadcast::Sender;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Websocket implementation of [`TransportConnector`].
#[derive(Debug, Default)]
pub struct WsConnector;

/// An established websocket connection.
pub struct WsLink {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl TransportConnector for WsConnector {
    type Link = WsLink;

    async fn connect(&self, endpoint: &str) -> Result<WsLink> {
        let (stream, _) = connect_async(endpoint).await?;
        Ok(WsLink { stream })
    }
}

#[async_trait]
impl TransportLink for WsLink {
    async fn next_frame(&mut self) -> Result<Option<String>> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(_) => return Ok(None),
                // Control and binary frames carry no readings.
                _ => {}
            }
        }
        Ok(None)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.stream.close(None).await.ok();
        Ok(())
    }
}

/// Manages one telemetry connection and its reader task.
///
/// # Type Parameters
/// - `C`: Transport connector used to establish the connection
///
/// # Fields
/// - `event_bus`: Channel for broadcasting lifecycle and data events
/// - `connector`: Transport factory, swapped for a mock in tests
/// - `reader_handle`: Task handle for the frame reader
/// - `opened`: Set by the first `open` call; a channel instance supports a
///   single connection attempt
#[derive(Debug)]
pub struct TelemetryChannel<C: TransportConnector> {
    event_bus: Sender<ChannelEvent>,
    connector: C,
    reader_handle: Option<JoinHandle<()>>,
    opened: bool,
}

impl<C: TransportConnector> Drop for TelemetryChannel<C> {
    /// Ensures the reader task stops emitting events when the channel is
    /// dropped without an explicit close.
    fn drop(&mut self) {
        if let Some(handle) = &self.reader_handle {
            handle.abort();
        }
    }
}

impl<C: TransportConnector> TelemetryChannel<C> {
    /// Creates a new `TelemetryChannel`.
    ///
    /// # Arguments
    /// - `connector`: The transport connector to establish connections with.
    /// - `event_bus`: The event bus for broadcasting channel events.
    ///
    /// # Returns
    /// A new `TelemetryChannel` instance.
    pub fn new(connector: C, event_bus: Sender<ChannelEvent>) -> Self {
        Self {
            event_bus,
            connector,
            reader_handle: None,
            opened: false,
        }
    }

    fn spawn_reader(&mut self, mut link: C::Link) {
        let tx = self.event_bus.clone();
        self.reader_handle = Some(tokio::spawn(async move {
            loop {
                // Yield so an abort from close() always finds a cancellation
                // point, even when the link has frames ready back to back.
                tokio::task::yield_now().await;
                match link.next_frame().await {
                    Ok(Some(frame)) => match serde_json::from_str::<VitalsReading>(&frame) {
                        Ok(reading) => {
                            if tx.send(ChannelEvent::Message(reading)).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            // Decode failures are local: the frame is dropped
                            // and the connection stays live.
                            warn!("dropping undecodable reading: {}", e);
                        }
                    },
                    Ok(None) => {
                        let _ = link.shutdown().await;
                        let _ = tx.send(ChannelEvent::Closed);
                        break;
                    }
                    Err(e) => {
                        let _ = link.shutdown().await;
                        let _ = tx.send(ChannelEvent::Errored(e.to_string()));
                        break;
                    }
                }
            }
        }));
    }
}

#[async_trait]
impl<C: TransportConnector> TelemetryApi for TelemetryChannel<C> {
    async fn open(&mut self, endpoint: &str) -> Result<()> {
        if self.opened {
            return Err(anyhow!("channel already opened"));
        }
        self.opened = true;
        match self.connector.connect(endpoint).await {
            Ok(link) => {
                trace!("telemetry connected to {}", endpoint);
                let _ = self.event_bus.send(ChannelEvent::Opened);
                self.spawn_reader(link);
            }
            Err(e) => {
                // A refused connection is an event, not a call error: the
                // state machine learns about it like any other transition.
                warn!("telemetry connect to {} failed: {}", endpoint, e);
                let _ = self
                    .event_bus
                    .send(ChannelEvent::Errored(CONNECT_FAILED_MSG.to_string()));
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
            // Wait the reader out so no event can be emitted after we return.
            let _ = handle.await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::{mock, Sequence};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::broadcast;
    use tokio::sync::broadcast::error::TryRecvError;

    mock! {
        Link{}

        #[async_trait]
        impl TransportLink for Link {
            async fn next_frame(&mut self) -> Result<Option<String>>;
            async fn shutdown(&mut self) -> Result<()>;
        }
    }

    mock! {
        Connector{}

        #[async_trait]
        impl TransportConnector for Connector {
            type Link = MockLink;

            async fn connect(&self, endpoint: &str) -> Result<MockLink>;
        }
    }

    fn scripted_link(frames: Vec<&str>) -> MockLink {
        let queue = Arc::new(Mutex::new(
            frames
                .into_iter()
                .map(str::to_string)
                .collect::<VecDeque<_>>(),
        ));
        let mut link = MockLink::new();
        link.expect_next_frame()
            .returning(move || Ok(queue.lock().unwrap().pop_front()));
        link.expect_shutdown().returning(|| Ok(()));
        link
    }

    fn channel_with_link(
        link: MockLink,
    ) -> (
        TelemetryChannel<MockConnector>,
        broadcast::Receiver<ChannelEvent>,
    ) {
        let mut connector = MockConnector::new();
        connector.expect_connect().return_once(move |_| Ok(link));
        let (tx, rx) = broadcast::channel(16);
        (TelemetryChannel::new(connector, tx), rx)
    }

    #[tokio::test]
    async fn test_open_emits_opened_then_messages_in_order() {
        let link = scripted_link(vec![r#"{"vitals":{"hr":72}}"#, r#"{"vitals":{"hr":75}}"#]);
        let (mut channel, mut rx) = channel_with_link(link);

        assert!(channel.open("ws://test").await.is_ok());
        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Opened);
        for expected in [72.0, 75.0] {
            match rx.recv().await.unwrap() {
                ChannelEvent::Message(reading) => {
                    assert_eq!(reading.heart_rate(), Some(expected))
                }
                other => panic!("expected Message, got {:?}", other),
            }
        }
        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Closed);
    }

    #[tokio::test]
    async fn test_decode_error_drops_frame_keeps_stream() {
        let link = scripted_link(vec!["not json at all", r#"{"vitals":{"hr":75}}"#]);
        let (mut channel, mut rx) = channel_with_link(link);

        assert!(channel.open("ws://test").await.is_ok());
        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Opened);
        // The garbage frame is dropped without an event; the next valid
        // reading still arrives.
        match rx.recv().await.unwrap() {
            ChannelEvent::Message(reading) => assert_eq!(reading.heart_rate(), Some(75.0)),
            other => panic!("expected Message, got {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Closed);
    }

    #[tokio::test]
    async fn test_connect_failure_emits_errored() {
        let mut connector = MockConnector::new();
        connector
            .expect_connect()
            .return_once(|_| Err(anyhow!("connection refused")));
        let (tx, mut rx) = broadcast::channel(16);
        let mut channel = TelemetryChannel::new(connector, tx);

        assert!(channel.open("ws://nowhere").await.is_ok());
        assert_eq!(
            rx.recv().await.unwrap(),
            ChannelEvent::Errored(CONNECT_FAILED_MSG.to_string())
        );
    }

    #[tokio::test]
    async fn test_transport_error_emits_errored() {
        let mut seq = Sequence::new();
        let mut link = MockLink::new();
        link.expect_next_frame()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(anyhow!("socket reset")));
        link.expect_shutdown().returning(|| Ok(()));
        let (mut channel, mut rx) = channel_with_link(link);

        assert!(channel.open("ws://test").await.is_ok());
        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Opened);
        assert_eq!(
            rx.recv().await.unwrap(),
            ChannelEvent::Errored("socket reset".to_string())
        );
    }

    #[tokio::test]
    async fn test_double_open_rejected() {
        let link = scripted_link(vec![]);
        let (mut channel, _rx) = channel_with_link(link);

        assert!(channel.open("ws://test").await.is_ok());
        assert!(channel.open("ws://test").await.is_err());
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_silences_events() {
        let mut link = MockLink::new();
        link.expect_next_frame()
            .returning(|| Ok(Some(r#"{"vitals":{"hr":80}}"#.to_string())));
        link.expect_shutdown().returning(|| Ok(()));
        let (mut channel, mut rx) = channel_with_link(link);

        assert!(channel.open("ws://test").await.is_ok());
        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Opened);

        assert!(channel.close().await.is_ok());
        assert!(channel.close().await.is_ok());

        // Drain whatever was emitted before close returned; afterwards the
        // bus must stay silent.
        loop {
            match rx.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
