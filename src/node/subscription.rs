//! Websocket event subscriptions against a Tendermint node.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::types::ResultEvent;
use crate::error::{Error, Result};

pub const NEW_BLOCK_QUERY: &str = "tm.event = 'NewBlock'";

const SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(5);
const EVENT_BUFFER: usize = 100;

/// Stops the subscription it was returned with, on `cancel` or on drop
#[derive(Debug)]
pub struct SubscriptionHandle {
    cancel: Option<oneshot::Sender<()>>,
}

impl SubscriptionHandle {
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Deserialize)]
struct EventMessage {
    #[serde(default)]
    result: Option<ResultEvent>,
    #[serde(default)]
    error: Option<Value>,
}

/// `None` for the empty acknowledgement the node sends after subscribing
fn parse_event(text: &str) -> Option<ResultEvent> {
    let message: EventMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            log::warn!("dropping undecodable event: {}", e);
            return None;
        }
    };
    if let Some(error) = message.error {
        log::warn!("subscription error from node: {}", error);
        return None;
    }
    message.result.filter(|event| !event.query.is_empty())
}

/// Open a websocket to `ws_url`, subscribe to `query` and forward events
/// until the handle is cancelled, the node is stopped, or the socket closes.
pub(crate) async fn subscribe(
    ws_url: &str,
    query: &str,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(mpsc::Receiver<ResultEvent>, SubscriptionHandle)> {
    let subscribe_id = uuid::Uuid::new_v4().to_string();
    let request = json!({
        "jsonrpc": "2.0",
        "id": subscribe_id,
        "method": "subscribe",
        "params": {"query": query},
    });

    let mut ws = tokio::time::timeout(SUBSCRIBE_TIMEOUT, async {
        let (mut ws, _) = connect_async(ws_url).await?;
        ws.send(Message::Text(request.to_string())).await?;
        Ok::<_, Error>(ws)
    })
    .await
    .map_err(|_| Error::Unavailable(format!("subscribe to {ws_url} timed out")))??;

    log::debug!("subscribed to {:?} on {}", query, ws_url);

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
    let query = query.to_string();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut cancel_rx => break,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                message = ws.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(event) = parse_event(&text) {
                            match events_tx.try_send(event) {
                                Ok(()) => {}
                                Err(mpsc::error::TrySendError::Full(_)) => {
                                    log::warn!("subscription {:?} consumer is behind, dropping event", query);
                                }
                                Err(mpsc::error::TrySendError::Closed(_)) => break,
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = ws.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::warn!("subscription {:?} closed: {}", query, e);
                        break;
                    }
                }
            }
        }

        let unsubscribe = json!({
            "jsonrpc": "2.0",
            "id": subscribe_id,
            "method": "unsubscribe",
            "params": {"query": query},
        });
        let _ = ws.send(Message::Text(unsubscribe.to_string())).await;
        let _ = ws.close(None).await;
        log::debug!("subscription {:?} ended", query);
    });

    Ok((events_rx, SubscriptionHandle { cancel: Some(cancel_tx) }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    /// Websocket node stand-in: acknowledges the subscription, then pushes
    /// one NewBlock event every few milliseconds until the client goes away.
    /// Text frames received after the subscribe request are forwarded.
    async fn spawn_node() -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (received_tx, received_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let received_tx = received_tx.clone();
                tokio::spawn(async move {
                    let mut ws = accept_async(stream).await.unwrap();
                    let Some(Ok(Message::Text(_))) = ws.next().await else { return };
                    ws.send(Message::Text(r#"{"jsonrpc":"2.0","id":"x","result":{}}"#.into())).await.unwrap();
                    let mut height = 0u64;
                    loop {
                        tokio::select! {
                            incoming = ws.next() => match incoming {
                                Some(Ok(Message::Text(text))) => {
                                    let _ = received_tx.send(text);
                                }
                                Some(Ok(_)) => {}
                                _ => return,
                            },
                            _ = tokio::time::sleep(Duration::from_millis(10)) => {
                                height += 1;
                                let event = json!({
                                    "jsonrpc": "2.0",
                                    "id": "x",
                                    "result": {
                                        "query": NEW_BLOCK_QUERY,
                                        "data": {"type": "tendermint/event/NewBlock", "value": {"height": height}},
                                        "events": {"tm.event": ["NewBlock"]}
                                    }
                                });
                                if ws.send(Message::Text(event.to_string())).await.is_err() {
                                    return;
                                }
                            }
                        }
                    }
                });
            }
        });
        (format!("ws://{addr}/websocket"), received_rx)
    }

    #[test]
    fn test_ack_is_not_an_event() {
        assert!(parse_event(r#"{"jsonrpc":"2.0","id":"1","result":{}}"#).is_none());
        assert!(parse_event(r#"{"jsonrpc":"2.0","id":"1","error":{"code":-32603}}"#).is_none());
        let event = parse_event(r#"{"result":{"query":"tm.event = 'NewBlock'","data":{},"events":{"tm.event":["NewBlock"]}}}"#).unwrap();
        assert_eq!(event.events["tm.event"], vec!["NewBlock".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_stops_only_its_subscription() {
        let (url, _received) = spawn_node().await;
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let (mut first, first_handle) = subscribe(&url, NEW_BLOCK_QUERY, shutdown_rx.clone()).await.unwrap();
        let (mut second, _second_handle) = subscribe(&url, NEW_BLOCK_QUERY, shutdown_rx).await.unwrap();

        assert_eq!(first.recv().await.unwrap().query, NEW_BLOCK_QUERY);
        assert!(second.recv().await.is_some());

        first_handle.cancel();
        while first.recv().await.is_some() {}

        assert!(second.recv().await.is_some());
        assert!(second.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_shutdown_ends_subscriptions() {
        let (url, _received) = spawn_node().await;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (mut events, _handle) = subscribe(&url, NEW_BLOCK_QUERY, shutdown_rx).await.unwrap();
        assert!(events.recv().await.is_some());

        shutdown_tx.send(true).unwrap();
        while events.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn test_cancel_reaches_a_stalled_consumer() {
        let (url, mut received) = spawn_node().await;
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (_events, handle) = subscribe(&url, NEW_BLOCK_QUERY, shutdown_rx).await.unwrap();

        // never read, so the event buffer fills up
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.cancel();

        let unsubscribe = tokio::time::timeout(Duration::from_secs(2), received.recv())
            .await
            .expect("subscription loop did not observe the cancel")
            .unwrap();
        assert!(unsubscribe.contains("\"unsubscribe\""));
    }
}
