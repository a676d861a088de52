//! Typed message channel between the host and the background state.
//!
//! Requests travel over a bounded tokio mpsc queue. Request/response messages
//! carry a oneshot reply sender; fire-and-forget messages carry none.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::types::errors::MessageError;
use crate::types::message::Request;

pub type Reply = Result<Value, String>;

/// One queued message.
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub reply: Option<oneshot::Sender<Reply>>,
}

/// Sending half; cheap to clone.
#[derive(Debug, Clone)]
pub struct MessageChannel {
    tx: mpsc::Sender<Envelope>,
}

/// Receiving half, owned by the background state.
#[derive(Debug)]
pub struct MessageReceiver {
    rx: mpsc::Receiver<Envelope>,
}

pub fn channel(capacity: usize) -> (MessageChannel, MessageReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (MessageChannel { tx }, MessageReceiver { rx })
}

impl MessageChannel {
    /// Sends a request/response message and waits for the reply.
    pub async fn request(&self, request: Request) -> Result<Value, MessageError> {
        if request.is_fire_and_forget() {
            return Err(MessageError::InvalidRequest(format!(
                "{} does not take a reply",
                request.method()
            )));
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                request,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| MessageError::ChannelClosed)?;

        match reply_rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(msg)) => Err(MessageError::HandlerFailed(msg)),
            Err(_) => Err(MessageError::NoReply),
        }
    }

    /// Sends a fire-and-forget message.
    pub async fn notify(&self, request: Request) -> Result<(), MessageError> {
        if !request.is_fire_and_forget() {
            return Err(MessageError::InvalidRequest(format!(
                "{} expects a reply, use request()",
                request.method()
            )));
        }
        self.tx
            .send(Envelope { request, reply: None })
            .await
            .map_err(|_| MessageError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl MessageReceiver {
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Runs `handler` for every message until all senders are dropped.
    /// Returns the number of messages handled.
    pub async fn serve<F>(mut self, mut handler: F) -> usize
    where
        F: FnMut(Request) -> Reply,
    {
        let mut handled = 0;
        while let Some(envelope) = self.rx.recv().await {
            let method = envelope.request.method();
            let result = handler(envelope.request);
            handled += 1;

            match envelope.reply {
                Some(reply) => {
                    if reply.send(result).is_err() {
                        debug!(method, "requester went away before the reply");
                    }
                }
                None => {
                    if let Err(e) = result {
                        warn!(method, error = %e, "fire-and-forget message failed");
                    }
                }
            }
        }
        debug!(handled, "message channel drained");
        handled
    }
}
