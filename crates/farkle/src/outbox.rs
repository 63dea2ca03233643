//! The host's ordered outbound queue.
//!
//! Every host → peer message after `welcome` is pushed here and written
//! by one sender task, so the wire order is exactly the order in which
//! the authoritative loop produced the messages. The loop itself never
//! blocks on a socket write, only on a full queue.

use std::sync::Arc;

use farkle_protocol::{Codec, Message};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::FarkleError;
use crate::link::Link;

pub(crate) struct Outbox {
    tx: mpsc::Sender<Message>,
    task: JoinHandle<Result<(), FarkleError>>,
}

impl Outbox {
    /// Starts the sender task draining into `link`.
    pub(crate) fn spawn<C: Codec>(link: Arc<Link<C>>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Message>(capacity.max(1));
        let task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                link.send(&msg).await?;
            }
            Ok(())
        });
        Self { tx, task }
    }

    /// Queues `msg` behind everything pushed before it.
    ///
    /// Fails once the sender task has stopped, which only happens when a
    /// write failed; [`finish`](Self::finish) returns that write error.
    pub(crate) async fn push(&self, msg: Message) -> Result<(), FarkleError> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| FarkleError::ConnectionLost("outbound queue closed".into()))
    }

    /// Closes the queue and waits until everything queued has been written.
    pub(crate) async fn finish(self) -> Result<(), FarkleError> {
        drop(self.tx);
        self.task
            .await
            .map_err(|e| FarkleError::ConnectionLost(format!("sender task failed: {e}")))?
    }
}
