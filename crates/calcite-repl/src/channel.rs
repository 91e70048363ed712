//! Request/response multiplexer over the engine's unframed text stream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use crate::marker::{MarkerCounter, SyncMarker};
use crate::repl::Repl;
use crate::{Error, Result};

/// One outstanding request: its completion marker and the waiting caller.
struct Pending {
    marker: SyncMarker,
    tx: oneshot::Sender<Vec<String>>,
}

/// Response lines accumulate in one shared buffer rather than per entry:
/// until a marker echo arrives there is no way to know which request the
/// lines belong to, and the echo itself names the request.
#[derive(Default)]
struct PendingQueue {
    queue: VecDeque<Pending>,
    buffer: Vec<String>,
    closed: bool,
}

/// Driver for one REPL engine session.
///
/// Commands go out paired with a sync marker; a background reader buffers
/// incoming lines until a marker echo of some outstanding request arrives,
/// then resolves that request with the buffer. Requests queued ahead of the
/// echoed one can no longer be answered (markers strictly increase and the
/// engine responds in order) and are dropped. Lines with no outstanding
/// request are forwarded on the unsolicited channel (console passthrough,
/// engine banners).
pub struct ReplChannel {
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: Arc<Mutex<PendingQueue>>,
    markers: MarkerCounter,
}

impl ReplChannel {
    /// Attach to the engine's stdio pair and spawn the reader task.
    /// The returned receiver carries lines no request claimed.
    pub fn spawn<R, W>(reader: R, writer: W) -> (Arc<Self>, mpsc::UnboundedReceiver<String>)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (unsolicited_tx, unsolicited_rx) = mpsc::unbounded_channel();
        let channel = Arc::new(Self {
            writer: tokio::sync::Mutex::new(Box::new(writer) as Box<dyn AsyncWrite + Send + Unpin>),
            pending: Arc::new(Mutex::new(PendingQueue::default())),
            markers: MarkerCounter::new(),
        });

        let pending = Arc::clone(&channel.pending);
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => route_line(&pending, &unsolicited_tx, line),
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("engine stream read failed: {}", e);
                        break;
                    }
                }
            }
            // Engine hung up. Dropping the queued senders wakes every
            // waiting request with a closed-channel error.
            let mut q = match pending.lock() {
                Ok(q) => q,
                Err(poisoned) => poisoned.into_inner(),
            };
            q.closed = true;
            q.queue.clear();
            q.buffer.clear();
        });

        (channel, unsolicited_rx)
    }

    /// Send `text` and collect its response lines, bounded by a fresh sync
    /// marker. `deadline` of `None` waits indefinitely, matching the
    /// engine's one-response-per-command contract. On timeout the pending
    /// entry stays queued: a late response still resolves it (to a dead
    /// receiver), and if the engine swallowed it entirely, the next
    /// request's marker echo sweeps it out of the queue. Either way later
    /// requests keep their own responses.
    pub async fn request(&self, text: &str, deadline: Option<Duration>) -> Result<Vec<String>> {
        let marker = self.markers.next();
        let (tx, rx) = oneshot::channel();

        // Queueing and writing happen under the writer lock so wire order
        // always equals queue order.
        {
            let mut w = self.writer.lock().await;
            {
                let mut q = self.lock_pending();
                if q.closed {
                    return Err(Error::ChannelClosed);
                }
                q.queue.push_back(Pending {
                    marker: marker.clone(),
                    tx,
                });
            }
            let wire = format!("{}\n{}\n", text, marker.elicit());
            if let Err(e) = write_flush(&mut w, &wire).await {
                self.lock_pending().queue.pop_back();
                return Err(e);
            }
        }
        tracing::debug!(command = text, token = marker.token(), "request sent");

        match deadline {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(Ok(lines)) => Ok(lines),
                Ok(Err(_)) => Err(Error::ChannelClosed),
                Err(_) => Err(Error::Timeout),
            },
            None => rx.await.map_err(|_| Error::ChannelClosed),
        }
    }

    /// Raw write with no response tracking.
    pub async fn send(&self, text: &str) -> Result<()> {
        let mut w = self.writer.lock().await;
        write_flush(&mut w, &format!("{}\n", text)).await
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, PendingQueue> {
        match self.pending.lock() {
            Ok(q) => q,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl Repl for ReplChannel {
    async fn execute(&self, text: &str) -> Result<()> {
        self.send(text).await
    }

    async fn evaluate(&self, text: &str) -> Result<Vec<String>> {
        self.request(text, None).await
    }
}

fn route_line(
    pending: &Mutex<PendingQueue>,
    unsolicited: &mpsc::UnboundedSender<String>,
    line: String,
) {
    let mut q = match pending.lock() {
        Ok(q) => q,
        Err(poisoned) => poisoned.into_inner(),
    };
    if q.queue.is_empty() {
        let _ = unsolicited.send(line);
        return;
    }
    match q.queue.iter().position(|p| p.marker.is_echo(&line)) {
        Some(idx) => {
            // Requests ahead of the echoed one were swallowed by the
            // engine; their markers can no longer arrive.
            if idx > 0 {
                tracing::warn!(dropped = idx, "discarding unanswered requests");
                q.queue.drain(..idx);
            }
            if let Some(done) = q.queue.pop_front() {
                let lines = std::mem::take(&mut q.buffer);
                // The receiver may have timed out and gone away.
                let _ = done.tx.send(lines);
            }
        }
        None => q.buffer.push(line),
    }
}

async fn write_flush(
    w: &mut tokio::sync::MutexGuard<'_, Box<dyn AsyncWrite + Send + Unpin>>,
    text: &str,
) -> Result<()> {
    w.write_all(text.as_bytes()).await?;
    w.flush().await?;
    Ok(())
}
