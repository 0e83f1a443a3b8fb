//! Publish/subscribe bridge for completed call trees.
//!
//! Producers publish finished per-transaction trees into a [`Feed`]; each
//! subscriber owns a bounded channel of [`FEED_CAPACITY`] frames. A full
//! subscriber blocks the producer, nothing is dropped.
//!
//! [`relay`] forwards one subscription into an outbound channel until
//! shutdown is signalled, the feed goes away, or the consumer hangs up.

use crate::tracer::CallFrame;
use crate::utils::config::FEED_CAPACITY;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};

/// Cloneable multi-subscriber publisher of completed call trees
#[derive(Clone, Default)]
pub struct Feed {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<CallFrame>>>>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        self.lock().push(tx);
        Subscription { rx }
    }

    /// Deliver `frame` to every live subscriber, blocking while one is full
    ///
    /// Safe to call from a tracer hook on any thread. Inside a multi-thread
    /// runtime the wait runs under `block_in_place`. A current-thread
    /// runtime cannot wait for its own consumers, so a full subscriber
    /// gets the frame from a spawned send instead.
    ///
    /// Returns the number of subscribers that received or were handed the frame.
    pub fn send(&self, frame: CallFrame) -> usize {
        let senders = self.live_senders();
        let runtime = Handle::try_current().ok();

        let mut delivered = 0;
        for tx in senders {
            let frame = match tx.try_send(frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    continue;
                }
                Err(TrySendError::Closed(_)) => continue,
                Err(TrySendError::Full(frame)) => frame,
            };

            let sent = match &runtime {
                None => tx.blocking_send(frame).is_ok(),
                Some(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                    debug!("Subscriber full on a current-thread runtime, deferring send");
                    handle.spawn(async move { tx.send(frame).await });
                    true
                }
                Some(_) => tokio::task::block_in_place(|| tx.blocking_send(frame).is_ok()),
            };
            if sent {
                delivered += 1;
            }
        }
        delivered
    }

    /// Async counterpart of [`Feed::send`]
    pub async fn publish(&self, frame: CallFrame) -> usize {
        let mut delivered = 0;
        for tx in self.live_senders() {
            if tx.send(frame.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Subscribers that have not unsubscribed yet
    pub fn subscriber_count(&self) -> usize {
        self.live_senders().len()
    }

    // Prune closed subscribers and snapshot the rest; no lock is held while sending
    fn live_senders(&self) -> Vec<mpsc::Sender<CallFrame>> {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::Sender<CallFrame>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of a [`Feed`] subscription
pub struct Subscription {
    rx: mpsc::Receiver<CallFrame>,
}

impl Subscription {
    /// Next published frame, `None` once every feed handle is gone
    pub async fn recv(&mut self) -> Option<CallFrame> {
        self.rx.recv().await
    }

    /// Stop receiving; later publishes skip this subscriber
    pub fn unsubscribe(&mut self) {
        self.rx.close();
    }
}

/// Relay completed call trees from `feed` to the returned receiver
///
/// Spawns a task on the current tokio runtime. The relay stops when
/// `shutdown` fires or closes, when the subscription ends, or when the
/// returned receiver is dropped; it then unsubscribes and closes both
/// channels.
pub fn relay(feed: &Feed, mut shutdown: broadcast::Receiver<()>) -> mpsc::Receiver<CallFrame> {
    let (out_tx, out_rx) = mpsc::channel(FEED_CAPACITY);
    let mut subscription = feed.subscribe();

    tokio::spawn(async move {
        info!("Subscription block tracer setup");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!("Trace subscription cancelled");
                    break;
                }
                frame = subscription.recv() => {
                    let Some(frame) = frame else {
                        warn!("Trace feed closed, ending subscription");
                        break;
                    };
                    tokio::select! {
                        sent = out_tx.send(frame) => {
                            if sent.is_err() {
                                debug!("Trace subscriber went away");
                                break;
                            }
                        }
                        _ = shutdown.recv() => {
                            debug!("Trace subscription cancelled");
                            break;
                        }
                    }
                }
            }
        }

        subscription.unsubscribe();
    });

    out_rx
}
