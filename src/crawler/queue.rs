//! Work queue between link discovery and the worker pool
//!
//! This module provides:
//! - A bounded FIFO channel with exactly one sending half and any number of
//!   receiving handles
//! - The hand-off policy used when the channel is full
//! - The set of URLs already handed to the queue
//!
//! The queue is closed when its single `QueueSender` is dropped. Receivers
//! keep draining buffered URLs after closure and see end-of-stream only once
//! the buffer is empty.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Outcome of handing one URL to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandOff {
    /// Accepted immediately
    Accepted,
    /// Accepted after waiting for a worker to free capacity
    AcceptedAfterWait,
    /// Cancellation fired while waiting; the URL was not enqueued
    Cancelled,
    /// Every receiver is gone; the URL was not enqueued
    Closed,
}

impl HandOff {
    pub fn is_accepted(self) -> bool {
        matches!(self, HandOff::Accepted | HandOff::AcceptedAfterWait)
    }
}

/// Creates a work queue with a fixed capacity
///
/// # Panics
///
/// Panics if `capacity` is zero; configuration validation rules that out.
pub fn work_queue(capacity: usize) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        QueueSender { tx },
        QueueReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// The producing half of the work queue
///
/// Not `Clone`: there is exactly one producer, and dropping it
/// closes the queue.
#[derive(Debug)]
pub struct QueueSender {
    tx: mpsc::Sender<String>,
}

impl QueueSender {
    /// Hands `url` to the queue, waiting for capacity if it is full
    ///
    /// A non-blocking enqueue is tried first. If the queue is full the call
    /// suspends until a worker frees a slot, holding `url` at the head of the
    /// line so later URLs can never overtake it. Cancellation while waiting
    /// releases `url` without enqueueing it.
    pub async fn hand_off(&self, url: String, cancel: &CancellationToken) -> HandOff {
        let url = match self.tx.try_send(url) {
            Ok(()) => return HandOff::Accepted,
            Err(TrySendError::Closed(_)) => return HandOff::Closed,
            Err(TrySendError::Full(url)) => url,
        };

        tracing::debug!("Queue is full, waiting for capacity before sending {}", url);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => HandOff::Cancelled,
            sent = self.tx.send(url) => match sent {
                Ok(()) => HandOff::AcceptedAfterWait,
                Err(_) => HandOff::Closed,
            },
        }
    }

    /// Number of free slots right now
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    /// Fixed capacity of the queue
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// A consuming handle on the work queue, cloned once per worker
#[derive(Debug, Clone)]
pub struct QueueReceiver {
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl QueueReceiver {
    /// Takes the next URL
    ///
    /// Returns `None` only once the queue is closed and fully drained. Each
    /// URL is delivered to exactly one caller.
    pub async fn next(&self) -> Option<String> {
        self.rx.lock().await.recv().await
    }
}

/// URLs already handed to the work queue
///
/// Write-once: a URL is inserted only after the queue accepted it and is
/// never removed. Owned by link discovery alone.
#[derive(Debug, Default)]
pub struct SeenUrls {
    urls: HashSet<String>,
}

impl SeenUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Records `url` as enqueued; returns false if it was already present
    pub fn mark(&mut self, url: String) -> bool {
        self.urls.insert(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
