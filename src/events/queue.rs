//! # Per-task event queue.
//!
//! [`TaskQueue`] is a thin wrapper around an unbounded [`tokio::sync::mpsc`]
//! channel shared by exactly one producer ([`Publisher`](crate::Publisher)) and
//! one consumer ([`Listener`](crate::Listener)).
//!
//! ## Architecture
//! ```text
//! Producer:                            Consumer:
//!   Publisher ──┐
//!               ├──► TaskQueue ───────► Listener ───► ResponseAssembler
//!   Listener ───┘  (unbounded mpsc)     (timed recv)
//!   (Ping/Stop)
//! ```
//!
//! ## Rules
//! - **Non-blocking push**: `push()` never waits; the channel is unbounded.
//! - **FIFO**: sequence numbers are assigned under the same lock as the send,
//!   so `seq` order is enqueue order.
//! - **Close sentinel**: closing enqueues a sentinel after which nothing else is
//!   ever enqueued; pushes on a closed queue are dropped.
//! - **Cancellation**: a shared [`CancellationToken`] records that the task was
//!   stopped; the publisher turns it into [`PublishError::TaskCancelled`](crate::PublishError).
//! - **Consumer gone**: a push that finds the receiving half dropped closes the
//!   queue and cancels the task.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::envelope::{Envelope, TaskIds};
use super::event::Event;

/// Item travelling through the channel.
#[derive(Debug)]
pub(crate) enum Slot {
    Event(Envelope),
    /// End-of-stream sentinel.
    Close,
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    closed: bool,
}

/// Shared half of a task's queue.
#[derive(Debug)]
pub struct TaskQueue {
    ids: Arc<TaskIds>,
    tx: mpsc::UnboundedSender<Slot>,
    inner: Mutex<Inner>,
    cancel: CancellationToken,
}

impl TaskQueue {
    /// Creates a queue for `ids`, returning the shared handle and the receiving half.
    pub(crate) fn new(ids: TaskIds) -> (Arc<Self>, mpsc::UnboundedReceiver<Slot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Arc::new(Self {
            ids: Arc::new(ids),
            tx,
            inner: Mutex::new(Inner::default()),
            cancel: CancellationToken::new(),
        });
        (queue, rx)
    }

    /// Identifiers of the task this queue belongs to.
    pub fn ids(&self) -> &TaskIds {
        &self.ids
    }

    /// Enqueues `event`, then the close sentinel if `close_after` is set.
    ///
    /// Returns `false` (and drops the event) if the queue is already closed or
    /// nobody is receiving anymore.
    pub(crate) fn push(&self, event: Event, close_after: bool) -> bool {
        let mut inner = self.lock();
        if inner.closed {
            return false;
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let envelope = Envelope::new(seq, Arc::clone(&self.ids), event);
        if self.tx.send(Slot::Event(envelope)).is_err() {
            inner.closed = true;
            self.cancel.cancel();
            return false;
        }
        if close_after {
            inner.closed = true;
            // A failed sentinel send means the receiver is gone; the event above
            // was the last one anyway.
            let _ = self.tx.send(Slot::Close);
        }
        true
    }

    /// Marks the task as cancelled; subsequent publishes fail with `TaskCancelled`.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the close sentinel has been enqueued.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// True once the task has been stopped.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token cancelled when the task is stopped.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AppMode;

    fn ids() -> TaskIds {
        TaskIds::new("t1", "m1", Some("c1".into()), AppMode::Chat)
    }

    #[test]
    fn push_assigns_increasing_seq() {
        let (q, mut rx) = TaskQueue::new(ids());
        assert!(q.push(Event::Ping, false));
        assert!(q.push(Event::Stop, false));

        let seqs: Vec<u64> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|slot| match slot {
                Slot::Event(env) => Some(env.seq()),
                Slot::Close => None,
            })
            .collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn nothing_follows_the_sentinel() {
        let (q, mut rx) = TaskQueue::new(ids());
        assert!(q.push(Event::Stop, true));
        assert!(q.is_closed());
        assert!(!q.push(Event::Ping, false));

        assert!(matches!(rx.try_recv(), Ok(Slot::Event(_))));
        assert!(matches!(rx.try_recv(), Ok(Slot::Close)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_cancels_the_task() {
        let (q, rx) = TaskQueue::new(ids());
        drop(rx);
        assert!(!q.push(Event::Ping, false));
        assert!(q.is_closed());
        assert!(q.is_cancelled());
    }

    #[test]
    fn envelope_carries_task_ids() {
        let (q, mut rx) = TaskQueue::new(ids());
        q.push(Event::Ping, false);
        let Ok(Slot::Event(env)) = rx.try_recv() else {
            panic!("expected an envelope");
        };
        assert_eq!(env.task_id(), "t1");
        assert_eq!(env.message_id(), "m1");
        assert_eq!(env.conversation_id(), Some("c1"));
        assert_eq!(env.app_mode(), AppMode::Chat);
    }
}
