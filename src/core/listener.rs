//! # Listener: consumer-facing side of a task bus.
//!
//! Drains one task's [`TaskQueue`] with a bounded lifetime, cooperative
//! cancellation and keepalive, all driven by a single poll loop (no extra
//! timer task).
//!
//! ## Loop
//! ```text
//! next():
//! loop {
//!   ├─► (previous iteration finished) end_of_tick():
//!   │       ├─► ticks_left -= 1
//!   │       ├─► ticks_left == 0 or stop flag taken ─► push Stop + Close, cancel producer
//!   │       └─► ticks_left > 0 and ticks_left % ping_every == 0 ─► push Ping
//!   ├─► recv with timeout(tick)
//!   │       ├─ timeout         ─► continue (nothing yielded)
//!   │       ├─ Close sentinel  ─► return None (end of stream, for good)
//!   │       └─ Envelope        ─► return Some(envelope)
//! }
//! ```
//!
//! ## Rules
//! - The budget decrements on **every** iteration, including ones that yielded.
//! - The stop flag is checked once per iteration and deleted when observed.
//! - A `Stop` is always followed by the close sentinel, so draining ends.
//! - After a terminal event has been yielded, anything that raced in before the
//!   sentinel is discarded: at most one terminal event is ever yielded.
//! - Single pass: once `None` is returned, every later call returns `None`.
//! - Dropping a listener before the bus shut down cancels the producer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use super::config::Config;
use crate::events::{Envelope, Event, Slot, TaskQueue};
use crate::store::StopSignalStore;

/// Why the listener synthesized a `Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The lifetime budget ran out.
    LifetimeExpired,
    /// A stop flag was observed for this task.
    Requested,
}

impl StopCause {
    pub fn as_label(&self) -> &'static str {
        match self {
            StopCause::LifetimeExpired => "lifetime_expired",
            StopCause::Requested => "stop_requested",
        }
    }
}

/// Consumer handle of one task bus.
pub struct Listener {
    queue: Arc<TaskQueue>,
    rx: mpsc::UnboundedReceiver<Slot>,
    stops: StopSignalStore,
    tick: Duration,
    ping_every: Option<u32>,
    ticks_left: u32,
    /// An iteration completed and its bookkeeping has not run yet.
    pending_tick: bool,
    terminal_seen: bool,
    finished: bool,
    stop_cause: Option<StopCause>,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("task_id", &self.queue.ids().task_id)
            .field("ticks_left", &self.ticks_left)
            .field("finished", &self.finished)
            .field("stop_cause", &self.stop_cause)
            .finish_non_exhaustive()
    }
}

impl Drop for Listener {
    /// A consumer that goes away before the bus shut down cancels the producer.
    fn drop(&mut self) {
        if !self.queue.is_closed() {
            debug!(task_id = %self.queue.ids().task_id, "listener dropped; cancelling task");
            self.queue.cancel();
        }
    }
}

impl Listener {
    pub(crate) fn new(
        queue: Arc<TaskQueue>,
        rx: mpsc::UnboundedReceiver<Slot>,
        stops: StopSignalStore,
        cfg: &Config,
    ) -> Self {
        Self {
            queue,
            rx,
            stops,
            tick: cfg.tick(),
            ping_every: cfg.ping_every(),
            ticks_left: cfg.lifetime_ticks(),
            pending_tick: false,
            terminal_seen: false,
            finished: false,
            stop_cause: None,
        }
    }

    /// Next envelope, or `None` once the close sentinel has been drained.
    pub async fn next(&mut self) -> Option<Envelope> {
        loop {
            if self.finished {
                return None;
            }
            if std::mem::take(&mut self.pending_tick) {
                self.end_of_tick().await;
            }

            let polled = time::timeout(self.tick, self.rx.recv()).await;
            self.pending_tick = true;

            match polled {
                Err(_elapsed) => continue,
                Ok(None) | Ok(Some(Slot::Close)) => {
                    self.finished = true;
                    return None;
                }
                Ok(Some(Slot::Event(env))) => {
                    if self.terminal_seen {
                        debug!(
                            task_id = env.task_id(),
                            kind = env.event().kind().as_label(),
                            "event after terminal discarded"
                        );
                        continue;
                    }
                    if env.event().is_terminal() {
                        self.terminal_seen = true;
                    }
                    return Some(env);
                }
            }
        }
    }

    /// Turns the listener into a single-pass [`Stream`] of envelopes.
    pub fn into_stream(self) -> impl Stream<Item = Envelope> + Send {
        futures::stream::unfold(self, |mut listener| async move {
            listener.next().await.map(|env| (env, listener))
        })
    }

    /// Remaining lifetime budget, in ticks.
    pub fn ticks_left(&self) -> u32 {
        self.ticks_left
    }

    /// Why a `Stop` was synthesized, if it was.
    pub fn stop_cause(&self) -> Option<StopCause> {
        self.stop_cause
    }

    /// Task id this listener drains.
    pub fn task_id(&self) -> &str {
        &self.queue.ids().task_id
    }

    async fn end_of_tick(&mut self) {
        self.ticks_left = self.ticks_left.saturating_sub(1);

        if self.queue.is_closed() {
            return;
        }

        if self.ticks_left == 0 {
            self.inject_stop(StopCause::LifetimeExpired);
            return;
        }
        if self.stop_requested().await {
            self.inject_stop(StopCause::Requested);
            return;
        }

        if self.ping_every.is_some_and(|n| self.ticks_left % n == 0) {
            self.queue.push(Event::Ping, false);
        }
    }

    async fn stop_requested(&self) -> bool {
        match self.stops.take(self.task_id()).await {
            Ok(taken) => taken,
            Err(e) => {
                warn!(
                    task_id = self.task_id(),
                    error = %e,
                    label = e.as_label(),
                    "stop flag check failed; continuing"
                );
                false
            }
        }
    }

    fn inject_stop(&mut self, cause: StopCause) {
        if self.queue.push(Event::Stop, true) {
            self.queue.cancel();
            self.stop_cause = Some(cause);
            info!(
                task_id = self.task_id(),
                cause = cause.as_label(),
                ticks_left = self.ticks_left,
                "task stopped by listener"
            );
        }
    }
}
