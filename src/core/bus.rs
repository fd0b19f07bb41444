//! # Opening task buses.
//!
//! [`TaskBus`] wires one task's queue, publisher and listener together and
//! records who owns the task, so later stop requests can be authorized.

use crate::{
    core::{Config, Listener, Publisher, TaskControl},
    error::PublishError,
    events::{TaskIds, TaskQueue},
    store::Requester,
};

/// Factory for per-task buses.
///
/// Holds the configuration and the shared [`TaskControl`]; create it once and
/// call [`TaskBus::open`] per generation request.
#[derive(Clone)]
pub struct TaskBus {
    cfg: Config,
    control: TaskControl,
}

impl TaskBus {
    /// Creates a new factory.
    pub fn new(cfg: Config, control: TaskControl) -> Self {
        Self { cfg, control }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn control(&self) -> &TaskControl {
        &self.control
    }

    /// Opens the bus for one task.
    ///
    /// - rejects an empty `owner.user_id` with [`PublishError::Validation`];
    /// - writes the ownership record (`owner_ttl`);
    /// - returns the producer and consumer halves.
    pub async fn open(
        &self,
        ids: TaskIds,
        owner: &Requester,
    ) -> Result<(Publisher, Listener), PublishError> {
        if owner.user_id.trim().is_empty() {
            return Err(PublishError::validation("user is required"));
        }

        self.control
            .ownership()
            .record(&ids.task_id, owner)
            .await?;

        let (queue, rx) = TaskQueue::new(ids);
        let publisher = Publisher::new(queue.clone());
        let listener = Listener::new(queue, rx, self.control.stops().clone(), &self.cfg);
        Ok((publisher, listener))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::events::{AppMode, Event, EventKind};
    use crate::llm::LlmResultChunk;
    use crate::store::{InvokeFrom, MemoryStore};

    fn bus(cfg: Config) -> TaskBus {
        let control = TaskControl::new(Arc::new(MemoryStore::new()), &cfg);
        TaskBus::new(cfg, control)
    }

    fn ids() -> TaskIds {
        TaskIds::new("t1", "m1", Some("c1".into()), AppMode::Chat)
    }

    #[tokio::test(start_paused = true)]
    async fn open_requires_a_user() {
        let bus = bus(Config::default());
        let Err(err) = bus.open(ids(), &Requester::new("", InvokeFrom::WebApp)).await else {
            panic!("open without a user must fail");
        };
        assert!(matches!(err, PublishError::Validation { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn open_records_the_owner() {
        let bus = bus(Config::default());
        let owner = Requester::new("u1", InvokeFrom::Explore);
        let _halves = bus.open(ids(), &owner).await.unwrap();
        assert_eq!(
            bus.control().ownership().owner("t1").await.unwrap().as_deref(),
            Some("account-u1")
        );

        tokio::time::advance(Duration::from_secs(1801)).await;
        assert_eq!(bus.control().ownership().owner("t1").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_identity_does_not_cancel() {
        let bus = bus(Config {
            max_lifetime_ticks: 30,
            ..Config::default()
        });
        let owner = Requester::new("u1", InvokeFrom::WebApp);
        let (publisher, mut listener) = bus.open(ids(), &owner).await.unwrap();

        let stranger = Requester::new("u1", InvokeFrom::Debugger);
        assert!(!bus.control().request_stop("t1", &stranger).await.unwrap());

        let producer = tokio::spawn(async move {
            for delta in ["Hel", "lo"] {
                publisher.publish_chunk(LlmResultChunk::text("m", delta))?;
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
            publisher.publish_message_end(Default::default())
        });

        let mut kinds = Vec::new();
        while let Some(env) = listener.next().await {
            kinds.push(env.event().kind());
        }
        producer.await.unwrap().unwrap();

        assert_eq!(kinds.last(), Some(&EventKind::MessageEnd));
        assert!(!kinds.contains(&EventKind::Stop));
        assert_eq!(listener.stop_cause(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn owner_cancels_and_producer_unwinds() {
        let bus = bus(Config::default());
        let owner = Requester::new("u1", InvokeFrom::WebApp);
        let (publisher, mut listener) = bus.open(ids(), &owner).await.unwrap();

        let token = publisher.cancellation();
        let producer = tokio::spawn(async move {
            let mut sent = 0u32;
            loop {
                if let Err(e) = publisher.publish_chunk(LlmResultChunk::text("m", "x")) {
                    return (sent, e);
                }
                sent += 1;
                tokio::time::sleep(Duration::from_millis(400)).await;
            }
        });

        let first = listener.next().await.unwrap();
        assert_eq!(first.event().kind(), EventKind::MessageChunk);
        assert!(bus.control().request_stop("t1", &owner).await.unwrap());

        let mut tail = Vec::new();
        while let Some(env) = listener.next().await {
            tail.push(env.into_event());
        }
        assert_eq!(tail.last(), Some(&Event::Stop));
        assert!(token.is_cancelled());

        let (_sent, err) = producer.await.unwrap();
        assert_eq!(err, PublishError::TaskCancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_listener_cancels_the_producer() {
        let bus = bus(Config::default());
        let (publisher, listener) = bus
            .open(ids(), &Requester::new("u1", InvokeFrom::WebApp))
            .await
            .unwrap();
        let token = publisher.cancellation();
        publisher.publish_chunk(LlmResultChunk::text("m", "a")).unwrap();

        drop(listener);
        assert!(token.is_cancelled());
        for _ in 0..3 {
            assert_eq!(
                publisher.publish_chunk(LlmResultChunk::text("m", "b")),
                Err(PublishError::TaskCancelled)
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drained_listener_leaves_late_publishes_alone() {
        let bus = bus(Config::default());
        let (publisher, mut listener) = bus
            .open(ids(), &Requester::new("u1", InvokeFrom::WebApp))
            .await
            .unwrap();
        publisher.publish_message_end(Default::default()).unwrap();
        while listener.next().await.is_some() {}
        drop(listener);

        assert!(!publisher.is_cancelled());
        assert_eq!(publisher.publish_chunk(LlmResultChunk::text("m", "late")), Ok(()));
    }
}
