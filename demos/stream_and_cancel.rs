//! # Example: stream_and_cancel
//!
//! Streams a simulated generation as SSE frames, then stops a second task
//! from a separate "request" while it is still producing.
//!
//! Shows how to:
//! - Open a task bus with [`TaskBus::open`] and feed it from a spawned producer
//! - Drain it as SSE with [`ResponseAssembler::streaming`]
//! - Cancel a running task with [`TaskControl::request_stop`]
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► task "t-stream": producer publishes chunks + MessageEnd
//!   │     └─► assembler yields message frames, then message_end
//!   │
//!   └─► task "t-cancel": producer publishes a chunk every 300ms
//!         ├─► other request: request_stop("t-cancel", owner) after 1s
//!         ├─► listener injects Stop within one tick
//!         ├─► assembler finalizes with computed usage, yields message_end
//!         └─► producer sees TaskCancelled and returns
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example stream_and_cancel --features logging
//! ```

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::StreamExt;
use taskrelay::{
    AppMode, Config, Finalizer, GenerateError, InMemoryRepository, InvokeFrom, LlmResult,
    LlmResultChunk, LlmUsage, LogWriter, MemoryStore, ModelConfig, ModelMode, ModelRuntime,
    PromptMessage, Requester, ResponseAssembler, Subscribe, SubscriberSet, TaskBus, TaskContext,
    TaskControl, TaskIds,
};
use tracing_subscriber::EnvFilter;

/// Whitespace-split token counter with a flat price.
struct DemoRuntime;

#[async_trait]
impl ModelRuntime for DemoRuntime {
    async fn count_tokens(
        &self,
        _model: &str,
        messages: &[PromptMessage],
    ) -> Result<u32, GenerateError> {
        Ok(messages
            .iter()
            .map(|m| m.content.text().split_whitespace().count() as u32)
            .sum())
    }

    async fn compute_usage(
        &self,
        _model: &str,
        _credentials: &HashMap<String, String>,
        prompt_tokens: u32,
        completion_tokens: u32,
    ) -> Result<LlmUsage, GenerateError> {
        let total_tokens = prompt_tokens + completion_tokens;
        Ok(LlmUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens,
            total_price: f64::from(total_tokens) * 0.000_002,
            currency: "USD".into(),
            ..Default::default()
        })
    }
}

struct Deps {
    bus: TaskBus,
    repo: Arc<InMemoryRepository>,
    notifications: Arc<SubscriberSet>,
}

impl Deps {
    fn finalizer(&self) -> Finalizer {
        Finalizer::new(
            Arc::new(DemoRuntime),
            self.repo.clone(),
            Arc::clone(&self.notifications),
        )
    }
}

async fn stream_task(deps: &Deps, owner: &Requester) -> anyhow::Result<()> {
    println!("--- t-stream ---");
    let ids = TaskIds::new("t-stream", "m-stream", Some("c-1".into()), AppMode::Chat);
    let ctx = TaskContext::new(&ids, ModelConfig::new("demo", "demo-1", ModelMode::Chat), 0)
        .with_first_message(true);
    let (publisher, listener) = deps.bus.open(ids, owner).await?;

    let producer = tokio::spawn(async move {
        let prompt = vec![PromptMessage::user("say hello")];
        for delta in ["Hel", "lo", " world"] {
            publisher.publish_chunk(
                LlmResultChunk::text("demo-1", delta).with_prompt_messages(prompt.clone()),
            )?;
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        publisher.publish_message_end(LlmResult::default())
    });

    let assembler = ResponseAssembler::new(ctx, listener, deps.finalizer());
    let mut frames = std::pin::pin!(assembler.streaming());
    while let Some(frame) = frames.next().await {
        print!("{}", frame?.to_sse()?);
    }
    producer.await??;
    Ok(())
}

async fn cancelled_task(deps: &Deps, owner: &Requester) -> anyhow::Result<()> {
    println!("--- t-cancel ---");
    let ids = TaskIds::new("t-cancel", "m-cancel", None, AppMode::Completion);
    let model = ModelConfig::new("demo", "demo-1", ModelMode::Completion);
    let ctx = TaskContext::new(&ids, model, 0);
    let (publisher, listener) = deps.bus.open(ids, owner).await?;

    let producer = tokio::spawn(async move {
        let mut sent = 0u32;
        loop {
            if let Err(e) = publisher.publish_chunk(LlmResultChunk::text("demo-1", "tick ")) {
                println!("[producer] stopped after {sent} chunks: {e}");
                return;
            }
            sent += 1;
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
    });

    let control = deps.bus.control().clone();
    let requester = owner.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        match control.request_stop("t-cancel", &requester).await {
            Ok(raised) => println!("[control] stop requested: {raised}"),
            Err(e) => println!("[control] stop failed: {e}"),
        }
    });

    let assembler = ResponseAssembler::new(ctx, listener, deps.finalizer());
    let mut frames = std::pin::pin!(assembler.streaming());
    while let Some(frame) = frames.next().await {
        print!("{}", frame?.to_sse()?);
    }
    producer.await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = Config {
        poll_timeout: Duration::from_millis(100),
        ..Config::default()
    };
    let control = TaskControl::new(Arc::new(MemoryStore::new()), &cfg);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let deps = Deps {
        notifications: Arc::new(SubscriberSet::new(subs, cfg.notification_queue_capacity)),
        bus: TaskBus::new(cfg, control),
        repo: Arc::new(InMemoryRepository::new()),
    };

    let owner = Requester::new("demo-user", InvokeFrom::WebApp);
    stream_task(&deps, &owner).await?;
    cancelled_task(&deps, &owner).await?;

    for msg in deps.repo.saved_messages().await {
        println!(
            "[saved] {} answer={:?} tokens={}+{} price={:.6} {}",
            msg.message_id,
            msg.answer,
            msg.message_tokens,
            msg.answer_tokens,
            msg.total_price,
            msg.currency
        );
    }

    if let Ok(set) = Arc::try_unwrap(deps.notifications) {
        set.shutdown().await;
    }
    Ok(())
}
