//! External key-value stores backing cross-request task control.
//!
//! ## Contents
//! - [`KeyValueStore`] the injected capability (`set` with TTL, `get`, `delete`)
//! - [`MemoryStore`] in-process TTL implementation (single-process deployments, tests)
//! - [`OwnershipStore`] who started a task, keyed by task id
//! - [`StopSignalStore`] "this task must stop" flags, keyed by task id
//!
//! ## Keys
//! ```text
//! generate_task_belong:<task_id>   → "account-<id>" | "end-user-<id>"   (ttl: owner_ttl)
//! generate_task_stopped:<task_id>  → "1"                                (ttl: stop_flag_ttl)
//! ```

mod kv;
mod memory;
mod ownership;
mod stop;

pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use ownership::{InvokeFrom, OwnershipStore, Requester};
pub use stop::StopSignalStore;
