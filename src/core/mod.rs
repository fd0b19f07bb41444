//! Task bus core: per-task plumbing and cross-request control.
//!
//! The public API of this module is what a generation request needs:
//! - [`TaskBus`]: opens a bus for one task and records its owner;
//! - [`Publisher`]: producer half, held by the generation pipeline;
//! - [`Listener`]: consumer half, drives the lifetime countdown and keepalive;
//! - [`TaskControl`]: used by *other* requests to stop a task;
//! - [`Config`]: TTLs, tick length and budgets.

mod bus;
mod config;
mod control;
mod listener;
mod publisher;

pub use bus::TaskBus;
pub use config::Config;
pub use control::TaskControl;
pub use listener::{Listener, StopCause};
pub use publisher::Publisher;
