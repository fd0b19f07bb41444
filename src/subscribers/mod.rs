//! # Notification subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the [`Notification`] type emitted once a task has been finalized.
//!
//! ## Architecture
//! ```text
//!   Finalizer ── emit(Notification) ──► SubscriberSet ──► per-subscriber queues
//!                                                            │
//!                                                  ┌─────────┼─────────┐
//!                                                  ▼         ▼         ▼
//!                                              LogWriter   Titles    Custom
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod notification;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use notification::Notification;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
