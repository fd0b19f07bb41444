//! # Task bus configuration.
//!
//! Provides [`Config`] centralized settings for task buses, listeners and
//! cancellation.
//!
//! Config is used in three places:
//! 1. **Opening a bus**: `TaskBus::new(config, control)` (listener budget)
//! 2. **Cancellation**: `TaskControl::new(store, &config)` (ownership and stop-flag TTLs)
//! 3. **Notifications**: `SubscriberSet` queue capacity used by the finalizer
//!
//! ## Sentinel values
//! - `ping_interval_ticks = 0` → keepalive disabled
//! - `poll_timeout < 1ms` → clamped to 1ms (a zero timeout would spin)
//! - `max_lifetime_ticks = 0` → clamped to 1 (the listener stops after its first tick)

use std::time::Duration;

use serde::Deserialize;

/// Global configuration for task buses.
///
/// ## Field semantics
/// - `owner_ttl`: lifetime of the ownership record written when a bus opens
/// - `stop_flag_ttl`: lifetime of a pending stop flag
/// - `max_lifetime_ticks`: listener iterations before a `Stop` is synthesized
/// - `poll_timeout`: how long one listener iteration waits for an event (one tick)
/// - `ping_interval_ticks`: keepalive cadence in ticks
/// - `notification_queue_capacity`: per-subscriber queue for finalization notifications
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase. The struct deserializes with
/// defaults for missing fields, so it can be loaded from any serde format.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ownership record TTL (`generate_task_belong:<task_id>`).
    pub owner_ttl: Duration,

    /// Stop flag TTL (`generate_task_stopped:<task_id>`).
    pub stop_flag_ttl: Duration,

    /// Maximum task lifetime, in listener ticks.
    ///
    /// The countdown decrements on every iteration, whether or not an event
    /// was received. At zero the listener injects `Stop` and shuts the bus.
    pub max_lifetime_ticks: u32,

    /// Listener poll timeout (one tick).
    pub poll_timeout: Duration,

    /// A `Ping` is injected whenever the remaining budget is a positive
    /// multiple of this value.
    pub ping_interval_ticks: u32,

    /// Capacity of each notification subscriber's queue.
    pub notification_queue_capacity: usize,
}

impl Config {
    /// Lifetime budget clamped to a minimum of 1 tick.
    #[inline]
    pub fn lifetime_ticks(&self) -> u32 {
        self.max_lifetime_ticks.max(1)
    }

    /// Poll timeout clamped to a minimum of 1ms.
    #[inline]
    pub fn tick(&self) -> Duration {
        self.poll_timeout.max(Duration::from_millis(1))
    }

    /// Keepalive cadence as an `Option`.
    ///
    /// - `None` → no keepalive
    /// - `Some(n)` → ping every `n` ticks
    #[inline]
    pub fn ping_every(&self) -> Option<u32> {
        match self.ping_interval_ticks {
            0 => None,
            n => Some(n),
        }
    }

    /// Wall-clock upper bound of a task's lifetime.
    #[inline]
    pub fn max_lifetime(&self) -> Duration {
        self.tick() * self.lifetime_ticks()
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `owner_ttl = 1800s`
    /// - `stop_flag_ttl = 600s`
    /// - `max_lifetime_ticks = 600` (ten minutes with the default tick)
    /// - `poll_timeout = 1s`
    /// - `ping_interval_ticks = 10`
    /// - `notification_queue_capacity = 1024`
    fn default() -> Self {
        Self {
            owner_ttl: Duration::from_secs(1800),
            stop_flag_ttl: Duration::from_secs(600),
            max_lifetime_ticks: 600,
            poll_timeout: Duration::from_secs(1),
            ping_interval_ticks: 10,
            notification_queue_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.owner_ttl, Duration::from_secs(1800));
        assert_eq!(cfg.stop_flag_ttl, Duration::from_secs(600));
        assert_eq!(cfg.lifetime_ticks(), 600);
        assert_eq!(cfg.tick(), Duration::from_secs(1));
        assert_eq!(cfg.ping_every(), Some(10));
        assert_eq!(cfg.max_lifetime(), Duration::from_secs(600));
    }

    #[test]
    fn sentinels_are_clamped() {
        let cfg = Config {
            max_lifetime_ticks: 0,
            poll_timeout: Duration::ZERO,
            ping_interval_ticks: 0,
            ..Config::default()
        };
        assert_eq!(cfg.lifetime_ticks(), 1);
        assert_eq!(cfg.tick(), Duration::from_millis(1));
        assert_eq!(cfg.ping_every(), None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let cfg: Config = serde_json::from_str(
            r#"{"max_lifetime_ticks": 30, "poll_timeout": {"secs": 0, "nanos": 5000000}}"#,
        )
        .unwrap();
        assert_eq!(cfg.max_lifetime_ticks, 30);
        assert_eq!(cfg.tick(), Duration::from_millis(5));
        assert_eq!(cfg.ping_interval_ticks, 10);
    }
}
