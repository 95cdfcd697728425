//! Session and station context consumed by onboarding writes.
//!
//! # Responsibility
//! - Expose the logged-in operator, the provisioned station config and the
//!   current UTC time to the onboarding service.
//!
//! # Invariants
//! - Clock readings are UTC epoch milliseconds.

use crate::config::OnboardConfig;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" for audit timestamps.
pub trait Clock: Send + Sync {
    fn now_epoch_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Manually driven clock for deterministic audit fields.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now_epoch_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(now_epoch_ms),
        }
    }

    pub fn set(&self, now_epoch_ms: i64) {
        self.now.store(now_epoch_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_epoch_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Operator currently logged into the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: String,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Everything an onboarding write needs from its surroundings.
#[derive(Clone)]
pub struct OnboardContext {
    session: SessionContext,
    config: OnboardConfig,
    clock: Arc<dyn Clock>,
}

impl OnboardContext {
    /// Creates a context backed by the wall clock.
    pub fn new(session: SessionContext, config: OnboardConfig) -> Self {
        Self::with_clock(session, config, Arc::new(SystemClock))
    }

    pub fn with_clock(session: SessionContext, config: OnboardConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            session,
            config,
            clock,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.session.user_id
    }

    pub fn center_id(&self) -> &str {
        &self.config.center_id
    }

    pub fn station_id(&self) -> &str {
        &self.config.station_id
    }

    pub fn language_code(&self) -> &str {
        &self.config.language_code
    }

    pub fn now_epoch_ms(&self) -> i64 {
        self.clock.now_epoch_ms()
    }

    /// Switches the logged-in operator, keeping station config and clock.
    pub fn switch_user(&mut self, session: SessionContext) {
        self.session = session;
    }
}

impl std::fmt::Debug for OnboardContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnboardContext")
            .field("session", &self.session)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, OnboardContext, SessionContext, SystemClock};
    use crate::config::OnboardConfig;
    use std::sync::Arc;

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now_epoch_ms(), 1_000);
        clock.advance(250);
        assert_eq!(clock.now_epoch_ms(), 1_250);
        clock.set(5);
        assert_eq!(clock.now_epoch_ms(), 5);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_epoch_ms() > 1_577_836_800_000);
    }

    #[test]
    fn context_exposes_session_and_station() {
        let config = OnboardConfig::new("10011", "10002", "eng").unwrap();
        let clock = Arc::new(FixedClock::new(42));
        let mut context =
            OnboardContext::with_clock(SessionContext::new("mosip_op"), config, clock.clone());

        assert_eq!(context.user_id(), "mosip_op");
        assert_eq!(context.center_id(), "10011");
        assert_eq!(context.station_id(), "10002");
        assert_eq!(context.language_code(), "eng");
        assert_eq!(context.now_epoch_ms(), 42);

        clock.advance(8);
        assert_eq!(context.now_epoch_ms(), 50);

        context.switch_user(SessionContext::new("second_op"));
        assert_eq!(context.user_id(), "second_op");
        assert_eq!(context.center_id(), "10011");
    }
}
