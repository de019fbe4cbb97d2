//! Expiry scheduler.
//!
//! Expiry is a local, per-client cleanup: each client removes records whose
//! `expires_at` has passed by its own clock, and never broadcasts it. The
//! scheduler is a single deadline that the session pumps with
//! [`ExpiryScheduler::fire`]; switching cadence replaces the deadline instead
//! of stacking timers.

use crate::actor::Actor;
use crate::clock::Timestamp;
use crate::config::SessionConfig;
use crate::drawing::{DrawingId, DrawingRecord};
use crate::policy::SessionPolicy;
use crate::store::DrawingStore;
use crate::surface::DrawSurface;
use std::time::Duration;

/// Sweep rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cadence {
    /// Normal operation.
    #[default]
    Slow,
    /// While timed erase is active.
    Fast,
}

/// Periodic sweep deadline.
#[derive(Debug, Clone)]
pub struct ExpiryScheduler {
    slow: Duration,
    fast: Duration,
    cadence: Cadence,
    /// `None` while stopped.
    next_due: Option<Timestamp>,
}

impl ExpiryScheduler {
    pub fn new(slow: Duration, fast: Duration) -> Self {
        Self {
            slow,
            fast,
            cadence: Cadence::Slow,
            next_due: None,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.slow_sweep_interval(), config.fast_sweep_interval())
    }

    /// Start (or restart) sweeping at the given cadence.
    pub fn start(&mut self, now: Timestamp, cadence: Cadence) {
        self.cadence = cadence;
        self.next_due = Some(now.saturating_add(self.interval()));
    }

    /// Switch cadence. A running scheduler gets a fresh deadline at the new
    /// rate; a stopped one stays stopped.
    pub fn reconfigure(&mut self, now: Timestamp, cadence: Cadence) {
        self.cadence = cadence;
        if self.next_due.is_some() {
            self.next_due = Some(now.saturating_add(self.interval()));
        }
    }

    /// Change both intervals, keeping the current cadence.
    pub fn set_intervals(&mut self, now: Timestamp, slow: Duration, fast: Duration) {
        self.slow = slow;
        self.fast = fast;
        self.reconfigure(now, self.cadence);
    }

    /// Stop for good. `fire` returns `false` until the next `start`.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn next_due(&self) -> Option<Timestamp> {
        self.next_due
    }

    pub fn interval(&self) -> Duration {
        match self.cadence {
            Cadence::Slow => self.slow,
            Cadence::Fast => self.fast,
        }
    }

    /// Whether a sweep is due at `now`. Re-arms for the next period when it
    /// is.
    pub fn fire(&mut self, now: Timestamp) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now.saturating_add(self.interval()));
                true
            }
            _ => false,
        }
    }
}

/// Remove expired records as seen by `actor`.
///
/// While timed erase is active, an actor who may not sweep everything only
/// removes their own records; otherwise every expired record goes.
pub fn sweep<S: DrawSurface>(
    store: &mut DrawingStore<S>,
    now: Timestamp,
    actor: &Actor,
    policy: &SessionPolicy,
    timed_erase: bool,
) -> Vec<DrawingRecord> {
    let own_only = timed_erase && !policy.can_sweep_all(actor);
    let expired: Vec<DrawingId> = store
        .query_expired(now)
        .into_iter()
        .filter(|record| !own_only || record.is_owned_by(&actor.id))
        .map(|record| record.id().clone())
        .collect();

    let removed = store.remove_many(&expired);
    if !removed.is_empty() {
        log::debug!("Expired {} drawing(s)", removed.len());
    }
    removed
}
