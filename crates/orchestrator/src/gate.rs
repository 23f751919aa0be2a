//! Cooldown and probability gating.
//!
//! [`try_acquire`] is the pure check. [`GateTable`] holds one
//! [`CooldownState`] per mode and applies the configured [`CommitPolicy`]:
//!
//! - `Lazy`: the cooldown starts when the caller commits after its action
//!   completed. Two overlapping triggers can both pass the check.
//! - `Eager`: the cooldown is reserved at acquire time and rolled back if the
//!   action fails, so overlapping triggers are refused.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::Mode;
use crate::error::OrchestratorError;

/// When a mode last acted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownState {
    last_triggered_at: Option<Instant>,
}

impl CooldownState {
    pub fn last_triggered_at(&self) -> Option<Instant> {
        self.last_triggered_at
    }

    /// Time left before the mode may act again.
    pub fn remaining(&self, cooldown: Duration, now: Instant) -> Duration {
        match self.last_triggered_at {
            Some(at) => cooldown.saturating_sub(now.saturating_duration_since(at)),
            None => Duration::ZERO,
        }
    }

    pub fn is_cooling_down(&self, cooldown: Duration, now: Instant) -> bool {
        !self.remaining(cooldown, now).is_zero()
    }

    pub fn commit(&mut self, now: Instant) {
        self.last_triggered_at = Some(now);
    }
}

/// Decide whether a mode may act now.
///
/// Returns false while cooling down. Otherwise draws one uniform sample in
/// `[0, 1)` and passes iff it is below `probability`. Never writes the state.
pub fn try_acquire<R: Rng + ?Sized>(
    state: &CooldownState,
    cooldown: Duration,
    probability: f64,
    now: Instant,
    rng: &mut R,
) -> bool {
    if state.is_cooling_down(cooldown, now) {
        return false;
    }
    rng.gen::<f64>() < probability
}

/// When a passed gate starts its cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitPolicy {
    /// Stamp the cooldown after the action completes.
    #[default]
    Lazy,
    /// Reserve the cooldown up front, roll back on failure.
    Eager,
}

impl fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lazy => write!(f, "lazy"),
            Self::Eager => write!(f, "eager"),
        }
    }
}

impl FromStr for CommitPolicy {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "eager" => Ok(Self::Eager),
            other => Err(OrchestratorError::Config(format!(
                "invalid commit policy '{}', expected 'lazy' or 'eager'",
                other
            ))),
        }
    }
}

/// Why a gate refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    CoolingDown { remaining: Duration },
    Chance,
}

/// Proof that a gate passed. Hand it back through [`GateTable::commit`] or
/// [`GateTable::release`].
#[derive(Debug)]
#[must_use = "a passed gate must be committed or released"]
pub struct GateTicket {
    mode: Mode,
    policy: CommitPolicy,
    previous: CooldownState,
    acquired_at: Instant,
}

impl GateTicket {
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Per-mode cooldown states under one commit policy.
#[derive(Debug, Clone, Default)]
pub struct GateTable {
    policy: CommitPolicy,
    states: HashMap<Mode, CooldownState>,
}

impl GateTable {
    pub fn new(policy: CommitPolicy) -> Self {
        Self {
            policy,
            states: HashMap::new(),
        }
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    pub fn state(&self, mode: Mode) -> CooldownState {
        self.states.get(&mode).copied().unwrap_or_default()
    }

    pub fn acquire<R: Rng + ?Sized>(
        &mut self,
        mode: Mode,
        cooldown: Duration,
        probability: f64,
        now: Instant,
        rng: &mut R,
    ) -> Result<GateTicket, Denied> {
        let state = self.states.entry(mode).or_default();
        let remaining = state.remaining(cooldown, now);
        if !remaining.is_zero() {
            return Err(Denied::CoolingDown { remaining });
        }
        if !try_acquire(state, cooldown, probability, now, rng) {
            return Err(Denied::Chance);
        }

        let previous = *state;
        if self.policy == CommitPolicy::Eager {
            state.commit(now);
        }

        Ok(GateTicket {
            mode,
            policy: self.policy,
            previous,
            acquired_at: now,
        })
    }

    /// The action succeeded; start (or keep) the cooldown.
    pub fn commit(&mut self, ticket: GateTicket, now: Instant) {
        if ticket.policy == CommitPolicy::Lazy {
            self.states.entry(ticket.mode).or_default().commit(now);
        }
    }

    /// The action failed; undo an eager reservation if nobody overwrote it.
    pub fn release(&mut self, ticket: GateTicket) {
        if ticket.policy == CommitPolicy::Lazy {
            return;
        }
        let state = self.states.entry(ticket.mode).or_default();
        if state.last_triggered_at == Some(ticket.acquired_at) {
            *state = ticket.previous;
        }
    }
}
