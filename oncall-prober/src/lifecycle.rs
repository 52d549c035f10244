//! Session lifecycle of the prober.

use thiserror::Error;
use tracing::debug;

/// States the prober moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProberState {
    /// No session yet; probing is not allowed.
    Unauthenticated,
    /// A session is held and the prober is idle between ticks.
    Authenticated,
    /// A create/delete scenario is in flight.
    Probing,
}

impl ProberState {
    /// Returns `true` when a session is held.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated | Self::Probing)
    }
}

/// Events that drive [`Lifecycle`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProberEvent {
    /// Login returned a fresh session.
    LoggedIn,
    /// A probe tick began.
    ProbeStarted,
    /// A probe tick completed, whatever its outcome.
    ProbeFinished,
}

/// Tracks the prober state and rejects out-of-order events.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    state: ProberState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Starts in [`ProberState::Unauthenticated`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ProberState::Unauthenticated,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> ProberState {
        self.state
    }

    /// Applies `event`, returning the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when `event` is not allowed from the
    /// current state.
    pub fn transition(&mut self, event: ProberEvent) -> Result<ProberState, InvalidTransition> {
        let next = match (self.state, event) {
            (ProberState::Unauthenticated | ProberState::Authenticated, ProberEvent::LoggedIn)
            | (ProberState::Probing, ProberEvent::ProbeFinished) => ProberState::Authenticated,
            (ProberState::Authenticated, ProberEvent::ProbeStarted) => ProberState::Probing,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        if next != self.state {
            debug!(from = ?self.state, to = ?next, ?event, "prober lifecycle transition");
            self.state = next;
        }
        Ok(self.state)
    }
}

/// An event arrived in a state that does not accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid prober transition from {from:?} via {event:?}")]
pub struct InvalidTransition {
    /// State prior to the attempted transition.
    pub from: ProberState,
    /// Event that was rejected.
    pub event: ProberEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_then_probe_cycle() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), ProberState::Unauthenticated);

        lifecycle.transition(ProberEvent::LoggedIn).unwrap();
        assert_eq!(
            lifecycle.transition(ProberEvent::ProbeStarted).unwrap(),
            ProberState::Probing
        );
        assert_eq!(
            lifecycle.transition(ProberEvent::ProbeFinished).unwrap(),
            ProberState::Authenticated
        );
        assert!(lifecycle.state().is_authenticated());
    }

    #[test]
    fn probing_requires_a_session() {
        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.transition(ProberEvent::ProbeStarted).unwrap_err();
        assert_eq!(err.from, ProberState::Unauthenticated);
        assert_eq!(lifecycle.state(), ProberState::Unauthenticated);
    }

    #[test]
    fn relogin_keeps_authenticated() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(ProberEvent::LoggedIn).unwrap();
        lifecycle.transition(ProberEvent::LoggedIn).unwrap();
        assert_eq!(lifecycle.state(), ProberState::Authenticated);
    }

    #[test]
    fn overlapping_ticks_are_rejected() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(ProberEvent::LoggedIn).unwrap();
        lifecycle.transition(ProberEvent::ProbeStarted).unwrap();
        assert!(lifecycle.transition(ProberEvent::ProbeStarted).is_err());
        assert!(lifecycle.transition(ProberEvent::LoggedIn).is_err());
    }
}
