//! Speech capture state machine.
//!
//! Valid transitions:
//! - Idle -> Listening (capture started)
//! - Listening -> Idle (recognition ended, failed, or was stopped)

use std::fmt;

use footprints_core::error::FootprintsError;

/// Operational state of the speech capture adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// No capture in flight. Ready to start.
    #[default]
    Idle,
    /// The recognizer is capturing speech.
    Listening,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Listening => write!(f, "Listening"),
        }
    }
}

impl CaptureState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &CaptureState) -> bool {
        matches!(
            (self, target),
            (CaptureState::Idle, CaptureState::Listening)
                | (CaptureState::Listening, CaptureState::Idle)
        )
    }

    /// Move to `target`, rejecting transitions the lifecycle does not allow.
    pub fn transition(&mut self, target: CaptureState) -> Result<(), FootprintsError> {
        if self.can_transition_to(&target) {
            tracing::debug!("Speech capture state: {} -> {}", self, target);
            *self = target;
            Ok(())
        } else {
            Err(FootprintsError::Speech(format!(
                "Invalid state transition: {} -> {}",
                self, target
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "Idle");
        assert_eq!(CaptureState::Listening.to_string(), "Listening");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(CaptureState::Idle.can_transition_to(&CaptureState::Listening));
        assert!(CaptureState::Listening.can_transition_to(&CaptureState::Idle));
    }

    #[test]
    fn test_self_transitions_are_invalid() {
        assert!(!CaptureState::Idle.can_transition_to(&CaptureState::Idle));
        assert!(!CaptureState::Listening.can_transition_to(&CaptureState::Listening));
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let mut state = CaptureState::Listening;
        match state.transition(CaptureState::Listening) {
            Err(FootprintsError::Speech(msg)) => {
                assert!(msg.contains("Listening -> Listening"));
            }
            other => panic!("Expected Speech error, got {:?}", other),
        }
        assert_eq!(state, CaptureState::Listening);
    }

    #[test]
    fn test_round_trip() {
        let mut state = CaptureState::default();
        state.transition(CaptureState::Listening).unwrap();
        state.transition(CaptureState::Idle).unwrap();
        assert_eq!(state, CaptureState::Idle);
    }
}
