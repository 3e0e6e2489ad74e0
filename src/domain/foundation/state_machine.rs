//! State machine trait for status enums.
//!
//! Provides a consistent interface for validating and performing state
//! transitions on lifecycle statuses.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for SubscriptionStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Active, PastDue) | (PastDue, Active))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Active => vec![PastDue],
///             PastDue => vec![Active],
///         }
///     }
/// }
///
/// let next = current.transition_to(SubscriptionStatus::PastDue)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStatus {
        Draft,
        Live,
        Closed,
    }

    impl StateMachine for TestStatus {
        fn can_transition_to(&self, target: &Self) -> bool {
            use TestStatus::*;
            matches!((self, target), (Draft, Live) | (Live, Closed))
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use TestStatus::*;
            match self {
                Draft => vec![Live],
                Live => vec![Closed],
                Closed => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(
            TestStatus::Draft.transition_to(TestStatus::Live),
            Ok(TestStatus::Live)
        );
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        assert!(TestStatus::Draft.transition_to(TestStatus::Closed).is_err());
    }

    #[test]
    fn is_terminal_only_for_states_without_exits() {
        assert!(TestStatus::Closed.is_terminal());
        assert!(!TestStatus::Draft.is_terminal());
    }
}
