//! Order state machine service.
//!
//! Single source of truth for which lifecycle transitions are legal.

use crate::domain::orders::errors::OrderError;
use crate::domain::orders::value_objects::OrderStatus;

/// Validates order status transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            // From Pending: routed, cancelled before routing, or expired
            (OrderStatus::Pending, OrderStatus::Submitted)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Pending, OrderStatus::Expired)
                // From Submitted: venue ack, reject, immediate-or-cancel outcomes
                | (OrderStatus::Submitted, OrderStatus::Accepted)
                | (OrderStatus::Submitted, OrderStatus::Rejected)
                | (OrderStatus::Submitted, OrderStatus::Cancelled)
                | (OrderStatus::Submitted, OrderStatus::Expired)
                // From Accepted
                | (OrderStatus::Accepted, OrderStatus::PartiallyFilled)
                | (OrderStatus::Accepted, OrderStatus::Filled)
                | (OrderStatus::Accepted, OrderStatus::Cancelled)
                | (OrderStatus::Accepted, OrderStatus::Rejected)
                | (OrderStatus::Accepted, OrderStatus::Expired)
                | (OrderStatus::Accepted, OrderStatus::Suspended)
                // From PartiallyFilled (further fills stay in place)
                | (OrderStatus::PartiallyFilled, OrderStatus::PartiallyFilled)
                | (OrderStatus::PartiallyFilled, OrderStatus::Filled)
                | (OrderStatus::PartiallyFilled, OrderStatus::Cancelled)
                | (OrderStatus::PartiallyFilled, OrderStatus::Expired)
                | (OrderStatus::PartiallyFilled, OrderStatus::Suspended)
                // Suspended resumes to Accepted, or can be expired/cancelled
                | (OrderStatus::Suspended, OrderStatus::Accepted)
                | (OrderStatus::Suspended, OrderStatus::Cancelled)
                | (OrderStatus::Suspended, OrderStatus::Expired)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        if from.is_terminal() {
            format!("Order is terminal in {from}, cannot transition to {to}")
        } else {
            format!("Invalid transition from {from} to {to}")
        }
    }

    /// All valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::Pending => vec![
                OrderStatus::Submitted,
                OrderStatus::Cancelled,
                OrderStatus::Expired,
            ],
            OrderStatus::Submitted => vec![
                OrderStatus::Accepted,
                OrderStatus::Rejected,
                OrderStatus::Cancelled,
                OrderStatus::Expired,
            ],
            OrderStatus::Accepted => vec![
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::Cancelled,
                OrderStatus::Rejected,
                OrderStatus::Expired,
                OrderStatus::Suspended,
            ],
            OrderStatus::PartiallyFilled => vec![
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::Cancelled,
                OrderStatus::Expired,
                OrderStatus::Suspended,
            ],
            OrderStatus::Suspended => vec![
                OrderStatus::Accepted,
                OrderStatus::Cancelled,
                OrderStatus::Expired,
            ],
            OrderStatus::Filled
            | OrderStatus::Cancelled
            | OrderStatus::Rejected
            | OrderStatus::Expired => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn pending_can_only_submit_cancel_or_expire() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Submitted
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Cancelled
        ));
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Accepted
        ));
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Filled
        ));
    }

    #[test_case(OrderStatus::Submitted)]
    #[test_case(OrderStatus::Accepted)]
    #[test_case(OrderStatus::PartiallyFilled)]
    #[test_case(OrderStatus::Filled)]
    #[test_case(OrderStatus::Cancelled)]
    #[test_case(OrderStatus::Rejected)]
    #[test_case(OrderStatus::Expired)]
    #[test_case(OrderStatus::Suspended)]
    fn no_order_reenters_pending(status: OrderStatus) {
        assert!(!OrderStateMachine::is_valid_transition(
            status,
            OrderStatus::Pending
        ));
    }

    #[test]
    fn fills_progress_forward() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Accepted,
            OrderStatus::PartiallyFilled
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::PartiallyFilled,
            OrderStatus::PartiallyFilled
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::PartiallyFilled,
            OrderStatus::Filled
        ));
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::Filled,
            OrderStatus::PartiallyFilled
        ));
    }

    #[test]
    fn suspended_resumes_to_accepted_only() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Suspended,
            OrderStatus::Accepted
        ));
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::Suspended,
            OrderStatus::PartiallyFilled
        ));
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::Suspended,
            OrderStatus::Filled
        ));
    }

    #[test_case(OrderStatus::Filled)]
    #[test_case(OrderStatus::Cancelled)]
    #[test_case(OrderStatus::Rejected)]
    #[test_case(OrderStatus::Expired)]
    fn terminal_states_have_no_successors(terminal: OrderStatus) {
        assert!(OrderStateMachine::valid_next_states(terminal).is_empty());
    }

    #[test]
    fn validate_transition_errors_on_invalid() {
        let result =
            OrderStateMachine::validate_transition(OrderStatus::Filled, OrderStatus::Cancelled);
        assert!(result.is_err());

        let reason =
            OrderStateMachine::transition_error_reason(OrderStatus::Filled, OrderStatus::Cancelled);
        assert!(reason.contains("terminal"));
    }

    #[test]
    fn validate_transition_ok_on_valid() {
        assert!(
            OrderStateMachine::validate_transition(OrderStatus::Submitted, OrderStatus::Accepted)
                .is_ok()
        );
    }
}
