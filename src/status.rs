//! Status vocabularies and transition rules for orders, invoices and
//! payment references. Statuses are stored as plain strings; everything
//! that mutates one goes through these checks.

use crate::error::{AppError, AppResult};

pub const ORDER_STATUSES: &[&str] = &[
    "draft",
    "pending",
    "paid",
    "completed",
    "cancelled",
    "processing",
];

pub const INVOICE_STATUSES: &[&str] = &["draft", "issued", "paid", "canceled"];

pub const REFERENCE_STATUSES: &[&str] = &["pending", "confirmed", "failed"];

pub fn validate_order_status(status: &str) -> AppResult<()> {
    if ORDER_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "invalid order status '{status}'"
        )))
    }
}

/// Completed and cancelled orders are frozen.
pub fn order_is_terminal(status: &str) -> bool {
    matches!(status, "completed" | "cancelled")
}

/// Invoices move forward only: draft -> issued -> paid, with canceled
/// reachable from any non-terminal state.
pub fn invoice_can_transition(from: &str, to: &str) -> bool {
    match (from, to) {
        ("draft", "issued") | ("issued", "paid") => true,
        ("draft", "canceled") | ("issued", "canceled") => true,
        _ => false,
    }
}

/// A payment reference leaves `pending` exactly once.
pub fn reference_can_transition(from: &str, to: &str) -> bool {
    matches!((from, to), ("pending", "confirmed") | ("pending", "failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_orders_are_frozen() {
        assert!(order_is_terminal("completed"));
        assert!(order_is_terminal("cancelled"));
        assert!(!order_is_terminal("pending"));
        assert!(!order_is_terminal("paid"));
    }

    #[test]
    fn unknown_order_status_is_rejected() {
        assert!(validate_order_status("pending").is_ok());
        assert!(validate_order_status("shipped").is_err());
    }

    #[test]
    fn invoices_move_forward_only() {
        assert!(invoice_can_transition("draft", "issued"));
        assert!(invoice_can_transition("issued", "paid"));
        assert!(invoice_can_transition("draft", "canceled"));
        assert!(invoice_can_transition("issued", "canceled"));

        assert!(!invoice_can_transition("issued", "draft"));
        assert!(!invoice_can_transition("paid", "canceled"));
        assert!(!invoice_can_transition("paid", "issued"));
        assert!(!invoice_can_transition("canceled", "issued"));
        assert!(!invoice_can_transition("draft", "paid"));
    }

    #[test]
    fn references_transition_once() {
        assert!(reference_can_transition("pending", "confirmed"));
        assert!(reference_can_transition("pending", "failed"));

        assert!(!reference_can_transition("confirmed", "failed"));
        assert!(!reference_can_transition("failed", "confirmed"));
        assert!(!reference_can_transition("confirmed", "pending"));
    }
}
