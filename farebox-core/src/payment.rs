use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reason handed to the error-display collaborator when the remote service
/// reports that the booking already has a payment.
pub const SEAT_CONFLICT_REASON: &str =
    "Payment for this seat already exists. Please choose another seat.";

/// Card payment for one booking, wire-shaped for the remote payment
/// endpoint (`POST /api/mock-payments/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSubmission {
    pub booking: i64,
    pub amount: f64,
    pub name_on_card: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

/// Acknowledged payment: booking identity and amount, read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentReceipt {
    pub booking: i64,
    pub amount: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The booking already has a payment. Terminal for the workflow
    /// instance that submitted it.
    #[error("{reason}")]
    Conflict { reason: String },

    /// Non-conflict rejection from the service; the raw body is retained
    /// for display and the caller may retry.
    #[error("Payment failed: {detail}")]
    Rejected { detail: String },

    /// The request never produced a response body.
    #[error("Payment failed: {0}")]
    Transport(String),
}

/// Submission boundary to the remote payment service. The workflow calls
/// this at most once per Submitting entry.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentReceipt, PaymentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_wire_field_names() {
        let submission = PaymentSubmission {
            booking: 7,
            amount: 500.0,
            name_on_card: "A Rider".to_string(),
            card_number: "4111111111111111".to_string(),
            expiry_date: "12/29".to_string(),
            cvv: "123".to_string(),
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["booking"], 7);
        assert_eq!(value["amount"], 500.0);
        assert_eq!(value["name_on_card"], "A Rider");
        assert_eq!(value["card_number"], "4111111111111111");
        assert_eq!(value["expiry_date"], "12/29");
        assert_eq!(value["cvv"], "123");
    }
}
