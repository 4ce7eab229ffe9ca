use async_trait::async_trait;
use farebox_core::payment::{
    PaymentError, PaymentGateway, PaymentReceipt, PaymentSubmission, SEAT_CONFLICT_REASON,
};
use farebox_core::session::Session;
use farebox_shared::models::Booking;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Login Failed: {0}")]
    Auth(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Failed to fetch bookings (HTTP {0})")]
    BookingsFetch(u16),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user_id: i64,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// HTTP client for the remote booking/payment service.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url: String = base_url.into();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /api/login/` → session token and user id.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let response = self
            .http
            .post(format!("{}/api/login/", self.base_url))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ApiError::Auth(login_error(&body)));
        }

        let body: LoginResponse = response.json().await?;
        tracing::info!(user_id = body.user_id, "Logged in");
        Ok(Session {
            token: body.token,
            user_id: body.user_id,
        })
    }

    /// `POST /api/register/`. Field-level failures arrive as message
    /// arrays under `username` / `email`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/api/register/", self.base_url))
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ApiError::Registration(registration_error(&body)));
        }
        Ok(())
    }

    /// `GET /api/user/{user_id}/bookings/` with the token header.
    pub async fn user_bookings(&self, session: &Session) -> Result<Vec<Booking>, ApiError> {
        let response = self
            .http
            .get(format!(
                "{}/api/user/{}/bookings/",
                self.base_url, session.user_id
            ))
            .header("Authorization", format!("Token {}", session.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::BookingsFetch(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for ApiClient {
    /// `POST /api/mock-payments/`. An ok status confirms the payment;
    /// error bodies go through conflict classification.
    async fn submit_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentReceipt, PaymentError> {
        let response = self
            .http
            .post(format!("{}/api/mock-payments/", self.base_url))
            .json(submission)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(PaymentReceipt {
                booking: submission.booking,
                amount: submission.amount,
            });
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(classify_payment_failure(&body))
    }
}

/// Classify an error body from the payment endpoint. Two wire shapes mean
/// the booking already has a payment: `detail: "Seat already booked."` and
/// a `booking` message array containing "already exists". Both map to the
/// same conflict; anything else is a retryable rejection carrying the raw
/// body. The keyword check is kept for wire compatibility until the
/// service grows a structured error code.
pub fn classify_payment_failure(body: &Value) -> PaymentError {
    let detail_conflict =
        body.get("detail").and_then(Value::as_str) == Some("Seat already booked.");
    let booking_conflict = body
        .get("booking")
        .and_then(Value::as_array)
        .and_then(|messages| messages.first())
        .and_then(Value::as_str)
        .map(|message| message.contains("already exists"))
        .unwrap_or(false);

    if detail_conflict || booking_conflict {
        PaymentError::Conflict {
            reason: SEAT_CONFLICT_REASON.to_string(),
        }
    } else {
        PaymentError::Rejected {
            detail: body.to_string(),
        }
    }
}

fn login_error(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        // The reference backend answers with `error` instead of `message`.
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or("Invalid credentials")
        .to_string()
}

fn registration_error(body: &Value) -> String {
    for field in ["username", "email"] {
        if let Some(message) = body.get(field).and_then(first_message) {
            return message;
        }
    }
    body.to_string()
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_shape_is_a_conflict() {
        let err = classify_payment_failure(&json!({ "detail": "Seat already booked." }));
        assert!(matches!(
            err,
            PaymentError::Conflict { reason } if reason == SEAT_CONFLICT_REASON
        ));
    }

    #[test]
    fn test_booking_field_shape_is_a_conflict() {
        let err = classify_payment_failure(&json!({
            "booking": ["mock payment with this booking already exists."]
        }));
        assert!(matches!(err, PaymentError::Conflict { .. }));
    }

    #[test]
    fn test_other_bodies_fall_through_to_rejection() {
        let body = json!({ "amount": ["Amount must be 500."] });
        let err = classify_payment_failure(&body);
        match err {
            PaymentError::Rejected { detail } => assert!(detail.contains("Amount must be")),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_unrelated_detail_is_not_a_conflict() {
        let err = classify_payment_failure(&json!({ "detail": "Not found." }));
        assert!(matches!(err, PaymentError::Rejected { .. }));
    }

    #[test]
    fn test_login_error_prefers_message_then_error() {
        assert_eq!(login_error(&json!({ "message": "nope" })), "nope");
        assert_eq!(login_error(&json!({ "error": "Invalid credentials" })), "Invalid credentials");
        assert_eq!(login_error(&Value::Null), "Invalid credentials");
    }

    #[test]
    fn test_registration_error_picks_field_messages() {
        let body = json!({ "username": ["A user with that username already exists."] });
        assert_eq!(
            registration_error(&body),
            "A user with that username already exists."
        );
        let body = json!({ "email": ["Enter a valid email address."] });
        assert_eq!(registration_error(&body), "Enter a valid email address.");
    }
}
