use crate::models::{PaymentField, PaymentForm};
use farebox_core::payment::{PaymentError, PaymentGateway, PaymentReceipt};
use farebox_core::validation::FieldErrors;
use farebox_shared::models::Booking;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Fixed delay before the caller returns to the booking-list view after a
/// completed payment.
pub const HOME_REDIRECT_DELAY: Duration = Duration::from_secs(5);

/// Payment workflow step. Transitions are strictly forward except the
/// failure path, which returns to `Form` for a retry. `Conflict` is the
/// terminal-by-redirect outcome; there is no path out of it, `Confirmed`
/// or `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStep {
    Form,
    Submitting,
    Confirmed,
    Completed,
    Conflict,
}

/// Resolution of one confirm action.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// Submission accepted; carries the fixed form amount.
    Confirmed { amount: f64 },
    /// The booking already has a payment. Reason string for the
    /// error-display collaborator.
    Conflict { reason: String },
    /// Submission rejected or transport failed; back on the form with the
    /// message retained for display.
    Failed { message: String },
    /// Whole-form validation failed; nothing left the client.
    Invalid(FieldErrors<PaymentField>),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("A payment submission is already in flight")]
    SubmissionInFlight,

    #[error("Cannot {action} from step {step:?}")]
    InvalidStep {
        step: WorkflowStep,
        action: &'static str,
    },
}

/// One attempt to pay for one booking. Owns its form, touched flags and
/// step; discarded once `Completed` or abandoned.
pub struct PaymentWorkflow {
    gateway: Arc<dyn PaymentGateway>,
    form: PaymentForm,
    step: WorkflowStep,
    touched: BTreeSet<PaymentField>,
    errors: FieldErrors<PaymentField>,
    status: Option<String>,
}

impl PaymentWorkflow {
    pub fn start(booking: &Booking, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            form: PaymentForm::for_booking(booking),
            step: WorkflowStep::Form,
            touched: BTreeSet::new(),
            errors: FieldErrors::new(),
            status: None,
        }
    }

    pub fn step(&self) -> &WorkflowStep {
        &self.step
    }

    pub fn form(&self) -> &PaymentForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors<PaymentField> {
        &self.errors
    }

    /// Status message retained from the last failed submission.
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Value-change mode: update the field, and re-check it only if it was
    /// previously touched. Ignored outside the form step.
    pub fn edit(&mut self, field: PaymentField, value: impl Into<String>) {
        if self.step != WorkflowStep::Form {
            return;
        }
        self.form.set(field, value);
        if self.touched.contains(&field) {
            self.errors.set(field, self.form.check_field(field));
        }
    }

    /// First-blur mode: mark the field touched and check it.
    pub fn blur(&mut self, field: PaymentField) {
        if self.step != WorkflowStep::Form {
            return;
        }
        self.touched.insert(field);
        self.errors.set(field, self.form.check_field(field));
    }

    /// Confirm action: whole-form validation gates the submission, the
    /// submission is issued at most once per Submitting entry, and every
    /// resolution path clears the in-flight gate before returning.
    pub async fn confirm(&mut self) -> Result<ConfirmOutcome, WorkflowError> {
        match self.step {
            WorkflowStep::Form => {}
            WorkflowStep::Submitting => return Err(WorkflowError::SubmissionInFlight),
            ref step => {
                return Err(WorkflowError::InvalidStep {
                    step: step.clone(),
                    action: "confirm",
                })
            }
        }

        self.touched.extend(PaymentField::ALL);
        let errors = self.form.validate();
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Ok(ConfirmOutcome::Invalid(errors));
        }
        self.errors = errors;
        self.status = None;

        self.step = WorkflowStep::Submitting;
        tracing::info!(
            booking = self.form.booking_id(),
            amount = self.form.amount(),
            "Submitting payment"
        );
        match self.gateway.submit_payment(&self.form.submission()).await {
            Ok(_) => {
                self.step = WorkflowStep::Confirmed;
                Ok(ConfirmOutcome::Confirmed {
                    amount: self.form.amount(),
                })
            }
            Err(PaymentError::Conflict { reason }) => {
                self.step = WorkflowStep::Conflict;
                Ok(ConfirmOutcome::Conflict { reason })
            }
            Err(err) => {
                self.step = WorkflowStep::Form;
                let message = err.to_string();
                self.status = Some(message.clone());
                Ok(ConfirmOutcome::Failed { message })
            }
        }
    }

    /// User acknowledges the confirmed payment: Confirmed → Completed.
    /// Reports booking identity and amount read-only; the caller returns
    /// to the booking list after `HOME_REDIRECT_DELAY`.
    pub fn acknowledge(&mut self) -> Result<PaymentReceipt, WorkflowError> {
        if self.step != WorkflowStep::Confirmed {
            return Err(WorkflowError::InvalidStep {
                step: self.step.clone(),
                action: "acknowledge",
            });
        }
        self.step = WorkflowStep::Completed;
        Ok(PaymentReceipt {
            booking: self.form.booking_id(),
            amount: self.form.amount(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use farebox_core::payment::{PaymentSubmission, SEAT_CONFLICT_REASON};
    use farebox_shared::models::{Bus, Seat};
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum StubMode {
        Success,
        Conflict,
        Reject,
    }

    struct StubGateway {
        mode: StubMode,
        calls: AtomicUsize,
    }

    impl StubGateway {
        fn new(mode: StubMode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn submit_payment(
            &self,
            submission: &PaymentSubmission,
        ) -> Result<PaymentReceipt, PaymentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                StubMode::Success => Ok(PaymentReceipt {
                    booking: submission.booking,
                    amount: submission.amount,
                }),
                StubMode::Conflict => Err(PaymentError::Conflict {
                    reason: SEAT_CONFLICT_REASON.to_string(),
                }),
                StubMode::Reject => Err(PaymentError::Rejected {
                    detail: r#"{"amount":["Amount must be 500."]}"#.to_string(),
                }),
            }
        }
    }

    fn booking() -> Booking {
        Booking {
            id: 7,
            user: Some("asha".to_string()),
            bus: Bus {
                bus_name: "Garuda Express".to_string(),
                number: "KA-01-F-2201".to_string(),
                origin: "Bangalore".to_string(),
                destination: "Chennai".to_string(),
                price: 500.0,
            },
            seat: Seat {
                id: 41,
                seat_number: "12A".to_string(),
                is_booked: true,
            },
            origin: None,
            destination: None,
            price: Some(500.0),
            booking_time: Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap(),
        }
    }

    fn fill_valid(workflow: &mut PaymentWorkflow) {
        workflow.edit(PaymentField::NameOnCard, "A Rider");
        workflow.edit(PaymentField::CardNumber, "4111 1111 1111 1111");
        workflow.edit(PaymentField::ExpiryDate, "12/29");
        workflow.edit(PaymentField::Cvv, "123");
    }

    #[tokio::test]
    async fn test_payment_lifecycle() {
        let gateway = StubGateway::new(StubMode::Success);
        let mut workflow = PaymentWorkflow::start(&booking(), gateway.clone());
        assert_eq!(*workflow.step(), WorkflowStep::Form);

        fill_valid(&mut workflow);
        let outcome = workflow.confirm().await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Confirmed { amount: 500.0 });
        assert_eq!(*workflow.step(), WorkflowStep::Confirmed);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

        let receipt = workflow.acknowledge().unwrap();
        assert_eq!(receipt.booking, 7);
        assert_eq!(receipt.amount, 500.0);
        assert_eq!(*workflow.step(), WorkflowStep::Completed);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_gateway() {
        let gateway = StubGateway::new(StubMode::Success);
        let mut workflow = PaymentWorkflow::start(&booking(), gateway.clone());

        let outcome = workflow.confirm().await.unwrap();
        match outcome {
            ConfirmOutcome::Invalid(errors) => assert_eq!(errors.len(), 4),
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert_eq!(*workflow.step(), WorkflowStep::Form);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_conflict_is_terminal_with_reason() {
        let gateway = StubGateway::new(StubMode::Conflict);
        let mut workflow = PaymentWorkflow::start(&booking(), gateway);

        fill_valid(&mut workflow);
        let outcome = workflow.confirm().await.unwrap();
        assert_eq!(
            outcome,
            ConfirmOutcome::Conflict {
                reason: SEAT_CONFLICT_REASON.to_string()
            }
        );
        assert_eq!(*workflow.step(), WorkflowStep::Conflict);

        // No way out of a conflicted instance.
        assert!(workflow.confirm().await.is_err());
        assert!(workflow.acknowledge().is_err());
    }

    #[tokio::test]
    async fn test_rejection_returns_to_form_and_allows_retry() {
        let gateway = StubGateway::new(StubMode::Reject);
        let mut workflow = PaymentWorkflow::start(&booking(), gateway.clone());

        fill_valid(&mut workflow);
        let outcome = workflow.confirm().await.unwrap();
        match outcome {
            ConfirmOutcome::Failed { message } => {
                assert!(message.starts_with("Payment failed: "));
                assert_eq!(workflow.status_message(), Some(message.as_str()));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(*workflow.step(), WorkflowStep::Form);

        // Retry submits again.
        workflow.confirm().await.unwrap();
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_edit_rechecks_only_touched_fields() {
        let gateway = StubGateway::new(StubMode::Success);
        let mut workflow = PaymentWorkflow::start(&booking(), gateway);

        // Untouched: editing records no error even for a bad value.
        workflow.edit(PaymentField::CardNumber, "123");
        assert!(workflow.errors().is_empty());

        // Blur marks touched and surfaces the failure.
        workflow.blur(PaymentField::CardNumber);
        assert_eq!(
            workflow.errors().message(PaymentField::CardNumber),
            Some("Card number must be 13 to 19 digits.")
        );

        // Once touched, a correcting edit clears the error.
        workflow.edit(PaymentField::CardNumber, "4111 1111 1111 1111");
        assert!(workflow.errors().is_empty());
    }

    #[tokio::test]
    async fn test_completed_is_terminal() {
        let gateway = StubGateway::new(StubMode::Success);
        let mut workflow = PaymentWorkflow::start(&booking(), gateway);

        fill_valid(&mut workflow);
        workflow.confirm().await.unwrap();
        workflow.acknowledge().unwrap();

        assert!(matches!(
            workflow.confirm().await,
            Err(WorkflowError::InvalidStep { .. })
        ));
        assert!(workflow.acknowledge().is_err());
    }
}
