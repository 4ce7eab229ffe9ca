use farebox_core::payment::PaymentSubmission;
use farebox_core::validation::{self, FieldErrors};
use farebox_shared::models::Booking;

/// Editable payment fields. The amount is deliberately absent: it is fixed
/// when the form is created for a booking and cannot be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PaymentField {
    NameOnCard,
    CardNumber,
    ExpiryDate,
    Cvv,
}

impl PaymentField {
    pub const ALL: [PaymentField; 4] = [
        PaymentField::NameOnCard,
        PaymentField::CardNumber,
        PaymentField::ExpiryDate,
        PaymentField::Cvv,
    ];

    /// Wire/display name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentField::NameOnCard => "name_on_card",
            PaymentField::CardNumber => "card_number",
            PaymentField::ExpiryDate => "expiry_date",
            PaymentField::Cvv => "cvv",
        }
    }
}

/// Card-payment input tied to one booking. Created when a payment workflow
/// starts and discarded when it completes or is abandoned.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentForm {
    booking_id: i64,
    amount: f64,
    name_on_card: String,
    card_number: String,
    expiry_date: String,
    cvv: String,
}

impl PaymentForm {
    /// Build an empty form for a booking. The amount is copied from the
    /// bus price here and never recomputed.
    pub fn for_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id,
            amount: booking.bus.price,
            name_on_card: String::new(),
            card_number: String::new(),
            expiry_date: String::new(),
            cvv: String::new(),
        }
    }

    pub fn booking_id(&self) -> i64 {
        self.booking_id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn set(&mut self, field: PaymentField, value: impl Into<String>) {
        let value = value.into();
        match field {
            PaymentField::NameOnCard => self.name_on_card = value,
            PaymentField::CardNumber => self.card_number = value,
            PaymentField::ExpiryDate => self.expiry_date = value,
            PaymentField::Cvv => self.cvv = value,
        }
    }

    pub fn value(&self, field: PaymentField) -> &str {
        match field {
            PaymentField::NameOnCard => &self.name_on_card,
            PaymentField::CardNumber => &self.card_number,
            PaymentField::ExpiryDate => &self.expiry_date,
            PaymentField::Cvv => &self.cvv,
        }
    }

    /// Check one field against the card rules.
    pub fn check_field(&self, field: PaymentField) -> Option<String> {
        match field {
            PaymentField::NameOnCard => {
                if !validation::has_text(&self.name_on_card) {
                    return Some("Name on card is required.".to_string());
                }
            }
            PaymentField::CardNumber => {
                if !validation::has_text(&self.card_number) {
                    return Some("Card number is required.".to_string());
                }
                if !validation::is_card_number(&self.card_number) {
                    return Some("Card number must be 13 to 19 digits.".to_string());
                }
            }
            PaymentField::ExpiryDate => {
                if !validation::has_text(&self.expiry_date) {
                    return Some("Expiry date is required.".to_string());
                }
                if !validation::is_expiry_date(&self.expiry_date) {
                    return Some("Expiry date must be in MM/YY format.".to_string());
                }
            }
            PaymentField::Cvv => {
                if !validation::has_text(&self.cvv) {
                    return Some("CVV is required.".to_string());
                }
                if !validation::is_cvv(&self.cvv) {
                    return Some("CVV must be 3 or 4 digits.".to_string());
                }
            }
        }
        None
    }

    /// Whole-form check. Produces a complete replacement error set.
    pub fn validate(&self) -> FieldErrors<PaymentField> {
        let mut errors = FieldErrors::new();
        for field in PaymentField::ALL {
            errors.set(field, self.check_field(field));
        }
        errors
    }

    /// Snapshot for the wire.
    pub fn submission(&self) -> PaymentSubmission {
        PaymentSubmission {
            booking: self.booking_id,
            amount: self.amount,
            name_on_card: self.name_on_card.clone(),
            card_number: self.card_number.clone(),
            expiry_date: self.expiry_date.clone(),
            cvv: self.cvv.clone(),
        }
    }
}
