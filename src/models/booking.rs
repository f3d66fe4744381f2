use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A service booking. The id is caller-supplied (external systems generate
/// their own booking numbers), so the store treats a duplicate id as a
/// conflict rather than reassigning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub status: BookingStatus,
    pub payment: PaymentStatus,
    pub amount: f64,
    pub package_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

/// A validated booking ready for insertion; the store assigns created_at.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub status: BookingStatus,
    pub payment: PaymentStatus,
    pub amount: f64,
    pub package_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    /// Fail-open parse: unrecognized input becomes the default status.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => BookingStatus::Confirmed,
            "completed" => BookingStatus::Completed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }

    /// Lifecycle: Pending -> Confirmed -> Completed, with cancellation
    /// possible from Pending or Confirmed. Completed and Cancelled are
    /// terminal. A no-op transition is always allowed.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cash,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Cash => "Cash",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => PaymentStatus::Paid,
            "cash" => PaymentStatus::Cash,
            _ => PaymentStatus::Pending,
        }
    }

    /// Payment only moves forward out of Pending; no reverse transitions.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        *self == next || *self == PaymentStatus::Pending
    }
}
