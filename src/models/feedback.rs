use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Client feedback. The booking link and contact details are all optional so
/// anonymous reviews are valid, and nothing limits how many feedback entries
/// reference one booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: i64,
    pub booking_id: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub rating: i64,
    pub comment: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub booking_id: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub rating: i64,
    pub comment: String,
}
