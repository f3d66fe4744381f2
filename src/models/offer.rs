use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A promotional offer. The promo code is unique (uppercase alphanumeric),
/// enforced by the store at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: i64,
    pub title: String,
    pub discount: String,
    pub code: String,
    pub valid_until: String,
    pub status: OfferStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Sanitized and validated offer fields; the code is already uppercased.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub title: String,
    pub discount: String,
    pub code: String,
    pub valid_until: String,
    pub status: OfferStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OfferStatus {
    Active,
    Inactive,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Active => "Active",
            OfferStatus::Inactive => "Inactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "inactive" => OfferStatus::Inactive,
            _ => OfferStatus::Active,
        }
    }
}
