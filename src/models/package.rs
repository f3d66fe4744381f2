use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: i64,
    pub package_type: String,
    pub title: String,
    pub description: String,
    pub discount_percentage: i64,
    pub original_price: i64,
    pub discounted_price: i64,
    pub sessions: i64,
    pub validity_days: i64,
    /// Marketing feature lines, order-preserving.
    pub features: Vec<String>,
    pub status: PackageStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPackage {
    pub package_type: String,
    pub title: String,
    pub description: String,
    pub discount_percentage: i64,
    pub original_price: i64,
    pub discounted_price: i64,
    pub sessions: i64,
    pub validity_days: i64,
    pub features: Vec<String>,
    pub status: PackageStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Active,
    Inactive,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Active => "active",
            PackageStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "inactive" => PackageStatus::Inactive,
            _ => PackageStatus::Active,
        }
    }
}
