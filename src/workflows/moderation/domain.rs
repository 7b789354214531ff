use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::catalog::{Brand, BrandId};

/// Identifier wrapper for third-party listing submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Moderation status. Listings start `Pending` and move to one terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub fn label(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ListingStatus::Pending)
    }
}

/// Operator verdict on a pending listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approved,
    Rejected,
}

impl ModerationDecision {
    pub fn label(self) -> &'static str {
        self.target_status().label()
    }

    pub fn target_status(self) -> ListingStatus {
        match self {
            ModerationDecision::Approved => ListingStatus::Approved,
            ModerationDecision::Rejected => ListingStatus::Rejected,
        }
    }
}

impl fmt::Display for ModerationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModerationDecision {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" | "approve" => Ok(Self::Approved),
            "rejected" | "reject" => Ok(Self::Rejected),
            other => Err(format!("'{other}' is not a moderation decision")),
        }
    }
}

/// Listing submitted by a private seller, joined with its brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateListing {
    pub id: ListingId,
    pub brand_id: BrandId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: u32,
    pub mileage: u32,
    #[serde(default)]
    pub description: Option<String>,
    pub seller_name: String,
    pub seller_email: String,
    #[serde(default)]
    pub seller_phone: Option<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    /// Submissions are not integrity checked, so the brand may be unresolved.
    #[serde(default)]
    pub brand: Option<Brand>,
}

impl PrivateListing {
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}
