use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Opaque donor identifier shared by the profile and statistic sources
pub type DonorId = String;

/// A donor profile as held by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorProfile {
    /// Unique identifier
    pub id: DonorId,

    /// Email address, unique within the store
    pub email: String,

    /// Given name
    pub first_name: Option<String>,

    /// Family name
    pub last_name: Option<String>,

    /// Name shown in the portal
    pub display_name: Option<String>,

    /// Profile creation timestamp
    pub created_at: Option<DateTime<Utc>>,

    /// Most recent login
    pub last_login: Option<DateTime<Utc>>,
}

impl DonorProfile {
    /// Create a new profile with a generated id
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), email)
    }

    /// Create a profile with a caller-supplied id
    pub fn with_id(id: impl Into<DonorId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            display_name: None,
            created_at: Some(Utc::now()),
            last_login: None,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_last_login(mut self, last_login: Option<DateTime<Utc>>) -> Self {
        self.last_login = last_login;
        self
    }

    /// Value of a searchable text column
    pub fn text(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Email => Some(self.email.as_str()),
            TextField::FirstName => self.first_name.as_deref(),
            TextField::LastName => self.last_name.as_deref(),
            TextField::DisplayName => self.display_name.as_deref(),
        }
    }
}

/// Text columns of a donor profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TextField {
    Email,
    FirstName,
    LastName,
    DisplayName,
}

/// A donor profile enriched with pledge statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorRow {
    #[serde(flatten)]
    pub profile: DonorProfile,

    /// Number of pledges made by the donor
    pub pledge_count: u64,

    /// Sum of all pledged amounts
    pub total_donated: Decimal,
}

impl DonorRow {
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn email(&self) -> &str {
        &self.profile.email
    }
}

/// Derived statistic tables keyed by donor id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatisticSource {
    PledgeCount,
    PledgeTotal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_creation() {
        let profile = DonorProfile::new("ada@example.org");

        assert!(!profile.id.is_empty());
        assert_eq!(profile.email, "ada@example.org");
        assert!(profile.created_at.is_some());
        assert!(profile.last_login.is_none());
        assert!(profile.first_name.is_none());
    }

    #[test]
    fn test_text_fields() {
        let profile = DonorProfile::with_id("d-1", "ada@example.org")
            .with_name("Ada", "Lovelace")
            .with_display_name("Countess");

        assert_eq!(profile.text(TextField::Email), Some("ada@example.org"));
        assert_eq!(profile.text(TextField::FirstName), Some("Ada"));
        assert_eq!(profile.text(TextField::LastName), Some("Lovelace"));
        assert_eq!(profile.text(TextField::DisplayName), Some("Countess"));

        let bare = DonorProfile::with_id("d-2", "bare@example.org");
        assert_eq!(bare.text(TextField::DisplayName), None);
    }

    #[test]
    fn test_row_serializes_flat() {
        let row = DonorRow {
            profile: DonorProfile::with_id("d-1", "ada@example.org"),
            pledge_count: 2,
            total_donated: Decimal::new(15000, 2),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], "d-1");
        assert_eq!(json["email"], "ada@example.org");
        assert_eq!(json["pledge_count"], 2);
        assert_eq!(json["total_donated"], "150.00");
    }

    #[test]
    fn test_statistic_source_names() {
        assert_eq!(StatisticSource::PledgeCount.to_string(), "pledge_count");
        assert_eq!(
            serde_json::to_string(&StatisticSource::PledgeTotal).unwrap(),
            r#""pledge_total""#
        );
    }
}
