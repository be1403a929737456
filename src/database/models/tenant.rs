use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Trial,
    Active,
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Trial => "trial",
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(TenantStatus::Trial),
            "active" => Ok(TenantStatus::Active),
            "suspended" => Ok(TenantStatus::Suspended),
            other => Err(UnknownVariant { kind: "tenant status", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessProfile {
    pub verticals: Vec<String>,
    pub use_cases: Vec<String>,
}

/// Per-tenant resource limits. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantQuota {
    pub max_users: Option<i64>,
    pub max_products: Option<i64>,
}

impl TenantQuota {
    pub fn allows_users(&self, current: i64) -> bool {
        self.max_users.map_or(true, |max| current < max)
    }

    pub fn allows_products(&self, current: i64) -> bool {
        self.max_products.map_or(true, |max| current < max)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: TenantStatus,
    pub owner_user_id: Uuid,
    pub owner_email: String,
    #[serde(skip_serializing)]
    pub invite_token_hash: Option<String>,
    pub invite_accepted: bool,
    pub invite_expires_at: Option<DateTime<Utc>>,
    pub contact: TenantContact,
    pub business: BusinessProfile,
    pub quota: TenantQuota,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Whether tenant users may operate on tenant data at all.
    pub fn is_operable(&self) -> bool {
        self.status != TenantStatus::Suspended
    }
}

/// Tenant record as produced by provisioning, before it is stored. The
/// owner reference is taken from the owner user inserted alongside it.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub owner_email: String,
    pub invite_token_hash: String,
    pub invite_expires_at: DateTime<Utc>,
    pub contact: TenantContact,
    pub business: BusinessProfile,
    pub quota: TenantQuota,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [TenantStatus::Trial, TenantStatus::Active, TenantStatus::Suspended] {
            assert_eq!(status.as_str().parse::<TenantStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<TenantStatus>().is_err());
    }

    #[test]
    fn quota_limits() {
        let quota = TenantQuota { max_users: Some(2), max_products: None };
        assert!(quota.allows_users(1));
        assert!(!quota.allows_users(2));
        assert!(quota.allows_products(1_000_000));
    }
}
