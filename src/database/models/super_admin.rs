use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Platform operator. Lives outside every tenant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperAdmin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSuperAdmin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
