use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row per code send and one per failed confirmation attempt. Rows
/// are never deleted: the unverified rows inside the trailing lockout
/// window double as the attempt ledger for a phone number.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PhoneVerification {
    pub id: Uuid,
    pub phone: String,
    pub code: String,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
