use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Digits-only canonical form, unique per client.
    pub phone: String,
    pub email: Option<String>,
    /// Server-owned: set by the verification gate, never by client input.
    pub phone_verified: bool,
    /// Server-owned: set by staff, never by client input.
    pub is_blocked: bool,
    pub block_reason: Option<String>,
    /// External payment profile id, set at most once via a conditional write.
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
