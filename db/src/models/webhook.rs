use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only idempotency ledger for inbound gateway messages, keyed by
/// the gateway's message id. A row's existence means "already handled".
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub from_number: String,
    pub body: String,
    pub processed_at: DateTime<Utc>,
}
