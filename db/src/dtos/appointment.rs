use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentCreateRequest {
    pub client_id: Uuid,
    pub technician_id: Uuid,
    pub location_id: Uuid,
    pub service_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub deposit_amount: Option<i64>,
    pub notes: Option<String>,
}
