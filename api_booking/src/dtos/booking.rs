use chrono::{DateTime, Utc};
use db::models::{appointment::Appointment, client::Client};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub technician_id: Uuid,
    pub location_id: Uuid,
    pub service_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub deposit_amount: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub appointment: Appointment,
    pub client: Client,
    /// Secret the frontend uses to complete the card-on-file setup.
    pub setup_client_secret: Option<String>,
    /// Session token for the booking client, 30 minutes.
    pub token: String,
}
