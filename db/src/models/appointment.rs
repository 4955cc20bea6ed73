use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Cancelled,
    Completed,
    NoShow,
}

impl ToString for AppointmentStatus {
    fn to_string(&self) -> String {
        match self {
            AppointmentStatus::Pending => "PENDING".to_string(),
            AppointmentStatus::Confirmed => "CONFIRMED".to_string(),
            AppointmentStatus::CheckedIn => "CHECKED_IN".to_string(),
            AppointmentStatus::Cancelled => "CANCELLED".to_string(),
            AppointmentStatus::Completed => "COMPLETED".to_string(),
            AppointmentStatus::NoShow => "NO_SHOW".to_string(),
        }
    }
}

impl AppointmentStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(AppointmentStatus::Pending),
            "CONFIRMED" => Some(AppointmentStatus::Confirmed),
            "CHECKED_IN" => Some(AppointmentStatus::CheckedIn),
            "CANCELLED" => Some(AppointmentStatus::Cancelled),
            "COMPLETED" => Some(AppointmentStatus::Completed),
            "NO_SHOW" => Some(AppointmentStatus::NoShow),
            _ => None,
        }
    }

    /// Active statuses occupy their time slot for conflict purposes.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed | AppointmentStatus::CheckedIn
        )
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub technician_id: Uuid,
    pub location_id: Uuid,
    pub service_id: Uuid,
    /// Half-open interval: the slot occupies [starts_at, ends_at).
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: String,
    /// Deposit in cents, when the service requires one.
    pub deposit_amount: Option<i64>,
    pub deposit_paid_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::CheckedIn,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
            AppointmentStatus::NoShow,
        ] {
            assert_eq!(
                AppointmentStatus::from_str(&status.to_string()),
                Some(status)
            );
        }
        assert_eq!(AppointmentStatus::from_str("pending"), None);
    }

    #[test]
    fn only_pending_confirmed_checked_in_are_active() {
        assert!(AppointmentStatus::Pending.is_active());
        assert!(AppointmentStatus::Confirmed.is_active());
        assert!(AppointmentStatus::CheckedIn.is_active());
        assert!(!AppointmentStatus::Cancelled.is_active());
        assert!(!AppointmentStatus::Completed.is_active());
        assert!(!AppointmentStatus::NoShow.is_active());
    }
}
