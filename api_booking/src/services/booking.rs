use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use db::{dtos::appointment::AppointmentCreateRequest, models::appointment::Appointment};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::booking::BookingRequest;

pub fn validate_interval(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Res<()> {
    if starts_at >= ends_at {
        return Err(AppError::Validation(
            "starts_at must be before ends_at".to_string(),
        ));
    }
    Ok(())
}

/// Creates an appointment if the technician's slot is free.
///
/// The overlap pre-check gives a fast rejection carrying the conflicting
/// appointment's details. Two concurrent requests can both pass it, so
/// the exclusion constraint on the table is the correctness backstop;
/// a constraint violation at insert is resolved back into the same
/// structured conflict error.
pub async fn create_appointment(
    pool: &PgPool,
    booking: &BookingRequest,
    client_id: Uuid,
) -> Res<Appointment> {
    validate_interval(booking.starts_at, booking.ends_at)?;

    if let Some(existing) = db::appointment::find_conflicting(
        pool,
        booking.technician_id,
        booking.starts_at,
        booking.ends_at,
    )
    .await?
    {
        return Err(conflict_error(&existing));
    }

    let request = AppointmentCreateRequest {
        client_id,
        technician_id: booking.technician_id,
        location_id: booking.location_id,
        service_id: booking.service_id,
        starts_at: booking.starts_at,
        ends_at: booking.ends_at,
        deposit_amount: booking.deposit_amount,
        notes: booking.notes.clone(),
    };

    match db::appointment::insert_appointment(pool, &request).await {
        Ok(appointment) => Ok(appointment),
        Err(error) if db::appointment::is_overlap_violation(&error) => {
            // A concurrent booking won the slot between pre-check and
            // insert; report whichever appointment holds it now.
            let existing = db::appointment::find_conflicting(
                pool,
                booking.technician_id,
                booking.starts_at,
                booking.ends_at,
            )
            .await?;
            match existing {
                Some(appointment) => Err(conflict_error(&appointment)),
                None => Err(error),
            }
        }
        Err(error) => Err(error),
    }
}

fn conflict_error(existing: &Appointment) -> AppError {
    AppError::Conflict {
        appointment_id: existing.id,
        starts_at: existing.starts_at,
        ends_at: existing.ends_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn interval_must_be_forward() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap();
        assert!(validate_interval(start, end).is_ok());
        assert!(validate_interval(end, start).is_err());
        assert!(validate_interval(start, start).is_err());
    }
}
