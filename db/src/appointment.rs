use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::appointment::AppointmentCreateRequest,
    models::appointment::{Appointment, AppointmentStatus},
};

/// Name of the exclusion constraint that enforces technician-interval
/// disjointness at write time. Insert errors carrying this constraint are
/// mapped to a booking conflict by the service layer.
pub const NO_OVERLAP_CONSTRAINT: &str = "appointments_no_overlap";

/// Earliest active appointment overlapping the half-open interval
/// [starts_at, ends_at) for a technician. Overlap test: an existing row
/// conflicts iff existing.starts_at < ends_at AND existing.ends_at >
/// starts_at, so touching boundaries do not collide.
pub async fn find_conflicting<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    technician_id: Uuid,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Res<Option<Appointment>> {
    sqlx::query_as::<_, Appointment>(
        r#"
        SELECT * FROM appointments
        WHERE technician_id = $1
          AND status IN ('PENDING', 'CONFIRMED', 'CHECKED_IN')
          AND starts_at < $3
          AND ends_at > $2
        ORDER BY starts_at
        LIMIT 1
        "#,
    )
    .bind(technician_id)
    .bind(starts_at)
    .bind(ends_at)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_appointment<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &AppointmentCreateRequest,
) -> Res<Appointment> {
    sqlx::query_as::<_, Appointment>(
        r#"
        INSERT INTO appointments
            (client_id, technician_id, location_id, service_id, starts_at, ends_at, deposit_amount, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(data.client_id)
    .bind(data.technician_id)
    .bind(data.location_id)
    .bind(data.service_id)
    .bind(data.starts_at)
    .bind(data.ends_at)
    .bind(data.deposit_amount)
    .bind(&data.notes)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Earliest PENDING appointment for a client starting inside [from, until).
pub async fn next_pending_for_client<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: Uuid,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Res<Option<Appointment>> {
    sqlx::query_as::<_, Appointment>(
        r#"
        SELECT * FROM appointments
        WHERE client_id = $1
          AND status = $4
          AND starts_at >= $2
          AND starts_at < $3
        ORDER BY starts_at
        LIMIT 1
        "#,
    )
    .bind(client_id)
    .bind(from)
    .bind(until)
    .bind(AppointmentStatus::Pending.to_string())
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Earliest already-CONFIRMED appointment for a client starting inside
/// [from, until). Used to treat repeat confirmations as duplicates.
pub async fn next_confirmed_for_client<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: Uuid,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Res<Option<Appointment>> {
    sqlx::query_as::<_, Appointment>(
        r#"
        SELECT * FROM appointments
        WHERE client_id = $1
          AND status = $4
          AND starts_at >= $2
          AND starts_at < $3
        ORDER BY starts_at
        LIMIT 1
        "#,
    )
    .bind(client_id)
    .bind(from)
    .bind(until)
    .bind(AppointmentStatus::Confirmed.to_string())
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Conditional transition PENDING -> CONFIRMED. Returns the number of
/// rows updated: zero means the status changed concurrently and the
/// caller must not treat the transition as applied.
pub async fn confirm_if_pending<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    appointment_id: Uuid,
    confirmed_by: &str,
    confirmed_at: DateTime<Utc>,
) -> Res<u64> {
    sqlx::query(
        r#"
        UPDATE appointments
        SET status = $4, confirmed_at = $2, confirmed_by = $3
        WHERE id = $1 AND status = $5
        "#,
    )
    .bind(appointment_id)
    .bind(confirmed_at)
    .bind(confirmed_by)
    .bind(AppointmentStatus::Confirmed.to_string())
    .bind(AppointmentStatus::Pending.to_string())
    .execute(executor)
    .await
    .map(|result| result.rows_affected())
    .map_err(AppError::from)
}

/// Whether an insert failure came from the technician-interval exclusion
/// constraint, i.e. a concurrent booking won the slot between the
/// pre-check and the insert.
pub fn is_overlap_violation(error: &AppError) -> bool {
    match error {
        AppError::Database(sqlx::Error::Database(db_err)) => {
            db_err.constraint() == Some(NO_OVERLAP_CONSTRAINT)
        }
        _ => false,
    }
}
