use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::models::verification::PhoneVerification;

/// Number of unverified rows for a phone created since `since`: the
/// attempt ledger consulted by the lockout check. Verified rows never
/// count.
pub async fn count_unverified_since<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    phone: &str,
    since: DateTime<Utc>,
) -> Res<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM phone_verifications
        WHERE phone = $1 AND verified = FALSE AND created_at >= $2
        "#,
    )
    .bind(phone)
    .bind(since)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn latest_unverified<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    phone: &str,
) -> Res<Option<PhoneVerification>> {
    sqlx::query_as::<_, PhoneVerification>(
        r#"
        SELECT * FROM phone_verifications
        WHERE phone = $1 AND verified = FALSE
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(phone)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_verification<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    phone: &str,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Res<PhoneVerification> {
    sqlx::query_as::<_, PhoneVerification>(
        r#"
        INSERT INTO phone_verifications (phone, code, expires_at)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(phone)
    .bind(code)
    .bind(expires_at)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Consumes every outstanding code for a phone. Run on successful
/// confirmation; marking all unverified rows verified both retires the
/// matched code and clears the phone's attempt history.
pub async fn mark_phone_verified<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    phone: &str,
) -> Res<u64> {
    sqlx::query("UPDATE phone_verifications SET verified = TRUE WHERE phone = $1 AND verified = FALSE")
        .bind(phone)
        .execute(executor)
        .await
        .map(|result| result.rows_affected())
        .map_err(AppError::from)
}
