use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::client::ClientCreateRequest, models::client::Client};

pub async fn get_client_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: Uuid,
) -> Res<Client> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(client_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_client_by_phone<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    phone: &str,
) -> Res<Option<Client>> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE phone = $1")
        .bind(phone)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Matches a client by the trailing digits of their stored phone number.
/// Inbound gateway numbers arrive with a country-code prefix that stored
/// numbers may lack, so equality on the full string is too strict.
pub async fn get_client_by_phone_suffix<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    suffix: &str,
) -> Res<Option<Client>> {
    sqlx::query_as::<_, Client>(
        "SELECT * FROM clients WHERE phone LIKE '%' || $1 ORDER BY updated_at DESC LIMIT 1",
    )
    .bind(suffix)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_client<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &ClientCreateRequest,
) -> Res<Client> {
    sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (first_name, last_name, phone, email)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.phone)
    .bind(&data.email)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Overwrites caller-supplied contact fields only. `phone_verified`,
/// `is_blocked` and `stripe_customer_id` are server-owned and have their
/// own dedicated writes.
pub async fn update_client_contact<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: Uuid,
    first_name: &str,
    last_name: &str,
    email: &Option<String>,
) -> Res<Client> {
    sqlx::query_as::<_, Client>(
        r#"
        UPDATE clients
        SET first_name = $2, last_name = $3, email = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(client_id)
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn set_phone_verified<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    phone: &str,
) -> Res<u64> {
    sqlx::query("UPDATE clients SET phone_verified = TRUE, updated_at = NOW() WHERE phone = $1")
        .bind(phone)
        .execute(executor)
        .await
        .map(|result| result.rows_affected())
        .map_err(AppError::from)
}

/// Conditional write: persists the payment profile id only if none is
/// stored yet. Returns false when another writer got there first, in
/// which case the stored value remains authoritative.
pub async fn set_stripe_customer_if_absent<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: Uuid,
    stripe_customer_id: &str,
) -> Res<bool> {
    sqlx::query(
        r#"
        UPDATE clients
        SET stripe_customer_id = $2, updated_at = NOW()
        WHERE id = $1 AND stripe_customer_id IS NULL
        "#,
    )
    .bind(client_id)
    .bind(stripe_customer_id)
    .execute(executor)
    .await
    .map(|result| result.rows_affected() > 0)
    .map_err(AppError::from)
}
