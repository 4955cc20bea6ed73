use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::models::webhook::WebhookEvent;

pub async fn get_event<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    event_id: &str,
) -> Res<Option<WebhookEvent>> {
    sqlx::query_as::<_, WebhookEvent>("SELECT * FROM webhook_events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Appends to the idempotency ledger. The natural-key insert ignores
/// duplicates; returns false when the event id was already recorded.
pub async fn insert_event<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    event_id: &str,
    event_type: &str,
    from_number: &str,
    body: &str,
) -> Res<bool> {
    sqlx::query(
        r#"
        INSERT INTO webhook_events (id, event_type, from_number, body)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(event_id)
    .bind(event_type)
    .bind(from_number)
    .bind(body)
    .execute(executor)
    .await
    .map(|result| result.rows_affected() > 0)
    .map_err(AppError::from)
}
