use chrono::{Duration, Utc};
use common::{error::Res, phone, twilio::TwilioClient};
use sqlx::PgPool;

use crate::{
    dtos::webhook::InboundSmsEvent,
    misc::intent::{self, Intent},
};

/// Stamped into `confirmed_by` for transitions driven by inbound texts.
const CONFIRMED_BY: &str = "sms";
/// Confirmations only apply to appointments starting inside this window.
const CONFIRMATION_HORIZON_DAYS: i64 = 7;
const EVENT_TYPE_INBOUND_SMS: &str = "sms.inbound";

const ACK_CONFIRMED: &str = "Thanks! Your appointment is confirmed. See you soon.";

/// Handles one inbound message end to end.
///
/// Every exit path except an unexpected error ends by appending the
/// message id to the idempotency ledger. On error the ledger entry is
/// deliberately skipped so the gateway's redelivery retries the whole
/// sequence; the HTTP layer still answers 200 either way.
pub async fn process_inbound(
    pool: &PgPool,
    twilio: &TwilioClient,
    event: &InboundSmsEvent,
) -> Res<()> {
    if db::webhook::get_event(pool, &event.message_sid)
        .await?
        .is_some()
    {
        log::debug!("Skipping already-processed message {}", event.message_sid);
        return Ok(());
    }

    match intent::parse(&event.body) {
        Intent::Confirm => handle_confirm(pool, twilio, event).await?,
        Intent::Unknown => {
            log::info!(
                "Unrecognized reply from {} (message {}): {:?}",
                event.from,
                event.message_sid,
                event.body
            );
        }
    }

    mark_processed(pool, event).await
}

async fn handle_confirm(pool: &PgPool, twilio: &TwilioClient, event: &InboundSmsEvent) -> Res<()> {
    let suffix = phone::last_ten_digits(&event.from);
    let Some(client) = db::client::get_client_by_phone_suffix(pool, &suffix).await? else {
        // Never reply to a number we cannot match to a client.
        log::info!("No client matches sender of message {}", event.message_sid);
        return Ok(());
    };

    let now = Utc::now();
    let until = now + Duration::days(CONFIRMATION_HORIZON_DAYS);

    if let Some(appointment) =
        db::appointment::next_pending_for_client(pool, client.id, now, until).await?
    {
        let updated =
            db::appointment::confirm_if_pending(pool, appointment.id, CONFIRMED_BY, now).await?;
        if updated > 0 {
            log::info!(
                "Appointment {} confirmed by {} via message {}",
                appointment.id,
                client.id,
                event.message_sid
            );
            send_ack(twilio, &event.from).await;
        } else {
            // Status changed between selection and the guarded update,
            // e.g. a staff action; the other writer's state stands.
            log::info!(
                "Appointment {} left PENDING concurrently, no transition applied",
                appointment.id
            );
        }
        return Ok(());
    }

    if db::appointment::next_confirmed_for_client(pool, client.id, now, until)
        .await?
        .is_some()
    {
        // Duplicate confirm: acknowledge without touching state.
        send_ack(twilio, &event.from).await;
        return Ok(());
    }

    log::info!(
        "Client {} has nothing to confirm in the next {} days",
        client.id,
        CONFIRMATION_HORIZON_DAYS
    );
    Ok(())
}

/// Acknowledgments are fire-and-forget: a delivery failure never rolls
/// back a committed transition or blocks the ledger write.
async fn send_ack(twilio: &TwilioClient, to: &str) {
    if let Err(error) = twilio.send_message(to, ACK_CONFIRMED).await {
        log::error!("Failed to send confirmation ack to {}: {}", to, error);
    }
}

async fn mark_processed(pool: &PgPool, event: &InboundSmsEvent) -> Res<()> {
    db::webhook::insert_event(
        pool,
        &event.message_sid,
        EVENT_TYPE_INBOUND_SMS,
        &event.from,
        &event.body,
    )
    .await?;
    Ok(())
}
