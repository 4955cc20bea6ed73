use common::{
    error::{AppError, Res},
    phone,
};
use db::{dtos::client::ClientCreateRequest, models::client::Client};
use sqlx::PgPool;
use stripe::Client as StripeClient;

use crate::dtos::booking::BookingRequest;

/// Finds the client owning the booking's phone number, creating one on
/// first contact. The phone is normalized before any read or write, so
/// formatting differences never mint duplicate clients. Contact fields
/// are refreshed from the request; `phone_verified` and `is_blocked` are
/// server-owned and never touched here.
pub async fn find_or_create_client(pool: &PgPool, booking: &BookingRequest) -> Res<Client> {
    let normalized = phone::normalize(&booking.phone);
    if normalized.is_empty() {
        return Err(AppError::Validation("phone is required".to_string()));
    }

    match db::client::get_client_by_phone(pool, &normalized).await? {
        Some(existing) => {
            if existing.is_blocked {
                log::warn!("Blocked client {} attempted to book", existing.id);
                return Err(AppError::Forbidden(
                    "This account cannot book appointments".to_string(),
                ));
            }
            db::client::update_client_contact(
                pool,
                existing.id,
                &booking.first_name,
                &booking.last_name,
                &booking.email,
            )
            .await
        }
        None => {
            db::client::insert_client(
                pool,
                &ClientCreateRequest {
                    first_name: booking.first_name.clone(),
                    last_name: booking.last_name.clone(),
                    phone: normalized,
                    email: booking.email.clone(),
                },
            )
            .await
        }
    }
}

/// Obtain-or-create the client's external payment profile.
///
/// Two concurrent first-time bookings can both observe an empty
/// `stripe_customer_id` and each create a profile; the conditional write
/// lets exactly one persist. The loser keeps the stored id and its
/// freshly minted profile is abandoned (logged for cleanup).
pub async fn link_payment_profile(
    pool: &PgPool,
    stripe_client: &StripeClient,
    client: Client,
) -> Res<(Client, String)> {
    if let Some(customer_id) = client.stripe_customer_id.clone() {
        return Ok((client, customer_id));
    }

    let name = format!("{} {}", client.first_name, client.last_name);
    let customer = common::stripe::create_customer(
        stripe_client,
        &name,
        client.email.as_deref(),
        &client.phone,
    )
    .await?;
    let minted_id = customer.id.to_string();

    let stored = db::client::set_stripe_customer_if_absent(pool, client.id, &minted_id).await?;
    if stored {
        return Ok((
            Client {
                stripe_customer_id: Some(minted_id.clone()),
                ..client
            },
            minted_id,
        ));
    }

    // Lost the race: another writer persisted a profile first.
    let current = db::client::get_client_by_id(pool, client.id).await?;
    let authoritative = current.stripe_customer_id.clone().ok_or_else(|| {
        AppError::Internal(format!(
            "Client {} lost the payment-profile race but has no stored profile",
            current.id
        ))
    })?;
    log::warn!(
        "Abandoning payment profile {} for client {}; {} was stored concurrently",
        minted_id,
        current.id,
        authoritative
    );
    Ok((current, authoritative))
}
