use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::http::Success;
use common::token::{self, ClaimsSpec};
use sqlx::PgPool;

use crate::dtos::booking::{BookingRequest, BookingResponse};
use crate::services;

/// Books an appointment slot and sets up card-on-file for the client.
///
/// # Input
/// - `req`: JSON payload with the client's contact details and the
///   requested slot (technician, location, service, start/end time)
///
/// # Output
/// - Success: 201 Created with the appointment, the resolved client, a
///   Stripe setup secret for storing a card without charging it, and a
///   session token for the client
/// - Error: 400 for missing fields, 403 for blocked clients, 409 with
///   the conflicting appointment's id and times when the slot is taken
#[post("")]
async fn post_booking(
    req: web::Json<BookingRequest>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    stripe_client: web::Data<stripe::Client>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let booking = req.into_inner();

    if booking.first_name.trim().is_empty() || booking.last_name.trim().is_empty() {
        return Err(AppError::Validation(
            "first_name and last_name are required".to_string(),
        ));
    }

    let client = services::client::find_or_create_client(pg_pool, &booking).await?;
    let appointment = services::booking::create_appointment(pg_pool, &booking, client.id).await?;

    let (client, customer_id) =
        services::client::link_payment_profile(pg_pool, &stripe_client, client).await?;
    let setup_intent = common::stripe::create_setup_intent(&stripe_client, &customer_id).await?;

    let token = token::create_token(
        ClaimsSpec {
            client_id: Some(client.id),
            phone: client.phone.clone(),
        },
        &config.token_config,
    )?;

    Success::created(BookingResponse {
        appointment,
        client,
        setup_client_secret: setup_intent.client_secret,
        token,
    })
}
