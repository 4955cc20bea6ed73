use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::env_config::Config;
use common::error::Res;
use common::http::Success;
use common::twilio::TwilioClient;
use sqlx::PgPool;

use crate::dtos::verify::{ConfirmCodeRequest, SendCodeRequest};
use crate::services;

/// Sends a verification code to a phone number over SMS.
///
/// # Input
/// - `req`: JSON payload containing the phone number in any common format
///
/// # Output
/// - Success: 200 OK once the code is issued and handed to the gateway
/// - Error: 400 for a missing phone, 429 once the phone's attempt window
///   is exhausted (`retry_after` tells the caller when to come back)
#[post("/send")]
async fn post_send(
    req: web::Json<SendCodeRequest>,
    pool: web::Data<Arc<PgPool>>,
    twilio: web::Data<TwilioClient>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    services::verify::send_code(pg_pool, &twilio, &req.phone).await?;
    Success::ok(serde_json::json!({ "sent": true }))
}

/// Confirms a verification code and issues a session token.
///
/// # Input
/// - `req`: JSON payload containing the phone number and the 6-digit code
///
/// # Output
/// - Success: 200 OK with a session token, the matching client when one
///   exists, and the client's stored cards (unexpired, default first)
/// - Error: structured 4xx bodies with codes TOO_MANY_ATTEMPTS,
///   NO_PENDING_VERIFICATION, EXPIRED_CODE or INVALID_CODE (the latter
///   reporting `attempts_remaining`)
#[post("/confirm")]
async fn post_confirm(
    req: web::Json<ConfirmCodeRequest>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    stripe_client: web::Data<stripe::Client>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let response =
        services::verify::confirm_code(pg_pool, &stripe_client, &config, &req.into_inner()).await?;
    Success::ok(response)
}
