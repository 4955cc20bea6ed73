use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::http::Success;
use common::twilio::TwilioClient;
use sqlx::PgPool;

use crate::dtos::webhook::InboundSmsEvent;
use crate::services;

/// Receives inbound messages from the SMS gateway.
///
/// # Input
/// - `payload`: Raw form-encoded body; kept raw so the signature check
///   covers every parameter the gateway signed
/// - `req`: HTTP request carrying the `X-Twilio-Signature` header
///
/// # Output
/// - 403 when the signature does not match (nothing is recorded, so a
///   correctly signed retry is still processed)
/// - 200 with an empty body in every other case, including processing
///   failures: the gateway retries on its own schedule and the missing
///   ledger entry, not the response code, is what gates reprocessing
///
/// # Note
/// This endpoint is not called by the frontend. Configure it as the
/// inbound message webhook for your Twilio number, and set
/// TWILIO_WEBHOOK_URL to the exact public URL so signatures validate.
#[post("/sms")]
async fn post_inbound_sms(
    payload: String,
    req: actix_web::HttpRequest,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    twilio: web::Data<TwilioClient>,
) -> Res<impl Responder> {
    let params: Vec<(String, String)> = url::form_urlencoded::parse(payload.as_bytes())
        .into_owned()
        .collect();

    if twilio.is_configured() {
        let signature = match req.headers().get("X-Twilio-Signature") {
            Some(signature) => signature.to_str().unwrap_or(""),
            None => "",
        };
        if !twilio.validate_signature(&config.twilio.webhook_url, &params, signature) {
            return Err(AppError::Forbidden(
                "Invalid webhook signature".to_string(),
            ));
        }
    }

    let Some(event) = InboundSmsEvent::from_params(&params) else {
        log::warn!("Inbound webhook payload missing MessageSid or From");
        return Success::ok_empty();
    };

    let pg_pool: &PgPool = &**pool;
    if let Err(error) = services::inbound::process_inbound(pg_pool, &twilio, &event).await {
        // Swallowed on purpose: an error response would trigger gateway
        // retry storms. The message was not marked processed, so the
        // next redelivery runs the full sequence again.
        log::error!(
            "Processing inbound message {} failed: {}",
            event.message_sid,
            error
        );
    }

    Success::ok_empty()
}
