use chrono::{Datelike, Duration, Utc};
use common::{
    env_config::Config,
    error::{AppError, Res},
    phone,
    token::{self, ClaimsSpec},
    twilio::TwilioClient,
};
use db::models::client::Client;
use rand::Rng;
use sqlx::PgPool;
use stripe::Client as StripeClient;

use crate::dtos::verify::{ConfirmCodeRequest, ConfirmResponse, StoredPaymentMethod};

/// Failed attempts (and sends) allowed per phone inside the window.
const MAX_ATTEMPTS: i64 = 5;
/// Trailing lockout window, also the advertised retry-after.
const ATTEMPT_WINDOW_SECS: i64 = 15 * 60;
/// Lifetime of an issued code.
const CODE_TTL_MINUTES: i64 = 10;

/// Issues a verification code for a phone number and delivers it over
/// SMS. Sends draw from the same attempt window as confirmations, so a
/// phone cannot be flooded with codes past the lockout.
pub async fn send_code(pool: &PgPool, twilio: &TwilioClient, raw_phone: &str) -> Res<()> {
    let phone = phone::normalize(raw_phone);
    if phone.is_empty() {
        return Err(AppError::Validation("phone is required".to_string()));
    }

    if unverified_rows_in_window(pool, &phone).await? >= MAX_ATTEMPTS {
        return Err(AppError::RateLimited {
            retry_after_secs: ATTEMPT_WINDOW_SECS as u64,
        });
    }

    let code = format!("{:06}", rand::rng().random_range(0..1_000_000));
    let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);
    db::verification::insert_verification(pool, &phone, &code, expires_at).await?;

    twilio
        .send_message(
            &phone::to_e164(&phone),
            &format!(
                "Your verification code is {}. It expires in {} minutes.",
                code, CODE_TTL_MINUTES
            ),
        )
        .await?;

    Ok(())
}

/// Confirms a verification code and mints a session.
///
/// The failure ladder is ordered so an attacker learns as little as
/// possible: lockout first, then existence of a pending code, then
/// expiry, then the constant-time code comparison. A failed comparison
/// is recorded as a fresh unverified row (carrying the stored code, so
/// the latest row remains the live one) which is what advances the
/// lockout counter.
pub async fn confirm_code(
    pool: &PgPool,
    stripe_client: &StripeClient,
    config: &Config,
    req: &ConfirmCodeRequest,
) -> Res<ConfirmResponse> {
    let phone = phone::normalize(&req.phone);
    if phone.is_empty() || req.code.trim().is_empty() {
        return Err(AppError::Validation("phone and code are required".to_string()));
    }

    // The newest unverified row is the live code from the send; rows
    // beyond it are recorded failures. Locking out on the failures alone
    // gives exactly MAX_ATTEMPTS wrong guesses per issued code window.
    let rows_in_window = unverified_rows_in_window(pool, &phone).await?;
    let prior_failures = (rows_in_window - 1).max(0);
    if prior_failures >= MAX_ATTEMPTS {
        return Err(AppError::RateLimited {
            retry_after_secs: ATTEMPT_WINDOW_SECS as u64,
        });
    }

    let pending = db::verification::latest_unverified(pool, &phone)
        .await?
        .ok_or(AppError::NoPendingVerification)?;

    if Utc::now() > pending.expires_at {
        return Err(AppError::CodeExpired);
    }

    if !constant_time_eq(req.code.trim().as_bytes(), pending.code.as_bytes()) {
        db::verification::insert_verification(pool, &phone, &pending.code, pending.expires_at)
            .await?;
        let attempts_remaining = (MAX_ATTEMPTS - prior_failures - 1).max(0) as u32;
        return Err(AppError::InvalidCode { attempts_remaining });
    }

    // Consume every outstanding code for the phone; this also clears the
    // attempt history so the next issued code starts clean.
    db::verification::mark_phone_verified(pool, &phone).await?;

    // Best effort: a verification without a client account is fine.
    if let Err(error) = db::client::set_phone_verified(pool, &phone).await {
        log::warn!("Failed to flag client {} as verified: {}", phone, error);
    }

    let client = db::client::get_client_by_phone(pool, &phone).await?;
    let payment_methods = match &client {
        Some(client) => stored_payment_methods(stripe_client, client).await,
        None => Vec::new(),
    };

    let token = token::create_token(
        ClaimsSpec {
            client_id: client.as_ref().map(|c| c.id),
            phone: phone.clone(),
        },
        &config.token_config,
    )?;

    Ok(ConfirmResponse {
        token,
        client,
        payment_methods,
    })
}

/// Unverified rows for the phone inside the trailing window: issued
/// codes plus recorded failures. Successfully verified rows never
/// count, so a confirmation wipes the history clean.
async fn unverified_rows_in_window(pool: &PgPool, phone: &str) -> Res<i64> {
    let window_start = Utc::now() - Duration::seconds(ATTEMPT_WINDOW_SECS);
    db::verification::count_unverified_since(pool, phone, window_start).await
}

/// The client's stored cards, expired ones dropped, default card first,
/// then most recently added. Card listing failures degrade to an empty
/// list rather than failing a confirmation that has already committed.
async fn stored_payment_methods(
    stripe_client: &StripeClient,
    client: &Client,
) -> Vec<StoredPaymentMethod> {
    let Some(customer_id) = client.stripe_customer_id.as_deref() else {
        return Vec::new();
    };

    let fetched = async {
        let customer = common::stripe::get_customer(stripe_client, customer_id).await?;
        let default_id = common::stripe::default_payment_method_id(&customer);
        let methods =
            common::stripe::list_card_payment_methods(stripe_client, customer_id).await?;
        Ok::<_, AppError>((methods, default_id))
    }
    .await;

    match fetched {
        Ok((methods, default_id)) => {
            let cards = methods
                .into_iter()
                .filter_map(|pm| {
                    let id = pm.id.to_string();
                    let card = pm.card.as_ref()?;
                    Some(StoredPaymentMethod {
                        is_default: default_id.as_deref() == Some(id.as_str()),
                        id,
                        brand: card.brand.clone(),
                        last4: card.last4.clone(),
                        exp_month: card.exp_month,
                        exp_year: card.exp_year,
                        created: pm.created,
                    })
                })
                .collect();
            let now = Utc::now();
            current_cards_ordered(cards, now.year() as i64, now.month() as i64)
        }
        Err(error) => {
            log::error!(
                "Failed to list payment methods for client {}: {}",
                client.id,
                error
            );
            Vec::new()
        }
    }
}

/// Drops cards whose expiry month is strictly before the current month
/// and orders the rest default-first, then most recently added.
fn current_cards_ordered(
    mut cards: Vec<StoredPaymentMethod>,
    current_year: i64,
    current_month: i64,
) -> Vec<StoredPaymentMethod> {
    cards.retain(|card| {
        card.exp_year > current_year
            || (card.exp_year == current_year && card.exp_month >= current_month)
    });
    cards.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then(b.created.cmp(&a.created))
    });
    cards
}

/// Equality check whose timing does not depend on the position of the
/// first mismatch. Length is not secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, exp_month: i64, exp_year: i64, is_default: bool, created: i64) -> StoredPaymentMethod {
        StoredPaymentMethod {
            id: id.to_string(),
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month,
            exp_year,
            is_default,
            created,
        }
    }

    #[test]
    fn constant_time_eq_matches_equal_inputs() {
        assert!(constant_time_eq(b"123456", b"123456"));
        assert!(!constant_time_eq(b"123456", b"123457"));
        assert!(!constant_time_eq(b"123456", b"12345"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn cards_expiring_before_current_month_are_dropped() {
        let cards = vec![
            card("pm_past", 7, 2026, false, 10),
            card("pm_this_month", 8, 2026, false, 20),
            card("pm_future", 1, 2027, false, 30),
            card("pm_last_year", 12, 2025, false, 40),
        ];
        let kept = current_cards_ordered(cards, 2026, 8);
        let ids: Vec<&str> = kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["pm_future", "pm_this_month"]);
    }

    #[test]
    fn default_card_sorts_first_then_newest() {
        let cards = vec![
            card("pm_old", 1, 2030, false, 100),
            card("pm_default", 1, 2030, true, 50),
            card("pm_new", 1, 2030, false, 200),
        ];
        let kept = current_cards_ordered(cards, 2026, 8);
        let ids: Vec<&str> = kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["pm_default", "pm_new", "pm_old"]);
    }
}
