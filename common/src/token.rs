use actix_web::{HttpMessage, HttpResponse, dev::ServiceRequest};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::{
    env_config::TokenConfig,
    error::{AppError, Res},
};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Absent on phone-only tokens, which assert ownership of a phone
    /// number without a known client identity.
    pub client_id: Option<Uuid>,
    pub phone: String,
    pub expires_at: i64,
}

pub struct ClaimsSpec {
    pub client_id: Option<Uuid>,
    pub phone: String,
}

/// Mints a signed session token: the base64url-encoded JSON claims,
/// a `.` separator, and a base64url HMAC-SHA256 tag over the encoded
/// claims. Validity depends only on the secret and the embedded expiry;
/// there is no server-side session state and no revocation.
pub fn create_token(spec: ClaimsSpec, config: &TokenConfig) -> Res<String> {
    let expires_at = Utc::now()
        .checked_add_signed(Duration::minutes(config.expiration_minutes))
        .expect("valid timestamp")
        .timestamp();

    let claims = SessionClaims {
        client_id: spec.client_id,
        phone: spec.phone,
        expires_at,
    };

    let json = serde_json::to_vec(&claims)
        .map_err(|e| AppError::Internal(format!("Failed to serialize claims: {}", e)))?;
    let encoded = URL_SAFE_NO_PAD.encode(json);

    let mut mac = HmacSha256::new_from_slice(config.secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid token secret: {}", e)))?;
    mac.update(encoded.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", encoded, signature))
}

/// Extracts claims from a session token.
/// Requires the token secret.
///
/// The tag comparison is constant-time (`Mac::verify_slice`), and the
/// embedded expiry is checked after the signature, so nothing about the
/// payload is trusted until the tag matches.
pub fn verify_token(token: &str, secret: &str) -> Res<SessionClaims> {
    let (encoded, signature) = token
        .split_once('.')
        .ok_or_else(|| AppError::Forbidden("Malformed session token".to_string()))?;

    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AppError::Forbidden("Malformed session token".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid token secret: {}", e)))?;
    mac.update(encoded.as_bytes());
    mac.verify_slice(&signature_bytes)
        .map_err(|_| AppError::Forbidden("Invalid session token signature".to_string()))?;

    let payload = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| AppError::Forbidden("Malformed session token".to_string()))?;
    let claims: SessionClaims = serde_json::from_slice(&payload)
        .map_err(|_| AppError::Forbidden("Malformed session token".to_string()))?;

    if claims.expires_at < Utc::now().timestamp() {
        return Err(AppError::Forbidden("Session token expired".to_string()));
    }

    Ok(claims)
}

pub fn get_session_claims_or_error(req: &ServiceRequest) -> Result<SessionClaims, HttpResponse> {
    if let Some(claims_res) = req.extensions().get::<Res<SessionClaims>>() {
        match claims_res {
            Ok(claims) => Ok(claims.clone()),
            Err(app_error) => Err(app_error.to_http_response()),
        }
    } else {
        Err(AppError::Forbidden("No session token provided".to_string()).to_http_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(minutes: i64) -> TokenConfig {
        TokenConfig {
            secret: "test-secret".to_string(),
            expiration_minutes: minutes,
        }
    }

    fn spec() -> ClaimsSpec {
        ClaimsSpec {
            client_id: Some(Uuid::new_v4()),
            phone: "7145550100".to_string(),
        }
    }

    #[test]
    fn round_trip() {
        let cfg = config(30);
        let token = create_token(spec(), &cfg).unwrap();
        let claims = verify_token(&token, &cfg.secret).unwrap();
        assert_eq!(claims.phone, "7145550100");
        assert!(claims.client_id.is_some());
    }

    #[test]
    fn phone_only_token_round_trips() {
        let cfg = config(30);
        let token = create_token(
            ClaimsSpec {
                client_id: None,
                phone: "7145550100".to_string(),
            },
            &cfg,
        )
        .unwrap();
        let claims = verify_token(&token, &cfg.secret).unwrap();
        assert!(claims.client_id.is_none());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let cfg = config(30);
        let token = create_token(spec(), &cfg).unwrap();
        let (encoded, signature) = token.split_once('.').unwrap();
        let mut chars: Vec<char> = encoded.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert!(verify_token(&format!("{}.{}", tampered, signature), &cfg.secret).is_err());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let cfg = config(30);
        let token = create_token(spec(), &cfg).unwrap();
        let (encoded, signature) = token.split_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert!(verify_token(&format!("{}.{}", encoded, tampered), &cfg.secret).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let cfg = config(30);
        let token = create_token(spec(), &cfg).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let cfg = config(-1);
        let token = create_token(spec(), &cfg).unwrap();
        assert!(verify_token(&token, &cfg.secret).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_token("not-a-token", "test-secret").is_err());
        assert!(verify_token("a.b.c", "test-secret").is_err());
    }
}
