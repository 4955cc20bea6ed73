use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha1::Sha1;

use crate::{
    env_config::TwilioConfig,
    error::{AppError, Res},
};

type HmacSha1 = Hmac<Sha1>;

/// Thin client for the Twilio messaging API, constructed once at process
/// startup and injected into the handlers that send or receive messages.
#[derive(Clone)]
pub struct TwilioClient {
    account_sid: String,
    auth_token: String,
    from_number: String,
    http: Client,
}

impl TwilioClient {
    pub fn new(config: &TwilioConfig) -> Self {
        Self {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            http: Client::new(),
        }
    }

    /// Whether credentials are configured. Unconfigured environments skip
    /// outbound sends and inbound signature checks.
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty()
    }

    /// Sends an outbound SMS through the Twilio Messages API.
    pub async fn send_message(&self, to: &str, body: &str) -> Res<()> {
        if !self.is_configured() {
            log::warn!("Twilio credentials not configured, dropping message to {}", to);
            return Ok(());
        }

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );

        let form = [
            ("To", to),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            log::error!("Twilio send to {} failed ({}): {}", to, status, detail);
            return Err(AppError::Internal(format!(
                "Twilio returned error status {}",
                status
            )));
        }

        Ok(())
    }

    /// Validates the `X-Twilio-Signature` header of an inbound webhook
    /// request against the full callback URL and every posted parameter.
    /// The comparison is constant-time.
    pub fn validate_signature(&self, url: &str, params: &[(String, String)], provided: &str) -> bool {
        let Ok(signature) = STANDARD.decode(provided) else {
            return false;
        };
        let Ok(mut mac) = HmacSha1::new_from_slice(self.auth_token.as_bytes()) else {
            return false;
        };
        mac.update(signed_payload(url, params).as_bytes());
        mac.verify_slice(&signature).is_ok()
    }

    /// Computes the signature Twilio would attach to a request. Used by
    /// tests and local tooling to produce validly signed payloads.
    pub fn sign(&self, url: &str, params: &[(String, String)]) -> String {
        let mut mac = HmacSha1::new_from_slice(self.auth_token.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signed_payload(url, params).as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// The string Twilio signs: the full callback URL followed by each POST
/// parameter name and value, concatenated in parameter-name order.
fn signed_payload(url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let mut data = String::from(url);
    for (name, value) in sorted {
        data.push_str(name);
        data.push_str(value);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> TwilioClient {
        TwilioClient::new(&TwilioConfig {
            account_sid: "AC0000".to_string(),
            auth_token: "secret-auth-token".to_string(),
            from_number: "+17145550199".to_string(),
            webhook_url: "https://example.com/api/webhooks/sms".to_string(),
        })
    }

    fn params() -> Vec<(String, String)> {
        vec![
            ("MessageSid".to_string(), "SM123".to_string()),
            ("Body".to_string(), "yes".to_string()),
            ("From".to_string(), "+17145550100".to_string()),
        ]
    }

    #[test]
    fn signed_request_validates() {
        let client = test_client();
        let url = "https://example.com/api/webhooks/sms";
        let signature = client.sign(url, &params());
        assert!(client.validate_signature(url, &params(), &signature));
    }

    #[test]
    fn signature_covers_parameter_values() {
        let client = test_client();
        let url = "https://example.com/api/webhooks/sms";
        let signature = client.sign(url, &params());

        let mut tampered = params();
        tampered[1].1 = "no".to_string();
        assert!(!client.validate_signature(url, &tampered, &signature));
    }

    #[test]
    fn signature_covers_url() {
        let client = test_client();
        let signature = client.sign("https://example.com/api/webhooks/sms", &params());
        assert!(!client.validate_signature("https://evil.example.com/sms", &params(), &signature));
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let client = test_client();
        let url = "https://example.com/api/webhooks/sms";
        let signature = client.sign(url, &params());

        let mut reordered = params();
        reordered.reverse();
        assert!(client.validate_signature(url, &reordered, &signature));
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let client = test_client();
        let url = "https://example.com/api/webhooks/sms";
        assert!(!client.validate_signature(url, &params(), "not base64!!"));
        assert!(!client.validate_signature(url, &params(), ""));
    }
}
