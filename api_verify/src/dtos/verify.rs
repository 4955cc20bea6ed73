use db::models::client::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmCodeRequest {
    pub phone: String,
    pub code: String,
}

/// A card stored on the client's payment profile, already filtered to
/// unexpired cards and ordered default-first, newest-first.
#[derive(Debug, Clone, Serialize)]
pub struct StoredPaymentMethod {
    pub id: String,
    pub brand: String,
    pub last4: String,
    pub exp_month: i64,
    pub exp_year: i64,
    pub is_default: bool,
    /// Unix seconds the card was added, newest cards sort first.
    pub created: i64,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    /// Full session token when a client exists for the phone, otherwise
    /// a phone-only token asserting number ownership.
    pub token: String,
    pub client: Option<Client>,
    pub payment_methods: Vec<StoredPaymentMethod>,
}
