use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientCreateRequest {
    pub first_name: String,
    pub last_name: String,
    /// Digits-only canonical form; callers normalize before constructing.
    pub phone: String,
    pub email: Option<String>,
}
