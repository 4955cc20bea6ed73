use actix_web::{Responder, get};
use common::{error::Res, http::Success};

#[get("/health")]
async fn get_health() -> Res<impl Responder> {
    Success::ok(serde_json::json!({ "status": "ok" }))
}
