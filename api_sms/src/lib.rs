use actix_web::web::{self};

pub mod routes {
    pub mod webhook;
}

mod services {
    pub(crate) mod inbound;
}

mod dtos {
    pub(crate) mod webhook;
}

mod misc {
    pub(crate) mod intent;
}

pub fn mount_webhooks() -> actix_web::Scope {
    web::scope("/webhooks").service(routes::webhook::post_inbound_sms)
}
