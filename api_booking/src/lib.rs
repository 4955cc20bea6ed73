use actix_web::web::{self};

pub mod routes {
    pub mod booking;
}

mod services {
    pub(crate) mod booking;
    pub(crate) mod client;
}

mod dtos {
    pub(crate) mod booking;
}

pub fn mount_booking() -> actix_web::Scope {
    web::scope("/booking").service(routes::booking::post_booking)
}
