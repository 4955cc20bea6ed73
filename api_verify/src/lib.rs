use actix_web::web::{self};

pub mod routes {
    pub mod verify;
}

mod services {
    pub(crate) mod verify;
}

mod dtos {
    pub(crate) mod verify;
}

pub fn mount_verify() -> actix_web::Scope {
    web::scope("/verify")
        .service(routes::verify::post_send)
        .service(routes::verify::post_confirm)
}
