mod cors;
mod health;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.environment == "production";
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // external clients, constructed once and injected everywhere
    let stripe_client = common::stripe::create_client(&config.stripe_secret_key);
    let twilio_client = common::twilio::TwilioClient::new(&config.twilio);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(stripe_client.clone()))
            .app_data(web::Data::new(twilio_client.clone()))
            .wrap(limiter::middleware(10)) // max 10 requests per second per peer
            .wrap(logger::middleware()) // 3rd
            .wrap(extractor::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    .service(health::get_health)
                    .service(api_booking::mount_booking())
                    .service(api_verify::mount_verify())
                    .service(api_sms::mount_webhooks()),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
