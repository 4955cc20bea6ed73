pub mod env_config;
pub mod error;
pub mod http;
pub mod phone;
pub mod stripe;
pub mod token;
pub mod twilio;
