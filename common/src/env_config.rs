use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// This struct holds all the necessary configuration parameters
/// required to initialize and run the server.
/// It includes database connection details, session token configuration,
/// server host and port, number of worker threads, CORS settings,
/// logging preferences, and the Stripe and Twilio credentials.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Configuration for signed session tokens.
    pub token_config: TokenConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Configuration for the Twilio messaging client.
    pub twilio: TwilioConfig,
}

#[derive(Clone, Debug)]
/// Configuration for signed session tokens.
///
/// This struct contains the secret key used to sign tokens and
/// the lifetime in minutes of issued tokens.
pub struct TokenConfig {
    /// The secret key used to sign and verify session tokens.
    pub secret: String,
    /// The lifetime of issued session tokens in minutes.
    pub expiration_minutes: i64,
}

#[derive(Clone, Debug)]
/// Credentials and addressing for the Twilio messaging API.
///
/// `webhook_url` is the public URL Twilio delivers inbound messages to;
/// it participates in the request-signature check, so it must match the
/// URL configured in the Twilio console exactly.
pub struct TwilioConfig {
    /// The Twilio account SID.
    pub account_sid: String,
    /// The Twilio auth token, also the webhook signing secret.
    pub auth_token: String,
    /// The number outbound messages are sent from.
    pub from_number: String,
    /// The publicly reachable inbound-message webhook URL.
    pub webhook_url: String,
}

impl TokenConfig {
    /// Creates a new `TokenConfig` instance from environment variables.
    ///
    /// Reads the token configuration from environment variables:
    /// - `TOKEN_SECRET`: Required. The secret key for token signing.
    /// - `TOKEN_EXPIRATION_MINUTES`: Optional. Defaults to 30 minutes.
    ///
    /// # Panics
    ///
    /// This function will panic if:
    /// - `TOKEN_SECRET` environment variable is not set
    /// - `TOKEN_EXPIRATION_MINUTES` is set but cannot be parsed as a valid number
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        TokenConfig {
            secret: env::var("TOKEN_SECRET").expect("TOKEN_SECRET must be set"),
            expiration_minutes: env::var("TOKEN_EXPIRATION_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("TOKEN_EXPIRATION_MINUTES must be a valid number"),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads all configuration values from environment variables with sensible
    /// defaults for most optional settings.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: "development" or "production"
    /// - `DATABASE_URL`: Connection string for the database
    /// - `TOKEN_SECRET`: Secret key for token signing (via `TokenConfig::from_env()`)
    ///
    /// Optional (with defaults):
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `STRIPE_SECRET_KEY`, `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`,
    ///   `TWILIO_FROM_NUMBER`, `TWILIO_WEBHOOK_URL`: integration credentials,
    ///   empty when unconfigured
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing
    /// or if numeric values cannot be parsed correctly.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            token_config: TokenConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            twilio: TwilioConfig {
                account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
                auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
                from_number: env::var("TWILIO_FROM_NUMBER").unwrap_or_default(),
                webhook_url: env::var("TWILIO_WEBHOOK_URL").unwrap_or_default(),
            },
        })
    }
}
