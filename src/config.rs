use std::env;

/// Fallback signing secret for local development only. Running production
/// without TOKEN_SECRET set is a deployment error; `main` logs a loud warning
/// when this value is in use.
pub const DEV_TOKEN_SECRET: &str = "bookwell-dev-secret";

/// Base price (in currency units) applied to bookings that do not specify an
/// amount.
pub const DEFAULT_BASE_PRICE: f64 = 999.0;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub token_secret: String,
    pub base_price: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "bookwell.db".to_string()),
            token_secret: env::var("TOKEN_SECRET")
                .unwrap_or_else(|_| DEV_TOKEN_SECRET.to_string()),
            base_price: env::var("BASE_PRICE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BASE_PRICE),
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.token_secret == DEV_TOKEN_SECRET
    }
}
