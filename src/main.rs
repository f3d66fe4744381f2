use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use bookwell::config::AppConfig;
use bookwell::db;
use bookwell::services::auth::AuthService;
use bookwell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    if config.uses_dev_secret() {
        tracing::warn!(
            "TOKEN_SECRET is not set; using the insecure development default. \
             Do not run production with this secret."
        );
    }

    let conn = db::init_db(&config.database_url)?;

    let auth = AuthService::new(config.token_secret.clone());

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        auth,
    });

    let app = bookwell::build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
