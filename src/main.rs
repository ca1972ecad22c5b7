//! Keyplan server entry point.
//!
//! Loads configuration from the environment, opens the database, seeds the
//! cylinder catalog (and an initial admin when configured and the users table
//! is empty), and serves the API.

use anyhow::Context;
use keyplan::{
    api::routes::create_router,
    auth::jwt::AuthService,
    db::{NewUser, Store},
    types::Role,
    utils::config::Config,
    AppState,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let auth_service = Arc::new(AuthService::new(
        config.auth.token_secret.clone(),
        config.auth.token_expiry_secs,
    ));
    auth_service.warn_if_unconfigured();

    let store = Store::new_local(&config.database.path)
        .await
        .context("failed to open database")?;
    store.seed_catalog().await.context("failed to seed catalog")?;

    seed_admin(&store, &auth_service, &config).await?;

    let store = Arc::new(store);
    let state = AppState {
        store,
        auth_service: auth_service.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(auth_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "keyplan backend started");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Creates the bootstrap admin on an empty install when ADMIN_EMAIL and
/// ADMIN_PASSWORD are both set. A populated users table is left alone.
async fn seed_admin(
    store: &Store,
    auth_service: &AuthService,
    config: &Config,
) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (
        config.seed.admin_email.as_deref(),
        config.seed.admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if store.count_users().await? > 0 {
        return Ok(());
    }

    let password_hash = auth_service.hash_password(password)?;
    let admin = store
        .create_user(NewUser {
            email: email.to_string(),
            password_hash,
            role: Role::Admin,
            first_name: "Admin".to_string(),
            last_name: "Account".to_string(),
        })
        .await?;

    tracing::info!(user_id = admin.id, email, "seeded initial admin account");
    Ok(())
}
