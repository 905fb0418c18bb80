use std::sync::Arc;

use devbook::{
    app, auth::jwt::JwtKeys, config::AppConfig, db, state::AppState, users::repo::PgUserStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "devbook=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await;

    let state = AppState::new(
        Arc::new(PgUserStore::new(pool.clone())),
        JwtKeys::from_config(&config.jwt),
    );

    app::serve(app::build_app(state), &config.host, config.port).await?;

    pool.close().await;
    tracing::info!("all systems off");
    Ok(())
}
