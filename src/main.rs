mod app;
mod config;
mod db;
mod state;
mod telemetry;
mod users;

use crate::config::{AppConfig, StoreKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = AppConfig::from_env()?;

    // `users-service migrate` applies the schema and exits
    if std::env::args().nth(1).as_deref() == Some("migrate") {
        anyhow::ensure!(
            config.store == StoreKind::Postgres,
            "migrations only apply to the postgres store"
        );
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;
        pool.close().await;
        tracing::info!("migrations applied");
        return Ok(());
    }

    let addr = config.bind_addr();
    let app_state = state::AppState::init(config).await?;
    tracing::debug!(store = ?app_state.config.store, "application state ready");

    app::serve(app::build_app(app_state), &addr).await
}
