use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppConfig, StoreKind};
use crate::db;
use crate::users::{
    memory::InMemoryUsersRepo,
    repo::{PgUsersRepo, UsersRepo},
    services::UsersUsecase,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UsersUsecase,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let repo = match config.store {
            StoreKind::Postgres => {
                let pool = db::connect(&config).await?;
                if config.run_migrations {
                    db::migrate(&pool).await?;
                }
                info!("users served from postgres");
                Arc::new(PgUsersRepo::new(pool)) as Arc<dyn UsersRepo>
            }
            StoreKind::Memory => {
                warn!("users served from memory; data is lost on shutdown");
                Arc::new(InMemoryUsersRepo::new()) as Arc<dyn UsersRepo>
            }
        };
        Ok(Self::from_parts(config, repo))
    }

    pub fn from_parts(config: Arc<AppConfig>, repo: Arc<dyn UsersRepo>) -> Self {
        Self {
            config,
            users: UsersUsecase::new(repo),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: StoreKind::Memory,
            database_url: None,
            max_connections: 1,
            run_migrations: false,
            server: crate::config::ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
        });
        let repo = Arc::new(InMemoryUsersRepo::new()) as Arc<dyn UsersRepo>;
        Self::from_parts(config, repo)
    }
}
