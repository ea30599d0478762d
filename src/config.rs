use serde::Deserialize;

/// Backend the users repository is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    fn parse(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreKind::Postgres),
            "memory" | "mem" => Ok(StoreKind::Memory),
            other => anyhow::bail!("unknown USERS_STORE {other:?}, expected postgres or memory"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub server: ServerConfig,
}

fn flag(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("USERS_STORE") {
            Ok(v) => StoreKind::parse(&v)?,
            Err(_) => StoreKind::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreKind::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required for the postgres store");
        }
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let run_migrations = std::env::var("RUN_MIGRATIONS")
            .map(|v| flag(&v))
            .unwrap_or(true);
        let server = ServerConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
        };
        Ok(Self {
            store,
            database_url,
            max_connections,
            run_migrations,
            server,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = AppConfig {
            store: StoreKind::Memory,
            database_url: None,
            max_connections: 4,
            run_migrations: false,
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 9000,
            },
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn store_kind_parsing() {
        assert_eq!(StoreKind::parse("postgres").unwrap(), StoreKind::Postgres);
        assert_eq!(StoreKind::parse(" Memory ").unwrap(), StoreKind::Memory);
        assert!(StoreKind::parse("redis").is_err());
    }

    #[test]
    fn flags() {
        assert!(flag("true"));
        assert!(flag("1"));
        assert!(!flag("false"));
        assert!(!flag("OFF"));
    }
}
