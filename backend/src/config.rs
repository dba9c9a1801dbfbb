use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Trip page API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// JSON fixture file; takes precedence over the database
    #[arg(long, env = "TRIP_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Skip creating the schema on startup
    #[arg(long, env = "SKIP_MIGRATIONS", default_value_t = false)]
    pub skip_migrations: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Fixtures(PathBuf),
    Postgres(String),
}

impl Config {
    pub fn store_source(&self) -> Option<StoreSource> {
        match (&self.fixtures, &self.database_url) {
            (Some(path), _) => Some(StoreSource::Fixtures(path.clone())),
            (None, Some(url)) => Some(StoreSource::Postgres(url.clone())),
            (None, None) => None,
        }
    }
}
