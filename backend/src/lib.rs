pub mod config;
pub mod error;
pub mod store;
pub mod trip_handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, StoreSource};
use crate::store::{MemoryTripStore, PgTripStore, StoreError, TripStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TripStore>,
}

impl AppState {
    pub fn new(store: impl TripStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/trip/:id", get(trip_handlers::get_trip))
        .route("/api/trip/:id/stops", get(trip_handlers::get_trip_stops))
        .route("/api/profile/:user_id", get(trip_handlers::get_profile))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the store selected by `config`.
pub async fn open_store(config: &Config) -> Result<Arc<dyn TripStore>, StoreError> {
    match config.store_source() {
        Some(StoreSource::Fixtures(path)) => {
            let store = MemoryTripStore::from_file(&path)?;
            tracing::info!("serving trips from fixtures {}", path.display());
            Ok(Arc::new(store))
        }
        Some(StoreSource::Postgres(url)) => {
            let store = PgTripStore::connect(&url, config.max_connections).await?;
            if !config.skip_migrations {
                store.migrate().await?;
            }
            Ok(Arc::new(store))
        }
        None => Err(StoreError::Config(
            "set TRIP_FIXTURES or DATABASE_URL".to_string(),
        )),
    }
}
