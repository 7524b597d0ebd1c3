use axum::Router;
use orderdesk_core::config::AppConfig;
use orderdesk_db::{connect, migrations, DbPool};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{customers, health};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    Ok(Application { config, db_pool })
}

impl Application {
    pub fn router(&self) -> Router {
        Router::new()
            .merge(customers::router(customers::CustomerState::sql(self.db_pool.clone())))
            .merge(health::router(self.db_pool.clone()))
            .layer(TraceLayer::new_for_http())
    }
}
