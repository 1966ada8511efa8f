//! Postgres storage for the Rentledger engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Database migrations
//! - [`PgStore`], the [`rentledger_core::store::Store`] implementation
//! - Demo master data for local development

pub mod entities;
pub mod error;
pub mod migration;
pub mod seed;
pub mod store;

pub use error::StoreError;
pub use store::{PgScope, PgStore};

use rentledger_shared::AppConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool sized from the configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.db_addr.clone());
    options
        .max_connections(config.db_max_open_conns)
        .min_connections(config.db_max_idle_conns.min(config.db_max_open_conns))
        .idle_timeout(config.db_max_idle_time)
        .acquire_timeout(config.query_timeout)
        .sqlx_logging(false);
    Database::connect(options).await
}
