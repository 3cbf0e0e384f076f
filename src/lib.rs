//! # songplays-dwh - Redshift staging and star-schema load
//!
//! Raw song metadata and user activity logs land in S3 as JSON. This crate
//! owns the SQL that moves them into Redshift:
//! - Staging tables filled by `COPY` straight from S3
//! - A star schema (songplays fact, users/songs/artists/time dimensions)
//!   filled by `INSERT ... SELECT` from staging
//! - A configuration loader for the `dwh.cfg` INI file
//! - A sequential executor that runs drop, create, copy, insert in order

pub mod schema;
pub mod queries;
pub mod config;
pub mod executor;
pub mod pipeline;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use config::DwhConfig;
pub use schema::{Table, TableRole};
pub use queries::{Phase, QuerySet, Statement};
pub use executor::{DryRunExecutor, Executor, WarehouseExecutor};
pub use pipeline::{Pipeline, RunReport};

/// Result type alias for warehouse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for configuration loading and statement execution
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Missing config section [{0}]")]
    MissingSection(String),

    #[error("Missing config key {key} in section [{section}]")]
    MissingKey { section: String, key: String },

    #[error("Invalid value for {key} in section [{section}]: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        reason: String,
    },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] tokio_postgres::Error),

    #[error("{phase} statement for {table} failed: {source}")]
    StatementFailed {
        phase: Phase,
        table: Table,
        #[source]
        source: Box<Error>,
    },
}
