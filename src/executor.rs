//! Statement executors
//!
//! [`WarehouseExecutor`] talks to Redshift over the PostgreSQL wire
//! protocol. [`DryRunExecutor`] only records what it was asked to run.

use crate::config::ClusterConfig;
use crate::queries::Statement;
use crate::Result;
use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};

/// Runs one statement against a warehouse
#[async_trait]
pub trait Executor: Send {
    async fn execute(&mut self, statement: &Statement) -> Result<()>;

    /// Human-readable target, used in logs
    fn target(&self) -> String;
}

/// Single connection to a Redshift cluster
pub struct WarehouseExecutor {
    client: Client,
    target: String,
}

impl WarehouseExecutor {
    /// Connect using the `[CLUSTER]` settings.
    ///
    /// The connection driver runs on its own tokio task until the client is dropped.
    /// The session is unencrypted (`NoTls`); clusters with `require_ssl` enabled
    /// refuse it.
    pub async fn connect(cluster: &ClusterConfig) -> Result<Self> {
        let target = format!("{}:{}/{}", cluster.host, cluster.db_port, cluster.db_name);
        tracing::info!("Connecting to {} as {}", target, cluster.db_user);

        let mut config = tokio_postgres::Config::new();
        config
            .host(&cluster.host)
            .port(cluster.db_port)
            .dbname(&cluster.db_name)
            .user(&cluster.db_user)
            .password(&cluster.db_password)
            .application_name(env!("CARGO_PKG_NAME"));

        let (client, connection) = config.connect(NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Warehouse connection closed: {}", e);
            }
        });

        Ok(Self { client, target })
    }
}

#[async_trait]
impl Executor for WarehouseExecutor {
    async fn execute(&mut self, statement: &Statement) -> Result<()> {
        // COPY and DDL go through the simple query protocol
        self.client.batch_execute(&statement.sql).await?;
        Ok(())
    }

    fn target(&self) -> String {
        self.target.clone()
    }
}

/// Records statements instead of running them
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    executed: Vec<Statement>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements seen so far, in execution order
    pub fn executed(&self) -> &[Statement] {
        &self.executed
    }
}

#[async_trait]
impl Executor for DryRunExecutor {
    async fn execute(&mut self, statement: &Statement) -> Result<()> {
        tracing::debug!("dry run: {}", statement.label());
        self.executed.push(statement.clone());
        Ok(())
    }

    fn target(&self) -> String {
        "dry run".to_string()
    }
}
