use libsql::{Builder, Connection};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Where the catalog lives, derived from `DATABASE_URL` and
/// `DATABASE_LOCAL_PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CatalogLocation {
    /// Turso / libsql server, every query goes over the network.
    Remote { url: String, token: String },
    /// Local file kept in sync with a remote primary.
    Replica {
        path: String,
        url: String,
        token: String,
    },
    Memory,
    File(String),
}

impl CatalogLocation {
    fn from_config(config: &DatabaseConfig) -> Self {
        let url = config.url.trim();
        let token = config.auth_token.clone().unwrap_or_default();

        if url.starts_with("libsql://") || url.starts_with("https://") {
            return match &config.local_path {
                Some(path) => Self::Replica {
                    path: path.clone(),
                    url: url.to_string(),
                    token,
                },
                None => Self::Remote {
                    url: url.to_string(),
                    token,
                },
            };
        }

        if url == ":memory:" {
            return Self::Memory;
        }

        Self::File(url.strip_prefix("file:").unwrap_or(url).to_string())
    }

    fn is_replica(&self) -> bool {
        matches!(self, Self::Replica { .. })
    }
}

/// Shared handle to the catalog database. Connections are checked out per
/// call with [`Database::connect`] and released when dropped.
///
/// An in-memory catalog lives only as long as its connection, so that one
/// connection is kept and every checkout shares it.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
    shared: Option<Connection>,
    replica: bool,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let location = CatalogLocation::from_config(config);
        let replica = location.is_replica();
        let in_memory = location == CatalogLocation::Memory;

        let db = match location {
            CatalogLocation::Remote { url, token } => {
                tracing::info!(%url, "Opening remote catalog");
                Builder::new_remote(url, token).build().await?
            }
            CatalogLocation::Replica { path, url, token } => {
                tracing::info!(%url, %path, "Opening embedded replica of remote catalog");
                Builder::new_remote_replica(path, url, token).build().await?
            }
            CatalogLocation::Memory => Builder::new_local(":memory:").build().await?,
            CatalogLocation::File(path) => {
                tracing::info!(%path, "Opening local catalog");
                Builder::new_local(path).build().await?
            }
        };

        let shared = if in_memory { Some(db.connect()?) } else { None };
        let database = Self {
            db: Arc::new(db),
            shared,
            replica,
        };

        let conn = database.connect()?;
        apply_busy_timeout(&conn).await;
        schema::init_schema(&conn).await?;

        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        match &self.shared {
            Some(conn) => Ok(conn.clone()),
            None => Ok(self.db.connect()?),
        }
    }

    pub fn is_replica(&self) -> bool {
        self.replica
    }

    /// Pulls fresh frames from the primary when running as an embedded
    /// replica, then checks the catalog answers a trivial query.
    pub async fn sync(&self) -> Result<()> {
        if self.replica {
            let replicated = self.db.sync().await?;
            tracing::debug!(?replicated, "Catalog replica synced");
        }

        let conn = self.connect()?;
        conn.query("SELECT 1", ()).await?;
        Ok(())
    }

    /// Calls [`Database::sync`] every `interval` until `token` is cancelled.
    pub fn spawn_sync_loop(&self, interval: Duration, token: CancellationToken) -> JoinHandle<()> {
        let db = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Catalog sync loop shutting down...");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if let Err(e) = db.sync().await {
                            tracing::error!("Catalog sync error: {}", e);
                        }
                    }
                }
            }
        })
    }
}

async fn apply_busy_timeout(conn: &Connection) {
    let busy_timeout_ms = std::env::var("DATABASE_BUSY_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);

    let sql = format!("PRAGMA busy_timeout = {busy_timeout_ms}");
    if let Err(error) = conn.execute_batch(&sql).await {
        tracing::warn!(busy_timeout_ms, %error, "Failed to set SQLite busy_timeout");
    }
}
