pub mod error;

pub use error::StoreError;
// Callers build parameterized queries with these without depending on the
// driver crate directly.
pub use neo4rs::{Query, query};

use neo4rs::{ConfigBuilder, Graph};
use serde_json::{Map, Value};
use tracing::debug;

/// Connection settings for the graph database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Whether a query intends to read or mutate the graph.
///
/// `Read` calls run in an explicit transaction that is rolled back once
/// the rows are collected, so a write clause smuggled into a read call
/// never persists. `Write` calls commit as usual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
        }
    }

    /// Whether calls under this mode run in a transaction that is rolled
    /// back instead of committed. This is what keeps a read call from
    /// persisting anything, whatever clauses its query contains.
    pub fn rolls_back(self) -> bool {
        matches!(self, AccessMode::Read)
    }
}

/// Adapter over the Neo4j driver: one connection pool per process, one
/// session per call. Clones share the pool.
#[derive(Clone)]
pub struct GraphStore {
    graph: Graph,
    database: String,
}

impl GraphStore {
    /// Connect to the database. Called once at startup; the pool is reused
    /// for the process lifetime.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let driver_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .build()
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        let graph = Graph::connect(driver_config)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        Ok(Self {
            graph,
            database: config.database.clone(),
        })
    }

    /// The database name every session targets.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Execute a query and collect every row as a JSON object keyed by
    /// RETURN column, in record order.
    pub async fn execute(
        &self,
        query: Query,
        mode: AccessMode,
    ) -> Result<Vec<Map<String, Value>>, StoreError> {
        debug!(db = %self.database, mode = mode.as_str(), "executing cypher");

        let rows = if mode.rolls_back() {
            self.execute_read(query).await?
        } else {
            self.execute_write(query).await?
        };

        debug!(db = %self.database, rows = rows.len(), "cypher completed");
        Ok(rows)
    }

    /// Read path: an explicit transaction that is always rolled back, so
    /// nothing a read call does can reach the graph.
    async fn execute_read(&self, query: Query) -> Result<Vec<Map<String, Value>>, StoreError> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut stream = txn
            .execute(query)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next(txn.handle())
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            rows.push(decode_row(row)?);
        }

        txn.rollback()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows)
    }

    /// Write path: autocommit, rows streamed off the committed result.
    async fn execute_write(&self, query: Query) -> Result<Vec<Map<String, Value>>, StoreError> {
        let mut stream = self
            .graph
            .execute(query)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            rows.push(decode_row(row)?);
        }
        Ok(rows)
    }

    /// Run a statement for its side effects, discarding any rows. Used for
    /// schema DDL and graph writes.
    pub async fn run(&self, query: Query) -> Result<(), StoreError> {
        debug!(db = %self.database, mode = AccessMode::Write.as_str(), "running cypher");
        self.graph
            .run(query)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    /// Liveness probe: `RETURN 1 AS ok` must come back as 1.
    pub async fn verify_connectivity(&self) -> Result<bool, StoreError> {
        let rows = self
            .execute(query("RETURN 1 AS ok"), AccessMode::Read)
            .await?;
        let ok = rows
            .first()
            .and_then(|row| row.get("ok"))
            .and_then(Value::as_i64)
            == Some(1);
        Ok(ok)
    }
}

fn decode_row(row: neo4rs::Row) -> Result<Map<String, Value>, StoreError> {
    let value: Value = row
        .to::<Value>()
        .map_err(|e| StoreError::RowDecode(e.to_string()))?;
    Ok(row_object(value))
}

/// Shape a decoded row into a column-keyed object. Rows always decode as
/// objects keyed by RETURN alias; anything else is kept under `value`.
fn row_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn access_mode_tags() {
        assert_eq!(AccessMode::Read.as_str(), "read");
        assert_eq!(AccessMode::Write.as_str(), "write");
    }

    #[test]
    fn read_mode_runs_in_rollback_transactions() {
        // The dispatch in `execute` hangs off this: reads must never
        // commit, writes must.
        assert!(AccessMode::Read.rolls_back());
        assert!(!AccessMode::Write.rolls_back());
    }

    #[test]
    fn row_object_keeps_columns() {
        let row = row_object(json!({"name": "Acme Corp", "count": 3}));
        assert_eq!(row.get("name"), Some(&json!("Acme Corp")));
        assert_eq!(row.get("count"), Some(&json!(3)));
    }

    #[test]
    fn row_object_wraps_scalars() {
        let row = row_object(json!(42));
        assert_eq!(row.get("value"), Some(&json!(42)));
    }
}
