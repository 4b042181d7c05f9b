//! Postgres-backed table store.
//!
//! Each row is one JSONB array in `sheet_rows`; a `BIGSERIAL` position keeps
//! append order. Batches are inserted in a single transaction.
//!
//! ## Error Mapping
//!
//! | SQLx Error | TableStoreError |
//! |------------|-----------------|
//! | Database (check / not-null violation, `23514` / `23502`) | `InvalidAppend` |
//! | Database (other) | `Unavailable` |
//! | PoolClosed, Io, Tls, PoolTimedOut | `Unavailable` |
//! | Decode / ColumnDecode | `InvalidAppend` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row as _};
use tracing::instrument;

use super::r#trait::{Row, TableRef, TableStore, TableStoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sheet_rows (
    table_name TEXT NOT NULL,
    sheet_name TEXT NOT NULL,
    position   BIGSERIAL NOT NULL,
    cells      JSONB NOT NULL CHECK (jsonb_typeof(cells) = 'array'),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (table_name, sheet_name, position)
)
"#;

/// Postgres-backed append-only table store.
#[derive(Debug, Clone)]
pub struct PostgresTableStore {
    pool: Arc<PgPool>,
}

impl PostgresTableStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the `sheet_rows` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, TableStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), TableStoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl TableStore for PostgresTableStore {
    #[instrument(skip(self, rows), fields(table = %table, row_count = rows.len()), err)]
    async fn append_batch(&self, table: &TableRef, rows: Vec<Row>) -> Result<(), TableStoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut payloads = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(TableStoreError::InvalidAppend(format!(
                    "batch contains an empty row (index {idx})"
                )));
            }
            let cells = serde_json::to_value(row).map_err(|e| {
                TableStoreError::InvalidAppend(format!("row serialization failed: {e}"))
            })?;
            payloads.push(cells);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for cells in payloads {
            sqlx::query(
                r#"
                INSERT INTO sheet_rows (table_name, sheet_name, cells)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(&table.table)
            .bind(&table.sheet)
            .bind(cells)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_row", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(table = %table), err)]
    async fn read_all(&self, table: &TableRef) -> Result<Vec<Row>, TableStoreError> {
        let records = sqlx::query(
            r#"
            SELECT cells
            FROM sheet_rows
            WHERE table_name = $1 AND sheet_name = $2
            ORDER BY position ASC
            "#,
        )
        .bind(&table.table)
        .bind(&table.sheet)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("read_all", e))?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let cells: serde_json::Value = record
                .try_get("cells")
                .map_err(|e| map_sqlx_error("decode_cells", e))?;
            let row: Row = serde_json::from_value(cells).map_err(|e| {
                TableStoreError::InvalidAppend(format!("stored row is not a cell array: {e}"))
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> TableStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23514") | Some("23502") => TableStoreError::InvalidAppend(msg),
                _ => TableStoreError::Unavailable(msg),
            }
        }
        sqlx::Error::Decode(e) => {
            TableStoreError::InvalidAppend(format!("decode error in {operation}: {e}"))
        }
        sqlx::Error::ColumnDecode { index, source } => TableStoreError::InvalidAppend(format!(
            "column {index} decode error in {operation}: {source}"
        )),
        other => TableStoreError::Unavailable(format!("sqlx error in {operation}: {other}")),
    }
}
