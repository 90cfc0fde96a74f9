//! Postgres-backed row reader.
//!
//! Both queries filter on the requisition key with a bound parameter. The item
//! query joins through the header table so that items of a missing header are
//! never returned.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RowReaderError | Surfaced to the orchestrator as |
//! |------------|----------------|---------------------------------|
//! | Database / Io / PoolClosed / other | `Database` | header `None`, items empty |
//! | ColumnNotFound / ColumnDecode | `Decode` | header `None`, items empty |

use std::sync::Arc;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{error, instrument, Span};

use requisition_releases_core::{Header, Item, PurchaseRequisitionId, PurchaseRequisitionItemId};

use super::{RowReader, RowReaderError};

const HEADER_QUERY: &str = r#"
    SELECT
        header.purchase_requisition,
        header.is_released
    FROM data_platform_purchase_requisition_header_data AS header
    WHERE header.purchase_requisition = $1
"#;

const ITEMS_QUERY: &str = r#"
    SELECT
        item.purchase_requisition,
        item.purchase_requisition_item,
        item.is_released
    FROM data_platform_purchase_requisition_item_data AS item
    INNER JOIN data_platform_purchase_requisition_header_data AS header
        ON header.purchase_requisition = item.purchase_requisition
    WHERE item.purchase_requisition_item IS NOT NULL
        AND header.purchase_requisition = $1
    ORDER BY item.purchase_requisition_item ASC
"#;

/// Postgres row reader over the requisition header and item tables.
///
/// Uses the SQLx connection pool which is thread-safe (Arc + Send + Sync), so one
/// reader is shared by every request.
#[derive(Debug, Clone)]
pub struct PostgresRowReader {
    pool: Arc<PgPool>,
}

impl PostgresRowReader {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a connection pool and wrap it in a reader.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RowReaderError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Fetch the header row, distinguishing "no row" from a storage error.
    #[instrument(skip(self), fields(purchase_requisition = %key), err)]
    pub async fn fetch_header(&self, key: PurchaseRequisitionId) -> Result<Option<Header>, RowReaderError> {
        let row = sqlx::query(HEADER_QUERY)
            .bind(key.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("read_header", e))?;

        row.as_ref().map(header_from_row).transpose()
    }

    /// Fetch all item rows joined to the header.
    #[instrument(skip(self), fields(purchase_requisition = %key, item_count = tracing::field::Empty), err)]
    pub async fn fetch_items(&self, key: PurchaseRequisitionId) -> Result<Vec<Item>, RowReaderError> {
        let rows = sqlx::query(ITEMS_QUERY)
            .bind(key.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("read_items", e))?;

        let items = rows.iter().map(item_from_row).collect::<Result<Vec<_>, _>>()?;
        Span::current().record("item_count", items.len());
        Ok(items)
    }
}

#[async_trait::async_trait]
impl RowReader for PostgresRowReader {
    async fn read_header(&self, key: PurchaseRequisitionId) -> Option<Header> {
        match self.fetch_header(key).await {
            Ok(header) => header,
            Err(e) => {
                error!(purchase_requisition = %key, error = %e, "header read failed");
                None
            }
        }
    }

    async fn read_items(&self, key: PurchaseRequisitionId) -> Vec<Item> {
        match self.fetch_items(key).await {
            Ok(items) => items,
            Err(e) => {
                error!(purchase_requisition = %key, error = %e, "item read failed");
                vec![]
            }
        }
    }
}

fn header_from_row(row: &PgRow) -> Result<Header, RowReaderError> {
    let decode = |e: sqlx::Error| map_sqlx_error("header", e);
    Ok(Header::new(
        PurchaseRequisitionId::new(row.try_get("purchase_requisition").map_err(decode)?),
        row.try_get::<Option<bool>, _>("is_released").map_err(decode)?,
    ))
}

fn item_from_row(row: &PgRow) -> Result<Item, RowReaderError> {
    let decode = |e: sqlx::Error| map_sqlx_error("item", e);
    Ok(Item::new(
        PurchaseRequisitionId::new(row.try_get("purchase_requisition").map_err(decode)?),
        PurchaseRequisitionItemId::new(row.try_get("purchase_requisition_item").map_err(decode)?),
        row.try_get::<Option<bool>, _>("is_released").map_err(decode)?,
    ))
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RowReaderError {
    match err {
        sqlx::Error::ColumnNotFound(_) | sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RowReaderError::Decode {
                operation,
                message: err.to_string(),
            }
        }
        sqlx::Error::Database(db_err) => RowReaderError::Database {
            operation,
            message: db_err.message().to_string(),
        },
        other => RowReaderError::Database {
            operation,
            message: other.to_string(),
        },
    }
}
