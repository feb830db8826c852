//! SQLite telemetry store
//!
//! Implements the `TelemetryStorePort` using sqlx. Each write checks out its
//! own pooled connection, which goes back to the pool when dropped, on
//! success and failure alike. Re-adding a record with an existing id writes
//! nothing and reports zero rows.

use application::{error::ApplicationError, ports::TelemetryStorePort};
use async_trait::async_trait;
use domain::{ErrorRecord, RecordId, RequestRecord, ResponseRecord};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::error::map_sqlx_error;

/// SQLite-based telemetry store
#[derive(Debug, Clone)]
pub struct SqliteTelemetryStore {
    pool: SqlitePool,
}

impl SqliteTelemetryStore {
    /// Create a new SQLite telemetry store
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find<T: DeserializeOwned>(
        &self,
        sql: &str,
        id: RecordId,
    ) -> Result<Option<T>, ApplicationError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let json: Option<String> = sqlx::query_scalar(sql)
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;

        json.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| ApplicationError::Internal(format!("Corrupt record {id}: {e}")))
        })
        .transpose()
    }

    /// Load a stored error record
    pub async fn find_error(&self, id: RecordId) -> Result<Option<ErrorRecord>, ApplicationError> {
        self.find("SELECT full_json FROM error_log WHERE id = $1", id)
            .await
    }

    /// Load a stored request record
    pub async fn find_request(
        &self,
        id: RecordId,
    ) -> Result<Option<RequestRecord>, ApplicationError> {
        self.find("SELECT full_json FROM request_log WHERE id = $1", id)
            .await
    }

    /// Load a stored response record
    pub async fn find_response(
        &self,
        id: RecordId,
    ) -> Result<Option<ResponseRecord>, ApplicationError> {
        self.find("SELECT full_json FROM response_log WHERE id = $1", id)
            .await
    }

    /// Responses that reference the given request
    pub async fn responses_for_request(
        &self,
        request_id: RecordId,
    ) -> Result<Vec<ResponseRecord>, ApplicationError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT full_json FROM response_log WHERE request_id = $1 ORDER BY created",
        )
        .bind(request_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|json| {
                serde_json::from_str(json)
                    .map_err(|e| ApplicationError::Internal(format!("Corrupt response: {e}")))
            })
            .collect()
    }

    /// Number of stored errors sharing an error hash
    pub async fn count_errors_by_hash(&self, error_hash: i32) -> Result<u64, ApplicationError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM error_log WHERE error_hash = $1")
            .bind(error_hash)
            .fetch_one(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl TelemetryStorePort for SqliteTelemetryStore {
    #[instrument(skip(self, record), fields(record_id = %record.id()))]
    async fn add_error(&self, record: &ErrorRecord) -> Result<u64, ApplicationError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let result = sqlx::query(
            "INSERT INTO error_log (id, created, application_name, application_version, \
             machine_name, error_type, host, url, http_method, http_status_code, ip_address, \
             source, message, detail, sql_text, error_hash, full_json)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(record.id().to_string())
        .bind(record.created().to_rfc3339())
        .bind(&record.application_name)
        .bind(&record.application_version)
        .bind(&record.machine_name)
        .bind(&record.error_type)
        .bind(&record.host)
        .bind(&record.url)
        .bind(&record.http_method)
        .bind(record.http_status_code)
        .bind(&record.ip_address)
        .bind(&record.source)
        .bind(&record.message)
        .bind(&record.detail)
        .bind(&record.sql)
        .bind(record.error_hash)
        .bind(record.full_json())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        debug!(rows = result.rows_affected(), "Stored error record");
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, record), fields(record_id = %record.id()))]
    async fn add_request(&self, record: &RequestRecord) -> Result<bool, ApplicationError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let result = sqlx::query(
            "INSERT INTO request_log (id, created, application_name, application_version, \
             machine_name, username, url, http_method, ip_address, body, query_string, full_json)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(record.id().to_string())
        .bind(record.created().to_rfc3339())
        .bind(&record.application_name)
        .bind(&record.application_version)
        .bind(&record.machine_name)
        .bind(&record.username)
        .bind(&record.url)
        .bind(&record.http_method)
        .bind(&record.ip_address)
        .bind(&record.body)
        .bind(&record.query_string)
        .bind(record.full_json())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        debug!(rows = result.rows_affected(), "Stored request record");
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, record), fields(record_id = %record.id()))]
    async fn add_response(&self, record: &ResponseRecord) -> Result<bool, ApplicationError> {
        let elapsed = record
            .elapsed_milliseconds
            .map(|ms| i64::try_from(ms).unwrap_or(i64::MAX));

        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let result = sqlx::query(
            "INSERT INTO response_log (id, request_id, created, application_name, \
             application_version, machine_name, http_status_code, elapsed_milliseconds, full_json)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(record.id().to_string())
        .bind(record.request_id.map(|id| id.to_string()))
        .bind(record.created().to_rfc3339())
        .bind(&record.application_name)
        .bind(&record.application_version)
        .bind(&record.machine_name)
        .bind(record.http_status_code)
        .bind(elapsed)
        .bind(record.full_json())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        debug!(rows = result.rows_affected(), "Stored response record");
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::async_connection::AsyncDatabase;

    async fn setup() -> (AsyncDatabase, SqliteTelemetryStore) {
        let db = AsyncDatabase::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let store = SqliteTelemetryStore::new(db.pool().clone());
        (db, store)
    }

    #[tokio::test]
    async fn add_and_find_error() {
        let (_db, store) = setup().await;

        let mut record = ErrorRecord::new();
        record.error_type = Some("TimeoutError".into());
        record.detail = Some("TimeoutError: slow".into());
        record.machine_name = Some("web-01".into());
        record.refresh_error_hash();

        assert_eq!(store.add_error(&record).await.unwrap(), 1);
        let found = store.find_error(record.id()).await.unwrap().unwrap();
        assert_eq!(found, record);
    }

    #[tokio::test]
    async fn duplicate_error_writes_no_row() {
        let (_db, store) = setup().await;
        let record = ErrorRecord::new();

        assert_eq!(store.add_error(&record).await.unwrap(), 1);
        assert_eq!(store.add_error(&record).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn add_and_find_request() {
        let (_db, store) = setup().await;

        let mut record = RequestRecord::new();
        record.username = Some("alice".into());
        record.body = Some("{}".into());

        assert!(store.add_request(&record).await.unwrap());
        assert!(!store.add_request(&record).await.unwrap());
        let found = store.find_request(record.id()).await.unwrap().unwrap();
        assert_eq!(found.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn responses_are_found_by_request() {
        let (_db, store) = setup().await;
        let request_id = RecordId::new();

        let mut linked = ResponseRecord::new();
        linked.request_id = Some(request_id);
        linked.elapsed_milliseconds = Some(12);
        let unlinked = ResponseRecord::new();

        assert!(store.add_response(&linked).await.unwrap());
        assert!(store.add_response(&unlinked).await.unwrap());

        let responses = store.responses_for_request(request_id).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id(), linked.id());
        assert_eq!(responses[0].elapsed_milliseconds, Some(12));
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let (_db, store) = setup().await;
        assert!(store.find_error(RecordId::new()).await.unwrap().is_none());
        assert!(store.find_response(RecordId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn errors_grouped_by_hash() {
        let (_db, store) = setup().await;

        let mut first = ErrorRecord::new();
        first.detail = Some("Error: boom".into());
        first.refresh_error_hash();
        let mut second = ErrorRecord::new();
        second.detail = Some("Error: boom".into());
        second.refresh_error_hash();

        store.add_error(&first).await.unwrap();
        store.add_error(&second).await.unwrap();

        let hash = first.error_hash.unwrap();
        assert_eq!(store.count_errors_by_hash(hash).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn closed_pool_surfaces_as_persistence_error() {
        let (db, store) = setup().await;
        db.close().await;

        let err = store.add_request(&RequestRecord::new()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Persistence(_)));
    }
}
