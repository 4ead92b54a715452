//! `PostgreSQL` document store.
//!
//! All collections share the `documents` table; bodies are `JSONB`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{Collection, DocumentStore, RepositoryError};

/// Document store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Wrap an existing pool. Migrations must already have run.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_insert_error(e: sqlx::Error, collection: Collection) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("duplicate document in {collection}"));
    }
    RepositoryError::Database(e)
}

fn body(row: &sqlx::postgres::PgRow) -> Result<Value, RepositoryError> {
    let Json(value) = row.try_get::<Json<Value>, _>("body")?;
    Ok(value)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, collection))?;
        Ok(())
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET body = $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, collection))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn replace_if(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        expected: &str,
        document: Value,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET body = $3, updated_at = now()
            WHERE collection = $1 AND id = $2 AND body ->> $4 = $5
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(document))
        .bind(field)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, collection))?;

        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT body FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(body).transpose()
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT body FROM documents
            WHERE collection = $1
            ORDER BY seq ASC
            ",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(body).collect()
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT body FROM documents
            WHERE collection = $1 AND body @> jsonb_build_object($2::text, $3::text)
            ORDER BY seq ASC
            ",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(body).collect()
    }

    async fn count(&self, collection: Collection) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection.as_str())
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative count {count}")))
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
