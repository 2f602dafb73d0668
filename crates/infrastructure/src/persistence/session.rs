// One database session shared by the repositories of a unit of work.
//
// While a transaction is open every statement issued through the session runs
// inside it; otherwise statements go straight to the pool. The repositories
// never know which is the case.

use person_registry_domain::{DomainError, Result};
use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

pub struct DbSession {
    pool: PgPool,
    tx: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl DbSession {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            tx: Mutex::new(None),
        }
    }

    /// Opens a transaction if none is open yet.
    pub async fn begin(&self) -> Result<()> {
        let mut guard = self.tx.lock().await;
        if guard.is_none() {
            let tx = self.pool.begin().await.map_err(|e| {
                DomainError::infrastructure(format!("failed to begin transaction: {e}"))
            })?;
            *guard = Some(tx);
        }
        Ok(())
    }

    /// Commits the open transaction, if any. A failed commit releases the
    /// connection, which rolls the transaction back on the wire.
    pub async fn commit(&self) -> Result<()> {
        let tx = self.tx.lock().await.take();
        if let Some(tx) = tx {
            tx.commit().await.map_err(|e| {
                DomainError::infrastructure(format!("failed to commit transaction: {e}"))
            })?;
        }
        Ok(())
    }

    pub async fn rollback(&self) -> Result<()> {
        let tx = self.tx.lock().await.take();
        if let Some(tx) = tx {
            tx.rollback().await.map_err(|e| {
                DomainError::infrastructure(format!("failed to roll back transaction: {e}"))
            })?;
        }
        Ok(())
    }

    pub async fn execute(
        &self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> sqlx::Result<PgQueryResult> {
        let mut guard = self.tx.lock().await;
        match guard.as_mut() {
            Some(tx) => query.execute(&mut **tx).await,
            None => query.execute(&self.pool).await,
        }
    }

    pub async fn fetch_one(&self, query: Query<'_, Postgres, PgArguments>) -> sqlx::Result<PgRow> {
        let mut guard = self.tx.lock().await;
        match guard.as_mut() {
            Some(tx) => query.fetch_one(&mut **tx).await,
            None => query.fetch_one(&self.pool).await,
        }
    }

    pub async fn fetch_optional(
        &self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> sqlx::Result<Option<PgRow>> {
        let mut guard = self.tx.lock().await;
        match guard.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await,
            None => query.fetch_optional(&self.pool).await,
        }
    }

    pub async fn fetch_all(
        &self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> sqlx::Result<Vec<PgRow>> {
        let mut guard = self.tx.lock().await;
        match guard.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await,
            None => query.fetch_all(&self.pool).await,
        }
    }
}
