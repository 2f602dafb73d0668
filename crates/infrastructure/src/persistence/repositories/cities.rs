use crate::persistence::query::{contains_pattern, fetch_page, SqlFilter};
use crate::persistence::session::DbSession;
use async_trait::async_trait;
use person_registry_domain::city::{City, CityFilter, CityRepository};
use person_registry_domain::paging::{PagedResult, PageRequest};
use person_registry_domain::{DomainError, Result};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use std::sync::Arc;

pub struct PgCityRepository {
    session: Arc<DbSession>,
}

impl PgCityRepository {
    pub fn new(session: Arc<DbSession>) -> Self {
        Self { session }
    }

    fn map_row(row: &PgRow) -> Result<City> {
        Ok(City {
            id: row
                .try_get("id")
                .map_err(|e| DomainError::infrastructure(format!("failed to read city row: {e}")))?,
            name: row
                .try_get("name")
                .map_err(|e| DomainError::infrastructure(format!("failed to read city row: {e}")))?,
            is_deleted: row
                .try_get("is_deleted")
                .map_err(|e| DomainError::infrastructure(format!("failed to read city row: {e}")))?,
        })
    }
}

impl SqlFilter for CityFilter {
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(query) = &self.query {
            qb.push(" AND name ILIKE ").push_bind(contains_pattern(query));
        }
    }
}

#[async_trait]
impl CityRepository for PgCityRepository {
    async fn add(&self, city: &mut City) -> Result<()> {
        let row = self
            .session
            .fetch_one(
                sqlx::query("INSERT INTO cities (name, is_deleted) VALUES ($1, $2) RETURNING id")
                    .bind(&city.name)
                    .bind(city.is_deleted),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to insert city: {e}")))?;
        city.id = row
            .try_get("id")
            .map_err(|e| DomainError::infrastructure(format!("failed to read city id: {e}")))?;
        Ok(())
    }

    async fn update(&self, city: &City) -> Result<()> {
        let result = self
            .session
            .execute(
                sqlx::query("UPDATE cities SET name = $2, is_deleted = $3 WHERE id = $1")
                    .bind(city.id)
                    .bind(&city.name)
                    .bind(city.is_deleted),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to update city: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("city", city.id));
        }
        Ok(())
    }

    async fn remove(&self, id: i32) -> Result<()> {
        self.session
            .execute(sqlx::query("DELETE FROM cities WHERE id = $1").bind(id))
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to delete city: {e}")))?;
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<City>> {
        let row = self
            .session
            .fetch_optional(
                sqlx::query(
                    "SELECT id, name, is_deleted FROM cities
                     WHERE id = $1 AND is_deleted = FALSE",
                )
                .bind(id),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to load city: {e}")))?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        let row = self
            .session
            .fetch_one(
                sqlx::query(
                    "SELECT EXISTS(
                        SELECT 1 FROM cities
                        WHERE lower(name) = lower($1) AND is_deleted = FALSE
                     )",
                )
                .bind(name.trim()),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to check city name: {e}")))?;
        row.try_get(0)
            .map_err(|e| DomainError::infrastructure(format!("failed to read exists flag: {e}")))
    }

    async fn list(&self, filter: &CityFilter, page: PageRequest) -> Result<PagedResult<City>> {
        fetch_page(
            &self.session,
            "id, name, is_deleted",
            "cities",
            filter,
            "id",
            page,
            Self::map_row,
        )
        .await
    }
}
