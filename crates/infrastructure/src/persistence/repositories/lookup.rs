use crate::persistence::session::DbSession;
use async_trait::async_trait;
use person_registry_domain::lookup::{
    PersonRelationType, PersonRelationTypeRepository, PhoneNumberType, PhoneNumberTypeRepository,
};
use person_registry_domain::{DomainError, Result};
use sqlx::Row;
use std::sync::Arc;

pub struct PgPersonRelationTypeRepository {
    session: Arc<DbSession>,
}

impl PgPersonRelationTypeRepository {
    pub fn new(session: Arc<DbSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PersonRelationTypeRepository for PgPersonRelationTypeRepository {
    async fn add(&self, relation_type: &mut PersonRelationType) -> Result<()> {
        let row = self
            .session
            .fetch_one(
                sqlx::query(
                    "INSERT INTO person_relation_types (name, is_deleted)
                     VALUES ($1, $2) RETURNING id",
                )
                .bind(&relation_type.name)
                .bind(relation_type.is_deleted),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to insert relation type: {e}"))
            })?;
        relation_type.id = row.try_get("id").map_err(|e| {
            DomainError::infrastructure(format!("failed to read relation type id: {e}"))
        })?;
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<PersonRelationType>> {
        let row = self
            .session
            .fetch_optional(
                sqlx::query(
                    "SELECT id, name, is_deleted FROM person_relation_types
                     WHERE id = $1 AND is_deleted = FALSE",
                )
                .bind(id),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to load relation type: {e}"))
            })?;

        row.map(|row| {
            Ok(PersonRelationType {
                id: row.try_get("id").map_err(DomainError::infrastructure)?,
                name: row.try_get("name").map_err(DomainError::infrastructure)?,
                is_deleted: row
                    .try_get("is_deleted")
                    .map_err(DomainError::infrastructure)?,
            })
        })
        .transpose()
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}

pub struct PgPhoneNumberTypeRepository {
    session: Arc<DbSession>,
}

impl PgPhoneNumberTypeRepository {
    pub fn new(session: Arc<DbSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PhoneNumberTypeRepository for PgPhoneNumberTypeRepository {
    async fn add(&self, number_type: &mut PhoneNumberType) -> Result<()> {
        let row = self
            .session
            .fetch_one(
                sqlx::query(
                    "INSERT INTO phone_number_types (name, is_deleted)
                     VALUES ($1, $2) RETURNING id",
                )
                .bind(&number_type.name)
                .bind(number_type.is_deleted),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to insert phone number type: {e}"))
            })?;
        number_type.id = row.try_get("id").map_err(|e| {
            DomainError::infrastructure(format!("failed to read phone number type id: {e}"))
        })?;
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<PhoneNumberType>> {
        let row = self
            .session
            .fetch_optional(
                sqlx::query(
                    "SELECT id, name, is_deleted FROM phone_number_types
                     WHERE id = $1 AND is_deleted = FALSE",
                )
                .bind(id),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to load phone number type: {e}"))
            })?;

        row.map(|row| {
            Ok(PhoneNumberType {
                id: row.try_get("id").map_err(DomainError::infrastructure)?,
                name: row.try_get("name").map_err(DomainError::infrastructure)?,
                is_deleted: row
                    .try_get("is_deleted")
                    .map_err(DomainError::infrastructure)?,
            })
        })
        .transpose()
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}
