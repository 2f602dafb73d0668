use crate::persistence::session::DbSession;
use async_trait::async_trait;
use person_registry_domain::relation::{
    PersonRelation, PersonRelationRepository, RelationReportRow,
};
use person_registry_domain::{DomainError, Result};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::sync::Arc;

pub struct PgPersonRelationRepository {
    session: Arc<DbSession>,
}

fn read_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::infrastructure(format!("failed to read relation row: {e}"))
}

impl PgPersonRelationRepository {
    pub fn new(session: Arc<DbSession>) -> Self {
        Self { session }
    }

    fn map_row(row: &PgRow) -> Result<PersonRelation> {
        Ok(PersonRelation {
            id: row.try_get("id").map_err(read_err)?,
            person_id: row.try_get("person_id").map_err(read_err)?,
            related_person_id: row.try_get("related_person_id").map_err(read_err)?,
            relation_type_id: row.try_get("relation_type_id").map_err(read_err)?,
            is_deleted: row.try_get("is_deleted").map_err(read_err)?,
        })
    }
}

#[async_trait]
impl PersonRelationRepository for PgPersonRelationRepository {
    async fn add(&self, relation: &mut PersonRelation) -> Result<()> {
        let row = self
            .session
            .fetch_one(
                sqlx::query(
                    "INSERT INTO person_relations
                        (person_id, related_person_id, relation_type_id, is_deleted)
                     VALUES ($1, $2, $3, $4)
                     RETURNING id",
                )
                .bind(relation.person_id)
                .bind(relation.related_person_id)
                .bind(relation.relation_type_id)
                .bind(relation.is_deleted),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to insert relation: {e}")))?;
        relation.id = row
            .try_get("id")
            .map_err(|e| DomainError::infrastructure(format!("failed to read relation id: {e}")))?;
        Ok(())
    }

    async fn update(&self, relation: &PersonRelation) -> Result<()> {
        let result = self
            .session
            .execute(
                sqlx::query(
                    "UPDATE person_relations
                     SET person_id = $2, related_person_id = $3, relation_type_id = $4,
                         is_deleted = $5
                     WHERE id = $1",
                )
                .bind(relation.id)
                .bind(relation.person_id)
                .bind(relation.related_person_id)
                .bind(relation.relation_type_id)
                .bind(relation.is_deleted),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to update relation: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("person relation", relation.id));
        }
        Ok(())
    }

    async fn get_by_triple(
        &self,
        person_id: i32,
        related_person_id: i32,
        relation_type_id: i32,
    ) -> Result<Option<PersonRelation>> {
        let row = self
            .session
            .fetch_optional(
                sqlx::query(
                    "SELECT id, person_id, related_person_id, relation_type_id, is_deleted
                     FROM person_relations
                     WHERE person_id = $1 AND related_person_id = $2
                       AND relation_type_id = $3 AND is_deleted = FALSE",
                )
                .bind(person_id)
                .bind(related_person_id)
                .bind(relation_type_id),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to load relation: {e}")))?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn triple_exists(
        &self,
        person_id: i32,
        related_person_id: i32,
        relation_type_id: i32,
    ) -> Result<bool> {
        Ok(self
            .get_by_triple(person_id, related_person_id, relation_type_id)
            .await?
            .is_some())
    }

    async fn relation_report(&self) -> Result<Vec<RelationReportRow>> {
        let rows = self
            .session
            .fetch_all(sqlx::query(
                "SELECT p.name, p.last_name, p.personal_number,
                        t.name AS relation_type, COUNT(*) AS relation_count
                 FROM person_relations r
                 JOIN persons p ON p.id = r.person_id
                 JOIN person_relation_types t ON t.id = r.relation_type_id
                 WHERE r.is_deleted = FALSE AND p.is_deleted = FALSE
                 GROUP BY p.id, p.name, p.last_name, p.personal_number, t.name
                 ORDER BY p.name, p.last_name, t.name",
            ))
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to build relation report: {e}"))
            })?;

        rows.iter()
            .map(|row| {
                Ok(RelationReportRow {
                    person_name: row.try_get("name").map_err(read_err)?,
                    person_last_name: row.try_get("last_name").map_err(read_err)?,
                    personal_number: row.try_get("personal_number").map_err(read_err)?,
                    relation_type: row.try_get("relation_type").map_err(read_err)?,
                    relation_count: row.try_get("relation_count").map_err(read_err)?,
                })
            })
            .collect()
    }
}
