// Directional person-to-person relations.

use crate::shared_kernel::Result;
use async_trait::async_trait;

/// A directional relation between two persons. The delete path looks rows up
/// by the (person, related person, type) triple, not the primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRelation {
    pub id: i32,
    pub person_id: i32,
    pub related_person_id: i32,
    pub relation_type_id: i32,
    pub is_deleted: bool,
}

impl PersonRelation {
    pub fn create(person_id: i32, related_person_id: i32, relation_type_id: i32) -> Self {
        Self {
            id: 0,
            person_id,
            related_person_id,
            relation_type_id,
            is_deleted: false,
        }
    }

    pub fn delete(&mut self) {
        self.is_deleted = true;
    }
}

/// One row of the relation report: how many relations of a given type a
/// person holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationReportRow {
    pub person_name: String,
    pub person_last_name: String,
    pub personal_number: String,
    pub relation_type: String,
    pub relation_count: i64,
}

#[async_trait]
pub trait PersonRelationRepository: Send + Sync {
    /// Inserts the relation and writes the store-assigned id back into it.
    async fn add(&self, relation: &mut PersonRelation) -> Result<()>;

    async fn update(&self, relation: &PersonRelation) -> Result<()>;

    /// Canonical-triple lookup among active rows.
    async fn get_by_triple(
        &self,
        person_id: i32,
        related_person_id: i32,
        relation_type_id: i32,
    ) -> Result<Option<PersonRelation>>;

    async fn triple_exists(
        &self,
        person_id: i32,
        related_person_id: i32,
        relation_type_id: i32,
    ) -> Result<bool>;

    /// Relation counts grouped by person and relation type.
    async fn relation_report(&self) -> Result<Vec<RelationReportRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_keeps_direction() {
        let relation = PersonRelation::create(1, 2, 3);
        assert_eq!(relation.person_id, 1);
        assert_eq!(relation.related_person_id, 2);
        assert_eq!(relation.relation_type_id, 3);
        assert!(!relation.is_deleted);
    }
}
