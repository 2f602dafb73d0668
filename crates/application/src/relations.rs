// Person relation commands. Relations are directional and addressed by the
// (person, related person, type) triple on the delete path.

use crate::pipeline;
use crate::validation::{Rules, ValidateRequest};
use person_registry_domain::relation::PersonRelation;
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::{DomainError, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRelationRequest {
    pub person_id: i32,
    pub related_person_id: i32,
    pub relation_type_id: i32,
}

impl ValidateRequest for CreateRelationRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("person id", self.person_id)
            .positive("related person id", self.related_person_id)
            .positive("relation type id", self.relation_type_id)
            .must(
                self.person_id != self.related_person_id,
                "a person cannot be related to themselves",
            )
            .finish()
    }
}

pub struct CreateRelationUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl CreateRelationUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: CreateRelationRequest) -> Result<i32> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            if !self.uow.persons().exists(request.person_id).await? {
                return Err(DomainError::not_found("person", request.person_id));
            }
            if !self.uow.persons().exists(request.related_person_id).await? {
                return Err(DomainError::not_found("person", request.related_person_id));
            }
            if !self
                .uow
                .person_relation_types()
                .exists(request.relation_type_id)
                .await?
            {
                return Err(DomainError::not_found(
                    "person relation type",
                    request.relation_type_id,
                ));
            }

            if self
                .uow
                .person_relations()
                .triple_exists(
                    request.person_id,
                    request.related_person_id,
                    request.relation_type_id,
                )
                .await?
            {
                return Err(DomainError::already_exists(
                    "person relation",
                    format!(
                        "{}-{}-{}",
                        request.person_id, request.related_person_id, request.relation_type_id
                    ),
                ));
            }

            let mut relation = PersonRelation::create(
                request.person_id,
                request.related_person_id,
                request.relation_type_id,
            );
            self.uow.person_relations().add(&mut relation).await?;

            info!(relation_id = relation.id, "person relation created");
            Ok(relation.id)
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRelationRequest {
    pub person_id: i32,
    pub related_person_id: i32,
    pub relation_type_id: i32,
}

impl ValidateRequest for DeleteRelationRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("person id", self.person_id)
            .positive("related person id", self.related_person_id)
            .positive("relation type id", self.relation_type_id)
            .finish()
    }
}

pub struct DeleteRelationUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl DeleteRelationUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: DeleteRelationRequest) -> Result<()> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let mut relation = self
                .uow
                .person_relations()
                .get_by_triple(
                    request.person_id,
                    request.related_person_id,
                    request.relation_type_id,
                )
                .await?
                .ok_or(DomainError::RelationNotFound {
                    person_id: request.person_id,
                    related_person_id: request.related_person_id,
                    relation_type_id: request.relation_type_id,
                })?;

            relation.delete();
            self.uow.person_relations().update(&relation).await?;

            info!(relation_id = relation.id, "person relation deleted");
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::{CreateCityRequest, CreateCityUseCase};
    use crate::persons::{
        CreatePersonRequest, CreatePersonUseCase, RelationReportUseCase,
    };
    use crate::test_support::InMemoryUnitOfWork;
    use chrono::NaiveDate;

    async fn create_person(uow: &Arc<InMemoryUnitOfWork>, city_id: i32, number: &str, name: &str) -> i32 {
        CreatePersonUseCase::new(uow.clone())
            .execute(CreatePersonRequest {
                name: name.into(),
                last_name: "Beridze".into(),
                personal_number: number.into(),
                birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
                gender: 1,
                city_id,
            })
            .await
            .unwrap()
    }

    async fn uow_with_two_persons() -> (Arc<InMemoryUnitOfWork>, i32, i32) {
        let uow = Arc::new(InMemoryUnitOfWork::new());
        let city_id = CreateCityUseCase::new(uow.clone())
            .execute(CreateCityRequest {
                name: "Tbilisi".into(),
            })
            .await
            .unwrap();
        let a = create_person(&uow, city_id, "01001054321", "Nino").await;
        let b = create_person(&uow, city_id, "01001054322", "Giorgi").await;
        (uow, a, b)
    }

    #[tokio::test]
    async fn self_relation_fails_validation() {
        let (uow, a, _) = uow_with_two_persons().await;
        let err = CreateRelationUseCase::new(uow.clone())
            .execute(CreateRelationRequest {
                person_id: a,
                related_person_id: a,
                relation_type_id: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(uow.transactions_opened(), 3); // the city and person creates only
    }

    #[tokio::test]
    async fn duplicate_triple_is_already_exists() {
        let (uow, a, b) = uow_with_two_persons().await;
        let create = CreateRelationUseCase::new(uow.clone());
        create
            .execute(CreateRelationRequest {
                person_id: a,
                related_person_id: b,
                relation_type_id: 1,
            })
            .await
            .unwrap();

        let err = create
            .execute(CreateRelationRequest {
                person_id: a,
                related_person_id: b,
                relation_type_id: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists { .. }));

        // the reverse direction is a different relation
        create
            .execute(CreateRelationRequest {
                person_id: b,
                related_person_id: a,
                relation_type_id: 1,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_is_addressed_by_triple_and_second_delete_fails() {
        let (uow, a, b) = uow_with_two_persons().await;
        CreateRelationUseCase::new(uow.clone())
            .execute(CreateRelationRequest {
                person_id: a,
                related_person_id: b,
                relation_type_id: 2,
            })
            .await
            .unwrap();

        let delete = DeleteRelationUseCase::new(uow.clone());
        delete
            .execute(DeleteRelationRequest {
                person_id: a,
                related_person_id: b,
                relation_type_id: 2,
            })
            .await
            .unwrap();

        let err = delete
            .execute(DeleteRelationRequest {
                person_id: a,
                related_person_id: b,
                relation_type_id: 2,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RelationNotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_relation_type_is_not_found() {
        let (uow, a, b) = uow_with_two_persons().await;
        let err = CreateRelationUseCase::new(uow.clone())
            .execute(CreateRelationRequest {
                person_id: a,
                related_person_id: b,
                relation_type_id: 99,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound { entity: "person relation type", id: 99 }
        ));
    }

    #[tokio::test]
    async fn report_counts_relations_per_person_and_type() {
        let (uow, a, b) = uow_with_two_persons().await;
        let city_id = 1;
        let c = create_person(&uow, city_id, "01001054323", "Mariam").await;

        let create = CreateRelationUseCase::new(uow.clone());
        for (related, type_id) in [(b, 1), (c, 1), (b, 3)] {
            create
                .execute(CreateRelationRequest {
                    person_id: a,
                    related_person_id: related,
                    relation_type_id: type_id,
                })
                .await
                .unwrap();
        }

        let report = RelationReportUseCase::new(uow.clone())
            .execute()
            .await
            .unwrap();
        assert_eq!(report.len(), 2);
        let colleague = report
            .iter()
            .find(|r| r.relation_type == "Colleague")
            .unwrap();
        assert_eq!(colleague.relation_count, 2);
        assert_eq!(colleague.name, "Nino");
        let relative = report
            .iter()
            .find(|r| r.relation_type == "Relative")
            .unwrap();
        assert_eq!(relative.relation_count, 1);
    }
}
