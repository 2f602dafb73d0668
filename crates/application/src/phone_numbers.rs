// Phone number commands. Every command loads the owning person first, so a
// deleted person can no longer be reached through its numbers.

use crate::pipeline;
use crate::validation::{Rules, ValidateRequest};
use person_registry_domain::person::PersonPhoneNumber;
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::{DomainError, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePhoneNumberRequest {
    pub person_id: i32,
    pub phone_number_type_id: i32,
    pub phone_number: String,
}

impl ValidateRequest for CreatePhoneNumberRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("person id", self.person_id)
            .positive("phone number type id", self.phone_number_type_id)
            .not_empty("phone number", &self.phone_number)
            .length("phone number", &self.phone_number, 4, 50)
            .finish()
    }
}

pub struct CreatePhoneNumberUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl CreatePhoneNumberUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: CreatePhoneNumberRequest) -> Result<i32> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let person = self
                .uow
                .persons()
                .get_by_id(request.person_id)
                .await?
                .ok_or(DomainError::not_found("person", request.person_id))?;

            if !self
                .uow
                .phone_number_types()
                .exists(request.phone_number_type_id)
                .await?
            {
                return Err(DomainError::not_found(
                    "phone number type",
                    request.phone_number_type_id,
                ));
            }

            let mut phone =
                PersonPhoneNumber::create(&request.phone_number, request.phone_number_type_id);
            self.uow.persons().add_phone(person.id, &mut phone).await?;

            info!(
                person_id = person.id,
                phone_number_id = phone.id,
                "phone number created"
            );
            Ok(phone.id)
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePhoneNumberRequest {
    pub person_id: i32,
    pub phone_number_id: i32,
    pub phone_number_type_id: i32,
    pub phone_number: String,
}

impl ValidateRequest for UpdatePhoneNumberRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("person id", self.person_id)
            .positive("phone number id", self.phone_number_id)
            .positive("phone number type id", self.phone_number_type_id)
            .not_empty("phone number", &self.phone_number)
            .length("phone number", &self.phone_number, 4, 50)
            .finish()
    }
}

pub struct UpdatePhoneNumberUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl UpdatePhoneNumberUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: UpdatePhoneNumberRequest) -> Result<()> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let mut person = self
                .uow
                .persons()
                .get_by_id(request.person_id)
                .await?
                .ok_or(DomainError::not_found("person", request.person_id))?;

            if !self
                .uow
                .phone_number_types()
                .exists(request.phone_number_type_id)
                .await?
            {
                return Err(DomainError::not_found(
                    "phone number type",
                    request.phone_number_type_id,
                ));
            }

            let phone = person.update_number(
                request.phone_number_id,
                request.phone_number_type_id,
                &request.phone_number,
            )?;
            self.uow.persons().update_phone(&phone).await?;
            Ok(())
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletePhoneNumberRequest {
    pub person_id: i32,
    pub phone_number_id: i32,
}

impl ValidateRequest for DeletePhoneNumberRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("person id", self.person_id)
            .positive("phone number id", self.phone_number_id)
            .finish()
    }
}

pub struct DeletePhoneNumberUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl DeletePhoneNumberUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: DeletePhoneNumberRequest) -> Result<()> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let mut person = self
                .uow
                .persons()
                .get_by_id(request.person_id)
                .await?
                .ok_or(DomainError::not_found("person", request.person_id))?;

            let phone = person.delete_number(request.phone_number_id)?;
            self.uow.persons().update_phone(&phone).await?;

            info!(
                person_id = request.person_id,
                phone_number_id = request.phone_number_id,
                "phone number deleted"
            );
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::{CreateCityRequest, CreateCityUseCase};
    use crate::persons::{CreatePersonRequest, CreatePersonUseCase, GetPersonRequest, GetPersonUseCase};
    use crate::test_support::InMemoryUnitOfWork;
    use chrono::NaiveDate;

    async fn uow_with_person() -> (Arc<InMemoryUnitOfWork>, i32) {
        let uow = Arc::new(InMemoryUnitOfWork::new());
        let city_id = CreateCityUseCase::new(uow.clone())
            .execute(CreateCityRequest {
                name: "Tbilisi".into(),
            })
            .await
            .unwrap();
        let person_id = CreatePersonUseCase::new(uow.clone())
            .execute(CreatePersonRequest {
                name: "Nino".into(),
                last_name: "Beridze".into(),
                personal_number: "01001054321".into(),
                birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
                gender: 2,
                city_id,
            })
            .await
            .unwrap();
        (uow, person_id)
    }

    #[tokio::test]
    async fn create_update_delete_round_trip() {
        let (uow, person_id) = uow_with_person().await;

        let phone_id = CreatePhoneNumberUseCase::new(uow.clone())
            .execute(CreatePhoneNumberRequest {
                person_id,
                phone_number_type_id: 1,
                phone_number: " 555123456 ".into(),
            })
            .await
            .unwrap();
        assert!(phone_id > 0);

        UpdatePhoneNumberUseCase::new(uow.clone())
            .execute(UpdatePhoneNumberRequest {
                person_id,
                phone_number_id: phone_id,
                phone_number_type_id: 2,
                phone_number: "599000111".into(),
            })
            .await
            .unwrap();

        let details = GetPersonUseCase::new(uow.clone())
            .execute(GetPersonRequest { id: person_id })
            .await
            .unwrap();
        assert_eq!(details.phone_numbers.len(), 1);
        assert_eq!(details.phone_numbers[0].phone_number, "599000111");

        DeletePhoneNumberUseCase::new(uow.clone())
            .execute(DeletePhoneNumberRequest {
                person_id,
                phone_number_id: phone_id,
            })
            .await
            .unwrap();
        let details = GetPersonUseCase::new(uow.clone())
            .execute(GetPersonRequest { id: person_id })
            .await
            .unwrap();
        assert!(details.phone_numbers.is_empty());
    }

    #[tokio::test]
    async fn create_with_unknown_type_is_not_found() {
        let (uow, person_id) = uow_with_person().await;
        let err = CreatePhoneNumberUseCase::new(uow.clone())
            .execute(CreatePhoneNumberRequest {
                person_id,
                phone_number_type_id: 77,
                phone_number: "555123456".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound { entity: "phone number type", id: 77 }
        ));
        assert_eq!(uow.rolled_back(), 1);
    }

    #[tokio::test]
    async fn update_missing_phone_is_not_found() {
        let (uow, person_id) = uow_with_person().await;
        let err = UpdatePhoneNumberUseCase::new(uow.clone())
            .execute(UpdatePhoneNumberRequest {
                person_id,
                phone_number_id: 41,
                phone_number_type_id: 1,
                phone_number: "555123456".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "phone number", id: 41 }));
    }

    #[tokio::test]
    async fn short_number_fails_validation() {
        let (uow, person_id) = uow_with_person().await;
        let err = CreatePhoneNumberUseCase::new(uow.clone())
            .execute(CreatePhoneNumberRequest {
                person_id,
                phone_number_type_id: 1,
                phone_number: "55".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
