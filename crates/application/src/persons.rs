// Person use cases: CRUD, the filtered listing and the relation report.

use crate::pipeline;
use crate::validation::{Rules, ValidateRequest};
use chrono::NaiveDate;
use person_registry_domain::paging::{PagedResult, PageRequest};
use person_registry_domain::person::{Person, PersonDetails, PersonFilter};
use person_registry_domain::relation::RelationReportRow;
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::{DomainError, Gender, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct PersonSummaryDto {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub personal_number: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub city_id: i32,
}

impl From<Person> for PersonSummaryDto {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
            last_name: person.last_name,
            personal_number: person.personal_number,
            birth_date: person.birth_date,
            gender: person.gender.to_string(),
            city_id: person.city_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonPhoneNumberDto {
    pub id: i32,
    pub phone_number: String,
    pub phone_number_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonRelationDto {
    pub related_person_id: i32,
    pub name: String,
    pub last_name: String,
    pub relation_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonDetailsDto {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub personal_number: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub photo: Option<String>,
    pub city_id: i32,
    pub city: String,
    pub phone_numbers: Vec<PersonPhoneNumberDto>,
    pub relations: Vec<PersonRelationDto>,
}

impl From<PersonDetails> for PersonDetailsDto {
    fn from(details: PersonDetails) -> Self {
        let person = details.person;
        Self {
            id: person.id,
            name: person.name,
            last_name: person.last_name,
            personal_number: person.personal_number,
            birth_date: person.birth_date,
            gender: person.gender.to_string(),
            photo: if person.photo.is_empty() {
                None
            } else {
                Some(person.photo)
            },
            city_id: person.city_id,
            city: details.city_name,
            phone_numbers: details
                .phone_numbers
                .into_iter()
                .map(|p| PersonPhoneNumberDto {
                    id: p.id,
                    phone_number: p.phone_number,
                    phone_number_type: p.phone_number_type,
                })
                .collect(),
            relations: details
                .relations
                .into_iter()
                .map(|r| PersonRelationDto {
                    related_person_id: r.related_person_id,
                    name: r.related_person_name,
                    last_name: r.related_person_last_name,
                    relation_type: r.relation_type,
                })
                .collect(),
        }
    }
}

// Validators reject undefined gender values before handlers run.
fn declared_gender(value: i16) -> Result<Gender> {
    Gender::from_value(value).ok_or(DomainError::Validation {
        errors: vec!["gender is not a valid gender value".to_string()],
    })
}

fn person_rules(
    rules: &mut Rules,
    name: &str,
    last_name: &str,
    personal_number: &str,
    birth_date: NaiveDate,
    gender: i16,
) {
    rules
        .not_empty("name", name)
        .length("name", name, 2, 50)
        .single_alphabet("name", name)
        .not_empty("last name", last_name)
        .length("last name", last_name, 2, 50)
        .single_alphabet("last name", last_name)
        .exact_length("personal number", personal_number, 11)
        .digits_only("personal number", personal_number)
        .min_age("birth date", birth_date, 18)
        .declared_gender("gender", gender);
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePersonRequest {
    pub name: String,
    pub last_name: String,
    pub personal_number: String,
    pub birth_date: NaiveDate,
    pub gender: i16,
    pub city_id: i32,
}

impl ValidateRequest for CreatePersonRequest {
    fn validate(&self) -> Result<()> {
        let mut rules = Rules::new();
        person_rules(
            &mut rules,
            &self.name,
            &self.last_name,
            &self.personal_number,
            self.birth_date,
            self.gender,
        );
        rules.positive("city id", self.city_id).finish()
    }
}

pub struct CreatePersonUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl CreatePersonUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: CreatePersonRequest) -> Result<i32> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            if self.uow.cities().get_by_id(request.city_id).await?.is_none() {
                return Err(DomainError::not_found("city", request.city_id));
            }

            let personal_number = request.personal_number.trim();
            if self
                .uow
                .persons()
                .personal_number_exists(personal_number)
                .await?
            {
                return Err(DomainError::already_exists("person", personal_number));
            }

            let gender = declared_gender(request.gender)?;
            let mut person = Person::create(
                &request.name,
                &request.last_name,
                personal_number,
                request.birth_date,
                gender,
                request.city_id,
            );
            self.uow.persons().add(&mut person).await?;

            info!(person_id = person.id, "person created");
            Ok(person.id)
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePersonRequest {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub personal_number: String,
    pub birth_date: NaiveDate,
    pub gender: i16,
    pub city_id: i32,
}

impl ValidateRequest for UpdatePersonRequest {
    fn validate(&self) -> Result<()> {
        let mut rules = Rules::new();
        person_rules(
            &mut rules,
            &self.name,
            &self.last_name,
            &self.personal_number,
            self.birth_date,
            self.gender,
        );
        rules
            .positive("id", self.id)
            .positive("city id", self.city_id)
            .finish()
    }
}

pub struct UpdatePersonUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl UpdatePersonUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: UpdatePersonRequest) -> Result<()> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            // the target city is checked before the person is even loaded
            if self.uow.cities().get_by_id(request.city_id).await?.is_none() {
                return Err(DomainError::not_found("city", request.city_id));
            }

            let mut person = self
                .uow
                .persons()
                .get_by_id(request.id)
                .await?
                .ok_or(DomainError::not_found("person", request.id))?;

            let gender = declared_gender(request.gender)?;
            person.update(
                &request.name,
                &request.last_name,
                &request.personal_number,
                request.birth_date,
                gender,
                request.city_id,
            );
            self.uow.persons().update(&person).await?;
            Ok(())
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletePersonRequest {
    pub id: i32,
}

impl ValidateRequest for DeletePersonRequest {
    fn validate(&self) -> Result<()> {
        Rules::new().positive("id", self.id).finish()
    }
}

pub struct DeletePersonUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl DeletePersonUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: DeletePersonRequest) -> Result<()> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let mut person = self
                .uow
                .persons()
                .get_by_id(request.id)
                .await?
                .ok_or(DomainError::not_found("person", request.id))?;

            person.delete();
            self.uow.persons().update(&person).await?;

            info!(person_id = request.id, "person deleted");
            Ok(())
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetPersonRequest {
    pub id: i32,
}

impl ValidateRequest for GetPersonRequest {
    fn validate(&self) -> Result<()> {
        Rules::new().positive("id", self.id).finish()
    }
}

pub struct GetPersonUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl GetPersonUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: GetPersonRequest) -> Result<PersonDetailsDto> {
        pipeline::execute(&request, || async {
            let details = self
                .uow
                .persons()
                .get_details_by_id(request.id)
                .await?
                .ok_or(DomainError::not_found("person", request.id))?;
            Ok(details.into())
        })
        .await
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPersonsRequest {
    pub query: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub personal_number: Option<String>,
    pub gender: Option<i16>,
    pub birth_date: Option<NaiveDate>,
    pub city_id: Option<i32>,
    pub page_number: i64,
    pub page_size: i64,
}

impl ValidateRequest for ListPersonsRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("page number", self.page_number)
            .positive("page size", self.page_size)
            .finish()
    }
}

impl ListPersonsRequest {
    /// Builds the typed filter. Blank strings, non-positive city ids and
    /// undefined gender values are dropped rather than rejected.
    fn filter(&self) -> PersonFilter {
        let present = |s: &Option<String>| s.clone().filter(|v| !v.trim().is_empty());
        PersonFilter {
            query: present(&self.query),
            name: present(&self.name),
            last_name: present(&self.last_name),
            personal_number: present(&self.personal_number),
            gender: self.gender.and_then(Gender::from_value),
            birth_date: self.birth_date,
            city_id: self.city_id.filter(|id| *id > 0),
        }
    }
}

pub struct ListPersonsUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl ListPersonsUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(
        &self,
        request: ListPersonsRequest,
    ) -> Result<PagedResult<PersonSummaryDto>> {
        pipeline::execute(&request, || async {
            let page = PageRequest::new(request.page_number, request.page_size);
            let persons = self.uow.persons().list(&request.filter(), page).await?;
            Ok(persons.map(PersonSummaryDto::from))
        })
        .await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationReportDto {
    pub name: String,
    pub last_name: String,
    pub personal_number: String,
    pub relation_type: String,
    pub relation_count: i64,
}

impl From<RelationReportRow> for RelationReportDto {
    fn from(row: RelationReportRow) -> Self {
        Self {
            name: row.person_name,
            last_name: row.person_last_name,
            personal_number: row.personal_number,
            relation_type: row.relation_type,
            relation_count: row.relation_count,
        }
    }
}

pub struct RelationReportUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl RelationReportUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self) -> Result<Vec<RelationReportDto>> {
        let rows = self.uow.person_relations().relation_report().await?;
        Ok(rows.into_iter().map(RelationReportDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::{CreateCityRequest, CreateCityUseCase};
    use crate::test_support::InMemoryUnitOfWork;
    use person_registry_domain::unit_of_work::UnitOfWork as _;

    async fn uow_with_city() -> (Arc<InMemoryUnitOfWork>, i32) {
        let uow = Arc::new(InMemoryUnitOfWork::new());
        let city_id = CreateCityUseCase::new(uow.clone())
            .execute(CreateCityRequest {
                name: "Tbilisi".into(),
            })
            .await
            .unwrap();
        (uow, city_id)
    }

    fn create_request(city_id: i32, personal_number: &str) -> CreatePersonRequest {
        CreatePersonRequest {
            name: "Nino".into(),
            last_name: "Beridze".into(),
            personal_number: personal_number.into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            gender: 2,
            city_id,
        }
    }

    #[tokio::test]
    async fn create_person_in_missing_city_is_not_found() {
        let (uow, _) = uow_with_city().await;
        let err = CreatePersonUseCase::new(uow.clone())
            .execute(create_request(77, "01001054321"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "city", id: 77 }));
    }

    #[tokio::test]
    async fn duplicate_personal_number_is_already_exists() {
        let (uow, city_id) = uow_with_city().await;
        let create = CreatePersonUseCase::new(uow.clone());
        create
            .execute(create_request(city_id, "01001054321"))
            .await
            .unwrap();

        let mut second = create_request(city_id, "01001054321");
        second.name = "Giorgi".into();
        second.last_name = "Kapanadze".into();
        let err = create.execute(second).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn create_rejects_minors_and_bad_numbers_before_any_lookup() {
        let (uow, city_id) = uow_with_city().await;
        let opened_during_setup = uow.transactions_opened();
        let mut request = create_request(city_id, "123");
        request.birth_date = chrono::Utc::now().date_naive();
        request.gender = 9;

        let err = CreatePersonUseCase::new(uow.clone())
            .execute(request)
            .await
            .unwrap_err();
        match err {
            DomainError::Validation { errors } => assert!(errors.len() >= 3),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(uow.transactions_opened(), opened_during_setup);
    }

    #[tokio::test]
    async fn update_checks_city_before_person() {
        let (uow, city_id) = uow_with_city().await;
        let person_id = CreatePersonUseCase::new(uow.clone())
            .execute(create_request(city_id, "01001054321"))
            .await
            .unwrap();

        // the missing city is reported even though the person id is also bogus
        let err = UpdatePersonUseCase::new(uow.clone())
            .execute(UpdatePersonRequest {
                id: 9999,
                name: "Nino".into(),
                last_name: "Beridze".into(),
                personal_number: "01001054321".into(),
                birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
                gender: 2,
                city_id: 555,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "city", id: 555 }));

        UpdatePersonUseCase::new(uow.clone())
            .execute(UpdatePersonRequest {
                id: person_id,
                name: "Mariam".into(),
                last_name: "Beridze".into(),
                personal_number: "01001054321".into(),
                birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
                gender: 2,
                city_id,
            })
            .await
            .unwrap();
        let person = uow.persons().get_by_id(person_id).await.unwrap().unwrap();
        assert_eq!(person.name, "Mariam");
    }

    #[tokio::test]
    async fn filter_by_city_id_is_independent_of_other_filters() {
        let (uow, city_a) = uow_with_city().await;
        let city_b = CreateCityUseCase::new(uow.clone())
            .execute(CreateCityRequest {
                name: "Batumi".into(),
            })
            .await
            .unwrap();

        let create = CreatePersonUseCase::new(uow.clone());
        let in_a = create
            .execute(create_request(city_a, "01001054321"))
            .await
            .unwrap();
        create
            .execute(create_request(city_b, "01001054322"))
            .await
            .unwrap();

        let result = ListPersonsUseCase::new(uow.clone())
            .execute(ListPersonsRequest {
                city_id: Some(city_a),
                page_number: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].id, in_a);
        assert_eq!(result.total_count, 1);
    }

    #[tokio::test]
    async fn undefined_gender_filter_is_silently_ignored() {
        let (uow, city_id) = uow_with_city().await;
        CreatePersonUseCase::new(uow.clone())
            .execute(create_request(city_id, "01001054321"))
            .await
            .unwrap();

        let result = ListPersonsUseCase::new(uow.clone())
            .execute(ListPersonsRequest {
                gender: Some(42),
                page_number: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.items.len(), 1);
    }

    #[tokio::test]
    async fn free_text_filter_matches_any_text_field() {
        let (uow, city_id) = uow_with_city().await;
        let create = CreatePersonUseCase::new(uow.clone());
        create
            .execute(create_request(city_id, "01001054321"))
            .await
            .unwrap();
        let mut other = create_request(city_id, "99901054322");
        other.name = "Giorgi".into();
        other.last_name = "Kapanadze".into();
        create.execute(other).await.unwrap();

        let list = ListPersonsUseCase::new(uow.clone());
        let by_name = list
            .execute(ListPersonsRequest {
                query: Some("nino".into()),
                page_number: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.items.len(), 1);

        let by_number = list
            .execute(ListPersonsRequest {
                query: Some("999".into()),
                page_number: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_number.items.len(), 1);
        assert_eq!(by_number.items[0].name, "Giorgi");
    }
}
