//! Integration tests against a live PostgreSQL instance.
//!
//! Ignored by default; run with a throwaway database:
//! `DATABASE_URL=postgres://... cargo test -p person-registry-infrastructure -- --ignored`

use chrono::NaiveDate;
use person_registry_application::cities::{CreateCityRequest, CreateCityUseCase};
use person_registry_application::persons::{
    CreatePersonRequest, CreatePersonUseCase, GetPersonRequest, GetPersonUseCase,
    ListPersonsRequest, ListPersonsUseCase,
};
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::DomainError;
use person_registry_infrastructure::persistence::{schema, PgUnitOfWork};
use sqlx::PgPool;
use std::sync::Arc;

async fn connect() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let pool = PgPool::connect(&url).await.expect("failed to connect");
    schema::run_migrations(&pool).await.expect("migrations failed");
    pool
}

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{prefix}-{}-{nanos}", std::process::id())
}

fn personal_number() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{:011}", nanos % 100_000_000_000)
}

#[tokio::test]
#[ignore]
async fn city_create_is_rolled_back_on_duplicate() {
    let pool = connect().await;
    let name = unique("Tbilisi");

    let uow: Arc<dyn UnitOfWork> = Arc::new(PgUnitOfWork::new(pool.clone()));
    let id = CreateCityUseCase::new(uow)
        .execute(CreateCityRequest { name: name.clone() })
        .await
        .unwrap();
    assert!(id > 0);

    // a fresh unit of work sees the committed row and rejects the duplicate
    let uow: Arc<dyn UnitOfWork> = Arc::new(PgUnitOfWork::new(pool.clone()));
    let err = CreateCityUseCase::new(uow.clone())
        .execute(CreateCityRequest {
            name: name.to_uppercase(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists { .. }));

    uow.cities().remove(id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn person_round_trip_with_details() {
    let pool = connect().await;
    let uow = Arc::new(PgUnitOfWork::new(pool.clone()));

    let city_id = CreateCityUseCase::new(uow.clone())
        .execute(CreateCityRequest {
            name: unique("Batumi"),
        })
        .await
        .unwrap();

    let number = personal_number();
    let person_id = CreatePersonUseCase::new(uow.clone())
        .execute(CreatePersonRequest {
            name: "Nino".into(),
            last_name: "Beridze".into(),
            personal_number: number.clone(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            gender: 2,
            city_id,
        })
        .await
        .unwrap();

    let details = GetPersonUseCase::new(uow.clone())
        .execute(GetPersonRequest { id: person_id })
        .await
        .unwrap();
    assert_eq!(details.personal_number, number);
    assert_eq!(details.city_id, city_id);
    assert!(details.photo.is_none());

    let listed = ListPersonsUseCase::new(uow.clone())
        .execute(ListPersonsRequest {
            personal_number: Some(number),
            page_number: 1,
            page_size: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.total_count, 1);
    assert_eq!(listed.items[0].id, person_id);

    uow.persons().remove(person_id).await.unwrap();
    uow.cities().remove(city_id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn failed_command_leaves_no_rows_behind() {
    let pool = connect().await;
    let uow = Arc::new(PgUnitOfWork::new(pool.clone()));

    let number = personal_number();
    // missing city makes the handler fail after validation passed
    let err = CreatePersonUseCase::new(uow.clone())
        .execute(CreatePersonRequest {
            name: "Nino".into(),
            last_name: "Beridze".into(),
            personal_number: number.clone(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            gender: 2,
            city_id: i32::MAX,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "city", .. }));

    let fresh = PgUnitOfWork::new(pool.clone());
    assert!(!fresh
        .persons()
        .personal_number_exists(&number)
        .await
        .unwrap());
}
