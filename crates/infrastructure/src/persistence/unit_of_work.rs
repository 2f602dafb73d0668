// PostgreSQL unit of work. One instance per inbound operation; the shared
// session routes every repository statement through the open transaction.

use crate::persistence::repositories::{
    PgCityRepository, PgPersonRelationRepository, PgPersonRelationTypeRepository,
    PgPersonRepository, PgPhoneNumberTypeRepository,
};
use crate::persistence::session::DbSession;
use async_trait::async_trait;
use person_registry_domain::city::CityRepository;
use person_registry_domain::lookup::{PersonRelationTypeRepository, PhoneNumberTypeRepository};
use person_registry_domain::person::PersonRepository;
use person_registry_domain::relation::PersonRelationRepository;
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::Result;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PgUnitOfWork {
    session: Arc<DbSession>,
    cities: PgCityRepository,
    persons: PgPersonRepository,
    relations: PgPersonRelationRepository,
    relation_types: PgPersonRelationTypeRepository,
    phone_number_types: PgPhoneNumberTypeRepository,
}

impl PgUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        let session = Arc::new(DbSession::new(pool));
        Self {
            cities: PgCityRepository::new(session.clone()),
            persons: PgPersonRepository::new(session.clone()),
            relations: PgPersonRelationRepository::new(session.clone()),
            relation_types: PgPersonRelationTypeRepository::new(session.clone()),
            phone_number_types: PgPhoneNumberTypeRepository::new(session.clone()),
            session,
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn cities(&self) -> &dyn CityRepository {
        &self.cities
    }

    fn persons(&self) -> &dyn PersonRepository {
        &self.persons
    }

    fn person_relations(&self) -> &dyn PersonRelationRepository {
        &self.relations
    }

    fn person_relation_types(&self) -> &dyn PersonRelationTypeRepository {
        &self.relation_types
    }

    fn phone_number_types(&self) -> &dyn PhoneNumberTypeRepository {
        &self.phone_number_types
    }

    async fn begin_transaction(&self) -> Result<()> {
        self.session.begin().await
    }

    async fn commit_transaction(&self) -> Result<()> {
        self.session.commit().await
    }

    async fn rollback_transaction(&self) -> Result<()> {
        self.session.rollback().await
    }
}
