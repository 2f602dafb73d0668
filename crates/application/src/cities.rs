// City use cases: create, update, delete and the paged listing.

use crate::pipeline;
use crate::validation::{Rules, ValidateRequest};
use person_registry_domain::city::{City, CityFilter};
use person_registry_domain::paging::{PagedResult, PageRequest};
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct CityDto {
    pub id: i32,
    pub name: String,
}

impl From<City> for CityDto {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            name: city.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCityRequest {
    pub name: String,
}

impl ValidateRequest for CreateCityRequest {
    fn validate(&self) -> Result<()> {
        Rules::new().not_empty("name", &self.name).finish()
    }
}

pub struct CreateCityUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl CreateCityUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: CreateCityRequest) -> Result<i32> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let name = request.name.trim();
            if self.uow.cities().name_exists(name).await? {
                return Err(DomainError::already_exists("city", name));
            }

            let mut city = City::create(name);
            self.uow.cities().add(&mut city).await?;

            info!(city_id = city.id, "city created");
            Ok(city.id)
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCityRequest {
    pub id: i32,
    pub name: String,
}

impl ValidateRequest for UpdateCityRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("id", self.id)
            .not_empty("name", &self.name)
            .finish()
    }
}

pub struct UpdateCityUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl UpdateCityUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: UpdateCityRequest) -> Result<()> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let name = request.name.trim();
            if self.uow.cities().name_exists(name).await? {
                return Err(DomainError::already_exists("city", name));
            }

            let mut city = self
                .uow
                .cities()
                .get_by_id(request.id)
                .await?
                .ok_or(DomainError::not_found("city", request.id))?;

            city.update(name);
            self.uow.cities().update(&city).await?;
            Ok(())
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteCityRequest {
    pub id: i32,
}

impl ValidateRequest for DeleteCityRequest {
    fn validate(&self) -> Result<()> {
        Rules::new().positive("id", self.id).finish()
    }
}

pub struct DeleteCityUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl DeleteCityUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: DeleteCityRequest) -> Result<()> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let mut city = self
                .uow
                .cities()
                .get_by_id(request.id)
                .await?
                .ok_or(DomainError::not_found("city", request.id))?;

            city.delete();
            self.uow.cities().update(&city).await?;

            info!(city_id = request.id, "city deleted");
            Ok(())
        })
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListCitiesRequest {
    pub query: Option<String>,
    pub page_number: i64,
    pub page_size: i64,
}

impl ValidateRequest for ListCitiesRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("page number", self.page_number)
            .positive("page size", self.page_size)
            .finish()
    }
}

pub struct ListCitiesUseCase {
    uow: Arc<dyn UnitOfWork>,
}

impl ListCitiesUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, request: ListCitiesRequest) -> Result<PagedResult<CityDto>> {
        pipeline::execute(&request, || async {
            let filter = CityFilter {
                query: request.query.clone().filter(|q| !q.trim().is_empty()),
            };
            let page = PageRequest::new(request.page_number, request.page_size);
            let cities = self.uow.cities().list(&filter, page).await?;
            Ok(cities.map(CityDto::from))
        })
        .await
    }
}
