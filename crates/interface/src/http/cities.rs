use crate::http::error::ApiResult;
use crate::http::{default_page_number, default_page_size, AppState, IdResponse};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use person_registry_application::cities::{
    CityDto, CreateCityRequest, CreateCityUseCase, DeleteCityRequest, DeleteCityUseCase,
    ListCitiesRequest, ListCitiesUseCase, UpdateCityRequest, UpdateCityUseCase,
};
use person_registry_domain::paging::PagedResult;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CityBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCitiesQuery {
    pub query: Option<String>,
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

pub async fn create_city(
    State(state): State<AppState>,
    Json(body): Json<CityBody>,
) -> ApiResult<Json<IdResponse>> {
    let id = CreateCityUseCase::new((state.uow)())
        .execute(CreateCityRequest { name: body.name })
        .await?;
    Ok(Json(IdResponse { id }))
}

pub async fn update_city(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<CityBody>,
) -> ApiResult<StatusCode> {
    UpdateCityUseCase::new((state.uow)())
        .execute(UpdateCityRequest {
            id,
            name: body.name,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_city(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    DeleteCityUseCase::new((state.uow)())
        .execute(DeleteCityRequest { id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_cities(
    State(state): State<AppState>,
    Query(params): Query<ListCitiesQuery>,
) -> ApiResult<Json<PagedResult<CityDto>>> {
    let page = ListCitiesUseCase::new((state.uow)())
        .execute(ListCitiesRequest {
            query: params.query,
            page_number: params.page_number,
            page_size: params.page_size,
        })
        .await?;
    Ok(Json(page))
}
