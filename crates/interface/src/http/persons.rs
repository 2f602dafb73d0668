use crate::http::error::ApiResult;
use crate::http::{default_page_number, default_page_size, AppState, IdResponse};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use person_registry_application::persons::{
    CreatePersonRequest, CreatePersonUseCase, DeletePersonRequest, DeletePersonUseCase,
    GetPersonRequest, GetPersonUseCase, ListPersonsRequest, ListPersonsUseCase, PersonDetailsDto,
    PersonSummaryDto, RelationReportDto, RelationReportUseCase, UpdatePersonRequest,
    UpdatePersonUseCase,
};
use person_registry_application::photos::{
    DeletePhotoRequest, DeletePhotoUseCase, DownloadPhotoRequest, DownloadPhotoUseCase,
    UploadPhotoRequest, UploadPhotoUseCase,
};
use person_registry_domain::paging::PagedResult;
use serde::Deserialize;

pub async fn create_person(
    State(state): State<AppState>,
    Json(body): Json<CreatePersonRequest>,
) -> ApiResult<Json<IdResponse>> {
    let id = CreatePersonUseCase::new((state.uow)()).execute(body).await?;
    Ok(Json(IdResponse { id }))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePersonBody {
    pub name: String,
    pub last_name: String,
    pub personal_number: String,
    pub birth_date: NaiveDate,
    pub gender: i16,
    pub city_id: i32,
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdatePersonBody>,
) -> ApiResult<StatusCode> {
    UpdatePersonUseCase::new((state.uow)())
        .execute(UpdatePersonRequest {
            id,
            name: body.name,
            last_name: body.last_name,
            personal_number: body.personal_number,
            birth_date: body.birth_date,
            gender: body.gender,
            city_id: body.city_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    DeletePersonUseCase::new((state.uow)())
        .execute(DeletePersonRequest { id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<PersonDetailsDto>> {
    let details = GetPersonUseCase::new((state.uow)())
        .execute(GetPersonRequest { id })
        .await?;
    Ok(Json(details))
}

#[derive(Debug, Deserialize)]
pub struct ListPersonsQuery {
    pub query: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub personal_number: Option<String>,
    pub gender: Option<i16>,
    pub birth_date: Option<NaiveDate>,
    pub city_id: Option<i32>,
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

pub async fn list_persons(
    State(state): State<AppState>,
    Query(params): Query<ListPersonsQuery>,
) -> ApiResult<Json<PagedResult<PersonSummaryDto>>> {
    let page = ListPersonsUseCase::new((state.uow)())
        .execute(ListPersonsRequest {
            query: params.query,
            name: params.name,
            last_name: params.last_name,
            personal_number: params.personal_number,
            gender: params.gender,
            birth_date: params.birth_date,
            city_id: params.city_id,
            page_number: params.page_number,
            page_size: params.page_size,
        })
        .await?;
    Ok(Json(page))
}

pub async fn relation_report(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RelationReportDto>>> {
    let report = RelationReportUseCase::new((state.uow)()).execute().await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct UploadPhotoQuery {
    #[serde(default = "default_photo_name")]
    pub file_name: String,
}

fn default_photo_name() -> String {
    "photo.jpg".to_string()
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<UploadPhotoQuery>,
    body: Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    let path = UploadPhotoUseCase::new((state.uow)(), state.files.clone())
        .execute(UploadPhotoRequest {
            person_id: id,
            file_name: params.file_name,
            content: body.to_vec(),
        })
        .await?;
    Ok(Json(serde_json::json!({ "photo": path })))
}

pub async fn download_photo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Response> {
    let photo = DownloadPhotoUseCase::new((state.uow)(), state.files.clone())
        .execute(DownloadPhotoRequest { person_id: id })
        .await?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        photo.content,
    )
        .into_response())
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    DeletePhotoUseCase::new((state.uow)(), state.files.clone())
        .execute(DeletePhotoRequest { person_id: id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
