use crate::http::error::ApiResult;
use crate::http::{AppState, IdResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use person_registry_application::relations::{
    CreateRelationRequest, CreateRelationUseCase, DeleteRelationRequest, DeleteRelationUseCase,
};

pub async fn create_relation(
    State(state): State<AppState>,
    Json(body): Json<CreateRelationRequest>,
) -> ApiResult<Json<IdResponse>> {
    let id = CreateRelationUseCase::new((state.uow)()).execute(body).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn delete_relation(
    State(state): State<AppState>,
    Json(body): Json<DeleteRelationRequest>,
) -> ApiResult<StatusCode> {
    DeleteRelationUseCase::new((state.uow)()).execute(body).await?;
    Ok(StatusCode::NO_CONTENT)
}
