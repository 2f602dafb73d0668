use crate::http::error::ApiResult;
use crate::http::{AppState, IdResponse};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use person_registry_application::phone_numbers::{
    CreatePhoneNumberRequest, CreatePhoneNumberUseCase, DeletePhoneNumberRequest,
    DeletePhoneNumberUseCase, UpdatePhoneNumberRequest, UpdatePhoneNumberUseCase,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PhoneNumberBody {
    pub phone_number_type_id: i32,
    pub phone_number: String,
}

pub async fn create_phone_number(
    State(state): State<AppState>,
    Path(person_id): Path<i32>,
    Json(body): Json<PhoneNumberBody>,
) -> ApiResult<Json<IdResponse>> {
    let id = CreatePhoneNumberUseCase::new((state.uow)())
        .execute(CreatePhoneNumberRequest {
            person_id,
            phone_number_type_id: body.phone_number_type_id,
            phone_number: body.phone_number,
        })
        .await?;
    Ok(Json(IdResponse { id }))
}

pub async fn update_phone_number(
    State(state): State<AppState>,
    Path((person_id, phone_number_id)): Path<(i32, i32)>,
    Json(body): Json<PhoneNumberBody>,
) -> ApiResult<StatusCode> {
    UpdatePhoneNumberUseCase::new((state.uow)())
        .execute(UpdatePhoneNumberRequest {
            person_id,
            phone_number_id,
            phone_number_type_id: body.phone_number_type_id,
            phone_number: body.phone_number,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_phone_number(
    State(state): State<AppState>,
    Path((person_id, phone_number_id)): Path<(i32, i32)>,
) -> ApiResult<StatusCode> {
    DeletePhoneNumberUseCase::new((state.uow)())
        .execute(DeletePhoneNumberRequest {
            person_id,
            phone_number_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
