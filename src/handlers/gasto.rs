// src/handlers/gasto.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        gasto::{Gasto, GastoFilter},
        validate_monto, validate_no_blank,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGastoPayload {
    pub id_bolsillo: Uuid,

    #[validate(
        length(min = 1, max = 200, message = "El nombre del gasto es obligatorio (máx. 200 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    #[schema(example = "Carbón y leña")]
    pub nombre: String,

    #[validate(custom(function = "validate_monto"))]
    #[schema(example = 3500.00)]
    pub monto: Decimal,
}

#[utoipa::path(
    post,
    path = "/api/gasto",
    tag = "Gastos",
    request_body = CreateGastoPayload,
    responses(
        (status = 201, description = "Gasto registrado; el saldo del bolsillo se recalcula", body = Gasto),
        (status = 403, description = "Solo participantes del encuentro"),
        (status = 404, description = "Bolsillo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_gasto(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateGastoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let gasto = app_state
        .gasto_service
        .create(user.0.id, payload.id_bolsillo, &payload.nombre, payload.monto)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(gasto)))
}

#[utoipa::path(
    get,
    path = "/api/gasto",
    tag = "Gastos",
    params(GastoFilter),
    responses(
        (status = 200, description = "Gastos", body = [Gasto])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_gastos(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<GastoFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let gastos = app_state
        .gasto_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(gastos))
}

#[utoipa::path(
    get,
    path = "/api/gasto/{id}",
    tag = "Gastos",
    params(("id" = Uuid, Path, description = "ID del gasto")),
    responses(
        (status = 200, description = "Gasto", body = Gasto),
        (status = 404, description = "Gasto no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_gasto(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let gasto = app_state
        .gasto_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(gasto))
}

#[utoipa::path(
    delete,
    path = "/api/gasto/{id}",
    tag = "Gastos",
    params(("id" = Uuid, Path, description = "ID del gasto")),
    responses(
        (status = 204, description = "Gasto eliminado"),
        (status = 403, description = "Solo el autor o el creador del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_gasto(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .gasto_service
        .delete(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
