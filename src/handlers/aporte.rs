// src/handlers/aporte.rs

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
        aporte::{Aporte, AporteFilter, UpdateAportePayload},
        validate_monto,
    },
};

// El aportante es el usuario autenticado
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAportePayload {
    pub id_encuentro: Uuid,
    pub id_bolsillo: Option<Uuid>,

    #[validate(custom(function = "validate_monto"))]
    #[schema(example = 5000.00)]
    pub monto: Decimal,
}

#[utoipa::path(
    post,
    path = "/api/aporte",
    tag = "Aportes",
    request_body = CreateAportePayload,
    responses(
        (status = 201, description = "Aporte registrado; el saldo del bolsillo se recalcula", body = Aporte),
        (status = 400, description = "Monto inválido o bolsillo de otro encuentro"),
        (status = 403, description = "Solo participantes del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_aporte(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateAportePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let aporte = app_state
        .aporte_service
        .create(user.0.id, payload.id_encuentro, payload.id_bolsillo, payload.monto)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(aporte)))
}

#[utoipa::path(
    get,
    path = "/api/aporte",
    tag = "Aportes",
    params(AporteFilter),
    responses(
        (status = 200, description = "Aportes (se aplica el primer filtro presente)", body = [Aporte])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_aportes(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<AporteFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let aportes = app_state
        .aporte_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(aportes))
}

#[utoipa::path(
    get,
    path = "/api/aporte/{id}",
    tag = "Aportes",
    params(("id" = Uuid, Path, description = "ID del aporte")),
    responses(
        (status = 200, description = "Aporte", body = Aporte),
        (status = 404, description = "Aporte no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_aporte(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let aporte = app_state
        .aporte_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(aporte))
}

#[utoipa::path(
    patch,
    path = "/api/aporte/{id}",
    tag = "Aportes",
    request_body = UpdateAportePayload,
    params(("id" = Uuid, Path, description = "ID del aporte")),
    responses(
        (status = 200, description = "Monto corregido", body = Aporte),
        (status = 403, description = "Solo el autor del aporte")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_aporte(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAportePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let aporte = app_state
        .aporte_service
        .update_monto(user.0.id, id, payload.monto)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(aporte))
}

#[utoipa::path(
    delete,
    path = "/api/aporte/{id}",
    tag = "Aportes",
    params(("id" = Uuid, Path, description = "ID del aporte")),
    responses(
        (status = 204, description = "Aporte eliminado"),
        (status = 403, description = "Solo el autor o el creador del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_aporte(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .aporte_service
        .delete(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
