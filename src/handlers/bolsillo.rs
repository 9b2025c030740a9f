// src/handlers/bolsillo.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        bolsillo::{Bolsillo, BolsilloFilter, UpdateBolsilloPayload},
        validate_no_blank,
    },
    services::ledger::ResumenBolsillo,
};

// Sin saldo: arranca en 0 y solo lo mueven aportes y gastos
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBolsilloPayload {
    pub id_encuentro: Uuid,
    pub id_presupuesto: Option<Uuid>,

    #[validate(
        length(min = 1, max = 200, message = "El nombre es obligatorio (máx. 200 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    #[schema(example = "Bebidas")]
    pub nombre: String,
}

#[utoipa::path(
    post,
    path = "/api/bolsillo",
    tag = "Bolsillos",
    request_body = CreateBolsilloPayload,
    responses(
        (status = 201, description = "Bolsillo creado con saldo 0", body = Bolsillo),
        (status = 400, description = "El presupuesto es de otro encuentro"),
        (status = 403, description = "Solo el creador del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bolsillo(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateBolsilloPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let bolsillo = app_state
        .bolsillo_service
        .create(user.0.id, payload.id_encuentro, payload.id_presupuesto, &payload.nombre)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(bolsillo)))
}

#[utoipa::path(
    get,
    path = "/api/bolsillo",
    tag = "Bolsillos",
    params(BolsilloFilter),
    responses(
        (status = 200, description = "Bolsillos", body = [Bolsillo])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_bolsillos(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<BolsilloFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let bolsillos = app_state
        .bolsillo_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(bolsillos))
}

#[utoipa::path(
    get,
    path = "/api/bolsillo/{id}",
    tag = "Bolsillos",
    params(("id" = Uuid, Path, description = "ID del bolsillo")),
    responses(
        (status = 200, description = "Bolsillo", body = Bolsillo),
        (status = 404, description = "Bolsillo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_bolsillo(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let bolsillo = app_state
        .bolsillo_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(bolsillo))
}

#[utoipa::path(
    patch,
    path = "/api/bolsillo/{id}",
    tag = "Bolsillos",
    request_body = UpdateBolsilloPayload,
    params(("id" = Uuid, Path, description = "ID del bolsillo")),
    responses(
        (status = 200, description = "Bolsillo actualizado", body = Bolsillo),
        (status = 403, description = "Solo el creador del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bolsillo(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBolsilloPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let bolsillo = app_state
        .bolsillo_service
        .update(user.0.id, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(bolsillo))
}

#[utoipa::path(
    delete,
    path = "/api/bolsillo/{id}",
    tag = "Bolsillos",
    params(("id" = Uuid, Path, description = "ID del bolsillo")),
    responses(
        (status = 204, description = "Bolsillo eliminado; sus aportes quedan sin bolsillo"),
        (status = 403, description = "Solo el creador del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bolsillo(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .bolsillo_service
        .delete(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/bolsillo/{id}/resumen",
    tag = "Bolsillos",
    params(("id" = Uuid, Path, description = "ID del bolsillo")),
    responses(
        (status = 200, description = "Aportes, gastos y saldo del bolsillo", body = ResumenBolsillo)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_resumen(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let resumen = app_state
        .bolsillo_service
        .resumen(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(resumen))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_ignores_client_balance() {
        let payload: CreateBolsilloPayload = serde_json::from_str(&format!(
            r#"{{"idEncuentro":"{}","nombre":"Bebidas","saldoActual":99999}}"#,
            Uuid::new_v4()
        ))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert!(payload.id_presupuesto.is_none());
    }
}
