// src/handlers/encuentro.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        encuentro::{Encuentro, EncuentroFilter, EncuentroResumen, UpdateEncuentroPayload},
        validate_no_blank,
    },
};

// ---
// Payloads
// ---

// El creador sale del token, no del body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEncuentroPayload {
    #[validate(
        length(min = 1, max = 200, message = "El título es obligatorio (máx. 200 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    #[schema(example = "Asado de fin de año")]
    pub titulo: String,

    #[validate(
        length(min = 1, max = 500, message = "La descripción es obligatoria (máx. 500 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub descripcion: String,

    #[validate(
        length(min = 1, max = 100, message = "El lugar es obligatorio (máx. 100 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub lugar: String,

    pub fecha: DateTime<Utc>,
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/api/encuentro",
    tag = "Encuentros",
    request_body = CreateEncuentroPayload,
    responses(
        (status = 201, description = "Encuentro creado; el creador queda como organizador", body = Encuentro),
        (status = 400, description = "Datos inválidos o fecha en el pasado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_encuentro(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateEncuentroPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let encuentro = app_state
        .encuentro_service
        .create(
            user.0.id,
            &payload.titulo,
            &payload.descripcion,
            &payload.lugar,
            payload.fecha,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(encuentro)))
}

#[utoipa::path(
    get,
    path = "/api/encuentro",
    tag = "Encuentros",
    params(EncuentroFilter),
    responses(
        (status = 200, description = "Encuentros (más recientes primero)", body = [Encuentro])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_encuentros(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<EncuentroFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let encuentros = app_state
        .encuentro_service
        .list(filter.creador)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(encuentros))
}

#[utoipa::path(
    get,
    path = "/api/encuentro/resumen",
    tag = "Encuentros",
    params(EncuentroFilter),
    responses(
        (status = 200, description = "Encuentros con totales", body = [EncuentroResumen])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_resumen(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<EncuentroFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let resumen = app_state
        .encuentro_service
        .list_resumen(filter.creador)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(resumen))
}

#[utoipa::path(
    get,
    path = "/api/encuentro/{id}",
    tag = "Encuentros",
    params(("id" = Uuid, Path, description = "ID del encuentro")),
    responses(
        (status = 200, description = "Encuentro", body = Encuentro),
        (status = 404, description = "Encuentro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_encuentro(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let encuentro = app_state
        .encuentro_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(encuentro))
}

#[utoipa::path(
    patch,
    path = "/api/encuentro/{id}",
    tag = "Encuentros",
    request_body = UpdateEncuentroPayload,
    params(("id" = Uuid, Path, description = "ID del encuentro")),
    responses(
        (status = 200, description = "Encuentro actualizado", body = Encuentro),
        (status = 403, description = "Solo el creador puede editar"),
        (status = 404, description = "Encuentro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_encuentro(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEncuentroPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let encuentro = app_state
        .encuentro_service
        .update(id, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(encuentro))
}

#[utoipa::path(
    delete,
    path = "/api/encuentro/{id}",
    tag = "Encuentros",
    params(("id" = Uuid, Path, description = "ID del encuentro")),
    responses(
        (status = 204, description = "Encuentro eliminado junto con todo lo asociado"),
        (status = 403, description = "Solo el creador puede eliminar"),
        (status = 404, description = "Encuentro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_encuentro(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .encuentro_service
        .delete(id, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_requires_non_empty_fields() {
        let payload: CreateEncuentroPayload = serde_json::from_str(
            r#"{"titulo":"","descripcion":"Cierre","lugar":"Quinta","fecha":"2030-12-20T21:00:00Z"}"#,
        )
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("titulo"));
    }

    #[test]
    fn whitespace_only_fields_are_rejected() {
        let payload: CreateEncuentroPayload = serde_json::from_str(
            r#"{"titulo":"   ","descripcion":"Cierre","lugar":" ","fecha":"2030-12-20T21:00:00Z"}"#,
        )
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("titulo"));
        assert!(fields.contains_key("lugar"));
        assert!(!fields.contains_key("descripcion"));
    }

    #[test]
    fn update_payload_rejects_blank_title() {
        let payload: UpdateEncuentroPayload =
            serde_json::from_str(r#"{"titulo":"  "}"#).unwrap();
        assert!(payload.validate().is_err());

        let payload: UpdateEncuentroPayload = serde_json::from_str(r#"{}"#).unwrap();
        assert!(payload.validate().is_ok());
    }
}
