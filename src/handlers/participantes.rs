// src/handlers/participantes.rs

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
    models::participante::{
        MessageResponse, Participante, ParticipanteAportes, ParticipanteDetalle, ParticipanteFilter,
        UpdateParticipantePayload,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateParticipantePayload {
    pub id_encuentro: Uuid,
    pub id_usuario: Uuid,

    #[validate(length(max = 50, message = "El rol admite como máximo 50 caracteres."))]
    #[schema(example = "participante")]
    pub rol: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/participantes-encuentro",
    tag = "Participantes",
    request_body = CreateParticipantePayload,
    responses(
        (status = 201, description = "Participante agregado", body = Participante),
        (status = 403, description = "Solo el creador puede invitar"),
        (status = 404, description = "Encuentro o usuario no encontrado"),
        (status = 409, description = "El usuario ya participa")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_participante(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateParticipantePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let participante = app_state
        .participante_service
        .add(
            user.0.id,
            payload.id_encuentro,
            payload.id_usuario,
            payload.rol.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(participante)))
}

#[utoipa::path(
    get,
    path = "/api/participantes-encuentro",
    tag = "Participantes",
    params(ParticipanteFilter),
    responses(
        (status = 200, description = "Participaciones", body = [Participante])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_participantes(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ParticipanteFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let participantes = app_state
        .participante_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(participantes))
}

#[utoipa::path(
    get,
    path = "/api/participantes-encuentro/vista/detalle",
    tag = "Participantes",
    params(ParticipanteFilter),
    responses(
        (status = 200, description = "Participantes con nombre y encuentro", body = [ParticipanteDetalle])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_detalle(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ParticipanteFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let filas = app_state
        .participante_service
        .list_detalle(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(filas))
}

#[utoipa::path(
    get,
    path = "/api/participantes-encuentro/aportes/resumen",
    tag = "Participantes",
    params(ParticipanteFilter),
    responses(
        (status = 200, description = "Total aportado por participante", body = [ParticipanteAportes])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_aportes_resumen(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ParticipanteFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let filas = app_state
        .participante_service
        .list_aportes(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(filas))
}

#[utoipa::path(
    get,
    path = "/api/participantes-encuentro/{id}",
    tag = "Participantes",
    params(("id" = Uuid, Path, description = "ID de la participación")),
    responses(
        (status = 200, description = "Participación", body = Participante),
        (status = 404, description = "Participante no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_participante(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let participante = app_state
        .participante_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(participante))
}

#[utoipa::path(
    patch,
    path = "/api/participantes-encuentro/{id}",
    tag = "Participantes",
    request_body = UpdateParticipantePayload,
    params(("id" = Uuid, Path, description = "ID de la participación")),
    responses(
        (status = 200, description = "Rol actualizado", body = Participante),
        (status = 403, description = "Solo el creador puede cambiar roles")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_participante(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateParticipantePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let participante = app_state
        .participante_service
        .update_rol(user.0.id, id, &payload.rol)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(participante))
}

#[utoipa::path(
    delete,
    path = "/api/participantes-encuentro/{id}",
    tag = "Participantes",
    params(("id" = Uuid, Path, description = "ID de la participación")),
    responses(
        (status = 200, description = "Participante eliminado", body = MessageResponse),
        (status = 403, description = "Solo el creador o el propio participante"),
        (status = 409, description = "El creador no puede salir de su encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_participante(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .participante_service
        .remove(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(eliminado(&app_state, &locale)))
}

#[utoipa::path(
    delete,
    path = "/api/participantes-encuentro/encuentro/{id_encuentro}/usuario/{id_usuario}",
    tag = "Participantes",
    params(
        ("id_encuentro" = Uuid, Path, description = "ID del encuentro"),
        ("id_usuario" = Uuid, Path, description = "ID del usuario")
    ),
    responses(
        (status = 200, description = "Participante eliminado", body = MessageResponse),
        (status = 404, description = "El usuario no participa del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((id_encuentro, id_usuario)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .participante_service
        .remove_membership(user.0.id, id_encuentro, id_usuario)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(eliminado(&app_state, &locale)))
}

fn eliminado(app_state: &AppState, locale: &Locale) -> MessageResponse {
    MessageResponse {
        message: app_state.i18n_store.translate(&locale.0, "PARTICIPANTE_ELIMINADO"),
    }
}
