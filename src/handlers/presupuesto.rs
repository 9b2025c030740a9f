// src/handlers/presupuesto.rs

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
        presupuesto::{
            ItemPresupuesto, Presupuesto, PresupuestoDetalle, PresupuestoFilter,
            UpdatePresupuestoPayload,
        },
        validate_monto, validate_no_blank,
    },
    services::ledger::ResumenPresupuesto,
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePresupuestoPayload {
    pub id_encuentro: Uuid,

    #[validate(length(max = 200, message = "El nombre admite como máximo 200 caracteres."))]
    #[schema(example = "Presupuesto general")]
    pub nombre: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    pub id_presupuesto: Uuid,
    pub id_encuentro: Uuid,

    #[validate(
        length(min = 1, max = 200, message = "El nombre del item es obligatorio (máx. 200 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    #[schema(example = "Carne")]
    pub nombre_item: String,

    #[validate(custom(function = "validate_monto"))]
    #[schema(example = 60000.00)]
    pub monto_item: Decimal,
}

// ---
// Presupuestos
// ---

#[utoipa::path(
    post,
    path = "/api/presupuesto",
    tag = "Presupuestos",
    request_body = CreatePresupuestoPayload,
    responses(
        (status = 201, description = "Presupuesto creado", body = Presupuesto),
        (status = 403, description = "Solo el creador del encuentro"),
        (status = 409, description = "El encuentro ya tiene presupuesto")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_presupuesto(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePresupuestoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let presupuesto = app_state
        .presupuesto_service
        .create(user.0.id, payload.id_encuentro, payload.nombre.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(presupuesto)))
}

// Con ?encuentro= devuelve ese presupuesto con items; sin filtro, los del usuario
#[utoipa::path(
    get,
    path = "/api/presupuesto",
    tag = "Presupuestos",
    params(PresupuestoFilter),
    responses(
        (status = 200, description = "Presupuesto del encuentro (con items) o lista de presupuestos del usuario", body = PresupuestoDetalle),
        (status = 404, description = "El encuentro no tiene presupuesto")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_presupuestos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<PresupuestoFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let response = match filter.encuentro {
        Some(id_encuentro) => Json(
            app_state
                .presupuesto_service
                .detalle_de_encuentro(id_encuentro)
                .await
                .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?,
        )
        .into_response(),
        None => Json(
            app_state
                .presupuesto_service
                .list_for_user(user.0.id)
                .await
                .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?,
        )
        .into_response(),
    };

    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/presupuesto/{id}",
    tag = "Presupuestos",
    params(("id" = Uuid, Path, description = "ID del presupuesto")),
    responses(
        (status = 200, description = "Presupuesto con items", body = PresupuestoDetalle),
        (status = 404, description = "Presupuesto no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_presupuesto(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detalle = app_state
        .presupuesto_service
        .detalle(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detalle))
}

#[utoipa::path(
    patch,
    path = "/api/presupuesto/{id}",
    tag = "Presupuestos",
    request_body = UpdatePresupuestoPayload,
    params(("id" = Uuid, Path, description = "ID del presupuesto")),
    responses(
        (status = 200, description = "Presupuesto renombrado", body = Presupuesto),
        (status = 403, description = "Solo el creador del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_presupuesto(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePresupuestoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let presupuesto = app_state
        .presupuesto_service
        .rename(user.0.id, id, &payload.nombre)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(presupuesto))
}

#[utoipa::path(
    delete,
    path = "/api/presupuesto/{id}",
    tag = "Presupuestos",
    params(("id" = Uuid, Path, description = "ID del presupuesto")),
    responses(
        (status = 204, description = "Presupuesto eliminado"),
        (status = 403, description = "Solo el creador del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_presupuesto(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .presupuesto_service
        .delete(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/presupuesto/{id}/resumen",
    tag = "Presupuestos",
    params(("id" = Uuid, Path, description = "ID del presupuesto")),
    responses(
        (status = 200, description = "Planificado vs. recaudado vs. gastado", body = ResumenPresupuesto)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_resumen(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let resumen = app_state
        .presupuesto_service
        .resumen(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(resumen))
}

// ---
// Items
// ---

#[utoipa::path(
    post,
    path = "/api/presupuesto/item",
    tag = "Presupuestos",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item agregado; el total se recalcula", body = ItemPresupuesto),
        (status = 400, description = "Monto inválido o presupuesto de otro encuentro"),
        (status = 403, description = "Solo el creador del encuentro")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .presupuesto_service
        .add_item(
            user.0.id,
            payload.id_presupuesto,
            payload.id_encuentro,
            &payload.nombre_item,
            payload.monto_item,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/presupuesto/{id}/items",
    tag = "Presupuestos",
    params(("id" = Uuid, Path, description = "ID del presupuesto")),
    responses(
        (status = 200, description = "Items en orden de carga", body = [ItemPresupuesto])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .presupuesto_service
        .list_items(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(items))
}

#[utoipa::path(
    delete,
    path = "/api/presupuesto/item/{id_item}",
    tag = "Presupuestos",
    params(("id_item" = Uuid, Path, description = "ID del item")),
    responses(
        (status = 204, description = "Item eliminado; el total se recalcula"),
        (status = 404, description = "Item no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id_item): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .presupuesto_service
        .delete_item(user.0.id, id_item)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_amount_must_be_positive_with_two_decimals() {
        let item = |monto: &str| -> CreateItemPayload {
            serde_json::from_str(&format!(
                r#"{{"idPresupuesto":"{}","idEncuentro":"{}","nombreItem":"Carne","montoItem":{monto}}}"#,
                Uuid::new_v4(),
                Uuid::new_v4()
            ))
            .unwrap()
        };

        assert!(item("1500.50").validate().is_ok());
        assert!(item("0").validate().is_err());
        assert!(item("-10").validate().is_err());
        assert!(item("10.999").validate().is_err());
    }
}
