// src/models/participante.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validate_no_blank;

pub const ROL_ORGANIZADOR: &str = "organizador";
pub const ROL_PARTICIPANTE: &str = "participante";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participante {
    pub id: Uuid,
    pub id_encuentro: Uuid,
    pub id_usuario: Uuid,

    #[schema(example = "participante")]
    pub rol: String,

    pub fecha_union: DateTime<Utc>,
}

// `v_participantes_encuentro`
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipanteDetalle {
    pub id_encuentro: Uuid,
    pub titulo_encuentro: String,
    pub fecha: DateTime<Utc>,
    pub id_usuario: Uuid,
    pub nombre_completo: String,
    pub rol: String,
}

// `v_participantes_aportes`
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipanteAportes {
    pub id_encuentro: Uuid,
    pub nombre_encuentro: String,
    pub id_usuario: Uuid,
    pub nombre_usuario: String,
    pub apellido_usuario: Option<String>,
    pub rol: String,

    #[schema(example = 12500.00)]
    pub total_aportes: Decimal,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParticipanteFilter {
    pub encuentro: Option<Uuid>,
    pub usuario: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateParticipantePayload {
    #[validate(
        length(min = 1, max = 50, message = "El rol es obligatorio (máx. 50 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub rol: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
