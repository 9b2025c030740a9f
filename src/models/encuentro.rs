// src/models/encuentro.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validate_no_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Encuentro {
    pub id: Uuid,
    pub id_creador: Uuid,

    #[schema(example = "Asado de fin de año")]
    pub titulo: String,

    #[schema(example = "Nos juntamos a cerrar el año")]
    pub descripcion: String,

    #[schema(example = "Quinta de Martín")]
    pub lugar: String,

    pub fecha: DateTime<Utc>,
    pub fecha_creacion: DateTime<Utc>,
}

// Fila de `v_encuentro_resumen`: encuentro + totales para las tarjetas del listado
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EncuentroResumen {
    pub id: Uuid,
    pub id_creador: Uuid,
    pub titulo: String,
    pub descripcion: String,
    pub lugar: String,
    pub fecha: DateTime<Utc>,
    pub fecha_creacion: DateTime<Utc>,
    pub id_presupuesto: Option<Uuid>,

    #[schema(example = 150000.00)]
    pub presupuesto_total: Decimal,

    #[schema(example = 6)]
    pub cant_participantes: i64,

    #[schema(example = 42000.00)]
    pub total_aportes: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EncuentroFilter {
    /// Encuentros creados por este usuario o en los que participa
    pub creador: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEncuentroPayload {
    #[validate(
        length(min = 1, max = 200, message = "El título es obligatorio (máx. 200 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub titulo: Option<String>,

    #[validate(
        length(min = 1, max = 500, message = "La descripción es obligatoria (máx. 500 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub descripcion: Option<String>,

    #[validate(
        length(min = 1, max = 100, message = "El lugar es obligatorio (máx. 100 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub lugar: Option<String>,

    pub fecha: Option<DateTime<Utc>>,
}

impl UpdateEncuentroPayload {
    pub fn is_empty(&self) -> bool {
        self.titulo.is_none()
            && self.descripcion.is_none()
            && self.lugar.is_none()
            && self.fecha.is_none()
    }
}
