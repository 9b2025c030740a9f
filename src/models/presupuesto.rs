// src/models/presupuesto.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validate_no_blank;

pub const NOMBRE_PRESUPUESTO_DEFAULT: &str = "Presupuesto";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Presupuesto {
    pub id: Uuid,
    pub id_encuentro: Uuid,

    #[schema(example = "Presupuesto general")]
    pub nombre: String,

    // Siempre es la suma de los items; solo lo escribe el repositorio.
    #[schema(example = 150000.00)]
    pub presupuesto_total: Decimal,

    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPresupuesto {
    pub id: Uuid,
    pub id_presupuesto: Uuid,
    pub id_encuentro: Uuid,

    #[schema(example = "Carne")]
    pub nombre_item: String,

    #[schema(example = 60000.00)]
    pub monto_item: Decimal,

    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresupuestoDetalle {
    #[serde(flatten)]
    pub presupuesto: Presupuesto,
    pub items: Vec<ItemPresupuesto>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PresupuestoFilter {
    pub encuentro: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePresupuestoPayload {
    #[validate(
        length(min = 1, max = 200, message = "El nombre es obligatorio (máx. 200 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub nombre: String,
}
