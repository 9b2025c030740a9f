// src/models/gasto.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// Un gasto real pagado desde un bolsillo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Gasto {
    pub id: Uuid,
    pub id_bolsillo: Uuid,
    pub id_encuentro: Uuid,
    pub id_usuario: Option<Uuid>,

    #[schema(example = "Carbón y leña")]
    pub nombre: String,

    #[schema(example = 3500.00)]
    pub monto: Decimal,

    pub fecha_gasto: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GastoFilter {
    pub bolsillo: Option<Uuid>,
    pub encuentro: Option<Uuid>,
}
