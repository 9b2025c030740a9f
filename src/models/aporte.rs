// src/models/aporte.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::validate_monto;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Aporte {
    pub id: Uuid,
    pub id_bolsillo: Option<Uuid>,
    pub id_encuentro: Uuid,
    pub id_usuario: Option<Uuid>,

    #[schema(example = 5000.00)]
    pub monto: Decimal,

    pub fecha_aporte: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AporteFilter {
    pub encuentro: Option<Uuid>,
    pub bolsillo: Option<Uuid>,
    pub usuario: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAportePayload {
    #[validate(custom(function = "validate_monto"))]
    pub monto: Decimal,
}
