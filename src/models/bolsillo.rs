// src/models/bolsillo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validate_no_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bolsillo {
    pub id: Uuid,
    pub id_encuentro: Uuid,
    pub id_presupuesto: Option<Uuid>,

    #[schema(example = "Bebidas")]
    pub nombre: String,

    // aportes - gastos del bolsillo; lo recalcula el ledger en cada movimiento
    #[schema(example = 8000.00)]
    pub saldo_actual: Decimal,

    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BolsilloFilter {
    pub encuentro: Option<Uuid>,
    pub presupuesto: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBolsilloPayload {
    #[validate(
        length(min = 1, max = 200, message = "El nombre es obligatorio (máx. 200 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub nombre: Option<String>,

    // Ausente: no cambia. null: desvincula del presupuesto.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<Uuid>)]
    pub id_presupuesto: Option<Option<Uuid>>,
}

// Distingue un campo ausente (None) de un null explícito (Some(None))
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_tells_missing_from_null_budget() {
        let id = Uuid::new_v4();

        let sin_cambio: UpdateBolsilloPayload = serde_json::from_str(r#"{"nombre":"Hielo"}"#).unwrap();
        assert_eq!(sin_cambio.id_presupuesto, None);

        let desvincular: UpdateBolsilloPayload =
            serde_json::from_str(r#"{"idPresupuesto":null}"#).unwrap();
        assert_eq!(desvincular.id_presupuesto, Some(None));

        let vincular: UpdateBolsilloPayload =
            serde_json::from_str(&format!(r#"{{"idPresupuesto":"{id}"}}"#)).unwrap();
        assert_eq!(vincular.id_presupuesto, Some(Some(id)));
    }

    #[test]
    fn update_payload_rejects_blank_name() {
        let payload: UpdateBolsilloPayload = serde_json::from_str(r#"{"nombre":"  "}"#).unwrap();
        assert!(payload.validate().is_err());
    }
}
