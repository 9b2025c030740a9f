pub mod aporte;
pub mod auth;
pub mod bolsillo;
pub mod encuentro;
pub mod gasto;
pub mod participante;
pub mod presupuesto;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::services::ledger;

// Validador compartido por todos los payloads con montos
pub(crate) fn validate_monto(value: &Decimal) -> Result<(), ValidationError> {
    if ledger::normalize_amount(*value).is_err() {
        let mut err = ValidationError::new("monto");
        err.add_param("min".into(), &0.01);
        err.add_param("max".into(), &ledger::MAX_MONTO);
        err.message = Some("El monto debe ser mayor a cero, no superar 9999999999999.99 y tener como máximo dos decimales.".into());
        return Err(err);
    }
    Ok(())
}

// length(min = 1) acepta "   "; los servicios guardan el valor recortado
pub(crate) fn validate_no_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("El campo no puede estar vacío.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(validate_no_blank("Asado").is_ok());
        assert!(validate_no_blank("  Asado ").is_ok());
        assert!(validate_no_blank("").is_err());
        assert!(validate_no_blank("   ").is_err());
        assert!(validate_no_blank("\t\n").is_err());
    }

    #[test]
    fn amounts_over_the_column_limit_are_rejected() {
        assert!(validate_monto(&"9999999999999.99".parse().unwrap()).is_ok());
        assert!(validate_monto(&"100000000000000".parse().unwrap()).is_err());
    }
}
