// src/services/ledger.rs
//
// Reglas de saldos. Todo lo que calcula un total de bolsillo o de presupuesto
// pasa por acá; los repositorios aplican la misma fórmula en SQL al
// refrescar `saldo_actual` y `presupuesto_total`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        aporte::Aporte,
        bolsillo::Bolsillo,
        gasto::Gasto,
        presupuesto::{ItemPresupuesto, Presupuesto},
    },
};

pub const MAX_DECIMALES: u32 = 2;

/// Tope de NUMERIC(15,2): 13 dígitos enteros.
pub const MAX_MONTO: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 2);

/// Monto > 0, como máximo dos decimales y dentro de NUMERIC(15,2).
pub fn normalize_amount(amount: Decimal) -> Result<Decimal, AppError> {
    if amount <= Decimal::ZERO || amount > MAX_MONTO {
        return Err(AppError::InvalidAmount);
    }
    let normalized = amount.normalize();
    if normalized.scale() > MAX_DECIMALES {
        return Err(AppError::InvalidAmount);
    }
    Ok(normalized)
}

/// saldo = Σ aportes − Σ gastos (puede quedar negativo si se gastó de más)
pub fn saldo(aportes: &[Aporte], gastos: &[Gasto]) -> Decimal {
    let entradas: Decimal = aportes.iter().map(|a| a.monto).sum();
    let salidas: Decimal = gastos.iter().map(|g| g.monto).sum();
    entradas - salidas
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumenBolsillo {
    pub id_bolsillo: Uuid,
    pub nombre: String,
    pub total_aportes: Decimal,
    pub cant_aportantes: usize,
    pub total_gastos: Decimal,
    pub saldo: Decimal,
    // saldo guardado en la tabla, para detectar desvíos
    pub saldo_actual: Decimal,
    pub saldo_consistente: bool,
    pub ultimo_gasto: Option<String>,
    pub ultimo_gasto_por: Option<Uuid>,
    pub ultimo_movimiento: Option<DateTime<Utc>>,
}

impl ResumenBolsillo {
    pub fn calcular(bolsillo: &Bolsillo, aportes: &[Aporte], gastos: &[Gasto]) -> Self {
        let aportes: Vec<Aporte> = aportes
            .iter()
            .filter(|a| a.id_bolsillo == Some(bolsillo.id))
            .cloned()
            .collect();
        let gastos: Vec<Gasto> = gastos
            .iter()
            .filter(|g| g.id_bolsillo == bolsillo.id)
            .cloned()
            .collect();

        let total_aportes: Decimal = aportes.iter().map(|a| a.monto).sum();
        let total_gastos: Decimal = gastos.iter().map(|g| g.monto).sum();
        let aportantes: HashSet<Uuid> = aportes.iter().filter_map(|a| a.id_usuario).collect();
        let saldo = saldo(&aportes, &gastos);

        let ultimo = gastos.iter().max_by_key(|g| g.fecha_gasto);
        let ultimo_movimiento = aportes
            .iter()
            .map(|a| a.fecha_aporte)
            .chain(gastos.iter().map(|g| g.fecha_gasto))
            .max();

        Self {
            id_bolsillo: bolsillo.id,
            nombre: bolsillo.nombre.clone(),
            total_aportes,
            cant_aportantes: aportantes.len(),
            total_gastos,
            saldo,
            saldo_actual: bolsillo.saldo_actual,
            saldo_consistente: saldo == bolsillo.saldo_actual,
            ultimo_gasto: ultimo.map(|g| g.nombre.clone()),
            ultimo_gasto_por: ultimo.and_then(|g| g.id_usuario),
            ultimo_movimiento,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumenPresupuesto {
    pub id_presupuesto: Uuid,
    pub id_encuentro: Uuid,
    pub nombre: String,
    pub cant_items: usize,
    pub total_planificado: Decimal,
    pub total_recaudado: Decimal,
    pub total_gastado: Decimal,
    pub disponible: Decimal,
    pub pendiente_por_recaudar: Decimal,
    pub porcentaje_recaudado: Decimal,
    pub bolsillos: Vec<ResumenBolsillo>,
}

impl ResumenPresupuesto {
    pub fn calcular(
        presupuesto: &Presupuesto,
        items: &[ItemPresupuesto],
        bolsillos: Vec<ResumenBolsillo>,
    ) -> Self {
        let items: Vec<&ItemPresupuesto> = items
            .iter()
            .filter(|i| i.id_presupuesto == presupuesto.id)
            .collect();

        let total_planificado: Decimal = items.iter().map(|i| i.monto_item).sum();
        let total_recaudado: Decimal = bolsillos.iter().map(|b| b.total_aportes).sum();
        let total_gastado: Decimal = bolsillos.iter().map(|b| b.total_gastos).sum();

        let pendiente_por_recaudar = (total_planificado - total_recaudado).max(Decimal::ZERO);
        let porcentaje_recaudado = if total_planificado.is_zero() {
            Decimal::ZERO
        } else {
            (total_recaudado * Decimal::ONE_HUNDRED / total_planificado).round_dp(MAX_DECIMALES)
        };

        Self {
            id_presupuesto: presupuesto.id,
            id_encuentro: presupuesto.id_encuentro,
            nombre: presupuesto.nombre.clone(),
            cant_items: items.len(),
            total_planificado,
            total_recaudado,
            total_gastado,
            disponible: total_recaudado - total_gastado,
            pendiente_por_recaudar,
            porcentaje_recaudado,
            bolsillos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn bolsillo(saldo_actual: &str) -> Bolsillo {
        Bolsillo {
            id: Uuid::new_v4(),
            id_encuentro: Uuid::new_v4(),
            id_presupuesto: None,
            nombre: "Bebidas".into(),
            saldo_actual: dec(saldo_actual),
            fecha_creacion: Utc::now(),
        }
    }

    fn aporte(b: &Bolsillo, usuario: Uuid, monto: &str) -> Aporte {
        Aporte {
            id: Uuid::new_v4(),
            id_bolsillo: Some(b.id),
            id_encuentro: b.id_encuentro,
            id_usuario: Some(usuario),
            monto: dec(monto),
            fecha_aporte: Utc::now(),
        }
    }

    fn gasto(b: &Bolsillo, nombre: &str, monto: &str, hace_min: i64) -> Gasto {
        Gasto {
            id: Uuid::new_v4(),
            id_bolsillo: b.id,
            id_encuentro: b.id_encuentro,
            id_usuario: Some(Uuid::new_v4()),
            nombre: nombre.into(),
            monto: dec(monto),
            fecha_gasto: Utc::now() - Duration::minutes(hace_min),
        }
    }

    fn item(p: &Presupuesto, monto: &str) -> ItemPresupuesto {
        ItemPresupuesto {
            id: Uuid::new_v4(),
            id_presupuesto: p.id,
            id_encuentro: p.id_encuentro,
            nombre_item: "Item".into(),
            monto_item: dec(monto),
            fecha_creacion: Utc::now(),
        }
    }

    fn presupuesto() -> Presupuesto {
        Presupuesto {
            id: Uuid::new_v4(),
            id_encuentro: Uuid::new_v4(),
            nombre: "General".into(),
            presupuesto_total: Decimal::ZERO,
            fecha_creacion: Utc::now(),
        }
    }

    #[test]
    fn amounts_must_be_positive_with_two_decimals() {
        assert_eq!(normalize_amount(dec("10.50")).unwrap(), dec("10.5"));
        assert_eq!(normalize_amount(dec("0.01")).unwrap(), dec("0.01"));
        assert!(normalize_amount(dec("10.500")).is_ok());
        assert!(normalize_amount(dec("0")).is_err());
        assert!(normalize_amount(dec("-3")).is_err());
        assert!(normalize_amount(dec("1.001")).is_err());
        assert_eq!(MAX_MONTO, dec("9999999999999.99"));
        assert!(normalize_amount(dec("9999999999999.99")).is_ok());
        assert!(normalize_amount(dec("10000000000000")).is_err());
        assert!(normalize_amount(dec("100000000000000")).is_err());
    }

    #[test]
    fn pocket_summary_totals_and_contributors() {
        let b = bolsillo("3500.00");
        let ana = Uuid::new_v4();
        let luis = Uuid::new_v4();
        let aportes = vec![
            aporte(&b, ana, "2000"),
            aporte(&b, ana, "1000"),
            aporte(&b, luis, "1500"),
        ];
        let gastos = vec![gasto(&b, "Hielo", "500", 30), gasto(&b, "Gaseosas", "500", 5)];

        let resumen = ResumenBolsillo::calcular(&b, &aportes, &gastos);

        assert_eq!(resumen.total_aportes, dec("4500"));
        assert_eq!(resumen.cant_aportantes, 2);
        assert_eq!(resumen.total_gastos, dec("1000"));
        assert_eq!(resumen.saldo, dec("3500"));
        assert!(resumen.saldo_consistente);
        assert_eq!(resumen.ultimo_gasto.as_deref(), Some("Gaseosas"));
    }

    #[test]
    fn pocket_summary_ignores_movements_of_other_pockets() {
        let b = bolsillo("100");
        let otro = bolsillo("0");
        let aportes = vec![aporte(&b, Uuid::new_v4(), "100"), aporte(&otro, Uuid::new_v4(), "900")];
        let gastos = vec![gasto(&otro, "Otro", "50", 1)];

        let resumen = ResumenBolsillo::calcular(&b, &aportes, &gastos);

        assert_eq!(resumen.total_aportes, dec("100"));
        assert_eq!(resumen.total_gastos, Decimal::ZERO);
        assert_eq!(resumen.ultimo_gasto, None);
    }

    #[test]
    fn pocket_summary_flags_drifted_balance() {
        let b = bolsillo("999");
        let aportes = vec![aporte(&b, Uuid::new_v4(), "100")];

        let resumen = ResumenBolsillo::calcular(&b, &aportes, &[]);

        assert_eq!(resumen.saldo, dec("100"));
        assert!(!resumen.saldo_consistente);
    }

    #[test]
    fn overspending_gives_negative_balance() {
        let b = bolsillo("0");
        let aportes = vec![aporte(&b, Uuid::new_v4(), "100")];
        let gastos = vec![gasto(&b, "Carne", "250", 1)];
        assert_eq!(saldo(&aportes, &gastos), dec("-150"));
    }

    #[test]
    fn budget_summary_progress() {
        let p = presupuesto();
        let items = vec![item(&p, "60000"), item(&p, "40000")];

        let b = bolsillo("20000");
        let aportes = vec![aporte(&b, Uuid::new_v4(), "25000")];
        let gastos = vec![gasto(&b, "Carne", "5000", 1)];
        let bolsillos = vec![ResumenBolsillo::calcular(&b, &aportes, &gastos)];

        let resumen = ResumenPresupuesto::calcular(&p, &items, bolsillos);

        assert_eq!(resumen.cant_items, 2);
        assert_eq!(resumen.total_planificado, dec("100000"));
        assert_eq!(resumen.total_recaudado, dec("25000"));
        assert_eq!(resumen.total_gastado, dec("5000"));
        assert_eq!(resumen.disponible, dec("20000"));
        assert_eq!(resumen.pendiente_por_recaudar, dec("75000"));
        assert_eq!(resumen.porcentaje_recaudado, dec("25"));
    }

    #[test]
    fn budget_summary_without_items() {
        let p = presupuesto();
        let resumen = ResumenPresupuesto::calcular(&p, &[], vec![]);

        assert_eq!(resumen.total_planificado, Decimal::ZERO);
        assert_eq!(resumen.porcentaje_recaudado, Decimal::ZERO);
        assert_eq!(resumen.pendiente_por_recaudar, Decimal::ZERO);
    }

    #[test]
    fn over_collected_budget_has_nothing_pending() {
        let p = presupuesto();
        let items = vec![item(&p, "300")];
        let b = bolsillo("400");
        let bolsillos = vec![ResumenBolsillo::calcular(&b, &[aporte(&b, Uuid::new_v4(), "400")], &[])];

        let resumen = ResumenPresupuesto::calcular(&p, &items, bolsillos);

        assert_eq!(resumen.pendiente_por_recaudar, Decimal::ZERO);
        assert_eq!(resumen.porcentaje_recaudado, dec("133.33"));
    }
}
