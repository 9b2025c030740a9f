// src/services/bolsillo_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AporteRepository, BolsilloRepository, GastoRepository, PresupuestoRepository},
    models::bolsillo::{Bolsillo, BolsilloFilter, UpdateBolsilloPayload},
    services::{access::AccessPolicy, ledger::ResumenBolsillo},
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct BolsilloService {
    bolsillo_repo: BolsilloRepository,
    presupuesto_repo: PresupuestoRepository,
    aporte_repo: AporteRepository,
    gasto_repo: GastoRepository,
    access: AccessPolicy,
    pool: PgPool,
}

impl BolsilloService {
    pub fn new(
        bolsillo_repo: BolsilloRepository,
        presupuesto_repo: PresupuestoRepository,
        aporte_repo: AporteRepository,
        gasto_repo: GastoRepository,
        access: AccessPolicy,
        pool: PgPool,
    ) -> Self {
        Self { bolsillo_repo, presupuesto_repo, aporte_repo, gasto_repo, access, pool }
    }

    /// El bolsillo nace con saldo 0.
    pub async fn create(
        &self,
        caller: Uuid,
        id_encuentro: Uuid,
        id_presupuesto: Option<Uuid>,
        nombre: &str,
    ) -> Result<Bolsillo, AppError> {
        self.access.require_creator(id_encuentro, caller).await?;
        if let Some(id_presupuesto) = id_presupuesto {
            self.ensure_presupuesto_del_encuentro(id_presupuesto, id_encuentro).await?;
        }

        let bolsillo = self
            .bolsillo_repo
            .create(id_encuentro, id_presupuesto, nombre.trim())
            .await?;

        tracing::info!(bolsillo_id = %bolsillo.id, encuentro_id = %id_encuentro, "Bolsillo creado");
        Ok(bolsillo)
    }

    pub async fn list(&self, filter: &BolsilloFilter) -> Result<Vec<Bolsillo>, AppError> {
        self.bolsillo_repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Bolsillo, AppError> {
        self.bolsillo_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::BolsilloNotFound)
    }

    pub async fn update(
        &self,
        caller: Uuid,
        id: Uuid,
        changes: &UpdateBolsilloPayload,
    ) -> Result<Bolsillo, AppError> {
        let bolsillo = self.get(id).await?;
        self.access.require_creator(bolsillo.id_encuentro, caller).await?;

        if let Some(Some(id_presupuesto)) = changes.id_presupuesto {
            self.ensure_presupuesto_del_encuentro(id_presupuesto, bolsillo.id_encuentro)
                .await?;
        }

        self.bolsillo_repo
            .update(id, changes)
            .await?
            .ok_or(AppError::BolsilloNotFound)
    }

    pub async fn delete(&self, caller: Uuid, id: Uuid) -> Result<(), AppError> {
        let bolsillo = self.get(id).await?;
        self.access.require_creator(bolsillo.id_encuentro, caller).await?;

        if !self.bolsillo_repo.delete(id).await? {
            return Err(AppError::BolsilloNotFound);
        }

        tracing::info!(bolsillo_id = %id, "Bolsillo eliminado");
        Ok(())
    }

    pub async fn resumen(&self, id: Uuid) -> Result<ResumenBolsillo, AppError> {
        let bolsillo = self.get(id).await?;
        self.resumen_de(&bolsillo).await
    }

    pub async fn resumen_de(&self, bolsillo: &Bolsillo) -> Result<ResumenBolsillo, AppError> {
        let aportes = self.aporte_repo.list_by_bolsillo(bolsillo.id).await?;
        let gastos = self.gasto_repo.list_by_bolsillo(bolsillo.id).await?;

        let resumen = ResumenBolsillo::calcular(bolsillo, &aportes, &gastos);
        if !resumen.saldo_consistente {
            tracing::warn!(
                bolsillo_id = %bolsillo.id,
                saldo_actual = %bolsillo.saldo_actual,
                saldo = %resumen.saldo,
                "Saldo almacenado distinto del calculado"
            );
        }
        Ok(resumen)
    }

    async fn ensure_presupuesto_del_encuentro(
        &self,
        id_presupuesto: Uuid,
        id_encuentro: Uuid,
    ) -> Result<(), AppError> {
        let presupuesto = self
            .presupuesto_repo
            .find_by_id(&self.pool, id_presupuesto)
            .await?
            .ok_or(AppError::PresupuestoNotFound)?;

        if presupuesto.id_encuentro != id_encuentro {
            return Err(AppError::EncuentroMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, dec};

    #[sqlx::test(migrations = "./migrations")]
    async fn pocket_can_be_linked_and_detached_from_the_budget(pool: PgPool) {
        let state = test_support::state(pool);
        let ana = test_support::usuario(&state, "Ana").await;
        let id_encuentro = test_support::encuentro(&state, ana).await;
        let presupuesto = state
            .presupuesto_service
            .create(ana, id_encuentro, None)
            .await
            .unwrap();
        let id_bolsillo = test_support::bolsillo(&state, ana, id_encuentro).await;

        let vincular = UpdateBolsilloPayload {
            id_presupuesto: Some(Some(presupuesto.id)),
            ..Default::default()
        };
        let bolsillo = state.bolsillo_service.update(ana, id_bolsillo, &vincular).await.unwrap();
        assert_eq!(bolsillo.id_presupuesto, Some(presupuesto.id));

        // solo cambia el nombre: el vínculo se mantiene
        let renombrar = UpdateBolsilloPayload {
            nombre: Some(" Hielo ".into()),
            ..Default::default()
        };
        let bolsillo = state.bolsillo_service.update(ana, id_bolsillo, &renombrar).await.unwrap();
        assert_eq!(bolsillo.nombre, "Hielo");
        assert_eq!(bolsillo.id_presupuesto, Some(presupuesto.id));

        let desvincular = UpdateBolsilloPayload {
            id_presupuesto: Some(None),
            ..Default::default()
        };
        let bolsillo = state.bolsillo_service.update(ana, id_bolsillo, &desvincular).await.unwrap();
        assert_eq!(bolsillo.id_presupuesto, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_a_pocket_keeps_its_contributions(pool: PgPool) {
        let state = test_support::state(pool);
        let ana = test_support::usuario(&state, "Ana").await;
        let id_encuentro = test_support::encuentro(&state, ana).await;
        let id_bolsillo = test_support::bolsillo(&state, ana, id_encuentro).await;

        let aporte = state
            .aporte_service
            .create(ana, id_encuentro, Some(id_bolsillo), dec("250"))
            .await
            .unwrap();
        let gasto = state
            .gasto_service
            .create(ana, id_bolsillo, "Hielo", dec("100"))
            .await
            .unwrap();

        state.bolsillo_service.delete(ana, id_bolsillo).await.unwrap();

        let aporte = state.aporte_service.get(aporte.id).await.unwrap();
        assert_eq!(aporte.id_bolsillo, None);
        assert_eq!(aporte.id_encuentro, id_encuentro);
        assert!(matches!(
            state.gasto_service.get(gasto.id).await,
            Err(AppError::GastoNotFound)
        ));
    }
}
