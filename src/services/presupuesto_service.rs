// src/services/presupuesto_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BolsilloRepository, PresupuestoRepository},
    models::{
        bolsillo::BolsilloFilter,
        presupuesto::{ItemPresupuesto, Presupuesto, PresupuestoDetalle, NOMBRE_PRESUPUESTO_DEFAULT},
    },
    services::{
        access::AccessPolicy,
        bolsillo_service::BolsilloService,
        ledger::{self, ResumenPresupuesto},
    },
};

#[derive(Clone)]
pub struct PresupuestoService {
    presupuesto_repo: PresupuestoRepository,
    bolsillo_repo: BolsilloRepository,
    bolsillo_service: BolsilloService,
    access: AccessPolicy,
    pool: PgPool,
}

impl PresupuestoService {
    pub fn new(
        presupuesto_repo: PresupuestoRepository,
        bolsillo_repo: BolsilloRepository,
        bolsillo_service: BolsilloService,
        access: AccessPolicy,
        pool: PgPool,
    ) -> Self {
        Self { presupuesto_repo, bolsillo_repo, bolsillo_service, access, pool }
    }

    // Un presupuesto por encuentro (constraint única -> 409)
    pub async fn create(
        &self,
        caller: Uuid,
        id_encuentro: Uuid,
        nombre: Option<&str>,
    ) -> Result<Presupuesto, AppError> {
        self.access.require_creator(id_encuentro, caller).await?;

        let nombre = nombre
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(NOMBRE_PRESUPUESTO_DEFAULT);
        let presupuesto = self.presupuesto_repo.create(id_encuentro, nombre).await?;

        tracing::info!(presupuesto_id = %presupuesto.id, encuentro_id = %id_encuentro, "Presupuesto creado");
        Ok(presupuesto)
    }

    pub async fn get(&self, id: Uuid) -> Result<Presupuesto, AppError> {
        self.presupuesto_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::PresupuestoNotFound)
    }

    pub async fn detalle(&self, id: Uuid) -> Result<PresupuestoDetalle, AppError> {
        let presupuesto = self.get(id).await?;
        self.con_items(presupuesto).await
    }

    pub async fn detalle_de_encuentro(&self, id_encuentro: Uuid) -> Result<PresupuestoDetalle, AppError> {
        let presupuesto = self
            .presupuesto_repo
            .find_by_encuentro(id_encuentro)
            .await?
            .ok_or(AppError::PresupuestoNotFound)?;
        self.con_items(presupuesto).await
    }

    pub async fn list_for_user(&self, id_usuario: Uuid) -> Result<Vec<Presupuesto>, AppError> {
        self.presupuesto_repo.list_for_user(id_usuario).await
    }

    pub async fn rename(&self, caller: Uuid, id: Uuid, nombre: &str) -> Result<Presupuesto, AppError> {
        let presupuesto = self.get(id).await?;
        self.access.require_creator(presupuesto.id_encuentro, caller).await?;

        self.presupuesto_repo
            .update_nombre(id, nombre.trim())
            .await?
            .ok_or(AppError::PresupuestoNotFound)
    }

    // Items en cascada; los bolsillos quedan sin presupuesto
    pub async fn delete(&self, caller: Uuid, id: Uuid) -> Result<(), AppError> {
        let presupuesto = self.get(id).await?;
        self.access.require_creator(presupuesto.id_encuentro, caller).await?;

        if !self.presupuesto_repo.delete(id).await? {
            return Err(AppError::PresupuestoNotFound);
        }

        tracing::info!(presupuesto_id = %id, "Presupuesto eliminado");
        Ok(())
    }

    /// Agrega un item y recalcula el total con el presupuesto bloqueado.
    pub async fn add_item(
        &self,
        caller: Uuid,
        id_presupuesto: Uuid,
        id_encuentro: Uuid,
        nombre_item: &str,
        monto_item: Decimal,
    ) -> Result<ItemPresupuesto, AppError> {
        let monto_item = ledger::normalize_amount(monto_item)?;

        let presupuesto = self.get(id_presupuesto).await?;
        if presupuesto.id_encuentro != id_encuentro {
            return Err(AppError::EncuentroMismatch);
        }
        self.access.require_creator(id_encuentro, caller).await?;

        let mut tx = self.pool.begin().await?;

        self.presupuesto_repo
            .lock(&mut *tx, id_presupuesto)
            .await?
            .ok_or(AppError::PresupuestoNotFound)?;

        let item = self
            .presupuesto_repo
            .insert_item(&mut *tx, id_presupuesto, id_encuentro, nombre_item.trim(), monto_item)
            .await?;

        let actualizado = self.presupuesto_repo.refresh_total(&mut *tx, id_presupuesto).await?;

        tx.commit().await?;

        tracing::info!(
            presupuesto_id = %id_presupuesto,
            item_id = %item.id,
            total = %actualizado.presupuesto_total,
            "Item agregado al presupuesto"
        );
        Ok(item)
    }

    pub async fn list_items(&self, id_presupuesto: Uuid) -> Result<Vec<ItemPresupuesto>, AppError> {
        self.get(id_presupuesto).await?;
        self.presupuesto_repo.list_items(id_presupuesto).await
    }

    pub async fn delete_item(&self, caller: Uuid, id_item: Uuid) -> Result<(), AppError> {
        let item = self
            .presupuesto_repo
            .find_item(id_item)
            .await?
            .ok_or(AppError::ItemNotFound)?;
        self.access.require_creator(item.id_encuentro, caller).await?;

        let mut tx = self.pool.begin().await?;

        self.presupuesto_repo
            .lock(&mut *tx, item.id_presupuesto)
            .await?
            .ok_or(AppError::PresupuestoNotFound)?;

        if !self.presupuesto_repo.delete_item(&mut *tx, id_item).await? {
            return Err(AppError::ItemNotFound);
        }

        self.presupuesto_repo.refresh_total(&mut *tx, item.id_presupuesto).await?;

        tx.commit().await?;

        tracing::info!(presupuesto_id = %item.id_presupuesto, item_id = %id_item, "Item eliminado");
        Ok(())
    }

    pub async fn resumen(&self, id: Uuid) -> Result<ResumenPresupuesto, AppError> {
        let presupuesto = self.get(id).await?;
        let items = self.presupuesto_repo.list_items(id).await?;

        let filter = BolsilloFilter { encuentro: None, presupuesto: Some(id) };
        let mut bolsillos = Vec::new();
        for bolsillo in self.bolsillo_repo.list(&filter).await? {
            bolsillos.push(self.bolsillo_service.resumen_de(&bolsillo).await?);
        }

        Ok(ResumenPresupuesto::calcular(&presupuesto, &items, bolsillos))
    }

    async fn con_items(&self, presupuesto: Presupuesto) -> Result<PresupuestoDetalle, AppError> {
        let items = self.presupuesto_repo.list_items(presupuesto.id).await?;
        Ok(PresupuestoDetalle { presupuesto, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, dec};

    #[sqlx::test(migrations = "./migrations")]
    async fn items_keep_the_budget_total(pool: PgPool) {
        let state = test_support::state(pool);
        let ana = test_support::usuario(&state, "Ana").await;
        let id_encuentro = test_support::encuentro(&state, ana).await;
        let presupuesto = state
            .presupuesto_service
            .create(ana, id_encuentro, Some("   "))
            .await
            .unwrap();
        assert_eq!(presupuesto.nombre, NOMBRE_PRESUPUESTO_DEFAULT);
        assert_eq!(presupuesto.presupuesto_total, Decimal::ZERO);

        let carne = state
            .presupuesto_service
            .add_item(ana, presupuesto.id, id_encuentro, "Carne", dec("60000"))
            .await
            .unwrap();
        state
            .presupuesto_service
            .add_item(ana, presupuesto.id, id_encuentro, "Bebidas", dec("15000.50"))
            .await
            .unwrap();
        let total = state.presupuesto_service.get(presupuesto.id).await.unwrap().presupuesto_total;
        assert_eq!(total, dec("75000.50"));

        let items = state.presupuesto_service.list_items(presupuesto.id).await.unwrap();
        let nombres: Vec<&str> = items.iter().map(|i| i.nombre_item.as_str()).collect();
        assert_eq!(nombres, ["Carne", "Bebidas"]);

        state.presupuesto_service.delete_item(ana, carne.id).await.unwrap();
        let total = state.presupuesto_service.get(presupuesto.id).await.unwrap().presupuesto_total;
        assert_eq!(total, dec("15000.50"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn items_require_the_creator_and_the_right_encuentro(pool: PgPool) {
        let state = test_support::state(pool);
        let ana = test_support::usuario(&state, "Ana").await;
        let luis = test_support::usuario(&state, "Luis").await;
        let id_encuentro = test_support::encuentro(&state, ana).await;
        let otro_encuentro = test_support::encuentro(&state, ana).await;
        let presupuesto = state
            .presupuesto_service
            .create(ana, id_encuentro, None)
            .await
            .unwrap();

        let err = state
            .presupuesto_service
            .add_item(ana, presupuesto.id, otro_encuentro, "Carne", dec("100"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EncuentroMismatch));

        test_support::invitar(&state, ana, id_encuentro, luis).await;
        let err = state
            .presupuesto_service
            .add_item(luis, presupuesto.id, id_encuentro, "Carne", dec("100"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CreatorOnly));

        let err = state
            .presupuesto_service
            .create(ana, id_encuentro, Some("Otro"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PresupuestoAlreadyExists));

        let total = state.presupuesto_service.get(presupuesto.id).await.unwrap().presupuesto_total;
        assert_eq!(total, Decimal::ZERO);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn summary_reads_pockets_of_the_budget(pool: PgPool) {
        let state = test_support::state(pool);
        let ana = test_support::usuario(&state, "Ana").await;
        let id_encuentro = test_support::encuentro(&state, ana).await;
        let presupuesto = state
            .presupuesto_service
            .create(ana, id_encuentro, None)
            .await
            .unwrap();
        state
            .presupuesto_service
            .add_item(ana, presupuesto.id, id_encuentro, "Carne", dec("1000"))
            .await
            .unwrap();
        let bolsillo = state
            .bolsillo_service
            .create(ana, id_encuentro, Some(presupuesto.id), "Compras")
            .await
            .unwrap();
        state
            .aporte_service
            .create(ana, id_encuentro, Some(bolsillo.id), dec("400"))
            .await
            .unwrap();
        state
            .gasto_service
            .create(ana, bolsillo.id, "Carnicería", dec("150"))
            .await
            .unwrap();

        let resumen = state.presupuesto_service.resumen(presupuesto.id).await.unwrap();
        assert_eq!(resumen.total_planificado, dec("1000"));
        assert_eq!(resumen.total_recaudado, dec("400"));
        assert_eq!(resumen.total_gastado, dec("150"));
        assert_eq!(resumen.disponible, dec("250"));
        assert_eq!(resumen.pendiente_por_recaudar, dec("600"));
        assert_eq!(resumen.porcentaje_recaudado, dec("40"));
        assert_eq!(resumen.bolsillos.len(), 1);
        assert!(resumen.bolsillos[0].saldo_consistente);
    }
}
