// src/services/gasto_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BolsilloRepository, GastoRepository},
    models::gasto::{Gasto, GastoFilter},
    services::{
        access::{self, AccessPolicy},
        ledger,
    },
};

#[derive(Clone)]
pub struct GastoService {
    gasto_repo: GastoRepository,
    bolsillo_repo: BolsilloRepository,
    access: AccessPolicy,
    pool: PgPool,
}

impl GastoService {
    pub fn new(
        gasto_repo: GastoRepository,
        bolsillo_repo: BolsilloRepository,
        access: AccessPolicy,
        pool: PgPool,
    ) -> Self {
        Self { gasto_repo, bolsillo_repo, access, pool }
    }

    /// Paga un gasto desde un bolsillo y recalcula su saldo.
    pub async fn create(
        &self,
        caller: Uuid,
        id_bolsillo: Uuid,
        nombre: &str,
        monto: Decimal,
    ) -> Result<Gasto, AppError> {
        let monto = ledger::normalize_amount(monto)?;

        let bolsillo = self
            .bolsillo_repo
            .find_by_id(id_bolsillo)
            .await?
            .ok_or(AppError::BolsilloNotFound)?;
        self.access.require_member(bolsillo.id_encuentro, caller).await?;

        let mut tx = self.pool.begin().await?;

        self.bolsillo_repo
            .lock(&mut *tx, id_bolsillo)
            .await?
            .ok_or(AppError::BolsilloNotFound)?;

        let gasto = self
            .gasto_repo
            .create(&mut *tx, id_bolsillo, bolsillo.id_encuentro, caller, nombre.trim(), monto)
            .await?;

        let actualizado = self.bolsillo_repo.refresh_saldo(&mut *tx, id_bolsillo).await?;
        tx.commit().await?;

        tracing::info!(
            gasto_id = %gasto.id,
            bolsillo_id = %id_bolsillo,
            saldo = %actualizado.saldo_actual,
            "Gasto registrado"
        );
        Ok(gasto)
    }

    pub async fn list(&self, filter: &GastoFilter) -> Result<Vec<Gasto>, AppError> {
        self.gasto_repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Gasto, AppError> {
        self.gasto_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::GastoNotFound)
    }

    pub async fn delete(&self, caller: Uuid, id: Uuid) -> Result<(), AppError> {
        let gasto = self.get(id).await?;
        let encuentro = self.access.encuentro(gasto.id_encuentro).await?;
        access::ensure_author_or_creator(&encuentro, gasto.id_usuario, caller)?;

        let mut tx = self.pool.begin().await?;

        self.bolsillo_repo.lock(&mut *tx, gasto.id_bolsillo).await?;
        if !self.gasto_repo.delete(&mut *tx, id).await? {
            return Err(AppError::GastoNotFound);
        }
        self.bolsillo_repo.refresh_saldo(&mut *tx, gasto.id_bolsillo).await?;

        tx.commit().await?;

        tracing::info!(gasto_id = %id, bolsillo_id = %gasto.id_bolsillo, "Gasto eliminado");
        Ok(())
    }
}
