// src/db/bolsillo_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::bolsillo::{Bolsillo, BolsilloFilter, UpdateBolsilloPayload},
};

const BOLSILLO_COLUMNS: &str =
    "id, id_encuentro, id_presupuesto, nombre, saldo_actual, fecha_creacion";

#[derive(Clone)]
pub struct BolsilloRepository {
    pool: PgPool,
}

impl BolsilloRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // El saldo arranca en 0; solo refresh_saldo lo modifica
    pub async fn create(
        &self,
        id_encuentro: Uuid,
        id_presupuesto: Option<Uuid>,
        nombre: &str,
    ) -> Result<Bolsillo, AppError> {
        sqlx::query_as::<_, Bolsillo>(&format!(
            r#"
            INSERT INTO bolsillos (id_encuentro, id_presupuesto, nombre)
            VALUES ($1, $2, $3)
            RETURNING {BOLSILLO_COLUMNS}
            "#
        ))
        .bind(id_encuentro)
        .bind(id_presupuesto)
        .bind(nombre)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_db)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Bolsillo>, AppError> {
        let bolsillo = sqlx::query_as::<_, Bolsillo>(&format!(
            "SELECT {BOLSILLO_COLUMNS} FROM bolsillos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bolsillo)
    }

    /// Serializa los movimientos concurrentes sobre el mismo bolsillo.
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Bolsillo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bolsillo = sqlx::query_as::<_, Bolsillo>(&format!(
            "SELECT {BOLSILLO_COLUMNS} FROM bolsillos WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(bolsillo)
    }

    pub async fn list(&self, filter: &BolsilloFilter) -> Result<Vec<Bolsillo>, AppError> {
        let bolsillos = sqlx::query_as::<_, Bolsillo>(&format!(
            r#"
            SELECT {BOLSILLO_COLUMNS} FROM bolsillos
            WHERE ($1::uuid IS NULL OR id_encuentro = $1)
              AND ($2::uuid IS NULL OR id_presupuesto = $2)
            ORDER BY fecha_creacion ASC
            "#
        ))
        .bind(filter.encuentro)
        .bind(filter.presupuesto)
        .fetch_all(&self.pool)
        .await?;
        Ok(bolsillos)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: &UpdateBolsilloPayload,
    ) -> Result<Option<Bolsillo>, AppError> {
        let bolsillo = sqlx::query_as::<_, Bolsillo>(&format!(
            r#"
            UPDATE bolsillos SET
                nombre = COALESCE($2, nombre),
                id_presupuesto = CASE WHEN $4 THEN $3 ELSE id_presupuesto END
            WHERE id = $1
            RETURNING {BOLSILLO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.nombre.as_deref().map(str::trim))
        .bind(changes.id_presupuesto.flatten())
        .bind(changes.id_presupuesto.is_some())
        .fetch_optional(&self.pool)
        .await?;
        Ok(bolsillo)
    }

    // Los gastos caen en cascada; los aportes quedan sin bolsillo
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM bolsillos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// saldo_actual = Σ aportes - Σ gastos del bolsillo.
    pub async fn refresh_saldo<'e, E>(&self, executor: E, id: Uuid) -> Result<Bolsillo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bolsillo = sqlx::query_as::<_, Bolsillo>(&format!(
            r#"
            UPDATE bolsillos SET saldo_actual =
                (SELECT COALESCE(SUM(monto), 0) FROM aportes WHERE id_bolsillo = $1)
              - (SELECT COALESCE(SUM(monto), 0) FROM gastos WHERE id_bolsillo = $1)
            WHERE id = $1
            RETURNING {BOLSILLO_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(bolsillo)
    }
}
