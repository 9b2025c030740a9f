// src/db/gasto_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::gasto::{Gasto, GastoFilter},
};

const GASTO_COLUMNS: &str = "id, id_bolsillo, id_encuentro, id_usuario, nombre, monto, fecha_gasto";

#[derive(Clone)]
pub struct GastoRepository {
    pool: PgPool,
}

impl GastoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        id_bolsillo: Uuid,
        id_encuentro: Uuid,
        id_usuario: Uuid,
        nombre: &str,
        monto: Decimal,
    ) -> Result<Gasto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gasto = sqlx::query_as::<_, Gasto>(&format!(
            r#"
            INSERT INTO gastos (id_bolsillo, id_encuentro, id_usuario, nombre, monto)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {GASTO_COLUMNS}
            "#
        ))
        .bind(id_bolsillo)
        .bind(id_encuentro)
        .bind(id_usuario)
        .bind(nombre)
        .bind(monto)
        .fetch_one(executor)
        .await?;
        Ok(gasto)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Gasto>, AppError> {
        let gasto = sqlx::query_as::<_, Gasto>(&format!(
            "SELECT {GASTO_COLUMNS} FROM gastos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(gasto)
    }

    pub async fn list(&self, filter: &GastoFilter) -> Result<Vec<Gasto>, AppError> {
        let gastos = sqlx::query_as::<_, Gasto>(&format!(
            r#"
            SELECT {GASTO_COLUMNS} FROM gastos
            WHERE ($1::uuid IS NULL OR id_bolsillo = $1)
              AND ($2::uuid IS NULL OR id_encuentro = $2)
            ORDER BY fecha_gasto DESC
            "#
        ))
        .bind(filter.bolsillo)
        .bind(filter.encuentro)
        .fetch_all(&self.pool)
        .await?;
        Ok(gastos)
    }

    pub async fn list_by_bolsillo(&self, id_bolsillo: Uuid) -> Result<Vec<Gasto>, AppError> {
        let gastos = sqlx::query_as::<_, Gasto>(&format!(
            "SELECT {GASTO_COLUMNS} FROM gastos WHERE id_bolsillo = $1 ORDER BY fecha_gasto ASC"
        ))
        .bind(id_bolsillo)
        .fetch_all(&self.pool)
        .await?;
        Ok(gastos)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM gastos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
