// src/db/aporte_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::aporte::{Aporte, AporteFilter},
};

const APORTE_COLUMNS: &str = "id, id_bolsillo, id_encuentro, id_usuario, monto, fecha_aporte";

#[derive(Clone)]
pub struct AporteRepository {
    pool: PgPool,
}

impl AporteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        id_bolsillo: Option<Uuid>,
        id_encuentro: Uuid,
        id_usuario: Uuid,
        monto: Decimal,
    ) -> Result<Aporte, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let aporte = sqlx::query_as::<_, Aporte>(&format!(
            r#"
            INSERT INTO aportes (id_bolsillo, id_encuentro, id_usuario, monto)
            VALUES ($1, $2, $3, $4)
            RETURNING {APORTE_COLUMNS}
            "#
        ))
        .bind(id_bolsillo)
        .bind(id_encuentro)
        .bind(id_usuario)
        .bind(monto)
        .fetch_one(executor)
        .await?;
        Ok(aporte)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Aporte>, AppError> {
        let aporte = sqlx::query_as::<_, Aporte>(&format!(
            "SELECT {APORTE_COLUMNS} FROM aportes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(aporte)
    }

    pub async fn list(&self, filter: &AporteFilter) -> Result<Vec<Aporte>, AppError> {
        let aportes = sqlx::query_as::<_, Aporte>(&format!(
            r#"
            SELECT {APORTE_COLUMNS} FROM aportes
            WHERE ($1::uuid IS NULL OR id_encuentro = $1)
              AND ($2::uuid IS NULL OR id_bolsillo = $2)
              AND ($3::uuid IS NULL OR id_usuario = $3)
            ORDER BY fecha_aporte DESC
            "#
        ))
        .bind(filter.encuentro)
        .bind(filter.bolsillo)
        .bind(filter.usuario)
        .fetch_all(&self.pool)
        .await?;
        Ok(aportes)
    }

    pub async fn list_by_bolsillo(&self, id_bolsillo: Uuid) -> Result<Vec<Aporte>, AppError> {
        let aportes = sqlx::query_as::<_, Aporte>(&format!(
            "SELECT {APORTE_COLUMNS} FROM aportes WHERE id_bolsillo = $1 ORDER BY fecha_aporte ASC"
        ))
        .bind(id_bolsillo)
        .fetch_all(&self.pool)
        .await?;
        Ok(aportes)
    }

    pub async fn update_monto<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        monto: Decimal,
    ) -> Result<Option<Aporte>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let aporte = sqlx::query_as::<_, Aporte>(&format!(
            "UPDATE aportes SET monto = $2 WHERE id = $1 RETURNING {APORTE_COLUMNS}"
        ))
        .bind(id)
        .bind(monto)
        .fetch_optional(executor)
        .await?;
        Ok(aporte)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM aportes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
