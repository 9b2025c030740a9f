// src/db/encuentro_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::encuentro::{Encuentro, EncuentroResumen, UpdateEncuentroPayload},
};

const ENCUENTRO_COLUMNS: &str = "id, id_creador, titulo, descripcion, lugar, fecha, fecha_creacion";

#[derive(Clone)]
pub struct EncuentroRepository {
    pool: PgPool,
}

impl EncuentroRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        id_creador: Uuid,
        titulo: &str,
        descripcion: &str,
        lugar: &str,
        fecha: DateTime<Utc>,
    ) -> Result<Encuentro, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let encuentro = sqlx::query_as::<_, Encuentro>(&format!(
            r#"
            INSERT INTO encuentros (id_creador, titulo, descripcion, lugar, fecha)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ENCUENTRO_COLUMNS}
            "#
        ))
        .bind(id_creador)
        .bind(titulo)
        .bind(descripcion)
        .bind(lugar)
        .bind(fecha)
        .fetch_one(executor)
        .await?;
        Ok(encuentro)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Encuentro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let encuentro = sqlx::query_as::<_, Encuentro>(&format!(
            "SELECT {ENCUENTRO_COLUMNS} FROM encuentros WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(encuentro)
    }

    pub async fn list_all(&self) -> Result<Vec<Encuentro>, AppError> {
        let encuentros = sqlx::query_as::<_, Encuentro>(&format!(
            "SELECT {ENCUENTRO_COLUMNS} FROM encuentros ORDER BY fecha DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(encuentros)
    }

    /// Encuentros creados por el usuario o en los que participa (sin duplicados).
    pub async fn list_for_user(&self, id_usuario: Uuid) -> Result<Vec<Encuentro>, AppError> {
        let encuentros = sqlx::query_as::<_, Encuentro>(&format!(
            r#"
            SELECT {ENCUENTRO_COLUMNS}
            FROM encuentros
            WHERE id_creador = $1
               OR id IN (SELECT id_encuentro FROM participantes_encuentro WHERE id_usuario = $1)
            ORDER BY fecha DESC
            "#
        ))
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;
        Ok(encuentros)
    }

    pub async fn list_resumen(
        &self,
        id_usuario: Option<Uuid>,
    ) -> Result<Vec<EncuentroResumen>, AppError> {
        let resumen = sqlx::query_as::<_, EncuentroResumen>(
            r#"
            SELECT
                id, id_creador, titulo, descripcion, lugar, fecha, fecha_creacion,
                id_presupuesto, presupuesto_total, cant_participantes, total_aportes
            FROM v_encuentro_resumen
            WHERE $1::uuid IS NULL
               OR id_creador = $1
               OR id IN (SELECT id_encuentro FROM participantes_encuentro WHERE id_usuario = $1)
            ORDER BY fecha DESC
            "#,
        )
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;
        Ok(resumen)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: &UpdateEncuentroPayload,
    ) -> Result<Option<Encuentro>, AppError> {
        let encuentro = sqlx::query_as::<_, Encuentro>(&format!(
            r#"
            UPDATE encuentros SET
                titulo = COALESCE($2, titulo),
                descripcion = COALESCE($3, descripcion),
                lugar = COALESCE($4, lugar),
                fecha = COALESCE($5, fecha)
            WHERE id = $1
            RETURNING {ENCUENTRO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.titulo.as_deref())
        .bind(changes.descripcion.as_deref())
        .bind(changes.lugar.as_deref())
        .bind(changes.fecha)
        .fetch_optional(&self.pool)
        .await?;
        Ok(encuentro)
    }

    // Las FK en cascada se llevan participantes, presupuesto, bolsillos, aportes y gastos
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM encuentros WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
