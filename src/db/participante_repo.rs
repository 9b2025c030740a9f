// src/db/participante_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::participante::{Participante, ParticipanteAportes, ParticipanteDetalle},
};

const PARTICIPANTE_COLUMNS: &str = "id, id_encuentro, id_usuario, rol, fecha_union";

#[derive(Clone)]
pub struct ParticipanteRepository {
    pool: PgPool,
}

impl ParticipanteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        id_encuentro: Uuid,
        id_usuario: Uuid,
        rol: &str,
    ) -> Result<Participante, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Participante>(&format!(
            r#"
            INSERT INTO participantes_encuentro (id_encuentro, id_usuario, rol)
            VALUES ($1, $2, $3)
            RETURNING {PARTICIPANTE_COLUMNS}
            "#
        ))
        .bind(id_encuentro)
        .bind(id_usuario)
        .bind(rol)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_db)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Participante>, AppError> {
        let participante = sqlx::query_as::<_, Participante>(&format!(
            "SELECT {PARTICIPANTE_COLUMNS} FROM participantes_encuentro WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(participante)
    }

    pub async fn find_membership(
        &self,
        id_encuentro: Uuid,
        id_usuario: Uuid,
    ) -> Result<Option<Participante>, AppError> {
        let participante = sqlx::query_as::<_, Participante>(&format!(
            r#"
            SELECT {PARTICIPANTE_COLUMNS}
            FROM participantes_encuentro
            WHERE id_encuentro = $1 AND id_usuario = $2
            "#
        ))
        .bind(id_encuentro)
        .bind(id_usuario)
        .fetch_optional(&self.pool)
        .await?;
        Ok(participante)
    }

    /// Miembro = creador del encuentro o fila en participantes_encuentro.
    pub async fn is_member<'e, E>(
        &self,
        executor: E,
        id_encuentro: Uuid,
        id_usuario: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let is_member: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM encuentros WHERE id = $1 AND id_creador = $2
                UNION ALL
                SELECT 1 FROM participantes_encuentro WHERE id_encuentro = $1 AND id_usuario = $2
            )
            "#,
        )
        .bind(id_encuentro)
        .bind(id_usuario)
        .fetch_one(executor)
        .await?;
        Ok(is_member)
    }

    pub async fn list_by_encuentro(&self, id_encuentro: Uuid) -> Result<Vec<Participante>, AppError> {
        let participantes = sqlx::query_as::<_, Participante>(&format!(
            r#"
            SELECT {PARTICIPANTE_COLUMNS} FROM participantes_encuentro
            WHERE id_encuentro = $1
            ORDER BY fecha_union ASC
            "#
        ))
        .bind(id_encuentro)
        .fetch_all(&self.pool)
        .await?;
        Ok(participantes)
    }

    pub async fn list_by_usuario(&self, id_usuario: Uuid) -> Result<Vec<Participante>, AppError> {
        let participantes = sqlx::query_as::<_, Participante>(&format!(
            r#"
            SELECT {PARTICIPANTE_COLUMNS} FROM participantes_encuentro
            WHERE id_usuario = $1
            ORDER BY fecha_union DESC
            "#
        ))
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;
        Ok(participantes)
    }

    pub async fn list_all(&self) -> Result<Vec<Participante>, AppError> {
        let participantes = sqlx::query_as::<_, Participante>(&format!(
            "SELECT {PARTICIPANTE_COLUMNS} FROM participantes_encuentro ORDER BY fecha_union DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(participantes)
    }

    // Ambos filtros se combinan; None no filtra
    pub async fn list_detalle(
        &self,
        id_encuentro: Option<Uuid>,
        id_usuario: Option<Uuid>,
    ) -> Result<Vec<ParticipanteDetalle>, AppError> {
        let filas = sqlx::query_as::<_, ParticipanteDetalle>(
            r#"
            SELECT id_encuentro, titulo_encuentro, fecha, id_usuario, nombre_completo, rol
            FROM v_participantes_encuentro
            WHERE ($1::uuid IS NULL OR id_encuentro = $1)
              AND ($2::uuid IS NULL OR id_usuario = $2)
            ORDER BY fecha DESC, nombre_completo ASC
            "#,
        )
        .bind(id_encuentro)
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;
        Ok(filas)
    }

    pub async fn list_aportes(
        &self,
        id_encuentro: Option<Uuid>,
        id_usuario: Option<Uuid>,
    ) -> Result<Vec<ParticipanteAportes>, AppError> {
        let filas = sqlx::query_as::<_, ParticipanteAportes>(
            r#"
            SELECT id_encuentro, nombre_encuentro, id_usuario, nombre_usuario,
                   apellido_usuario, rol, total_aportes
            FROM v_participantes_aportes
            WHERE ($1::uuid IS NULL OR id_encuentro = $1)
              AND ($2::uuid IS NULL OR id_usuario = $2)
            ORDER BY total_aportes DESC, nombre_usuario ASC
            "#,
        )
        .bind(id_encuentro)
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;
        Ok(filas)
    }

    pub async fn update_rol(&self, id: Uuid, rol: &str) -> Result<Option<Participante>, AppError> {
        let participante = sqlx::query_as::<_, Participante>(&format!(
            r#"
            UPDATE participantes_encuentro SET rol = $2
            WHERE id = $1
            RETURNING {PARTICIPANTE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(rol)
        .fetch_optional(&self.pool)
        .await?;
        Ok(participante)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM participantes_encuentro WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
