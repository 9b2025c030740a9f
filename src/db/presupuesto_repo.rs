// src/db/presupuesto_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::presupuesto::{ItemPresupuesto, Presupuesto},
};

const PRESUPUESTO_COLUMNS: &str = "id, id_encuentro, nombre, presupuesto_total, fecha_creacion";
const ITEM_COLUMNS: &str = "id, id_presupuesto, id_encuentro, nombre_item, monto_item, fecha_creacion";

#[derive(Clone)]
pub struct PresupuestoRepository {
    pool: PgPool,
}

impl PresupuestoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PRESUPUESTOS
    // =========================================================================

    pub async fn create(&self, id_encuentro: Uuid, nombre: &str) -> Result<Presupuesto, AppError> {
        sqlx::query_as::<_, Presupuesto>(&format!(
            r#"
            INSERT INTO presupuestos (id_encuentro, nombre)
            VALUES ($1, $2)
            RETURNING {PRESUPUESTO_COLUMNS}
            "#
        ))
        .bind(id_encuentro)
        .bind(nombre)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_db)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Presupuesto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let presupuesto = sqlx::query_as::<_, Presupuesto>(&format!(
            "SELECT {PRESUPUESTO_COLUMNS} FROM presupuestos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(presupuesto)
    }

    /// Bloquea la fila hasta el fin de la transacción.
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Presupuesto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let presupuesto = sqlx::query_as::<_, Presupuesto>(&format!(
            "SELECT {PRESUPUESTO_COLUMNS} FROM presupuestos WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(presupuesto)
    }

    pub async fn find_by_encuentro(&self, id_encuentro: Uuid) -> Result<Option<Presupuesto>, AppError> {
        let presupuesto = sqlx::query_as::<_, Presupuesto>(&format!(
            "SELECT {PRESUPUESTO_COLUMNS} FROM presupuestos WHERE id_encuentro = $1"
        ))
        .bind(id_encuentro)
        .fetch_optional(&self.pool)
        .await?;
        Ok(presupuesto)
    }

    /// Presupuestos de los encuentros a los que pertenece el usuario.
    pub async fn list_for_user(&self, id_usuario: Uuid) -> Result<Vec<Presupuesto>, AppError> {
        let presupuestos = sqlx::query_as::<_, Presupuesto>(
            r#"
            SELECT p.id, p.id_encuentro, p.nombre, p.presupuesto_total, p.fecha_creacion
            FROM presupuestos p
            JOIN encuentros e ON e.id = p.id_encuentro
            WHERE e.id_creador = $1
               OR e.id IN (SELECT id_encuentro FROM participantes_encuentro WHERE id_usuario = $1)
            ORDER BY p.fecha_creacion DESC
            "#,
        )
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;
        Ok(presupuestos)
    }

    pub async fn update_nombre(&self, id: Uuid, nombre: &str) -> Result<Option<Presupuesto>, AppError> {
        let presupuesto = sqlx::query_as::<_, Presupuesto>(&format!(
            "UPDATE presupuestos SET nombre = $2 WHERE id = $1 RETURNING {PRESUPUESTO_COLUMNS}"
        ))
        .bind(id)
        .bind(nombre)
        .fetch_optional(&self.pool)
        .await?;
        Ok(presupuesto)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM presupuestos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// presupuesto_total = Σ items. Única escritura de esa columna.
    pub async fn refresh_total<'e, E>(&self, executor: E, id: Uuid) -> Result<Presupuesto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let presupuesto = sqlx::query_as::<_, Presupuesto>(&format!(
            r#"
            UPDATE presupuestos SET presupuesto_total = (
                SELECT COALESCE(SUM(monto_item), 0)
                FROM items_presupuesto
                WHERE id_presupuesto = $1
            )
            WHERE id = $1
            RETURNING {PRESUPUESTO_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(presupuesto)
    }

    // =========================================================================
    //  ITEMS
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        id_presupuesto: Uuid,
        id_encuentro: Uuid,
        nombre_item: &str,
        monto_item: Decimal,
    ) -> Result<ItemPresupuesto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ItemPresupuesto>(&format!(
            r#"
            INSERT INTO items_presupuesto (id_presupuesto, id_encuentro, nombre_item, monto_item)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id_presupuesto)
        .bind(id_encuentro)
        .bind(nombre_item)
        .bind(monto_item)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn find_item(&self, id: Uuid) -> Result<Option<ItemPresupuesto>, AppError> {
        let item = sqlx::query_as::<_, ItemPresupuesto>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items_presupuesto WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    // Orden de carga
    pub async fn list_items(&self, id_presupuesto: Uuid) -> Result<Vec<ItemPresupuesto>, AppError> {
        let items = sqlx::query_as::<_, ItemPresupuesto>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM items_presupuesto
            WHERE id_presupuesto = $1
            ORDER BY fecha_creacion ASC, id ASC
            "#
        ))
        .bind(id_presupuesto)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM items_presupuesto WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
