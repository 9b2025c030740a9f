// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{User, UserProfile},
};

const USER_COLUMNS: &str =
    "id, nombre, apellido, email, password_hash, imagen_perfil, fecha_registro, updated_at";

// Todas las interacciones con la tabla `usuarios`
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, nombre, apellido, email, imagen_perfil FROM usuarios WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM usuarios WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    // El email duplicado se traduce por el nombre de la constraint
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        nombre: &str,
        apellido: Option<&str>,
        email: &str,
        password_hash: &str,
        imagen_perfil: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO usuarios (nombre, apellido, email, password_hash, imagen_perfil)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(nombre)
        .bind(apellido)
        .bind(email)
        .bind(password_hash)
        .bind(imagen_perfil)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_db)
    }

    // Campos en None se mantienen (COALESCE)
    pub async fn update_profile(
        &self,
        id: Uuid,
        nombre: Option<&str>,
        apellido: Option<&str>,
        imagen_perfil: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE usuarios SET
                nombre = COALESCE($2, nombre),
                apellido = COALESCE($3, apellido),
                imagen_perfil = COALESCE($4, imagen_perfil),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(nombre)
        .bind(apellido)
        .bind(imagen_perfil)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE usuarios SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Búsqueda por nombre, apellido o email, sin el usuario que busca.
    pub async fn search(
        &self,
        term: &str,
        exclude: Uuid,
        limit: i64,
    ) -> Result<Vec<UserProfile>, AppError> {
        let pattern = format!("%{}%", escape_like(term));
        let users = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, nombre, apellido, email, imagen_perfil
            FROM usuarios
            WHERE id <> $2
              AND (nombre ILIKE $1 OR apellido ILIKE $1 OR email ILIKE $1)
            ORDER BY nombre ASC, apellido ASC NULLS LAST
            LIMIT $3
            "#,
        )
        .bind(pattern)
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

// '%' y '_' del usuario se buscan literalmente
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("ana"), "ana");
    }
}
