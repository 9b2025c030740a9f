// src/services/encuentro_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EncuentroRepository, ParticipanteRepository},
    models::{
        encuentro::{Encuentro, EncuentroResumen, UpdateEncuentroPayload},
        participante::ROL_ORGANIZADOR,
    },
    services::access::AccessPolicy,
};

#[derive(Clone)]
pub struct EncuentroService {
    encuentro_repo: EncuentroRepository,
    participante_repo: ParticipanteRepository,
    access: AccessPolicy,
    pool: PgPool,
}

impl EncuentroService {
    pub fn new(
        encuentro_repo: EncuentroRepository,
        participante_repo: ParticipanteRepository,
        access: AccessPolicy,
        pool: PgPool,
    ) -> Self {
        Self { encuentro_repo, participante_repo, access, pool }
    }

    /// Crea el encuentro y, en la misma transacción, suma al creador
    /// como participante con rol organizador.
    pub async fn create(
        &self,
        id_creador: Uuid,
        titulo: &str,
        descripcion: &str,
        lugar: &str,
        fecha: DateTime<Utc>,
    ) -> Result<Encuentro, AppError> {
        ensure_fecha_futura(fecha, Utc::now())?;

        let mut tx = self.pool.begin().await?;

        let encuentro = self
            .encuentro_repo
            .create(&mut *tx, id_creador, titulo.trim(), descripcion.trim(), lugar.trim(), fecha)
            .await?;

        self.participante_repo
            .create(&mut *tx, encuentro.id, id_creador, ROL_ORGANIZADOR)
            .await?;

        tx.commit().await?;

        tracing::info!(encuentro_id = %encuentro.id, creador = %id_creador, "Encuentro creado");
        Ok(encuentro)
    }

    pub async fn list(&self, id_usuario: Option<Uuid>) -> Result<Vec<Encuentro>, AppError> {
        match id_usuario {
            Some(id) => self.encuentro_repo.list_for_user(id).await,
            None => self.encuentro_repo.list_all().await,
        }
    }

    pub async fn list_resumen(&self, id_usuario: Option<Uuid>) -> Result<Vec<EncuentroResumen>, AppError> {
        self.encuentro_repo.list_resumen(id_usuario).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Encuentro, AppError> {
        self.access.encuentro(id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        caller: Uuid,
        changes: &UpdateEncuentroPayload,
    ) -> Result<Encuentro, AppError> {
        let encuentro = self.access.require_creator(id, caller).await?;

        if let Some(fecha) = changes.fecha {
            ensure_fecha_futura(fecha, Utc::now())?;
        }
        if changes.is_empty() {
            return Ok(encuentro);
        }

        self.encuentro_repo
            .update(id, changes)
            .await?
            .ok_or(AppError::EncuentroNotFound)
    }

    pub async fn delete(&self, id: Uuid, caller: Uuid) -> Result<(), AppError> {
        self.access.require_creator(id, caller).await?;

        if !self.encuentro_repo.delete(id).await? {
            return Err(AppError::EncuentroNotFound);
        }

        tracing::info!(encuentro_id = %id, "Encuentro eliminado");
        Ok(())
    }
}

fn ensure_fecha_futura(fecha: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppError> {
    if fecha < now {
        return Err(AppError::FechaEnPasado);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn past_dates_are_rejected() {
        let now = Utc::now();
        assert!(ensure_fecha_futura(now + Duration::days(3), now).is_ok());
        assert!(ensure_fecha_futura(now, now).is_ok());
        assert!(matches!(
            ensure_fecha_futura(now - Duration::minutes(1), now),
            Err(AppError::FechaEnPasado)
        ));
    }
}
