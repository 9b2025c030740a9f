// src/services/access.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EncuentroRepository, ParticipanteRepository},
    models::encuentro::Encuentro,
};

// Reglas de acceso sobre un encuentro: creador y miembros.
// Miembro = creador o fila en participantes_encuentro.
#[derive(Clone)]
pub struct AccessPolicy {
    encuentro_repo: EncuentroRepository,
    participante_repo: ParticipanteRepository,
    pool: PgPool,
}

impl AccessPolicy {
    pub fn new(
        encuentro_repo: EncuentroRepository,
        participante_repo: ParticipanteRepository,
        pool: PgPool,
    ) -> Self {
        Self { encuentro_repo, participante_repo, pool }
    }

    pub async fn encuentro(&self, id_encuentro: Uuid) -> Result<Encuentro, AppError> {
        self.encuentro_repo
            .find_by_id(&self.pool, id_encuentro)
            .await?
            .ok_or(AppError::EncuentroNotFound)
    }

    /// Devuelve el encuentro si `id_usuario` es su creador.
    pub async fn require_creator(
        &self,
        id_encuentro: Uuid,
        id_usuario: Uuid,
    ) -> Result<Encuentro, AppError> {
        let encuentro = self.encuentro(id_encuentro).await?;
        ensure_creator(&encuentro, id_usuario)?;
        Ok(encuentro)
    }

    /// Devuelve el encuentro si `id_usuario` pertenece a él.
    pub async fn require_member(
        &self,
        id_encuentro: Uuid,
        id_usuario: Uuid,
    ) -> Result<Encuentro, AppError> {
        let encuentro = self.encuentro(id_encuentro).await?;
        if encuentro.id_creador == id_usuario {
            return Ok(encuentro);
        }

        let is_member = self
            .participante_repo
            .is_member(&self.pool, id_encuentro, id_usuario)
            .await?;
        if !is_member {
            return Err(AppError::MembersOnly);
        }
        Ok(encuentro)
    }
}

pub fn ensure_creator(encuentro: &Encuentro, id_usuario: Uuid) -> Result<(), AppError> {
    if encuentro.id_creador != id_usuario {
        return Err(AppError::CreatorOnly);
    }
    Ok(())
}

/// Un movimiento (aporte o gasto) lo puede borrar su autor o el creador del encuentro.
pub fn ensure_author_or_creator(
    encuentro: &Encuentro,
    autor: Option<Uuid>,
    id_usuario: Uuid,
) -> Result<(), AppError> {
    if autor == Some(id_usuario) || encuentro.id_creador == id_usuario {
        return Ok(());
    }
    Err(AppError::AuthorOnly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn encuentro(id_creador: Uuid) -> Encuentro {
        Encuentro {
            id: Uuid::new_v4(),
            id_creador,
            titulo: "Asado".into(),
            descripcion: "Fin de año".into(),
            lugar: "Quinta".into(),
            fecha: Utc::now(),
            fecha_creacion: Utc::now(),
        }
    }

    #[test]
    fn only_the_creator_passes_creator_check() {
        let creador = Uuid::new_v4();
        let enc = encuentro(creador);

        assert!(ensure_creator(&enc, creador).is_ok());
        assert!(matches!(
            ensure_creator(&enc, Uuid::new_v4()),
            Err(AppError::CreatorOnly)
        ));
    }

    #[test]
    fn movements_are_removable_by_author_or_creator() {
        let creador = Uuid::new_v4();
        let autor = Uuid::new_v4();
        let enc = encuentro(creador);

        assert!(ensure_author_or_creator(&enc, Some(autor), autor).is_ok());
        assert!(ensure_author_or_creator(&enc, Some(autor), creador).is_ok());
        assert!(ensure_author_or_creator(&enc, None, creador).is_ok());
        assert!(matches!(
            ensure_author_or_creator(&enc, Some(autor), Uuid::new_v4()),
            Err(AppError::AuthorOnly)
        ));
        assert!(matches!(
            ensure_author_or_creator(&enc, None, autor),
            Err(AppError::AuthorOnly)
        ));
    }
}
