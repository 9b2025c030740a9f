// src/services/participante_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ParticipanteRepository, UserRepository},
    models::{
        encuentro::Encuentro,
        participante::{
            Participante, ParticipanteAportes, ParticipanteDetalle, ParticipanteFilter,
            ROL_PARTICIPANTE,
        },
    },
    services::access::AccessPolicy,
};

#[derive(Clone)]
pub struct ParticipanteService {
    participante_repo: ParticipanteRepository,
    user_repo: UserRepository,
    access: AccessPolicy,
    pool: PgPool,
}

impl ParticipanteService {
    pub fn new(
        participante_repo: ParticipanteRepository,
        user_repo: UserRepository,
        access: AccessPolicy,
        pool: PgPool,
    ) -> Self {
        Self { participante_repo, user_repo, access, pool }
    }

    /// Invita a un usuario. Solo el creador del encuentro puede hacerlo.
    pub async fn add(
        &self,
        caller: Uuid,
        id_encuentro: Uuid,
        id_usuario: Uuid,
        rol: Option<&str>,
    ) -> Result<Participante, AppError> {
        self.access.require_creator(id_encuentro, caller).await?;

        if !self.user_repo.exists(&self.pool, id_usuario).await? {
            return Err(AppError::UserNotFound);
        }

        let rol = rol.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(ROL_PARTICIPANTE);
        let participante = self
            .participante_repo
            .create(&self.pool, id_encuentro, id_usuario, rol)
            .await?;

        tracing::info!(
            encuentro_id = %id_encuentro,
            usuario_id = %id_usuario,
            rol = %participante.rol,
            "Participante agregado"
        );
        Ok(participante)
    }

    // encuentro tiene prioridad sobre usuario
    pub async fn list(&self, filter: &ParticipanteFilter) -> Result<Vec<Participante>, AppError> {
        match (filter.encuentro, filter.usuario) {
            (Some(id_encuentro), _) => self.participante_repo.list_by_encuentro(id_encuentro).await,
            (None, Some(id_usuario)) => self.participante_repo.list_by_usuario(id_usuario).await,
            (None, None) => self.participante_repo.list_all().await,
        }
    }

    pub async fn list_detalle(
        &self,
        filter: &ParticipanteFilter,
    ) -> Result<Vec<ParticipanteDetalle>, AppError> {
        self.participante_repo
            .list_detalle(filter.encuentro, filter.usuario)
            .await
    }

    pub async fn list_aportes(
        &self,
        filter: &ParticipanteFilter,
    ) -> Result<Vec<ParticipanteAportes>, AppError> {
        self.participante_repo
            .list_aportes(filter.encuentro, filter.usuario)
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Participante, AppError> {
        self.participante_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ParticipanteNotFound)
    }

    pub async fn update_rol(&self, caller: Uuid, id: Uuid, rol: &str) -> Result<Participante, AppError> {
        let participante = self.get(id).await?;
        self.access
            .require_creator(participante.id_encuentro, caller)
            .await?;

        self.participante_repo
            .update_rol(id, rol.trim())
            .await?
            .ok_or(AppError::ParticipanteNotFound)
    }

    pub async fn remove(&self, caller: Uuid, id: Uuid) -> Result<(), AppError> {
        let participante = self.get(id).await?;
        self.remove_participante(caller, participante).await
    }

    pub async fn remove_membership(
        &self,
        caller: Uuid,
        id_encuentro: Uuid,
        id_usuario: Uuid,
    ) -> Result<(), AppError> {
        let participante = self
            .participante_repo
            .find_membership(id_encuentro, id_usuario)
            .await?
            .ok_or(AppError::ParticipanteNotFound)?;
        self.remove_participante(caller, participante).await
    }

    async fn remove_participante(&self, caller: Uuid, participante: Participante) -> Result<(), AppError> {
        let encuentro = self.access.encuentro(participante.id_encuentro).await?;
        check_removal(&encuentro, participante.id_usuario, caller)?;

        if !self.participante_repo.delete(participante.id).await? {
            return Err(AppError::ParticipanteNotFound);
        }

        tracing::info!(
            encuentro_id = %participante.id_encuentro,
            usuario_id = %participante.id_usuario,
            "Participante eliminado"
        );
        Ok(())
    }
}

// El creador saca a cualquiera menos a sí mismo; el resto solo se saca a sí mismo
fn check_removal(encuentro: &Encuentro, id_usuario: Uuid, caller: Uuid) -> Result<(), AppError> {
    if caller != encuentro.id_creador && caller != id_usuario {
        return Err(AppError::CreatorOnly);
    }
    if id_usuario == encuentro.id_creador {
        return Err(AppError::CannotRemoveCreator);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use chrono::Utc;

    fn encuentro(id_creador: Uuid) -> Encuentro {
        Encuentro {
            id: Uuid::new_v4(),
            id_creador,
            titulo: "Cumple".into(),
            descripcion: "Sorpresa".into(),
            lugar: "Casa".into(),
            fecha: Utc::now(),
            fecha_creacion: Utc::now(),
        }
    }

    #[test]
    fn creator_membership_cannot_be_removed() {
        let creador = Uuid::new_v4();
        let enc = encuentro(creador);
        assert!(matches!(
            check_removal(&enc, creador, creador),
            Err(AppError::CannotRemoveCreator)
        ));
    }

    #[test]
    fn creator_or_member_themself_can_remove() {
        let creador = Uuid::new_v4();
        let miembro = Uuid::new_v4();
        let enc = encuentro(creador);

        assert!(check_removal(&enc, miembro, creador).is_ok());
        assert!(check_removal(&enc, miembro, miembro).is_ok());
        assert!(matches!(
            check_removal(&enc, miembro, Uuid::new_v4()),
            Err(AppError::CreatorOnly)
        ));
    }

    #[test]
    fn stranger_cannot_remove_anyone_not_even_the_creator() {
        let creador = Uuid::new_v4();
        let enc = encuentro(creador);
        assert!(matches!(
            check_removal(&enc, creador, Uuid::new_v4()),
            Err(AppError::CreatorOnly)
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_invite_is_a_conflict(pool: PgPool) {
        let state = test_support::state(pool);
        let creador = test_support::usuario(&state, "Ana").await;
        let invitado = test_support::usuario(&state, "Luis").await;
        let id_encuentro = test_support::encuentro(&state, creador).await;

        let participante = state
            .participante_service
            .add(creador, id_encuentro, invitado, None)
            .await
            .unwrap();
        assert_eq!(participante.rol, ROL_PARTICIPANTE);

        let err = state
            .participante_service
            .add(creador, id_encuentro, invitado, Some("cocinero"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyParticipant));

        // el creador ya es miembro desde la creación del encuentro
        let err = state
            .participante_service
            .add(creador, id_encuentro, creador, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyParticipant));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn invite_checks_encuentro_caller_and_user(pool: PgPool) {
        let state = test_support::state(pool);
        let creador = test_support::usuario(&state, "Ana").await;
        let otro = test_support::usuario(&state, "Luis").await;
        let id_encuentro = test_support::encuentro(&state, creador).await;

        let err = state
            .participante_service
            .add(creador, Uuid::new_v4(), otro, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EncuentroNotFound));

        let err = state
            .participante_service
            .add(otro, id_encuentro, otro, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CreatorOnly));

        let err = state
            .participante_service
            .add(creador, id_encuentro, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn stranger_removing_the_creator_is_forbidden(pool: PgPool) {
        let state = test_support::state(pool);
        let creador = test_support::usuario(&state, "Ana").await;
        let extrano = test_support::usuario(&state, "Luis").await;
        let id_encuentro = test_support::encuentro(&state, creador).await;

        let err = state
            .participante_service
            .remove_membership(extrano, id_encuentro, creador)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CreatorOnly));
    }
}
