// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{UpdateProfilePayload, User, UserProfile},
};

pub const SEARCH_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    pub async fn profile(&self, id: Uuid) -> Result<UserProfile, AppError> {
        self.user_repo
            .find_profile(id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        payload: &UpdateProfilePayload,
    ) -> Result<User, AppError> {
        self.user_repo
            .update_profile(
                id,
                payload.nombre.as_deref().map(str::trim),
                payload.apellido.as_deref(),
                payload.imagen_perfil.as_deref(),
            )
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn search(&self, term: Option<&str>, caller: Uuid) -> Result<Vec<UserProfile>, AppError> {
        let term = normalize_search(term)?;
        self.user_repo.search(term, caller, SEARCH_LIMIT).await
    }
}

fn normalize_search(term: Option<&str>) -> Result<&str, AppError> {
    match term.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(AppError::EmptySearch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_rejected() {
        assert!(matches!(normalize_search(None), Err(AppError::EmptySearch)));
        assert!(matches!(normalize_search(Some("   ")), Err(AppError::EmptySearch)));
        assert_eq!(normalize_search(Some("  ana ")).unwrap(), "ana");
    }
}
