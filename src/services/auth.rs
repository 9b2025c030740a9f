// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, RegisterUserPayload, User},
};

// Emisión y verificación de JWT (HS256). Sin acceso a base de datos.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl_days: i64,
}

impl TokenIssuer {
    pub fn new(secret: String, ttl_days: i64) -> Self {
        Self { secret, ttl_days }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.ttl_days);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenIssuer,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tokens: TokenIssuer, pool: PgPool) -> Self {
        Self { user_repo, tokens, pool }
    }

    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<AuthResponse, AppError> {
        let hashed_password = hash_password(payload.contrasena).await?;

        let email = payload.email.trim().to_lowercase();
        let user = self
            .user_repo
            .create_user(
                &self.pool,
                payload.nombre.trim(),
                payload.apellido.as_deref(),
                &email,
                &hashed_password,
                payload.imagen_perfil.as_deref(),
            )
            .await?;

        tracing::info!(user_id = %user.id, "Usuario registrado");

        let access_token = self.tokens.issue(&user)?;
        Ok(AuthResponse { user, access_token })
    }

    // Email inexistente y contraseña incorrecta dan el mismo error
    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password.to_owned(), user.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(&user)?;
        Ok(AuthResponse { user, access_token })
    }

    /// Token válido y usuario todavía existente.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.tokens.decode(token)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn change_password(
        &self,
        user: &User,
        actual: &str,
        nueva: &str,
    ) -> Result<(), AppError> {
        if !verify_password(actual.to_owned(), user.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        let hashed_password = hash_password(nueva.to_owned()).await?;
        if !self.user_repo.update_password(user.id, &hashed_password).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!(user_id = %user.id, "Contraseña actualizada");
        Ok(())
    }
}

// bcrypt es CPU-bound: fuera del runtime
async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de verificación: {}", e))??;
    Ok(is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            nombre: "Ana".into(),
            apellido: Some("Pérez".into()),
            email: "ana@example.com".into(),
            password_hash: String::new(),
            imagen_perfil: None,
            fecha_registro: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_decodes_to_the_same_user() {
        let tokens = TokenIssuer::new("secreto-de-prueba".into(), 7);
        let user = user();

        let token = tokens.issue(&user).unwrap();
        let claims = tokens.decode(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = TokenIssuer::new("uno".into(), 7).issue(&user()).unwrap();
        let result = TokenIssuer::new("otro".into(), 7).decode(&token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenIssuer::new("secreto".into(), -2);
        let token = tokens.issue(&user()).unwrap();
        assert!(matches!(tokens.decode(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_is_not_a_token() {
        let tokens = TokenIssuer::new("secreto".into(), 7);
        assert!(matches!(tokens.decode("no.es.jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_roundtrip() {
        let hashed = hash_password("secreto".into()).await.unwrap();
        assert!(verify_password("secreto".into(), hashed.clone()).await.unwrap());
        assert!(!verify_password("otro".into(), hashed).await.unwrap());
    }
}
