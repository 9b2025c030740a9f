// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

// Guardia de las rutas protegidas: valida el Bearer y deja el usuario
// en las extensions del request.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .map_err(|_| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .auth_service
        .validate_token(bearer.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

// Extractor para los handlers detrás de `auth_guard`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                AppError::InvalidToken
                    .to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            nombre: "Ana".into(),
            apellido: None,
            email: "ana@example.com".into(),
            password_hash: String::new(),
            imagen_perfil: None,
            fecha_registro: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn state(default_locale: &str) -> AppState {
        let config = Config::from_lookup(|key: &str| match key {
            "DATABASE_URL" => Some("postgres://localhost/encuentros".to_string()),
            "JWT_SECRET" => Some("secreto".to_string()),
            "DEFAULT_LOCALE" => Some(default_locale.to_string()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::from_pool(config, pool).unwrap()
    }

    #[tokio::test]
    async fn extracts_the_user_left_by_the_guard() {
        let state = state("es");
        let user = user();
        let mut request = HttpRequest::builder().body(()).unwrap();
        request.extensions_mut().insert(AuthenticatedUser(user.clone()));
        let (mut parts, _) = request.into_parts();

        let AuthenticatedUser(extracted) = AuthenticatedUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(extracted.id, user.id);
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized_in_the_client_language() {
        let state = state("es");
        let request = HttpRequest::builder()
            .header(header::ACCEPT_LANGUAGE, "en-GB")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let rejection = AuthenticatedUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(rejection.status, StatusCode::UNAUTHORIZED);
        assert_eq!(rejection.code, "INVALID_TOKEN");
        assert_eq!(rejection.error, state.i18n_store.translate("en", "INVALID_TOKEN"));
    }

    #[tokio::test]
    async fn rejection_without_header_uses_the_configured_language() {
        let request = HttpRequest::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let en = state("en");
        let rejection = AuthenticatedUser::from_request_parts(&mut parts, &en)
            .await
            .unwrap_err();
        assert_eq!(rejection.error, en.i18n_store.translate("en", "INVALID_TOKEN"));
        assert_ne!(rejection.error, en.i18n_store.translate("es", "INVALID_TOKEN"));
    }
}
