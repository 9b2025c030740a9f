// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validate_no_blank;

// Usuario tal como está en la tabla `usuarios`
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "María")]
    pub nombre: String,

    #[schema(example = "González")]
    pub apellido: Option<String>,

    #[schema(example = "maria@example.com")]
    pub email: String,

    #[serde(skip_serializing)] // nunca sale del servidor
    #[schema(ignore)]
    pub password_hash: String,

    pub imagen_perfil: Option<String>,
    pub fecha_registro: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Lo que otros usuarios pueden ver (búsqueda, invitaciones)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub nombre: String,
    pub apellido: Option<String>,
    pub email: String,
    pub imagen_perfil: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(
        length(min = 1, max = 100, message = "El nombre es obligatorio (máx. 100 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub nombre: String,

    #[validate(length(max = 100, message = "El apellido admite como máximo 100 caracteres."))]
    pub apellido: Option<String>,

    #[validate(
        email(message = "El email no es válido."),
        length(max = 150, message = "El email admite como máximo 150 caracteres.")
    )]
    pub email: String,

    // bcrypt solo usa los primeros 72 bytes
    #[validate(length(min = 6, max = 72, message = "La contraseña debe tener entre 6 y 72 caracteres."))]
    pub contrasena: String,

    #[validate(length(max = 255, message = "La imagen de perfil admite como máximo 255 caracteres."))]
    pub imagen_perfil: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "El email no es válido."))]
    pub email: String,

    #[validate(length(min = 1, message = "La contraseña es obligatoria."))]
    pub contrasena: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(
        length(min = 1, max = 100, message = "El nombre es obligatorio (máx. 100 caracteres)."),
        custom(function = "validate_no_blank")
    )]
    pub nombre: Option<String>,

    #[validate(length(max = 100, message = "El apellido admite como máximo 100 caracteres."))]
    pub apellido: Option<String>,

    #[validate(length(max = 255, message = "La imagen de perfil admite como máximo 255 caracteres."))]
    pub imagen_perfil: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "La contraseña actual es obligatoria."))]
    pub contrasena_actual: String,

    #[validate(length(min = 6, max = 72, message = "La contraseña debe tener entre 6 y 72 caracteres."))]
    pub contrasena_nueva: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchUsersQuery {
    /// Texto a buscar en nombre, apellido o email
    pub q: Option<String>,
}

// Respuesta de registro y login
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}

// "Claims" del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // id del usuario
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, contrasena: &str) -> RegisterUserPayload {
        RegisterUserPayload {
            nombre: "Ana".into(),
            apellido: None,
            email: email.into(),
            contrasena: contrasena.into(),
            imagen_perfil: None,
        }
    }

    #[test]
    fn register_payload_rules() {
        assert!(register("ana@example.com", "secreto").validate().is_ok());

        let errors = register("no-es-email", "123").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("contrasena"));
    }

    #[test]
    fn register_payload_reads_camel_case() {
        let payload: RegisterUserPayload = serde_json::from_str(
            r#"{"nombre":"Ana","email":"ana@example.com","contrasena":"secreto","imagenPerfil":"a.png"}"#,
        )
        .unwrap();
        assert_eq!(payload.imagen_perfil.as_deref(), Some("a.png"));
    }

    #[test]
    fn user_never_serializes_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            nombre: "Ana".into(),
            apellido: None,
            email: "ana@example.com".into(),
            password_hash: "$2b$12$hash".into(),
            imagen_perfil: None,
            fecha_registro: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("fechaRegistro").is_some());
    }

    #[test]
    fn empty_profile_update_is_valid() {
        let payload = UpdateProfilePayload {
            nombre: None,
            apellido: None,
            imagen_perfil: None,
        };
        assert!(payload.validate().is_ok());
    }
}
