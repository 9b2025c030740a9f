// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Error de dominio. Los servicios y repositorios solo devuelven esto;
// la traducción a HTTP ocurre en `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Email ya registrado")]
    EmailAlreadyExists,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("Encuentro no encontrado")]
    EncuentroNotFound,

    #[error("Participante no encontrado")]
    ParticipanteNotFound,

    #[error("Presupuesto no encontrado")]
    PresupuestoNotFound,

    #[error("Item de presupuesto no encontrado")]
    ItemNotFound,

    #[error("Bolsillo no encontrado")]
    BolsilloNotFound,

    #[error("Aporte no encontrado")]
    AporteNotFound,

    #[error("Gasto no encontrado")]
    GastoNotFound,

    #[error("El usuario ya participa del encuentro")]
    AlreadyParticipant,

    #[error("El encuentro ya tiene presupuesto")]
    PresupuestoAlreadyExists,

    #[error("Acción reservada al creador del encuentro")]
    CreatorOnly,

    #[error("Acción reservada a los participantes del encuentro")]
    MembersOnly,

    #[error("Acción reservada al autor del movimiento")]
    AuthorOnly,

    #[error("No se puede quitar al creador de su encuentro")]
    CannotRemoveCreator,

    #[error("Fecha del encuentro en el pasado")]
    FechaEnPasado,

    #[error("El recurso no pertenece al encuentro")]
    EncuentroMismatch,

    #[error("Búsqueda vacía")]
    EmptySearch,

    #[error("Monto inválido")]
    InvalidAmount,

    #[error("Violación de unicidad: {0}")]
    UniqueConstraintViolation(String),

    #[error("Error de base de datos: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Error interno del servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Error "de cable": lo que realmente viaja al cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error,
            "code": self.code,
            "details": self.details,
        }));
        (self.status, body).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::FechaEnPasado
            | AppError::EncuentroMismatch
            | AppError::EmptySearch
            | AppError::InvalidAmount => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            AppError::CreatorOnly | AppError::MembersOnly | AppError::AuthorOnly => {
                StatusCode::FORBIDDEN
            }

            AppError::UserNotFound
            | AppError::EncuentroNotFound
            | AppError::ParticipanteNotFound
            | AppError::PresupuestoNotFound
            | AppError::ItemNotFound
            | AppError::BolsilloNotFound
            | AppError::AporteNotFound
            | AppError::GastoNotFound => StatusCode::NOT_FOUND,

            AppError::EmailAlreadyExists
            | AppError::AlreadyParticipant
            | AppError::PresupuestoAlreadyExists
            | AppError::CannotRemoveCreator
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,

            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Clave estable del catálogo de mensajes (`locales/*.json`).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::EncuentroNotFound => "ENCUENTRO_NOT_FOUND",
            AppError::ParticipanteNotFound => "PARTICIPANTE_NOT_FOUND",
            AppError::PresupuestoNotFound => "PRESUPUESTO_NOT_FOUND",
            AppError::ItemNotFound => "ITEM_NOT_FOUND",
            AppError::BolsilloNotFound => "BOLSILLO_NOT_FOUND",
            AppError::AporteNotFound => "APORTE_NOT_FOUND",
            AppError::GastoNotFound => "GASTO_NOT_FOUND",
            AppError::AlreadyParticipant => "ALREADY_PARTICIPANT",
            AppError::PresupuestoAlreadyExists => "PRESUPUESTO_ALREADY_EXISTS",
            AppError::CreatorOnly => "CREATOR_ONLY",
            AppError::MembersOnly => "MEMBERS_ONLY",
            AppError::AuthorOnly => "AUTHOR_ONLY",
            AppError::CannotRemoveCreator => "CANNOT_REMOVE_CREATOR",
            AppError::FechaEnPasado => "FECHA_EN_PASADO",
            AppError::EncuentroMismatch => "ENCUENTRO_MISMATCH",
            AppError::EmptySearch => "EMPTY_SEARCH",
            AppError::InvalidAmount => "INVALID_AMOUNT",
            AppError::UniqueConstraintViolation(_) => "UNIQUE_CONSTRAINT",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "INTERNAL_ERROR",
        }
    }

    /// Traduce el error al idioma pedido y arma la respuesta.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let code = self.code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Error interno del servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => Some(json!(validation_details(errors))),
            _ => None,
        };

        ApiError {
            status,
            code,
            error: store.translate(&locale.0, code),
            details,
        }
    }

    /// Convierte violaciones de unicidad en errores de dominio según la
    /// constraint. Cualquier otro error de sqlx queda como `DatabaseError`.
    pub fn from_db(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                if let Some(constraint) = db_err.constraint() {
                    return Self::from_unique_constraint(constraint);
                }
            }
        }
        e.into()
    }

    pub fn from_unique_constraint(constraint: &str) -> Self {
        match constraint {
            "usuarios_email_key" => AppError::EmailAlreadyExists,
            "participantes_encuentro_unico" => AppError::AlreadyParticipant,
            "presupuestos_encuentro_unico" => AppError::PresupuestoAlreadyExists,
            other => AppError::UniqueConstraintViolation(other.to_string()),
        }
    }
}

fn validation_details(errors: &validator::ValidationErrors) -> HashMap<String, Vec<String>> {
    let mut details = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), messages);
    }
    details
}
