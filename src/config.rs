// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::{I18nStore, DEFAULT_LANG},
    db::{
        AporteRepository, BolsilloRepository, EncuentroRepository, GastoRepository,
        ParticipanteRepository, PresupuestoRepository, UserRepository,
    },
    services::{
        access::AccessPolicy,
        aporte_service::AporteService,
        auth::{AuthService, TokenIssuer},
        bolsillo_service::BolsilloService,
        encuentro_service::EncuentroService,
        gasto_service::GastoService,
        participante_service::ParticipanteService,
        presupuesto_service::PresupuestoService,
        user_service::UserService,
    },
};

// Origen del frontend en desarrollo
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt_expiration_days: i64,
    pub default_locale: String,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL debe estar definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET debe estar definido")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET no puede estar vacío");
        }

        let port = parse_or(&lookup, "PORT", 3000)?;
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;
        let jwt_expiration_days = parse_or(&lookup, "JWT_EXPIRATION_DAYS", 7)?;
        let default_locale = lookup("DEFAULT_LOCALE").unwrap_or_else(|| DEFAULT_LANG.to_string());
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            port,
            db_max_connections,
            jwt_expiration_days,
            default_locale,
            cors_origin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} tiene un valor inválido: {raw}")),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub encuentro_service: EncuentroService,
    pub participante_service: ParticipanteService,
    pub presupuesto_service: PresupuestoService,
    pub bolsillo_service: BolsilloService,
    pub aporte_service: AporteService,
    pub gasto_service: GastoService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("No se pudo conectar a la base de datos")?;

        tracing::info!("✅ Conexión con la base de datos establecida");

        Self::from_pool(config, db_pool)
    }

    // Arma el grafo de dependencias
    pub fn from_pool(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load(&config.default_locale)?);

        let user_repo = UserRepository::new(db_pool.clone());
        let encuentro_repo = EncuentroRepository::new(db_pool.clone());
        let participante_repo = ParticipanteRepository::new(db_pool.clone());
        let presupuesto_repo = PresupuestoRepository::new(db_pool.clone());
        let bolsillo_repo = BolsilloRepository::new(db_pool.clone());
        let aporte_repo = AporteRepository::new(db_pool.clone());
        let gasto_repo = GastoRepository::new(db_pool.clone());

        let access = AccessPolicy::new(
            encuentro_repo.clone(),
            participante_repo.clone(),
            db_pool.clone(),
        );

        let tokens = TokenIssuer::new(config.jwt_secret.clone(), config.jwt_expiration_days);
        let auth_service = AuthService::new(user_repo.clone(), tokens, db_pool.clone());
        let user_service = UserService::new(user_repo.clone());

        let encuentro_service = EncuentroService::new(
            encuentro_repo,
            participante_repo.clone(),
            access.clone(),
            db_pool.clone(),
        );
        let participante_service = ParticipanteService::new(
            participante_repo,
            user_repo,
            access.clone(),
            db_pool.clone(),
        );
        let bolsillo_service = BolsilloService::new(
            bolsillo_repo.clone(),
            presupuesto_repo.clone(),
            aporte_repo.clone(),
            gasto_repo.clone(),
            access.clone(),
            db_pool.clone(),
        );
        let presupuesto_service = PresupuestoService::new(
            presupuesto_repo,
            bolsillo_repo.clone(),
            bolsillo_service.clone(),
            access.clone(),
            db_pool.clone(),
        );
        let aporte_service = AporteService::new(
            aporte_repo,
            bolsillo_repo.clone(),
            access.clone(),
            db_pool.clone(),
        );
        let gasto_service = GastoService::new(gasto_repo, bolsillo_repo, access, db_pool.clone());

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            user_service,
            encuentro_service,
            participante_service,
            presupuesto_service,
            bolsillo_service,
            aporte_service,
            gasto_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/encuentros"),
        ("JWT_SECRET", "secreto"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_expiration_days, 7);
        assert_eq!(config.default_locale, "es");
        assert_eq!(config.cors_origin, "http://localhost:4200");
    }

    #[test]
    fn missing_secret_fails() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/x")]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/x"),
            ("JWT_SECRET", "  "),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_port_fails() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "tres mil"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "8080"));
        assert_eq!(Config::from_lookup(lookup(&vars)).unwrap().port, 8080);
    }

    #[tokio::test]
    async fn state_builds_with_a_lazy_pool() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();

        let state = AppState::from_pool(config, pool).unwrap();
        assert!(state.i18n_store.supports("en"));
        assert_eq!(state.config.port, 3000);
    }

    #[tokio::test]
    async fn unknown_default_locale_fails() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("DEFAULT_LOCALE", "fr"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();

        assert!(AppState::from_pool(config, pool).is_err());
    }
}
