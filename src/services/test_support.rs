// src/services/test_support.rs
//
// Fixtures para los tests que corren contra Postgres (`#[sqlx::test]`).

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    config::{AppState, Config},
    db::UserRepository,
};

pub fn state(pool: PgPool) -> AppState {
    let config = Config::from_lookup(|key: &str| match key {
        "DATABASE_URL" => Some("postgres://localhost/encuentros_test".to_string()),
        "JWT_SECRET" => Some("secreto-de-test".to_string()),
        _ => None,
    })
    .unwrap();
    AppState::from_pool(config, pool).unwrap()
}

pub async fn usuario(state: &AppState, nombre: &str) -> Uuid {
    let email = format!("{}-{}@example.com", nombre.to_lowercase(), Uuid::new_v4());
    UserRepository::new(state.db_pool.clone())
        .create_user(&state.db_pool, nombre, None, &email, "$2b$04$hash", None)
        .await
        .unwrap()
        .id
}

pub async fn encuentro(state: &AppState, creador: Uuid) -> Uuid {
    state
        .encuentro_service
        .create(creador, "Asado", "Cierre de año", "Quinta", Utc::now() + Duration::days(30))
        .await
        .unwrap()
        .id
}

pub async fn bolsillo(state: &AppState, creador: Uuid, id_encuentro: Uuid) -> Uuid {
    state
        .bolsillo_service
        .create(creador, id_encuentro, None, "Bebidas")
        .await
        .unwrap()
        .id
}

pub async fn invitar(state: &AppState, creador: Uuid, id_encuentro: Uuid, invitado: Uuid) {
    state
        .participante_service
        .add(creador, id_encuentro, invitado, None)
        .await
        .unwrap();
}

pub async fn saldo_actual(state: &AppState, id_bolsillo: Uuid) -> Decimal {
    state.bolsillo_service.get(id_bolsillo).await.unwrap().saldo_actual
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}
