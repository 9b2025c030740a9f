//src/main.rs

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    http::{
        header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .context("Falla al inicializar el estado de la aplicación")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falla al correr las migraciones")?;

    tracing::info!("✅ Migraciones ejecutadas");

    let port = app_state.config.port;
    let cors = cors_layer(&app_state.config.cors_origin)?;
    let app = router(app_state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {addr}"))?;
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Error en el servidor")?;
    Ok(())
}

// Un único origen permitido (el frontend), con credenciales
fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("CORS_ORIGIN inválido: {origin}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT_LANGUAGE])
        .allow_credentials(true))
}

fn router(app_state: AppState) -> Router {
    // route_layer: el guard solo cubre /validate
    let auth_routes = Router::new()
        .route("/validate", post(handlers::auth::validate))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route(
            "/me",
            get(handlers::users::get_me).patch(handlers::users::update_me),
        )
        .route("/me/password", patch(handlers::users::change_password))
        .route("/search", get(handlers::users::search_users))
        .route("/{id}", get(handlers::users::get_user));

    let encuentro_routes = Router::new()
        .route(
            "/",
            post(handlers::encuentro::create_encuentro).get(handlers::encuentro::list_encuentros),
        )
        .route("/resumen", get(handlers::encuentro::list_resumen))
        .route(
            "/{id}",
            get(handlers::encuentro::get_encuentro)
                .patch(handlers::encuentro::update_encuentro)
                .delete(handlers::encuentro::delete_encuentro),
        );

    let participante_routes = Router::new()
        .route(
            "/",
            post(handlers::participantes::add_participante)
                .get(handlers::participantes::list_participantes),
        )
        .route("/vista/detalle", get(handlers::participantes::list_detalle))
        .route("/aportes/resumen", get(handlers::participantes::list_aportes_resumen))
        .route(
            "/encuentro/{id_encuentro}/usuario/{id_usuario}",
            delete(handlers::participantes::delete_membership),
        )
        .route(
            "/{id}",
            get(handlers::participantes::get_participante)
                .patch(handlers::participantes::update_participante)
                .delete(handlers::participantes::delete_participante),
        );

    let presupuesto_routes = Router::new()
        .route(
            "/",
            post(handlers::presupuesto::create_presupuesto)
                .get(handlers::presupuesto::list_presupuestos),
        )
        .route("/item", post(handlers::presupuesto::add_item))
        .route("/item/{id_item}", delete(handlers::presupuesto::delete_item))
        .route(
            "/{id}",
            get(handlers::presupuesto::get_presupuesto)
                .patch(handlers::presupuesto::update_presupuesto)
                .delete(handlers::presupuesto::delete_presupuesto),
        )
        .route("/{id}/items", get(handlers::presupuesto::list_items))
        .route("/{id}/resumen", get(handlers::presupuesto::get_resumen));

    let bolsillo_routes = Router::new()
        .route(
            "/",
            post(handlers::bolsillo::create_bolsillo).get(handlers::bolsillo::list_bolsillos),
        )
        .route(
            "/{id}",
            get(handlers::bolsillo::get_bolsillo)
                .patch(handlers::bolsillo::update_bolsillo)
                .delete(handlers::bolsillo::delete_bolsillo),
        )
        .route("/{id}/resumen", get(handlers::bolsillo::get_resumen));

    let aporte_routes = Router::new()
        .route(
            "/",
            post(handlers::aporte::create_aporte).get(handlers::aporte::list_aportes),
        )
        .route(
            "/{id}",
            get(handlers::aporte::get_aporte)
                .patch(handlers::aporte::update_aporte)
                .delete(handlers::aporte::delete_aporte),
        );

    let gasto_routes = Router::new()
        .route(
            "/",
            post(handlers::gasto::create_gasto).get(handlers::gasto::list_gastos),
        )
        .route(
            "/{id}",
            get(handlers::gasto::get_gasto).delete(handlers::gasto::delete_gasto),
        );

    // Todo lo que no es /auth/register ni /auth/login pasa por el guard
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/encuentro", encuentro_routes)
        .nest("/participantes-encuentro", participante_routes)
        .nest("/presupuesto", presupuesto_routes)
        .nest("/bolsillo", bolsillo_routes)
        .nest("/aporte", aporte_routes)
        .nest("/gasto", gasto_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .with_state(app_state)
}
