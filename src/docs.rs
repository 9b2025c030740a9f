// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::validate,

        // --- Users ---
        handlers::users::get_me,
        handlers::users::update_me,
        handlers::users::change_password,
        handlers::users::search_users,
        handlers::users::get_user,

        // --- Encuentros ---
        handlers::encuentro::create_encuentro,
        handlers::encuentro::list_encuentros,
        handlers::encuentro::list_resumen,
        handlers::encuentro::get_encuentro,
        handlers::encuentro::update_encuentro,
        handlers::encuentro::delete_encuentro,

        // --- Participantes ---
        handlers::participantes::add_participante,
        handlers::participantes::list_participantes,
        handlers::participantes::list_detalle,
        handlers::participantes::list_aportes_resumen,
        handlers::participantes::get_participante,
        handlers::participantes::update_participante,
        handlers::participantes::delete_participante,
        handlers::participantes::delete_membership,

        // --- Presupuestos ---
        handlers::presupuesto::create_presupuesto,
        handlers::presupuesto::list_presupuestos,
        handlers::presupuesto::get_presupuesto,
        handlers::presupuesto::update_presupuesto,
        handlers::presupuesto::delete_presupuesto,
        handlers::presupuesto::get_resumen,
        handlers::presupuesto::add_item,
        handlers::presupuesto::list_items,
        handlers::presupuesto::delete_item,

        // --- Bolsillos ---
        handlers::bolsillo::create_bolsillo,
        handlers::bolsillo::list_bolsillos,
        handlers::bolsillo::get_bolsillo,
        handlers::bolsillo::update_bolsillo,
        handlers::bolsillo::delete_bolsillo,
        handlers::bolsillo::get_resumen,

        // --- Aportes ---
        handlers::aporte::create_aporte,
        handlers::aporte::list_aportes,
        handlers::aporte::get_aporte,
        handlers::aporte::update_aporte,
        handlers::aporte::delete_aporte,

        // --- Gastos ---
        handlers::gasto::create_gasto,
        handlers::gasto::list_gastos,
        handlers::gasto::get_gasto,
        handlers::gasto::delete_gasto,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::ChangePasswordPayload,
            models::auth::AuthResponse,

            // --- Encuentros ---
            models::encuentro::Encuentro,
            models::encuentro::EncuentroResumen,
            models::encuentro::UpdateEncuentroPayload,
            handlers::encuentro::CreateEncuentroPayload,

            // --- Participantes ---
            models::participante::Participante,
            models::participante::ParticipanteDetalle,
            models::participante::ParticipanteAportes,
            models::participante::UpdateParticipantePayload,
            models::participante::MessageResponse,
            handlers::participantes::CreateParticipantePayload,

            // --- Presupuestos ---
            models::presupuesto::Presupuesto,
            models::presupuesto::ItemPresupuesto,
            models::presupuesto::PresupuestoDetalle,
            models::presupuesto::UpdatePresupuestoPayload,
            handlers::presupuesto::CreatePresupuestoPayload,
            handlers::presupuesto::CreateItemPayload,

            // --- Bolsillos ---
            models::bolsillo::Bolsillo,
            models::bolsillo::UpdateBolsilloPayload,
            handlers::bolsillo::CreateBolsilloPayload,

            // --- Aportes y gastos ---
            models::aporte::Aporte,
            models::aporte::UpdateAportePayload,
            handlers::aporte::CreateAportePayload,
            models::gasto::Gasto,
            handlers::gasto::CreateGastoPayload,

            // --- Resúmenes ---
            services::ledger::ResumenBolsillo,
            services::ledger::ResumenPresupuesto,
        )
    ),
    tags(
        (name = "Auth", description = "Registro, login y validación de token"),
        (name = "Users", description = "Perfil y búsqueda de usuarios"),
        (name = "Encuentros", description = "Encuentros y su resumen"),
        (name = "Participantes", description = "Invitados y roles de cada encuentro"),
        (name = "Presupuestos", description = "Presupuesto e items planificados"),
        (name = "Bolsillos", description = "Sub-presupuestos con saldo propio"),
        (name = "Aportes", description = "Aportes de dinero de los participantes"),
        (name = "Gastos", description = "Gastos pagados desde un bolsillo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/encuentro"));
        assert!(doc.paths.paths.contains_key("/api/presupuesto/{id}/resumen"));
        assert!(doc.paths.paths.contains_key("/api/gasto/{id}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }

    #[test]
    fn amounts_are_documented_as_numbers() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let monto = &doc["components"]["schemas"]["Aporte"]["properties"]["monto"];

        assert_eq!(monto["type"], "number");
        assert!(monto["example"].is_number());
    }
}
