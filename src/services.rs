pub mod access;
pub mod aporte_service;
pub mod auth;
pub mod bolsillo_service;
pub mod encuentro_service;
pub mod gasto_service;
pub mod ledger;
pub mod participante_service;
pub mod presupuesto_service;
#[cfg(test)]
pub(crate) mod test_support;
pub mod user_service;
