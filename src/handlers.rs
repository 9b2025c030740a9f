pub mod aporte;
pub mod auth;
pub mod bolsillo;
pub mod encuentro;
pub mod gasto;
pub mod participantes;
pub mod presupuesto;
pub mod users;
