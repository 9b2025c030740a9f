pub mod user_repo;
pub use user_repo::UserRepository;
pub mod encuentro_repo;
pub use encuentro_repo::EncuentroRepository;
pub mod participante_repo;
pub use participante_repo::ParticipanteRepository;
pub mod presupuesto_repo;
pub use presupuesto_repo::PresupuestoRepository;
pub mod bolsillo_repo;
pub use bolsillo_repo::BolsilloRepository;
pub mod aporte_repo;
pub use aporte_repo::AporteRepository;
pub mod gasto_repo;
pub use gasto_repo::GastoRepository;
