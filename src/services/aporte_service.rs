// src/services/aporte_service.rs

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AporteRepository, BolsilloRepository},
    models::aporte::{Aporte, AporteFilter},
    services::{
        access::{self, AccessPolicy},
        ledger,
    },
};

#[derive(Clone)]
pub struct AporteService {
    aporte_repo: AporteRepository,
    bolsillo_repo: BolsilloRepository,
    access: AccessPolicy,
    pool: PgPool,
}

impl AporteService {
    pub fn new(
        aporte_repo: AporteRepository,
        bolsillo_repo: BolsilloRepository,
        access: AccessPolicy,
        pool: PgPool,
    ) -> Self {
        Self { aporte_repo, bolsillo_repo, access, pool }
    }

    /// Registra el aporte del usuario autenticado. Con bolsillo, el insert y
    /// el recálculo del saldo ocurren con el bolsillo bloqueado.
    pub async fn create(
        &self,
        caller: Uuid,
        id_encuentro: Uuid,
        id_bolsillo: Option<Uuid>,
        monto: Decimal,
    ) -> Result<Aporte, AppError> {
        let monto = ledger::normalize_amount(monto)?;
        self.access.require_member(id_encuentro, caller).await?;

        let mut tx = self.pool.begin().await?;

        if let Some(id_bolsillo) = id_bolsillo {
            let bolsillo = self
                .bolsillo_repo
                .lock(&mut *tx, id_bolsillo)
                .await?
                .ok_or(AppError::BolsilloNotFound)?;
            if bolsillo.id_encuentro != id_encuentro {
                return Err(AppError::EncuentroMismatch);
            }
        }

        let aporte = self
            .aporte_repo
            .create(&mut *tx, id_bolsillo, id_encuentro, caller, monto)
            .await?;

        self.refresh_saldo(&mut tx, aporte.id_bolsillo).await?;
        tx.commit().await?;

        tracing::info!(
            aporte_id = %aporte.id,
            encuentro_id = %id_encuentro,
            usuario_id = %caller,
            monto = %aporte.monto,
            "Aporte registrado"
        );
        Ok(aporte)
    }

    pub async fn list(&self, filter: &AporteFilter) -> Result<Vec<Aporte>, AppError> {
        self.aporte_repo.list(&first_filter(filter)).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Aporte, AppError> {
        self.aporte_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::AporteNotFound)
    }

    // Solo el autor corrige el monto
    pub async fn update_monto(&self, caller: Uuid, id: Uuid, monto: Decimal) -> Result<Aporte, AppError> {
        let monto = ledger::normalize_amount(monto)?;
        let aporte = self.get(id).await?;
        if aporte.id_usuario != Some(caller) {
            return Err(AppError::AuthorOnly);
        }

        let mut tx = self.pool.begin().await?;
        self.lock_bolsillo(&mut tx, aporte.id_bolsillo).await?;

        let actualizado = self
            .aporte_repo
            .update_monto(&mut *tx, id, monto)
            .await?
            .ok_or(AppError::AporteNotFound)?;

        self.refresh_saldo(&mut tx, actualizado.id_bolsillo).await?;
        tx.commit().await?;

        Ok(actualizado)
    }

    pub async fn delete(&self, caller: Uuid, id: Uuid) -> Result<(), AppError> {
        let aporte = self.get(id).await?;
        let encuentro = self.access.encuentro(aporte.id_encuentro).await?;
        access::ensure_author_or_creator(&encuentro, aporte.id_usuario, caller)?;

        let mut tx = self.pool.begin().await?;
        self.lock_bolsillo(&mut tx, aporte.id_bolsillo).await?;

        if !self.aporte_repo.delete(&mut *tx, id).await? {
            return Err(AppError::AporteNotFound);
        }

        self.refresh_saldo(&mut tx, aporte.id_bolsillo).await?;
        tx.commit().await?;

        tracing::info!(aporte_id = %id, "Aporte eliminado");
        Ok(())
    }

    async fn lock_bolsillo(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id_bolsillo: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(id_bolsillo) = id_bolsillo {
            self.bolsillo_repo.lock(&mut **tx, id_bolsillo).await?;
        }
        Ok(())
    }

    async fn refresh_saldo(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id_bolsillo: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(id_bolsillo) = id_bolsillo {
            self.bolsillo_repo.refresh_saldo(&mut **tx, id_bolsillo).await?;
        }
        Ok(())
    }
}

// Se aplica solo el primer filtro presente: encuentro, bolsillo, usuario
fn first_filter(filter: &AporteFilter) -> AporteFilter {
    if filter.encuentro.is_some() {
        AporteFilter { encuentro: filter.encuentro, ..Default::default() }
    } else if filter.bolsillo.is_some() {
        AporteFilter { bolsillo: filter.bolsillo, ..Default::default() }
    } else {
        AporteFilter { usuario: filter.usuario, ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::gasto::GastoFilter,
        services::test_support::{self, dec},
    };
    use tokio::task::JoinSet;

    #[test]
    fn only_the_first_present_filter_applies() {
        let encuentro = Uuid::new_v4();
        let bolsillo = Uuid::new_v4();
        let usuario = Uuid::new_v4();

        let f = first_filter(&AporteFilter {
            encuentro: Some(encuentro),
            bolsillo: Some(bolsillo),
            usuario: Some(usuario),
        });
        assert_eq!((f.encuentro, f.bolsillo, f.usuario), (Some(encuentro), None, None));

        let f = first_filter(&AporteFilter { encuentro: None, bolsillo: Some(bolsillo), usuario: Some(usuario) });
        assert_eq!((f.encuentro, f.bolsillo, f.usuario), (None, Some(bolsillo), None));

        let f = first_filter(&AporteFilter::default());
        assert_eq!((f.encuentro, f.bolsillo, f.usuario), (None, None, None));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn pocket_balance_follows_contributions(pool: PgPool) {
        let state = test_support::state(pool);
        let ana = test_support::usuario(&state, "Ana").await;
        let luis = test_support::usuario(&state, "Luis").await;
        let id_encuentro = test_support::encuentro(&state, ana).await;
        let id_bolsillo = test_support::bolsillo(&state, ana, id_encuentro).await;
        test_support::invitar(&state, ana, id_encuentro, luis).await;

        assert_eq!(test_support::saldo_actual(&state, id_bolsillo).await, Decimal::ZERO);

        let de_ana = state
            .aporte_service
            .create(ana, id_encuentro, Some(id_bolsillo), dec("2000"))
            .await
            .unwrap();
        let de_luis = state
            .aporte_service
            .create(luis, id_encuentro, Some(id_bolsillo), dec("1500.50"))
            .await
            .unwrap();
        assert_eq!(de_luis.id_usuario, Some(luis));
        assert_eq!(test_support::saldo_actual(&state, id_bolsillo).await, dec("3500.50"));

        state.aporte_service.update_monto(ana, de_ana.id, dec("1000")).await.unwrap();
        assert_eq!(test_support::saldo_actual(&state, id_bolsillo).await, dec("2500.50"));

        // el creador puede borrar aportes ajenos
        state.aporte_service.delete(ana, de_luis.id).await.unwrap();
        assert_eq!(test_support::saldo_actual(&state, id_bolsillo).await, dec("1000"));

        let aportes = state
            .aporte_service
            .list(&AporteFilter { bolsillo: Some(id_bolsillo), ..Default::default() })
            .await
            .unwrap();
        let gastos = state
            .gasto_service
            .list(&GastoFilter { bolsillo: Some(id_bolsillo), encuentro: None })
            .await
            .unwrap();
        assert_eq!(
            ledger::saldo(&aportes, &gastos),
            test_support::saldo_actual(&state, id_bolsillo).await
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn contributions_check_membership_pocket_and_author(pool: PgPool) {
        let state = test_support::state(pool);
        let ana = test_support::usuario(&state, "Ana").await;
        let luis = test_support::usuario(&state, "Luis").await;
        let id_encuentro = test_support::encuentro(&state, ana).await;
        let otro_encuentro = test_support::encuentro(&state, ana).await;
        let bolsillo_ajeno = test_support::bolsillo(&state, ana, otro_encuentro).await;

        let err = state
            .aporte_service
            .create(luis, id_encuentro, None, dec("100"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MembersOnly));

        let err = state
            .aporte_service
            .create(ana, id_encuentro, Some(bolsillo_ajeno), dec("100"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EncuentroMismatch));
        assert_eq!(test_support::saldo_actual(&state, bolsillo_ajeno).await, Decimal::ZERO);

        // sin bolsillo el aporte queda solo en el encuentro
        let suelto = state
            .aporte_service
            .create(ana, id_encuentro, None, dec("100"))
            .await
            .unwrap();
        assert_eq!(suelto.id_bolsillo, None);

        test_support::invitar(&state, ana, id_encuentro, luis).await;
        let err = state
            .aporte_service
            .update_monto(luis, suelto.id, dec("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthorOnly));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn concurrent_contributions_serialize_on_the_pocket(pool: PgPool) {
        let state = test_support::state(pool);
        let ana = test_support::usuario(&state, "Ana").await;
        let id_encuentro = test_support::encuentro(&state, ana).await;
        let id_bolsillo = test_support::bolsillo(&state, ana, id_encuentro).await;

        let mut tareas = JoinSet::new();
        for _ in 0..10 {
            let service = state.aporte_service.clone();
            tareas.spawn(async move {
                service
                    .create(ana, id_encuentro, Some(id_bolsillo), dec("100.50"))
                    .await
            });
        }
        while let Some(resultado) = tareas.join_next().await {
            resultado.unwrap().unwrap();
        }

        assert_eq!(test_support::saldo_actual(&state, id_bolsillo).await, dec("1005.00"));
    }
}
