// src/services/company_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    models::company::{Company, ModuleSetPatch, PlanTier, SubscriptionStatus},
    models::auth::User,
};

/// Identificador externo do tenant, gerado uma única vez no registro.
pub fn generate_tenant_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("tenant_{}_{}", Utc::now().timestamp_millis(), &suffix[..9])
}

/// Uma empresa suspensa não pode ser usada por ninguém dela.
/// Pendente ainda pode: o admin precisa logar para concluir o pagamento.
pub fn ensure_usable(company: &Company) -> Result<(), AppError> {
    if company.subscription.status == SubscriptionStatus::Suspended {
        return Err(AppError::CompanyInactive);
    }
    Ok(())
}

/// Operações de módulo de negócio exigem assinatura ativa de verdade.
pub fn ensure_active_subscription(company: &Company) -> Result<(), AppError> {
    if company.subscription.status != SubscriptionStatus::Active {
        return Err(AppError::SubscriptionNotActive);
    }
    Ok(())
}

#[derive(Clone)]
pub struct CompanyService {
    company_repo: CompanyRepository,
}

impl CompanyService {
    pub fn new(company_repo: CompanyRepository) -> Self {
        Self { company_repo }
    }

    /// Resolve a empresa do usuário e garante que ela está utilizável.
    /// Chamado a cada requisição com escopo de empresa; nunca cacheado
    /// entre requisições (o estado pode mudar no meio de uma sessão).
    pub async fn require_company(&self, user: &User) -> Result<Company, AppError> {
        let company_id = user.company_id.ok_or(AppError::CompanyNotFound)?;

        let company = self
            .company_repo
            .find_by_id(company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        ensure_usable(&company)?;
        Ok(company)
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, AppError> {
        self.company_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    pub async fn list_companies(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Company>, i64), AppError> {
        self.company_repo.find_all_paginated(limit, offset).await
    }

    /// Ativação manual (admin da plataforma): janela curta de 30 dias.
    pub async fn activate_company(&self, id: Uuid) -> Result<Company, AppError> {
        let company = self.get_company(id).await?;
        let subscription = company.subscription.activate_by_admin(Utc::now());

        let updated = self
            .company_repo
            .set_subscription_state(id, &subscription, subscription.is_company_active(), None)
            .await?;

        tracing::info!("✅ Empresa {} ativada manualmente.", updated.name);
        Ok(updated)
    }

    /// Suspensão administrativa. Módulos e janela ficam como estão.
    pub async fn suspend_company(&self, id: Uuid) -> Result<Company, AppError> {
        let company = self.get_company(id).await?;
        let subscription = company.subscription.suspend();

        let updated = self
            .company_repo
            .set_subscription_state(id, &subscription, subscription.is_company_active(), None)
            .await?;

        tracing::info!("⛔ Empresa {} suspensa.", updated.name);
        Ok(updated)
    }

    /// Edição administrativa de plano/módulos (merge, sem mudar status).
    pub async fn update_subscription(
        &self,
        id: Uuid,
        plan: Option<PlanTier>,
        modules: Option<ModuleSetPatch>,
    ) -> Result<Company, AppError> {
        let company = self.get_company(id).await?;

        let merged_modules = modules.map(|patch| company.subscription.modules.merged(&patch));
        let subscription = company
            .subscription
            .with_plan_and_modules(plan, merged_modules);

        self.company_repo
            .set_subscription_state(id, &subscription, subscription.is_company_active(), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;
    use crate::models::company::{Contact, PaymentRecord, Subscription};

    fn empresa_com(subscription: Subscription) -> Company {
        let now = Utc::now();
        let is_active = subscription.is_company_active();
        Company {
            id: Uuid::new_v4(),
            name: "Acme Laundry".to_string(),
            business_type: "laundry".to_string(),
            registration_number: None,
            address: None,
            contact: Json(Contact::default()),
            subscription: Json(subscription),
            tenant_id: generate_tenant_id(),
            is_active,
            is_deleted: false,
            payment_details: Json(PaymentRecord::default()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn tenant_id_gerado_tem_o_formato_esperado() {
        let a = generate_tenant_id();
        let b = generate_tenant_id();
        assert!(a.starts_with("tenant_"));
        assert_ne!(a, b);
    }

    #[test]
    fn empresa_pendente_e_utilizavel_mas_sem_assinatura_ativa() {
        // O admin de uma empresa recém-registrada precisa conseguir logar
        // para pagar; só as operações de módulo de negócio ficam barradas.
        let pendente = empresa_com(Subscription::initial(PlanTier::Basic));

        assert!(ensure_usable(&pendente).is_ok());
        assert!(matches!(
            ensure_active_subscription(&pendente),
            Err(AppError::SubscriptionNotActive)
        ));
    }

    #[test]
    fn empresa_suspensa_e_barrada_na_resolucao() {
        let suspensa = empresa_com(
            Subscription::initial(PlanTier::Basic)
                .activate_by_admin(Utc::now())
                .suspend(),
        );

        assert!(matches!(
            ensure_usable(&suspensa),
            Err(AppError::CompanyInactive)
        ));
    }

    #[test]
    fn empresa_ativa_passa_nas_duas_verificacoes() {
        let ativa =
            empresa_com(Subscription::initial(PlanTier::Basic).activate_by_admin(Utc::now()));

        assert!(ensure_usable(&ativa).is_ok());
        assert!(ensure_active_subscription(&ativa).is_ok());
    }
}
