// src/services/dashboard_service.rs

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::company::Company,
    models::dashboard::DashboardStats,
};

#[derive(Clone)]
pub struct DashboardService {
    user_repo: UserRepository,
}

impl DashboardService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Resumo da empresa para a visão geral: contagens reais de usuários
    /// e o retrato da assinatura vigente.
    pub async fn get_stats(&self, company: &Company) -> Result<DashboardStats, AppError> {
        let total_users = self.user_repo.count_by_company(company.id).await?;
        let active_users = self.user_repo.count_active_by_company(company.id).await?;

        let days_remaining = company
            .subscription
            .end_date
            .map(|end| (end - Utc::now()).num_days());

        Ok(DashboardStats {
            total_users,
            active_users,
            plan: company.subscription.plan,
            subscription_status: company.subscription.status,
            modules_enabled: company
                .subscription
                .modules
                .enabled()
                .into_iter()
                .map(str::to_string)
                .collect(),
            days_remaining,
        })
    }
}
