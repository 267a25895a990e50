// src/handlers/dashboard.rs

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::CompanyScope},
    models::auth::Role,
    models::dashboard::DashboardStats,
    services::{access, company_service},
};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    params(
        ("companyId" = Option<Uuid>, Query, description = "Empresa-alvo (apenas admin da plataforma)")
    ),
    responses(
        (status = 200, description = "Resumo da empresa", body = DashboardStats),
        (status = 403, description = "Assinatura não ativa ou outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: CompanyScope,
) -> Result<Json<DashboardStats>, AppError> {
    access::check_company_access(user.role, user.company_id, scope.0)?;

    let company = match (user.role, scope.0) {
        (Role::Admin, Some(target)) => app_state.company_service.get_company(target).await?,
        _ => app_state.company_service.require_company(&user).await?,
    };

    // Dados de módulo de negócio só com assinatura ativa de verdade;
    // empresa pendente recebe o erro que manda concluir o pagamento.
    company_service::ensure_active_subscription(&company)?;

    let stats = app_state.dashboard_service.get_stats(&company).await?;
    Ok(Json(stats))
}
