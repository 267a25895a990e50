// src/handlers/company.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::Role,
    models::company::{Company, ModuleSetPatch, PlanTier},
    services::access,
};

// ---
// Paginação (compartilhada com a listagem de usuários)
// ---

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.limit
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total: i64) -> Self {
        let limit = pagination.limit.max(1);
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListResponse {
    pub companies: Vec<Company>,
    pub pagination: PaginationMeta,
}

// Edição administrativa da assinatura (merge de plano/módulos).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionPayload {
    pub plan: Option<PlanTier>,
    pub modules: Option<ModuleSetPatch>,
}

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    params(
        ("page" = Option<i64>, Query, description = "Página (1-based)"),
        ("limit" = Option<i64>, Query, description = "Itens por página")
    ),
    responses(
        (status = 200, description = "Todas as empresas (visão do admin)", body = CompanyListResponse),
        (status = 403, description = "Apenas admin da plataforma")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<CompanyListResponse>, AppError> {
    access::check_role(user.role, &[Role::Admin])?;

    let (companies, total) = app_state
        .company_service
        .list_companies(pagination.limit, pagination.offset())
        .await?;

    Ok(Json(CompanyListResponse {
        companies,
        pagination: PaginationMeta::new(&pagination, total),
    }))
}

// GET /api/companies/my
#[utoipa::path(
    get,
    path = "/api/companies/my",
    tag = "Companies",
    responses(
        (status = 200, description = "A empresa do usuário autenticado", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_company(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Company>, AppError> {
    let company = app_state.company_service.require_company(&user).await?;
    Ok(Json(company))
}

// GET /api/companies/{id}
#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    access::check_role(user.role, &[Role::Admin])?;

    let company = app_state.company_service.get_company(id).await?;
    Ok(Json(company))
}

// PUT /api/companies/{id}/activate
#[utoipa::path(
    put,
    path = "/api/companies/{id}/activate",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa ativada (janela manual de 30 dias)", body = Company),
        (status = 403, description = "Apenas admin da plataforma")
    ),
    security(("api_jwt" = []))
)]
pub async fn activate_company(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    access::check_role(user.role, &[Role::Admin])?;

    let company = app_state.company_service.activate_company(id).await?;
    Ok(Json(company))
}

// PUT /api/companies/{id}/deactivate
#[utoipa::path(
    put,
    path = "/api/companies/{id}/deactivate",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa suspensa", body = Company),
        (status = 403, description = "Apenas admin da plataforma")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_company(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    access::check_role(user.role, &[Role::Admin])?;

    let company = app_state.company_service.suspend_company(id).await?;
    Ok(Json(company))
}

// PUT /api/companies/{id}/subscription
#[utoipa::path(
    put,
    path = "/api/companies/{id}/subscription",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    request_body = UpdateSubscriptionPayload,
    responses(
        (status = 200, description = "Assinatura atualizada", body = Company),
        (status = 403, description = "Apenas admin da plataforma")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_subscription(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubscriptionPayload>,
) -> Result<Json<Company>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    access::check_role(user.role, &[Role::Admin])?;

    let company = app_state
        .company_service
        .update_subscription(id, payload.plan, payload.modules)
        .await?;

    Ok(Json(company))
}
