// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::common::error::AppError;

// A empresa-alvo opcional de uma operação, vinda do query param
// `companyId`. Ausente significa operação auto-escopada ("minha
// empresa"); a decisão de acesso em si fica em services::access.
#[derive(Debug, Clone, Copy)]
pub struct CompanyScope(pub Option<Uuid>);

#[derive(Debug, Deserialize)]
struct ScopeParams {
    #[serde(rename = "companyId")]
    company_id: Option<Uuid>,
}

impl<S> FromRequestParts<S> for CompanyScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<ScopeParams>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::InvalidCompanyScope)?;

        Ok(CompanyScope(params.company_id))
    }
}
