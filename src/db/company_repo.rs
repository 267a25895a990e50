// src/db/company_repo.rs

use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::company::{Address, Company, Contact, PaymentRecord, Subscription},
};

// Repositório das empresas (tenants). Regra central deste arquivo: toda
// mudança de estado de assinatura escreve (subscription, is_active,
// payment_details) em UM único UPDATE, nunca em escritas sequenciais —
// um leitor concorrente jamais observa o par flag/status em desacordo.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let maybe = sqlx::query_as::<_, Company>(
            r#"
            SELECT * FROM companies
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    pub async fn find_by_tenant_id(&self, tenant_id: &str) -> Result<Option<Company>, AppError> {
        let maybe = sqlx::query_as::<_, Company>(
            r#"
            SELECT * FROM companies
            WHERE tenant_id = $1 AND is_deleted = false
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Company>, AppError> {
        let maybe = sqlx::query_as::<_, Company>(
            r#"
            SELECT * FROM companies
            WHERE lower(name) = lower($1) AND is_deleted = false
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    // O callback do gateway só conhece a referência DuitNow; a busca é
    // pelo campo gravado dentro de payment_details.
    pub async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Company>, AppError> {
        let maybe = sqlx::query_as::<_, Company>(
            r#"
            SELECT * FROM companies
            WHERE payment_details ->> 'reference' = $1 AND is_deleted = false
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    pub async fn find_all_paginated(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Company>, i64), AppError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT * FROM companies
            WHERE is_deleted = false
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM companies WHERE is_deleted = false")
                .fetch_one(&self.pool)
                .await?;

        Ok((companies, total))
    }

    // Cria uma nova empresa (nasce pendente, aguardando pagamento).
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        business_type: &str,
        registration_number: Option<&str>,
        address: Option<&Address>,
        contact: &Contact,
        subscription: &Subscription,
        tenant_id: &str,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                name, business_type, registration_number,
                address, contact, subscription, tenant_id, payment_details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(business_type)
        .bind(registration_number)
        .bind(address.map(Json))
        .bind(Json(contact))
        .bind(Json(subscription))
        .bind(tenant_id)
        .bind(Json(PaymentRecord::default()))
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    if let Some(constraint) = db_err.constraint() {
                        return match constraint {
                            "companies_name_active_key" => AppError::CompanyNameAlreadyExists,
                            _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                        };
                    }
                }
            }
            e.into()
        })?;

        Ok(company)
    }

    /// Aplica um novo estado de assinatura em uma única escrita atômica.
    /// `is_active` é sempre derivado pelo chamador de `subscription.status`,
    /// então flag e status nunca divergem dentro da linha.
    pub async fn set_subscription_state(
        &self,
        id: Uuid,
        subscription: &Subscription,
        is_active: bool,
        payment: Option<&PaymentRecord>,
    ) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                subscription = $2,
                is_active = $3,
                payment_details = COALESCE($4, payment_details),
                updated_at = now()
            WHERE id = $1 AND is_deleted = false
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(subscription))
        .bind(is_active)
        .bind(payment.map(Json))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::CompanyNotFound)?;

        Ok(company)
    }

    /// Conclusão de pagamento condicionada: só escreve se o pagamento da
    /// linha ainda não estiver 'completed'. Dois callbacks concorrentes
    /// serializam na linha e o perdedor recebe `None` (replay idempotente).
    pub async fn complete_pending_payment(
        &self,
        id: Uuid,
        subscription: &Subscription,
        payment: &PaymentRecord,
    ) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                subscription = $2,
                is_active = true,
                payment_details = $3,
                updated_at = now()
            WHERE id = $1
              AND is_deleted = false
              AND payment_details ->> 'status' IS DISTINCT FROM 'completed'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(subscription))
        .bind(Json(payment))
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    // Atualiza apenas o registro de pagamento (status do gateway, intenção
    // de pagamento gerada). A assinatura não é tocada.
    pub async fn set_payment_details(
        &self,
        id: Uuid,
        payment: &PaymentRecord,
    ) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                payment_details = $2,
                updated_at = now()
            WHERE id = $1 AND is_deleted = false
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(payment))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::CompanyNotFound)?;

        Ok(company)
    }
}
