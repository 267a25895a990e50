// src/handlers/payment.rs

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::Role,
    models::company::{
        ModuleSetPatch, PaymentRecord, PlanTier, Subscription, SubscriptionStatus,
    },
    services::access,
};

// ---
// Payloads e respostas
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDuitNowPayload {
    // Ausente: mantém o plano corrente da assinatura.
    pub plan: Option<PlanTier>,
    // Módulos adicionais contratados junto com o plano.
    pub modules: Option<ModuleSetPatch>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuitNowQrResponse {
    // Data URL (PNG em base64) pronta para exibir.
    pub qr_code: String,
    pub reference: String,
    pub amount: Decimal,
    pub currency: String,
    pub expires_at: DateTime<Utc>,
    pub company: CompanyRef,
}

// O formato que o gateway envia no callback. Sem assinatura/HMAC: o
// endpoint confia no referenceNo (limitação herdada da integração).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCallbackPayload {
    #[validate(length(min = 1, message = "transactionId é obrigatório."))]
    pub transaction_id: String,

    pub amount: Decimal,

    #[validate(length(min = 1, message = "status é obrigatório."))]
    pub status: String,

    #[validate(length(min = 1, message = "referenceNo é obrigatório."))]
    pub reference_no: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallbackAck {
    pub activated: bool,
    pub subscription_status: SubscriptionStatus,
    pub payment_status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub subscription: Subscription,
    pub payment_details: PaymentRecord,
    pub is_active: bool,
}

// POST /api/payment/duitnow/generate
#[utoipa::path(
    post,
    path = "/api/payment/duitnow/generate",
    tag = "Payment",
    request_body = GenerateDuitNowPayload,
    responses(
        (status = 200, description = "QR DuitNow gerado; assinatura segue pendente", body = DuitNowQrResponse),
        (status = 403, description = "Apenas company-admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_duitnow(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<GenerateDuitNowPayload>,
) -> Result<Json<DuitNowQrResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    access::check_role(user.role, &[Role::Admin, Role::CompanyAdmin])?;

    let company = app_state.company_service.require_company(&user).await?;

    let plan = payload.plan.unwrap_or(company.subscription.plan);
    let modules = payload.modules.unwrap_or_default();

    let intent = app_state
        .payment_service
        .generate_intent(&company, plan, modules)
        .await?;

    Ok(Json(DuitNowQrResponse {
        qr_code: intent.qr_code,
        reference: intent.reference,
        amount: intent.amount,
        currency: "MYR".to_string(),
        expires_at: intent.expires_at,
        company: CompanyRef {
            id: intent.company.id,
            name: intent.company.name,
        },
    }))
}

// POST /api/payment/duitnow/verify
//
// Rota pública: é o gateway quem chama. Payload fora do formato é
// rejeitado sem mudar estado algum.
#[utoipa::path(
    post,
    path = "/api/payment/duitnow/verify",
    tag = "Payment",
    request_body = GatewayCallbackPayload,
    responses(
        (status = 200, description = "Callback processado (ativação, espelho de status ou replay)", body = CallbackAck),
        (status = 404, description = "Nenhuma empresa para esta referência")
    )
)]
pub async fn verify_duitnow(
    State(app_state): State<AppState>,
    Json(payload): Json<GatewayCallbackPayload>,
) -> Result<Json<CallbackAck>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .payment_service
        .handle_callback(
            &payload.transaction_id,
            payload.amount,
            &payload.status,
            &payload.reference_no,
        )
        .await?;

    Ok(Json(CallbackAck {
        activated: outcome.activated,
        subscription_status: outcome.company.subscription.status,
        payment_status: String::from(outcome.company.payment_details.status.clone()),
    }))
}

// GET /api/payment/status
#[utoipa::path(
    get,
    path = "/api/payment/status",
    tag = "Payment",
    responses(
        (status = 200, description = "Assinatura e último pagamento da empresa", body = PaymentStatusResponse),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn payment_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    let company = app_state.company_service.require_company(&user).await?;

    Ok(Json(PaymentStatusResponse {
        subscription: company.subscription.0.clone(),
        payment_details: company.payment_details.0.clone(),
        is_active: company.is_active,
    }))
}
