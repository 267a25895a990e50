// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::company::{PlanTier, SubscriptionStatus};

// Resumo exibido na visão geral da empresa.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub active_users: i64,
    pub plan: PlanTier,
    pub subscription_status: SubscriptionStatus,
    pub modules_enabled: Vec<String>,
    // Dias restantes na janela de validade, quando houver janela.
    pub days_remaining: Option<i64>,
}
