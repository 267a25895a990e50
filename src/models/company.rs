// src/models/company.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Enums do ciclo de vida da assinatura
// ---

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Basic,
    Standard,
    Premium,
    Enterprise,
}

// Obs: o frontend exibe também um valor "cancelled", mas o backend nunca
// transiciona para ele; aqui ele não existe como estado.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Pending,
    Active,
    Suspended,
}

// Status do último pagamento. O gateway pode reportar qualquer string;
// tudo que não for "pending"/"completed" é espelhado em minúsculas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Gateway(String),
}

impl PaymentStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, PaymentStatus::Completed)
    }
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "completed" => PaymentStatus::Completed,
            other => PaymentStatus::Gateway(other.to_string()),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => "pending".to_string(),
            PaymentStatus::Completed => "completed".to_string(),
            PaymentStatus::Gateway(other) => other,
        }
    }
}

// ---
// 2. Módulos contratáveis
// ---
// Os oito módulos que uma empresa pode habilitar. Campos fixos em vez de
// um mapa livre: chave desconhecida é erro de desserialização no boundary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleSet {
    pub pos: bool,
    pub inventory: bool,
    pub laundry: bool,
    pub services: bool,
    pub coupons: bool,
    pub wallet: bool,
    pub reports: bool,
    pub viewer_access: bool,
}

// Patch parcial enviado pela API (só as chaves presentes são alteradas).
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleSetPatch {
    pub pos: Option<bool>,
    pub inventory: Option<bool>,
    pub laundry: Option<bool>,
    pub services: Option<bool>,
    pub coupons: Option<bool>,
    pub wallet: Option<bool>,
    pub reports: Option<bool>,
    pub viewer_access: Option<bool>,
}

impl ModuleSet {
    /// Aplica um patch parcial, retornando o conjunto resultante.
    pub fn merged(&self, patch: &ModuleSetPatch) -> ModuleSet {
        ModuleSet {
            pos: patch.pos.unwrap_or(self.pos),
            inventory: patch.inventory.unwrap_or(self.inventory),
            laundry: patch.laundry.unwrap_or(self.laundry),
            services: patch.services.unwrap_or(self.services),
            coupons: patch.coupons.unwrap_or(self.coupons),
            wallet: patch.wallet.unwrap_or(self.wallet),
            reports: patch.reports.unwrap_or(self.reports),
            viewer_access: patch.viewer_access.unwrap_or(self.viewer_access),
        }
    }

    /// Nomes dos módulos habilitados (para o dashboard).
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.pos {
            out.push("pos");
        }
        if self.inventory {
            out.push("inventory");
        }
        if self.laundry {
            out.push("laundry");
        }
        if self.services {
            out.push("services");
        }
        if self.coupons {
            out.push("coupons");
        }
        if self.wallet {
            out.push("wallet");
        }
        if self.reports {
            out.push("reports");
        }
        if self.viewer_access {
            out.push("viewerAccess");
        }
        out
    }
}

// ---
// 3. Assinatura e registro de pagamento
// ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscription {
    pub plan: PlanTier,
    pub status: SubscriptionStatus,
    pub modules: ModuleSet,
    // Janela de validade: presente apenas depois da primeira ativação.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentRecord {
    // Referência DuitNow gravada quando a intenção de pagamento é gerada.
    pub reference: Option<String>,
    pub transaction_id: Option<String>,
    pub amount: Option<Decimal>,

    #[schema(value_type = String)]
    pub status: PaymentStatus,

    pub method: Option<String>,

    // O plano e os módulos escolhidos ao gerar a intenção; aplicados à
    // assinatura quando o gateway confirma o pagamento.
    pub plan: Option<PlanTier>,
    pub modules: Option<ModuleSet>,

    pub generated_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

// ---
// 4. Dados de contato / endereço
// ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

// ---
// 5. Empresa (o tenant)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub business_type: String,
    pub registration_number: Option<String>,

    #[schema(value_type = Option<Address>)]
    pub address: Option<Json<Address>>,

    #[schema(value_type = Contact)]
    pub contact: Json<Contact>,

    #[schema(value_type = Subscription)]
    pub subscription: Json<Subscription>,

    // Identificador externo do tenant; gerado no registro, nunca muda.
    pub tenant_id: String,

    // Espelho booleano de `subscription.status == active`. As escritas
    // sempre derivam este campo da assinatura no mesmo UPDATE.
    pub is_active: bool,
    pub is_deleted: bool,

    #[schema(value_type = PaymentRecord)]
    pub payment_details: Json<PaymentRecord>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_de_pagamento_espelha_gateway_em_minusculas() {
        assert_eq!(PaymentStatus::from("PENDING".to_string()), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from("Completed".to_string()), PaymentStatus::Completed);
        assert_eq!(
            PaymentStatus::from("FAILED".to_string()),
            PaymentStatus::Gateway("failed".to_string())
        );

        let roundtrip: String = PaymentStatus::Gateway("failed".to_string()).into();
        assert_eq!(roundtrip, "failed");
    }

    #[test]
    fn assinatura_vazia_no_banco_vira_padrao_pendente() {
        // Linhas antigas podem carregar '{}' no JSONB; o default precisa valer.
        let sub: Subscription = serde_json::from_str("{}").unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert_eq!(sub.plan, PlanTier::Basic);
        assert!(sub.start_date.is_none());
    }

    #[test]
    fn patch_de_modulos_altera_apenas_chaves_presentes() {
        let base = ModuleSet {
            reports: true,
            viewer_access: true,
            ..ModuleSet::default()
        };
        let patch = ModuleSetPatch {
            pos: Some(true),
            reports: Some(false),
            ..ModuleSetPatch::default()
        };

        let merged = base.merged(&patch);
        assert!(merged.pos);
        assert!(!merged.reports);
        assert!(merged.viewer_access); // não tocado
        assert!(!merged.inventory);
    }
}
