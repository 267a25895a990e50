// src/models/auth.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::company::Address;

// Conjunto esparso de capacidades nomeadas (ex: "pos_access" -> true).
// Fica em JSONB no banco, mas o padrão por papel é sempre construído
// pelo `match` exaustivo em `Role::default_permissions`.
pub type PermissionSet = BTreeMap<String, bool>;

// ---
// 1. Papéis (Roles)
// ---
// Enumeração fechada: adicionar um papel novo é uma mudança visível em
// tempo de compilação, não um fallthrough de string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    // O operador da plataforma. Não pertence a empresa nenhuma.
    Admin,
    // O administrador de uma empresa (primeiro usuário criado no registro).
    CompanyAdmin,
    Staff,
    Viewer,
}

impl Role {
    /// Permissões padrão concedidas na criação de um usuário deste papel.
    pub fn default_permissions(&self) -> PermissionSet {
        let granted: &[&str] = match self {
            Role::Admin | Role::CompanyAdmin => &[
                "pos_access",
                "pos_create_transaction",
                "pos_edit_transaction",
                "pos_delete_transaction",
                "inventory_access",
                "inventory_create",
                "inventory_edit",
                "inventory_delete",
                "reports_access",
                "reports_generate",
                "users_manage",
            ],
            Role::Staff => &[
                "pos_access",
                "pos_create_transaction",
                "inventory_access",
                "reports_access",
            ],
            Role::Viewer => &["reports_access"],
        };

        granted.iter().map(|p| (p.to_string(), true)).collect()
    }
}

// ---
// 2. Usuário
// ---
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,

    // NULL apenas para o admin da plataforma.
    pub company_id: Option<Uuid>,

    pub is_active: bool,
    pub is_deleted: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub phone: Option<String>,

    #[schema(value_type = Object)]
    pub permissions: Json<PermissionSet>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,                // ID do usuário
    pub role: Role,               // Papel no momento da emissão
    pub company_id: Option<Uuid>, // Empresa do usuário
    pub exp: usize,               // Expiration time
    pub iat: usize,               // Issued At
}

// ---
// 3. Payloads e respostas
// ---

// Registro de empresa: cria a empresa (pendente) e o primeiro company-admin.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompanyPayload {
    #[validate(length(min = 1, message = "O nome da empresa é obrigatório."))]
    pub company_name: String,

    #[validate(length(min = 1, message = "O tipo de negócio é obrigatório."))]
    pub business_type: String,

    pub registration_number: Option<String>,

    #[validate(length(min = 1, message = "O primeiro nome é obrigatório."))]
    pub first_name: String,

    #[validate(length(min = 1, message = "O sobrenome é obrigatório."))]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub phone: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação: token + usuário + empresa (quando houver).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub company: Option<crate::models::company::Company>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn papeis_tem_permissoes_padrao_exaustivas() {
        let admin = Role::Admin.default_permissions();
        let company_admin = Role::CompanyAdmin.default_permissions();
        let staff = Role::Staff.default_permissions();
        let viewer = Role::Viewer.default_permissions();

        assert_eq!(admin, company_admin);
        assert_eq!(admin.get("users_manage"), Some(&true));
        assert_eq!(staff.get("users_manage"), None);
        assert_eq!(staff.get("pos_access"), Some(&true));
        assert_eq!(viewer.len(), 1);
        assert_eq!(viewer.get("reports_access"), Some(&true));
    }

    #[test]
    fn papel_serializa_no_formato_da_api() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Role::CompanyAdmin).unwrap(),
            "\"company-admin\""
        );
        let parsed: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(parsed, Role::Viewer);
    }
}
