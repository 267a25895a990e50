// src/services/user_service.rs

use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{PermissionSet, Role, User},
    services::access,
};

// Payloads ficam junto dos handlers; o serviço recebe os campos já
// validados e aplica as regras de autorização explícitas.
#[derive(Debug)]
pub struct NewUserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub company_id: Option<Uuid>,
    pub phone: Option<String>,
    pub permissions: Option<PermissionSet>,
}

#[derive(Debug, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub permissions: Option<PermissionSet>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, pool: PgPool) -> Self {
        Self { user_repo, pool }
    }

    /// Lista usuários. Admin da plataforma enxerga qualquer empresa (ou
    /// todas, paginado); os demais só a própria.
    pub async fn list_users(
        &self,
        requester: &User,
        scope: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), AppError> {
        access::check_company_access(requester.role, requester.company_id, scope)?;

        if requester.role == Role::Admin {
            return match scope {
                Some(company_id) => {
                    let users = self.user_repo.find_by_company(company_id).await?;
                    let total = users.len() as i64;
                    Ok((users, total))
                }
                None => self.user_repo.find_all_paginated(limit, offset).await,
            };
        }

        let company_id = requester.company_id.ok_or(AppError::CompanyNotFound)?;
        let users = self.user_repo.find_by_company(company_id).await?;
        let total = users.len() as i64;
        Ok((users, total))
    }

    pub async fn get_user(&self, requester: &User, id: Uuid) -> Result<User, AppError> {
        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserRecordNotFound)?;

        access::check_company_access(requester.role, requester.company_id, user.company_id)?;
        Ok(user)
    }

    pub async fn create_user(
        &self,
        requester: &User,
        input: NewUserInput,
    ) -> Result<User, AppError> {
        access::check_role(requester.role, &[Role::Admin, Role::CompanyAdmin])?;

        let role = input.role.unwrap_or(Role::Staff);

        // Só o admin da plataforma cria outros admins da plataforma.
        if role == Role::Admin {
            access::check_role(requester.role, &[Role::Admin])?;
        }

        // Empresa de destino: a do solicitante, a menos que um admin da
        // plataforma aponte outra explicitamente.
        let company_id = if requester.role == Role::Admin {
            input.company_id
        } else {
            access::check_company_access(
                requester.role,
                requester.company_id,
                input.company_id,
            )?;
            requester.company_id
        };

        if role != Role::Admin && company_id.is_none() {
            return Err(AppError::CompanyNotFound);
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let password = input.password;
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let permissions = input
            .permissions
            .unwrap_or_else(|| role.default_permissions());

        self.user_repo
            .create_user(
                &self.pool,
                &input.first_name,
                &input.last_name,
                &input.email,
                &hashed_password,
                role,
                company_id,
                input.phone.as_deref(),
                &permissions,
            )
            .await
    }

    pub async fn update_user(
        &self,
        requester: &User,
        id: Uuid,
        patch: UserPatch,
    ) -> Result<User, AppError> {
        access::check_role(requester.role, &[Role::Admin, Role::CompanyAdmin])?;

        let target = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserRecordNotFound)?;

        access::check_company_access(requester.role, requester.company_id, target.company_id)?;

        // Promoção a admin da plataforma só por outro admin da plataforma.
        if patch.role == Some(Role::Admin) {
            access::check_role(requester.role, &[Role::Admin])?;
        }

        self.user_repo
            .update_user(
                id,
                patch.first_name.as_deref(),
                patch.last_name.as_deref(),
                patch.email.as_deref(),
                patch.role,
                patch.phone.as_deref(),
                patch.permissions.as_ref(),
                patch.is_active,
            )
            .await?
            .ok_or(AppError::UserRecordNotFound)
    }

    /// Soft delete. A própria conta nunca pode ser removida (regra fixa,
    /// verificada depois do papel e do escopo).
    pub async fn delete_user(&self, requester: &User, id: Uuid) -> Result<(), AppError> {
        access::check_role(requester.role, &[Role::Admin, Role::CompanyAdmin])?;

        let target = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserRecordNotFound)?;

        access::check_company_access(requester.role, requester.company_id, target.company_id)?;
        access::check_not_self_delete(requester.id, target.id)?;

        self.user_repo.soft_delete(target.id).await?;

        tracing::info!("🗑️ Usuário {} removido (soft delete).", target.id);
        Ok(())
    }
}
