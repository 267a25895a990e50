// src/db/user_repo.rs

use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{PermissionSet, Role, User},
};

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users'. Toda consulta filtra is_deleted = false: um usuário
// removido (soft delete) nunca volta a aparecer, nem para autenticação.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE lower(email) = lower($1) AND is_deleted = false
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Lista os usuários de uma empresa
    pub async fn find_by_company(&self, company_id: Uuid) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE company_id = $1 AND is_deleted = false
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // Lista paginada de todos os usuários (visão do admin da plataforma)
    pub async fn find_all_paginated(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
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
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_deleted = false")
                .fetch_one(&self.pool)
                .await?;

        Ok((users, total))
    }

    pub async fn count_by_company(&self, company_id: Uuid) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE company_id = $1 AND is_deleted = false",
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn count_active_by_company(&self, company_id: Uuid) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE company_id = $1 AND is_deleted = false AND is_active = true
            "#,
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    // Cria um novo usuário no banco de dados, com tratamento de erro
    // específico para e-mails duplicados.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        company_id: Option<Uuid>,
        phone: Option<&str>,
        permissions: &PermissionSet,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                first_name, last_name, email, password_hash,
                role, company_id, phone, permissions
            )
            VALUES ($1, $2, lower($3), $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(company_id)
        .bind(phone)
        .bind(Json(permissions))
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    if let Some(constraint) = db_err.constraint() {
                        return match constraint {
                            // O índice parcial criado na migration
                            "users_email_key" => AppError::EmailAlreadyExists,
                            _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                        };
                    }
                }
            }
            e.into()
        })?;

        Ok(user)
    }

    // Atualização parcial: campos ausentes ($ = NULL) mantêm o valor atual.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_user(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        role: Option<Role>,
        phone: Option<&str>,
        permissions: Option<&PermissionSet>,
        is_active: Option<bool>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                role = COALESCE($5, role),
                phone = COALESCE($6, phone),
                permissions = COALESCE($7, permissions),
                is_active = COALESCE($8, is_active),
                updated_at = now()
            WHERE id = $1 AND is_deleted = false
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(role)
        .bind(phone)
        .bind(permissions.map(Json))
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })?;

        Ok(user)
    }

    // Soft delete: o registro fica, mas sai de todas as consultas.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET is_deleted = true, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
