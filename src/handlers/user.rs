// src/handlers/user.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::company::{Pagination, PaginationMeta},
    middleware::{auth::AuthenticatedUser, tenancy::CompanyScope},
    models::auth::{PermissionSet, Role, User},
    services::user_service::{NewUserInput, UserPatch},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "O primeiro nome é obrigatório."))]
    pub first_name: String,

    #[validate(length(min = 1, message = "O sobrenome é obrigatório."))]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub role: Option<Role>,

    // Apenas o admin da plataforma pode apontar outra empresa.
    pub company_id: Option<Uuid>,

    pub phone: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub permissions: Option<PermissionSet>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub role: Option<Role>,
    pub phone: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub permissions: Option<PermissionSet>,

    pub is_active: Option<bool>,
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(
        ("companyId" = Option<Uuid>, Query, description = "Empresa-alvo (apenas admin da plataforma)"),
        ("page" = Option<i64>, Query, description = "Página (1-based)"),
        ("limit" = Option<i64>, Query, description = "Itens por página")
    ),
    responses(
        (status = 200, description = "Usuários visíveis para o solicitante", body = UserListResponse),
        (status = 403, description = "Acesso a outra empresa negado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: CompanyScope,
    Query(pagination): Query<Pagination>,
) -> Result<Json<UserListResponse>, AppError> {
    let (users, total) = app_state
        .user_service
        .list_users(&user, scope.0, pagination.limit, pagination.offset())
        .await?;

    Ok(Json(UserListResponse {
        users,
        pagination: PaginationMeta::new(&pagination, total),
    }))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 403, description = "Papel insuficiente"),
        (status = 409, description = "E-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let created = app_state
        .user_service
        .create_user(
            &user,
            NewUserInput {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                password: payload.password,
                role: payload.role,
                company_id: payload.company_id,
                phone: payload.phone,
                permissions: payload.permissions,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 403, description = "Acesso a outra empresa negado"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let found = app_state.user_service.get_user(&user, id).await?;
    Ok(Json(found))
}

// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 403, description = "Papel insuficiente ou outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let updated = app_state
        .user_service
        .update_user(
            &user,
            id,
            UserPatch {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                role: payload.role,
                phone: payload.phone,
                permissions: payload.permissions,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(updated))
}

// DELETE /api/users/{id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário removido (soft delete)"),
        (status = 400, description = "Remoção da própria conta negada"),
        (status = 403, description = "Papel insuficiente ou outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.user_service.delete_user(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
