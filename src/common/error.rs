// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Autenticação ---
    // As quatro variantes abaixo viram o MESMO corpo 401 genérico na
    // resposta; a causa específica só aparece no log.
    #[error("Token ausente")]
    MissingToken,

    #[error("Token inválido ou expirado")]
    InvalidToken,

    #[error("Usuário do token não encontrado")]
    UserNotFound,

    #[error("Usuário desativado ou removido")]
    UserInactive,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    // --- Autorização ---
    #[error("Acesso a outra empresa negado")]
    CrossCompanyAccess,

    #[error("Papel insuficiente para esta operação")]
    InsufficientRole,

    #[error("Usuário não pode remover a própria conta")]
    SelfDeleteForbidden,

    // Alvo de uma operação de gestão de usuários (distinto de
    // `UserNotFound`, que pertence à autenticação e vira 401 genérico).
    #[error("Registro de usuário não encontrado")]
    UserRecordNotFound,

    // --- Estado do tenant ---
    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Empresa suspensa")]
    CompanyInactive,

    #[error("Assinatura não está ativa")]
    SubscriptionNotActive,

    // --- Conflitos ---
    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Nome de empresa já existe")]
    CompanyNameAlreadyExists,

    #[error("Violação de chave única: {0}")]
    UniqueConstraintViolation(String),

    // --- Callback do gateway ---
    #[error("Nenhuma empresa corresponde à referência de pagamento")]
    UnmatchedPaymentReference,

    #[error("Parâmetro companyId inválido")]
    InvalidCompanyScope,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // As falhas de credencial são indistinguíveis de fora: mesma
            // resposta para token ausente, inválido, usuário sumido ou
            // desativado. O motivo real fica só no log.
            ref e @ (AppError::MissingToken
            | AppError::InvalidToken
            | AppError::UserNotFound
            | AppError::UserInactive) => {
                tracing::warn!("Falha de autenticação: {}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    "Token de autenticação inválido ou ausente.",
                )
            }

            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.")
            }

            AppError::CrossCompanyAccess => (
                StatusCode::FORBIDDEN,
                "Acesso negado: esta operação pertence a outra empresa.",
            ),
            AppError::InsufficientRole => (
                StatusCode::FORBIDDEN,
                "Acesso negado: seu papel não permite esta operação.",
            ),
            AppError::SelfDeleteForbidden => (
                StatusCode::BAD_REQUEST,
                "Você não pode remover a sua própria conta.",
            ),

            AppError::UserRecordNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.")
            }
            AppError::CompanyNotFound => (StatusCode::NOT_FOUND, "Empresa não encontrada."),
            AppError::CompanyInactive => (
                StatusCode::FORBIDDEN,
                "A conta da empresa está suspensa. Contate o suporte.",
            ),
            AppError::SubscriptionNotActive => (
                StatusCode::FORBIDDEN,
                "A assinatura da empresa não está ativa. Conclua o pagamento.",
            ),

            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.")
            }
            AppError::CompanyNameAlreadyExists => (
                StatusCode::CONFLICT,
                "Já existe uma empresa com este nome.",
            ),
            AppError::UniqueConstraintViolation(_) => {
                (StatusCode::CONFLICT, "Registro duplicado.")
            }

            AppError::UnmatchedPaymentReference => (
                StatusCode::NOT_FOUND,
                "Nenhuma empresa corresponde a esta transação.",
            ),
            AppError::InvalidCompanyScope => (
                StatusCode::BAD_REQUEST,
                "Parâmetro companyId inválido (não é um UUID).",
            ),

            // Todos os outros erros (DatabaseError, InternalServerError...)
            // viram 500 sem vazar detalhe interno para o cliente.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
