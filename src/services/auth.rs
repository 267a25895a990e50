// src/services/auth.rs

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, UserRepository},
    models::auth::{AuthResponse, Claims, RegisterCompanyPayload, Role, User},
    models::company::{Company, Contact, PlanTier, Subscription, SubscriptionStatus},
    services::company_service::generate_tenant_id,
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    company_repo: CompanyRepository,
    jwt_secret: String,
    jwt_expiry_days: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        company_repo: CompanyRepository,
        jwt_secret: String,
        jwt_expiry_days: i64,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            company_repo,
            jwt_secret,
            jwt_expiry_days,
            pool,
        }
    }

    /// Registra uma empresa nova junto com o seu primeiro company-admin.
    /// A empresa nasce pendente: só o pagamento (ou um admin da
    /// plataforma) a ativa.
    pub async fn register_company(
        &self,
        payload: RegisterCompanyPayload,
    ) -> Result<AuthResponse, AppError> {
        // Unicidade de nome e e-mail verificada antes de abrir transação;
        // os índices parciais do banco seguram qualquer corrida restante.
        if self.company_repo.find_by_name(&payload.company_name).await?.is_some() {
            return Err(AppError::CompanyNameAlreadyExists);
        }
        if self.user_repo.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // Hashing fora da transação (não toca no banco e é caro).
        let password_clone = payload.password.clone();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let subscription = Subscription::initial(PlanTier::Basic);
        let tenant_id = generate_tenant_id();
        let contact = Contact {
            email: Some(payload.email.to_lowercase()),
            phone: payload.phone.clone(),
        };

        // Empresa + primeiro usuário na mesma transação: ou nascem os
        // dois, ou nenhum.
        let mut tx = self.pool.begin().await?;

        let company = self
            .company_repo
            .create(
                &mut *tx,
                &payload.company_name,
                &payload.business_type,
                payload.registration_number.as_deref(),
                payload.address.as_ref(),
                &contact,
                &subscription,
                &tenant_id,
            )
            .await?;

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.first_name,
                &payload.last_name,
                &payload.email,
                &hashed_password,
                Role::CompanyAdmin,
                Some(company.id),
                payload.phone.as_deref(),
                &Role::CompanyAdmin.default_permissions(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🏢 Empresa '{}' registrada (tenant {}), aguardando pagamento.",
            company.name,
            company.tenant_id
        );

        let token = self.issue_token(&user)?;
        Ok(AuthResponse {
            token,
            user,
            company: Some(company),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Conta desativada responde igual a credencial errada; o motivo
        // real fica no log.
        if !user.is_active {
            tracing::warn!("Login negado: usuário {} está desativado.", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Resolve a empresa do usuário. Empresa pendente ainda entra (o
        // admin precisa conseguir logar para pagar); suspensa não.
        let company = self.resolve_company(&user).await?;

        self.user_repo.update_last_login(user.id).await?;

        let token = self.issue_token(&user)?;
        Ok(AuthResponse { token, user, company })
    }

    /// Verifica o token e resolve o usuário. Usado pelo middleware em
    /// toda rota protegida.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = Self::decode_token(&self.jwt_secret, token)?;

        // find_by_id filtra is_deleted: token de usuário removido morre
        // aqui, mesmo estando criptograficamente válido.
        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.is_active {
            return Err(AppError::UserInactive);
        }

        Ok(user)
    }

    /// Empresa do usuário para a resposta de login/me. Admin da
    /// plataforma não tem empresa e retorna None.
    pub async fn resolve_company(&self, user: &User) -> Result<Option<Company>, AppError> {
        let Some(company_id) = user.company_id else {
            return Ok(None);
        };

        let company = self
            .company_repo
            .find_by_id(company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        if company.subscription.status == SubscriptionStatus::Suspended {
            return Err(AppError::CompanyInactive);
        }

        Ok(Some(company))
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        Self::encode_token(&self.jwt_secret, self.jwt_expiry_days, user)
    }

    // Emissão/verificação como funções associadas puras: testáveis sem
    // repositório ou banco.
    pub(crate) fn encode_token(
        secret: &str,
        expiry_days: i64,
        user: &User,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(expiry_days);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            company_id: user.company_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )?)
    }

    pub(crate) fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn usuario_de_teste(role: Role, company_id: Option<Uuid>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            email: "ana@acme.test".to_string(),
            password_hash: "x".to_string(),
            role,
            company_id,
            is_active: true,
            is_deleted: false,
            last_login: None,
            phone: None,
            permissions: Json(role.default_permissions()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_roundtrip_preserva_identidade_papel_e_empresa() {
        let company_id = Uuid::new_v4();
        let user = usuario_de_teste(Role::CompanyAdmin, Some(company_id));

        let token = AuthService::encode_token("segredo-de-teste", 7, &user).unwrap();
        let claims = AuthService::decode_token("segredo-de-teste", &token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::CompanyAdmin);
        assert_eq!(claims.company_id, Some(company_id));
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        let user = usuario_de_teste(Role::Staff, Some(Uuid::new_v4()));

        // Emitido com validade negativa: exp já passou (além da folga
        // padrão de 60s do validador).
        let token = AuthService::encode_token("segredo-de-teste", -1, &user).unwrap();
        let result = AuthService::decode_token("segredo-de-teste", &token);

        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn token_com_segredo_errado_e_rejeitado() {
        let user = usuario_de_teste(Role::Viewer, None);

        let token = AuthService::encode_token("segredo-a", 7, &user).unwrap();
        let result = AuthService::decode_token("segredo-b", &token);

        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn hash_de_senha_verifica_por_rehash() {
        // Custo baixo no teste; produção usa DEFAULT_COST (12).
        let hashed = hash("secret1", 4).unwrap();
        assert!(verify("secret1", &hashed).unwrap());
        assert!(!verify("errada", &hashed).unwrap());
    }
}
