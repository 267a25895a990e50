// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{CompanyRepository, UserRepository},
    services::{
        auth::AuthService, company_service::CompanyService,
        dashboard_service::DashboardService, payment_service::PaymentService,
        user_service::UserService,
    },
};

// Validade padrão do token quando JWT_EXPIRY_DAYS não é definida.
const DEFAULT_JWT_EXPIRY_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub bind_addr: String,
    pub auth_service: AuthService,
    pub company_service: CompanyService,
    pub user_service: UserService,
    pub payment_service: PaymentService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    // Carrega a configuração e monta o gráfico de dependências.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let jwt_expiry_days = env::var("JWT_EXPIRY_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_JWT_EXPIRY_DAYS);

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            company_repo.clone(),
            jwt_secret,
            jwt_expiry_days,
            db_pool.clone(),
        );
        let company_service = CompanyService::new(company_repo.clone());
        let user_service = UserService::new(user_repo.clone(), db_pool.clone());
        let payment_service = PaymentService::new(company_repo);
        let dashboard_service = DashboardService::new(user_repo);

        Ok(Self {
            db_pool,
            bind_addr,
            auth_service,
            company_service,
            user_service,
            payment_service,
            dashboard_service,
        })
    }
}
