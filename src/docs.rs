// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register_company,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Companies ---
        handlers::company::list_companies,
        handlers::company::get_my_company,
        handlers::company::get_company,
        handlers::company::activate_company,
        handlers::company::deactivate_company,
        handlers::company::update_subscription,

        // --- Users ---
        handlers::user::list_users,
        handlers::user::create_user,
        handlers::user::get_user,
        handlers::user::update_user,
        handlers::user::delete_user,

        // --- Payment ---
        handlers::payment::generate_duitnow,
        handlers::payment::verify_duitnow,
        handlers::payment::payment_status,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterCompanyPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            handlers::auth::MeResponse,

            // --- Company ---
            models::company::PlanTier,
            models::company::SubscriptionStatus,
            models::company::ModuleSet,
            models::company::ModuleSetPatch,
            models::company::Subscription,
            models::company::PaymentRecord,
            models::company::Contact,
            models::company::Address,
            models::company::Company,
            handlers::company::PaginationMeta,
            handlers::company::CompanyListResponse,
            handlers::company::UpdateSubscriptionPayload,

            // --- Users ---
            handlers::user::UserListResponse,
            handlers::user::CreateUserPayload,
            handlers::user::UpdateUserPayload,

            // --- Payment ---
            handlers::payment::GenerateDuitNowPayload,
            handlers::payment::CompanyRef,
            handlers::payment::DuitNowQrResponse,
            handlers::payment::GatewayCallbackPayload,
            handlers::payment::CallbackAck,
            handlers::payment::PaymentStatusResponse,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
        )
    ),
    tags(
        (name = "Auth", description = "Registro de empresas, login e sessão"),
        (name = "Companies", description = "Gestão de empresas e assinaturas"),
        (name = "Users", description = "Gestão de usuários por empresa"),
        (name = "Payment", description = "Pagamento DuitNow e callback do gateway"),
        (name = "Dashboard", description = "Indicadores da empresa")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
