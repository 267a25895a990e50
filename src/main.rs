// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não
    // deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação: registro e login são públicos, /me não.
    let auth_routes = Router::new()
        .route("/register-company", post(handlers::auth::register_company))
        .route("/login", post(handlers::auth::login))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::get_me))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )),
        );

    // Empresas: tudo autenticado; o que é só-admin é decidido no handler.
    let company_routes = Router::new()
        .route("/", get(handlers::company::list_companies))
        .route("/my", get(handlers::company::get_my_company))
        .route("/{id}", get(handlers::company::get_company))
        .route("/{id}/activate", put(handlers::company::activate_company))
        .route(
            "/{id}/deactivate",
            put(handlers::company::deactivate_company),
        )
        .route(
            "/{id}/subscription",
            put(handlers::company::update_subscription),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let user_routes = Router::new()
        .route(
            "/",
            post(handlers::user::create_user).get(handlers::user::list_users),
        )
        .route(
            "/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Pagamento: o callback do gateway é público; o resto não.
    let payment_routes = Router::new()
        .route("/duitnow/verify", post(handlers::payment::verify_duitnow))
        .merge(
            Router::new()
                .route(
                    "/duitnow/generate",
                    post(handlers::payment::generate_duitnow),
                )
                .route("/status", get(handlers::payment::payment_status))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )),
        );

    let dashboard_routes = Router::new()
        .route("/stats", get(handlers::dashboard::get_stats))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(docs::ApiDoc::openapi()) }),
        )
        .nest("/api/auth", auth_routes)
        .nest("/api/companies", company_routes)
        .nest("/api/users", user_routes)
        .nest("/api/payment", payment_routes)
        .nest("/api/dashboard", dashboard_routes)
        .with_state(app_state.clone());

    let listener = TcpListener::bind(&app_state.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}

#[cfg(test)]
mod tests {
    use super::docs;
    use utoipa::OpenApi;

    #[test]
    fn documento_openapi_e_gerado() {
        let doc = docs::ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();

        assert!(json.contains("/api/auth/register-company"));
        assert!(json.contains("/api/payment/duitnow/verify"));
        assert!(json.contains("/api/users/{id}"));
    }
}
