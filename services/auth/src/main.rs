use tracing::info;

use comuhub_auth::config::AuthConfig;
use comuhub_auth::infra::supabase::SupabaseClient;
use comuhub_auth::router::build_router;
use comuhub_auth::state::AppState;
use comuhub_core::config::Config;
use comuhub_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    let config = AuthConfig::from_env().expect("failed to load auth config from environment");

    init_tracing("info,tower_http=info");

    let timeout = config.http_timeout();
    let admin = SupabaseClient::new(
        &config.supabase_url,
        &config.supabase_service_role_key,
        timeout,
    )
    .expect("failed to build Supabase admin client");
    let public = SupabaseClient::new(&config.supabase_url, &config.supabase_key, timeout)
        .expect("failed to build Supabase public client");

    let state = AppState { admin, public };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
