use std::time::Duration;

use serde::Deserialize;

use comuhub_core::config::Config;

/// Auth service configuration loaded from environment variables (and `.env`).
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Supabase project URL (e.g. "https://xyz.supabase.co"). Env var: `SUPABASE_URL`.
    pub supabase_url: String,
    /// Public (anon) API key, used for sign-in. Env var: `SUPABASE_KEY`.
    pub supabase_key: String,
    /// Service-role API key, used for admin identity calls and table writes.
    /// Env var: `SUPABASE_SERVICE_ROLE_KEY`.
    pub supabase_service_role_key: String,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    /// Per-request timeout for Supabase calls, in seconds (default 10).
    /// Env var: `HTTP_TIMEOUT_SECS`.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_auth_port() -> u16 {
    3112
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Config for AuthConfig {}

impl AuthConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
