use std::time::Duration;

use anyhow::{Context as _, anyhow};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

/// HTTP handle on a Supabase project, bound to one API key.
///
/// The service builds two of these: one with the service-role key for admin
/// identity calls and table writes, one with the public key for end-user
/// sign-in. Cloning is cheap; the connection pool is shared.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("build Supabase HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    /// Absolute URL for `path` (e.g. `/auth/v1/admin/users`).
    pub fn url(&self, path: &str) -> anyhow::Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("invalid Supabase URL for {path}"))
    }

    /// Like [`url`](Self::url), then appends `segment` percent-encoded.
    pub fn url_with_segment(&self, path: &str, segment: &str) -> anyhow::Result<Url> {
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("Supabase URL cannot have path segments"))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Request carrying the `apikey` and bearer headers both Supabase gateways expect.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Non-2xx answer from GoTrue or PostgREST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    /// GoTrue machine-readable code (e.g. `email_exists`), when present.
    pub error_code: Option<String>,
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status.as_u16())
    }
}

/// Union of the error body shapes: GoTrue uses `msg` / `error_description`,
/// PostgREST uses `message`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
}

impl ApiFailure {
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Self::from_body(status, &text)
    }

    pub fn from_body(status: StatusCode, text: &str) -> Self {
        let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
        let message = body
            .msg
            .or(body.message)
            .or(body.error_description)
            .or(body.error)
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_owned()
                } else {
                    text.trim().to_owned()
                }
            });
        Self {
            status,
            message,
            error_code: body.error_code,
        }
    }
}
