//! Client assembly
//!
//! [`ClientBuilder`] turns a [`ResolvedConfig`] into an [`ApiClient`]. It is a
//! pure assembly step: no request leaves the process until the client is used.

use crate::client::{ApiClient, Inner};
use crate::error::{ClientError, Result};
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::retry::RetryPolicy;
use flareform_config::{Credentials, ResolvedConfig};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;

pub const X_AUTH_KEY: &str = "x-auth-key";
pub const X_AUTH_EMAIL: &str = "x-auth-email";
pub const X_AUTH_USER_SERVICE_KEY: &str = "x-auth-user-service-key";

pub struct ClientBuilder<'a> {
    config: &'a ResolvedConfig,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl<'a> ClientBuilder<'a> {
    pub fn new(config: &'a ResolvedConfig) -> Self {
        Self {
            config,
            base_url: None,
            timeout: None,
        }
    }

    /// Replace the `https://<hostname><base_path>` URL, e.g. to target a
    /// local API emulator.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request timeout applied by the HTTP layer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let config = self.config;
        let base_url = self.base_url.unwrap_or_else(|| config.base_url());
        validate_base_url(&base_url)?;

        let mut http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .default_headers(auth_headers(config.credentials())?);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(ClientError::Build)?;

        let limiter = RateLimiter::new(RateLimitConfig::new(config.rps(), 1));
        let retry = RetryPolicy::new(config.retries(), config.min_backoff(), config.max_backoff());

        if let Some(account_id) = config.account_id() {
            tracing::info!("API client scoped to account {}", account_id);
        }
        tracing::debug!(
            base_url = %base_url,
            rps = config.rps(),
            max_retries = retry.max_retries,
            mode = %config.credential_mode(),
            "API client built"
        );

        Ok(ApiClient {
            inner: Arc::new(Inner {
                http,
                base_url,
                limiter,
                retry,
                account_id: config.account_id().map(str::to_string),
                mode: config.credential_mode(),
                user_agent: config.user_agent().to_string(),
                debug: config.api_client_logging(),
            }),
        })
    }
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let url = reqwest::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}

fn sensitive(header: &'static str, value: &str) -> Result<HeaderValue> {
    let mut value =
        HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader { header })?;
    value.set_sensitive(true);
    Ok(value)
}

fn auth_headers(credentials: &Credentials) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    match credentials {
        Credentials::ApiKey { key, email } => {
            headers.insert(HeaderName::from_static(X_AUTH_KEY), sensitive("X-Auth-Key", key)?);
            headers.insert(
                HeaderName::from_static(X_AUTH_EMAIL),
                sensitive("X-Auth-Email", email)?,
            );
        }
        Credentials::ApiToken(token) => {
            headers.insert(
                AUTHORIZATION,
                sensitive("Authorization", &format!("Bearer {}", token))?,
            );
        }
        Credentials::UserServiceKey(key) => {
            headers.insert(
                HeaderName::from_static(X_AUTH_USER_SERVICE_KEY),
                sensitive("X-Auth-User-Service-Key", key)?,
            );
        }
    }
    Ok(headers)
}
