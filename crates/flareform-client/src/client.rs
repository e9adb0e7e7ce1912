//! Cloudflare API client
//!
//! [`ApiClient`] is the handle every resource operation shares. Cloning is
//! cheap and all clones share one rate limiter, so the configured RPS cap is
//! enforced across concurrent callers.

use crate::error::{ApiMessage, ClientError, Result};
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use flareform_config::CredentialMode;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) inner: Arc<Inner>,
}

#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) limiter: RateLimiter,
    pub(crate) retry: RetryPolicy,
    pub(crate) account_id: Option<String>,
    pub(crate) mode: CredentialMode,
    pub(crate) user_agent: String,
    pub(crate) debug: bool,
}

impl ApiClient {
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Provider-level default account, if one was configured.
    pub fn account_id(&self) -> Option<&str> {
        self.inner.account_id.as_deref()
    }

    pub fn credential_mode(&self) -> CredentialMode {
        self.inner.mode
    }

    pub fn user_agent(&self) -> &str {
        &self.inner.user_agent
    }

    pub fn debug(&self) -> bool {
        self.inner.debug
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    /// Account a call should run against. A non-empty resource-level account
    /// wins over the provider default.
    pub fn scoped_account<'a>(&'a self, resource_account: Option<&'a str>) -> Option<&'a str> {
        resource_account
            .filter(|a| !a.is_empty())
            .or(self.account_id())
    }

    /// `/accounts/<id><suffix>` for the scoped account.
    pub fn account_path(&self, resource_account: Option<&str>, suffix: &str) -> Result<String> {
        let account = self
            .scoped_account(resource_account)
            .ok_or(ClientError::MissingAccount)?;
        Ok(format!("/accounts/{}{}", account, suffix))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::DELETE, path, None).await
    }

    /// Perform one API call and decode the `result` of the response envelope.
    ///
    /// `path` is appended verbatim to the base URL.
    pub async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}{}", self.inner.base_url, path);
        let body = body.map(serde_json::to_value).transpose()?;

        let (status, text) = self.send_with_retry(&method, &url, body.as_ref()).await?;
        self.wire(&method, &url, Some(status), None, "response");

        decode(status, &text)
    }

    /// Check the configured credentials against the API.
    pub async fn verify_token(&self) -> Result<serde_json::Value> {
        let path = match self.inner.mode {
            CredentialMode::ApiToken => "/user/tokens/verify",
            CredentialMode::ApiKey | CredentialMode::UserServiceKey => "/user",
        };
        self.get(path).await
    }

    /// Send until a final response arrives; the body is read here so a
    /// connection dropped mid-body is retried like any transport failure.
    async fn send_with_retry(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(StatusCode, String)> {
        let retry = self.inner.retry;
        let mut attempt: u32 = 0;

        loop {
            if !self.inner.limiter.try_acquire().await {
                self.inner.limiter.acquire().await;
            }

            let mut request = self.inner.http.request(method.clone(), url);
            if let Some(body) = body {
                request = request.json(body);
            }
            self.wire(method, url, None, Some(attempt), "request");

            let exhausted = attempt >= retry.max_retries;
            let failure = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    match response.text().await {
                        Ok(_) if RetryPolicy::is_retryable_status(status) && !exhausted => {
                            format!("HTTP {}", status)
                        }
                        Ok(text) => return Ok((status, text)),
                        Err(err) if RetryPolicy::is_retryable_error(&err) && !exhausted => {
                            format!("reading response body: {}", err)
                        }
                        Err(err) => return Err(exhausted_error(err, attempt)),
                    }
                }
                Err(err) if RetryPolicy::is_retryable_error(&err) && !exhausted => err.to_string(),
                Err(err) => return Err(exhausted_error(err, attempt)),
            };

            let delay = retry.delay_for(attempt);
            tracing::warn!(
                attempt = attempt + 1,
                max_attempts = retry.max_retries + 1,
                delay_secs = delay.as_secs_f64(),
                "request to {} failed ({}), retrying",
                url,
                failure
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn wire(
        &self,
        method: &Method,
        url: &str,
        status: Option<StatusCode>,
        attempt: Option<u32>,
        what: &str,
    ) {
        let status = status.map(|s| s.as_u16());
        if self.inner.debug {
            tracing::info!(target: "flareform_client::wire", %method, url, ?status, ?attempt, "{}", what);
        } else {
            tracing::trace!(target: "flareform_client::wire", %method, url, ?status, ?attempt, "{}", what);
        }
    }
}

fn exhausted_error(err: reqwest::Error, attempt: u32) -> ClientError {
    if RetryPolicy::is_retryable_error(&err) {
        tracing::error!(attempts = attempt + 1, "all retry attempts exhausted");
    }
    err.into()
}

/// Response envelope shared by every Cloudflare v4 endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    pub result: Option<T>,
}

fn decode<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T> {
    let envelope: ApiResponse<serde_json::Value> = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if !envelope.success || !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            errors: envelope.errors,
        });
    }

    for message in &envelope.messages {
        tracing::debug!(code = message.code, "API message: {}", message.message);
    }

    Ok(serde_json::from_value(
        envelope.result.unwrap_or(serde_json::Value::Null),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ClientBuilder;
    use flareform_config::{ConfigResolver, RawInput, ResolvedConfig, StaticEnv, Versions};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TOKEN: &str = "AbCdEfGhIjKlMnOpQrStUvWxYz0123456789-_Ab";
    const KEY: &str = "0123456789abcdef0123456789abcdef01234";

    fn resolve(raw: RawInput) -> ResolvedConfig {
        ConfigResolver::new(StaticEnv::new(), Versions::new("1.5.7", "4.0.0"))
            .resolve(&raw)
            .unwrap()
    }

    fn client_for(server: &MockServer, raw: RawInput) -> ApiClient {
        let config = resolve(raw.with_min_backoff(0).with_max_backoff(0).with_rps(0));
        ClientBuilder::new(&config)
            .with_base_url(server.url("/client/v4"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_decode_success() {
        let value: serde_json::Value = decode(
            StatusCode::OK,
            r#"{"success":true,"errors":[],"messages":[],"result":{"id":"abc"}}"#,
        )
        .unwrap();
        assert_eq!(value["id"], "abc");
    }

    #[test]
    fn test_decode_api_failure() {
        let err = decode::<serde_json::Value>(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"errors":[{"code":1003,"message":"Invalid zone"}],"result":null}"#,
        )
        .unwrap_err();
        match err {
            ClientError::Api { status, errors } => {
                assert_eq!(status, 400);
                assert_eq!(errors[0].code, 1003);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_non_json_error_body() {
        let err = decode::<serde_json::Value>(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
            .unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 502, .. }));
    }

    #[test]
    fn test_decode_null_result_as_unit() {
        decode::<()>(StatusCode::OK, r#"{"success":true,"result":null}"#).unwrap();
    }

    #[test]
    fn test_scoped_account() {
        let config = resolve(RawInput::new().with_api_token(TOKEN).with_account_id("acct123"));
        let client = ClientBuilder::new(&config).build().unwrap();

        assert_eq!(client.scoped_account(None), Some("acct123"));
        assert_eq!(client.scoped_account(Some("")), Some("acct123"));
        assert_eq!(client.scoped_account(Some("other")), Some("other"));
        assert_eq!(
            client.account_path(None, "/workers/scripts").unwrap(),
            "/accounts/acct123/workers/scripts"
        );
    }

    #[test]
    fn test_unscoped_client() {
        let config = resolve(RawInput::new().with_api_token(TOKEN));
        let client = ClientBuilder::new(&config).build().unwrap();

        assert_eq!(client.scoped_account(None), None);
        assert!(matches!(
            client.account_path(None, "/rulesets"),
            Err(ClientError::MissingAccount)
        ));
        assert_eq!(
            client.account_path(Some("res-acct"), "/rulesets").unwrap(),
            "/accounts/res-acct/rulesets"
        );
    }

    #[tokio::test]
    async fn test_token_request_sends_bearer_and_user_agent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/client/v4/user/tokens/verify")
                    .header("authorization", format!("Bearer {}", TOKEN))
                    .header_exists("user-agent");
                then.status(200).json_body(json!({
                    "success": true,
                    "errors": [],
                    "messages": [],
                    "result": {"id": "tok", "status": "active"}
                }));
            })
            .await;

        let client = client_for(&server, RawInput::new().with_api_token(TOKEN));
        let result = client.verify_token().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result["status"], "active");
    }

    #[tokio::test]
    async fn test_api_key_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/client/v4/user")
                    .header("x-auth-key", KEY)
                    .header("x-auth-email", "user@example.com");
                then.status(200)
                    .json_body(json!({"success": true, "result": {"id": "u1"}}));
            })
            .await;

        let client = client_for(
            &server,
            RawInput::new().with_api_key(KEY).with_email("user@example.com"),
        );
        client.verify_token().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transient_status_is_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/client/v4/zones");
                then.status(503).body("unavailable");
            })
            .await;

        let client = client_for(&server, RawInput::new().with_api_token(TOKEN).with_retries(2));
        let err = client.get::<serde_json::Value>("/zones").await.unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 503, .. }));
        assert_eq!(mock.hits_async().await, 3);
    }

    #[tokio::test]
    async fn test_api_errors_are_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/client/v4/zones");
                then.status(400).json_body(json!({
                    "success": false,
                    "errors": [{"code": 1061, "message": "zone already exists"}],
                    "result": null
                }));
            })
            .await;

        let client = client_for(&server, RawInput::new().with_api_token(TOKEN).with_retries(3));
        let err = client
            .post::<_, serde_json::Value>("/zones", &json!({"name": "example.com"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 400, .. }));
        assert_eq!(mock.hits_async().await, 1);
    }

    /// Serve `truncated` responses whose body stops short of its
    /// Content-Length, then well-formed ones. Returns the base URL and the
    /// number of connections served.
    async fn truncating_server(truncated: usize) -> (String, Arc<AtomicUsize>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let served = Arc::new(AtomicUsize::new(0));
        let counter = served.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }

                let n = counter.fetch_add(1, Ordering::SeqCst);
                let body = r#"{"success":true,"errors":[],"messages":[],"result":{"id":"ok"}}"#;
                let response = if n < truncated {
                    format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        &body[..10]
                    )
                } else {
                    format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    )
                };
                socket.write_all(response.as_bytes()).await.ok();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{}/client/v4", addr), served)
    }

    fn client_at(base_url: &str, retries: i64) -> ApiClient {
        let config = resolve(
            RawInput::new()
                .with_api_token(TOKEN)
                .with_retries(retries)
                .with_min_backoff(0)
                .with_max_backoff(0)
                .with_rps(0),
        );
        ClientBuilder::new(&config)
            .with_base_url(base_url)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_truncated_body_is_retried() {
        let (base_url, served) = truncating_server(1).await;
        let client = client_at(&base_url, 2);

        let result: serde_json::Value = client.get("/zones").await.unwrap();

        assert_eq!(result["id"], "ok");
        assert_eq!(served.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_truncated_body_gives_up_after_retries() {
        let (base_url, served) = truncating_server(usize::MAX).await;
        let client = client_at(&base_url, 1);

        let err = client.get::<serde_json::Value>("/zones").await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)), "{err}");
        assert_eq!(served.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_single_attempt() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/client/v4/zones/z1");
                then.status(500).body("oops");
            })
            .await;

        let client = client_for(&server, RawInput::new().with_api_token(TOKEN).with_retries(0));
        let err = client.delete::<serde_json::Value>("/zones/z1").await.unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 500, .. }));
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_clones_share_rate_limit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/client/v4/ips");
                then.status(200).json_body(json!({"success": true, "result": {}}));
            })
            .await;

        let config = resolve(RawInput::new().with_api_token(TOKEN).with_rps(20));
        let client = ClientBuilder::new(&config)
            .with_base_url(server.url("/client/v4"))
            .build()
            .unwrap();

        let start = std::time::Instant::now();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.get::<serde_json::Value>("/ips").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // 20 rps・バースト 1 で 4 件 → 最低 150ms
        assert!(start.elapsed() >= std::time::Duration::from_millis(140));
    }
}
