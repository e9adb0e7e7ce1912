//! Resolved provider configuration

use crate::error::Diagnostic;
use std::fmt;

/// Active authentication scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialMode {
    ApiKey,
    ApiToken,
    UserServiceKey,
}

impl CredentialMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialMode::ApiKey => "api_key",
            CredentialMode::ApiToken => "api_token",
            CredentialMode::UserServiceKey => "api_user_service_key",
        }
    }
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one credential set; the enum makes "zero or several" unrepresentable.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey { key: String, email: String },
    ApiToken(String),
    UserServiceKey(String),
}

impl Credentials {
    pub fn mode(&self) -> CredentialMode {
        match self {
            Credentials::ApiKey { .. } => CredentialMode::ApiKey,
            Credentials::ApiToken(_) => CredentialMode::ApiToken,
            Credentials::UserServiceKey(_) => CredentialMode::UserServiceKey,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("key", &"<redacted>")
                .field("email", email)
                .finish(),
            Credentials::ApiToken(_) => f.debug_tuple("ApiToken").field(&"<redacted>").finish(),
            Credentials::UserServiceKey(_) => f
                .debug_tuple("UserServiceKey")
                .field(&"<redacted>")
                .finish(),
        }
    }
}

/// Versions embedded in the user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions {
    /// Version of the orchestrating tool (e.g. `1.5.7`).
    pub tool: String,
    /// Version of this provider build.
    pub provider: String,
}

impl Versions {
    pub fn new(tool: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            provider: provider.into(),
        }
    }

    /// `terraform/<tool> flareform/<sdk> terraform-provider-cloudflare/<provider>`
    pub fn user_agent(&self) -> String {
        format!(
            "terraform/{} flareform/{} terraform-provider-cloudflare/{}",
            self.tool,
            env!("CARGO_PKG_VERSION"),
            self.provider
        )
    }
}

/// Validated provider configuration. Immutable once built by
/// [`ConfigResolver`](crate::ConfigResolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub(crate) credentials: Credentials,
    pub(crate) rps: u32,
    pub(crate) retries: u32,
    pub(crate) min_backoff: u32,
    pub(crate) max_backoff: u32,
    pub(crate) api_client_logging: bool,
    pub(crate) account_id: Option<String>,
    pub(crate) base_hostname: String,
    pub(crate) base_path: String,
    pub(crate) user_agent: String,
    pub(crate) warnings: Vec<Diagnostic>,
}

impl ResolvedConfig {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn credential_mode(&self) -> CredentialMode {
        self.credentials.mode()
    }

    pub fn rps(&self) -> u32 {
        self.rps
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Seconds
    pub fn min_backoff(&self) -> u32 {
        self.min_backoff
    }

    /// Seconds
    pub fn max_backoff(&self) -> u32 {
        self.max_backoff
    }

    pub fn api_client_logging(&self) -> bool {
        self.api_client_logging
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn base_hostname(&self) -> &str {
        &self.base_hostname
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `https://` + hostname + base path, without normalisation.
    pub fn base_url(&self) -> String {
        format!("https://{}{}", self.base_hostname, self.base_path)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Non-fatal findings collected during resolution.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}
