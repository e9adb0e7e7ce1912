//! Flareform - Cloudflare provider configuration
//!
//! Resolves the provider block of an infrastructure-as-code tool into one
//! validated configuration and a ready-to-use Cloudflare API client.
//!
//! ```ignore
//! use flareform::{Provider, RawInput};
//!
//! let provider = Provider::new("4.0.0");
//! let configured = provider.configure(&RawInput::new().with_api_token(token), "1.5.7")?;
//! let zones: serde_json::Value = configured.client.get("/zones").await?;
//! ```

pub mod provider;

pub use flareform_client::{ApiClient, ClientBuilder, ClientError};
pub use flareform_config::{
    CredentialMode, Diagnostic, Diagnostics, EnvLookup, ProcessEnv, RawInput, ResolvedConfig,
    Severity, StaticEnv,
};
pub use provider::{AttributeDoc, AuthStatus, CLIENT_INIT_FAILED, Configured, Provider};

/// Provider version baked into the user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
