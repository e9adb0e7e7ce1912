//! Cloudflare provider entry point
//!
//! [`Provider::configure`] is what the host calls once per provider
//! configuration: resolve, validate, build the client. Every call starts from
//! scratch, so repeated configuration in one process never leaks state.

use flareform_client::{ApiClient, ClientBuilder, ClientError};
use flareform_config::fields::{self, field};
use flareform_config::{
    ConfigResolver, Diagnostic, Diagnostics, EnvLookup, FIELDS, FieldSpec, ProcessEnv, RawInput,
    ResolvedConfig, Versions, describe,
};
use serde::{Deserialize, Serialize};

/// Summary used when the client could not be assembled.
pub const CLIENT_INIT_FAILED: &str = "failed to initialize a new client";

/// Cloudflare provider
#[derive(Debug, Clone)]
pub struct Provider {
    version: String,
}

/// Outcome of a successful configuration.
#[derive(Debug, Clone)]
pub struct Configured {
    pub config: ResolvedConfig,
    pub client: ApiClient,
}

impl Configured {
    /// Non-fatal diagnostics to surface to the user.
    pub fn warnings(&self) -> Diagnostics {
        Diagnostics::from(self.config.warnings().to_vec())
    }
}

/// Documentation for one provider attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDoc {
    pub name: &'static str,
    pub kind: &'static str,
    pub sensitive: bool,
    pub deprecated: bool,
    pub description: String,
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

impl Provider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Configure against the process environment.
    pub fn configure(
        &self,
        raw: &RawInput,
        tool_version: &str,
    ) -> Result<Configured, Diagnostics> {
        self.configure_with_env(raw, tool_version, &ProcessEnv)
    }

    /// Configure against an explicit environment view.
    pub fn configure_with_env(
        &self,
        raw: &RawInput,
        tool_version: &str,
        env: &dyn EnvLookup,
    ) -> Result<Configured, Diagnostics> {
        let versions = Versions::new(tool_version, &self.version);
        let config = ConfigResolver::new(env, versions).resolve(raw)?;
        let client = ClientBuilder::new(&config)
            .build()
            .map_err(|err| client_diagnostics(err, &config))?;

        Ok(Configured { config, client })
    }

    /// Attribute documentation in schema order.
    pub fn schema(&self) -> Vec<AttributeDoc> {
        FIELDS.iter().map(attribute_doc).collect()
    }

    /// Documentation for a single attribute.
    pub fn attribute(&self, name: &str) -> Option<AttributeDoc> {
        field(name).map(attribute_doc)
    }

    /// Check that the client's credentials are accepted by the API.
    pub async fn check_auth(&self, client: &ApiClient) -> AuthStatus {
        match client.verify_token().await {
            Ok(result) => {
                let info = ["email", "id"]
                    .iter()
                    .find_map(|k| result.get(*k).and_then(|v| v.as_str()))
                    .unwrap_or("Unknown");
                match result.get("status").and_then(|v| v.as_str()) {
                    Some(status) if status != "active" => {
                        AuthStatus::failed(format!("token status is {}", status))
                    }
                    _ => AuthStatus::ok(info),
                }
            }
            Err(e) => AuthStatus::failed(e.to_string()),
        }
    }
}

fn attribute_doc(spec: &FieldSpec) -> AttributeDoc {
    AttributeDoc {
        name: spec.key,
        kind: spec.kind.as_str(),
        sensitive: spec.sensitive,
        deprecated: spec.deprecated.is_some(),
        description: describe(spec),
    }
}

/// Attributes whose values went into the part of the client that failed.
fn client_error_fields(err: &ClientError) -> Vec<&'static str> {
    match err {
        ClientError::InvalidBaseUrl { .. } => vec![fields::API_HOSTNAME, fields::API_BASE_PATH],
        ClientError::InvalidHeader { header } => match *header {
            "Authorization" => vec![fields::API_TOKEN],
            "X-Auth-Key" => vec![fields::API_KEY],
            "X-Auth-Email" => vec![fields::EMAIL],
            "X-Auth-User-Service-Key" => vec![fields::API_USER_SERVICE_KEY],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// The construction error first, then any advisories already raised.
fn client_diagnostics(err: ClientError, config: &ResolvedConfig) -> Diagnostics {
    tracing::error!("{}: {}", CLIENT_INIT_FAILED, err);
    let mut error = Diagnostic::error(CLIENT_INIT_FAILED, err.to_string());
    error.fields = client_error_fields(&err)
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut diagnostics = Diagnostics::from(vec![error]);
    diagnostics.extend(config.warnings().iter().cloned());
    diagnostics
}
