//! Provider attribute table
//!
//! One [`FieldSpec`] per provider attribute: its key, the environment variable
//! consulted when the attribute is absent, and the built-in default.

use crate::rules::{Arity, RULES};

pub const EMAIL: &str = "email";
pub const API_KEY: &str = "api_key";
pub const API_TOKEN: &str = "api_token";
pub const API_USER_SERVICE_KEY: &str = "api_user_service_key";
pub const RPS: &str = "rps";
pub const RETRIES: &str = "retries";
pub const MIN_BACKOFF: &str = "min_backoff";
pub const MAX_BACKOFF: &str = "max_backoff";
pub const API_CLIENT_LOGGING: &str = "api_client_logging";
pub const ACCOUNT_ID: &str = "account_id";
pub const API_HOSTNAME: &str = "api_hostname";
pub const API_BASE_PATH: &str = "api_base_path";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Bool,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "String",
            FieldKind::Int => "Number",
            FieldKind::Bool => "Boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub env: &'static str,
    pub default: Option<&'static str>,
    pub kind: FieldKind,
    pub description: &'static str,
    pub sensitive: bool,
    pub deprecated: Option<&'static str>,
}

pub const EMAIL_FIELD: FieldSpec = FieldSpec {
    key: EMAIL,
    env: "CLOUDFLARE_EMAIL",
    default: None,
    kind: FieldKind::String,
    description: "A registered Cloudflare email address",
    sensitive: false,
    deprecated: None,
};

pub const API_KEY_FIELD: FieldSpec = FieldSpec {
    key: API_KEY,
    env: "CLOUDFLARE_API_KEY",
    default: None,
    kind: FieldKind::String,
    description: "The API key for operations. API keys are [now considered legacy by Cloudflare](https://developers.cloudflare.com/api/keys/#limitations), API tokens should be used instead",
    sensitive: true,
    deprecated: None,
};

pub const API_TOKEN_FIELD: FieldSpec = FieldSpec {
    key: API_TOKEN,
    env: "CLOUDFLARE_API_TOKEN",
    default: None,
    kind: FieldKind::String,
    description: "The API Token for operations",
    sensitive: true,
    deprecated: None,
};

pub const API_USER_SERVICE_KEY_FIELD: FieldSpec = FieldSpec {
    key: API_USER_SERVICE_KEY,
    env: "CLOUDFLARE_API_USER_SERVICE_KEY",
    default: None,
    kind: FieldKind::String,
    description: "A special Cloudflare API key good for a restricted set of endpoints",
    sensitive: true,
    deprecated: None,
};

pub const RPS_FIELD: FieldSpec = FieldSpec {
    key: RPS,
    env: "CLOUDFLARE_RPS",
    default: Some("4"),
    kind: FieldKind::Int,
    description: "RPS limit to apply when making calls to the API",
    sensitive: false,
    deprecated: None,
};

pub const RETRIES_FIELD: FieldSpec = FieldSpec {
    key: RETRIES,
    env: "CLOUDFLARE_RETRIES",
    default: Some("3"),
    kind: FieldKind::Int,
    description: "Maximum number of retries to perform when an API request fails",
    sensitive: false,
    deprecated: None,
};

pub const MIN_BACKOFF_FIELD: FieldSpec = FieldSpec {
    key: MIN_BACKOFF,
    env: "CLOUDFLARE_MIN_BACKOFF",
    default: Some("1"),
    kind: FieldKind::Int,
    description: "Minimum backoff period in seconds after failed API calls",
    sensitive: false,
    deprecated: None,
};

pub const MAX_BACKOFF_FIELD: FieldSpec = FieldSpec {
    key: MAX_BACKOFF,
    env: "CLOUDFLARE_MAX_BACKOFF",
    default: Some("30"),
    kind: FieldKind::Int,
    description: "Maximum backoff period in seconds after failed API calls",
    sensitive: false,
    deprecated: None,
};

pub const API_CLIENT_LOGGING_FIELD: FieldSpec = FieldSpec {
    key: API_CLIENT_LOGGING,
    env: "CLOUDFLARE_API_CLIENT_LOGGING",
    default: Some("false"),
    kind: FieldKind::Bool,
    description: "Whether to print logs from the API client",
    sensitive: false,
    deprecated: None,
};

pub const ACCOUNT_ID_FIELD: FieldSpec = FieldSpec {
    key: ACCOUNT_ID,
    env: "CLOUDFLARE_ACCOUNT_ID",
    default: None,
    kind: FieldKind::String,
    description: "Configure API client to always use a specific account",
    sensitive: false,
    deprecated: Some("Use resource specific `account_id` attributes instead."),
};

pub const API_HOSTNAME_FIELD: FieldSpec = FieldSpec {
    key: API_HOSTNAME,
    env: "CLOUDFLARE_API_HOSTNAME",
    default: Some("api.cloudflare.com"),
    kind: FieldKind::String,
    description: "Configure the hostname used by the API client",
    sensitive: false,
    deprecated: None,
};

pub const API_BASE_PATH_FIELD: FieldSpec = FieldSpec {
    key: API_BASE_PATH,
    env: "CLOUDFLARE_API_BASE_PATH",
    default: Some("/client/v4"),
    kind: FieldKind::String,
    description: "Configure the base path used by the API client",
    sensitive: false,
    deprecated: None,
};

/// All provider attributes in schema order.
pub const FIELDS: &[FieldSpec] = &[
    EMAIL_FIELD,
    API_KEY_FIELD,
    API_TOKEN_FIELD,
    API_USER_SERVICE_KEY_FIELD,
    RPS_FIELD,
    RETRIES_FIELD,
    MIN_BACKOFF_FIELD,
    MAX_BACKOFF_FIELD,
    API_CLIENT_LOGGING_FIELD,
    ACCOUNT_ID_FIELD,
    API_HOSTNAME_FIELD,
    API_BASE_PATH_FIELD,
];

pub fn field(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}

fn quoted(keys: &[&str]) -> String {
    keys.iter()
        .map(|k| format!("`{}`", k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the markdown description of an attribute.
///
/// Sentences are appended in a fixed order: base text, environment variable
/// hint, default, then one sentence per rule naming the attribute.
pub fn describe(spec: &FieldSpec) -> String {
    let mut desc = spec.description.trim().to_string();
    if !desc.is_empty() && !desc.ends_with('.') {
        desc.push('.');
    }

    desc.push_str(&format!(
        " Alternatively, can be configured using the `{}` environment variable.",
        spec.env
    ));

    match spec.default {
        Some("") => desc.push_str(" Defaults to `\"\"`."),
        Some(default) => desc.push_str(&format!(" Defaults to `{}`.", default)),
        None => {}
    }

    for rule in RULES.iter().filter(|r| r.fields.contains(&spec.key)) {
        match rule.arity {
            // 依存される側 (fields[0]) には付けない
            Arity::CoRequires if rule.fields[0] != spec.key => {
                desc.push_str(&format!(" Required when using {}.", quoted(&rule.fields[..1])));
            }
            Arity::CoRequires => {}
            Arity::ExactlyOne => {
                desc.push_str(&format!(
                    " Must provide only one of {}.",
                    quoted(rule.fields)
                ));
            }
            Arity::AtLeastOne => {
                desc.push_str(&format!(
                    " Must provide at least one of {}.",
                    quoted(rule.fields)
                ));
            }
        }
    }

    if let Some(note) = spec.deprecated {
        desc.push_str(&format!(" **Deprecated:** {}", note));
    }

    desc.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        assert_eq!(field("rps").map(|f| f.env), Some("CLOUDFLARE_RPS"));
        assert!(field("zone_id").is_none());
        assert_eq!(FIELDS.len(), 12);
    }

    #[test]
    fn test_describe_int_with_default() {
        assert_eq!(
            describe(&RPS_FIELD),
            "RPS limit to apply when making calls to the API. Alternatively, can be configured \
             using the `CLOUDFLARE_RPS` environment variable. Defaults to `4`."
        );
    }

    #[test]
    fn test_describe_credentials_mention_rules() {
        let token = describe(&API_TOKEN_FIELD);
        assert!(token.contains("Must provide only one of `api_key`, `api_token`, `api_user_service_key`."));
        assert!(!token.contains("Required when using"));

        let email = describe(&EMAIL_FIELD);
        assert!(email.contains("Required when using `api_key`."));
        assert!(email.contains("`CLOUDFLARE_EMAIL`"));
    }

    #[test]
    fn test_describe_deprecated() {
        let desc = describe(&ACCOUNT_ID_FIELD);
        assert!(desc.ends_with("**Deprecated:** Use resource specific `account_id` attributes instead."));
    }
}
