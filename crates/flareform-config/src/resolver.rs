//! Provider configuration resolution
//!
//! Turns a [`RawInput`] into a [`ResolvedConfig`] in two passes:
//!
//! 1. Per field: explicit value > environment variable > built-in default.
//! 2. Across fields: numeric bounds, then the [`RULES`](crate::rules::RULES) table.
//!
//! Resolution is pure apart from reading the environment through
//! [`EnvLookup`]; it never performs I/O and keeps no state between calls.

use crate::env::EnvLookup;
use crate::error::{ConfigError, Diagnostic, Result};
use crate::fields::{
    self, API_BASE_PATH_FIELD, API_CLIENT_LOGGING_FIELD, API_HOSTNAME_FIELD, API_KEY_FIELD,
    API_TOKEN_FIELD, API_USER_SERVICE_KEY_FIELD, ACCOUNT_ID_FIELD, EMAIL_FIELD, FieldSpec,
    MAX_BACKOFF_FIELD, MIN_BACKOFF_FIELD, RETRIES_FIELD, RPS_FIELD,
};
use crate::input::{RawInput, Setting};
use crate::resolved::{Credentials, ResolvedConfig, Versions};
use crate::rules;
use regex::Regex;
use std::num::IntErrorKind;
use std::sync::LazyLock;

/// Upper bound for retry and backoff settings: the platform integer width.
pub const INT_WIDTH: i64 = usize::BITS as i64;

static API_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{37}$").expect("api key pattern should compile"));

static API_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{40}$").expect("api token pattern should compile")
});

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Explicit,
    Environment,
    Default,
}

pub struct ConfigResolver<E: EnvLookup> {
    env: E,
    versions: Versions,
}

impl<E: EnvLookup> ConfigResolver<E> {
    pub fn new(env: E, versions: Versions) -> Self {
        Self { env, versions }
    }

    /// Resolve and validate `raw`. Either a complete configuration or the
    /// first violation; never a partial result.
    pub fn resolve(&self, raw: &RawInput) -> Result<ResolvedConfig> {
        // 1. フィールド単位の解決
        let base_hostname = self.string(&raw.api_hostname, &API_HOSTNAME_FIELD);
        let base_path = self.string(&raw.api_base_path, &API_BASE_PATH_FIELD);
        let rps = self.int(&raw.rps, &RPS_FIELD)?;
        let retries = self.int(&raw.retries, &RETRIES_FIELD)?;
        let min_backoff = self.int(&raw.min_backoff, &MIN_BACKOFF_FIELD)?;
        let max_backoff = self.int(&raw.max_backoff, &MAX_BACKOFF_FIELD)?;
        let api_client_logging = self.bool(&raw.api_client_logging, &API_CLIENT_LOGGING_FIELD)?;
        let api_token = self.string(&raw.api_token, &API_TOKEN_FIELD);
        let api_key = self.string(&raw.api_key, &API_KEY_FIELD);
        let api_user_service_key =
            self.string(&raw.api_user_service_key, &API_USER_SERVICE_KEY_FIELD);
        let email = self.string(&raw.email, &EMAIL_FIELD);
        let account_id = self.string(&raw.account_id, &ACCOUNT_ID_FIELD);

        // 2. フィールド横断の検証
        let rps = bounded(fields::RPS, rps, u32::MAX as i64)?;
        let retries = bounded(fields::RETRIES, retries, INT_WIDTH)?;
        let min_backoff = bounded(fields::MIN_BACKOFF, min_backoff, INT_WIDTH)?;
        let max_backoff = bounded(fields::MAX_BACKOFF, max_backoff, INT_WIDTH)?;

        let present = |field: &str| match field {
            fields::API_KEY => !api_key.is_empty(),
            fields::API_TOKEN => !api_token.is_empty(),
            fields::API_USER_SERVICE_KEY => !api_user_service_key.is_empty(),
            fields::EMAIL => !email.is_empty(),
            fields::ACCOUNT_ID => !account_id.is_empty(),
            _ => false,
        };
        rules::check_all(&present)?;

        let mut warnings = Vec::new();
        let credentials = if !api_key.is_empty() {
            if !API_KEY_PATTERN.is_match(&api_key) {
                warnings.push(Diagnostic::warning(
                    fields::API_KEY,
                    "api_key does not look like a Cloudflare API key",
                    "API key must be 37 characters long and only contain characters 0-9 and a-f (all lowercased)",
                ));
            }
            Credentials::ApiKey {
                key: api_key,
                email,
            }
        } else if !api_token.is_empty() {
            if !API_TOKEN_PATTERN.is_match(&api_token) {
                warnings.push(Diagnostic::warning(
                    fields::API_TOKEN,
                    "api_token does not look like a Cloudflare API token",
                    "API tokens must be 40 characters long and only contain characters a-z, A-Z, 0-9, hyphens and underscores",
                ));
            }
            Credentials::ApiToken(api_token)
        } else {
            Credentials::UserServiceKey(api_user_service_key)
        };

        for warning in &warnings {
            tracing::warn!(fields = ?warning.fields, "{}", warning.summary);
        }

        let account_id = if account_id.is_empty() {
            None
        } else {
            tracing::info!("using specified account id {} in Cloudflare provider", account_id);
            Some(account_id)
        };

        tracing::debug!(
            mode = %credentials.mode(),
            rps,
            retries,
            min_backoff,
            max_backoff,
            "provider configuration resolved"
        );

        Ok(ResolvedConfig {
            credentials,
            rps,
            retries,
            min_backoff,
            max_backoff,
            api_client_logging,
            account_id,
            base_hostname,
            base_path,
            user_agent: self.versions.user_agent(),
            warnings,
        })
    }

    /// Raw string from the environment or default, with its source.
    fn fallback(&self, spec: &FieldSpec) -> (String, Source) {
        if self.env.is_set(spec.env) {
            (self.env.get_or(spec.env, ""), Source::Environment)
        } else {
            (spec.default.unwrap_or_default().to_string(), Source::Default)
        }
    }

    fn string(&self, setting: &Setting<String>, spec: &FieldSpec) -> String {
        let (value, source) = match setting.as_value().filter(|v| !v.is_empty()) {
            Some(v) => (v.clone(), Source::Explicit),
            None => self.fallback(spec),
        };
        log_source(spec, source, &value);
        value
    }

    fn int(&self, setting: &Setting<i64>, spec: &FieldSpec) -> Result<i64> {
        if let Some(v) = setting.as_value() {
            log_source(spec, Source::Explicit, &v.to_string());
            return Ok(*v);
        }
        let (raw, source) = self.fallback(spec);
        log_source(spec, source, &raw);
        let digits = raw.trim();
        digits.parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => ConfigError::TooLarge {
                field: spec.key,
                value: digits.to_string(),
            },
            IntErrorKind::NegOverflow => ConfigError::Negative {
                field: spec.key,
                value: digits.to_string(),
            },
            _ => ConfigError::InvalidInteger {
                field: spec.key,
                var: spec.env,
                value: raw.clone(),
            },
        })
    }

    fn bool(&self, setting: &Setting<bool>, spec: &FieldSpec) -> Result<bool> {
        if let Some(v) = setting.as_value() {
            log_source(spec, Source::Explicit, &v.to_string());
            return Ok(*v);
        }
        let (raw, source) = self.fallback(spec);
        log_source(spec, source, &raw);
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                field: spec.key,
                var: spec.env,
                value: raw,
            }),
        }
    }
}

fn log_source(spec: &FieldSpec, source: Source, value: &str) {
    if spec.sensitive {
        tracing::debug!(field = spec.key, ?source, set = !value.is_empty(), "resolved");
    } else {
        tracing::debug!(field = spec.key, ?source, value, "resolved");
    }
}

fn bounded(field: &'static str, value: i64, max: i64) -> Result<u32> {
    if value < 0 {
        return Err(ConfigError::Negative {
            field,
            value: value.to_string(),
        });
    }
    let too_large = || ConfigError::TooLarge {
        field,
        value: value.to_string(),
    };
    if value > max {
        return Err(too_large());
    }
    u32::try_from(value).map_err(|_| too_large())
}
