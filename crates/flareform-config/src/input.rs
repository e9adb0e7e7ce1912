//! Unresolved provider input
//!
//! [`RawInput`] is the provider block exactly as the host hands it over.
//! Each attribute is a [`Setting`], keeping "never written" apart from
//! "written as null" so precedence can be decided without sentinel values.

use crate::error::{ConfigError, Result};
use crate::fields;
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

/// Tri-state value of one provider attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Setting<T> {
    /// The attribute was not written at all.
    #[default]
    Unset,
    /// The attribute was written but carries no value.
    Null,
    /// The attribute carries a value.
    Value(T),
}

impl<T> Setting<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Setting::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Setting<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Setting::Value(v),
            None => Setting::Null,
        }
    }
}

// A missing key never reaches this impl (`#[serde(default)]` yields `Unset`),
// so `None` here always means an explicit null.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Setting::from)
    }
}

/// Integer attribute visitor.
///
/// JSON and YAML hand integers past `i64` over as unsigned or float values;
/// those are reported against the attribute instead of as a type mismatch.
struct IntSetting(&'static str);

impl IntSetting {
    fn too_large<E: de::Error>(&self, value: String) -> E {
        E::custom(ConfigError::TooLarge {
            field: self.0,
            value,
        })
    }
}

impl<'de> Visitor<'de> for IntSetting {
    type Value = Setting<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an integer or null for `{}`", self.0)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(Setting::Null)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(Setting::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(Setting::Value(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        i64::try_from(v)
            .map(Setting::Value)
            .map_err(|_| self.too_large(v.to_string()))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> std::result::Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(v) => Ok(Setting::Value(v)),
            Err(_) if v < 0 => Err(E::custom(ConfigError::Negative {
                field: self.0,
                value: v.to_string(),
            })),
            Err(_) => Err(self.too_large(v.to_string())),
        }
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<Self::Value, E> {
        i64::try_from(v)
            .map(Setting::Value)
            .map_err(|_| self.too_large(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        if !v.is_finite() || v.fract() != 0.0 {
            return Err(E::invalid_value(Unexpected::Float(v), &self));
        }
        if v >= i64::MAX as f64 {
            return Err(self.too_large(format!("{:.0}", v)));
        }
        if v < i64::MIN as f64 {
            return Err(E::custom(ConfigError::Negative {
                field: self.0,
                value: format!("{:.0}", v),
            }));
        }
        Ok(Setting::Value(v as i64))
    }
}

fn int_setting<'de, D: Deserializer<'de>>(
    deserializer: D,
    field: &'static str,
) -> std::result::Result<Setting<i64>, D::Error> {
    deserializer.deserialize_option(IntSetting(field))
}

fn rps<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Setting<i64>, D::Error> {
    int_setting(d, fields::RPS)
}

fn retries<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Setting<i64>, D::Error> {
    int_setting(d, fields::RETRIES)
}

fn min_backoff<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Setting<i64>, D::Error> {
    int_setting(d, fields::MIN_BACKOFF)
}

fn max_backoff<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Setting<i64>, D::Error> {
    int_setting(d, fields::MAX_BACKOFF)
}

/// Provider block as supplied by the host orchestration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawInput {
    pub email: Setting<String>,
    pub api_key: Setting<String>,
    pub api_token: Setting<String>,
    pub api_user_service_key: Setting<String>,
    #[serde(deserialize_with = "rps")]
    pub rps: Setting<i64>,
    #[serde(deserialize_with = "retries")]
    pub retries: Setting<i64>,
    #[serde(deserialize_with = "min_backoff")]
    pub min_backoff: Setting<i64>,
    #[serde(deserialize_with = "max_backoff")]
    pub max_backoff: Setting<i64>,
    pub api_client_logging: Setting<bool>,
    pub account_id: Setting<String>,
    pub api_hostname: Setting<String>,
    pub api_base_path: Setting<String>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a provider block from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn with_email(mut self, v: impl Into<String>) -> Self {
        self.email = Setting::Value(v.into());
        self
    }

    pub fn with_api_key(mut self, v: impl Into<String>) -> Self {
        self.api_key = Setting::Value(v.into());
        self
    }

    pub fn with_api_token(mut self, v: impl Into<String>) -> Self {
        self.api_token = Setting::Value(v.into());
        self
    }

    pub fn with_api_user_service_key(mut self, v: impl Into<String>) -> Self {
        self.api_user_service_key = Setting::Value(v.into());
        self
    }

    pub fn with_rps(mut self, v: i64) -> Self {
        self.rps = Setting::Value(v);
        self
    }

    pub fn with_retries(mut self, v: i64) -> Self {
        self.retries = Setting::Value(v);
        self
    }

    pub fn with_min_backoff(mut self, v: i64) -> Self {
        self.min_backoff = Setting::Value(v);
        self
    }

    pub fn with_max_backoff(mut self, v: i64) -> Self {
        self.max_backoff = Setting::Value(v);
        self
    }

    pub fn with_api_client_logging(mut self, v: bool) -> Self {
        self.api_client_logging = Setting::Value(v);
        self
    }

    pub fn with_account_id(mut self, v: impl Into<String>) -> Self {
        self.account_id = Setting::Value(v.into());
        self
    }

    pub fn with_api_hostname(mut self, v: impl Into<String>) -> Self {
        self.api_hostname = Setting::Value(v.into());
        self
    }

    pub fn with_api_base_path(mut self, v: impl Into<String>) -> Self {
        self.api_base_path = Setting::Value(v.into());
        self
    }
}
