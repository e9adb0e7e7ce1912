//! Configuration error and diagnostic types

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while resolving provider configuration.
///
/// Every variant is recoverable by the caller supplying different input.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} value {value:?} is not a valid integer")]
    InvalidInteger {
        field: &'static str,
        var: &'static str,
        value: String,
    },

    #[error("{var} value {value:?} is not a valid boolean (expected true, false, 1 or 0)")]
    InvalidBool {
        field: &'static str,
        var: &'static str,
        value: String,
    },

    /// `value` keeps the digits as supplied, even past the range of `i64`.
    #[error("{field} value of {value} must not be negative")]
    Negative { field: &'static str, value: String },

    #[error("{field} value of {value} is too large, try a smaller value.")]
    TooLarge { field: &'static str, value: String },

    #[error("{summary}")]
    Rule {
        fields: Vec<&'static str>,
        summary: String,
        detail: String,
    },

    #[error("unsupported configuration format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Attribute names the error refers to, in declaration order.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            ConfigError::InvalidInteger { field, .. }
            | ConfigError::InvalidBool { field, .. }
            | ConfigError::Negative { field, .. }
            | ConfigError::TooLarge { field, .. } => vec![*field],
            ConfigError::Rule { fields, .. } => fields.clone(),
            _ => Vec::new(),
        }
    }

    /// Convert into a single error-severity diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let detail = match self {
            ConfigError::Rule { detail, .. } => detail.clone(),
            other => other.to_string(),
        };
        Diagnostic {
            severity: Severity::Error,
            fields: self.fields().into_iter().map(str::to_string).collect(),
            summary: self.to_string(),
            detail,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single finding handed back to the host orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub fields: Vec<String>,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            fields: Vec::new(),
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(field: &str, summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            fields: vec![field.to_string()],
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            write!(f, "{}: {}", self.severity, self.summary)
        } else {
            write!(
                f,
                "{} [{}]: {}",
                self.severity,
                self.fields.join(", "),
                self.summary
            )
        }
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.0.extend(other);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ConfigError> for Diagnostics {
    fn from(err: ConfigError) -> Self {
        Self(vec![err.to_diagnostic()])
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(items: Vec<Diagnostic>) -> Self {
        Self(items)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}
