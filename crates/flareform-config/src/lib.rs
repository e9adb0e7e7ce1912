//! Flareform provider configuration
//!
//! Resolves the provider block of a Cloudflare provider into a validated
//! [`ResolvedConfig`] before any API client exists.
//!
//! # Precedence
//!
//! Every attribute is resolved independently:
//!
//! 1. the explicit value in the provider block, when it carries one
//! 2. the attribute's `CLOUDFLARE_*` environment variable, when non-empty
//! 3. the built-in default
//!
//! # Example
//!
//! ```
//! use flareform_config::{ConfigResolver, RawInput, StaticEnv, Versions};
//!
//! let env = StaticEnv::new().with("CLOUDFLARE_RPS", "10");
//! let resolver = ConfigResolver::new(env, Versions::new("1.5.7", "4.0.0"));
//!
//! let raw = RawInput::new().with_api_token("AbCdEfGhIjKlMnOpQrStUvWxYz0123456789-_Ab");
//! let config = resolver.resolve(&raw).unwrap();
//!
//! assert_eq!(config.rps(), 10);
//! assert_eq!(config.base_url(), "https://api.cloudflare.com/client/v4");
//! ```

pub mod env;
pub mod error;
pub mod fields;
pub mod input;
pub mod resolved;
pub mod resolver;
pub mod rules;

pub use env::{EnvLookup, ProcessEnv, StaticEnv};
pub use error::{ConfigError, Diagnostic, Diagnostics, Result, Severity};
pub use fields::{FIELDS, FieldKind, FieldSpec, describe};
pub use input::{RawInput, Setting};
pub use resolved::{CredentialMode, Credentials, ResolvedConfig, Versions};
pub use resolver::{ConfigResolver, INT_WIDTH, Source};
pub use rules::{Arity, RULES, Rule};
