//! Cloudflare API client for Flareform
//!
//! Builds the single API client a configured provider hands to every
//! resource and data source.
//!
//! # Features
//!
//! - Global rate limiting (token bucket shared by all clones of the client)
//! - Bounded exponential backoff for transport failures and transient statuses
//! - Credential headers for API key, API token and user service key modes
//! - Optional provider-level account scoping
//!
//! # Example
//!
//! ```ignore
//! use flareform_client::ClientBuilder;
//! use flareform_config::{ConfigResolver, ProcessEnv, RawInput, Versions};
//!
//! let config = ConfigResolver::new(ProcessEnv, Versions::new("1.5.7", "4.0.0"))
//!     .resolve(&RawInput::new())?;
//! let client = ClientBuilder::new(&config).build()?;
//!
//! let zones: serde_json::Value = client.get("/zones").await?;
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod rate_limit;
pub mod retry;

pub use builder::ClientBuilder;
pub use client::{ApiClient, ApiResponse};
pub use error::{ApiMessage, ClientError, Result};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use retry::RetryPolicy;
