#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const TOKEN: &str = "AbCdEfGhIjKlMnOpQrStUvWxYz0123456789-_Ab";
pub const API_KEY: &str = "0123456789abcdef0123456789abcdef01234";

/// Every variable the provider consults.
pub const CLOUDFLARE_VARS: &[&str] = &[
    "CLOUDFLARE_EMAIL",
    "CLOUDFLARE_API_KEY",
    "CLOUDFLARE_API_TOKEN",
    "CLOUDFLARE_API_USER_SERVICE_KEY",
    "CLOUDFLARE_RPS",
    "CLOUDFLARE_RETRIES",
    "CLOUDFLARE_MIN_BACKOFF",
    "CLOUDFLARE_MAX_BACKOFF",
    "CLOUDFLARE_API_CLIENT_LOGGING",
    "CLOUDFLARE_ACCOUNT_ID",
    "CLOUDFLARE_API_HOSTNAME",
    "CLOUDFLARE_API_BASE_PATH",
];

/// Pairs for `temp_env::with_vars` that unset every provider variable
/// except the ones given.
pub fn clean_env<'a>(set: &[(&'a str, &'a str)]) -> Vec<(&'a str, Option<&'a str>)> {
    CLOUDFLARE_VARS
        .iter()
        .map(|var| {
            let value = set.iter().find(|(k, _)| k == var).map(|(_, v)| *v);
            (*var, value)
        })
        .collect()
}

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }
}
