// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use ifc_clash_detect::DetectConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Maximum request body size in MB (model uploads).
    pub max_body_mb: usize,
    /// Request timeout in seconds. Does not apply to SSE streams once started.
    pub request_timeout_secs: u64,
    /// Progress cadence for detection runs.
    pub detect: DetectConfig,
}

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment value");
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = DetectConfig::default();
        Self {
            port: env_or("PORT", 8080),
            max_body_mb: env_or("MAX_BODY_MB", 200),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 300),
            detect: DetectConfig {
                resolve_yield_every: env_or("RESOLVE_YIELD_EVERY", defaults.resolve_yield_every),
                symmetric_report_every: env_or(
                    "SYMMETRIC_REPORT_EVERY",
                    defaults.symmetric_report_every,
                ),
                cross_report_every: env_or("CROSS_REPORT_EVERY", defaults.cross_report_every),
                status_hold: Duration::from_millis(env_or(
                    "STATUS_HOLD_MS",
                    defaults.status_hold.as_millis() as u64,
                )),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_uses_default() {
        assert_eq!(env_or("IFC_CLASH_TEST_UNSET_VARIABLE", 42u16), 42);
    }

    #[test]
    fn unparseable_variable_uses_default() {
        std::env::set_var("IFC_CLASH_TEST_BAD_PORT", "eighty");
        assert_eq!(env_or("IFC_CLASH_TEST_BAD_PORT", 8080u16), 8080);
        std::env::remove_var("IFC_CLASH_TEST_BAD_PORT");
    }

    #[test]
    fn parseable_variable_is_used() {
        std::env::set_var("IFC_CLASH_TEST_CROSS_EVERY", " 250 ");
        assert_eq!(env_or("IFC_CLASH_TEST_CROSS_EVERY", 1_000u64), 250);
        std::env::remove_var("IFC_CLASH_TEST_CROSS_EVERY");
    }
}
