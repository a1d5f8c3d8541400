// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Deadline for all cluster calls made during one copy pass
    pub ctx_timeout: Duration,
    /// Only watch Secrets in this namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Requeue delay after a successful pass, picks up newly declared copies
    pub resync_interval: Duration,
    pub error_requeue: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ctx_timeout: Duration::from_secs(defaults::CTX_TIMEOUT_SECS),
            watch_namespace: None,
            resync_interval: Duration::from_secs(defaults::RESYNC_INTERVAL_SECS),
            error_requeue: Duration::from_secs(defaults::ERROR_REQUEUE_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secs = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{} must be a number of seconds, got '{}'", key, v)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());

        Ok(Config {
            ctx_timeout: secs("CTX_TIMEOUT_SECS", defaults::CTX_TIMEOUT_SECS)?,
            watch_namespace,
            resync_interval: secs("RESYNC_INTERVAL_SECS", defaults::RESYNC_INTERVAL_SECS)?,
            error_requeue: secs("ERROR_REQUEUE_SECS", defaults::ERROR_REQUEUE_SECS)?,
        })
    }
}
