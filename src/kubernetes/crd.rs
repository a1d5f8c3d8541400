// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! QuarksSecret CRD discovery

use crate::constants::crd::{GROUP, KIND, POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS, VERSION};
use crate::error::Result;
use kube::{core::GroupVersionKind, discovery::Discovery, Client};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Poll delays doubling from `POLL_INTERVAL_SECS` up to `POLL_MAX_INTERVAL_SECS`
struct Backoff {
    next: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            next: POLL_INTERVAL_SECS,
        }
    }

    fn delay(&mut self) -> Duration {
        let current = self.next;
        self.next = (current * 2).min(POLL_MAX_INTERVAL_SECS);
        Duration::from_secs(current)
    }
}

/// Block until the API server serves the QuarksSecret CRD.
pub async fn wait_for_quarks_secret_crd(client: &Client) -> Result<()> {
    let gvk = GroupVersionKind::gvk(GROUP, VERSION, KIND);
    let mut backoff = Backoff::new();

    loop {
        let delay = backoff.delay();
        match is_served(client, &gvk).await {
            Ok(true) => {
                info!("{} CRD ({}/{}) is available", KIND, GROUP, VERSION);
                return Ok(());
            }
            Ok(false) => info!(
                "{} CRD ({}/{}) not served yet, checking again in {:?}",
                KIND, GROUP, VERSION, delay
            ),
            Err(e) => warn!(
                "Discovery of {} CRD failed: {}, checking again in {:?}",
                KIND, e, delay
            ),
        }
        tokio::time::sleep(delay).await;
    }
}

async fn is_served(client: &Client, gvk: &GroupVersionKind) -> Result<bool> {
    let discovery = Discovery::new(client.clone()).filter(&[GROUP]).run().await?;
    let served = discovery.resolve_gvk(gvk).is_some();
    debug!("Discovery of {:?}: served={}", gvk, served);
    Ok(served)
}
