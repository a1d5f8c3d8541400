// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `status.copied` bracketing of a copy pass. Best effort: failures are logged.

use crate::kubernetes::ClusterStore;
use crate::types::QuarksSecret;
use tracing::error;

pub async fn mark_in_progress<S>(store: &S, owner: &QuarksSecret)
where
    S: ClusterStore + ?Sized,
{
    update_copy_status(store, owner, false).await;
}

pub async fn mark_settled<S>(store: &S, owner: &QuarksSecret)
where
    S: ClusterStore + ?Sized,
{
    update_copy_status(store, owner, true).await;
}

async fn update_copy_status<S>(store: &S, owner: &QuarksSecret, copied: bool)
where
    S: ClusterStore + ?Sized,
{
    if let Err(e) = store.set_copied_status(owner, copied).await {
        error!(
            "Could not update copied status of QuarksSecret '{}': {}",
            owner.namespaced_name(),
            e
        );
    }
}
