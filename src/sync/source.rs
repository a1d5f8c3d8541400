// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Source secret lookup

use crate::error::Result;
use crate::kubernetes::ClusterStore;
use crate::types::QuarksSecret;
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use tracing::{debug, instrument};

/// Fetch the Secret named by `spec.secretName` in the QuarksSecret's namespace.
/// `None` when it has not been generated yet.
#[instrument(skip(store, owner), fields(qsec = %owner.namespaced_name()))]
pub async fn resolve_source<S>(store: &S, owner: &QuarksSecret) -> Result<Option<Secret>>
where
    S: ClusterStore + ?Sized,
{
    let namespace = owner.namespace().unwrap_or_default();
    let secret = store.get_secret(&namespace, &owner.spec.secret_name).await?;

    if secret.is_none() {
        debug!(
            "Source secret {}/{} not found, nothing to copy yet",
            namespace, owner.spec.secret_name
        );
    }

    Ok(secret)
}
