// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Controller owner references for replicas in the owned case

use crate::error::{CopierError, Result};
use crate::types::QuarksSecret;
use k8s_openapi::api::core::v1::Secret;
use kube::{Resource, ResourceExt};

/// Make `owner` the controller of `dependent`, so deleting the QuarksSecret
/// garbage collects the replica. Both must live in the same namespace.
pub fn set_owner(owner: &QuarksSecret, dependent: &mut Secret) -> Result<()> {
    let owner_ref = owner.controller_owner_ref(&()).ok_or_else(|| {
        CopierError::OwnerReferenceError(format!(
            "QuarksSecret {} has no uid",
            owner.namespaced_name()
        ))
    })?;

    let dependent_name = format!(
        "{}/{}",
        dependent.namespace().unwrap_or_default(),
        dependent.name_any()
    );

    if owner.namespace() != dependent.namespace() {
        return Err(CopierError::OwnerReferenceError(format!(
            "QuarksSecret {} cannot own secret {} across namespaces",
            owner.namespaced_name(),
            dependent_name
        )));
    }

    let refs = dependent.owner_references_mut();

    if let Some(other) = refs
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != owner_ref.uid)
    {
        return Err(CopierError::OwnerReferenceError(format!(
            "secret {} is already controlled by {} {}",
            dependent_name,
            other.kind,
            other.name
        )));
    }

    match refs.iter_mut().find(|r| r.uid == owner_ref.uid) {
        Some(existing) => *existing = owner_ref,
        None => refs.push(owner_ref),
    }

    Ok(())
}
