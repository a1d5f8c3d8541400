// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Replica construction and the two write paths

use crate::constants::annotations;
use crate::error::Result;
use crate::kubernetes::ClusterStore;
use crate::sync::owner::set_owner;
use crate::sync::validator::ManagingObject;
use crate::types::{CopyTarget, QuarksSecret};
use k8s_openapi::api::core::v1::Secret;
use kube::{api::ObjectMeta, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// What a synchronize call did to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Build the replica of `source` for `target`: data, labels and annotations
/// verbatim, with `secret-copy-of` forced to `copy_of`.
pub fn build_replica(target: &CopyTarget, source: &Secret, copy_of: &str) -> Secret {
    let mut replica_annotations = source.metadata.annotations.clone().unwrap_or_default();
    replica_annotations.insert(annotations::COPY_OF.to_string(), copy_of.to_string());

    Secret {
        metadata: ObjectMeta {
            name: Some(target.name.clone()),
            namespace: Some(target.namespace.clone()),
            labels: source.metadata.labels.clone(),
            annotations: Some(replica_annotations),
            ..Default::default()
        },
        data: source.data.clone(),
        type_: source.type_.clone(),
        ..Default::default()
    }
}

/// Write the replica of `source` into `target`, through the write path the
/// managing object allows.
#[instrument(skip(store, source, managing), fields(copy_target = %target, managed_by = managing.kind()))]
pub async fn synchronize<S>(
    store: &S,
    target: &CopyTarget,
    source: &Secret,
    copy_of: &str,
    managing: &ManagingObject,
) -> Result<SyncOutcome>
where
    S: ClusterStore + ?Sized,
{
    let replica = build_replica(target, source, copy_of);

    let outcome = match managing {
        ManagingObject::Owned(owner) => create_or_update_owned(store, replica, owner).await?,
        ManagingObject::Foreign(existing) => update_foreign(store, replica, existing).await?,
    };

    match outcome {
        SyncOutcome::Unchanged => debug!("Copy secret '{}' is up to date", target),
        _ => info!("Copy secret '{}' has been {:?}", target, outcome),
    }

    Ok(outcome)
}

/// Create the replica owned by `owner`, or overlay the payload on the existing
/// object. Fields the payload does not carry are left alone.
async fn create_or_update_owned<S>(
    store: &S,
    mut replica: Secret,
    owner: &QuarksSecret,
) -> Result<SyncOutcome>
where
    S: ClusterStore + ?Sized,
{
    let namespace = replica.namespace().unwrap_or_default();
    let name = replica.name_any();

    let Some(existing) = store.get_secret(&namespace, &name).await? else {
        set_owner(owner, &mut replica)?;
        store.create_secret(&replica).await?;
        return Ok(SyncOutcome::Created);
    };

    let mut merged = existing.clone();
    apply_payload(&mut merged, &replica);
    set_owner(owner, &mut merged)?;

    if merged == existing {
        return Ok(SyncOutcome::Unchanged);
    }

    // merged keeps the resourceVersion we read, so a concurrent writer makes this fail
    store.update_secret(&merged).await?;
    Ok(SyncOutcome::Updated)
}

/// Replace a Secret we do not own. Never creates; a vanished target is an
/// error. `existing` is the object read while validating the target.
async fn update_foreign<S>(store: &S, mut replica: Secret, existing: &Secret) -> Result<SyncOutcome>
where
    S: ClusterStore + ?Sized,
{
    // type is immutable on Secrets
    replica.type_ = existing.type_.clone();

    let outcome = if carries_payload(existing, &replica) {
        SyncOutcome::Unchanged
    } else {
        SyncOutcome::Updated
    };

    store.update_secret(&replica).await?;
    Ok(outcome)
}

/// Data is replaced; labels and annotations are merged, so keys dropped from
/// the source stay on the replica.
fn apply_payload(target: &mut Secret, payload: &Secret) {
    target.data = payload.data.clone();

    if let Some(payload_labels) = non_empty(&payload.metadata.labels) {
        target
            .labels_mut()
            .extend(payload_labels.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Some(payload_annotations) = non_empty(&payload.metadata.annotations) {
        target
            .annotations_mut()
            .extend(payload_annotations.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// Whether `existing` already holds exactly the replica's data, labels and annotations
fn carries_payload(existing: &Secret, replica: &Secret) -> bool {
    non_empty(&existing.data) == non_empty(&replica.data)
        && non_empty(&existing.metadata.labels) == non_empty(&replica.metadata.labels)
        && non_empty(&existing.metadata.annotations) == non_empty(&replica.metadata.annotations)
}

fn non_empty<V>(map: &Option<BTreeMap<String, V>>) -> Option<&BTreeMap<String, V>> {
    map.as_ref().filter(|m| !m.is_empty())
}
