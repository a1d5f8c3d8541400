// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Copy target authorization.
//!
//! A destination namespace receives a replica only when it holds a managing
//! object that names the source QuarksSecret in its `secret-copy-of`
//! annotation. The managing object is a QuarksSecret of type `copy` carrying
//! the source's name, or else a plain Secret carrying the target name. When
//! both exist the QuarksSecret wins.

use crate::constants::annotations;
use crate::error::Result;
use crate::kubernetes::ClusterStore;
use crate::types::{copy_of_annotation, CopyTarget, QuarksSecret};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::fmt;
use tracing::{debug, info, instrument};

/// The object in a destination namespace that decides about a replica
#[derive(Debug, Clone)]
pub enum ManagingObject {
    /// A `copy` QuarksSecret; it becomes the controller owner of the replica
    Owned(QuarksSecret),
    /// A plain Secret that is updated in place, never created or owned
    Foreign(Secret),
}

impl ManagingObject {
    fn copy_of(&self) -> Option<&str> {
        match self {
            ManagingObject::Owned(qsec) => copy_of_annotation(qsec),
            ManagingObject::Foreign(secret) => copy_of_annotation(secret),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ManagingObject::Owned(_) => "QuarksSecret",
            ManagingObject::Foreign(_) => "Secret",
        }
    }
}

/// Why a copy target did not receive a replica
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoManagingObject,
    NotCopyType,
    AnnotationMismatch { found: Option<String> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoManagingObject => write!(f, "no QuarksSecret or Secret found"),
            SkipReason::NotCopyType => write!(f, "QuarksSecret is not of type 'copy'"),
            SkipReason::AnnotationMismatch { found: None } => {
                write!(f, "{} annotation missing", annotations::COPY_OF)
            }
            SkipReason::AnnotationMismatch { found: Some(value) } => {
                write!(f, "{} annotation is '{}'", annotations::COPY_OF, value)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Validation {
    Authorized(ManagingObject),
    Skipped(SkipReason),
}

/// Find the managing object for `target` and check that it opted in to
/// copies of `source`. Lookup failures other than not-found are errors.
#[instrument(skip(store, source), fields(qsec = %source.namespaced_name(), copy_target = %target))]
pub async fn validate_target<S>(
    store: &S,
    target: &CopyTarget,
    source: &QuarksSecret,
) -> Result<Validation>
where
    S: ClusterStore + ?Sized,
{
    let target_qsec = store
        .get_quarks_secret(&target.namespace, &source.name_any())
        .await?;
    let target_secret = store.get_secret(&target.namespace, &target.name).await?;

    let managing = match (target_qsec, target_secret) {
        (None, None) => {
            info!(
                "No QuarksSecret or Secret found in the target namespace '{}'",
                target.namespace
            );
            return Ok(Validation::Skipped(SkipReason::NoManagingObject));
        }
        (Some(qsec), secret) => {
            if secret.is_some() {
                info!("Both QuarksSecret and Secret found, giving preference to QuarksSecret");
            }
            ManagingObject::Owned(qsec)
        }
        (None, Some(secret)) => ManagingObject::Foreign(secret),
    };

    let validation = authorize(managing, &source.namespaced_name());
    if let Validation::Skipped(reason) = &validation {
        info!("Skipping copy to {}: {}", target, reason);
    }
    Ok(validation)
}

/// Check a managing object against the `<namespace>/<name>` of the source.
pub fn authorize(managing: ManagingObject, copy_of: &str) -> Validation {
    if let ManagingObject::Owned(qsec) = &managing {
        if !qsec.is_copy_type() {
            return Validation::Skipped(SkipReason::NotCopyType);
        }
    }

    if managing.copy_of() == Some(copy_of) {
        debug!("{} authorizes copies of {}", managing.kind(), copy_of);
        return Validation::Authorized(managing);
    }

    Validation::Skipped(SkipReason::AnnotationMismatch {
        found: managing.copy_of().map(str::to_string),
    })
}
