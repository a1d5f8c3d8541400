// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One copy pass for a QuarksSecret.

use crate::error::{CopierError, Result};
use crate::kubernetes::events::{actions, reasons};
use crate::kubernetes::{ClusterStore, EventPublisher};
use crate::sync::secrets::{synchronize, SyncOutcome};
use crate::sync::source::resolve_source;
use crate::sync::status::{mark_in_progress, mark_settled};
use crate::sync::validator::{validate_target, SkipReason, Validation};
use crate::types::{CopyTarget, QuarksSecret};
use k8s_openapi::api::core::v1::Secret;
use kube::runtime::events::EventType;
use kube::Resource;
use tracing::{error, info, instrument};

/// Result for one copy target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Synced(SyncOutcome),
    Skipped(SkipReason),
}

/// What a completed pass did
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    pub source_found: bool,
    /// In declared order
    pub targets: Vec<(CopyTarget, TargetOutcome)>,
}

impl CopyReport {
    /// Number of targets that received (or already held) the replica
    pub fn synced(&self) -> usize {
        self.targets
            .iter()
            .filter(|(_, o)| matches!(o, TargetOutcome::Synced(_)))
            .count()
    }
}

/// Replicate the source Secret of `owner` into its declared copy targets.
///
/// `status.copied` is set to false before and to true after the targets are
/// processed, whatever their outcome. The first failing target stops the
/// pass; its error is returned after the status is settled. Skips, writes
/// and the failure are recorded as events on `owner`.
#[instrument(skip(store, events, owner), fields(qsec = %owner.namespaced_name()))]
pub async fn reconcile_copies<S, E>(
    store: &S,
    events: &E,
    owner: &QuarksSecret,
) -> Result<CopyReport>
where
    S: ClusterStore + ?Sized,
    E: EventPublisher + ?Sized,
{
    info!("Reconciling copies of QuarksSecret {}", owner.namespaced_name());

    mark_in_progress(store, owner).await;

    let result = copy_to_targets(store, events, owner).await;
    if let Err(e) = &result {
        error!(
            "Error handling copies of QuarksSecret '{}': {}",
            owner.namespaced_name(),
            e
        );
    }

    mark_settled(store, owner).await;
    result
}

async fn copy_to_targets<S, E>(
    store: &S,
    events: &E,
    owner: &QuarksSecret,
) -> Result<CopyReport>
where
    S: ClusterStore + ?Sized,
    E: EventPublisher + ?Sized,
{
    let mut report = CopyReport::default();

    if owner.spec.copies.is_empty() {
        return Ok(report);
    }

    let Some(source) = resolve_source(store, owner).await? else {
        return Ok(report);
    };
    report.source_found = true;

    let copy_of = owner.namespaced_name();
    let regarding = owner.object_ref(&());
    for target in &owner.spec.copies {
        let outcome = match copy_to_target(store, owner, target, &source, &copy_of).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let e = CopierError::TargetError {
                    target: target.to_string(),
                    source: Box::new(e),
                };
                events
                    .publish(
                        &regarding,
                        EventType::Warning,
                        reasons::COPY_RECONCILE,
                        actions::COPY,
                        e.to_string(),
                    )
                    .await;
                return Err(e);
            }
        };
        if let Some((reason, action, note)) = event_for(target, &outcome) {
            events
                .publish(&regarding, EventType::Normal, reason, action, note)
                .await;
        }
        report.targets.push((target.clone(), outcome));
    }

    Ok(report)
}

/// Reason, action and note of the event recorded for a target, if any
fn event_for(
    target: &CopyTarget,
    outcome: &TargetOutcome,
) -> Option<(&'static str, &'static str, String)> {
    match outcome {
        TargetOutcome::Synced(SyncOutcome::Unchanged) => None,
        TargetOutcome::Synced(written) => {
            let verb = if *written == SyncOutcome::Created {
                "created"
            } else {
                "updated"
            };
            Some((
                reasons::COPY_RECONCILE,
                actions::COPY,
                format!(
                    "Copy secret '{}' has been {} in namespace '{}'",
                    target.name, verb, target.namespace
                ),
            ))
        }
        TargetOutcome::Skipped(reason) => Some((
            reasons::VALIDATE_TARGET_NAMESPACE,
            actions::VALIDATE,
            format!("Skip copy to '{}': {}", target, reason),
        )),
    }
}

async fn copy_to_target<S>(
    store: &S,
    owner: &QuarksSecret,
    target: &CopyTarget,
    source: &Secret,
    copy_of: &str,
) -> Result<TargetOutcome>
where
    S: ClusterStore + ?Sized,
{
    match validate_target(store, target, owner).await? {
        Validation::Authorized(managing) => {
            let outcome = synchronize(store, target, source, copy_of, &managing).await?;
            Ok(TargetOutcome::Synced(outcome))
        }
        Validation::Skipped(reason) => {
            info!(
                "Skip copy creation: Secret/QuarksSecret '{}' must exist and have the appropriate annotation to receive a copy",
                target
            );
            Ok(TargetOutcome::Skipped(reason))
        }
    }
}
