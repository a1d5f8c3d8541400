// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! QuarksSecret reconciler - runs a copy pass for a QuarksSecret whenever its
//! spec, its generated Secret or one of its opted-in copy targets changes.
//!
//! Status writes do not bump `metadata.generation`, so the generation filter on
//! the QuarksSecret stream keeps a pass from triggering itself.

use crate::config::Config;
use crate::error::{CopierError, Result};
use crate::kubernetes::{KubeEventPublisher, KubeStore};
use crate::sync::reconcile_copies;
use crate::types::{copy_of_annotation, QuarksSecret};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{
        controller::Action,
        predicates,
        reflector::{self, ObjectRef},
        Controller, WatchStreamExt,
    },
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::{watcher, Config as WatcherConfig};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct QuarksSecretReconciler {
    client: Client,
    config: Config,
    events: KubeEventPublisher,
}

impl QuarksSecretReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        let events = KubeEventPublisher::new(client.clone());
        Self {
            client,
            config,
            events,
        }
    }

    fn api<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = kube::core::NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match &self.config.watch_namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        if let Some(namespace) = &self.config.watch_namespace {
            info!("Watching namespace {}", namespace);
        }
        let quarks_secrets: Api<QuarksSecret> = self.api();
        let copies: Api<QuarksSecret> = self.api();
        let secrets: Api<Secret> = self.api();

        let (reader, writer) = reflector::store();
        let owners = watcher(quarks_secrets, WatcherConfig::default())
            .default_backoff()
            .reflect(writer)
            .applied_objects()
            .predicate_filter(predicates::generation);
        let index = reader.clone();
        let context = Arc::new(self);

        Controller::for_stream(owners, reader)
            .watches(secrets, WatcherConfig::default(), move |secret| {
                owners_for_secret(&secret, &index.state())
            })
            .watches(copies, WatcherConfig::default(), |qsec| owner_for_copy(&qsec))
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled QuarksSecret: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

/// The QuarksSecret named by a `secret-copy-of` annotation
fn copy_source<K: ResourceExt>(obj: &K) -> Option<ObjectRef<QuarksSecret>> {
    let (namespace, name) = copy_of_annotation(obj)?.split_once('/')?;
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some(ObjectRef::new(name).within(namespace))
}

/// Owners affected by a Secret change: the QuarksSecrets generating it, and
/// the source it opted in to receive copies of.
fn owners_for_secret(
    secret: &Secret,
    candidates: &[Arc<QuarksSecret>],
) -> Vec<ObjectRef<QuarksSecret>> {
    let namespace = secret.namespace();
    let name = secret.name_any();

    let mut owners: Vec<ObjectRef<QuarksSecret>> = candidates
        .iter()
        .filter(|qsec| {
            !qsec.is_copy_type() && qsec.namespace() == namespace && qsec.spec.secret_name == name
        })
        .map(|qsec| ObjectRef::from_obj(&**qsec))
        .collect();

    if let Some(source) = copy_source(secret) {
        if !owners.contains(&source) {
            owners.push(source);
        }
    }
    owners
}

/// A `copy` QuarksSecret change concerns the source it names
fn owner_for_copy(qsec: &QuarksSecret) -> Option<ObjectRef<QuarksSecret>> {
    if !qsec.is_copy_type() {
        return None;
    }
    copy_source(qsec)
}

async fn reconcile(qsec: Arc<QuarksSecret>, ctx: Arc<QuarksSecretReconciler>) -> Result<Action> {
    // Receiving ends are written by the pass of their source
    if qsec.is_copy_type() {
        debug!(
            "QuarksSecret {} is of type 'copy', nothing to replicate",
            qsec.namespaced_name()
        );
        return Ok(Action::await_change());
    }

    let store = KubeStore::new(ctx.client.clone(), ctx.config.ctx_timeout);
    let report = reconcile_copies(&store, &ctx.events, &qsec).await?;
    debug!(
        "QuarksSecret {}: {} of {} copies in sync",
        qsec.namespaced_name(),
        report.synced(),
        qsec.spec.copies.len()
    );

    Ok(Action::requeue(ctx.config.resync_interval))
}

fn error_policy(
    _qsec: Arc<QuarksSecret>,
    error: &CopierError,
    ctx: Arc<QuarksSecretReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(ctx.config.error_requeue)
}
