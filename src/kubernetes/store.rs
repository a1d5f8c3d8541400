// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Object store used by the copy logic.
//!
//! Every pass gets its own [`KubeStore`], created with the configured timeout.
//! All calls made through it share one deadline, so a slow API server fails
//! the rest of the pass instead of stalling it. Reads go straight to the API
//! server; nothing is cached between calls or passes.

use crate::constants::OPERATOR_NAME;
use crate::error::{CopierError, Result};
use crate::types::QuarksSecret;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{Patch, PatchParams, PostParams},
    Api, Client, ResourceExt,
};
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument};

/// Cluster access needed by one copy pass.
///
/// Lookups return `Ok(None)` when the object does not exist; every other
/// failure is an error.
#[async_trait]
pub trait ClusterStore: Send + Sync {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    async fn get_quarks_secret(&self, namespace: &str, name: &str)
        -> Result<Option<QuarksSecret>>;

    async fn create_secret(&self, secret: &Secret) -> Result<Secret>;

    /// Replace an existing Secret. Conditional on `resourceVersion` when the
    /// object carries one, unconditional otherwise. Never creates.
    async fn update_secret(&self, secret: &Secret) -> Result<Secret>;

    /// Persist `status.copied` on the status subresource only.
    async fn set_copied_status(&self, owner: &QuarksSecret, copied: bool) -> Result<()>;
}

/// [`ClusterStore`] backed by the Kubernetes API, bounded by a deadline.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    deadline: Instant,
}

impl KubeStore {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            deadline: Instant::now() + timeout,
        }
    }

    async fn bounded<T, F>(&self, operation: impl Into<String>, fut: F) -> Result<T>
    where
        F: Future<Output = kube::Result<T>> + Send,
    {
        match timeout_at(self.deadline, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CopierError::DeadlineExceeded(operation.into())),
        }
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn quarks_secrets(&self, namespace: &str) -> Api<QuarksSecret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    }
}

/// Namespace and name of an object about to be written
fn object_key(secret: &Secret) -> Result<(String, String)> {
    match (secret.namespace(), secret.metadata.name.clone()) {
        (Some(namespace), Some(name)) => Ok((namespace, name)),
        _ => Err(CopierError::SecretCopyError(
            "secret is missing a namespace or name".to_string(),
        )),
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    #[instrument(skip(self))]
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let api = self.secrets(namespace);
        self.bounded(format!("get secret {}/{}", namespace, name), api.get_opt(name))
            .await
    }

    #[instrument(skip(self))]
    async fn get_quarks_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<QuarksSecret>> {
        let api = self.quarks_secrets(namespace);
        self.bounded(
            format!("get quarkssecret {}/{}", namespace, name),
            api.get_opt(name),
        )
        .await
    }

    async fn create_secret(&self, secret: &Secret) -> Result<Secret> {
        let (namespace, name) = object_key(secret)?;
        let api = self.secrets(&namespace);
        let pp = post_params();
        debug!("Creating secret {}/{}", namespace, name);
        self.bounded(
            format!("create secret {}/{}", namespace, name),
            api.create(&pp, secret),
        )
        .await
    }

    async fn update_secret(&self, secret: &Secret) -> Result<Secret> {
        let (namespace, name) = object_key(secret)?;
        let api = self.secrets(&namespace);
        let pp = post_params();
        debug!("Updating secret {}/{}", namespace, name);
        self.bounded(
            format!("update secret {}/{}", namespace, name),
            api.replace(&name, &pp, secret),
        )
        .await
    }

    async fn set_copied_status(&self, owner: &QuarksSecret, copied: bool) -> Result<()> {
        let namespace = owner.namespace().unwrap_or_default();
        let name = owner.name_any();
        let api = self.quarks_secrets(&namespace);
        let patch = json!({ "status": { "copied": copied } });
        let pp = PatchParams::default();
        self.bounded(
            format!("patch quarkssecret status {}/{}", namespace, name),
            api.patch_status(&name, &pp, &Patch::Merge(&patch)),
        )
        .await?;
        Ok(())
    }
}
