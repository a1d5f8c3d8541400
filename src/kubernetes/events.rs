// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes Events recorded on the source QuarksSecret.
//!
//! Publishing never fails a pass: errors from the API server are logged.

use crate::constants::OPERATOR_NAME;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::Client;
use tracing::warn;

/// Event reasons, shown in the REASON column of `kubectl get events`
pub mod reasons {
    /// A copy target was checked and did not opt in
    pub const VALIDATE_TARGET_NAMESPACE: &str = "ValidateTargetNamespace";
    /// A replica was created, updated or failed to be written
    pub const COPY_RECONCILE: &str = "CopyReconcile";
}

/// Event actions
pub mod actions {
    pub const VALIDATE: &str = "Validate";
    pub const COPY: &str = "Copy";
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        regarding: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: String,
    );
}

/// [`EventPublisher`] backed by `kube::runtime::events::Recorder`
#[derive(Clone)]
pub struct KubeEventPublisher {
    recorder: Recorder,
}

impl KubeEventPublisher {
    pub fn new(client: Client) -> Self {
        let reporter = Reporter {
            controller: OPERATOR_NAME.to_string(),
            instance: None,
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventPublisher for KubeEventPublisher {
    async fn publish(
        &self,
        regarding: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: String,
    ) {
        let event = Event {
            type_,
            reason: reason.to_string(),
            note: Some(note),
            action: action.to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, regarding).await {
            warn!(
                "Failed to publish {} event on {}/{}: {}",
                reason,
                regarding.namespace.as_deref().unwrap_or_default(),
                regarding.name.as_deref().unwrap_or_default(),
                e
            );
        }
    }
}
