// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery, deadline-bound object access and events.

pub mod crd;
pub mod events;
pub mod store;

pub use crd::wait_for_quarks_secret_crd;
pub use events::{EventPublisher, KubeEventPublisher};
pub use store::{ClusterStore, KubeStore};
