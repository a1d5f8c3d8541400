// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Replication of generated secrets into other namespaces.
//!
//! One pass resolves the source Secret of a QuarksSecret, checks every
//! declared copy target for a managing object that opted in through the
//! `secret-copy-of` annotation, and writes the replica.

pub mod manager;
pub mod owner;
pub mod secrets;
pub mod source;
pub mod status;
pub mod validator;

pub use manager::{reconcile_copies, CopyReport, TargetOutcome};
pub use owner::set_owner;
pub use secrets::{build_replica, synchronize, SyncOutcome};
pub use source::resolve_source;
pub use status::{mark_in_progress, mark_settled};
pub use validator::{validate_target, ManagingObject, SkipReason, Validation};
