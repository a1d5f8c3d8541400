// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types watched and written by the operator.

pub mod quarks_secret;

pub use quarks_secret::{
    copy_of_annotation, CopyTarget, QuarksSecret, QuarksSecretSpec, QuarksSecretStatus, SecretType,
};
