// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used on QuarksSecrets and Secrets
pub mod annotations {
    /// `<namespace>/<name>` of the QuarksSecret allowed to write into this object
    pub const COPY_OF: &str = "quarks.cloudfoundry.org/secret-copy-of";
}

/// Kubernetes label keys used on Secrets
pub mod labels {
    /// Marks a Secret as produced by the generator; copied verbatim to replicas
    pub const SECRET_KIND: &str = "quarks.cloudfoundry.org/secret-kind";
}

/// The operator name used as field manager
pub const OPERATOR_NAME: &str = "quarks-copier";

/// QuarksSecret CRD coordinates and polling configuration
pub mod crd {
    pub const GROUP: &str = "quarks.cloudfoundry.org";
    pub const VERSION: &str = "v1alpha1";
    pub const KIND: &str = "QuarksSecret";
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Defaults for the environment configuration
pub mod defaults {
    pub const CTX_TIMEOUT_SECS: u64 = 30;
    pub const RESYNC_INTERVAL_SECS: u64 = 300;
    pub const ERROR_REQUEUE_SECS: u64 = 60;
}
