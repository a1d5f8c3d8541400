// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopierError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Owner reference failed: {0}")]
    OwnerReferenceError(String),

    #[error("Secret copy failed: {0}")]
    SecretCopyError(String),

    #[error("Copy to {target} failed: {source}")]
    TargetError {
        target: String,
        #[source]
        source: Box<CopierError>,
    },
}

impl CopierError {
    /// True when the API server answered 404, directly or behind a target wrapper.
    pub fn is_not_found(&self) -> bool {
        match self {
            CopierError::KubeError(kube::Error::Api(resp)) => resp.code == 404,
            CopierError::TargetError { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CopierError>;
