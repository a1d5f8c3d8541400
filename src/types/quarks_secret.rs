// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::annotations;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "quarks.cloudfoundry.org", version = "v1alpha1", kind = "QuarksSecret")]
#[kube(namespaced)]
#[kube(status = "QuarksSecretStatus")]
#[kube(shortname = "qsec")]
#[serde(rename_all = "camelCase")]
pub struct QuarksSecretSpec {
    /// Name of the generated Secret in the QuarksSecret's own namespace
    pub secret_name: String,
    #[serde(rename = "type")]
    pub secret_type: SecretType,
    /// Destinations the generated Secret is replicated to, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copies: Vec<CopyTarget>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SecretType {
    Password,
    Rsa,
    Ssh,
    Certificate,
    Tls,
    #[serde(rename = "basic-auth")]
    BasicAuth,
    #[serde(rename = "dockerconfigjson")]
    DockerConfigJson,
    /// Receives a replica of a QuarksSecret living in another namespace
    Copy,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub struct CopyTarget {
    pub name: String,
    pub namespace: String,
}

impl fmt::Display for CopyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuarksSecretStatus {
    /// Set by the generator once the Secret exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<bool>,
    /// False while a copy pass runs, true once it finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copied: Option<bool>,
}

impl QuarksSecret {
    /// The `<namespace>/<name>` identity written into `secret-copy-of`
    pub fn namespaced_name(&self) -> String {
        format!("{}/{}", self.namespace().unwrap_or_default(), self.name_any())
    }

    pub fn is_copy_type(&self) -> bool {
        self.spec.secret_type == SecretType::Copy
    }

}

/// The `secret-copy-of` annotation of a QuarksSecret or Secret, if any
pub fn copy_of_annotation<K: ResourceExt>(obj: &K) -> Option<&str> {
    obj.annotations().get(annotations::COPY_OF).map(String::as_str)
}
