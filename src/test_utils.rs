// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked Kubernetes API, an in-memory object store and fixtures.

use crate::constants::{annotations, labels};
use crate::error::{CopierError, Result};
use crate::kubernetes::{ClusterStore, EventPublisher};
use crate::types::{CopyTarget, QuarksSecret, QuarksSecretSpec, SecretType};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{ObjectReference, Secret};
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::error::ErrorResponse;
use kube::runtime::events::EventType;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
    latency: Option<Duration>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            latency: None,
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Delay every response
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Method and path of every request received so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        self.requests.lock().unwrap().push((method, path));
        let latency = self.latency;

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            // Unmatched requests answer 404
            let (status, body) =
                response.unwrap_or_else(|| (404, not_found_json("resource", "unknown")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

pub fn server_error_json() -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": "etcdserver: request timed out",
        "reason": "InternalError",
        "code": 500
    })
    .to_string()
}

/// Create a mock Secret JSON response
pub fn secret_json(namespace: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1"
        },
        "data": { "password": "c2VjdXJlcGFzc3dvcmQ=" }
    })
    .to_string()
}

/// Create a mock QuarksSecret JSON response
pub fn quarks_secret_json(namespace: &str, name: &str, secret_type: &str) -> String {
    serde_json::json!({
        "apiVersion": "quarks.cloudfoundry.org/v1alpha1",
        "kind": "QuarksSecret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid"
        },
        "spec": {
            "secretName": "generated-secret-copy",
            "type": secret_type
        }
    })
    .to_string()
}

pub fn api_error(code: u16, reason: &str) -> CopierError {
    CopierError::KubeError(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("fake store: {}", reason),
        reason: reason.to_string(),
        code,
    }))
}

pub fn make_secret(namespace: &str, name: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Default::default()
    }
}

/// A generated source Secret as the generator leaves it
pub fn make_generated_secret(namespace: &str, name: &str, password: &str) -> Secret {
    let mut secret = make_secret(namespace, name, &[("password", password)]);
    secret.metadata.labels = Some(BTreeMap::from([(
        labels::SECRET_KIND.to_string(),
        "generated".to_string(),
    )]));
    secret
}

pub fn make_quarks_secret(
    namespace: &str,
    name: &str,
    secret_type: SecretType,
    copies: &[(&str, &str)],
) -> QuarksSecret {
    QuarksSecret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{}-{}", namespace, name)),
            ..Default::default()
        },
        spec: QuarksSecretSpec {
            secret_name: if secret_type == SecretType::Copy {
                "generated-secret-copy".to_string()
            } else {
                "generated-secret".to_string()
            },
            secret_type,
            copies: copies
                .iter()
                .map(|(namespace, name)| CopyTarget {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                })
                .collect(),
        },
        status: None,
    }
}

/// Set the `secret-copy-of` annotation on any object
pub fn annotate_copy_of<K: ResourceExt>(mut obj: K, value: &str) -> K {
    obj.annotations_mut()
        .insert(annotations::COPY_OF.to_string(), value.to_string());
    obj
}

pub fn data_of(secret: &Secret, key: &str) -> Option<String> {
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .map(|v| String::from_utf8_lossy(&v.0).into_owned())
}

/// Store operations a [`FakeStore`] can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    GetSecret,
    GetQuarksSecret,
    CreateSecret,
    UpdateSecret,
    SetStatus,
}

/// A write the [`FakeStore`] accepted, keyed by `<namespace>/<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeWrite {
    Created(String),
    Updated(String),
}

#[derive(Default)]
struct FakeState {
    secrets: BTreeMap<String, Secret>,
    quarks_secrets: BTreeMap<String, QuarksSecret>,
    failures: HashMap<(FakeOp, String), u16>,
    writes: Vec<FakeWrite>,
    copied_history: Vec<bool>,
    resource_version: u64,
}

impl FakeState {
    fn fail(&self, op: FakeOp, key: &str) -> Result<()> {
        match self.failures.get(&(op, key.to_string())) {
            Some(code) => Err(api_error(*code, "Injected")),
            None => Ok(()),
        }
    }

    fn next_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }
}

fn key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

fn secret_key(secret: &Secret) -> String {
    key(&secret.namespace().unwrap_or_default(), &secret.name_any())
}

/// In-memory [`ClusterStore`] with injectable failures and a write log.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        self.put_secret(secret);
        self
    }

    pub fn with_quarks_secret(self, qsec: QuarksSecret) -> Self {
        let k = key(&qsec.namespace().unwrap_or_default(), &qsec.name_any());
        self.state.lock().unwrap().quarks_secrets.insert(k, qsec);
        self
    }

    /// Make `op` on `<namespace>/<name>` fail with the given HTTP status
    pub fn failing(self, op: FakeOp, namespace: &str, name: &str, code: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((op, key(namespace, name)), code);
        self
    }

    /// Insert or overwrite a Secret without recording a write
    pub fn put_secret(&self, secret: Secret) {
        let mut state = self.state.lock().unwrap();
        let mut secret = secret;
        secret.metadata.resource_version = Some(state.next_version());
        state.secrets.insert(secret_key(&secret), secret);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn secret_count(&self) -> usize {
        self.state.lock().unwrap().secrets.len()
    }

    pub fn writes(&self) -> Vec<FakeWrite> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn copied_history(&self) -> Vec<bool> {
        self.state.lock().unwrap().copied_history.clone()
    }
}

#[async_trait]
impl ClusterStore for FakeStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let state = self.state.lock().unwrap();
        let k = key(namespace, name);
        state.fail(FakeOp::GetSecret, &k)?;
        Ok(state.secrets.get(&k).cloned())
    }

    async fn get_quarks_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<QuarksSecret>> {
        let state = self.state.lock().unwrap();
        let k = key(namespace, name);
        state.fail(FakeOp::GetQuarksSecret, &k)?;
        Ok(state.quarks_secrets.get(&k).cloned())
    }

    async fn create_secret(&self, secret: &Secret) -> Result<Secret> {
        let mut state = self.state.lock().unwrap();
        let k = secret_key(secret);
        state.fail(FakeOp::CreateSecret, &k)?;
        if state.secrets.contains_key(&k) {
            return Err(api_error(409, "AlreadyExists"));
        }
        let mut stored = secret.clone();
        stored.metadata.resource_version = Some(state.next_version());
        state.secrets.insert(k.clone(), stored.clone());
        state.writes.push(FakeWrite::Created(k));
        Ok(stored)
    }

    async fn update_secret(&self, secret: &Secret) -> Result<Secret> {
        let mut state = self.state.lock().unwrap();
        let k = secret_key(secret);
        state.fail(FakeOp::UpdateSecret, &k)?;
        let Some(current) = state.secrets.get(&k) else {
            return Err(api_error(404, "NotFound"));
        };
        if let Some(rv) = &secret.metadata.resource_version {
            if current.metadata.resource_version.as_ref() != Some(rv) {
                return Err(api_error(409, "Conflict"));
            }
        }
        let mut stored = secret.clone();
        stored.metadata.resource_version = Some(state.next_version());
        state.secrets.insert(k.clone(), stored.clone());
        state.writes.push(FakeWrite::Updated(k));
        Ok(stored)
    }

    async fn set_copied_status(&self, owner: &QuarksSecret, copied: bool) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let k = key(&owner.namespace().unwrap_or_default(), &owner.name_any());
        state.fail(FakeOp::SetStatus, &k)?;
        state.copied_history.push(copied);
        if let Some(qsec) = state.quarks_secrets.get_mut(&k) {
            qsec.status.get_or_insert_with(Default::default).copied = Some(copied);
        }
        Ok(())
    }
}

/// An event accepted by [`FakeEvents`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// `<namespace>/<name>` of the object the event is about
    pub regarding: String,
    pub warning: bool,
    pub reason: String,
    pub action: String,
    pub note: String,
}

/// In-memory [`EventPublisher`]
#[derive(Default)]
pub struct FakeEvents {
    events: Mutex<Vec<RecordedEvent>>,
}

impl FakeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn reasons(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.reason).collect()
    }
}

#[async_trait]
impl EventPublisher for FakeEvents {
    async fn publish(
        &self,
        regarding: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: String,
    ) {
        self.events.lock().unwrap().push(RecordedEvent {
            regarding: key(
                regarding.namespace.as_deref().unwrap_or_default(),
                regarding.name.as_deref().unwrap_or_default(),
            ),
            warning: matches!(type_, EventType::Warning),
            reason: reason.to_string(),
            action: action.to_string(),
            note,
        });
    }
}
