// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked Kubernetes API, an in-memory secret store and fixtures.

use crate::config::{BackupIntegration, Config, PropagationConfig, S3StoreProfile, SecretRef};
use crate::error::{DrError, Result as DrResult};
use crate::propagation::{
    ClusterSecretStore, SecretEncoding, SecretFormat, SecretPlacement, SerialGuard,
};
use crate::types::{DRCluster, DRClusterSpec, DRPolicy, DRPolicySpec, NameSet};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// A request seen by [`MockService`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PATCH requests matching the path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Add a response for DELETE requests matching the path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Then prefix match
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
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
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req
                .into_body()
                .collect()
                .await
                .map(|c| c.to_bytes())
                .unwrap_or_default();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path: path.clone(),
                body,
            });

            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("path", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock Secret JSON response
pub fn secret_json(namespace: &str, name: &str, data: &[(&str, &str)]) -> String {
    let data: serde_json::Map<String, serde_json::Value> = data
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(base64_encode(v.as_bytes()))))
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": { "name": name, "namespace": namespace },
        "type": "Opaque",
        "data": data
    })
    .to_string()
}

/// Create a mock ManifestWork JSON response
pub fn manifestwork_json(namespace: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": "work.open-cluster-management.io/v1",
        "kind": "ManifestWork",
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "workload": { "manifests": [] } }
    })
    .to_string()
}

/// Create a mock DRPolicy list JSON response
pub fn policy_list_json(policies: &[(&str, &[&str])]) -> String {
    let items: Vec<_> = policies
        .iter()
        .map(|(name, clusters)| {
            serde_json::json!({
                "apiVersion": "ramendr.openshift.io/v1alpha1",
                "kind": "DRPolicy",
                "metadata": { "name": name },
                "spec": { "drClusters": clusters }
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": "ramendr.openshift.io/v1alpha1",
        "kind": "DRPolicyList",
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
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

/// A Kubernetes API error as the store would surface it
pub fn api_error(code: u16, message: &str) -> DrError {
    DrError::Kube(kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: "InternalError".to_string(),
        code,
    }))
}

/// Create a 500 error response
pub fn server_error_json(message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": "InternalError",
        "code": 500
    })
    .to_string()
}

fn base64_encode(input: &[u8]) -> String {
    // Serializing a ByteString yields standard base64
    serde_json::to_value(k8s_openapi::ByteString(input.to_vec()))
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// A create/update call seen by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPlacement {
    pub secret: String,
    pub cluster: String,
    pub source_namespace: String,
    pub target_namespace: String,
    pub backup_namespace: Option<String>,
    pub format: SecretFormat,
    pub bundle_len: usize,
}

#[derive(Default)]
struct MemoryState {
    policies: Vec<DRPolicy>,
    secrets: HashMap<(String, SecretFormat), BTreeSet<String>>,
    placements: Vec<RecordedPlacement>,
    deleted: Vec<(String, String, SecretFormat)>,
    fail_list: bool,
    fail_push: HashSet<(String, SecretFormat)>,
    fail_delete: HashSet<(String, SecretFormat)>,
    delay: Option<Duration>,
}

/// In-memory cluster secret store with failure injection.
///
/// With [`MemoryStore::require_held`], every read and mutation checks that the
/// guard is held, and mutations also check that no other one is in flight.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    guard: Option<SerialGuard>,
    in_flight: AtomicUsize,
    unguarded: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_held(mut self, guard: SerialGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn set_policies(&self, policies: Vec<DRPolicy>) {
        self.state.lock().unwrap().policies = policies;
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn fail_list(&self) {
        self.state.lock().unwrap().fail_list = true;
    }

    pub fn fail_push(&self, cluster: &str, format: SecretFormat) {
        self.state
            .lock()
            .unwrap()
            .fail_push
            .insert((cluster.to_string(), format));
    }

    pub fn fail_delete(&self, cluster: &str, format: SecretFormat) {
        self.state
            .lock()
            .unwrap()
            .fail_delete
            .insert((cluster.to_string(), format));
    }

    pub fn secrets_on(&self, cluster: &str, format: SecretFormat) -> NameSet {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&(cluster.to_string(), format))
            .map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn placements(&self) -> Vec<RecordedPlacement> {
        self.state.lock().unwrap().placements.clone()
    }

    pub fn deleted(&self) -> Vec<(String, String, SecretFormat)> {
        self.state.lock().unwrap().deleted.clone()
    }

    /// Reads and mutations made without the guard, or overlapping another mutation
    pub fn unguarded_calls(&self) -> usize {
        self.unguarded.load(Ordering::SeqCst)
    }

    fn guard_missing(&self) -> bool {
        self.guard.as_ref().is_some_and(|g| !g.is_held())
    }

    async fn mutation_window(&self) {
        let overlapping = self.in_flight.fetch_add(1, Ordering::SeqCst) > 0;
        if self.guard.is_some() && (overlapping || self.guard_missing()) {
            self.unguarded.fetch_add(1, Ordering::SeqCst);
        }

        let delay = self.state.lock().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClusterSecretStore for MemoryStore {
    async fn list_policies(&self) -> DrResult<Vec<DRPolicy>> {
        if self.guard_missing() {
            self.unguarded.fetch_add(1, Ordering::SeqCst);
        }

        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(api_error(500, "list refused"));
        }
        Ok(state.policies.clone())
    }

    async fn create_or_update_secret(&self, placement: &SecretPlacement<'_>) -> DrResult<()> {
        self.mutation_window().await;

        let format = placement.encoding.format();
        let mut state = self.state.lock().unwrap();
        if state.fail_push.contains(&(placement.cluster.to_string(), format)) {
            return Err(api_error(500, "push refused"));
        }

        state.placements.push(RecordedPlacement {
            secret: placement.secret.to_string(),
            cluster: placement.cluster.to_string(),
            source_namespace: placement.source_namespace.to_string(),
            target_namespace: placement.target_namespace.to_string(),
            backup_namespace: match placement.encoding {
                SecretEncoding::BackupTool { namespace } => Some(namespace.clone()),
                SecretEncoding::Native => None,
            },
            format,
            bundle_len: placement.bundle.len(),
        });
        state
            .secrets
            .entry((placement.cluster.to_string(), format))
            .or_default()
            .insert(placement.secret.to_string());
        Ok(())
    }

    async fn delete_secret(
        &self,
        secret: &str,
        cluster: &str,
        _source_namespace: &str,
        format: SecretFormat,
    ) -> DrResult<()> {
        self.mutation_window().await;

        let mut state = self.state.lock().unwrap();
        if state.fail_delete.contains(&(cluster.to_string(), format)) {
            return Err(api_error(500, "delete refused"));
        }

        state
            .deleted
            .push((secret.to_string(), cluster.to_string(), format));
        if let Some(secrets) = state.secrets.get_mut(&(cluster.to_string(), format)) {
            secrets.remove(secret);
        }
        Ok(())
    }
}

pub fn make_cluster(name: &str, profile: &str) -> DRCluster {
    DRCluster::new(
        name,
        DRClusterSpec {
            s3_profile_name: profile.to_string(),
        },
    )
}

pub fn make_policy(name: &str, clusters: &[&str]) -> DRPolicy {
    DRPolicy::new(
        name,
        DRPolicySpec {
            dr_clusters: clusters.iter().map(|c| c.to_string()).collect(),
            scheduling_interval: Some("5m".to_string()),
        },
    )
}

/// Profile directory entries from (profile, secret) pairs
pub fn profiles(entries: &[(&str, &str)]) -> Vec<S3StoreProfile> {
    entries
        .iter()
        .map(|(profile, secret)| S3StoreProfile {
            s3_profile_name: profile.to_string(),
            s3_secret_ref: SecretRef {
                name: secret.to_string(),
            },
        })
        .collect()
}

/// Fully enabled configuration; the backup encoding is on when a namespace is given
pub fn make_config(entries: &[(&str, &str)], backup_namespace: Option<&str>) -> Config {
    Config {
        operator_namespace: "ramen-system".to_string(),
        propagation: PropagationConfig {
            deployment_automation_enabled: true,
            s3_secret_distribution_enabled: true,
            dr_cluster_operator_namespace: None,
            backup_integration: BackupIntegration {
                enabled: backup_namespace.is_some(),
                namespace: backup_namespace.unwrap_or_default().to_string(),
            },
            s3_store_profiles: profiles(entries),
        },
    }
}
