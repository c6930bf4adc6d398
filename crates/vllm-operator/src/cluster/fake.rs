//! In-memory [`ClusterApi`] for reconcile tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::core::ErrorResponse;
use kube::ResourceExt;

use super::ClusterApi;
use crate::error::{VllmOperatorError, VllmOperatorResult};
use crate::operator::crd::VllmDeployment;

type Key = (String, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetVllm(String),
    ListVllm,
    GetDeployment(String),
    CreateDeployment(String),
    UpdateDeployment(String),
    UpdateStatus(String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::CreateDeployment(_) | Call::UpdateDeployment(_))
    }
}

/// Stores objects by namespace and name and records every call. Mimics the
/// API server's resourceVersion bookkeeping so stale updates conflict.
#[derive(Default)]
pub struct FakeCluster {
    vllms: Mutex<BTreeMap<Key, VllmDeployment>>,
    deployments: Mutex<BTreeMap<Key, Deployment>>,
    calls: Mutex<Vec<Call>>,
}

fn key(namespace: Option<String>, name: &str) -> Key {
    (namespace.unwrap_or_default(), name.to_string())
}

pub fn api_error(code: u16, reason: &str, message: &str) -> VllmOperatorError {
    VllmOperatorError::Kube {
        source: kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: reason.to_string(),
            code,
        }),
    }
}

fn next_version(version: Option<&str>) -> String {
    let current: u64 = version.and_then(|v| v.parse().ok()).unwrap_or(0);
    (current + 1).to_string()
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vllm(self, vllm: VllmDeployment) -> Self {
        self.vllms
            .lock()
            .unwrap()
            .insert(key(vllm.namespace(), &vllm.name_any()), vllm);
        self
    }

    /// Seeds a deployment as if the API server had stored it.
    pub fn with_deployment(self, mut deployment: Deployment) -> Self {
        deployment.metadata.resource_version = Some("1".to_string());
        deployment.metadata.uid = Some(format!("uid-{}", deployment.name_any()));
        deployment.metadata.generation = Some(1);
        self.deployments.lock().unwrap().insert(
            key(deployment.namespace(), &deployment.name_any()),
            deployment,
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn vllm(&self, namespace: &str, name: &str) -> Option<VllmDeployment> {
        self.vllms
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        self.deployments
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_vllm(
        &self,
        namespace: &str,
        name: &str,
    ) -> VllmOperatorResult<Option<VllmDeployment>> {
        self.record(Call::GetVllm(name.to_string()));
        Ok(self.vllm(namespace, name))
    }

    async fn list_vllm(
        &self,
        namespace: Option<String>,
    ) -> VllmOperatorResult<Vec<VllmDeployment>> {
        self.record(Call::ListVllm);
        Ok(self
            .vllms
            .lock()
            .unwrap()
            .iter()
            .filter(|((ns, _), _)| namespace.as_ref().map_or(true, |want| want == ns))
            .map(|(_, vllm)| vllm.clone())
            .collect())
    }

    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> VllmOperatorResult<Option<Deployment>> {
        self.record(Call::GetDeployment(name.to_string()));
        Ok(self.deployment(namespace, name))
    }

    async fn create_deployment(&self, deployment: &Deployment) -> VllmOperatorResult<Deployment> {
        let name = deployment.name_any();
        self.record(Call::CreateDeployment(name.clone()));

        let mut deployments = self.deployments.lock().unwrap();
        let key = key(deployment.namespace(), &name);
        if deployments.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists", "deployment already exists"));
        }

        let mut stored = deployment.clone();
        stored.metadata.resource_version = Some("1".to_string());
        stored.metadata.uid = Some(format!("uid-{name}"));
        stored.metadata.generation = Some(1);
        deployments.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update_deployment(&self, deployment: &Deployment) -> VllmOperatorResult<Deployment> {
        let name = deployment.name_any();
        self.record(Call::UpdateDeployment(name.clone()));

        let mut deployments = self.deployments.lock().unwrap();
        let key = key(deployment.namespace(), &name);
        let current = deployments
            .get(&key)
            .ok_or_else(|| api_error(404, "NotFound", "deployment not found"))?;
        if current.metadata.resource_version != deployment.metadata.resource_version {
            return Err(api_error(409, "Conflict", "the object has been modified"));
        }

        let mut stored = deployment.clone();
        stored.metadata.resource_version =
            Some(next_version(current.metadata.resource_version.as_deref()));
        stored.metadata.generation = current.metadata.generation.map(|g| g + 1);
        deployments.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update_status(&self, vllm: &VllmDeployment) -> VllmOperatorResult<()> {
        let name = vllm.name_any();
        self.record(Call::UpdateStatus(name.clone()));

        let mut vllms = self.vllms.lock().unwrap();
        let stored = vllms
            .get_mut(&key(vllm.namespace(), &name))
            .ok_or_else(|| api_error(404, "NotFound", "vllmdeployment not found"))?;
        stored.status = vllm.status.clone();
        Ok(())
    }
}
