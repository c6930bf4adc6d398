//! Access to the cluster's API surface.
//!
//! The reconciler only ever talks to the cluster through [`ClusterApi`], so a
//! pass can run against the real API server or an in-memory fake.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{Api, ListParams, Patch, PatchParams, PostParams};
use kube::{Client, ResourceExt};
use serde_json::Value;

#[cfg(test)]
use mockall::automock;

#[cfg(test)]
pub(crate) mod fake;

use crate::error::{VllmOperatorError, VllmOperatorResult};
use crate::operator::crd::VllmDeployment;

pub const FIELD_MANAGER: &str = "vllm-operator";

/// Status keys cleared when absent, since a merge patch keeps omitted keys.
const STATUS_KEYS: [&str; 5] = [
    "conditions",
    "replicas",
    "readyReplicas",
    "availableReplicas",
    "observedGeneration",
];

/// Cluster operations a reconcile pass needs.
///
/// Lookups return `Ok(None)` for objects that don't exist; every other
/// failure is an error. Implementations never retry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fetch a VllmDeployment by namespace and name
    async fn get_vllm(
        &self,
        namespace: &str,
        name: &str,
    ) -> VllmOperatorResult<Option<VllmDeployment>>;

    /// List VllmDeployments in `namespace`, or in every namespace
    async fn list_vllm(&self, namespace: Option<String>)
        -> VllmOperatorResult<Vec<VllmDeployment>>;

    /// Fetch a Deployment by namespace and name
    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> VllmOperatorResult<Option<Deployment>>;

    async fn create_deployment(&self, deployment: &Deployment) -> VllmOperatorResult<Deployment>;

    /// Replace a Deployment. The object's resourceVersion guards against
    /// concurrent writers.
    async fn update_deployment(&self, deployment: &Deployment) -> VllmOperatorResult<Deployment>;

    /// Write `vllm.status` to the status sub-resource
    async fn update_status(&self, vllm: &VllmDeployment) -> VllmOperatorResult<()>;
}

/// [`ClusterApi`] backed by a `kube` client.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn deployments(&self, deployment: &Deployment) -> VllmOperatorResult<Api<Deployment>> {
        let namespace = deployment
            .metadata
            .namespace
            .as_deref()
            .ok_or(VllmOperatorError::MissingObjectKey(".metadata.namespace"))?;
        Ok(Api::namespaced(self.client.clone(), namespace))
    }
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get_vllm(
        &self,
        namespace: &str,
        name: &str,
    ) -> VllmOperatorResult<Option<VllmDeployment>> {
        let api: Api<VllmDeployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn list_vllm(
        &self,
        namespace: Option<String>,
    ) -> VllmOperatorResult<Vec<VllmDeployment>> {
        let api: Api<VllmDeployment> = match namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), &namespace),
            None => Api::all(self.client.clone()),
        };
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> VllmOperatorResult<Option<Deployment>> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn create_deployment(&self, deployment: &Deployment) -> VllmOperatorResult<Deployment> {
        let api = self.deployments(deployment)?;
        Ok(api.create(&post_params(), deployment).await?)
    }

    async fn update_deployment(&self, deployment: &Deployment) -> VllmOperatorResult<Deployment> {
        let api = self.deployments(deployment)?;
        let name = deployment
            .metadata
            .name
            .as_deref()
            .ok_or(VllmOperatorError::MissingObjectKey(".metadata.name"))?;
        Ok(api.replace(name, &post_params(), deployment).await?)
    }

    async fn update_status(&self, vllm: &VllmDeployment) -> VllmOperatorResult<()> {
        let namespace = vllm
            .namespace()
            .ok_or(VllmOperatorError::MissingObjectKey(".metadata.namespace"))?;
        let api: Api<VllmDeployment> = Api::namespaced(self.client.clone(), &namespace);

        let mut status = serde_json::to_value(vllm.status.clone().unwrap_or_default())?;
        if let Some(fields) = status.as_object_mut() {
            for key in STATUS_KEYS {
                fields.entry(key).or_insert(Value::Null);
            }
        }
        let patch = serde_json::json!({ "status": status });

        api.patch_status(
            &vllm.name_any(),
            &PatchParams {
                field_manager: Some(FIELD_MANAGER.to_string()),
                ..Default::default()
            },
            &Patch::Merge(&patch),
        )
        .await?;
        Ok(())
    }
}
