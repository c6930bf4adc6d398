use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};

use crate::error::{VllmOperatorError, VllmOperatorResult};
use crate::operator::crd::VllmDeployment;

use super::args::engine_args;
use super::container::primary_container;

pub const APP_LABEL: &str = "app";

/// Name of the deployment owned by the resource called `name`.
pub fn deployment_name(name: &str) -> String {
    format!("{name}-deployment")
}

/// Zero, negative and unset replica counts all mean one replica.
pub fn resolve_replicas(replicas: Option<i32>) -> i32 {
    match replicas {
        Some(n) if n > 0 => n,
        _ => 1,
    }
}

/// `app=<name>` merged with the resource's own labels. Declared labels win,
/// including a declared `app`.
pub fn generate_labels(vllm: &VllmDeployment) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::from_iter(vec![(APP_LABEL.to_string(), vllm.name_any())]);
    labels.extend(vllm.labels().iter().map(|(k, v)| (k.clone(), v.clone())));
    labels
}

/// Builds the deployment the cluster should be running for `vllm`.
///
/// The result depends only on the resource's name, namespace, labels and
/// spec. Fails when no primary container can be picked from the templates.
pub fn desired_deployment(vllm: &VllmDeployment) -> VllmOperatorResult<Deployment> {
    let spec = &vllm.spec;
    let labels = generate_labels(vllm);
    let template = primary_container(&spec.containers)?;

    let args = engine_args(&spec.vllm_config);
    let ports = match spec.vllm_config.port {
        0 => None,
        port => Some(vec![ContainerPort {
            container_port: port,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
    };

    let container = Container {
        name: template.name.clone(),
        image: template.image.clone(),
        image_pull_policy: template.image_pull_policy.clone(),
        env: template.env.clone(),
        args: (!args.is_empty()).then_some(args),
        ports,
        ..Default::default()
    };

    let tolerations = (!spec.tolerations.is_empty()).then(|| spec.tolerations.clone());

    Ok(Deployment {
        metadata: ObjectMeta {
            name: Some(deployment_name(&vllm.name_any())),
            namespace: vllm.namespace(),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(resolve_replicas(spec.replicas)),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    tolerations,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Controller owner reference pointing at `vllm`, so that deleting the
/// resource garbage collects its deployment.
pub fn owner_reference(vllm: &VllmDeployment) -> VllmOperatorResult<OwnerReference> {
    vllm.controller_owner_ref(&())
        .ok_or(VllmOperatorError::MissingObjectKey(".metadata.uid"))
}

/// Returns `deployment` with `owner` added to its owner references.
pub fn with_owner(deployment: Deployment, owner: OwnerReference) -> Deployment {
    let Deployment {
        mut metadata,
        spec,
        status,
    } = deployment;

    let mut refs = metadata.owner_references.take().unwrap_or_default();
    refs.retain(|r| r.uid != owner.uid);
    refs.push(owner);
    metadata.owner_references = Some(refs);

    Deployment {
        metadata,
        spec,
        status,
    }
}
