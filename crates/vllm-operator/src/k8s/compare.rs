use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, EnvVar};
use tracing::debug;

/// Whether `observed` has drifted from `desired` on any field the operator
/// manages. Metadata, status and fields the operator never sets are ignored.
pub fn requires_update(observed: &Deployment, desired: &Deployment) -> bool {
    match (observed.spec.as_ref(), desired.spec.as_ref()) {
        (Some(observed), Some(desired)) => match first_difference(observed, desired) {
            Some(field) => {
                debug!(field, "deployment drifted");
                true
            }
            None => false,
        },
        (None, Some(_)) => true,
        (_, None) => false,
    }
}

/// Name of the first managed field that differs.
fn first_difference(observed: &DeploymentSpec, desired: &DeploymentSpec) -> Option<&'static str> {
    if observed.replicas.unwrap_or(1) != desired.replicas.unwrap_or(1) {
        return Some("replicas");
    }
    if !same_map(
        observed.selector.match_labels.as_ref(),
        desired.selector.match_labels.as_ref(),
    ) {
        return Some("selector");
    }

    let observed_labels = observed
        .template
        .metadata
        .as_ref()
        .and_then(|m| m.labels.as_ref());
    let desired_labels = desired
        .template
        .metadata
        .as_ref()
        .and_then(|m| m.labels.as_ref());
    if !same_map(observed_labels, desired_labels) {
        return Some("template.labels");
    }

    let observed_pod = observed.template.spec.as_ref();
    let desired_pod = desired.template.spec.as_ref();

    if !same_list(
        observed_pod.and_then(|p| p.tolerations.as_ref()),
        desired_pod.and_then(|p| p.tolerations.as_ref()),
    ) {
        return Some("tolerations");
    }

    let observed_containers = observed_pod.map(|p| p.containers.as_slice()).unwrap_or(&[]);
    let desired_containers = desired_pod.map(|p| p.containers.as_slice()).unwrap_or(&[]);
    if observed_containers.len() != desired_containers.len() {
        return Some("containers");
    }

    observed_containers
        .iter()
        .zip(desired_containers)
        .find_map(|(observed, desired)| container_difference(observed, desired))
}

fn container_difference(observed: &Container, desired: &Container) -> Option<&'static str> {
    if observed.name != desired.name {
        return Some("container.name");
    }
    if observed.image != desired.image {
        return Some("container.image");
    }
    // Unset means the API server picks the policy.
    if desired.image_pull_policy.is_some()
        && observed.image_pull_policy != desired.image_pull_policy
    {
        return Some("container.imagePullPolicy");
    }
    if !same_list(observed.args.as_ref(), desired.args.as_ref()) {
        return Some("container.args");
    }
    if !same_env(observed.env.as_ref(), desired.env.as_ref()) {
        return Some("container.env");
    }
    if !same_ports(observed.ports.as_ref(), desired.ports.as_ref()) {
        return Some("container.ports");
    }
    None
}

fn same_map(a: Option<&BTreeMap<String, String>>, b: Option<&BTreeMap<String, String>>) -> bool {
    let empty = BTreeMap::new();
    a.unwrap_or(&empty) == b.unwrap_or(&empty)
}

fn same_list<T: PartialEq>(a: Option<&Vec<T>>, b: Option<&Vec<T>>) -> bool {
    a.map(Vec::as_slice).unwrap_or(&[]) == b.map(Vec::as_slice).unwrap_or(&[])
}

fn same_env(a: Option<&Vec<EnvVar>>, b: Option<&Vec<EnvVar>>) -> bool {
    // A fieldRef without apiVersion is stored as "v1".
    let normalize = |env: Option<&Vec<EnvVar>>| -> Vec<EnvVar> {
        env.map(|env| {
            env.iter()
                .cloned()
                .map(|mut var| {
                    let field_ref = var.value_from.as_mut().and_then(|v| v.field_ref.as_mut());
                    if let Some(field_ref) = field_ref {
                        field_ref.api_version.get_or_insert_with(|| "v1".to_string());
                    }
                    var
                })
                .collect()
        })
        .unwrap_or_default()
    };
    normalize(a) == normalize(b)
}

fn same_ports(a: Option<&Vec<ContainerPort>>, b: Option<&Vec<ContainerPort>>) -> bool {
    let normalize = |ports: Option<&Vec<ContainerPort>>| -> Vec<ContainerPort> {
        ports
            .map(|ports| {
                ports
                    .iter()
                    .cloned()
                    .map(|mut port| {
                        port.protocol.get_or_insert_with(|| "TCP".to_string());
                        port
                    })
                    .collect()
            })
            .unwrap_or_default()
    };
    normalize(a) == normalize(b)
}
