use k8s_openapi::api::core::v1::Container;

use crate::error::{VllmOperatorError, VllmOperatorResult};

/// Name that marks the model server among several containers.
pub const PRIMARY_CONTAINER_NAME: &str = "vllm";

/// Picks the container template that runs the model server.
///
/// A lone template is used whatever its name. Among several, the first one
/// named [`PRIMARY_CONTAINER_NAME`] wins. Anything else is a validation error.
pub fn primary_container(containers: &[Container]) -> VllmOperatorResult<&Container> {
    if let [only] = containers {
        return Ok(only);
    }

    containers
        .iter()
        .find(|container| container.name == PRIMARY_CONTAINER_NAME)
        .ok_or_else(|| {
            if containers.is_empty() {
                VllmOperatorError::NoPrimaryContainer("no container templates declared".to_string())
            } else {
                let names: Vec<&str> = containers.iter().map(|c| c.name.as_str()).collect();
                VllmOperatorError::NoPrimaryContainer(format!(
                    "none of [{}] is named {:?}",
                    names.join(", "),
                    PRIMARY_CONTAINER_NAME
                ))
            }
        })
}
