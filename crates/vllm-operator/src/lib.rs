pub mod cluster;
pub mod error;
pub mod k8s;
pub mod operator;

pub use cluster::{ClusterApi, KubeCluster};
pub use operator::crd::{VllmDeployment, VllmDeploymentSpec, VllmDeploymentStatus};
pub use operator::operator;
