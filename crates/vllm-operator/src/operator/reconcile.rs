use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use k8s_openapi::api::apps::v1::Deployment;
use kube::runtime::controller::Action;
use kube::Resource;
use kube::ResourceExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn, Level};
use vllm_common::settings::OperatorArgs;

use super::crd::VllmDeployment;
use super::status::{failed_status, synced_status};
use crate::cluster::ClusterApi;
use crate::error::{VllmOperatorError, VllmOperatorResult};
use crate::k8s::{
    deployment_name, desired_deployment, owner_reference, requires_update, with_owner,
};

pub struct ContextData<C: ClusterApi> {
    cluster: C,
    cancel: CancellationToken,
    requeue_after: Duration,
    error_backoff: Duration,
}

impl<C: ClusterApi> ContextData<C> {
    pub fn new(
        cluster: C,
        cancel: CancellationToken,
        requeue_after: Duration,
        error_backoff: Duration,
    ) -> Self {
        Self {
            cluster,
            cancel,
            requeue_after,
            error_backoff,
        }
    }

    pub fn from_settings(cluster: C, cancel: CancellationToken, args: &OperatorArgs) -> Self {
        Self::new(cluster, cancel, args.requeue_after(), args.error_backoff())
    }

    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Runs a cluster call unless the pass is cancelled first.
    async fn call<T, F>(&self, request: F) -> VllmOperatorResult<T>
    where
        F: Future<Output = VllmOperatorResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(VllmOperatorError::Cancelled),
            result = request => result,
        }
    }
}

/// How a reconcile pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The resource no longer exists.
    Gone,
    /// The resource is being deleted; garbage collection removes the deployment.
    Deleting,
    Created,
    Updated,
    /// The deployment matches the spec.
    InSync { status_written: bool },
}

impl PassOutcome {
    /// A mutation is followed by a prompt re-run that observes its effect.
    pub fn action(&self, requeue_after: Duration) -> Action {
        match self {
            PassOutcome::Created | PassOutcome::Updated => Action::requeue(requeue_after),
            PassOutcome::Gone | PassOutcome::Deleting | PassOutcome::InSync { .. } => {
                Action::await_change()
            }
        }
    }
}

enum VllmAction {
    Create,
    Update,
    SyncStatus,
}

fn determine_action(observed: Option<&Deployment>, desired: &Deployment) -> VllmAction {
    match observed {
        None => VllmAction::Create,
        Some(observed) if requires_update(observed, desired) => VllmAction::Update,
        Some(_) => VllmAction::SyncStatus,
    }
}

pub async fn reconcile<C: ClusterApi>(
    vllm: Arc<VllmDeployment>,
    context: Arc<ContextData<C>>,
) -> VllmOperatorResult<Action> {
    let namespace = vllm
        .namespace()
        .ok_or(VllmOperatorError::MissingObjectKey(".metadata.namespace"))?;
    let name = vllm.name_any();

    let outcome = reconcile_key(&namespace, &name, &context).await?;
    Ok(outcome.action(context.requeue_after))
}

/// One pass for the resource `namespace/name`. Both the resource and its
/// deployment are fetched fresh; nothing is kept between passes.
#[instrument(skip(context))]
pub async fn reconcile_key<C: ClusterApi>(
    namespace: &str,
    name: &str,
    context: &ContextData<C>,
) -> VllmOperatorResult<PassOutcome> {
    info!("starting reconciliation");

    let Some(vllm) = context
        .call(context.cluster.get_vllm(namespace, name))
        .await?
    else {
        info!("VllmDeployment not found, ignoring since it was probably deleted");
        return Ok(PassOutcome::Gone);
    };

    if vllm.meta().deletion_timestamp.is_some() {
        info!("VllmDeployment is being deleted");
        return Ok(PassOutcome::Deleting);
    }

    match converge(&vllm, namespace, context).await {
        Ok(outcome) => {
            info!(?outcome, "reconciliation complete");
            Ok(outcome)
        }
        Err(error) => {
            record_failure(&vllm, &error, context).await;
            Err(error)
        }
    }
}

async fn converge<C: ClusterApi>(
    vllm: &VllmDeployment,
    namespace: &str,
    context: &ContextData<C>,
) -> VllmOperatorResult<PassOutcome> {
    let owner = owner_reference(vllm)?;
    let desired = with_owner(desired_deployment(vllm)?, owner);
    log_desired(&desired);

    let name = deployment_name(&vllm.name_any());
    let observed = context
        .call(context.cluster.get_deployment(namespace, &name))
        .await?;

    match determine_action(observed.as_ref(), &desired) {
        VllmAction::Create => {
            info!(deployment = %name, "creating deployment");
            context
                .call(context.cluster.create_deployment(&desired))
                .await?;
            Ok(PassOutcome::Created)
        }
        VllmAction::Update => {
            info!(deployment = %name, "updating deployment");
            let mut updated = observed.unwrap_or_default();
            updated.spec = desired.spec;
            context
                .call(context.cluster.update_deployment(&updated))
                .await?;
            Ok(PassOutcome::Updated)
        }
        VllmAction::SyncStatus => sync_status(vllm, namespace, &name, context).await,
    }
}

async fn sync_status<C: ClusterApi>(
    vllm: &VllmDeployment,
    namespace: &str,
    deployment: &str,
    context: &ContextData<C>,
) -> VllmOperatorResult<PassOutcome> {
    let Some(latest) = context
        .call(context.cluster.get_deployment(namespace, deployment))
        .await?
    else {
        debug!(deployment, "deployment disappeared before status sync");
        return Ok(PassOutcome::InSync {
            status_written: false,
        });
    };

    let status = synced_status(
        vllm.status.as_ref(),
        vllm.metadata.generation,
        &latest,
        Utc::now(),
    );
    if vllm.status.as_ref() == Some(&status) {
        return Ok(PassOutcome::InSync {
            status_written: false,
        });
    }

    let mut updated = vllm.clone();
    updated.status = Some(status);
    context.call(context.cluster.update_status(&updated)).await?;
    debug!("status updated");

    Ok(PassOutcome::InSync {
        status_written: true,
    })
}

/// Best effort: records the error as a condition. A failure to write it is
/// logged and does not replace the original error.
async fn record_failure<C: ClusterApi>(
    vllm: &VllmDeployment,
    error: &VllmOperatorError,
    context: &ContextData<C>,
) {
    if matches!(error, VllmOperatorError::Cancelled) {
        return;
    }

    let status = failed_status(vllm.status.as_ref(), error, Utc::now());
    if vllm.status.as_ref() == Some(&status) {
        return;
    }

    let mut updated = vllm.clone();
    updated.status = Some(status);
    if let Err(status_error) = context.call(context.cluster.update_status(&updated)).await {
        warn!(error = %status_error, "failed to record failure condition");
    }
}

fn log_desired(deployment: &Deployment) {
    if !tracing::enabled!(Level::TRACE) {
        return;
    }
    match serde_yaml::to_string(deployment) {
        Ok(yaml) => trace!("desired deployment:\n{yaml}"),
        Err(e) => warn!(error = %e, "failed to render desired deployment"),
    }
}

pub fn on_error<C: ClusterApi>(
    vllm: Arc<VllmDeployment>,
    error: &VllmOperatorError,
    context: Arc<ContextData<C>>,
) -> Action {
    if error.is_validation() {
        warn!(%error, vllmdeployment = %vllm.name_any(), "invalid VllmDeployment");
    } else {
        error!(?error, vllmdeployment = %vllm.name_any(), "reconciliation failed");
    }
    Action::requeue(context.error_backoff)
}
