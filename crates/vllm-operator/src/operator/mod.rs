pub mod crd;
pub mod reconcile;
pub mod status;

use crd::VllmDeployment;
use futures::StreamExt;

use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    runtime::{watcher, Controller},
    Api, Client,
};
use reconcile::ContextData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vllm_common::settings::Settings;

use crate::cluster::KubeCluster;
use crate::error::VllmOperatorResult;

/// Runs the controller until Ctrl-C.
///
/// Watches VllmDeployments and the Deployments they own. On shutdown `cancel`
/// fires, aborting the cluster calls of in-flight passes.
pub async fn operator(settings: &Settings, cancel: CancellationToken) -> VllmOperatorResult<()> {
    let kubernetes_client = Client::try_default().await?;
    let args = &settings.operator;

    let (crd_api, deployment_api): (Api<VllmDeployment>, Api<Deployment>) =
        match &args.namespace {
            Some(namespace) => (
                Api::namespaced(kubernetes_client.clone(), namespace),
                Api::namespaced(kubernetes_client.clone(), namespace),
            ),
            None => (
                Api::all(kubernetes_client.clone()),
                Api::all(kubernetes_client.clone()),
            ),
        };

    let context = Arc::new(ContextData::from_settings(
        KubeCluster::new(kubernetes_client),
        cancel.clone(),
        args,
    ));

    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested, cancelling in-flight reconciliations");
            on_signal.cancel();
        }
    });

    info!(namespace = ?args.namespace, "starting VllmDeployment controller");
    Controller::new(crd_api, watcher::Config::default())
        .owns(deployment_api, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile::reconcile, reconcile::on_error, context)
        .for_each(|recon_result| async move {
            match recon_result {
                Ok((vllm, action)) => {
                    info!(resource = %vllm, ?action, "reconciliation successful")
                }
                Err(err) => {
                    warn!(error = %err, "reconciliation error")
                }
            }
        })
        .await;

    info!("controller stopped");
    Ok(())
}
