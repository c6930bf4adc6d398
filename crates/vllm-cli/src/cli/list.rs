use clap::Parser;
use kube::{Client, ResourceExt};
use vllm_common::settings::Settings;
use vllm_operator::{
    k8s::{deployment::resolve_replicas, deployment_name},
    ClusterApi, KubeCluster, VllmDeployment,
};

use crate::error::VllmCliResult;

#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Namespace to list. Every namespace when omitted.
    #[arg(short, long)]
    pub namespace: Option<String>,
}

pub async fn run(args: ListArgs, config: &Settings) -> VllmCliResult<()> {
    let client = Client::try_default().await?;
    let cluster = KubeCluster::new(client);

    let namespace = args.namespace.or_else(|| config.operator.namespace.clone());
    let vllms = cluster.list_vllm(namespace).await?;
    print!("{}", render_table(&vllms));
    Ok(())
}

const HEADER: [&str; 6] = [
    "NAMESPACE",
    "NAME",
    "MODEL",
    "DEPLOYMENT",
    "READY",
    "CONDITIONS",
];

fn render_table(vllms: &[VllmDeployment]) -> String {
    let mut rows: Vec<[String; 6]> = vec![HEADER.map(String::from)];
    for vllm in vllms {
        let status = vllm.status.clone().unwrap_or_default();
        let conditions = status
            .conditions
            .iter()
            .map(|c| format!("{}={}", c.type_, c.status))
            .collect::<Vec<_>>()
            .join(",");
        rows.push([
            vllm.namespace().unwrap_or_default(),
            vllm.name_any(),
            vllm.spec.model.name.clone(),
            deployment_name(&vllm.name_any()),
            format!(
                "{}/{}",
                status.ready_replicas.unwrap_or(0),
                resolve_replicas(vllm.spec.replicas)
            ),
            if conditions.is_empty() {
                "-".to_string()
            } else {
                conditions
            },
        ]);
    }

    let mut widths = [0usize; 6];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
