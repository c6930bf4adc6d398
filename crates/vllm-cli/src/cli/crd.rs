use clap::Parser;
use kube::CustomResourceExt;
use vllm_common::settings::Settings;
use vllm_operator::VllmDeployment;

use crate::error::VllmCliResult;

#[derive(Parser, Debug, Clone)]
pub struct CrdArgs {}

pub async fn run(_args: CrdArgs, _config: &Settings) -> VllmCliResult<()> {
    print!("{}", render_crd()?);
    Ok(())
}

fn render_crd() -> VllmCliResult<String> {
    Ok(serde_yaml::to_string(&VllmDeployment::crd())?)
}
