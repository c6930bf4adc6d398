use clap::Parser;
use tokio_util::sync::CancellationToken;
use vllm_common::settings::Settings;

use crate::error::VllmCliResult;

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Only watch this namespace (overrides `operator.namespace`)
    #[arg(short, long)]
    pub namespace: Option<String>,
}

pub async fn run(args: RunArgs, config: &Settings) -> VllmCliResult<()> {
    let mut settings = config.clone();
    if args.namespace.is_some() {
        settings.operator.namespace = args.namespace;
    }

    vllm_operator::operator(&settings, CancellationToken::new()).await?;
    Ok(())
}
