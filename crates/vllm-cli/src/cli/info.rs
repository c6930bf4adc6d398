use clap::Parser;
use vllm_common::settings::Settings;

use crate::error::VllmCliResult;

#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

pub async fn run(_args: InfoArgs, _config: &Settings) -> VllmCliResult<()> {
    println!("{}", build_info());
    Ok(())
}

fn build_info() -> String {
    format!(
        "{} {} ({}, rustc {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"),
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
    )
}
