use vllm_common::{
    error::VllmResult,
    settings::{get_config, Settings, CONFIG_INSTANCE},
};

use crate::Cli;

pub fn init_config(cli: &Cli) -> VllmResult<&'static Settings> {
    let settings = match &cli.settings {
        None => Settings::from_root(cli.root.clone())?,
        Some(settings) => Settings::from_root(Some(settings.clone()))?,
    };
    if CONFIG_INSTANCE.set(settings).is_err() {
        tracing::debug!("config already initialized, keeping the first one");
    }
    get_config()
}
