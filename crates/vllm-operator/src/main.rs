use tokio_util::sync::CancellationToken;
use vllm_common::settings::Settings;
use vllm_common::util::tracing::{level_from_log, setup_tracing};
use vllm_operator::error::VllmOperatorResult;

#[tokio::main]
async fn main() -> VllmOperatorResult<()> {
    let settings = Settings::from_root(None)?;
    setup_tracing(Some(level_from_log(settings.log_level))).await;

    vllm_operator::operator(&settings, CancellationToken::new()).await
}
