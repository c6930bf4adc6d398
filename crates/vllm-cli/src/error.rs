use thiserror::Error;
use vllm_common::error::VllmError;
use vllm_operator::error::VllmOperatorError;

pub type VllmCliResult<T = (), E = VllmCliError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum VllmCliError {
    #[error("Unable to initialize config: {0}")]
    InitConfig(String),
    #[error("Operator error: {0}")]
    Operator(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<VllmCliError> for VllmError {
    fn from(error: VllmCliError) -> Self {
        match error {
            VllmCliError::InitConfig(e) => VllmError::Cli(e),
            VllmCliError::Operator(e) => VllmError::Cli(e),
            VllmCliError::Runtime(e) => VllmError::Cli(e),
        }
    }
}

impl From<VllmError> for VllmCliError {
    fn from(error: VllmError) -> Self {
        VllmCliError::Runtime(error.to_string())
    }
}

impl From<VllmOperatorError> for VllmCliError {
    fn from(error: VllmOperatorError) -> Self {
        VllmCliError::Operator(error.to_string())
    }
}

impl From<anyhow::Error> for VllmCliError {
    fn from(error: anyhow::Error) -> Self {
        VllmCliError::Runtime(error.to_string())
    }
}

impl From<kube::Error> for VllmCliError {
    fn from(error: kube::Error) -> Self {
        VllmCliError::Operator(error.to_string())
    }
}

impl From<serde_yaml::Error> for VllmCliError {
    fn from(error: serde_yaml::Error) -> Self {
        VllmCliError::Runtime(error.to_string())
    }
}
