use vllm_common::error::VllmError;

pub type VllmOperatorResult<T = (), E = VllmOperatorError> = Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum VllmOperatorError {
    #[error("Runtime error: {0}")]
    Runtime(#[from] anyhow::Error),

    /// Any error originating from the `kube-rs` crate
    #[error("Kubernetes reported error: {source}")]
    Kube {
        #[from]
        source: kube::Error,
    },

    /// None of the container templates can serve the model.
    #[error("No primary container: {0}")]
    NoPrimaryContainer(String),

    #[error("Resource is missing {0}")]
    MissingObjectKey(&'static str),

    #[error("Reconciliation cancelled")]
    Cancelled,

    #[error("Invalid Json: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("Invalid Kubernetes Yaml: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
}

impl VllmOperatorError {
    /// Reason recorded on the `ReconcileFailed` condition.
    pub fn reason(&self) -> &'static str {
        match self {
            VllmOperatorError::NoPrimaryContainer(_) => "InvalidContainers",
            VllmOperatorError::MissingObjectKey(_) => "InvalidMetadata",
            VllmOperatorError::Kube { .. } => "ApiError",
            VllmOperatorError::Cancelled => "Cancelled",
            VllmOperatorError::Runtime(_)
            | VllmOperatorError::Json { .. }
            | VllmOperatorError::Yaml { .. } => "InternalError",
        }
    }

    /// Validation failures need a spec change, retrying alone won't fix them.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            VllmOperatorError::NoPrimaryContainer(_) | VllmOperatorError::MissingObjectKey(_)
        )
    }
}

impl From<VllmOperatorError> for VllmError {
    fn from(error: VllmOperatorError) -> Self {
        match error {
            VllmOperatorError::Runtime(e) => VllmError::Runtime(e),
            VllmOperatorError::Kube { source } => VllmError::Kube { source },
            VllmOperatorError::Json { source } => VllmError::Json { source },
            VllmOperatorError::Yaml { source } => VllmError::Yaml { source },
            VllmOperatorError::Cancelled => VllmError::Interrupted,
            e => VllmError::Runtime(anyhow::anyhow!(e.to_string())),
        }
    }
}

impl From<VllmError> for VllmOperatorError {
    fn from(error: VllmError) -> Self {
        match error {
            VllmError::Kube { source } => VllmOperatorError::Kube { source },
            VllmError::Json { source } => VllmOperatorError::Json { source },
            VllmError::Yaml { source } => VllmOperatorError::Yaml { source },
            VllmError::Interrupted => VllmOperatorError::Cancelled,
            VllmError::Runtime(e) => VllmOperatorError::Runtime(e),
            e => VllmOperatorError::Runtime(anyhow::anyhow!(e.to_string())),
        }
    }
}
