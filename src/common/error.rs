use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid instance: {reason}")]
    InvalidInstance { reason: String },

    #[error("Scenario not found: {name}")]
    ScenarioNotFound { name: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(#[from] toml::de::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

impl DomainError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        DomainError::InvalidInstance {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
