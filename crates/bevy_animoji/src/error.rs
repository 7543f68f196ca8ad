use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnimojiError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to load animoji scene `{path}`: {reason}")]
    SceneLoad {
        path: String,
        reason: String,
    },
}
