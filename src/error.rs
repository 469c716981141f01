use std::path::PathBuf;
use thiserror::Error;

/// Result type for host scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Failures raised by the host scene binding
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("duplicate node name: {0}")]
    DuplicateNode(String),
    #[error("node {0} is not a standin")]
    NotAStandin(String),
    #[error("parenting {child} under {parent} would create a cycle")]
    ParentCycle { child: String, parent: String },
    #[error("file does not exist: {0:?}")]
    MissingFile(PathBuf),
    #[error("namespace already in use: {0}")]
    NamespaceTaken(String),
    #[error("parent of {0} has a singular transform")]
    SingularTransform(String),
    #[error("scene document error: {0}")]
    Document(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
