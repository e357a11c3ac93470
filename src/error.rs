use thiserror::Error;

pub type Result<T> = std::result::Result<T, AutoRstError>;

#[derive(Error, Debug)]
pub enum AutoRstError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Clean error: {0}")]
    Clean(#[from] fs_extra::error::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    Path(String),
}

impl AutoRstError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn path(msg: impl Into<String>) -> Self {
        Self::Path(msg.into())
    }
}
