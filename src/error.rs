use std::io;

/// All error types for the tile inspector.
#[derive(thiserror::Error, Debug)]
pub enum InspectError {
    #[error("Tileset error: {0}")]
    Tileset(String),
    #[error("Load error: {0}")]
    Load(String),
    #[error("Scheduler error: {0}")]
    Scheduler(String),
    #[error("Output error: {0}")]
    Output(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InspectError>;
