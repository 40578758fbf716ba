use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected before any worker or channel is created.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A worker thread could not be spawned; the whole run is aborted.
    #[error("could not create worker #{worker}: {source}")]
    ResourceCreation {
        worker: usize,
        #[source]
        source: io::Error,
    },

    #[error("worker #{worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
