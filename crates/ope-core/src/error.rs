use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Installation root unavailable: {0}")]
    InstallRootUnavailable(String),

    #[error("Failed to spawn companion {program}: {source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for companion {program}: {source}")]
    WaitFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("URL handler registration failed: {0}")]
    RegistrationFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
