use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid {name} pattern: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("The {name} pattern lacks the capture group `{group}`")]
    MissingGroup {
        name: &'static str,
        group: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Failed to launch harness `{}`: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Harness did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Error collecting harness output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Error writing `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error serializing run configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Harness(#[from] HarnessError),
}

impl RunError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
