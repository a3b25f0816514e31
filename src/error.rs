// Sampling errors. Sources log these and fall back to an empty snapshot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("{0} is not available on this platform")]
    Unavailable(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("reading {path}: {source}")]
    Io {
        path: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {detail}")]
    Parse { path: &'static str, detail: String },
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
    #[error("sampling task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}
