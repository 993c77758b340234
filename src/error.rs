use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid url {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("manifest of clip {clip_id} has no {kind} track")]
    MissingTrack { clip_id: String, kind: &'static str },

    #[error("invalid init data: {0}")]
    InitData(#[from] base64::DecodeError),

    #[error("filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder {} failed: {reason}", .encoder.display())]
    ExternalProcess {
        encoder: PathBuf,
        status: Option<ExitStatus>,
        reason: String,
    },
}

impl Error {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem { path: path.into(), source }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}
