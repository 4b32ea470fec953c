use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("cannot read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("multipart encoding: {0}")]
    Encoding(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("empty response from server")]
    EmptyResponse,

    #[error("{}", describe_unexpected(.status, .messages))]
    UnexpectedResponse {
        status: StatusCode,
        messages: Vec<String>,
    },

    #[error("failed to download attachment: {status}")]
    DownloadFailed { status: StatusCode },

    #[error("json decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AttachmentError {
    /// HTTP status the server answered with, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedResponse { status, .. } | Self::DownloadFailed { status } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// True when the server said the resource does not exist, as opposed to
    /// a transport failure or any other rejection.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Classify a failure to open a local file.
    pub(crate) fn from_file_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileAccess {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}

fn describe_unexpected(status: &StatusCode, messages: &[String]) -> String {
    if messages.is_empty() {
        format!("unexpected response: {status}")
    } else {
        format!("unexpected response: {status}: {}", messages.join("; "))
    }
}

/// Tracker error body: `{"errorMessages": [...], "errors": {"field": "msg"}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

/// Collect the structured messages from an error body. Anything that is not
/// the tracker's error shape yields no messages.
pub(crate) fn error_messages(body: &[u8]) -> Vec<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    parsed
        .error_messages
        .into_iter()
        .chain(
            parsed
                .errors
                .into_iter()
                .map(|(field, msg)| format!("{field}: {msg}")),
        )
        .collect()
}
