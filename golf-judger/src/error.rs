use crate::lang::Capability;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Harness errors. Any of these aborts the whole judging run.
///
/// A submission that merely fails a case is not an error, it is reported
/// through [`JudgeVerdict`](crate::judge::JudgeVerdict).
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build image {tag}\nstdout: {stdout}\nstderr: {stderr}")]
    Build {
        tag: String,
        stdout: String,
        stderr: String,
    },

    #[error("io error: path = {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("unknown hole: {0}")]
    UnknownHole(String),

    #[error("language {language} does not support disabling {capability}")]
    UnsupportedCapability {
        language: String,
        capability: Capability,
    },

    #[error("sandbox provider failed to {action}: {message}")]
    Provider {
        action: &'static str,
        message: String,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn provider(action: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            action,
            message: message.into(),
        }
    }
}
