use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::coordinator::message::RoundIndex;
use crate::system::Category;

/// Invalid flags or configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--samples must be at least 1")]
    ZeroSamples,
    #[error("--tdelay must be at least 1 second")]
    ZeroDelay,
    #[error("positional {name} value {positional} conflicts with --{name}={flag}")]
    Conflicting {
        name: &'static str,
        flag: u64,
        positional: u64,
    },
    #[error("--samples must be at most {}, got {value}", crate::cli::MAX_SAMPLES)]
    SamplesOutOfRange { value: u64 },
    #[error("unknown log level `{0}`")]
    LogLevel(String),
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A counter source could not produce a sample.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{category} source unavailable: {reason}")]
pub struct SourceUnavailable {
    pub category: Category,
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(category: Category, reason: impl Into<String>) -> Self {
        Self {
            category,
            reason: reason.into(),
        }
    }
}

/// A control request the wait does not understand.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlProtocolError {
    #[error("unrecognized control signal {0}")]
    UnrecognizedSignal(i32),
}

/// Failures that end a monitoring run.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Source(#[from] SourceUnavailable),
    #[error("{category} worker exited before answering round {round}")]
    WorkerLost {
        category: Category,
        round: RoundIndex,
    },
    #[error("every worker hung up while round {0} was in flight")]
    ReadinessClosed(RoundIndex),
    #[error("failed to write report")]
    Io(#[from] io::Error),
}
