#![warn(missing_docs)]
//! Optrace specific error structures
use std::{error::Error, fmt::Display};

/// Optrace specific Result type
pub type OptResult<T> = std::result::Result<T, OptraceError>;

/// Errors that can be returned by various optrace functions.
///
/// **Note**: a running propagation pass never returns one of these for degenerate geometry.
/// Errors only occur while building rays, components or configurations from invalid
/// parameters and while reading or writing scene data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptraceError {
    /// error while setting up or loading a `Scene`
    Scene(String),
    /// invalid parameters of an optical component
    Component(String),
    /// invalid parameters while creating or modifying a `Ray`
    Ray(String),
    /// errors occuring while running a trace or an imaging analysis
    Analysis(String),
    /// invalid configuration values
    Config(String),
    /// errors during console io
    Console(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for OptraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scene(m) => write!(f, "Scene:{m}"),
            Self::Component(m) => write!(f, "Component:{m}"),
            Self::Ray(m) => write!(f, "Ray:{m}"),
            Self::Analysis(m) => write!(f, "Analysis:{m}"),
            Self::Config(m) => write!(f, "Config:{m}"),
            Self::Console(m) => write!(f, "Console:{m}"),
            Self::Other(m) => write!(f, "Optrace Error:Other:{m}"),
        }
    }
}
impl Error for OptraceError {}

impl std::convert::From<String> for OptraceError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
