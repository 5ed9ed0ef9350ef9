//! Error types for proc_gateway.
//!
//! This module defines three error categories:
//! - [`RootDenial`]: a working directory was refused before any process ran
//! - [`DispatchError`]: a tool invocation was rejected by the dispatcher
//! - [`ConfigError`]: the gateway configuration could not be loaded
//!
//! Execution failures (spawn errors, non-zero exits) are not errors here.
//! They are folded into [`ExecutionResult`](crate::ExecutionResult) so callers
//! always see the same `{code, out, err}` shape.

use std::path::PathBuf;
use thiserror::Error;

/// Kind of root denial, mirrored in the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialKind {
    /// The configured default root is missing (500).
    ServerMisconfiguration,
    /// The requested root is not allow-listed (403).
    Forbidden,
    /// The requested root is allow-listed but missing on disk (404).
    NotFound,
}

impl std::fmt::Display for DenialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialKind::ServerMisconfiguration => write!(f, "server misconfiguration"),
            DenialKind::Forbidden => write!(f, "forbidden"),
            DenialKind::NotFound => write!(f, "not found"),
        }
    }
}

/// Root resolution failure.
///
/// Produced fresh for every request. The display text is the reason echoed
/// to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RootDenial {
    /// No root was requested and the default root is not a directory.
    #[error("default root does not exist")]
    ServerMisconfiguration { root: String },

    /// The requested root does not match any configured root.
    #[error("root not allowed")]
    Forbidden { root: String },

    /// The requested root is configured but not a directory.
    #[error("root does not exist")]
    NotFound { root: String },
}

impl RootDenial {
    /// Classify this denial.
    pub fn kind(&self) -> DenialKind {
        match self {
            RootDenial::ServerMisconfiguration { .. } => DenialKind::ServerMisconfiguration,
            RootDenial::Forbidden { .. } => DenialKind::Forbidden,
            RootDenial::NotFound { .. } => DenialKind::NotFound,
        }
    }

    /// HTTP status code for this denial.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            DenialKind::ServerMisconfiguration => 500,
            DenialKind::Forbidden => 403,
            DenialKind::NotFound => 404,
        }
    }

    /// Reason text sent to the caller.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// The root that was attempted.
    pub fn attempted_root(&self) -> &str {
        match self {
            RootDenial::ServerMisconfiguration { root }
            | RootDenial::Forbidden { root }
            | RootDenial::NotFound { root } => root,
        }
    }
}

/// Tool invocation rejected before execution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No tool with this name is configured.
    #[error("unknown tool")]
    UnknownTool { name: String },

    /// The request body could not be parsed.
    #[error("malformed request: {reason}")]
    MalformedCall { reason: String },

    /// Root resolution refused the working directory.
    #[error(transparent)]
    Denied(#[from] RootDenial),
}

impl DispatchError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::UnknownTool { .. } => 404,
            DispatchError::MalformedCall { .. } => 400,
            DispatchError::Denied(denial) => denial.status_code(),
        }
    }
}

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A numeric limit is zero
    #[error("limit {name} must be a positive integer")]
    InvalidLimit { name: &'static str },

    /// Two tools share a name
    #[error("duplicate tool name: {name}")]
    DuplicateTool { name: String },

    /// Tool name cannot be used as a URL path segment
    #[error("invalid tool name {name:?}: use letters, digits, '-' or '_'")]
    InvalidToolName { name: String },

    /// A tool forces a root that is not configured
    #[error("tool {tool} forces root {root} which is not in the roots table")]
    UnknownForcedRoot { tool: String, root: String },

    /// Neither a default root nor any root is configured
    #[error("no default root configured and the roots table is empty")]
    NoDefaultRoot,
}
