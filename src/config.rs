//! Gateway configuration file.
//!
//! Expected layout:
//! ```toml
//! listen = "127.0.0.1:8787"
//! default_root = "/srv/work"
//!
//! [limits]
//! max_output_chars = 50000
//! drop_line_chars = 1000
//!
//! [[roots]]
//! path = "/srv/work"
//! name = "work"
//! description = "Main workspace"
//! keywords = ["rust"]
//!
//! [[tools]]
//! name = "search"
//! kind = "exec"
//! command = "rg"
//! args = ["--no-heading", "--line-number"]
//! parameters = { type = "array", items = { type = "string" } }
//!
//! [[tools]]
//! name = "list_roots"
//! kind = "list_roots"
//! ```

use crate::dispatch::Gateway;
use crate::error::ConfigError;
use crate::limits::OutputLimits;
use crate::root::RootDescriptor;
use crate::tools::ToolDefinition;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8787";

/// Parsed configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Base URL advertised in the API document. Derived from the request's
    /// `Host` header when unset.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Root used when a call names none. Defaults to the first root.
    #[serde(default)]
    pub default_root: Option<String>,

    #[serde(default)]
    pub limits: OutputLimits,

    #[serde(default)]
    pub roots: Vec<RootDescriptor>,

    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}

impl GatewayConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            roots = config.roots.len(),
            tools = config.tools.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Parse config text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Replace the output character cap.
    pub fn with_max_output_chars(mut self, max: Option<usize>) -> Self {
        if let Some(max) = max {
            self.limits.max_output_chars = max;
        }
        self
    }

    /// Replace the per-line drop threshold.
    pub fn with_drop_line_chars(mut self, max: Option<usize>) -> Self {
        if let Some(max) = max {
            self.limits.drop_line_chars = max;
        }
        self
    }

    /// Replace the listen address.
    pub fn with_listen(mut self, listen: Option<SocketAddr>) -> Self {
        if let Some(listen) = listen {
            self.listen = listen;
        }
        self
    }

    /// Validate and build the gateway.
    pub fn to_gateway(&self) -> Result<Gateway, ConfigError> {
        let mut builder = Gateway::builder()
            .roots(self.roots.iter().cloned())
            .tools(self.tools.iter().cloned())
            .limits(self.limits);
        if let Some(root) = &self.default_root {
            builder = builder.default_root(root.clone());
        }
        builder.build()
    }
}
