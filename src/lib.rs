//! # proc_gateway
//!
//! Local HTTP gateway that exposes a fixed set of command-line tools.
//!
//! Each call runs the configured command as a child process in an
//! allow-listed working directory and returns bounded, line-safe output as
//! `{"code", "out", "err"}` JSON. The gateway also describes its endpoints as
//! an OpenAPI document for automated callers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use proc_gateway::{Gateway, OutputLimits, RootDescriptor, ToolCall, ToolDefinition};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Gateway::builder()
//!     .root(RootDescriptor::new("/srv/project", "project"))
//!     .tool(ToolDefinition::exec("search", "rg", &["--line-number"]))
//!     .limits(OutputLimits::new(50_000, 1_000))
//!     .build()?;
//!
//! let call = ToolCall::default()
//!     .with_root("/srv/project")
//!     .with_args(["TODO", "src"]);
//! let response = gateway.invoke("search", call).await?;
//!
//! println!("{}", serde_json::to_string(&response)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **No shell interpretation**: commands use argv-style execution
//! - **Allowlist-only roots**: a requested root must equal a configured path
//! - **Authorize before spawn**: a refused root never starts a process
//! - **Uniform results**: spawn failures are reported as `code = -1`, not errors
//! - **Bounded stdout**: oversized lines are dropped whole, total output is capped

mod accumulator;
mod config;
mod dispatch;
mod error;
mod limits;
mod output;
mod request;
mod root;
mod runner;
pub mod schema;
pub mod server;
mod tools;

// Public API
pub use accumulator::OutputAccumulator;
pub use config::{GatewayConfig, DEFAULT_LISTEN};
pub use dispatch::{Gateway, GatewayBuilder, PreparedCall, ToolCall, ToolResponse};
pub use error::{ConfigError, DenialKind, DispatchError, RootDenial};
pub use limits::{OutputLimits, DEFAULT_DROP_LINE_CHARS, DEFAULT_MAX_OUTPUT_CHARS};
pub use output::{ExecutionResult, SIGNAL_EXIT_BASE, SPAWN_FAILURE_CODE};
pub use request::{ExecutionRequest, InputMode};
pub use root::{RootDescriptor, RootListing, RootResolver};
pub use runner::ProcessRunner;
pub use tools::{InputKind, ToolAction, ToolDefinition};
