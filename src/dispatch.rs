//! Tool dispatch.
//!
//! The main entry point for proc_gateway. [`Gateway`] owns the immutable
//! roots and tools tables, authorizes each call against the roots, and only
//! then hands the resulting [`ExecutionRequest`] to the [`ProcessRunner`].

use crate::error::{ConfigError, DispatchError};
use crate::limits::OutputLimits;
use crate::output::ExecutionResult;
use crate::request::ExecutionRequest;
use crate::root::{RootDescriptor, RootListing, RootResolver};
use crate::runner::ProcessRunner;
use crate::tools::{is_valid_tool_name, ToolAction, ToolDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of a tool invocation.
///
/// Every field is optional; an empty body is an empty call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolCall {
    /// Requested root. `None` selects the default root.
    #[serde(default)]
    pub root: Option<String>,

    /// Extra arguments for argument-mode tools.
    #[serde(default)]
    pub args: Vec<String>,

    /// Stdin payload for stdin-mode tools.
    #[serde(default)]
    pub input: Option<String>,
}

impl ToolCall {
    /// Parse a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MalformedCall` when the body is not a valid
    /// call. Nothing is executed in that case.
    pub fn from_json(body: &[u8]) -> Result<Self, DispatchError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| DispatchError::MalformedCall {
            reason: e.to_string(),
        })
    }

    /// Set the requested root.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the extra arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the stdin payload.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

/// An authorized call, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedCall {
    /// Spawn a process.
    Execute(ExecutionRequest),
    /// Answer with the root table.
    ListRoots(RootListing),
}

/// Response body of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Execution(ExecutionResult),
    Roots(RootListing),
}

/// Roots, tools and limits, fixed at startup.
///
/// Create using `Gateway::builder()`.
#[derive(Debug, Clone)]
pub struct Gateway {
    resolver: RootResolver,
    tools: Vec<ToolDefinition>,
    /// Tool name to index in `tools`.
    by_name: HashMap<String, usize>,
    runner: ProcessRunner,
}

impl Gateway {
    /// Create a new gateway builder.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Look up a tool and authorize the call.
    ///
    /// This is where root resolution happens; a denied call never reaches
    /// the runner.
    ///
    /// # Errors
    ///
    /// - `DispatchError::UnknownTool` if no tool has this name
    /// - `DispatchError::Denied` if the root was refused
    pub fn prepare(&self, name: &str, call: ToolCall) -> Result<PreparedCall, DispatchError> {
        let tool = self.tool(name).ok_or_else(|| DispatchError::UnknownTool {
            name: name.to_string(),
        })?;

        let (command, fixed_args, input) = match &tool.action {
            ToolAction::ListRoots => return Ok(PreparedCall::ListRoots(self.resolver.listing())),
            ToolAction::Exec {
                command,
                args,
                input,
            } => (command, args, *input),
        };

        // A forced root wins over whatever the caller asked for
        let requested = tool.root.as_deref().or(call.root.as_deref());
        let working_dir = self.resolver.resolve(requested)?;

        let request = ExecutionRequest::new(command.clone(), fixed_args.clone(), working_dir)
            .with_input(input.input_mode(call.args, call.input));

        Ok(PreparedCall::Execute(request))
    }

    /// Authorize and run a tool call.
    ///
    /// Spawn failures and non-zero exits come back as `Ok` results with the
    /// uniform `{code, out, err}` shape.
    pub async fn invoke(&self, name: &str, call: ToolCall) -> Result<ToolResponse, DispatchError> {
        match self.prepare(name, call)? {
            PreparedCall::ListRoots(listing) => Ok(ToolResponse::Roots(listing)),
            PreparedCall::Execute(request) => {
                Ok(ToolResponse::Execution(self.runner.run(request).await))
            }
        }
    }

    /// Get a tool by name.
    pub fn tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    /// Get all tools in configuration order.
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Get the root resolver.
    pub fn resolver(&self) -> &RootResolver {
        &self.resolver
    }

    /// Get the output limits.
    pub fn limits(&self) -> OutputLimits {
        self.runner.limits()
    }
}

/// Builder for `Gateway`.
#[derive(Debug, Clone, Default)]
pub struct GatewayBuilder {
    roots: Vec<RootDescriptor>,
    default_root: Option<String>,
    tools: Vec<ToolDefinition>,
    limits: OutputLimits,
}

impl GatewayBuilder {
    /// Create a new builder with default limits and no roots or tools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an allowed root.
    pub fn root(mut self, root: RootDescriptor) -> Self {
        self.roots.push(root);
        self
    }

    /// Add several allowed roots.
    pub fn roots(mut self, roots: impl IntoIterator<Item = RootDescriptor>) -> Self {
        self.roots.extend(roots);
        self
    }

    /// Set the root used when a call names none.
    ///
    /// Defaults to the first configured root.
    pub fn default_root(mut self, path: impl Into<String>) -> Self {
        self.default_root = Some(path.into());
        self
    }

    /// Add a tool.
    pub fn tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add several tools.
    pub fn tools(mut self, tools: impl IntoIterator<Item = ToolDefinition>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Set the output limits.
    pub fn limits(mut self, limits: OutputLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A limit is zero
    /// - A tool name is invalid or used twice
    /// - A tool forces a root that is not configured
    /// - There is no default root and no roots at all
    ///
    /// Directory existence is not checked here; roots are checked on every
    /// call instead.
    pub fn build(self) -> Result<Gateway, ConfigError> {
        if self.limits.max_output_chars == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "max_output_chars",
            });
        }
        if self.limits.drop_line_chars == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "drop_line_chars",
            });
        }
        if self.limits.is_inverted() {
            tracing::warn!(
                max_output_chars = self.limits.max_output_chars,
                drop_line_chars = self.limits.drop_line_chars,
                "per-line limit exceeds output limit; only the output limit will apply"
            );
        }

        let default_root = match self.default_root {
            Some(root) => root,
            None => self
                .roots
                .first()
                .map(|r| r.path.clone())
                .ok_or(ConfigError::NoDefaultRoot)?,
        };

        let resolver = RootResolver::new(self.roots, default_root);

        let mut by_name = HashMap::new();
        for (i, tool) in self.tools.iter().enumerate() {
            if !is_valid_tool_name(&tool.name) {
                return Err(ConfigError::InvalidToolName {
                    name: tool.name.clone(),
                });
            }
            if by_name.insert(tool.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateTool {
                    name: tool.name.clone(),
                });
            }
            if let Some(root) = &tool.root {
                if !resolver.is_allowed(root) {
                    return Err(ConfigError::UnknownForcedRoot {
                        tool: tool.name.clone(),
                        root: root.clone(),
                    });
                }
            }
        }

        Ok(Gateway {
            resolver,
            tools: self.tools,
            by_name,
            runner: ProcessRunner::new(self.limits),
        })
    }
}
