//! Tool definitions.
//!
//! A tool is a command template exposed as one HTTP endpoint. The table is
//! loaded once at startup and never changes.

use crate::request::InputMode;
use serde::Deserialize;
use serde_json::Value;

/// How caller input is passed to an exec tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Caller `args` are appended after the fixed arguments (default).
    #[default]
    Arguments,
    /// Caller `input` is piped to stdin.
    Stdin,
}

impl InputKind {
    /// Build the runtime input mode from a caller's arguments and payload.
    ///
    /// The field not used by this kind is ignored.
    pub fn input_mode(self, args: Vec<String>, input: Option<String>) -> InputMode {
        match self {
            InputKind::Arguments => InputMode::Arguments(args),
            InputKind::Stdin => InputMode::Stdin(input),
        }
    }
}

/// What a tool does when invoked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolAction {
    /// Run a command in the resolved root.
    Exec {
        /// Program to run.
        command: String,
        /// Arguments always passed first.
        #[serde(default)]
        args: Vec<String>,
        /// Where caller input goes.
        #[serde(default)]
        input: InputKind,
    },

    /// Return the configured roots without running anything.
    ListRoots,
}

/// One configured tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolDefinition {
    /// Endpoint name, used as `/tools/{name}`.
    pub name: String,

    /// Human-readable summary for the API document.
    #[serde(default)]
    pub description: String,

    /// Root every invocation runs in, ignoring the caller's choice.
    #[serde(default)]
    pub root: Option<String>,

    /// Description of the caller arguments or stdin payload.
    #[serde(default)]
    pub args_help: Option<String>,

    /// JSON Schema advertised for `args` (argument mode) or `input` (stdin
    /// mode). Documentation only: calls are not validated against it.
    #[serde(default)]
    pub parameters: Option<Value>,

    #[serde(flatten)]
    pub action: ToolAction,
}

impl ToolDefinition {
    /// Create an exec tool in argument mode.
    pub fn exec(name: impl Into<String>, command: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            root: None,
            args_help: None,
            parameters: None,
            action: ToolAction::Exec {
                command: command.into(),
                args: args.iter().map(|s| s.to_string()).collect(),
                input: InputKind::Arguments,
            },
        }
    }

    /// Create a root listing tool.
    pub fn list_roots(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            root: None,
            args_help: None,
            parameters: None,
            action: ToolAction::ListRoots,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Force every invocation into one root.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the help text for caller input.
    pub fn with_args_help(mut self, help: impl Into<String>) -> Self {
        self.args_help = Some(help.into());
        self
    }

    /// Set the schema advertised for caller input.
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Switch an exec tool to stdin mode. No effect on other tools.
    pub fn stdin_mode(mut self) -> Self {
        if let ToolAction::Exec { input, .. } = &mut self.action {
            *input = InputKind::Stdin;
        }
        self
    }

    /// Input kind for exec tools.
    pub fn input_kind(&self) -> Option<InputKind> {
        match &self.action {
            ToolAction::Exec { input, .. } => Some(*input),
            ToolAction::ListRoots => None,
        }
    }

    /// Whether callers may choose the root.
    pub fn accepts_root(&self) -> bool {
        self.root.is_none() && matches!(self.action, ToolAction::Exec { .. })
    }
}

/// Whether `name` is usable as a URL path segment.
pub(crate) fn is_valid_tool_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
