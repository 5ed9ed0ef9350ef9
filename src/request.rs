//! Process execution request.

/// How caller input reaches the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Extra arguments appended after the fixed arguments.
    ///
    /// Stdin is closed with no data.
    Arguments(Vec<String>),

    /// Payload written to stdin once, then the pipe is closed.
    ///
    /// `None` leaves stdin closed with no data.
    Stdin(Option<String>),
}

impl Default for InputMode {
    fn default() -> Self {
        InputMode::Arguments(Vec::new())
    }
}

/// A single process execution, built by the dispatcher after the working
/// directory has been resolved.
///
/// Consumed by [`ProcessRunner::run`](crate::ProcessRunner::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Program to execute, looked up on `PATH` when not a path.
    pub command: String,

    /// Arguments from the tool definition.
    ///
    /// Passed directly to execve as argv[1..], never through a shell.
    pub fixed_args: Vec<String>,

    /// Caller-supplied input.
    pub input: InputMode,

    /// Working directory, used verbatim.
    pub working_dir: String,
}

impl ExecutionRequest {
    /// Create a request with no caller input.
    pub fn new(
        command: impl Into<String>,
        fixed_args: Vec<String>,
        working_dir: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            fixed_args,
            input: InputMode::default(),
            working_dir: working_dir.into(),
        }
    }

    /// Append extra arguments.
    pub fn with_extra_args(mut self, extra: Vec<String>) -> Self {
        self.input = InputMode::Arguments(extra);
        self
    }

    /// Pipe a payload to stdin.
    pub fn with_stdin(mut self, payload: impl Into<String>) -> Self {
        self.input = InputMode::Stdin(Some(payload.into()));
        self
    }

    /// Set the input mode.
    pub fn with_input(mut self, input: InputMode) -> Self {
        self.input = input;
        self
    }

    /// Full argument list: fixed arguments followed by any extra arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.fixed_args.clone();
        if let InputMode::Arguments(extra) = &self.input {
            argv.extend(extra.iter().cloned());
        }
        argv
    }

    /// Stdin payload, if any.
    pub fn stdin_payload(&self) -> Option<&str> {
        match &self.input {
            InputMode::Stdin(payload) => payload.as_deref(),
            InputMode::Arguments(_) => None,
        }
    }
}
