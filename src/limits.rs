//! Output limits for process execution.

use serde::Deserialize;

/// Default cap on characters retained from a process's stdout.
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 50_000;

/// Default maximum length of a single stdout line.
pub const DEFAULT_DROP_LINE_CHARS: usize = 1_000;

/// Limits applied to captured stdout.
///
/// Both values are counted in characters, not bytes. Stderr is never limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputLimits {
    /// Maximum characters kept from stdout.
    ///
    /// The line crossing this cap is cut to fill the remaining budget and
    /// everything after it is discarded.
    /// Default: 50 000.
    pub max_output_chars: usize,

    /// Maximum length of a single line, including its `\n`.
    ///
    /// Longer lines are dropped entirely, never truncated.
    /// Default: 1 000.
    pub drop_line_chars: usize,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
            drop_line_chars: DEFAULT_DROP_LINE_CHARS,
        }
    }
}

impl OutputLimits {
    /// Create limits with explicit values.
    pub fn new(max_output_chars: usize, drop_line_chars: usize) -> Self {
        Self {
            max_output_chars,
            drop_line_chars,
        }
    }

    /// Set the output character cap.
    pub fn with_max_output_chars(mut self, max: usize) -> Self {
        self.max_output_chars = max;
        self
    }

    /// Set the per-line drop threshold.
    pub fn with_drop_line_chars(mut self, max: usize) -> Self {
        self.drop_line_chars = max;
        self
    }

    /// True when the per-line threshold exceeds the global cap.
    ///
    /// Such a configuration still works: every line passes the per-line
    /// check and the global cap does the truncation.
    pub fn is_inverted(&self) -> bool {
        self.drop_line_chars > self.max_output_chars
    }
}
