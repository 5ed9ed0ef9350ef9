//! Line-safe, bounded stdout capture.
//!
//! Stdout arrives in arbitrary chunks. The accumulator keeps the unterminated
//! tail of the previous chunk (the carry) and only ever judges complete
//! lines, so a long line split across reads is still dropped as a whole.

use crate::limits::OutputLimits;

/// Accumulates stdout under [`OutputLimits`].
///
/// Lines are split on `\n`. A `\r` right before the `\n` is stripped. A line
/// is measured as the character count of what would be stored (content plus
/// `\n`), and dropped entirely when that exceeds `drop_line_chars`. Kept
/// lines are appended until `max_output_chars`; the line crossing the cap is
/// cut to fill the remaining budget and all later input is ignored.
#[derive(Debug)]
pub struct OutputAccumulator {
    limits: OutputLimits,
    accepted: String,
    accepted_chars: usize,
    carry: Vec<u8>,
    /// The current line is already too long and is skipped up to its `\n`.
    skipping_line: bool,
    full: bool,
}

impl OutputAccumulator {
    /// Create an empty accumulator.
    pub fn new(limits: OutputLimits) -> Self {
        Self {
            limits,
            accepted: String::new(),
            accepted_chars: 0,
            carry: Vec::new(),
            skipping_line: false,
            full: false,
        }
    }

    /// Feed one chunk of stdout.
    ///
    /// Once the cap is reached, chunks are ignored. Callers should keep
    /// reading the pipe so the child does not block on a full buffer.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.full {
            return;
        }

        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];

            if self.skipping_line {
                self.skipping_line = false;
                continue;
            }

            self.carry.extend_from_slice(head);
            let line = std::mem::take(&mut self.carry);
            self.accept_line(&line, true);

            if self.full {
                return;
            }
        }

        if !self.skipping_line {
            self.carry.extend_from_slice(rest);
            self.bound_carry();
        }
    }

    /// Whether the output cap has been reached.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Characters accepted so far.
    pub fn len_chars(&self) -> usize {
        self.accepted_chars
    }

    /// Flush the final unterminated line and return the accepted text.
    pub fn finish(mut self) -> String {
        if !self.full && !self.skipping_line && !self.carry.is_empty() {
            let line = std::mem::take(&mut self.carry);
            self.accept_line(&line, false);
        }
        self.accepted
    }

    /// Discard the carry once it can no longer fit under the line limit.
    ///
    /// Stripping a trailing `\r` removes at most one character and a `\n`
    /// adds one, so a carry over `drop_line_chars + 1` characters is always
    /// dropped, terminated or not.
    fn bound_carry(&mut self) {
        let ceiling = self.limits.drop_line_chars.saturating_add(1);

        // chars <= bytes, so short carries can skip the count
        if self.carry.len() <= ceiling {
            return;
        }

        if String::from_utf8_lossy(&self.carry).chars().count() > ceiling {
            tracing::trace!(
                limit = self.limits.drop_line_chars,
                "dropping overlong stdout line"
            );
            self.carry.clear();
            self.skipping_line = true;
        }
    }

    fn accept_line(&mut self, raw: &[u8], terminated: bool) {
        let mut line = String::from_utf8_lossy(raw).into_owned();
        if line.ends_with('\r') {
            line.pop();
        }
        if terminated {
            line.push('\n');
        }

        let len = line.chars().count();
        if len > self.limits.drop_line_chars {
            tracing::trace!(
                len,
                limit = self.limits.drop_line_chars,
                "dropping overlong stdout line"
            );
            return;
        }

        let remaining = self
            .limits
            .max_output_chars
            .saturating_sub(self.accepted_chars);
        if len <= remaining {
            self.accepted.push_str(&line);
            self.accepted_chars += len;
        } else {
            self.accepted.extend(line.chars().take(remaining));
            self.accepted_chars += remaining;
        }

        if self.accepted_chars >= self.limits.max_output_chars {
            tracing::debug!(
                limit = self.limits.max_output_chars,
                "stdout cap reached, discarding remaining output"
            );
            self.full = true;
            self.carry.clear();
        }
    }
}
