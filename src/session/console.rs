//! Console callbacks: the only operations the interpreter's read loop may
//! call back into the host with.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Which stream a console write belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Regular,
    Error,
}

pub trait Console {
    fn write(&mut self, text: &str, kind: OutputKind);

    /// Reads one line of user input, or `None` at end of input.
    fn read(&mut self, prompt: &str) -> Option<String>;
}

/// Writes to stdout/stderr and reads from stdin.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&mut self, text: &str, kind: OutputKind) {
        // Console output is best-effort; a closed pipe is not a session error.
        let _ = match kind {
            OutputKind::Regular => std::io::stdout().write_all(text.as_bytes()),
            OutputKind::Error => std::io::stderr().write_all(text.as_bytes()),
        };
    }

    fn read(&mut self, prompt: &str) -> Option<String> {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(prompt.as_bytes());
        let _ = stdout.flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Collects output in memory and serves input from a queue.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    output: String,
    errors: String,
    input: VecDeque<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn errors(&self) -> &str {
        &self.errors
    }
}

impl Console for BufferConsole {
    fn write(&mut self, text: &str, kind: OutputKind) {
        match kind {
            OutputKind::Regular => self.output.push_str(text),
            OutputKind::Error => self.errors.push_str(text),
        }
    }

    fn read(&mut self, _prompt: &str) -> Option<String> {
        self.input.pop_front()
    }
}
