//! Environment abstractions for testability.
//!
//! Commands read environment variables and piped stdin through these traits
//! so tests can run them in-process without touching the real process
//! state.

use std::collections::HashMap;
use std::io::{self, IsTerminal, Read};

/// Abstraction over environment variables.
pub trait EnvReader: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Abstraction over stdin reading.
pub trait StdinReader: Send + Sync {
    /// Returns `true` if stdin is interactive, `false` if piped.
    fn is_terminal(&self) -> bool;

    fn read_to_string(&self) -> io::Result<String>;
}

/// Real environment variable reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Real stdin reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealStdin;

impl StdinReader for RealStdin {
    fn is_terminal(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn read_to_string(&self) -> io::Result<String> {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

/// Mock environment variable reader for testing.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvReader for MockEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Mock stdin reader for testing.
#[derive(Debug, Clone)]
pub struct MockStdin {
    is_terminal: bool,
    content: Option<String>,
}

impl MockStdin {
    /// Simulates an interactive terminal with nothing piped.
    pub fn terminal() -> Self {
        Self {
            is_terminal: true,
            content: None,
        }
    }

    pub fn piped(content: impl Into<String>) -> Self {
        Self {
            is_terminal: false,
            content: Some(content.into()),
        }
    }
}

impl StdinReader for MockStdin {
    fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    fn read_to_string(&self) -> io::Result<String> {
        Ok(self.content.clone().unwrap_or_default())
    }
}

/// Everything a command reads from the process besides its arguments.
pub struct Environment<'a> {
    pub env: &'a dyn EnvReader,
    pub stdin: &'a dyn StdinReader,
    /// Whether stdout is a terminal; decides what `--output auto` means.
    pub stdout_is_terminal: bool,
}

impl<'a> Environment<'a> {
    pub fn new(env: &'a dyn EnvReader, stdin: &'a dyn StdinReader) -> Self {
        Environment {
            env,
            stdin,
            stdout_is_terminal: false,
        }
    }

    pub fn stdout_is_terminal(mut self, is_terminal: bool) -> Self {
        self.stdout_is_terminal = is_terminal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_env_returns_set_vars() {
        let env = MockEnv::new().with_var("TABULON_KEY", "email");
        assert_eq!(env.var("TABULON_KEY").as_deref(), Some("email"));
        assert_eq!(env.var("TABULON_OUTPUT"), None);
    }

    #[test]
    fn mock_stdin_piped() {
        let stdin = MockStdin::piped("[]");
        assert!(!stdin.is_terminal());
        assert_eq!(stdin.read_to_string().unwrap(), "[]");
        assert!(MockStdin::terminal().is_terminal());
    }
}
