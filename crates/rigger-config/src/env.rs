//! Environment variable substitution for rendered container parameters.
//!
//! After template expansion, shell-style `$NAME` tokens (upper-case names)
//! are replaced with values from the captured environment. Names that are
//! not set expand to an empty string, as a shell would.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// Regex for matching $NAME variables
static ENV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Z_][A-Z0-9_]*)").expect("valid env regex"));

/// Snapshot of environment variables available for substitution.
#[derive(Debug, Clone, Default)]
pub struct EnvContext {
    vars: HashMap<String, String>,
}

impl EnvContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    pub fn from_process() -> Self {
        let mut ctx = Self::new();
        ctx.populate_env();
        ctx
    }

    /// Populate variables from the current process environment.
    pub fn populate_env(&mut self) {
        for (key, value) in std::env::vars() {
            self.vars.insert(key, value);
        }
    }

    /// Set a single variable.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Replace every `$NAME` in `input`.
    pub fn substitute(&self, input: &str) -> String {
        ENV_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                self.get(&caps[1]).unwrap_or_default().to_string()
            })
            .into_owned()
    }
}

/// Builder for creating EnvContext.
#[derive(Debug, Default)]
pub struct EnvContextBuilder {
    ctx: EnvContext,
}

impl EnvContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.vars.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> EnvContext {
        self.ctx
    }
}
