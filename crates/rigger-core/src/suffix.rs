//! Scenario suffix, the namespace for scratch-file naming.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// `{id}-{env}` of a scenario. Computed once when the scenario is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
#[serde(transparent)]
pub struct Suffix(String);

impl Suffix {
    pub fn new(id: &str, env: &str) -> Self {
        Self(format!("{}-{}", id, env))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Suffix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
