//! Backend selection.

use crate::{BackendError, BackendResult, Invocation, ScratchDir, ansible};
use derive_more::Display;
use rigger_core::Action;
use std::str::FromStr;

/// The execution backend actions are compiled for and run by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BackendKind {
    #[display("ansible")]
    Ansible,
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ansible" => Ok(Self::Ansible),
            _ => Err(BackendError::UnknownBackend(s.to_string())),
        }
    }
}

impl BackendKind {
    /// Play used by playbooks that do not name one.
    pub fn default_play(self) -> &'static str {
        match self {
            Self::Ansible => ansible::DEFAULT_PLAY,
        }
    }

    /// Hide the backend's own placeholders from scenario expansion.
    pub fn mask(self, input: &str) -> String {
        match self {
            Self::Ansible => ansible::mask(input),
        }
    }

    /// Restore placeholders hidden by [`BackendKind::mask`].
    pub fn unmask(self, input: &str) -> String {
        match self {
            Self::Ansible => ansible::unmask(input),
        }
    }

    pub fn validate(self, invocation: &Invocation) -> BackendResult<()> {
        match self {
            Self::Ansible => ansible::validate(invocation),
        }
    }

    pub async fn run(self, action: &Action, scratch: &ScratchDir) -> BackendResult<()> {
        match self {
            Self::Ansible => ansible::run(action, scratch).await,
        }
    }
}
