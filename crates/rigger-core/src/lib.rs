//! Core domain types for the Rigger scenario compiler.
//!
//! This crate contains:
//! - Scenario document records (oses, apps, playbooks, containers)
//! - The compiled `Action` handed to an execution backend
//! - The error taxonomy shared by every compilation stage
//! - Collaborator traits (downloads)

pub mod action;
pub mod download;
pub mod error;
pub mod scenario;
pub mod suffix;

pub use action::Action;
pub use download::Downloader;
pub use error::{Error, ErrorKind, Result};
pub use scenario::{
    App, Container, Cred, Customization, Os, Playbook, Repository, ScenarioDocument,
};
pub use suffix::Suffix;

/// Type assigned to apps that do not declare one. Apps of this type keep their name as-is.
pub const DEFAULT_APP_TYPE: &str = "generic";

/// State given to playbooks (and through them, containers) that do not declare one.
pub const DEFAULT_APP_STATE: &str = "running";

/// Branch checked out when a repository does not name one.
pub const DEFAULT_BRANCH: &str = "master";

/// File mode applied to staged files that do not declare one.
pub const DEFAULT_FILE_MODE: u32 = 400;

/// Placeholder for the configuration file's directory, resolved by the caller.
pub const BASE_DIR_TOKEN: &str = "@BASEDIR";
