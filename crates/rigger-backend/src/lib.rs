//! Execution backends for Rigger.
//!
//! Provides the pieces that sit between compiled actions and the process
//! that applies them:
//! - Backend selection, placeholder masking and parameter validation
//! - The Ansible runner
//! - Scratch files and HTTP downloads
//! - Caller-supplied invocation settings

pub mod ansible;
pub mod download;
pub mod error;
pub mod invocation;
pub mod kind;
pub mod scratch;

pub use download::HttpDownloader;
pub use error::{BackendError, BackendResult};
pub use invocation::Invocation;
pub use kind::BackendKind;
pub use scratch::ScratchDir;
