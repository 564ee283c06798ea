//! Scenario configuration for Rigger.
//!
//! This crate handles:
//! - Decoding scenario documents (JSON)
//! - Normalizing apps (names, destinations, customizations, repositories)
//! - Template expansion with app scoping
//! - Environment variable substitution

pub mod customize;
pub mod env;
pub mod error;
pub mod scenario;
pub mod template;

pub use env::{EnvContext, EnvContextBuilder};
pub use error::{ConfigError, ConfigResult};
pub use scenario::{Scenario, load_scenario, parse_scenario, qualify_name};
pub use template::{Template, TemplateError, TemplateResult, expand, try_expand};
