//! Template expansion for scenario strings.
//!
//! Supports the Go-style placeholders used in scenario documents:
//! - `{{.Id}}` / `{{.Apps}}` - field paths into the scenario
//! - `{{index .Apps 0}}` - element selection (sequences by position, records by key)
//! - `{{(index .Apps 0).Name}}` - field paths on grouped operands
//! - `{{.Name | printf "%s-web"}}` - pipelines, with `len`, `print` and `printf`
//! - `{{.App.Dest}}` - the current app, when rendered with an app scope
//! - `{{- ... -}}` trimming and `{{/* comments */}}`

mod eval;
mod lexer;
mod parser;
mod scope;

pub use scope::APP_ROOT;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use parser::Node;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed action starting at byte {0}")]
    UnclosedAction(usize),

    #[error("unclosed comment starting at byte {0}")]
    UnclosedComment(usize),

    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),

    #[error("unexpected {found} at byte {pos}")]
    Unexpected { found: String, pos: usize },

    #[error("missing value for command at byte {0}")]
    EmptyCommand(usize),

    #[error("function \"{0}\" not defined")]
    UnknownFunction(String),

    #[error("can't give argument to non-function {0}")]
    NotAFunction(String),

    #[error("wrong arguments for {name}: {message}")]
    WrongArgs { name: &'static str, message: String },

    #[error("can't evaluate field {0}")]
    MissingField(String),

    #[error("can't evaluate field {field} in {kind}")]
    NotARecord { field: String, kind: &'static str },

    #[error("can't index {target} with {index}")]
    BadIndex { target: &'static str, index: String },

    #[error("index out of range: {0}")]
    OutOfRange(i64),
}

pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(src: &str) -> TemplateResult<Self> {
        let nodes = parser::parse_segments(lexer::split(src)?)?;
        Ok(Self { nodes })
    }

    /// Render against `root`, failing on the first unresolved reference.
    pub fn render(&self, root: &Value) -> TemplateResult<String> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(pipeline) => {
                    out.push_str(&eval::render(&eval::eval_pipeline(pipeline, root)?));
                }
            }
        }
        Ok(out)
    }

    /// Render against `root`; unresolved references render as empty.
    pub fn render_lenient(&self, root: &Value) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(pipeline) => match eval::eval_pipeline(pipeline, root) {
                    Ok(value) => out.push_str(&eval::render(&value)),
                    Err(e) => debug!(error = %e, "Unresolved template reference"),
                },
            }
        }
        out
    }
}

/// Expand `template` against `root`, addressing `.App` through `app_scope` when non-empty.
///
/// Unresolved references render as empty; a template that does not parse
/// renders as an empty string.
pub fn expand(template: &str, root: &Value, app_scope: &str) -> String {
    let parsed = Template::parse(template).and_then(|t| {
        if app_scope.is_empty() {
            Ok(t)
        } else {
            t.scoped(app_scope)
        }
    });
    match parsed {
        Ok(t) => t.render_lenient(root),
        Err(e) => {
            debug!(error = %e, template, "Malformed template");
            String::new()
        }
    }
}

/// Like [`expand`], but reports malformed templates and unresolved references.
pub fn try_expand(template: &str, root: &Value, app_scope: &str) -> TemplateResult<String> {
    let mut parsed = Template::parse(template)?;
    if !app_scope.is_empty() {
        parsed = parsed.scoped(app_scope)?;
    }
    parsed.render(root)
}
