//! App-scope rewriting.
//!
//! A playbook's app entry (e.g. `{{index .Apps 2}}`) names one app. Templates
//! rendered for that entry address it as `.App`; before evaluation every
//! `.App`-rooted path is redirected through the selector, so `.App.Dest`
//! becomes `(index .Apps 2).Dest`. Because the rewrite works on operands
//! rather than text, `index .App.Ports 0` becomes `index (index .Apps 2).Ports 0`
//! with the grouping intact.

use super::lexer::lex_expression;
use super::parser::{parse_expression, Expr, Node, Pipeline};
use super::{Template, TemplateResult};

/// Reserved root naming the currently selected app.
pub const APP_ROOT: &str = "App";

/// Turn a selector written as a template into a single operand.
///
/// The selector's own delimiters become parentheses: `{{index .Apps 0}}`
/// parses as `(index .Apps 0)`.
pub(crate) fn parse_selector(selector: &str) -> TemplateResult<Expr> {
    let grouped = selector
        .replace("{{- ", "(")
        .replace(" -}}", ")")
        .replace("{{", "(")
        .replace("}}", ")");
    let mut pipeline = parse_expression(lex_expression(&grouped)?)?;

    if pipeline.commands.len() == 1 && pipeline.commands[0].args.len() == 1 {
        if let Some(expr) = pipeline.commands[0].args.pop() {
            return Ok(expr);
        }
    }
    Ok(Expr::Paren(pipeline))
}

impl Template {
    /// Redirect every `.App` reference in this template through `selector`.
    pub fn scoped(mut self, selector: &str) -> TemplateResult<Self> {
        let scope = parse_selector(selector)?;
        for node in &mut self.nodes {
            if let Node::Action(pipeline) = node {
                redirect_pipeline(pipeline, &scope);
            }
        }
        Ok(self)
    }
}

fn redirect_pipeline(pipeline: &mut Pipeline, scope: &Expr) {
    for command in &mut pipeline.commands {
        for arg in &mut command.args {
            redirect(arg, scope);
        }
    }
}

fn redirect(expr: &mut Expr, scope: &Expr) {
    match expr {
        Expr::Field(path) if path.first().is_some_and(|root| root == APP_ROOT) => {
            let rest = path.split_off(1);
            *expr = if rest.is_empty() {
                scope.clone()
            } else {
                Expr::Chain(Box::new(scope.clone()), rest)
            };
        }
        Expr::Chain(base, _) => redirect(base, scope),
        Expr::Paren(pipeline) => redirect_pipeline(pipeline, scope),
        _ => {}
    }
}
