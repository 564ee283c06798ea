//! Builds the template AST from lexed segments.

use super::lexer::{Segment, Spanned, Token};
use super::{TemplateError, TemplateResult};

/// Functions callable from templates.
pub(crate) const BUILTINS: &[&str] = &["index", "len", "print", "printf"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Action(Pipeline),
}

/// `cmd | cmd | ...`; each command's value is appended to the next command's arguments.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pipeline {
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Command {
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Dot,
    /// Field path rooted at dot, e.g. `.App.Ports`.
    Field(Vec<String>),
    /// Field path applied to another operand, e.g. `(index .Apps 0).Name`.
    Chain(Box<Expr>, Vec<String>),
    Paren(Pipeline),
    Func(String),
    Int(i64),
    Str(String),
    Bool(bool),
    Nil,
}

pub(crate) fn parse_segments(segments: Vec<Segment>) -> TemplateResult<Vec<Node>> {
    segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => Ok(Node::Text(text)),
            Segment::Action { tokens, pos } => {
                let mut parser = Parser::new(tokens, pos);
                let pipeline = parser.pipeline()?;
                parser.finish()?;
                Ok(Node::Action(pipeline))
            }
        })
        .collect()
}

/// Parse a bare token stream into a single pipeline.
pub(crate) fn parse_expression(tokens: Vec<Spanned>) -> TemplateResult<Pipeline> {
    let mut parser = Parser::new(tokens, 0);
    let pipeline = parser.pipeline()?;
    parser.finish()?;
    Ok(pipeline)
}

fn describe(token: &Token) -> String {
    match token {
        Token::Dot => "\".\"".to_string(),
        Token::Field(path) | Token::Chain(path) => format!("field .{}", path.join(".")),
        Token::Ident(name) => format!("identifier {name}"),
        Token::Int(n) => format!("number {n}"),
        Token::Str(s) => format!("string {s:?}"),
        Token::Bool(b) => format!("bool {b}"),
        Token::Nil => "nil".to_string(),
        Token::LParen => "\"(\"".to_string(),
        Token::RParen => "\")\"".to_string(),
        Token::Pipe => "\"|\"".to_string(),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    idx: usize,
    start: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>, start: usize) -> Self {
        Self {
            tokens,
            idx: 0,
            start,
        }
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.idx)
    }

    fn pos(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|s| s.pos)
            .unwrap_or(self.start)
    }

    fn next(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.idx).cloned();
        self.idx += 1;
        token
    }

    fn finish(&self) -> TemplateResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(spanned) => Err(TemplateError::Unexpected {
                found: describe(&spanned.token),
                pos: spanned.pos,
            }),
        }
    }

    fn pipeline(&mut self) -> TemplateResult<Pipeline> {
        let mut commands = vec![self.command()?];
        while matches!(self.peek(), Some(Spanned { token: Token::Pipe, .. })) {
            self.idx += 1;
            commands.push(self.command()?);
        }
        Ok(Pipeline { commands })
    }

    fn command(&mut self) -> TemplateResult<Command> {
        let mut args = Vec::new();
        while let Some(spanned) = self.peek() {
            if matches!(spanned.token, Token::Pipe | Token::RParen) {
                break;
            }
            args.push(self.operand()?);
        }
        if args.is_empty() {
            return Err(TemplateError::EmptyCommand(self.pos()));
        }
        Ok(Command { args })
    }

    fn operand(&mut self) -> TemplateResult<Expr> {
        let pos = self.pos();
        let Some(Spanned { token, pos }) = self.next() else {
            return Err(TemplateError::EmptyCommand(pos));
        };

        let term = match token {
            Token::Dot => Expr::Dot,
            Token::Field(path) => Expr::Field(path),
            Token::Ident(name) if BUILTINS.contains(&name.as_str()) => Expr::Func(name),
            Token::Ident(name) => return Err(TemplateError::UnknownFunction(name)),
            Token::Int(n) => Expr::Int(n),
            Token::Str(s) => Expr::Str(s),
            Token::Bool(b) => Expr::Bool(b),
            Token::Nil => Expr::Nil,
            Token::LParen => {
                let inner = self.pipeline()?;
                match self.next() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Expr::Paren(inner),
                    Some(other) => {
                        return Err(TemplateError::Unexpected {
                            found: describe(&other.token),
                            pos: other.pos,
                        });
                    }
                    None => {
                        return Err(TemplateError::Unexpected {
                            found: "end of action".to_string(),
                            pos,
                        });
                    }
                }
            }
            other => {
                return Err(TemplateError::Unexpected {
                    found: describe(&other),
                    pos,
                });
            }
        };

        if let Some(Spanned {
            token: Token::Chain(path),
            ..
        }) = self.peek()
        {
            let path = path.clone();
            self.idx += 1;
            return Ok(Expr::Chain(Box::new(term), path));
        }
        Ok(term)
    }
}
