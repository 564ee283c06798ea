//! Splits template source into text and action segments and tokenizes actions.

use super::{TemplateError, TemplateResult};

/// A token inside an action (or a bare expression).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// `.` on its own.
    Dot,
    /// `.A.B` rooted at dot.
    Field(Vec<String>),
    /// `.A.B` glued to a closing parenthesis, e.g. the `.Name` in `(x).Name`.
    Chain(Vec<String>),
    Ident(String),
    Int(i64),
    Str(String),
    Bool(bool),
    Nil,
    LParen,
    RParen,
    Pipe,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Text(String),
    Action { tokens: Vec<Spanned>, pos: usize },
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Split a template into literal text and tokenized actions.
///
/// Handles `{{- ` / ` -}}` whitespace trimming and `{{/* comments */}}`.
pub(crate) fn split(src: &str) -> TemplateResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut trim_next = false;

    while let Some(offset) = src[pos..].find(OPEN) {
        let open = pos + offset;
        let mut text = &src[pos..open];
        if trim_next {
            text = text.trim_start();
        }

        let mut inner = open + OPEN.len();
        if is_trim_marker(&src[inner..]) {
            text = text.trim_end();
            inner += 1;
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text.to_string()));
        }

        let after_ws = inner + (src[inner..].len() - src[inner..].trim_start().len());
        if src[after_ws..].starts_with("/*") {
            let (end, right_trim) = skip_comment(src, open, after_ws)?;
            pos = end;
            trim_next = right_trim;
            continue;
        }

        let mut lexer = Lexer::new(src, inner);
        let (tokens, end, right_trim) = lexer.lex_action(open)?;
        segments.push(Segment::Action { tokens, pos: open });
        pos = end;
        trim_next = right_trim;
    }

    let mut text = &src[pos..];
    if trim_next {
        text = text.trim_start();
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
    Ok(segments)
}

/// Tokenize a bare expression with no surrounding delimiters.
pub(crate) fn lex_expression(src: &str) -> TemplateResult<Vec<Spanned>> {
    Lexer::new(src, 0).lex_expression()
}

/// `-` followed by whitespace right after `{{`.
fn is_trim_marker(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

fn skip_comment(src: &str, open: usize, start: usize) -> TemplateResult<(usize, bool)> {
    let body_end = src[start + 2..]
        .find("*/")
        .map(|i| start + 2 + i + 2)
        .ok_or(TemplateError::UnclosedComment(open))?;
    let rest = &src[body_end..];
    let trimmed = rest.trim_start();
    let ws = rest.len() - trimmed.len();
    if ws > 0 && trimmed.starts_with("-}}") {
        Ok((body_end + ws + 3, true))
    } else if trimmed.starts_with(CLOSE) {
        Ok((body_end + ws + CLOSE.len(), false))
    } else {
        Err(TemplateError::UnclosedComment(open))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Spanned>,
    spaced: bool,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self {
            src,
            pos,
            tokens: Vec::new(),
            spaced: true,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Lex up to and including the closing `}}`. Returns the tokens, the byte
    /// offset after the delimiter, and whether trailing whitespace is trimmed.
    fn lex_action(&mut self, open: usize) -> TemplateResult<(Vec<Spanned>, usize, bool)> {
        loop {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                return Err(TemplateError::UnclosedAction(open));
            };

            if c.is_whitespace() {
                let trimmed = rest.trim_start();
                if trimmed.starts_with("-}}") {
                    let end = self.pos + (rest.len() - trimmed.len()) + 3;
                    return Ok((std::mem::take(&mut self.tokens), end, true));
                }
                self.pos += c.len_utf8();
                self.spaced = true;
                continue;
            }
            if rest.starts_with(CLOSE) {
                return Ok((std::mem::take(&mut self.tokens), self.pos + CLOSE.len(), false));
            }
            self.lex_token(c)?;
        }
    }

    fn lex_expression(&mut self) -> TemplateResult<Vec<Spanned>> {
        while let Some(c) = self.rest().chars().next() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
                self.spaced = true;
                continue;
            }
            if self.rest().starts_with(CLOSE) {
                return Err(TemplateError::Unexpected {
                    found: CLOSE.to_string(),
                    pos: self.pos,
                });
            }
            self.lex_token(c)?;
        }
        Ok(std::mem::take(&mut self.tokens))
    }

    fn lex_token(&mut self, c: char) -> TemplateResult<()> {
        let start = self.pos;
        let token = match c {
            '(' => {
                self.pos += 1;
                Token::LParen
            }
            ')' => {
                self.pos += 1;
                Token::RParen
            }
            '|' => {
                self.pos += 1;
                Token::Pipe
            }
            '.' => {
                let fields = self.read_fields();
                if fields.is_empty() {
                    self.pos += 1;
                    Token::Dot
                } else if !self.spaced
                    && matches!(self.tokens.last(), Some(Spanned { token: Token::RParen, .. }))
                {
                    Token::Chain(fields)
                } else {
                    Token::Field(fields)
                }
            }
            '"' => Token::Str(self.read_quoted()?),
            '`' => Token::Str(self.read_raw()?),
            '-' | '0'..='9' => Token::Int(self.read_int()?),
            c if is_ident_start(c) => {
                let ident = self.read_ident();
                match ident.as_str() {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    "nil" => Token::Nil,
                    _ => Token::Ident(ident),
                }
            }
            other => {
                return Err(TemplateError::Unexpected {
                    found: other.to_string(),
                    pos: start,
                });
            }
        };
        self.tokens.push(Spanned { token, pos: start });
        self.spaced = false;
        Ok(())
    }

    fn read_ident(&mut self) -> String {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len].to_string()
    }

    fn read_fields(&mut self) -> Vec<String> {
        let mut fields = Vec::new();
        loop {
            let rest = self.rest();
            let mut chars = rest.chars();
            if chars.next() != Some('.') || !chars.next().is_some_and(is_ident_start) {
                break;
            }
            self.pos += 1;
            fields.push(self.read_ident());
        }
        fields
    }

    fn read_int(&mut self) -> TemplateResult<i64> {
        let start = self.pos;
        let rest = self.rest();
        let sign = usize::from(rest.starts_with('-'));
        let digits = rest[sign..]
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len() - sign);
        if digits == 0 {
            return Err(TemplateError::Unexpected {
                found: "-".to_string(),
                pos: start,
            });
        }
        let literal = &rest[..sign + digits];
        self.pos += literal.len();
        literal.parse().map_err(|_| TemplateError::Unexpected {
            found: literal.to_string(),
            pos: start,
        })
    }

    fn read_quoted(&mut self) -> TemplateResult<String> {
        let start = self.pos;
        let mut out = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                c => out.push(c),
            }
        }
        Err(TemplateError::UnterminatedString(start))
    }

    fn read_raw(&mut self) -> TemplateResult<String> {
        let start = self.pos;
        let rest = &self.rest()[1..];
        let end = rest
            .find('`')
            .ok_or(TemplateError::UnterminatedString(start))?;
        self.pos += end + 2;
        Ok(rest[..end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        lex_expression(src)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_split_text_and_actions() {
        let segments = split("-v {{.App.Dest}}:/home/app -d").unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Text("-v ".into()));
        assert!(matches!(segments[1], Segment::Action { pos: 3, .. }));
        assert_eq!(segments[2], Segment::Text(":/home/app -d".into()));
    }

    #[test]
    fn test_field_chains_and_index() {
        assert_eq!(
            tokens("index .App.Ports 0"),
            vec![
                Token::Ident("index".into()),
                Token::Field(vec!["App".into(), "Ports".into()]),
                Token::Int(0),
            ]
        );
    }

    #[test]
    fn test_chain_after_paren() {
        assert_eq!(
            tokens("(index .Apps 0).Name"),
            vec![
                Token::LParen,
                Token::Ident("index".into()),
                Token::Field(vec!["Apps".into()]),
                Token::Int(0),
                Token::RParen,
                Token::Chain(vec!["Name".into()]),
            ]
        );
        // A space breaks the chain into a separate argument.
        assert_eq!(
            tokens("(x) .Name")[3],
            Token::Field(vec!["Name".into()])
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            tokens(r#"printf "%s\n" `raw` -3 true nil ."#),
            vec![
                Token::Ident("printf".into()),
                Token::Str("%s\n".into()),
                Token::Str("raw".into()),
                Token::Int(-3),
                Token::Bool(true),
                Token::Nil,
                Token::Dot,
            ]
        );
    }

    #[test]
    fn test_trim_markers() {
        let segments = split("a  {{- .X -}}  b").unwrap();
        assert_eq!(segments[0], Segment::Text("a".into()));
        assert_eq!(segments[2], Segment::Text("b".into()));
    }

    #[test]
    fn test_negative_number_is_not_trim_marker() {
        let segments = split("{{-1}}").unwrap();
        match &segments[0] {
            Segment::Action { tokens, .. } => assert_eq!(tokens[0].token, Token::Int(-1)),
            other => panic!("unexpected segment {other:?}"),
        }
    }

    #[test]
    fn test_comments_are_dropped() {
        let segments = split("a{{/* note */}}b").unwrap();
        assert_eq!(
            segments,
            vec![Segment::Text("a".into()), Segment::Text("b".into())]
        );
    }

    #[test]
    fn test_stray_close_is_text() {
        let segments = split("@ANSIBLE .hostname }} -d").unwrap();
        assert_eq!(
            segments,
            vec![Segment::Text("@ANSIBLE .hostname }} -d".into())]
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(split("abc {{ .X"), Err(TemplateError::UnclosedAction(4)));
        assert_eq!(
            split(r#"{{ "open }}"#),
            Err(TemplateError::UnterminatedString(3))
        );
        assert_eq!(split("{{/* x }}"), Err(TemplateError::UnclosedComment(0)));
        assert!(matches!(
            split("{{ # }}"),
            Err(TemplateError::Unexpected { pos: 3, .. })
        ));
    }
}
