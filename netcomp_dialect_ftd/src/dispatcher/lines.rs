//! Logical lines, indentation tree, and the per-line token cursor.

use std::net::Ipv4Addr;

use netcomp_ir::{Span, Warnings};

use crate::keywords::Keyword;
use crate::scanner::{Scanner, Token, TokenKind};
use crate::validate;

/// One non-blank, non-comment line of tokens.
#[derive(Debug, Clone)]
pub(crate) struct Line<'a> {
    pub tokens: Vec<Token<'a>>,
    pub indent: usize,
    pub span: Span,
    pub text: &'a str,
}

/// Line plus the indices of the more-indented lines nested under it.
#[derive(Debug, Clone)]
pub(crate) struct LineNode<'a> {
    pub line: Line<'a>,
    pub children: Vec<usize>,
}

/// Arena of lines arranged by indentation.
#[derive(Debug, Clone, Default)]
pub(crate) struct LineTree<'a> {
    pub nodes: Vec<LineNode<'a>>,
    pub roots: Vec<usize>,
}

impl<'a> LineTree<'a> {
    /// Group tokens into lines and nest them by indentation.
    ///
    /// Comment lines are dropped; anomalous tokens and orphan indentation are
    /// reported to `warnings`.
    pub fn build(input: &'a str, scanner: Scanner<'a>, warnings: &mut Warnings) -> Self {
        let mut tree = LineTree::default();
        let mut parent_stack: Vec<(usize, usize)> = Vec::new();
        let mut current: Vec<Token<'a>> = Vec::new();

        for token in scanner.chain(std::iter::once_with(|| end_marker(input.len()))) {
            if token.kind != TokenKind::Newline {
                if token.anomalous {
                    warnings.lexical(
                        "unrecognized-characters",
                        format!("unrecognized characters in '{}'", token.text.escape_default()),
                        Some(token.span),
                    );
                }
                if token.kind != TokenKind::Comment {
                    current.push(token);
                }
                continue;
            }
            let Some(line) = finish_line(input, std::mem::take(&mut current)) else {
                continue;
            };

            while let Some((indent, _)) = parent_stack.last().copied() {
                if line.indent <= indent {
                    parent_stack.pop();
                } else {
                    break;
                }
            }
            if line.indent > 0 && parent_stack.is_empty() {
                warnings.syntax(
                    "orphan-indentation",
                    "indented line without an enclosing stanza; line ignored",
                    Some(line.span),
                );
                continue;
            }

            let indent = line.indent;
            let id = tree.nodes.len();
            tree.nodes.push(LineNode {
                line,
                children: Vec::new(),
            });
            match parent_stack.last() {
                Some((_, parent)) => tree.nodes[*parent].children.push(id),
                None => tree.roots.push(id),
            }
            parent_stack.push((indent, id));
        }
        tree
    }

    pub fn node(&self, id: usize) -> &LineNode<'a> {
        &self.nodes[id]
    }

    /// Child nodes of `id`, in file order.
    pub fn children(&self, id: usize) -> impl Iterator<Item = (usize, &LineNode<'a>)> {
        self.nodes[id]
            .children
            .iter()
            .map(move |child| (*child, &self.nodes[*child]))
    }
}

fn end_marker<'a>(len: usize) -> Token<'a> {
    Token {
        kind: TokenKind::Newline,
        text: "",
        span: Span {
            line: 0,
            column: 0,
            start_byte: len,
            end_byte: len,
        },
        anomalous: false,
    }
}

fn finish_line<'a>(input: &'a str, tokens: Vec<Token<'a>>) -> Option<Line<'a>> {
    let first = tokens.first()?;
    let last = tokens.last()?;
    let span = first.span.to(last.span);
    Some(Line {
        indent: first.span.column,
        text: &input[span.start_byte..span.end_byte],
        span,
        tokens,
    })
}

/// Line-scoped parse failure; the line's effects are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub message: String,
    pub span: Span,
}

pub(crate) type LineResult<T> = Result<T, SyntaxError>;

/// Whether `token` spells `keyword`, even where the scanner classified it as a name.
pub(crate) fn is_keyword(token: &Token<'_>, keyword: Keyword) -> bool {
    match token.kind {
        TokenKind::Keyword(kw) => kw == keyword,
        TokenKind::Word => token.text.eq_ignore_ascii_case(keyword.as_str()),
        _ => false,
    }
}

/// Forward-only reader over one line's tokens.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'t, 'a> {
    line: &'t Line<'a>,
    pos: usize,
}

impl<'t, 'a> Cursor<'t, 'a> {
    pub fn new(line: &'t Line<'a>) -> Self {
        Self { line, pos: 0 }
    }

    pub fn line(&self) -> &'t Line<'a> {
        self.line
    }

    pub fn peek(&self) -> Option<&'t Token<'a>> {
        self.line.tokens.get(self.pos)
    }

    pub fn peek_nth(&self, offset: usize) -> Option<&'t Token<'a>> {
        self.line.tokens.get(self.pos + offset)
    }

    pub fn bump(&mut self) -> Option<&'t Token<'a>> {
        let token = self.line.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.line.tokens.len()
    }

    pub fn at(&self, keyword: Keyword) -> bool {
        self.peek().is_some_and(|t| is_keyword(t, keyword))
    }

    /// Case-insensitive match on the next token's text.
    pub fn at_text(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text.eq_ignore_ascii_case(text))
    }

    pub fn eat(&mut self, keyword: Keyword) -> bool {
        if self.at(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn eat_text(&mut self, text: &str) -> bool {
        if self.at_text(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, keyword: Keyword) -> LineResult<()> {
        if self.eat(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", keyword.as_str())))
        }
    }

    /// Span of the next token, or of the end of the line.
    pub fn here(&self) -> Span {
        match self.peek() {
            Some(token) => token.span,
            None => Span {
                line: self.line.span.line,
                column: self.line.span.column + self.line.text.len(),
                start_byte: self.line.span.end_byte,
                end_byte: self.line.span.end_byte,
            },
        }
    }

    pub fn error(&self, message: impl Into<String>) -> SyntaxError {
        let message = message.into();
        let message = match self.peek() {
            Some(token) => format!("{message}, found '{}'", token.text),
            None => format!("{message} at end of line"),
        };
        SyntaxError {
            message,
            span: self.here(),
        }
    }

    /// Any name-like token: word, keyword, number or address.
    pub fn name(&mut self, what: &str) -> LineResult<&'a str> {
        match self.peek() {
            Some(token)
                if matches!(
                    token.kind,
                    TokenKind::Word
                        | TokenKind::Keyword(_)
                        | TokenKind::Dec
                        | TokenKind::Ipv4Address
                        | TokenKind::Ipv4Prefix
                        | TokenKind::Ipv6Address
                        | TokenKind::Ipv6Prefix
                ) =>
            {
                self.pos += 1;
                Ok(token.text)
            }
            Some(token) if token.kind == TokenKind::QuotedString => {
                self.pos += 1;
                Ok(token.text.trim_matches('"'))
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    pub fn ipv4(&mut self, what: &str) -> LineResult<Ipv4Addr> {
        let parsed = self
            .peek()
            .filter(|t| t.kind == TokenKind::Ipv4Address)
            .and_then(|t| t.text.parse::<Ipv4Addr>().ok());
        match parsed {
            Some(ip) => {
                self.pos += 1;
                Ok(ip)
            }
            None => Err(self.error(format!("expected {what}"))),
        }
    }

    /// Dotted mask that must be contiguous.
    pub fn netmask(&mut self, what: &str) -> LineResult<Ipv4Addr> {
        let span = self.here();
        let mask = self.ipv4(what)?;
        validate::netmask(mask).map_err(|message| SyntaxError { message, span })?;
        Ok(mask)
    }

    pub fn at_ipv4(&self) -> bool {
        self.peek().is_some_and(|t| t.kind == TokenKind::Ipv4Address)
    }

    pub fn at_dec(&self) -> bool {
        self.peek().is_some_and(|t| t.kind == TokenKind::Dec)
    }

    /// Next token as a decimal, checked by `check`.
    pub fn dec<T>(&mut self, what: &str, check: impl Fn(&str) -> Result<T, String>) -> LineResult<T> {
        let Some(token) = self.peek().filter(|t| t.kind == TokenKind::Dec) else {
            return Err(self.error(format!("expected {what}")));
        };
        let value = check(token.text).map_err(|message| SyntaxError {
            message,
            span: token.span,
        })?;
        self.pos += 1;
        Ok(value)
    }

    /// Next name-like token, checked by `check`.
    pub fn value<T>(&mut self, what: &str, check: impl Fn(&str) -> Result<T, String>) -> LineResult<T> {
        let span = self.here();
        let text = self.name(what)?;
        check(text).map_err(|message| SyntaxError { message, span })
    }

    /// Free text following `remark`/`description`; empty when absent.
    pub fn text(&mut self) -> &'a str {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Text => {
                self.pos += 1;
                token.text
            }
            _ => "",
        }
    }

    /// Raw source text from the next token to the end of the line.
    pub fn rest(&self) -> &'a str {
        match self.peek() {
            Some(token) => {
                let offset = token.span.start_byte - self.line.span.start_byte;
                &self.line.text[offset..]
            }
            None => "",
        }
    }

    /// Consume and return the remaining token texts.
    pub fn remaining(&mut self) -> Vec<&'a str> {
        let texts = self.line.tokens[self.pos..].iter().map(|t| t.text).collect();
        self.pos = self.line.tokens.len();
        texts
    }

    pub fn finish(&self) -> LineResult<()> {
        if self.is_done() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }
}
