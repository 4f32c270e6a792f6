//! Stateful scanner turning configuration text into borrowed tokens.
//!
//! Classification depends on [`ScannerState`], which is reset at every line
//! terminator:
//! - `!` and `:` start a comment only as the first token of a line
//! - after `version` no numeric literal is recognized on the same line
//! - after `remark`/`description` the rest of the line is one `Text` token
//! - in name positions (after `access-list`, `nameif`, …) words skip the
//!   keyword table and are always `Word`
//!
//! The scanner never fails. Anything it cannot classify becomes a `Word`;
//! words containing control characters are flagged `anomalous`.

use std::net::{Ipv4Addr, Ipv6Addr};

use netcomp_ir::Span;
use serde::{Deserialize, Serialize};

use crate::keywords::{self, Keyword};
use crate::validate;

/// Token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Newline,
    Comment,
    Keyword(Keyword),
    Word,
    Dec,
    Ipv4Address,
    Ipv4Prefix,
    Ipv6Address,
    Ipv6Prefix,
    QuotedString,
    Text,
    LParen,
    RParen,
    Comma,
}

/// One token borrowing its lexeme from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
    pub anomalous: bool,
}

impl Token<'_> {
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }
}

/// Per-line scanner state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerState {
    pub decimal_enabled: bool,
    pub ipv4_enabled: bool,
    pub ipv6_enabled: bool,
    pub last_significant_token: Option<TokenKind>,
    line_head: Option<Keyword>,
    tokens_on_line: usize,
    rest_is_text: bool,
}

impl ScannerState {
    fn line_start() -> Self {
        Self {
            decimal_enabled: true,
            ipv4_enabled: true,
            ipv6_enabled: true,
            last_significant_token: None,
            line_head: None,
            tokens_on_line: 0,
            rest_is_text: false,
        }
    }

    /// True before the first token of a logical line has been emitted.
    pub fn at_line_start(&self) -> bool {
        self.tokens_on_line == 0
    }

    fn expects_name(&self) -> bool {
        let Some(TokenKind::Keyword(last)) = self.last_significant_token else {
            return false;
        };
        if last.introduces_name() {
            return true;
        }
        let head = self.line_head;
        match last {
            Keyword::Object | Keyword::ObjectGroup => self.tokens_on_line > 1,
            Keyword::Network | Keyword::Service => {
                matches!(head, Some(Keyword::Object | Keyword::ObjectGroup)) && self.tokens_on_line == 2
            }
            Keyword::Map => head == Some(Keyword::Crypto),
            _ => false,
        }
    }

    fn record(&mut self, kind: TokenKind) {
        if self.tokens_on_line == 0 {
            self.line_head = match kind {
                TokenKind::Keyword(kw) => Some(kw),
                _ => None,
            };
        }
        self.tokens_on_line += 1;
        self.last_significant_token = Some(kind);
        match kind {
            TokenKind::Keyword(Keyword::Version) => {
                self.decimal_enabled = false;
                self.ipv4_enabled = false;
                self.ipv6_enabled = false;
            }
            TokenKind::Keyword(Keyword::Remark | Keyword::Description) => {
                self.rest_is_text = true;
            }
            _ => {}
        }
    }
}

/// Lazy token iterator over one input text.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    line_start_byte: usize,
    state: ScannerState,
}

/// Scan `input` from the beginning.
pub fn scan(input: &str) -> Scanner<'_> {
    Scanner::new(input)
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            line_start_byte: 0,
            state: ScannerState::line_start(),
        }
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span {
            line: self.line,
            column: start - self.line_start_byte,
            start_byte: start,
            end_byte: end,
        }
    }

    fn skip_blanks(&mut self) {
        let rest = &self.input[self.pos..];
        let skipped = rest
            .char_indices()
            .find(|(_, ch)| *ch == '\n' || !ch.is_whitespace())
            .map_or(rest.len(), |(idx, _)| idx);
        self.pos += skipped;
    }

    /// End of the current line, excluding the terminator.
    fn line_end(&self) -> usize {
        self.input[self.pos..]
            .find('\n')
            .map_or(self.input.len(), |idx| self.pos + idx)
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize, anomalous: bool) -> Token<'a> {
        self.pos = end;
        if kind == TokenKind::Newline {
            self.line += 1;
            self.line_start_byte = end;
            self.state = ScannerState::line_start();
        } else {
            self.state.record(kind);
        }
        Token {
            kind,
            text: &self.input[start..end],
            span: self.span_for(kind, start, end),
            anomalous,
        }
    }

    fn span_for(&self, kind: TokenKind, start: usize, end: usize) -> Span {
        if kind == TokenKind::Newline {
            // Already advanced: report the terminator on the line it ends.
            Span {
                line: self.line - 1,
                column: 0,
                start_byte: start,
                end_byte: end,
            }
        } else {
            self.span(start, end)
        }
    }

    fn scan_rest_of_line(&mut self, kind: TokenKind) -> Token<'a> {
        let start = self.pos;
        let end = start + self.input[start..self.line_end()].trim_end().len();
        self.emit(kind, start, end, false)
    }

    fn scan_quoted(&mut self) -> Token<'a> {
        let start = self.pos;
        let line_end = self.line_end();
        let mut escape = false;
        let mut end = line_end;
        for (idx, ch) in self.input[start + 1..line_end].char_indices() {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                end = start + 1 + idx + 1;
                break;
            }
        }
        self.emit(TokenKind::QuotedString, start, end, false)
    }

    fn scan_word(&mut self) -> Token<'a> {
        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest
            .char_indices()
            .find(|(_, ch)| ch.is_whitespace() || matches!(ch, '(' | ')' | ',' | '"'))
            .map_or(rest.len(), |(idx, _)| idx);
        let text = &rest[..len];
        let anomalous = text.chars().any(char::is_control);
        let kind = if anomalous {
            TokenKind::Word
        } else {
            classify_word(text, &self.state)
        };
        self.emit(kind, start, start + len, anomalous)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.skip_blanks();
        let start = self.pos;
        let ch = self.input[start..].chars().next()?;

        if ch == '\n' {
            return Some(self.emit(TokenKind::Newline, start, start + 1, false));
        }
        if self.state.rest_is_text {
            self.state.rest_is_text = false;
            return Some(self.scan_rest_of_line(TokenKind::Text));
        }
        if self.state.at_line_start() && matches!(ch, '!' | ':') {
            return Some(self.scan_rest_of_line(TokenKind::Comment));
        }
        let token = match ch {
            '(' => self.emit(TokenKind::LParen, start, start + 1, false),
            ')' => self.emit(TokenKind::RParen, start, start + 1, false),
            ',' => self.emit(TokenKind::Comma, start, start + 1, false),
            '"' => self.scan_quoted(),
            _ => self.scan_word(),
        };
        Some(token)
    }
}

fn classify_word(text: &str, state: &ScannerState) -> TokenKind {
    let starts_with_digit = text.as_bytes().first().is_some_and(u8::is_ascii_digit);

    if starts_with_digit {
        if state.ipv4_enabled
            && let Some(kind) = classify_ipv4(text)
        {
            return kind;
        }
        if state.ipv6_enabled
            && let Some(kind) = classify_ipv6(text)
        {
            return kind;
        }
        if state.decimal_enabled && text.bytes().all(|b| b.is_ascii_digit()) {
            return TokenKind::Dec;
        }
        return TokenKind::Word;
    }

    if state.ipv6_enabled
        && text.contains("::")
        && let Some(kind) = classify_ipv6(text)
    {
        return kind;
    }
    if state.expects_name() {
        return TokenKind::Word;
    }
    keywords::lookup(text).map_or(TokenKind::Word, TokenKind::Keyword)
}

fn classify_ipv4(text: &str) -> Option<TokenKind> {
    match text.split_once('/') {
        None => text.parse::<Ipv4Addr>().ok().map(|_| TokenKind::Ipv4Address),
        Some((addr, len)) => {
            validate::prefix_length(len).ok()?;
            addr.parse::<Ipv4Addr>().is_ok().then_some(TokenKind::Ipv4Prefix)
        }
    }
}

fn classify_ipv6(text: &str) -> Option<TokenKind> {
    if text.bytes().filter(|b| *b == b':').count() < 2 {
        return None;
    }
    match text.split_once('/') {
        None => text.parse::<Ipv6Addr>().ok().map(|_| TokenKind::Ipv6Address),
        Some((addr, len)) => {
            let len = len.parse::<u8>().ok()?;
            (addr.parse::<Ipv6Addr>().is_ok() && len <= 128).then_some(TokenKind::Ipv6Prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        scan(input).map(|t| t.kind).collect()
    }

    fn words(input: &str) -> Vec<(TokenKind, &str)> {
        scan(input)
            .filter(|t| t.kind != TokenKind::Newline)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn interface_names_are_single_words() {
        assert_eq!(
            words("interface Loopback0\n"),
            vec![
                (TokenKind::Keyword(Keyword::Interface), "interface"),
                (TokenKind::Word, "Loopback0"),
            ]
        );
        assert_eq!(
            words("interface Port-channel1.320")[1],
            (TokenKind::Word, "Port-channel1.320")
        );
    }

    #[test]
    fn keyword_in_name_position_is_a_word() {
        let toks = words("access-list inside extended permit ip any any\n");
        assert_eq!(toks[1], (TokenKind::Word, "inside"));
        assert_eq!(toks[2].0, TokenKind::Keyword(Keyword::Extended));

        let toks = words("object network host\n");
        assert_eq!(toks[2], (TokenKind::Word, "host"));
        let toks = words(" nameif outside\n");
        assert_eq!(toks[1], (TokenKind::Word, "outside"));
    }

    #[test]
    fn comments_only_at_line_start() {
        assert_eq!(
            kinds("! banner\n: Saved\nhostname fw!1\n"),
            vec![
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Keyword(Keyword::Hostname),
                TokenKind::Word,
                TokenKind::Newline,
            ]
        );
        let toks = words("  !indented comment\n");
        assert_eq!(toks, vec![(TokenKind::Comment, "!indented comment")]);
    }

    #[test]
    fn literals_are_classified() {
        let toks = words("route outside 10.0.0.0 255.0.0.0 192.168.1.1 5\n");
        assert_eq!(toks[2].0, TokenKind::Ipv4Address);
        assert_eq!(toks[3].0, TokenKind::Ipv4Address);
        assert_eq!(toks[5].0, TokenKind::Dec);
        assert_eq!(words("x 10.0.0.0/8")[1].0, TokenKind::Ipv4Prefix);
        assert_eq!(words("x 2001:db8::1")[1].0, TokenKind::Ipv6Address);
        assert_eq!(words("x fe80::1/64")[1].0, TokenKind::Ipv6Prefix);
        assert_eq!(words("x 300.1.1.1")[1].0, TokenKind::Word);
    }

    #[test]
    fn version_disables_numeric_literals_until_newline() {
        let toks = words("NGFW Version 7.4.2.1\nroute a 1.2.3.4 255.255.255.255 5.6.7.8 1\n");
        assert_eq!(toks[0].0, TokenKind::Keyword(Keyword::Ngfw));
        assert_eq!(toks[1].0, TokenKind::Keyword(Keyword::Version));
        assert_eq!(toks[2], (TokenKind::Word, "7.4.2.1"));
        assert_eq!(toks[5].0, TokenKind::Ipv4Address);
    }

    #[test]
    fn state_resets_after_newline() {
        let mut scanner = scan("ASA Version 9.8\nx");
        for _ in 0..3 {
            scanner.next();
        }
        assert!(!scanner.state().ipv4_enabled);
        assert_eq!(scanner.next().map(|t| t.kind), Some(TokenKind::Newline));
        assert!(scanner.state().ipv4_enabled);
        assert!(scanner.state().decimal_enabled);
        assert!(scanner.state().at_line_start());
        assert_eq!(scanner.state().last_significant_token, None);
    }

    #[test]
    fn remark_and_description_capture_rest_of_line() {
        let toks = words("access-list A remark rule-id 100: RULE: Allow (web)\n");
        assert_eq!(toks[3], (TokenKind::Text, "rule-id 100: RULE: Allow (web)"));
        let toks = words(" description ISP \"Peer\" 1  \r\n");
        assert_eq!(toks[1], (TokenKind::Text, "ISP \"Peer\" 1"));
    }

    #[test]
    fn punctuation_splits_nat_interface_pair() {
        let toks = words("nat (inside,outside) source static A B");
        assert_eq!(toks[1].0, TokenKind::LParen);
        assert_eq!(toks[2], (TokenKind::Word, "inside"));
        assert_eq!(toks[3].0, TokenKind::Comma);
        assert_eq!(toks[5].0, TokenKind::RParen);
    }

    #[test]
    fn control_characters_are_anomalous_words() {
        let toks = scan("hostname fw\u{1}x\n").collect::<Vec<_>>();
        assert_eq!(toks[1].kind, TokenKind::Word);
        assert!(toks[1].anomalous);
        assert!(!toks[0].anomalous);
    }

    #[test]
    fn spans_track_lines_and_columns() {
        let toks = scan("a\n  bb cc\n").collect::<Vec<_>>();
        let bb = toks.iter().find(|t| t.text == "bb").expect("bb");
        assert_eq!(bb.span.line, 2);
        assert_eq!(bb.span.column, 2);
        assert_eq!(bb.span.start_byte, 4);
        assert_eq!(bb.span.end_byte, 6);
        assert_eq!(toks[1].kind, TokenKind::Newline);
        assert_eq!(toks[1].span.line, 1);
    }

    #[test]
    fn unterminated_quote_runs_to_end_of_line() {
        let toks = words("x \"abc def\ny");
        assert_eq!(toks[1], (TokenKind::QuotedString, "\"abc def"));
        assert_eq!(toks[2].1, "y");
    }
}
