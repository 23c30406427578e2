//! Argument tokenizer.
//!
//! Classifies raw argument strings into flag and positional tokens. The
//! lexer enforces no grammar: ordering rules (flags before positionals) and
//! value consumption are the dispatcher's job.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::{Lexer, TokenKind};
//!
//! let args = vec!["--port".to_string(), "8080".to_string(), "-lvg".to_string()];
//! let mut lexer = Lexer::new(&args);
//!
//! let port = lexer.read().unwrap();
//! assert_eq!(port.kind, TokenKind::LongFlag);
//! assert_eq!(port.name, "port");
//!
//! assert_eq!(lexer.peek().unwrap().kind, TokenKind::Positional);
//! assert_eq!(lexer.read().unwrap().raw, "8080");
//! assert_eq!(lexer.read().unwrap().kind, TokenKind::MultiFlag);
//! assert!(lexer.read().is_none());
//! ```

use serde::{Deserialize, Serialize};

/// Kind of a lexed argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// `--name` or `--name=value`.
    LongFlag,
    /// `-c` or `-c=value`.
    ShortFlag,
    /// `-cde`: bundled boolean shorthands.
    MultiFlag,
    /// Anything that does not start with `-`, and a lone `-`.
    Positional,
}

/// A single classified argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token classification.
    pub kind: TokenKind,
    /// Flag name without leading dashes; empty for positionals.
    pub name: String,
    /// Inline value after the first `=` (flags only).
    pub value: Option<String>,
    /// The original argument string.
    pub raw: String,
}

impl Token {
    /// Classifies one raw argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{Token, TokenKind};
    ///
    /// let t = Token::classify("--host=0.0.0.0");
    /// assert_eq!(t.kind, TokenKind::LongFlag);
    /// assert_eq!(t.name, "host");
    /// assert_eq!(t.value.as_deref(), Some("0.0.0.0"));
    ///
    /// let t = Token::classify("-");
    /// assert_eq!(t.kind, TokenKind::Positional);
    /// ```
    pub fn classify(raw: &str) -> Self {
        let (head, value) = match raw.split_once('=') {
            Some((head, value)) => (head, Some(value.to_string())),
            None => (raw, None),
        };

        if let Some(name) = head.strip_prefix("--") {
            return Self::flag(TokenKind::LongFlag, name, value, raw);
        }

        if let Some(name) = head.strip_prefix('-') {
            match name.chars().count() {
                0 => {}
                1 => return Self::flag(TokenKind::ShortFlag, name, value, raw),
                _ => return Self::flag(TokenKind::MultiFlag, name, value, raw),
            }
        }

        Self {
            kind: TokenKind::Positional,
            name: String::new(),
            value: None,
            raw: raw.to_string(),
        }
    }

    fn flag(kind: TokenKind, name: &str, value: Option<String>, raw: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            value,
            raw: raw.to_string(),
        }
    }

    /// Returns `true` for every kind except [`TokenKind::Positional`].
    pub fn is_flag(&self) -> bool {
        self.kind != TokenKind::Positional
    }

    /// The flag as written on the command line, without any inline value
    /// (`--name`, `-c`, `-cde`). Positionals return their raw text.
    pub fn display_name(&self) -> String {
        match self.kind {
            TokenKind::LongFlag => format!("--{}", self.name),
            TokenKind::ShortFlag | TokenKind::MultiFlag => format!("-{}", self.name),
            TokenKind::Positional => self.raw.clone(),
        }
    }
}

/// Returns `true` if `raw` would lex as a flag token.
pub fn looks_like_flag(raw: &str) -> bool {
    Token::classify(raw).is_flag()
}

/// Cursor over a borrowed argument vector.
#[derive(Debug)]
pub struct Lexer<'a> {
    args: &'a [String],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the first argument.
    pub fn new(args: &'a [String]) -> Self {
        Self { args, pos: 0 }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<Token> {
        self.args.get(self.pos).map(|raw| Token::classify(raw))
    }

    /// Consumes and returns the next token.
    pub fn read(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Arguments not yet consumed.
    pub fn remaining(&self) -> &'a [String] {
        &self.args[self.pos.min(self.args.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lexer_mixed_sequence() {
        let raw = args(&[
            "-f",
            "-lvg",
            "--port",
            "8080",
            "--host=0.0.0.0",
            "-t=taco",
            "-iec=false",
        ]);
        let mut lexer = Lexer::new(&raw);

        let expected = [
            (TokenKind::ShortFlag, "f", None),
            (TokenKind::MultiFlag, "lvg", None),
            (TokenKind::LongFlag, "port", None),
            (TokenKind::Positional, "", None),
            (TokenKind::LongFlag, "host", Some("0.0.0.0")),
            (TokenKind::ShortFlag, "t", Some("taco")),
            (TokenKind::MultiFlag, "iec", Some("false")),
        ];

        for (kind, name, value) in expected {
            let token = lexer.read().unwrap();
            assert_eq!(token.kind, kind);
            assert_eq!(token.name, name);
            assert_eq!(token.value.as_deref(), value);
        }
        assert!(lexer.read().is_none());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let raw = args(&["--a", "b"]);
        let mut lexer = Lexer::new(&raw);

        assert_eq!(lexer.peek().unwrap().name, "a");
        assert_eq!(lexer.peek().unwrap().name, "a");
        assert_eq!(lexer.read().unwrap().name, "a");
        assert_eq!(lexer.remaining(), &["b".to_string()]);
    }

    #[test]
    fn test_positional_keeps_equals() {
        let token = Token::classify("key=value");
        assert_eq!(token.kind, TokenKind::Positional);
        assert_eq!(token.raw, "key=value");
        assert!(token.value.is_none());
    }

    #[test]
    fn test_lone_dash_is_positional() {
        let token = Token::classify("-");
        assert_eq!(token.kind, TokenKind::Positional);
        assert!(!looks_like_flag("-"));
    }

    #[test]
    fn test_short_flag_counts_chars_not_bytes() {
        let token = Token::classify("-é");
        assert_eq!(token.kind, TokenKind::ShortFlag);
        assert_eq!(token.name, "é");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Token::classify("--port=1").display_name(), "--port");
        assert_eq!(Token::classify("-p").display_name(), "-p");
        assert_eq!(Token::classify("-abc").display_name(), "-abc");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn non_dash_arguments_are_positional(raw in "[a-zA-Z0-9_./=:]{0,16}") {
                let token = Token::classify(&raw);
                prop_assert_eq!(token.kind, TokenKind::Positional);
                prop_assert_eq!(token.raw, raw);
            }

            #[test]
            fn inline_value_splits_on_first_equals(
                name in "[a-z][a-z-]{1,10}",
                value in "[a-z=]{0,10}",
            ) {
                let token = Token::classify(&format!("--{name}={value}"));
                prop_assert_eq!(token.kind, TokenKind::LongFlag);
                prop_assert_eq!(token.name, name);
                prop_assert_eq!(token.value, Some(value));
            }
        }
    }
}
