mod lexer;
#[cfg(test)]
mod token_test;

pub use lexer::Tokenizer;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LParen,      // (
    RParen,      // )
    CurlyLeft,   // {
    CurlyRight,  // }
    SquareLeft,  // [
    SquareRight, // ]
    Comma,       // ,
    Semicolon,   // ;
    Colon,       // :
    ColonColon,  // ::
    Dot,         // .
    Arrow,       // =>
    Assign,      // =
    Eq,          // ==
    Ne,          // !=
    Lt,          // <
    Gt,          // >
    Le,          // <=
    Ge,          // >=
    And,         // &&
    Or,          // ||
    Not,         // !
    Plus,        // +
    Minus,       // -
    Star,        // *
    Slash,       // /
    Percent,     // %
    Push,        // >>
    Number,
    String,
    InterpolatedStringMarker, // @" opener or the closing "
    InterpolatedText,         // raw text run inside an interpolated string
    Comment,
    Identifier, // includes the @ sigil for native references
    // Keywords
    Var,
    Fn,
    If,
    Else,
    While,
    Each,
    In,
    Match,
    Use,
    Public,
    Group,
    Break,
    True,
    False,
    Null,
    Eof,
}

/// A single lexed token. `start`/`end` form a half-open byte-offset span
/// `[start, end)` into the source text; `line` is 1-based, `column` is the
/// 0-based byte column of `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Token {
    /// Literal content of a string token with quotes removed and the
    /// escape sequences the tokenizer accepts resolved.
    pub fn string_value(&self) -> Option<String> {
        if self.kind != TokenKind::String {
            return None;
        }
        let inner = self.lexeme.trim_start_matches('"').trim_end_matches('"');
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => {}
                }
            } else {
                out.push(c);
            }
        }
        Some(out)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

/// A recoverable front-end fault, surfaced verbatim as an editor
/// diagnostic. `line` is 1-based, `column` 0-based.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub start: usize,
    pub end: usize,
}

impl SyntaxError {
    pub fn at_token(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            line: token.line,
            column: token.column,
            start: token.start,
            end: token.end,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    Some(match word {
        "var" => TokenKind::Var,
        "fn" => TokenKind::Fn,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "each" => TokenKind::Each,
        "in" => TokenKind::In,
        "match" => TokenKind::Match,
        "use" => TokenKind::Use,
        "public" => TokenKind::Public,
        "group" => TokenKind::Group,
        "break" => TokenKind::Break,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        _ => return None,
    })
}
