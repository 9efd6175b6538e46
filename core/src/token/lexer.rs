use super::{keyword_kind, SyntaxError, Token, TokenKind};

/// Lexer modes. Interpolated strings (`@"text{expr}text"`) switch the
/// tokenizer between raw text runs and ordinary code scanning; the stack
/// allows interpolations to nest.
enum Mode {
    Normal,
    /// Inside an interpolated string, scanning a raw text run.
    InterpText,
    /// Inside a `{...}` hole of an interpolated string; the counter tracks
    /// nested braces so the closing one can be recognized.
    InterpCode(u32),
}

pub struct Tokenizer<'a> {
    src: &'a str,
    idx: usize,
    line: u32,
    col: u32,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
    modes: Vec<Mode>,
}

impl<'a> Tokenizer<'a> {
    /// Scan `text` into a token stream. Faults are collected, never fatal:
    /// the stream always ends with an `Eof` token covering the final offset.
    pub fn tokenize(text: &str) -> (Vec<Token>, Vec<SyntaxError>) {
        let mut tokenizer = Tokenizer {
            src: text,
            idx: 0,
            line: 1,
            col: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            modes: vec![Mode::Normal],
        };
        tokenizer.run();
        (tokenizer.tokens, tokenizer.errors)
    }

    fn run(&mut self) {
        while self.idx < self.src.len() {
            match self.modes.last() {
                Some(Mode::InterpText) => self.scan_interp_text(),
                _ => self.scan_token(),
            }
        }
        let (line, col) = (self.line, self.col);
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            start: self.src.len(),
            end: self.src.len(),
            line,
            column: col,
        });
    }

    fn peek(&self) -> Option<char> {
        self.src[self.idx..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.src[self.idx..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += c.len_utf8() as u32;
        }
        Some(c)
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: u32, column: u32) {
        self.tokens.push(Token {
            kind,
            lexeme: self.src[start..self.idx].to_string(),
            start,
            end: self.idx,
            line,
            column,
        });
    }

    fn error(&mut self, message: impl Into<String>, start: usize, line: u32, column: u32) {
        self.errors.push(SyntaxError {
            message: message.into(),
            line,
            column,
            start,
            end: self.idx,
        });
    }

    fn scan_token(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
        let (start, line, col) = (self.idx, self.line, self.col);
        let c = match self.advance() {
            Some(c) => c,
            None => return,
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => {
                if let Some(Mode::InterpCode(depth)) = self.modes.last_mut() {
                    *depth += 1;
                }
                TokenKind::CurlyLeft
            }
            '}' => {
                if let Some(Mode::InterpCode(depth)) = self.modes.last_mut() {
                    *depth -= 1;
                    if *depth == 0 {
                        // Back to the surrounding text run of the string.
                        self.modes.pop();
                        self.modes.push(Mode::InterpText);
                    }
                }
                TokenKind::CurlyRight
            }
            '[' => TokenKind::SquareLeft,
            ']' => TokenKind::SquareRight,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            ':' => {
                if self.advance_if(':') {
                    TokenKind::ColonColon
                } else {
                    TokenKind::Colon
                }
            }
            '=' => {
                if self.advance_if('=') {
                    TokenKind::Eq
                } else if self.advance_if('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.advance_if('=') {
                    TokenKind::Ne
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.advance_if('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.advance_if('>') {
                    TokenKind::Push
                } else if self.advance_if('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.advance_if('&') {
                    TokenKind::And
                } else {
                    self.error("Unexpected character '&'", start, line, col);
                    return;
                }
            }
            '|' => {
                if self.advance_if('|') {
                    TokenKind::Or
                } else {
                    self.error("Unexpected character '|'", start, line, col);
                    return;
                }
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '#' => {
                while !matches!(self.peek(), Some('\n') | None) {
                    self.advance();
                }
                TokenKind::Comment
            }
            '"' => {
                self.scan_string(start, line, col);
                return;
            }
            '@' => {
                if self.advance_if('"') {
                    self.modes.push(Mode::InterpText);
                    TokenKind::InterpolatedStringMarker
                } else if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                    while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                        self.advance();
                    }
                    TokenKind::Identifier
                } else {
                    // A bare sigil, as typed right before completion triggers.
                    TokenKind::Identifier
                }
            }
            c if c.is_ascii_digit() => {
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                }
                if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                    while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                        self.advance();
                    }
                }
                TokenKind::Number
            }
            c if c.is_alphabetic() || c == '_' => {
                while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                    self.advance();
                }
                keyword_kind(&self.src[start..self.idx]).unwrap_or(TokenKind::Identifier)
            }
            other => {
                self.error(format!("Unexpected character '{other}'"), start, line, col);
                return;
            }
        };

        self.push(kind, start, line, col);
    }

    fn scan_string(&mut self, start: usize, line: u32, col: u32) {
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("Unterminated string", start, line, col);
                    break;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        // Pushed even when unterminated so cursor-in-string detection works
        // on the line being typed.
        self.push(TokenKind::String, start, line, col);
    }

    /// Scan one raw text run of an interpolated string, stopping at a hole,
    /// the closing quote, or end of input.
    fn scan_interp_text(&mut self) {
        let (start, line, col) = (self.idx, self.line, self.col);
        loop {
            match self.peek() {
                None | Some('\n') => {
                    if self.idx > start {
                        self.push(TokenKind::InterpolatedText, start, line, col);
                    }
                    let (l, c) = (self.line, self.col);
                    self.error("Unterminated interpolated string", start, l, c);
                    self.modes.pop();
                    return;
                }
                Some('"') => {
                    if self.idx > start {
                        self.push(TokenKind::InterpolatedText, start, line, col);
                    }
                    let (mstart, mline, mcol) = (self.idx, self.line, self.col);
                    self.advance();
                    self.push(TokenKind::InterpolatedStringMarker, mstart, mline, mcol);
                    self.modes.pop();
                    return;
                }
                Some('{') => {
                    if self.idx > start {
                        self.push(TokenKind::InterpolatedText, start, line, col);
                    }
                    let (bstart, bline, bcol) = (self.idx, self.line, self.col);
                    self.advance();
                    self.push(TokenKind::CurlyLeft, bstart, bline, bcol);
                    self.modes.pop();
                    self.modes.push(Mode::InterpCode(1));
                    return;
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}
