pub mod ast;
pub mod token;

use ast::{Parser, Stmt};
use token::{SyntaxError, Token, Tokenizer};

/// Result of running the full front end over a piece of source text.
///
/// Faults never abort the scan or the parse; both error lists may be
/// non-empty while `statements` still carries everything that was
/// recoverable.
#[derive(Debug)]
pub struct CheckResult {
    pub tokens: Vec<Token>,
    pub statements: Vec<Stmt>,
    pub tokenizer_errors: Vec<SyntaxError>,
    pub parser_errors: Vec<SyntaxError>,
}

/// Tokenize and parse `text`. Pure function of the input; spans in the
/// result are byte offsets into `text`.
pub fn check(text: &str) -> CheckResult {
    let (tokens, tokenizer_errors) = Tokenizer::tokenize(text);
    let mut parser = Parser::new(&tokens);
    let statements = parser.parse_program();
    CheckResult {
        tokens,
        statements,
        tokenizer_errors,
        parser_errors: parser.into_errors(),
    }
}
