use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    let (tokens, _) = Tokenizer::tokenize(src);
    tokens.into_iter().map(|t| t.kind).collect()
}

fn lexemes(src: &str) -> Vec<String> {
    let (tokens, _) = Tokenizer::tokenize(src);
    tokens.into_iter().map(|t| t.lexeme).collect()
}

#[test]
fn test_operators_and_chains() {
    assert_eq!(
        kinds("a::b => c >> d;"),
        vec![
            TokenKind::Identifier,
            TokenKind::ColonColon,
            TokenKind::Identifier,
            TokenKind::Arrow,
            TokenKind::Identifier,
            TokenKind::Push,
            TokenKind::Identifier,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("== != <= >= && || !"),
        vec![
            TokenKind::Eq,
            TokenKind::Ne,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("var fn each group public use match break foo"),
        vec![
            TokenKind::Var,
            TokenKind::Fn,
            TokenKind::Each,
            TokenKind::Group,
            TokenKind::Public,
            TokenKind::Use,
            TokenKind::Match,
            TokenKind::Break,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(lexemes("12 12.5"), vec!["12", "12.5", ""]);
    // A dot not followed by a digit stays a member access.
    assert_eq!(
        kinds("12.x"),
        vec![TokenKind::Number, TokenKind::Dot, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn test_string_value_resolves_escapes() {
    let (tokens, errors) = Tokenizer::tokenize(r#""a\nb""#);
    assert!(errors.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].string_value(), Some("a\nb".to_string()));
}

#[test]
fn test_unterminated_string_keeps_partial_token() {
    let (tokens, errors) = Tokenizer::tokenize("\"abc");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Unterminated string");
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!((tokens[0].start, tokens[0].end), (0, 4));
}

#[test]
fn test_native_identifier_keeps_sigil() {
    let (tokens, _) = Tokenizer::tokenize("@print(x)");
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].lexeme, "@print");
    // A bare sigil, as typed right before the completion trigger fires.
    let (tokens, _) = Tokenizer::tokenize("@");
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].lexeme, "@");
}

#[test]
fn test_interpolated_string_modes() {
    assert_eq!(
        kinds("@\"hi {name}!\""),
        vec![
            TokenKind::InterpolatedStringMarker,
            TokenKind::InterpolatedText,
            TokenKind::CurlyLeft,
            TokenKind::Identifier,
            TokenKind::CurlyRight,
            TokenKind::InterpolatedText,
            TokenKind::InterpolatedStringMarker,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_interpolation_hole_tracks_nested_braces() {
    assert_eq!(
        kinds("@\"v {obj({})}\""),
        vec![
            TokenKind::InterpolatedStringMarker,
            TokenKind::InterpolatedText,
            TokenKind::CurlyLeft,
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::CurlyLeft,
            TokenKind::CurlyRight,
            TokenKind::RParen,
            TokenKind::CurlyRight,
            TokenKind::InterpolatedStringMarker,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_comments() {
    let (tokens, _) = Tokenizer::tokenize("# plain\n## doc\nvar x;");
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].lexeme, "# plain");
    assert_eq!(tokens[1].kind, TokenKind::Comment);
    assert_eq!(tokens[1].lexeme, "## doc");
    assert_eq!(tokens[2].kind, TokenKind::Var);
}

#[test]
fn test_line_and_column_tracking() {
    let (tokens, _) = Tokenizer::tokenize("var x;\n  y;");
    let y = tokens.iter().find(|t| t.lexeme == "y").unwrap();
    assert_eq!((y.line, y.column), (2, 2));
    assert_eq!((y.start, y.end), (9, 10));
}
