use super::*;
use crate::token::SyntaxError;
use crate::token::Tokenizer;

fn parse(src: &str) -> (Vec<Stmt>, Vec<SyntaxError>) {
    let (tokens, _) = Tokenizer::tokenize(src);
    let mut parser = Parser::new(&tokens);
    let statements = parser.parse_program();
    (statements, parser.into_errors())
}

fn parse_clean(src: &str) -> Vec<Stmt> {
    let (statements, errors) = parse(src);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    statements
}

#[test]
fn test_empty_token_stream() {
    let mut parser = Parser::new(&[]);
    assert!(parser.parse_program().is_empty());
    assert!(parser.into_errors().is_empty());
}

#[test]
fn test_variable_declaration_with_value() {
    let statements = parse_clean("var a = 1;");
    let Stmt::Expression(stmt) = &statements[0] else {
        panic!("expected expression statement");
    };
    let Expr::Assign { target, value, .. } = &stmt.expression else {
        panic!("expected assignment");
    };
    assert!(matches!(target.as_ref(), Expr::VariableDeclaration { name, .. } if name.lexeme == "a"));
    assert!(matches!(value.as_ref(), Expr::Literal { .. }));
    assert_eq!((stmt.start, stmt.end), (0, 10));
}

#[test]
fn test_function_declaration_spans() {
    let statements = parse_clean("fn add(a, b) { a + b; }");
    let Stmt::FunctionDeclaration(f) = &statements[0] else {
        panic!("expected function declaration");
    };
    assert_eq!(f.name.lexeme, "add");
    assert_eq!(f.parameters.len(), 2);
    assert!(f.body.is_braced());
    assert_eq!((f.body.start, f.body.end), (13, 23));
    assert_eq!(f.end, 23);
}

#[test]
fn test_arrow_block() {
    let statements = parse_clean("if a => b;");
    let Stmt::If(stmt) = &statements[0] else {
        panic!("expected if statement");
    };
    let (_, block) = &stmt.branches[0];
    assert!(!block.is_braced());
    assert_eq!((block.start, block.end), (5, 10));
}

#[test]
fn test_each_statement() {
    let statements = parse_clean("each x in items { x; }");
    let Stmt::Each(stmt) = &statements[0] else {
        panic!("expected each statement");
    };
    assert_eq!(stmt.variable.lexeme, "x");
    assert!(matches!(&stmt.iterable, Expr::Variable { name, .. } if name.lexeme == "items"));
    assert_eq!(stmt.body.statements.len(), 1);
}

#[test]
fn test_group_declaration_and_access() {
    let statements = parse_clean("group A { var x = 1; }\nA::x;");
    let Stmt::GroupDeclaration(group) = &statements[0] else {
        panic!("expected group declaration");
    };
    assert_eq!(group.name.lexeme, "A");
    assert_eq!(group.body.statements.len(), 1);

    let Stmt::Expression(stmt) = &statements[1] else {
        panic!("expected expression statement");
    };
    let Expr::GroupAccess { names, .. } = &stmt.expression else {
        panic!("expected group access");
    };
    let names: Vec<&str> = names.iter().map(|n| n.lexeme.as_str()).collect();
    assert_eq!(names, vec!["A", "x"]);
}

#[test]
fn test_trailing_group_separator_extends_span() {
    // Mid-typing form: the chain has one name but the span covers the `::`.
    let (statements, _) = parse("math::");
    let Stmt::Expression(stmt) = &statements[0] else {
        panic!("expected expression statement");
    };
    let Expr::GroupAccess { names, start, end } = &stmt.expression else {
        panic!("expected group access");
    };
    assert_eq!(names.len(), 1);
    assert_eq!((*start, *end), (0, 6));
}

#[test]
fn test_use_forms() {
    let statements = parse_clean("use \"lib.mpsl\";\nuse math;");
    let Stmt::Use(file) = &statements[0] else {
        panic!("expected use statement");
    };
    assert!(!file.is_builtin_reference());
    assert_eq!(file.path(), Some("lib.mpsl".to_string()));

    let Stmt::Use(builtin) = &statements[1] else {
        panic!("expected use statement");
    };
    assert!(builtin.is_builtin_reference());
    assert_eq!(builtin.path(), None);
}

#[test]
fn test_public_wrapper() {
    let statements = parse_clean("public fn f() { }");
    let Stmt::Public(stmt) = &statements[0] else {
        panic!("expected public statement");
    };
    assert!(matches!(stmt.inner.as_ref(), Stmt::FunctionDeclaration(_)));
}

#[test]
fn test_error_recovery_keeps_later_statements() {
    let (statements, errors) = parse("var = ;\nvar b = 2;");
    assert!(!errors.is_empty());
    assert_eq!(statements.len(), 1);
    let Stmt::Expression(stmt) = &statements[0] else {
        panic!("expected expression statement");
    };
    let Expr::Assign { target, .. } = &stmt.expression else {
        panic!("expected assignment");
    };
    assert!(matches!(target.as_ref(), Expr::VariableDeclaration { name, .. } if name.lexeme == "b"));
}

#[test]
fn test_missing_semicolon_is_recoverable() {
    let (statements, errors) = parse("var a = 1");
    assert_eq!(statements.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("';'"));
}

#[test]
fn test_match_expression() {
    let statements = parse_clean("var r = match x { 1 => 2, 3 => 4 };");
    let Stmt::Expression(stmt) = &statements[0] else {
        panic!("expected expression statement");
    };
    let Expr::Assign { value, .. } = &stmt.expression else {
        panic!("expected assignment");
    };
    let Expr::Match { arms, .. } = value.as_ref() else {
        panic!("expected match expression");
    };
    assert_eq!(arms.len(), 2);
}

#[test]
fn test_interpolated_string_parts() {
    let statements = parse_clean("var s = @\"hi {name}\";");
    let Stmt::Expression(stmt) = &statements[0] else {
        panic!("expected expression statement");
    };
    let Expr::Assign { value, .. } = &stmt.expression else {
        panic!("expected assignment");
    };
    let Expr::InterpolatedString { parts, .. } = value.as_ref() else {
        panic!("expected interpolated string");
    };
    assert_eq!(parts.len(), 2);
    assert!(matches!(&parts[0], Expr::Literal { .. }));
    assert!(matches!(&parts[1], Expr::Variable { name, .. } if name.lexeme == "name"));
}

#[test]
fn test_push_binds_looser_than_binary() {
    let statements = parse_clean("1 + 2 * 3 >> out;");
    let Stmt::Expression(stmt) = &statements[0] else {
        panic!("expected expression statement");
    };
    let Expr::Push { value, target, .. } = &stmt.expression else {
        panic!("expected push expression");
    };
    assert!(matches!(value.as_ref(), Expr::Binary { .. }));
    assert!(matches!(target.as_ref(), Expr::Variable { name, .. } if name.lexeme == "out"));
}

#[test]
fn test_object_literal_and_postfix() {
    let statements = parse_clean("var o = { a: 1, b: c.d[0] };");
    let Stmt::Expression(stmt) = &statements[0] else {
        panic!("expected expression statement");
    };
    let Expr::Assign { value, .. } = &stmt.expression else {
        panic!("expected assignment");
    };
    let Expr::Object { entries, .. } = value.as_ref() else {
        panic!("expected object literal");
    };
    assert_eq!(entries.len(), 2);
    assert!(matches!(&entries[1].1, Expr::Access { .. }));
}
