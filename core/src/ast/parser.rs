use super::{
    AccessMember, Block, EachStmt, Expr, ExprStmt, FunctionDecl, GroupDecl, IfStmt, PublicStmt,
    Stmt, UseStmt, WhileStmt,
};
use crate::token::{SyntaxError, Token, TokenKind};

/// Error-tolerant recursive-descent parser. Faults are recorded and the
/// parser synchronizes at the next statement boundary, so a broken region
/// never hides the statements around it.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
}

impl Parser {
    pub fn new(tokens: &[Token]) -> Self {
        let mut tokens: Vec<Token> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .cloned()
            .collect();
        // The tokenizer always terminates its stream; cover callers that
        // hand over a bare slice.
        if !tokens.last().is_some_and(|t| t.kind == TokenKind::Eof) {
            let (end, line) = tokens.last().map_or((0, 1), |t| (t.end, t.line));
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                start: end,
                end,
                line,
                column: 0,
            });
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse_program(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.at_end() {
            match self.statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }
        statements
    }

    pub fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn advance_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error_here(format!("Expected {what}"));
            None
        }
    }

    fn error_here(&mut self, message: String) {
        let token = self.peek();
        self.errors.push(SyntaxError::at_token(message, token));
    }

    /// A missing semicolon is recorded but never aborts the statement.
    fn expect_semicolon(&mut self, end: usize) -> usize {
        if let Some(semi) = self.advance_if(TokenKind::Semicolon) {
            semi.end
        } else {
            self.error_here("Expected ';'".to_string());
            end
        }
    }

    fn synchronize(&mut self) {
        if !self.at_end() {
            self.advance();
        }
        while !self.at_end() {
            if self.tokens[self.pos - 1].kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Fn
                | TokenKind::Each
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Use
                | TokenKind::Public
                | TokenKind::Group
                | TokenKind::Var
                | TokenKind::CurlyRight => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn statement(&mut self) -> Option<Stmt> {
        match self.peek().kind {
            TokenKind::Fn => self.function_declaration(),
            TokenKind::Each => self.each_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Use => self.use_statement(),
            TokenKind::Public => self.public_statement(),
            TokenKind::Group => self.group_declaration(),
            _ => self.expression_statement(),
        }
    }

    fn function_declaration(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        let name = self.expect(TokenKind::Identifier, "function name")?;
        self.expect(TokenKind::LParen, "'(' after function name")?;
        let mut parameters = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                parameters.push(self.expect(TokenKind::Identifier, "parameter name")?);
                if self.advance_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' after parameters")?;
        let body = self.block()?;
        let end = body.end;
        Some(Stmt::FunctionDeclaration(FunctionDecl {
            name,
            parameters,
            body,
            start: keyword.start,
            end,
        }))
    }

    fn each_statement(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        let variable = self.expect(TokenKind::Identifier, "loop variable")?;
        self.expect(TokenKind::In, "'in'")?;
        let iterable = self.expression()?;
        let body = self.block()?;
        let end = body.end;
        Some(Stmt::Each(EachStmt {
            variable,
            iterable,
            body,
            start: keyword.start,
            end,
        }))
    }

    fn if_statement(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        let condition = self.expression()?;
        let block = self.block()?;
        let mut end = block.end;
        let mut branches = vec![(condition, block)];
        let mut else_block = None;
        while self.advance_if(TokenKind::Else).is_some() {
            if self.advance_if(TokenKind::If).is_some() {
                let condition = self.expression()?;
                let block = self.block()?;
                end = block.end;
                branches.push((condition, block));
            } else {
                let block = self.block()?;
                end = block.end;
                else_block = Some(block);
                break;
            }
        }
        Some(Stmt::If(IfStmt {
            branches,
            else_block,
            start: keyword.start,
            end,
        }))
    }

    fn while_statement(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        let condition = self.expression()?;
        let body = self.block()?;
        let end = body.end;
        Some(Stmt::While(WhileStmt {
            condition,
            body,
            start: keyword.start,
            end,
        }))
    }

    fn use_statement(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        let target = match self.peek().kind {
            TokenKind::String | TokenKind::Identifier => self.advance(),
            _ => {
                self.error_here("Expected import path or group name after 'use'".to_string());
                return None;
            }
        };
        let end = self.expect_semicolon(target.end);
        Some(Stmt::Use(UseStmt {
            target,
            start: keyword.start,
            end,
        }))
    }

    fn public_statement(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        let inner = self.statement()?;
        let end = inner.end();
        Some(Stmt::Public(PublicStmt {
            inner: Box::new(inner),
            start: keyword.start,
            end,
        }))
    }

    fn group_declaration(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        let name = self.expect(TokenKind::Identifier, "group name")?;
        let body = self.block()?;
        let end = body.end;
        Some(Stmt::GroupDeclaration(GroupDecl {
            name,
            body,
            start: keyword.start,
            end,
        }))
    }

    fn expression_statement(&mut self) -> Option<Stmt> {
        let expression = self.expression()?;
        let start = expression.start();
        let end = self.expect_semicolon(expression.end());
        Some(Stmt::Expression(ExprStmt {
            expression,
            start,
            end,
        }))
    }

    /// `{ statements }`, or `=> statement` for a single-statement body.
    fn block(&mut self) -> Option<Block> {
        if let Some(open) = self.advance_if(TokenKind::CurlyLeft) {
            let mut statements = Vec::new();
            while !self.check(TokenKind::CurlyRight) && !self.at_end() {
                match self.statement() {
                    Some(stmt) => statements.push(stmt),
                    None => self.synchronize(),
                }
            }
            let end = match self.expect(TokenKind::CurlyRight, "'}'") {
                Some(close) => close.end,
                None => statements.last().map(Stmt::end).unwrap_or(open.end),
            };
            let start = open.start;
            Some(Block {
                open,
                statements,
                start,
                end,
            })
        } else if let Some(open) = self.advance_if(TokenKind::Arrow) {
            let stmt = self.statement()?;
            let (start, end) = (open.start, stmt.end());
            Some(Block {
                open,
                statements: vec![stmt],
                start,
                end,
            })
        } else {
            self.error_here("Expected '{' or '=>'".to_string());
            None
        }
    }

    fn expression(&mut self) -> Option<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Option<Expr> {
        if let Some(keyword) = self.advance_if(TokenKind::Var) {
            let name = self.expect(TokenKind::Identifier, "variable name")?;
            let decl = Expr::VariableDeclaration {
                start: keyword.start,
                end: name.end,
                name,
            };
            if self.advance_if(TokenKind::Assign).is_some() {
                let value = self.assignment()?;
                return Some(Expr::Assign {
                    start: keyword.start,
                    end: value.end(),
                    target: Box::new(decl),
                    value: Box::new(value),
                });
            }
            return Some(decl);
        }

        let expr = self.push_expression()?;
        if self.advance_if(TokenKind::Assign).is_some() {
            let value = self.assignment()?;
            return Some(Expr::Assign {
                start: expr.start(),
                end: value.end(),
                target: Box::new(expr),
                value: Box::new(value),
            });
        }
        Some(expr)
    }

    fn push_expression(&mut self) -> Option<Expr> {
        let mut expr = self.binary_expression(0)?;
        while self.advance_if(TokenKind::Push).is_some() {
            let target = self.binary_expression(0)?;
            expr = Expr::Push {
                start: expr.start(),
                end: target.end(),
                value: Box::new(expr),
                target: Box::new(target),
            };
        }
        Some(expr)
    }

    /// Precedence-climbing over the binary operator tiers.
    fn binary_expression(&mut self, tier: usize) -> Option<Expr> {
        const TIERS: &[&[TokenKind]] = &[
            &[TokenKind::Or],
            &[TokenKind::And],
            &[TokenKind::Eq, TokenKind::Ne],
            &[TokenKind::Lt, TokenKind::Gt, TokenKind::Le, TokenKind::Ge],
            &[TokenKind::Plus, TokenKind::Minus],
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
        ];
        if tier >= TIERS.len() {
            return self.unary_expression();
        }
        let mut expr = self.binary_expression(tier + 1)?;
        while TIERS[tier].contains(&self.peek().kind) {
            let op = self.advance();
            let right = self.binary_expression(tier + 1)?;
            expr = Expr::Binary {
                start: expr.start(),
                end: right.end(),
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Some(expr)
    }

    fn unary_expression(&mut self) -> Option<Expr> {
        if matches!(self.peek().kind, TokenKind::Not | TokenKind::Minus) {
            let op = self.advance();
            let operand = self.unary_expression()?;
            return Some(Expr::Unary {
                start: op.start,
                end: operand.end(),
                op,
                operand: Box::new(operand),
            });
        }
        self.postfix_expression()
    }

    fn postfix_expression(&mut self) -> Option<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.advance_if(TokenKind::LParen).is_some() {
                let mut arguments = Vec::new();
                if !self.check(TokenKind::RParen) {
                    loop {
                        arguments.push(self.expression()?);
                        if self.advance_if(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                let close = self.expect(TokenKind::RParen, "')' after arguments")?;
                expr = Expr::Call {
                    start: expr.start(),
                    end: close.end,
                    callee: Box::new(expr),
                    arguments,
                };
            } else if self.advance_if(TokenKind::Dot).is_some() {
                let name = self.expect(TokenKind::Identifier, "member name")?;
                expr = Expr::Access {
                    start: expr.start(),
                    end: name.end,
                    object: Box::new(expr),
                    member: AccessMember::Name(name),
                };
            } else if self.advance_if(TokenKind::SquareLeft).is_some() {
                let index = self.expression()?;
                let close = self.expect(TokenKind::SquareRight, "']'")?;
                expr = Expr::Access {
                    start: expr.start(),
                    end: close.end,
                    object: Box::new(expr),
                    member: AccessMember::Index(Box::new(index)),
                };
            } else {
                return Some(expr);
            }
        }
    }

    fn primary(&mut self) -> Option<Expr> {
        match self.peek().kind {
            TokenKind::Number
            | TokenKind::String
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::Break => {
                let value = self.advance();
                Some(Expr::Literal {
                    start: value.start,
                    end: value.end,
                    value,
                })
            }
            TokenKind::InterpolatedStringMarker => self.interpolated_string(),
            TokenKind::Identifier => {
                let name = self.advance();
                if self.check(TokenKind::ColonColon) {
                    self.group_access(name)
                } else {
                    Some(Expr::Variable {
                        start: name.start,
                        end: name.end,
                        name,
                    })
                }
            }
            TokenKind::LParen => {
                let open = self.advance();
                let inner = self.expression()?;
                let close = self.expect(TokenKind::RParen, "')'")?;
                Some(Expr::Grouping {
                    start: open.start,
                    end: close.end,
                    inner: Box::new(inner),
                })
            }
            TokenKind::SquareLeft => {
                let open = self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenKind::SquareRight) {
                    loop {
                        elements.push(self.expression()?);
                        if self.advance_if(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                let close = self.expect(TokenKind::SquareRight, "']'")?;
                Some(Expr::Array {
                    start: open.start,
                    end: close.end,
                    elements,
                })
            }
            TokenKind::CurlyLeft => self.object_literal(),
            TokenKind::Match => self.match_expression(),
            _ => {
                self.error_here("Expected expression".to_string());
                None
            }
        }
    }

    /// The chain is kept as the raw name tokens so the analyzers can match
    /// a cursor or hovered token against individual segments. A trailing
    /// `::` with no name yet (mid-typing) only extends the span.
    fn group_access(&mut self, first: Token) -> Option<Expr> {
        let start = first.start;
        let mut end = first.end;
        let mut names = vec![first];
        while let Some(colons) = self.advance_if(TokenKind::ColonColon) {
            end = colons.end;
            if self.check(TokenKind::Identifier) {
                let name = self.advance();
                end = name.end;
                names.push(name);
            } else {
                break;
            }
        }
        Some(Expr::GroupAccess { names, start, end })
    }

    fn interpolated_string(&mut self) -> Option<Expr> {
        let open = self.advance();
        let start = open.start;
        let mut end = open.end;
        let mut parts = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::InterpolatedText => {
                    let text = self.advance();
                    end = text.end;
                    parts.push(Expr::Literal {
                        start: text.start,
                        end: text.end,
                        value: text,
                    });
                }
                TokenKind::CurlyLeft => {
                    self.advance();
                    let inner = self.expression()?;
                    parts.push(inner);
                    if let Some(close) = self.expect(TokenKind::CurlyRight, "'}'") {
                        end = close.end;
                    }
                }
                TokenKind::InterpolatedStringMarker => {
                    let close = self.advance();
                    end = close.end;
                    break;
                }
                _ => {
                    self.error_here("Unterminated interpolated string".to_string());
                    break;
                }
            }
        }
        Some(Expr::InterpolatedString { parts, start, end })
    }

    fn object_literal(&mut self) -> Option<Expr> {
        let open = self.advance();
        let mut entries = Vec::new();
        if !self.check(TokenKind::CurlyRight) {
            loop {
                let key = match self.peek().kind {
                    TokenKind::Identifier | TokenKind::String => self.advance(),
                    _ => {
                        self.error_here("Expected object key".to_string());
                        return None;
                    }
                };
                self.expect(TokenKind::Colon, "':' after object key")?;
                let value = self.expression()?;
                entries.push((key, value));
                if self.advance_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::CurlyRight, "'}'")?;
        Some(Expr::Object {
            start: open.start,
            end: close.end,
            entries,
        })
    }

    fn match_expression(&mut self) -> Option<Expr> {
        let keyword = self.advance();
        let subject = self.expression()?;
        self.expect(TokenKind::CurlyLeft, "'{' after match subject")?;
        let mut arms = Vec::new();
        while !self.check(TokenKind::CurlyRight) && !self.at_end() {
            let pattern = self.expression()?;
            self.expect(TokenKind::Arrow, "'=>' after match pattern")?;
            let body = self.expression()?;
            arms.push((pattern, body));
            if self.advance_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::CurlyRight, "'}'")?;
        Some(Expr::Match {
            start: keyword.start,
            end: close.end,
            subject: Box::new(subject),
            arms,
        })
    }
}
