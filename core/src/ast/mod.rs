mod parser;
#[cfg(test)]
mod parser_test;

pub use parser::Parser;

use crate::token::{Token, TokenKind};

/// A sequence of statements delimited either by braces or by `=>` for a
/// single-statement body. `start`/`end` span the opening token through the
/// closing brace (or the end of the lone statement).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub open: Token,
    pub statements: Vec<Stmt>,
    pub start: usize,
    pub end: usize,
}

impl Block {
    pub fn is_braced(&self) -> bool {
        self.open.kind == TokenKind::CurlyLeft
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub parameters: Vec<Token>,
    pub body: Block,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EachStmt {
    pub variable: Token,
    pub iterable: Expr,
    pub body: Block,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    /// `if` plus any `else if` arms, in source order.
    pub branches: Vec<(Expr, Block)>,
    pub else_block: Option<Block>,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expression: Expr,
    pub start: usize,
    pub end: usize,
}

/// `use "path";` imports a file; `use name;` references a built-in group.
#[derive(Debug, Clone, PartialEq)]
pub struct UseStmt {
    pub target: Token,
    pub start: usize,
    pub end: usize,
}

impl UseStmt {
    /// The import path for a file-import form, `None` for a built-in
    /// group reference.
    pub fn path(&self) -> Option<String> {
        self.target.string_value()
    }

    pub fn is_builtin_reference(&self) -> bool {
        self.target.kind == TokenKind::Identifier
    }
}

/// Marks the wrapped declaration as visible to importers of this file.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicStmt {
    pub inner: Box<Stmt>,
    pub start: usize,
    pub end: usize,
}

/// A named, lexically nested scope: `group Name { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDecl {
    pub name: Token,
    pub body: Block,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    FunctionDeclaration(FunctionDecl),
    Each(EachStmt),
    If(IfStmt),
    While(WhileStmt),
    Expression(ExprStmt),
    Use(UseStmt),
    Public(PublicStmt),
    GroupDeclaration(GroupDecl),
}

impl Stmt {
    pub fn start(&self) -> usize {
        match self {
            Stmt::FunctionDeclaration(s) => s.start,
            Stmt::Each(s) => s.start,
            Stmt::If(s) => s.start,
            Stmt::While(s) => s.start,
            Stmt::Expression(s) => s.start,
            Stmt::Use(s) => s.start,
            Stmt::Public(s) => s.start,
            Stmt::GroupDeclaration(s) => s.start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Stmt::FunctionDeclaration(s) => s.end,
            Stmt::Each(s) => s.end,
            Stmt::If(s) => s.end,
            Stmt::While(s) => s.end,
            Stmt::Expression(s) => s.end,
            Stmt::Use(s) => s.end,
            Stmt::Public(s) => s.end,
            Stmt::GroupDeclaration(s) => s.end,
        }
    }
}

/// How a member is selected in an access expression: `obj.name` or
/// `obj[index]`.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessMember {
    Name(Token),
    Index(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Block(Block),
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        start: usize,
        end: usize,
    },
    VariableDeclaration {
        name: Token,
        start: usize,
        end: usize,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        start: usize,
        end: usize,
    },
    Access {
        object: Box<Expr>,
        member: AccessMember,
        start: usize,
        end: usize,
    },
    Array {
        elements: Vec<Expr>,
        start: usize,
        end: usize,
    },
    Binary {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
        start: usize,
        end: usize,
    },
    Grouping {
        inner: Box<Expr>,
        start: usize,
        end: usize,
    },
    InterpolatedString {
        /// Literal text runs and embedded expressions, in source order.
        parts: Vec<Expr>,
        start: usize,
        end: usize,
    },
    Match {
        subject: Box<Expr>,
        arms: Vec<(Expr, Expr)>,
        start: usize,
        end: usize,
    },
    Object {
        entries: Vec<(Token, Expr)>,
        start: usize,
        end: usize,
    },
    Push {
        value: Box<Expr>,
        target: Box<Expr>,
        start: usize,
        end: usize,
    },
    Unary {
        op: Token,
        operand: Box<Expr>,
        start: usize,
        end: usize,
    },
    /// A `::`-delimited qualified chain, e.g. `math::random::next`.
    GroupAccess {
        names: Vec<Token>,
        start: usize,
        end: usize,
    },
    Literal {
        value: Token,
        start: usize,
        end: usize,
    },
    Variable {
        name: Token,
        start: usize,
        end: usize,
    },
}

impl Expr {
    pub fn start(&self) -> usize {
        match self {
            Expr::Block(b) => b.start,
            Expr::Assign { start, .. }
            | Expr::VariableDeclaration { start, .. }
            | Expr::Call { start, .. }
            | Expr::Access { start, .. }
            | Expr::Array { start, .. }
            | Expr::Binary { start, .. }
            | Expr::Grouping { start, .. }
            | Expr::InterpolatedString { start, .. }
            | Expr::Match { start, .. }
            | Expr::Object { start, .. }
            | Expr::Push { start, .. }
            | Expr::Unary { start, .. }
            | Expr::GroupAccess { start, .. }
            | Expr::Literal { start, .. }
            | Expr::Variable { start, .. } => *start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Expr::Block(b) => b.end,
            Expr::Assign { end, .. }
            | Expr::VariableDeclaration { end, .. }
            | Expr::Call { end, .. }
            | Expr::Access { end, .. }
            | Expr::Array { end, .. }
            | Expr::Binary { end, .. }
            | Expr::Grouping { end, .. }
            | Expr::InterpolatedString { end, .. }
            | Expr::Match { end, .. }
            | Expr::Object { end, .. }
            | Expr::Push { end, .. }
            | Expr::Unary { end, .. }
            | Expr::GroupAccess { end, .. }
            | Expr::Literal { end, .. }
            | Expr::Variable { end, .. } => *end,
        }
    }
}
