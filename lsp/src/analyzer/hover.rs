use mpsl_core::ast::{EachStmt, Expr, FunctionDecl, GroupDecl, PublicStmt, Stmt, UseStmt};
use mpsl_core::token::Token;

use crate::analyzer::groups::{self, GroupTable};
use crate::analyzer::walker::{Listener, Node, WalkContext};

/// Resolves a hover text for one token. First write wins, except that a
/// group-declaration match stays tentative: the walk continues so a later
/// group access qualifying the same name can take over.
pub struct HoverAnalyzer {
    token: Token,
    hover: Option<String>,
    tentative: bool,
    groups: GroupTable,
    declaring_public: bool,
}

impl HoverAnalyzer {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            hover: None,
            tentative: false,
            groups: GroupTable::default(),
            declaring_public: false,
        }
    }

    pub fn into_text(self) -> Option<String> {
        self.hover
    }

    fn set(&mut self, text: String) {
        if self.hover.is_none() || self.tentative {
            self.hover = Some(text);
            self.tentative = false;
        }
    }

    fn set_tentative(&mut self, text: String) {
        if self.hover.is_none() {
            self.hover = Some(text);
            self.tentative = true;
        }
    }

    fn resolved(&self) -> bool {
        self.hover.is_some() && !self.tentative
    }

    /// Matches the token against one group's exposed members.
    fn match_member(&mut self, decl: &GroupDecl, public_only: bool) {
        let members = groups::exposed_members(decl, public_only);
        if members.groups.iter().any(|g| g.lexeme == self.token.lexeme) {
            self.set(format!("(group) {}", self.token.lexeme));
        } else if let Some((name, parameters)) = members
            .functions
            .iter()
            .find(|(name, _)| name.lexeme == self.token.lexeme)
        {
            self.set(format!("fn {}({})", name.lexeme, parameters.join(", ")));
        } else if members.variables.iter().any(|v| v.lexeme == self.token.lexeme) {
            self.set(format!("(variable) {}", self.token.lexeme));
        }
    }
}

impl Listener for HoverAnalyzer {
    fn should_accept(&self, node: Node<'_>, ctx: &WalkContext) -> bool {
        if ctx.in_used_file() {
            // Imported bodies never leak local names, and an imported
            // file's qualified chains carry spans from that file, so they
            // can never enclose the live token.
            if matches!(node, Node::Block(_) | Node::Expr(Expr::GroupAccess { .. })) {
                return false;
            }
            if matches!(
                node,
                Node::Stmt(
                    Stmt::Expression(_) | Stmt::FunctionDeclaration(_) | Stmt::GroupDeclaration(_)
                )
            ) {
                return self.declaring_public && !self.resolved();
            }
            return !self.resolved();
        }

        // Past the token with a result in hand, no more specific match is
        // still possible.
        if self.resolved() && node.start() > self.token.end {
            return false;
        }
        // Only the group access enclosing the token matters.
        if let Node::Expr(Expr::GroupAccess { start, end, .. }) = node {
            return self.token.start >= *start && self.token.start < *end;
        }
        // Inside a group body, stay on the path toward the token.
        if !ctx.group_scope().is_empty()
            && !(node.start() <= self.token.start && self.token.start < node.end())
        {
            return false;
        }
        true
    }

    fn visit_public(&mut self, _stmt: &PublicStmt, _ctx: &WalkContext) {
        self.declaring_public = true;
    }

    fn visit_variable_declaration(&mut self, name: &Token, _ctx: &WalkContext) {
        if name.lexeme == self.token.lexeme {
            self.set(format!("(variable) {}", self.token.lexeme));
        }
        self.declaring_public = false;
    }

    fn visit_function_declaration(&mut self, stmt: &FunctionDecl, _ctx: &WalkContext) {
        self.declaring_public = false;
        if stmt.name.lexeme == self.token.lexeme {
            let parameters: Vec<&str> = stmt.parameters.iter().map(|p| p.lexeme.as_str()).collect();
            self.set(format!("fn {}({})", self.token.lexeme, parameters.join(", ")));
            return;
        }
        if stmt.parameters.iter().any(|p| p.lexeme == self.token.lexeme) {
            self.set(format!("(parameter) {}", self.token.lexeme));
        }
    }

    fn visit_each(&mut self, stmt: &EachStmt, _ctx: &WalkContext) {
        if stmt.variable.lexeme == self.token.lexeme {
            self.set(format!("(variable) {}", self.token.lexeme));
        }
    }

    fn visit_group_declaration(&mut self, decl: &GroupDecl, ctx: &WalkContext) {
        self.groups.insert(ctx.in_used_file(), decl.clone());
        self.declaring_public = false;
        if decl.name.lexeme == self.token.lexeme {
            self.set_tentative(format!("(group) {}", self.token.lexeme));
        }
    }

    fn visit_group_access(&mut self, names: &[Token], _start: usize, _end: usize, ctx: &WalkContext) {
        // Qualify only with the chain segments written before the token, so
        // hovering `B` in `A::B::C` resolves against `A`, not `C`.
        let prefix: Vec<&str> = names
            .iter()
            .take_while(|name| name.end < self.token.start)
            .map(|name| name.lexeme.as_str())
            .collect();

        if prefix.is_empty() {
            if mpsl_stdlib::lookup_group(&self.token.lexeme).is_some() {
                self.set(format!("(group) {}", self.token.lexeme));
            }
            return;
        }

        if let Some(group) = groups::resolve_builtin_chain(&prefix) {
            if group.group(&self.token.lexeme).is_some() {
                self.set(format!("(group) {}", self.token.lexeme));
            } else if let Some(parameters) = group.function_parameters(&self.token.lexeme) {
                self.set(format!("fn {}({})", self.token.lexeme, parameters.join(", ")));
            } else if group.has_variable(&self.token.lexeme) {
                self.set(format!("(variable) {}", self.token.lexeme));
            }
            return;
        }

        let mut scope: Vec<&str> = ctx.group_scope().iter().map(String::as_str).collect();
        loop {
            let full: Vec<&str> = scope.iter().chain(prefix.iter()).copied().collect();
            if let Some((used, decl)) = self.groups.resolve(&full) {
                let decl = decl.clone();
                self.match_member(&decl, used);
                return;
            }
            if scope.pop().is_none() {
                return;
            }
        }
    }

    fn use_statement_visited(&mut self, stmt: &UseStmt, _ctx: &WalkContext) {
        if stmt.is_builtin_reference()
            && stmt.target.lexeme == self.token.lexeme
            && mpsl_stdlib::lookup_group(&stmt.target.lexeme).is_some()
        {
            self.set(format!("(group) {}", self.token.lexeme));
        }
    }

    fn file_visited(&mut self, ctx: &WalkContext) {
        if ctx.in_used_file() || self.hover.is_some() {
            return;
        }
        let key = self.token.lexeme.strip_prefix('@').unwrap_or(&self.token.lexeme);
        if let Some(parameters) = mpsl_stdlib::native_function(key) {
            self.hover = Some(format!("{}({})", self.token.lexeme, parameters.join(", ")));
        }
    }
}
