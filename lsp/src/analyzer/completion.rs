use std::path::Path;

use mpsl_core::ast::{EachStmt, Expr, FunctionDecl, GroupDecl, PublicStmt, Stmt, UseStmt};
use mpsl_core::token::Token;

use crate::analyzer::groups::{self, GroupTable};
use crate::analyzer::walker::{Listener, Node, WalkContext, Walker};
use crate::protocol::{CompletionItem, CompletionItemKind};

/// Collects the names completable at a cursor offset. Driven by the walker;
/// the caller reads `items` plus the `in_function_parameter_list` signal
/// afterwards.
pub struct CompletionAnalyzer {
    cursor: usize,
    /// Forces imported-file treatment even at use depth zero. Set for the
    /// bounded re-walk of a group body that was itself declared in an
    /// imported file.
    used: bool,
    items: Vec<CompletionItem>,
    groups: GroupTable,
    declaring_public: bool,
    in_group_access: bool,
    in_function_parameter_list: bool,
}

impl CompletionAnalyzer {
    pub fn new(cursor: usize) -> Self {
        Self::bounded(cursor, false)
    }

    fn bounded(cursor: usize, used: bool) -> Self {
        Self {
            cursor,
            used,
            items: Vec::new(),
            groups: GroupTable::default(),
            declaring_public: false,
            in_group_access: false,
            in_function_parameter_list: false,
        }
    }

    pub fn items(&self) -> &[CompletionItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CompletionItem> {
        self.items
    }

    /// True when the cursor sits between a function's name and its body,
    /// i.e. inside the parameter list being typed.
    pub fn in_function_parameter_list(&self) -> bool {
        self.in_function_parameter_list
    }

    fn in_used_file(&self, ctx: &WalkContext) -> bool {
        self.used || ctx.in_used_file()
    }

    /// Effective cursor for gating. Inside imported files the cursor is
    /// pushed past every span so position-based gates never match.
    fn index(&self, ctx: &WalkContext) -> usize {
        if self.in_used_file(ctx) {
            usize::MAX
        } else {
            self.cursor
        }
    }

    /// Resolves a fully-qualified user group chain and collects what its
    /// body offers, by re-walking the body with a fresh analyzer bounded to
    /// the group's end offset. Empty when the chain does not resolve.
    fn group_items(&self, chain: &[&str], ctx: &WalkContext) -> Vec<CompletionItem> {
        let Some((used, decl)) = self.groups.resolve(chain) else {
            return Vec::new();
        };
        let mut analyzer = CompletionAnalyzer::bounded(decl.end, used);
        let mut walker = Walker::new(ctx.current_file().map(Path::to_path_buf));
        walker.walk(&decl.body.statements, &mut analyzer);
        analyzer.items
    }
}

impl Listener for CompletionAnalyzer {
    fn should_accept(&self, node: Node<'_>, ctx: &WalkContext) -> bool {
        // A resolved group access supersedes ordinary scope collection.
        if self.in_group_access {
            return false;
        }

        if self.in_used_file(ctx) {
            match node {
                // Imported bodies never leak local names.
                Node::Block(_) => return false,
                Node::Stmt(
                    Stmt::Expression(_) | Stmt::FunctionDeclaration(_) | Stmt::GroupDeclaration(_),
                ) => return self.declaring_public,
                _ => {}
            }
        }

        let index = self.index(ctx);
        match node {
            Node::Block(b) => {
                // Arrow-form bodies close one offset later than their span.
                let close = b.end + if b.is_braced() { 0 } else { 1 };
                index >= b.start && index < close
            }
            Node::Stmt(Stmt::Each(e)) => {
                if index < e.body.start || (e.body.is_braced() && index >= e.body.end) {
                    return false;
                }
                index <= e.body.end
            }
            Node::Expr(Expr::GroupAccess { start, end, .. }) => index >= *start && index <= *end,
            Node::Stmt(Stmt::GroupDeclaration(g)) => index >= g.body.start,
            _ => true,
        }
    }

    fn visit_public(&mut self, _stmt: &PublicStmt, _ctx: &WalkContext) {
        self.declaring_public = true;
    }

    fn visit_variable_declaration(&mut self, name: &Token, _ctx: &WalkContext) {
        self.items
            .push(CompletionItem::new(name.lexeme.as_str(), CompletionItemKind::Variable));
        self.declaring_public = false;
    }

    fn visit_function_declaration(&mut self, stmt: &FunctionDecl, ctx: &WalkContext) {
        self.items
            .push(CompletionItem::new(stmt.name.lexeme.as_str(), CompletionItemKind::Function));
        self.declaring_public = false;

        let index = self.index(ctx);
        let close = stmt.body.end - if stmt.body.is_braced() { 1 } else { 0 };
        if index >= stmt.body.start && index <= close {
            for parameter in &stmt.parameters {
                self.items
                    .push(CompletionItem::new(parameter.lexeme.as_str(), CompletionItemKind::Variable));
            }
        }

        if index > stmt.name.end && index <= stmt.body.start {
            self.in_function_parameter_list = true;
        }
    }

    fn visit_each(&mut self, stmt: &EachStmt, _ctx: &WalkContext) {
        self.items
            .push(CompletionItem::new(stmt.variable.lexeme.as_str(), CompletionItemKind::Variable));
    }

    fn visit_group_declaration(&mut self, decl: &GroupDecl, ctx: &WalkContext) {
        self.groups.insert(self.in_used_file(ctx), decl.clone());
        self.declaring_public = false;
        self.items
            .push(CompletionItem::new(decl.name.lexeme.as_str(), CompletionItemKind::Module));
    }

    fn visit_group_access(&mut self, names: &[Token], _start: usize, _end: usize, ctx: &WalkContext) {
        self.in_group_access = true;
        let chain: Vec<&str> = names.iter().map(|t| t.lexeme.as_str()).collect();
        let Some(first) = chain.first() else {
            self.items.clear();
            return;
        };

        if mpsl_stdlib::lookup_group(first).is_some() {
            let Some(group) = groups::resolve_builtin_chain(&chain) else {
                self.items.clear();
                return;
            };
            self.items = group
                .variables()
                .map(|name| CompletionItem::new(name, CompletionItemKind::Variable))
                .chain(
                    group
                        .functions()
                        .map(|(name, _)| CompletionItem::new(name, CompletionItemKind::Function)),
                )
                .chain(group.groups().map(|name| CompletionItem::new(name, CompletionItemKind::Module)))
                .collect();
            return;
        }

        // Closest-enclosing-scope-first: qualify with the full scope stack,
        // then strip one level from its end per retry.
        let mut scope: Vec<&str> = ctx.group_scope().iter().map(String::as_str).collect();
        loop {
            let full: Vec<&str> = scope.iter().chain(chain.iter()).copied().collect();
            let items = self.group_items(&full, ctx);
            if !items.is_empty() || scope.pop().is_none() {
                self.items = items;
                return;
            }
        }
    }

    fn use_statement_visited(&mut self, stmt: &UseStmt, _ctx: &WalkContext) {
        if stmt.is_builtin_reference() && mpsl_stdlib::lookup_group(&stmt.target.lexeme).is_some() {
            self.items
                .push(CompletionItem::new(stmt.target.lexeme.as_str(), CompletionItemKind::Module));
        }
    }
}
