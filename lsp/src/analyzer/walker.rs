use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use mpsl_core::ast::{
    AccessMember, Block, EachStmt, Expr, ExprStmt, FunctionDecl, GroupDecl, IfStmt, PublicStmt,
    Stmt, UseStmt, WhileStmt,
};
use mpsl_core::token::Token;

/// Any tree node a listener can gate on. Blocks get their own arm because
/// both analyzers treat statement bodies and block expressions uniformly.
#[derive(Clone, Copy)]
pub enum Node<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Block(&'a Block),
}

impl Node<'_> {
    pub fn start(&self) -> usize {
        match self {
            Node::Stmt(s) => s.start(),
            Node::Expr(e) => e.start(),
            Node::Block(b) => b.start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Node::Stmt(s) => s.end(),
            Node::Expr(e) => e.end(),
            Node::Block(b) => b.end,
        }
    }
}

/// Traversal-local scope state. Created fresh per walk and discarded at the
/// end; nothing here survives across requests.
#[derive(Default)]
pub struct WalkContext {
    use_depth: u32,
    group_scope: Vec<String>,
    imported: HashSet<PathBuf>,
    file_stack: Vec<PathBuf>,
}

impl WalkContext {
    /// True while the walker is inside a file pulled in through `use`.
    pub fn in_used_file(&self) -> bool {
        self.use_depth > 0
    }

    /// Ordered chain of enclosing group names at the current position.
    pub fn group_scope(&self) -> &[String] {
        &self.group_scope
    }

    /// The file whose statements are currently being walked, if known.
    pub fn current_file(&self) -> Option<&Path> {
        self.file_stack.last().map(PathBuf::as_path)
    }
}

/// One callback per node variant, plus the gate and the subtree-exit hooks.
/// Every callback defaults to a no-op so analyzers implement only what they
/// observe.
pub trait Listener {
    fn should_accept(&self, _node: Node<'_>, _ctx: &WalkContext) -> bool {
        true
    }

    fn visit_function_declaration(&mut self, _stmt: &FunctionDecl, _ctx: &WalkContext) {}
    fn visit_each(&mut self, _stmt: &EachStmt, _ctx: &WalkContext) {}
    fn visit_if(&mut self, _stmt: &IfStmt, _ctx: &WalkContext) {}
    fn visit_while(&mut self, _stmt: &WhileStmt, _ctx: &WalkContext) {}
    fn visit_expression_statement(&mut self, _stmt: &ExprStmt, _ctx: &WalkContext) {}
    fn visit_use(&mut self, _stmt: &UseStmt, _ctx: &WalkContext) {}
    fn visit_public(&mut self, _stmt: &PublicStmt, _ctx: &WalkContext) {}
    fn visit_group_declaration(&mut self, _decl: &GroupDecl, _ctx: &WalkContext) {}

    fn visit_block(&mut self, _block: &Block, _ctx: &WalkContext) {}
    fn visit_assign(&mut self, _target: &Expr, _value: &Expr, _ctx: &WalkContext) {}
    fn visit_variable_declaration(&mut self, _name: &Token, _ctx: &WalkContext) {}
    fn visit_call(&mut self, _callee: &Expr, _arguments: &[Expr], _ctx: &WalkContext) {}
    fn visit_access(&mut self, _object: &Expr, _member: &AccessMember, _ctx: &WalkContext) {}
    fn visit_array(&mut self, _elements: &[Expr], _ctx: &WalkContext) {}
    fn visit_binary(&mut self, _left: &Expr, _op: &Token, _right: &Expr, _ctx: &WalkContext) {}
    fn visit_grouping(&mut self, _inner: &Expr, _ctx: &WalkContext) {}
    fn visit_interpolated_string(&mut self, _parts: &[Expr], _ctx: &WalkContext) {}
    fn visit_match(&mut self, _subject: &Expr, _arms: &[(Expr, Expr)], _ctx: &WalkContext) {}
    fn visit_object(&mut self, _entries: &[(Token, Expr)], _ctx: &WalkContext) {}
    fn visit_push(&mut self, _value: &Expr, _target: &Expr, _ctx: &WalkContext) {}
    fn visit_unary(&mut self, _op: &Token, _operand: &Expr, _ctx: &WalkContext) {}
    fn visit_group_access(&mut self, _names: &[Token], _start: usize, _end: usize, _ctx: &WalkContext) {}
    fn visit_literal(&mut self, _value: &Token, _ctx: &WalkContext) {}
    fn visit_variable(&mut self, _name: &Token, _ctx: &WalkContext) {}

    /// Fires after a `use` statement has been fully resolved (or skipped).
    fn use_statement_visited(&mut self, _stmt: &UseStmt, _ctx: &WalkContext) {}
    /// Fires after a group's body has been walked, before its scope pops.
    fn group_declaration_visited(&mut self, _decl: &GroupDecl, _ctx: &WalkContext) {}
    /// Fires once the top-level statement list has been exhausted.
    fn file_visited(&mut self, _ctx: &WalkContext) {}
}

/// Depth-first traversal engine. Asks the listener's gate before every node,
/// including nested children, so returning false once prunes a whole subtree.
pub struct Walker {
    ctx: WalkContext,
}

impl Walker {
    pub fn new(file: Option<PathBuf>) -> Self {
        let mut ctx = WalkContext::default();
        if let Some(file) = file {
            ctx.file_stack.push(file);
        }
        Self { ctx }
    }

    pub fn walk<L: Listener>(&mut self, statements: &[Stmt], listener: &mut L) {
        for stmt in statements {
            self.accept_stmt(stmt, listener);
        }
        listener.file_visited(&self.ctx);
    }

    fn accept_stmt<L: Listener>(&mut self, stmt: &Stmt, listener: &mut L) {
        if !listener.should_accept(Node::Stmt(stmt), &self.ctx) {
            return;
        }
        match stmt {
            Stmt::FunctionDeclaration(f) => {
                listener.visit_function_declaration(f, &self.ctx);
                self.accept_block(&f.body, listener);
            }
            Stmt::Each(e) => {
                listener.visit_each(e, &self.ctx);
                self.accept_expr(&e.iterable, listener);
                self.accept_block(&e.body, listener);
            }
            Stmt::If(i) => {
                listener.visit_if(i, &self.ctx);
                for (condition, block) in &i.branches {
                    self.accept_expr(condition, listener);
                    self.accept_block(block, listener);
                }
                if let Some(block) = &i.else_block {
                    self.accept_block(block, listener);
                }
            }
            Stmt::While(w) => {
                listener.visit_while(w, &self.ctx);
                self.accept_expr(&w.condition, listener);
                self.accept_block(&w.body, listener);
            }
            Stmt::Expression(e) => {
                listener.visit_expression_statement(e, &self.ctx);
                self.accept_expr(&e.expression, listener);
            }
            Stmt::Use(u) => {
                listener.visit_use(u, &self.ctx);
                self.resolve_use(u, listener);
            }
            Stmt::Public(p) => {
                listener.visit_public(p, &self.ctx);
                self.accept_stmt(&p.inner, listener);
            }
            Stmt::GroupDeclaration(g) => {
                listener.visit_group_declaration(g, &self.ctx);
                self.ctx.group_scope.push(g.name.lexeme.clone());
                self.accept_block(&g.body, listener);
                listener.group_declaration_visited(g, &self.ctx);
                self.ctx.group_scope.pop();
            }
        }
    }

    fn accept_block<L: Listener>(&mut self, block: &Block, listener: &mut L) {
        if !listener.should_accept(Node::Block(block), &self.ctx) {
            return;
        }
        listener.visit_block(block, &self.ctx);
        for stmt in &block.statements {
            self.accept_stmt(stmt, listener);
        }
    }

    fn accept_expr<L: Listener>(&mut self, expr: &Expr, listener: &mut L) {
        if let Expr::Block(b) = expr {
            return self.accept_block(b, listener);
        }
        if !listener.should_accept(Node::Expr(expr), &self.ctx) {
            return;
        }
        match expr {
            Expr::Block(_) => {}
            Expr::Assign { target, value, .. } => {
                listener.visit_assign(target, value, &self.ctx);
                self.accept_expr(target, listener);
                self.accept_expr(value, listener);
            }
            Expr::VariableDeclaration { name, .. } => {
                listener.visit_variable_declaration(name, &self.ctx);
            }
            Expr::Call { callee, arguments, .. } => {
                listener.visit_call(callee, arguments, &self.ctx);
                self.accept_expr(callee, listener);
                for argument in arguments {
                    self.accept_expr(argument, listener);
                }
            }
            Expr::Access { object, member, .. } => {
                listener.visit_access(object, member, &self.ctx);
                self.accept_expr(object, listener);
                if let AccessMember::Index(index) = member {
                    self.accept_expr(index, listener);
                }
            }
            Expr::Array { elements, .. } => {
                listener.visit_array(elements, &self.ctx);
                for element in elements {
                    self.accept_expr(element, listener);
                }
            }
            Expr::Binary { left, op, right, .. } => {
                listener.visit_binary(left, op, right, &self.ctx);
                self.accept_expr(left, listener);
                self.accept_expr(right, listener);
            }
            Expr::Grouping { inner, .. } => {
                listener.visit_grouping(inner, &self.ctx);
                self.accept_expr(inner, listener);
            }
            Expr::InterpolatedString { parts, .. } => {
                listener.visit_interpolated_string(parts, &self.ctx);
                for part in parts {
                    self.accept_expr(part, listener);
                }
            }
            Expr::Match { subject, arms, .. } => {
                listener.visit_match(subject, arms, &self.ctx);
                self.accept_expr(subject, listener);
                for (pattern, value) in arms {
                    self.accept_expr(pattern, listener);
                    self.accept_expr(value, listener);
                }
            }
            Expr::Object { entries, .. } => {
                listener.visit_object(entries, &self.ctx);
                for (_, value) in entries {
                    self.accept_expr(value, listener);
                }
            }
            Expr::Push { value, target, .. } => {
                listener.visit_push(value, target, &self.ctx);
                self.accept_expr(value, listener);
                self.accept_expr(target, listener);
            }
            Expr::Unary { op, operand, .. } => {
                listener.visit_unary(op, operand, &self.ctx);
                self.accept_expr(operand, listener);
            }
            Expr::GroupAccess { names, start, end } => {
                listener.visit_group_access(names, *start, *end, &self.ctx);
            }
            Expr::Literal { value, .. } => {
                listener.visit_literal(value, &self.ctx);
            }
            Expr::Variable { name, .. } => {
                listener.visit_variable(name, &self.ctx);
            }
        }
    }

    /// Built-in references only notify; path imports are read, parsed and
    /// walked with the same listener. Missing files and re-imports are
    /// skipped silently so a broken import graph never takes the walk down.
    fn resolve_use<L: Listener>(&mut self, stmt: &UseStmt, listener: &mut L) {
        if !stmt.is_builtin_reference() {
            if let Some(path) = stmt.path() {
                self.walk_import(Path::new(&path), listener);
            }
        }
        listener.use_statement_visited(stmt, &self.ctx);
    }

    fn walk_import<L: Listener>(&mut self, path: &Path, listener: &mut L) {
        let joined = match self.ctx.current_file().and_then(Path::parent) {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        };
        let resolved = joined.canonicalize().unwrap_or(joined);
        if !self.ctx.imported.insert(resolved.clone()) {
            tracing::debug!(path = %resolved.display(), "import already walked, skipping");
            return;
        }
        let text = match fs::read_to_string(&resolved) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(path = %resolved.display(), %err, "import unreadable, skipping");
                return;
            }
        };
        let result = mpsl_core::check(&text);
        self.ctx.use_depth += 1;
        self.ctx.file_stack.push(resolved);
        for stmt in &result.statements {
            self.accept_stmt(stmt, listener);
        }
        self.ctx.file_stack.pop();
        self.ctx.use_depth -= 1;
    }
}
