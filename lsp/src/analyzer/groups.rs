use std::collections::HashMap;

use mpsl_core::ast::{Expr, GroupDecl, Stmt};
use mpsl_core::token::Token;
use mpsl_stdlib::Group;

/// Group declarations collected during a walk, keyed by bare name. Each
/// entry remembers whether the declaration was seen while importing, since
/// that decides public-only filtering when the group is later resolved.
/// Duplicate names at the same level: last declaration wins.
#[derive(Default)]
pub struct GroupTable {
    groups: HashMap<String, GroupEntry>,
}

struct GroupEntry {
    used: bool,
    decl: GroupDecl,
}

impl GroupTable {
    pub fn insert(&mut self, used: bool, decl: GroupDecl) {
        let name = decl.name.lexeme.clone();
        self.groups.insert(name, GroupEntry { used, decl });
    }

    /// Walks a fully-qualified chain of user-declared group names down to
    /// the declaration it denotes. The returned flag is true when the root
    /// of the chain came from an imported file.
    pub fn resolve(&self, chain: &[&str]) -> Option<(bool, &GroupDecl)> {
        let entry = self.groups.get(*chain.first()?)?;
        let mut decl = &entry.decl;
        for name in &chain[1..] {
            decl = find_nested(decl, name)?;
        }
        Some((entry.used, decl))
    }
}

/// Scans a group body for a directly nested group declaration, looking
/// through `public` wrappers. Last declaration wins.
fn find_nested<'a>(decl: &'a GroupDecl, name: &str) -> Option<&'a GroupDecl> {
    let mut found = None;
    for stmt in &decl.body.statements {
        if let Stmt::GroupDeclaration(g) = unwrap_public(stmt) {
            if g.name.lexeme == name {
                found = Some(g);
            }
        }
    }
    found
}

fn unwrap_public(stmt: &Stmt) -> &Stmt {
    match stmt {
        Stmt::Public(p) => &p.inner,
        other => other,
    }
}

/// Follows a chain through the built-in registry's nested-group lookup.
/// `None` on a miss at any step.
pub fn resolve_builtin_chain(chain: &[&str]) -> Option<&'static Group> {
    let mut group = mpsl_stdlib::lookup_group(chain.first()?)?;
    for name in &chain[1..] {
        group = group.group(name)?;
    }
    Some(group)
}

/// The members a group declaration exposes at its top level.
#[derive(Default)]
pub struct GroupMembers {
    pub variables: Vec<Token>,
    pub functions: Vec<(Token, Vec<String>)>,
    pub groups: Vec<Token>,
}

/// Collects a group's directly declared members. With `public_only` set,
/// declarations not wrapped in `public` are dropped; this is how imported
/// groups hide their private members.
pub fn exposed_members(decl: &GroupDecl, public_only: bool) -> GroupMembers {
    let mut members = GroupMembers::default();
    for stmt in &decl.body.statements {
        let (stmt, is_public) = match stmt {
            Stmt::Public(p) => (p.inner.as_ref(), true),
            other => (other, false),
        };
        if public_only && !is_public {
            continue;
        }
        match stmt {
            Stmt::Expression(e) => match &e.expression {
                Expr::Assign { target, .. } => {
                    if let Expr::VariableDeclaration { name, .. } = target.as_ref() {
                        members.variables.push(name.clone());
                    }
                }
                Expr::VariableDeclaration { name, .. } => {
                    members.variables.push(name.clone());
                }
                _ => {}
            },
            Stmt::FunctionDeclaration(f) => {
                let parameters = f.parameters.iter().map(|p| p.lexeme.clone()).collect();
                members.functions.push((f.name.clone(), parameters));
            }
            Stmt::GroupDeclaration(g) => {
                members.groups.push(g.name.clone());
            }
            _ => {}
        }
    }
    members
}
