//! Position-aware semantic analysis over the MPSL tree: a generic walker
//! with pluggable listeners, and the completion/hover analyses built on it.

mod completion;
mod groups;
mod hover;
mod walker;


pub use completion::CompletionAnalyzer;
pub use groups::{exposed_members, resolve_builtin_chain, GroupMembers, GroupTable};
pub use hover::HoverAnalyzer;
pub use walker::{Listener, Node, WalkContext, Walker};

use std::path::Path;

use mpsl_core::ast::Stmt;
use mpsl_core::token::Token;

/// Runs a completion walk over `statements` with the cursor at byte offset
/// `cursor`. `file` anchors relative `use` imports.
pub fn collect_completions(
    file: Option<&Path>,
    statements: &[Stmt],
    cursor: usize,
) -> CompletionAnalyzer {
    let mut analyzer = CompletionAnalyzer::new(cursor);
    let mut walker = Walker::new(file.map(Path::to_path_buf));
    walker.walk(statements, &mut analyzer);
    analyzer
}

/// Runs a hover walk over `statements` for the given token.
pub fn resolve_hover(file: Option<&Path>, statements: &[Stmt], token: Token) -> Option<String> {
    let mut analyzer = HoverAnalyzer::new(token);
    let mut walker = Walker::new(file.map(Path::to_path_buf));
    walker.walk(statements, &mut analyzer);
    analyzer.into_text()
}
