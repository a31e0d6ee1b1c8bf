pub mod parents;
pub mod scopes;
pub mod symbols;
pub mod binder;
pub mod checker;


use crate::error::{CompileError, Stage};
use crate::session::Session;
use crate::syntax::ast::{AstArena, Expr, ExprKind, NodeId, NodeKind};
use crate::syntax::visit::walk;
use binder::SymbolBinder;
use checker::TypeChecker;
use parents::ParentLinker;

pub use scopes::{ScopeId, ScopeTable};
pub use symbols::{SymbolId, SymbolTable};

// ─── Entry points ────────────────────────────────────────────────────────────

/// Full resolver pipeline over the subtree rooted at `root`:
/// 1. ParentLinker: record every node's parent
/// 2. SymbolBinder: open scopes, register bindings, bind identifiers
/// 3. TypeChecker: assign and check every expression type
///
/// Stops after a pass that leaves an error behind. The returned error carries
/// only the diagnostics reported during this call.
#[tracing::instrument(level = "trace", skip_all)]
pub fn resolve(session: &mut Session, root: NodeId) -> Result<(), CompileError> {
    let first = session.diagnostics.len();

    // ── Pass 1: parents ──────────────────────────────────────────────────────
    walk(&mut ParentLinker::new(&mut session.ast), root);
    audit(&session.ast, root, Audit::Parents);

    // ── Pass 2: symbols ──────────────────────────────────────────────────────
    walk(&mut SymbolBinder::new(session), root);
    if session.diagnostics.has_errors() {
        return Err(failure(session, Stage::Resolve, first));
    }
    audit(&session.ast, root, Audit::Bound);

    // ── Pass 3: types ────────────────────────────────────────────────────────
    walk(&mut TypeChecker::new(session), root);
    if session.diagnostics.has_errors() {
        return Err(failure(session, Stage::TypeCheck, first));
    }
    audit(&session.ast, root, Audit::Typed);

    tracing::debug!(symbols = session.symbols.len(), scopes = session.scopes.len(), "resolved");
    Ok(())
}

/// Resolves a node parsed after the module, e.g. one REPL statement, as if it
/// appeared under `parent`. Earlier errors do not block this run.
pub fn resolve_subtree(session: &mut Session, parent: NodeId, node: NodeId) -> Result<(), CompileError> {
    let slot = &mut session.ast.get_mut(node).parent;
    if slot.is_none() {
        *slot = Some(parent);
    }
    session.diagnostics.reset_watermark();
    resolve(session, node)
}

fn failure(session: &Session, stage: Stage, first: usize) -> CompileError {
    let diagnostics = session.diagnostics.iter().skip(first).cloned().collect();
    CompileError::Stage { stage, diagnostics }
}

// ─── Pass boundary checks ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Audit {
    Parents,
    Bound,
    Typed,
}

/// Debug builds only: asserts the fields a pass promises to fill are filled.
fn audit(ast: &AstArena, root: NodeId, what: Audit) {
    if !cfg!(debug_assertions) {
        return;
    }
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let node = ast.get(id);
        match (what, &node.kind) {
            (Audit::Parents, _) => {
                debug_assert!(id == root || node.parent.is_some(), "node {id} has no parent");
            }
            (Audit::Bound, NodeKind::Let(decl)) => {
                debug_assert!(decl.name.symbol.is_some(), "let {id} is not bound");
            }
            (Audit::Bound, NodeKind::Extern(decl)) => {
                debug_assert!(decl.name.symbol.is_some(), "extern {id} is not bound");
            }
            (Audit::Bound, NodeKind::Expr(Expr { kind: ExprKind::Ident(ident), .. })) => {
                debug_assert!(ident.symbol.is_some(), "identifier {id} is not bound");
            }
            (Audit::Typed, NodeKind::Let(decl)) => {
                debug_assert!(decl.ty.is_some(), "let {id} is not typed");
            }
            (Audit::Typed, NodeKind::Expr(expr)) => {
                debug_assert!(expr.ty.is_some(), "expression {id} is not typed");
            }
            _ => {}
        }
        stack.extend(ast.children(id));
    }
}
