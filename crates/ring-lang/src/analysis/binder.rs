//! Pass 2: symbol binding.
//!
//! Opens a scope for the module and for every block, registers `extern`,
//! `let` and parameter bindings, and points every identifier at its symbol.
//! Function-valued lets are registered before their body is visited so they
//! may refer to themselves; all other lets only after their initializer.

use crate::analysis::scopes::ScopeId;
use crate::analysis::symbols::{SymbolId, SymbolKind};
use crate::error::ErrorCode;
use crate::intern::NameId;
use crate::session::Session;
use crate::syntax::ast::{AstArena, Expr, ExprKind, NodeId, NodeKind, Span};
use crate::syntax::visit::{Flow, Visitor};
use crate::types::TypeId;

pub struct SymbolBinder<'a> {
    session: &'a mut Session,
}

/// What a node means to the binder, copied out of the arena.
enum Site {
    Scope,
    Block,
    Use(NameId),
    Extern(NameId, TypeId),
    Let { name: NameId, bound: bool, fn_value: bool },
    Ident { name: NameId, bound: bool },
    Other,
}

impl<'a> SymbolBinder<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn site(&self, id: NodeId) -> Site {
        let ast = &self.session.ast;
        match &ast.get(id).kind {
            NodeKind::Module(_) => Site::Scope,
            NodeKind::Use(u) => Site::Use(u.path.name),
            NodeKind::Extern(e) if e.name.symbol.is_none() => Site::Extern(e.name.name, e.ty),
            NodeKind::Let(decl) => Site::Let {
                name: decl.name.name,
                bound: decl.name.symbol.is_some(),
                fn_value: ast.is_fn_literal(decl.value),
            },
            NodeKind::Expr(Expr { kind: ExprKind::Block { .. }, .. }) => Site::Block,
            NodeKind::Expr(Expr { kind: ExprKind::Ident(ident), .. }) => Site::Ident {
                name: ident.name,
                bound: ident.symbol.is_some(),
            },
            _ => Site::Other,
        }
    }

    // ─── Scopes ──────────────────────────────────────────────────────────────

    /// The scope opened by `node`, or by its nearest ancestor that opened one.
    fn nearest_scope(&self, node: NodeId) -> ScopeId {
        let mut current = node;
        loop {
            if let Some(scope) = self.session.scopes.scope_of(current) {
                return scope;
            }
            match self.session.ast.parent(current) {
                Some(parent) => current = parent,
                None => self.session.diagnostics.fatal(
                    self.session.ast.span(node),
                    format!("node {node} has no enclosing scope"),
                ),
            }
        }
    }

    fn open_scope(&mut self, node: NodeId) -> (ScopeId, bool) {
        let parent = self.session.ast.parent(node).map(|p| self.nearest_scope(p));
        self.session.scopes.get_or_create(node, parent)
    }

    fn open_block(&mut self, block: NodeId) {
        let (scope, created) = self.open_scope(block);
        if !created { return; }
        let Some(owner) = self.session.ast.parent(block) else { return };
        let is_fn_body = matches!(
            self.session.ast.expr(owner),
            Some(Expr { kind: ExprKind::Fn { body, .. }, .. }) if *body == block
        );
        if is_fn_body {
            self.seed_params(owner, scope);
        }
    }

    /// Declares one parameter symbol per parameter of `func` in its body scope.
    fn seed_params(&mut self, func: NodeId, scope: ScopeId) {
        let span = self.session.ast.span(func);
        let Some(Expr { ty, kind: ExprKind::Fn { params, .. } }) = self.session.ast.expr(func) else {
            return;
        };
        let Some(fn_ty) = *ty else {
            self.session.diagnostics.fatal(span, "function literal has no type")
        };
        let Some((param_types, _)) = self.session.types.as_func(fn_ty) else {
            self.session.diagnostics.fatal(span, "function literal is not typed as a function")
        };
        if param_types.len() != params.len() {
            self.session.diagnostics.fatal(
                span,
                format!("{} parameters but a type with {}", params.len(), param_types.len()),
            );
        }
        let seeds: Vec<(usize, NameId, TypeId, _)> = params
            .iter()
            .zip(param_types)
            .enumerate()
            .map(|(i, (param, ty))| (i, param.name.name, *ty, param.span))
            .collect();

        for (index, name, ty, param_span) in seeds {
            let Some(symbol) = self.declare(scope, name, Some(func), Some(ty), SymbolKind::Param, param_span)
            else { continue };
            if let Some(Expr { kind: ExprKind::Fn { params, .. }, .. }) = self.session.ast.expr_mut(func) {
                params[index].name.symbol = Some(symbol);
            }
        }
    }

    // ─── Declarations ────────────────────────────────────────────────────────

    /// Adds `name` to `scope`. A name already bound in that scope keeps its
    /// original binding and S003 is reported.
    fn declare(
        &mut self,
        scope: ScopeId,
        name: NameId,
        node: Option<NodeId>,
        ty: Option<TypeId>,
        kind: SymbolKind,
        span: Span,
    ) -> Option<SymbolId> {
        if self.session.scopes.get(scope).get(name).is_some() {
            let message = format!("`{}` is already declared in this scope", self.session.name(name));
            self.session.diagnostics.report(ErrorCode::S003, span, message);
            return None;
        }
        let symbol = self.session.symbols.add(name, scope, node, ty, kind);
        let declared = self.session.scopes.get_mut(scope).declare(name, symbol);
        debug_assert!(declared.is_ok(), "scope {scope} already binds the name");
        tracing::debug!(name = self.session.name(name), %symbol, %scope, ?kind, "declared symbol");
        Some(symbol)
    }

    fn bind_extern(&mut self, id: NodeId, name: NameId, ty: TypeId) {
        let scope = self.nearest_scope(id);
        let span = self.session.ast.span(id);
        let symbol = self.declare(scope, name, Some(id), Some(ty), SymbolKind::Extern, span);
        if let NodeKind::Extern(e) = &mut self.session.ast.get_mut(id).kind {
            e.name.symbol = symbol;
        }
    }

    fn bind_let(&mut self, id: NodeId, name: NameId) {
        let scope = self.nearest_scope(id);
        let span = self.session.ast.span(id);
        let ty = self.session.ast.let_decl(id).and_then(|decl| decl.ty);
        let symbol = self.declare(scope, name, Some(id), ty, SymbolKind::Let, span);
        if let NodeKind::Let(decl) = &mut self.session.ast.get_mut(id).kind {
            decl.name.symbol = symbol;
        }
    }

    /// A function-valued let takes the literal's type when unannotated and
    /// is bound before the body is visited.
    fn bind_fn_let(&mut self, id: NodeId, name: NameId) {
        let ast = &mut self.session.ast;
        let value_ty = ast.let_decl(id).and_then(|decl| ast.ty(decl.value));
        if let NodeKind::Let(decl) = &mut ast.get_mut(id).kind {
            decl.ty = decl.ty.or(value_ty);
        }
        self.bind_let(id, name);

        let at_module_level = self.session.ast.parent(id).is_some_and(|p| self.session.ast.is_module(p));
        if !at_module_level || !self.session.is_entry_name(name) { return; }
        match self.session.entry_point {
            Some(existing) if existing != id => {
                let span = self.session.ast.span(id);
                let message = format!(
                    "entry point `{}` is already defined at {}",
                    self.session.name(name),
                    self.session.ast.span(existing),
                );
                self.session.diagnostics.report(ErrorCode::S004, span, message);
            }
            _ => {
                tracing::debug!(node = %id, "entry point");
                self.session.entry_point = Some(id);
            }
        }
    }

    // ─── Uses ────────────────────────────────────────────────────────────────

    /// Searches the nearest scope, then escalates through the parent of each
    /// scope-owning node until the module scope has been searched.
    fn resolve_ident(&mut self, id: NodeId, name: NameId) {
        let mut scope = self.nearest_scope(id);
        let symbol = loop {
            if let Some(symbol) = self.session.scopes.get(scope).get(name) {
                break Some(symbol);
            }
            let owner = self.session.scopes.node_of(scope);
            match self.session.ast.parent(owner) {
                Some(parent) => scope = self.nearest_scope(parent),
                None => break None,
            }
        };

        match symbol {
            Some(symbol) => {
                tracing::trace!(name = self.session.name(name), %symbol, "resolved");
                if let Some(Expr { kind: ExprKind::Ident(ident), .. }) = self.session.ast.expr_mut(id) {
                    ident.symbol = Some(symbol);
                }
            }
            None => {
                let span = self.session.ast.span(id);
                let message = format!("unresolved name `{}`", self.session.name(name));
                self.session.diagnostics.report(ErrorCode::S001, span, message);
            }
        }
    }
}

impl Visitor for SymbolBinder<'_> {
    fn ast(&self) -> &AstArena {
        &self.session.ast
    }

    fn enter(&mut self, id: NodeId) -> Flow {
        match self.site(id) {
            Site::Scope => { self.open_scope(id); }
            Site::Block => self.open_block(id),
            Site::Use(path) => {
                let span = self.session.ast.span(id);
                let message = format!("`use {}` ignored: module imports are not resolved", self.session.name(path));
                self.session.diagnostics.report(ErrorCode::N001, span, message);
            }
            Site::Extern(name, ty) => self.bind_extern(id, name, ty),
            Site::Let { name, bound: false, fn_value: true } => self.bind_fn_let(id, name),
            Site::Ident { name, bound: false } => self.resolve_ident(id, name),
            _ => {}
        }
        Flow::Continue
    }

    fn leave(&mut self, id: NodeId) -> Flow {
        if let Site::Let { name, bound: false, fn_value: false } = self.site(id) {
            self.bind_let(id, name);
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parents::ParentLinker;
    use crate::syntax::parser::Parser;
    use crate::syntax::reader::Reader;
    use crate::syntax::visit::walk;
    use crate::types::TypeInterner;

    fn bind(src: &str) -> (Session, NodeId) {
        let mut session = Session::default();
        let root = Parser::new(&mut session, Reader::new(src)).parse_program();
        assert!(!session.diagnostics.has_errors(), "parse failed for {src:?}");
        walk(&mut ParentLinker::new(&mut session.ast), root);
        walk(&mut SymbolBinder::new(&mut session), root);
        (session, root)
    }

    fn idents(session: &Session) -> Vec<(String, Option<SymbolId>)> {
        session
            .ast
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::Expr(Expr { kind: ExprKind::Ident(i), .. }) => {
                    Some((session.name(i.name).to_owned(), i.symbol))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn module_and_blocks_open_scopes() {
        let (session, root) = bind("let f = fn() { { 1 } };");
        assert_eq!(session.scopes.len(), 3);
        let module_scope = session.scopes.scope_of(root).unwrap();
        assert_eq!(session.scopes.get(module_scope).parent, None);
        let inner: Vec<_> = session.scopes.iter().filter(|s| s.parent.is_some()).collect();
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn params_seed_the_body_scope() {
        let (session, _) = bind("let add = fn(a: int, b: bool) -> int { a };");
        let params: Vec<_> = session.symbols.iter().filter(|s| s.kind == SymbolKind::Param).collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].ty, Some(session.types.int()));
        assert_eq!(params[1].ty, Some(session.types.bool()));
        let ids = idents(&session);
        assert_eq!(ids[0].1, Some(params[0].id));
    }

    #[test]
    fn param_symbols_point_at_the_function() {
        let (session, _) = bind("let f = fn(a: int) { a };");
        let param = session.symbols.iter().find(|s| s.kind == SymbolKind::Param).unwrap();
        let node = param.node.unwrap();
        assert!(session.ast.is_fn_literal(node));
    }

    #[test]
    fn fn_let_is_visible_in_its_own_body() {
        let (session, _) = bind("let f: fn() -> int = fn() -> int { f() };");
        assert!(session.diagnostics.is_empty());
        assert!(idents(&session).iter().all(|(_, s)| s.is_some()));
    }

    #[test]
    fn plain_let_is_not_visible_in_its_initializer() {
        let (session, _) = bind("let x = x;");
        assert_eq!(session.diagnostics.count(ErrorCode::S001), 1);
    }

    #[test]
    fn unannotated_fn_let_takes_literal_type() {
        let (session, root) = bind("let f = fn(a: int) {};");
        let decl = session.ast.let_decl(session.ast.children(root)[0]).unwrap();
        let symbol = session.symbols.get(decl.name.symbol.unwrap());
        assert_eq!(symbol.ty, decl.ty);
        assert_eq!(session.type_name(symbol.ty.unwrap()), "fn(int) -> nil");
    }

    #[test]
    fn externs_are_bound() {
        let (session, _) = bind("extern print: fn(int); let main = fn() { print(1) };");
        let print = session.symbols.iter().find(|s| s.kind == SymbolKind::Extern).unwrap();
        assert_eq!(session.type_name(print.ty.unwrap()), "fn(int) -> nil");
        assert_eq!(idents(&session)[0].1, Some(print.id));
    }

    #[test]
    fn duplicate_in_same_scope_keeps_original() {
        let (session, root) = bind("let x = 1; let x = true; let y = x;");
        assert_eq!(session.diagnostics.count(ErrorCode::S003), 1);
        assert_eq!(session.symbols.len(), 2);
        let first = session.ast.let_decl(session.ast.children(root)[0]).unwrap().name.symbol;
        assert_eq!(idents(&session)[0].1, first);
    }

    #[test]
    fn inner_scope_shadows() {
        let (session, _) = bind("let x = 1; let f = fn() { let x = true; x };");
        assert!(session.diagnostics.is_empty());
        let inner = session.symbols.iter().filter(|s| session.name(s.name) == "x").nth(1).unwrap();
        assert_eq!(idents(&session)[0].1, Some(inner.id));
    }

    #[test]
    fn lookup_escalates_to_module() {
        let (session, root) = bind("let x = 1; let f = fn() { { { x } } };");
        let outer = session.ast.let_decl(session.ast.children(root)[0]).unwrap().name.symbol;
        assert_eq!(idents(&session)[0].1, outer);
    }

    #[test]
    fn sibling_block_bindings_are_invisible() {
        let (session, _) = bind("let f = fn() { { let y = 1; y }; y };");
        assert_eq!(session.diagnostics.count(ErrorCode::S001), 1);
    }

    #[test]
    fn entry_point_is_module_level_main() {
        let (session, root) = bind("let main = fn() {};");
        assert_eq!(session.entry_point, Some(session.ast.children(root)[0]));
    }

    #[test]
    fn nested_main_is_not_an_entry_point() {
        let (session, _) = bind("let f = fn() { let main = fn() {}; main() };");
        assert_eq!(session.entry_point, None);
    }

    #[test]
    fn duplicate_entry_point() {
        let (session, _) = bind("let main = fn() {}; let main = fn() {};");
        assert_eq!(session.diagnostics.count(ErrorCode::S004), 1);
    }

    #[test]
    fn use_is_noted() {
        let (session, _) = bind("use io;");
        assert_eq!(session.diagnostics.count(ErrorCode::N001), 1);
        assert!(!session.diagnostics.has_errors());
    }

    /// Binds `let f = <fn literal>;` after overwriting the literal's type.
    fn bind_retyped_fn(src: &str, retype: impl FnOnce(&mut TypeInterner) -> Option<TypeId>) {
        let mut session = Session::default();
        let root = Parser::new(&mut session, Reader::new(src)).parse_program();
        let value = session.ast.let_decl(session.ast.children(root)[0]).unwrap().value;
        let ty = retype(&mut session.types);
        session.ast.expr_mut(value).unwrap().ty = ty;
        walk(&mut ParentLinker::new(&mut session.ast), root);
        walk(&mut SymbolBinder::new(&mut session), root);
    }

    #[test]
    #[should_panic(expected = "2 parameters but a type with 1")]
    fn param_count_disagreeing_with_fn_type_is_fatal() {
        bind_retyped_fn("let f = fn(a: int, b: int) {};", |types| {
            let int = types.int();
            Some(types.func(vec![int], int))
        });
    }

    #[test]
    #[should_panic(expected = "function literal has no type")]
    fn untyped_fn_literal_is_fatal() {
        bind_retyped_fn("let f = fn(a: int) {};", |_| None);
    }

    #[test]
    #[should_panic(expected = "function literal is not typed as a function")]
    fn fn_literal_with_non_function_type_is_fatal() {
        bind_retyped_fn("let f = fn() {};", |types| Some(types.int()));
    }

    #[test]
    fn rebinding_is_idempotent() {
        let (mut session, root) = bind("let x = 1; let f = fn(a: int) { let y = a; x + y };");
        let (scopes, symbols) = (session.scopes.len(), session.symbols.len());
        walk(&mut SymbolBinder::new(&mut session), root);
        assert_eq!(session.scopes.len(), scopes);
        assert_eq!(session.symbols.len(), symbols);
        assert!(session.diagnostics.is_empty());
    }
}
