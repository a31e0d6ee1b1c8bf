//! Pass 3: type assignment and checking.
//!
//! Runs on `leave`, so every child is typed before its parent. A node that
//! already carries a type is re-validated against the computed one instead
//! of being skipped. Mismatches report S002 and continue with a fallback type.

use crate::error::ErrorCode;
use crate::session::Session;
use crate::syntax::ast::{AstArena, ExprKind, Literal, NodeId, NodeKind, Property};
use crate::syntax::visit::{Flow, Visitor};
use crate::types::TypeId;

pub struct TypeChecker<'a> {
    session: &'a mut Session,
}

impl<'a> TypeChecker<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Type of an already-checked child expression.
    fn type_of(&self, id: NodeId) -> TypeId {
        match self.session.ast.ty(id) {
            Some(ty) => ty,
            None => self.session.diagnostics.fatal(self.session.ast.span(id), "child expression was not typed"),
        }
    }

    fn mismatch(&mut self, id: NodeId, message: String) {
        let span = self.session.ast.span(id);
        self.session.diagnostics.report(ErrorCode::S002, span, message);
    }

    /// Reports S002 unless `found` is `expected`.
    fn expect_type(&mut self, id: NodeId, expected: TypeId, found: TypeId, what: &str) -> bool {
        if expected == found { return true; }
        let message = format!(
            "{what}: expected `{}`, found `{}`",
            self.session.type_name(expected),
            self.session.type_name(found),
        );
        self.mismatch(id, message);
        false
    }

    /// Stores `computed` on an untyped node; re-validates a typed one.
    fn assign(&mut self, id: NodeId, computed: TypeId) {
        match self.session.ast.ty(id) {
            Some(existing) => { self.expect_type(id, existing, computed, "re-checked type"); }
            None => {
                if let Some(expr) = self.session.ast.expr_mut(id) {
                    expr.ty = Some(computed);
                }
            }
        }
    }

    // ─── Declarations ────────────────────────────────────────────────────────

    fn check_let(&mut self, id: NodeId) {
        let Some(decl) = self.session.ast.let_decl(id) else { return };
        let (declared, value, symbol, name) = (decl.ty, decl.value, decl.name.symbol, decl.name.name);
        let value_ty = self.type_of(value);

        let ty = match declared {
            None => {
                if let NodeKind::Let(decl) = &mut self.session.ast.get_mut(id).kind {
                    decl.ty = Some(value_ty);
                }
                value_ty
            }
            Some(declared) => {
                let what = format!("initializer of `{}`", self.session.name(name));
                self.expect_type(value, declared, value_ty, &what);
                declared
            }
        };

        if let Some(symbol) = symbol {
            let symbol = self.session.symbols.get_mut(symbol);
            if symbol.ty.is_none() {
                symbol.ty = Some(ty);
            }
        }
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    fn infer(&mut self, id: NodeId, kind: ExprKind) -> TypeId {
        match kind {
            ExprKind::Empty => self.session.types.nil(),
            ExprKind::Block { stmts } => self.infer_block(&stmts),
            ExprKind::Fn { body, .. } => self.infer_fn(id, body),
            ExprKind::If { con, alt: Some(alt), .. } | ExprKind::Conditional { con, alt, .. } => {
                let (con_ty, alt_ty) = (self.type_of(con), self.type_of(alt));
                if self.expect_type(alt, con_ty, alt_ty, "branches have different types") {
                    con_ty
                } else {
                    self.session.types.int()
                }
            }
            ExprKind::If { alt: None, .. } => self.session.types.int(),
            ExprKind::Ident(ident) => {
                let span = self.session.ast.span(id);
                let Some(symbol) = ident.symbol else {
                    self.session.diagnostics.fatal(span, "identifier reached the type checker unbound")
                };
                match self.session.symbols.get(symbol).ty {
                    Some(ty) => ty,
                    None => {
                        let message = format!("type of `{}` is not known here", self.session.name(ident.name));
                        self.session.diagnostics.report(ErrorCode::S007, span, message);
                        self.session.types.nil()
                    }
                }
            }
            ExprKind::Literal(Literal::Basic(_)) => match self.session.ast.ty(id) {
                Some(ty) => ty,
                None => self.session.diagnostics.fatal(self.session.ast.span(id), "literal without a type"),
            },
            ExprKind::Literal(Literal::Array { elements }) => self.infer_array(id, &elements),
            ExprKind::Member { object, property } => self.infer_member(id, object, property),
            ExprKind::Call { callee, args } => self.infer_call(id, callee, &args),
            ExprKind::Unary { operand, .. } => self.type_of(operand),
            ExprKind::Binary { op, left, right } => {
                let (left_ty, right_ty) = (self.type_of(left), self.type_of(right));
                let what = format!("operands of `{}`", op.as_str());
                if self.expect_type(id, left_ty, right_ty, &what) {
                    left_ty
                } else {
                    self.session.types.nil()
                }
            }
            ExprKind::Assignment { op, left, right } => {
                let (left_ty, right_ty) = (self.type_of(left), self.type_of(right));
                let what = format!("right side of `{}`", op.as_str());
                self.expect_type(right, left_ty, right_ty, &what);
                left_ty
            }
            ExprKind::Logical { .. } => self.session.types.bool(),
        }
    }

    fn infer_block(&mut self, stmts: &[NodeId]) -> TypeId {
        let Some(&last) = stmts.last() else { return self.session.types.int() };
        if self.session.ast.expr(last).is_some() {
            return self.type_of(last);
        }
        let span = self.session.ast.span(last);
        self.session.diagnostics.report(
            ErrorCode::S005,
            span,
            "block must end with an expression, found a declaration",
        );
        self.session.types.nil()
    }

    fn infer_fn(&mut self, id: NodeId, body: NodeId) -> TypeId {
        let span = self.session.ast.span(id);
        let Some(ty) = self.session.ast.ty(id) else {
            self.session.diagnostics.fatal(span, "function literal without a type")
        };
        let Some((_, ret)) = self.session.types.as_func(ty) else {
            self.session.diagnostics.fatal(span, "function literal is not typed as a function")
        };
        let body_ty = self.type_of(body);
        self.expect_type(body, ret, body_ty, "function body does not match its return type");
        ty
    }

    fn infer_array(&mut self, id: NodeId, elements: &[NodeId]) -> TypeId {
        if let Some(annotated) = self.session.ast.ty(id) {
            match self.session.types.array_elem(annotated) {
                Some(elem) => {
                    for &element in elements {
                        let found = self.type_of(element);
                        self.expect_type(element, elem, found, "array element");
                    }
                }
                None => {
                    let message = format!(
                        "array literal annotated with non-array type `{}`",
                        self.session.type_name(annotated),
                    );
                    self.mismatch(id, message);
                }
            }
            return annotated;
        }

        let Some(&first) = elements.first() else {
            let span = self.session.ast.span(id);
            self.session.diagnostics.report(
                ErrorCode::S008,
                span,
                "cannot infer the element type of an empty array literal; add a `: []type` annotation",
            );
            return self.session.types.nil();
        };
        let elem = self.type_of(first);
        for &element in &elements[1..] {
            let found = self.type_of(element);
            self.expect_type(element, elem, found, "array element");
        }
        self.session.types.array(elem)
    }

    fn infer_member(&mut self, id: NodeId, object: NodeId, property: Property) -> TypeId {
        let object_ty = self.type_of(object);
        let span = self.session.ast.span(id);
        match property {
            Property::Index(index) => match self.session.types.array_elem(object_ty) {
                Some(elem) => {
                    let (int, index_ty) = (self.session.types.int(), self.type_of(index));
                    self.expect_type(index, int, index_ty, "array index");
                    elem
                }
                None => {
                    let message = format!("cannot index a value of type `{}`", self.session.type_name(object_ty));
                    self.session.diagnostics.report(ErrorCode::S009, span, message);
                    self.session.types.nil()
                }
            },
            Property::Named(field) => {
                let message = format!(
                    "no member `{}` on type `{}`: named member access is not supported",
                    self.session.name(field.name),
                    self.session.type_name(object_ty),
                );
                self.session.diagnostics.report(ErrorCode::S009, span, message);
                self.session.types.nil()
            }
        }
    }

    fn infer_call(&mut self, id: NodeId, callee: NodeId, args: &[NodeId]) -> TypeId {
        let span = self.session.ast.span(id);
        let Some(callee_ty) = self.session.ast.ty(callee) else {
            self.session.diagnostics.fatal(span, "callee reached the type checker untyped")
        };
        let Some((params, ret)) = self.session.types.as_func(callee_ty) else {
            let message = format!("value of type `{}` is not callable", self.session.type_name(callee_ty));
            self.session.diagnostics.report(ErrorCode::S006, span, message);
            return self.session.types.nil();
        };
        let params = params.to_vec();

        if params.len() != args.len() {
            let message = format!("expected {} argument(s), found {}", params.len(), args.len());
            self.session.diagnostics.report(ErrorCode::S010, span, message);
        }
        for (&arg, &param) in args.iter().zip(&params) {
            let found = self.type_of(arg);
            self.expect_type(arg, param, found, "argument");
        }
        ret
    }
}

impl Visitor for TypeChecker<'_> {
    fn ast(&self) -> &AstArena {
        &self.session.ast
    }

    fn leave(&mut self, id: NodeId) -> Flow {
        match &self.session.ast.get(id).kind {
            NodeKind::Let(_) => self.check_let(id),
            NodeKind::Expr(expr) => {
                let kind = expr.kind.clone();
                let ty = self.infer(id, kind);
                tracing::trace!(node = %id, ty = %self.session.type_name(ty), "typed");
                self.assign(id, ty);
            }
            NodeKind::Module(_) | NodeKind::Use(_) | NodeKind::Extern(_) => {}
        }
        Flow::Continue
    }
}
