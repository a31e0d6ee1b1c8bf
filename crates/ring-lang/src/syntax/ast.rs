use std::fmt;

use crate::analysis::symbols::SymbolId;
use crate::intern::NameId;
use crate::syntax::token::{Token, TokenKind};
use crate::types::TypeId;

/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

id_type! {
    /// Index of a node in its [`AstArena`].
    NodeId
}

/// A name occurrence. The parser fills `name`; the binder fills `symbol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    pub name: NameId,
    pub symbol: Option<SymbolId>,
}

impl Ident {
    pub fn new(name: NameId) -> Self {
        Self { name, symbol: None }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Set once by the parent linker; `None` only for the module root.
    pub parent: Option<NodeId>,
    pub span: Span,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Module(Module),
    Use(Use),
    Extern(Extern),
    Let(Let),
    Expr(Expr),
}

#[derive(Debug, Clone, Default)]
pub struct Module {
    pub uses: Vec<NodeId>,
    pub externs: Vec<NodeId>,
    pub decls: Vec<NodeId>,
}

/// `use path as alias;`
#[derive(Debug, Clone)]
pub struct Use {
    pub path: Ident,
    pub alias: Option<Ident>,
}

/// `extern name: type;`
#[derive(Debug, Clone)]
pub struct Extern {
    pub name: Ident,
    pub ty: TypeId,
}

/// `pub? let mut? name (: type)? = value`
#[derive(Debug, Clone)]
pub struct Let {
    pub public: bool,
    pub mutable: bool,
    pub name: Ident,
    pub ty: Option<TypeId>,
    pub value: NodeId,
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Expr {
    /// Filled by the parser for literals and function literals, by the type checker otherwise.
    pub ty: Option<TypeId>,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self { ty: None, kind }
    }

    pub fn typed(kind: ExprKind, ty: TypeId) -> Self {
        Self { ty: Some(ty), kind }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Empty,
    Block { stmts: Vec<NodeId> },
    Fn { params: Vec<Param>, body: NodeId },
    If { test: NodeId, con: NodeId, alt: Option<NodeId> },
    Ident(Ident),
    Literal(Literal),
    Member { object: NodeId, property: Property },
    Call { callee: NodeId, args: Vec<NodeId> },
    Unary { op: UnaryOp, operand: NodeId },
    Binary { op: BinaryOp, left: NodeId, right: NodeId },
    Logical { op: LogicalOp, left: NodeId, right: NodeId },
    Conditional { test: NodeId, con: NodeId, alt: NodeId },
    Assignment { op: AssignOp, left: NodeId, right: NodeId },
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Literal {
    /// Numeric, boolean or string token; its text is in the interner.
    Basic(Token),
    Array { elements: Vec<NodeId> },
}

/// `.name` or `[index]` after an object expression.
#[derive(Debug, Clone)]
pub enum Property {
    Named(Ident),
    Index(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp { Plus, Neg, Not, BitNot }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add, Sub, Mul, Div, Mod, Exp,
    Shl, Shr,
    BitAnd, BitXor, BitOr,
    Eq, Ne, Lt, Le, Ge, Gt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp { And, Or }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign, Add, Sub, Mul, Div, Mod, Shl, Shr, Or, Xor, And,
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus  => Self::Plus,
            TokenKind::Minus => Self::Neg,
            TokenKind::Bang  => Self::Not,
            TokenKind::Tilde => Self::BitNot,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plus   => "+",
            Self::Neg    => "-",
            Self::Not    => "!",
            Self::BitNot => "~",
        }
    }
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus     => Self::Add,
            TokenKind::Minus    => Self::Sub,
            TokenKind::Star     => Self::Mul,
            TokenKind::Slash    => Self::Div,
            TokenKind::Percent  => Self::Mod,
            TokenKind::StarStar => Self::Exp,
            TokenKind::Shl      => Self::Shl,
            TokenKind::Shr      => Self::Shr,
            TokenKind::Amp      => Self::BitAnd,
            TokenKind::Caret    => Self::BitXor,
            TokenKind::Pipe     => Self::BitOr,
            TokenKind::EqEq     => Self::Eq,
            TokenKind::BangEq   => Self::Ne,
            TokenKind::Lt       => Self::Lt,
            TokenKind::LtEq     => Self::Le,
            TokenKind::GtEq     => Self::Ge,
            TokenKind::Gt       => Self::Gt,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add    => "+",
            Self::Sub    => "-",
            Self::Mul    => "*",
            Self::Div    => "/",
            Self::Mod    => "%",
            Self::Exp    => "**",
            Self::Shl    => "<<",
            Self::Shr    => ">>",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr  => "|",
            Self::Eq     => "==",
            Self::Ne     => "!=",
            Self::Lt     => "<",
            Self::Le     => "<=",
            Self::Ge     => ">=",
            Self::Gt     => ">",
        }
    }
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or  => "||",
        }
    }
}

impl AssignOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Assign    => Self::Assign,
            TokenKind::AssignAdd => Self::Add,
            TokenKind::AssignSub => Self::Sub,
            TokenKind::AssignMul => Self::Mul,
            TokenKind::AssignDiv => Self::Div,
            TokenKind::AssignMod => Self::Mod,
            TokenKind::AssignShl => Self::Shl,
            TokenKind::AssignShr => Self::Shr,
            TokenKind::AssignOr  => Self::Or,
            TokenKind::AssignXor => Self::Xor,
            TokenKind::AssignAnd => Self::And,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add    => "+=",
            Self::Sub    => "-=",
            Self::Mul    => "*=",
            Self::Div    => "/=",
            Self::Mod    => "%=",
            Self::Shl    => "<<=",
            Self::Shr    => ">>=",
            Self::Or     => "|=",
            Self::Xor    => "^=",
            Self::And    => "&=",
        }
    }
}

// ─── Arena ───────────────────────────────────────────────────────────────────

/// Owns every node of a session. Nodes refer to each other only by [`NodeId`].
#[derive(Debug, Default)]
pub struct AstArena {
    nodes: Vec<Node>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node { id, parent: None, span, kind });
        id
    }

    pub fn push_expr(&mut self, expr: Expr, span: Span) -> NodeId {
        self.push(NodeKind::Expr(expr), span)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).span
    }

    pub fn expr(&self, id: NodeId) -> Option<&Expr> {
        match &self.get(id).kind {
            NodeKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn expr_mut(&mut self, id: NodeId) -> Option<&mut Expr> {
        match &mut self.get_mut(id).kind {
            NodeKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn let_decl(&self, id: NodeId) -> Option<&Let> {
        match &self.get(id).kind {
            NodeKind::Let(decl) => Some(decl),
            _ => None,
        }
    }

    /// Type of an expression node; `None` for untyped expressions and non-expressions.
    pub fn ty(&self, id: NodeId) -> Option<TypeId> {
        self.expr(id).and_then(|e| e.ty)
    }

    pub fn is_module(&self, id: NodeId) -> bool {
        matches!(self.get(id).kind, NodeKind::Module(_))
    }

    pub fn is_fn_literal(&self, id: NodeId) -> bool {
        matches!(self.expr(id), Some(Expr { kind: ExprKind::Fn { .. }, .. }))
    }

    /// Children in traversal order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.get(id).kind {
            NodeKind::Module(m) => {
                m.uses.iter().chain(&m.externs).chain(&m.decls).copied().collect()
            }
            NodeKind::Use(_) | NodeKind::Extern(_) => Vec::new(),
            NodeKind::Let(decl) => vec![decl.value],
            NodeKind::Expr(expr) => match &expr.kind {
                ExprKind::Empty | ExprKind::Ident(_) => Vec::new(),
                ExprKind::Literal(Literal::Basic(_)) => Vec::new(),
                ExprKind::Literal(Literal::Array { elements }) => elements.clone(),
                ExprKind::Block { stmts } => stmts.clone(),
                ExprKind::Fn { body, .. } => vec![*body],
                ExprKind::If { test, con, alt } => {
                    let mut out = vec![*test, *con];
                    out.extend(*alt);
                    out
                }
                ExprKind::Member { object, property } => match property {
                    Property::Named(_) => vec![*object],
                    Property::Index(index) => vec![*object, *index],
                },
                ExprKind::Call { callee, args } => {
                    std::iter::once(*callee).chain(args.iter().copied()).collect()
                }
                ExprKind::Unary { operand, .. } => vec![*operand],
                ExprKind::Binary { left, right, .. }
                | ExprKind::Logical { left, right, .. }
                | ExprKind::Assignment { left, right, .. } => vec![*left, *right],
                ExprKind::Conditional { test, con, alt } => vec![*test, *con, *alt],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_insertion_order() {
        let mut ast = AstArena::new();
        let a = ast.push_expr(Expr::new(ExprKind::Empty), Span::new(1, 1));
        let b = ast.push_expr(Expr::new(ExprKind::Empty), Span::new(1, 2));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(ast.get(b).id, b);
        assert_eq!(ast.span(b), Span::new(1, 2));
        assert_eq!(ast.parent(b), None);
    }

    #[test]
    fn children_order() {
        let mut ast = AstArena::new();
        let test = ast.push_expr(Expr::new(ExprKind::Empty), Span::default());
        let con = ast.push_expr(Expr::new(ExprKind::Empty), Span::default());
        let alt = ast.push_expr(Expr::new(ExprKind::Empty), Span::default());
        let if_expr = ast.push_expr(
            Expr::new(ExprKind::If { test, con, alt: Some(alt) }),
            Span::default(),
        );
        assert_eq!(ast.children(if_expr), vec![test, con, alt]);

        let call = ast.push_expr(
            Expr::new(ExprKind::Call { callee: test, args: vec![con, alt] }),
            Span::default(),
        );
        assert_eq!(ast.children(call), vec![test, con, alt]);
    }

    #[test]
    fn operator_mapping() {
        assert_eq!(BinaryOp::from_token(TokenKind::StarStar), Some(BinaryOp::Exp));
        assert_eq!(BinaryOp::from_token(TokenKind::AmpAmp), None);
        assert_eq!(AssignOp::from_token(TokenKind::AssignXor), Some(AssignOp::Xor));
        assert_eq!(UnaryOp::from_token(TokenKind::Tilde), Some(UnaryOp::BitNot));
        assert_eq!(UnaryOp::from_token(TokenKind::Star), None);
    }

    #[test]
    fn span_display() {
        assert_eq!(Span::new(3, 14).to_string(), "3:14");
    }
}
