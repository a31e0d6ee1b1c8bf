use crate::error::ErrorCode;
use crate::session::Session;
use crate::syntax::ast::*;
use crate::syntax::lexer::Lexer;
use crate::syntax::reader::Reader;
use crate::syntax::token::{Token, TokenKind};
use crate::types::{TypeId, TypeInterner};

/// The failure has already been reported to the diagnostics sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reported;

type PResult<T> = Result<T, Reported>;

/// Deepest expression or type nesting accepted before P004.
pub const MAX_NESTING: usize = 64;

/// Recursive-descent parser over a two-token window.
///
/// Errors never unwind past the public entry points: they are reported,
/// the parser resynchronizes, and an empty expression stands in for
/// whatever failed to parse.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    ast: &'a mut AstArena,
    types: &'a mut TypeInterner,
    current: (Token, Span),
    next: (Token, Span),
    /// Number of tokens consumed so far; used to guarantee forward progress.
    position: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(session: &'a mut Session, reader: Reader) -> Self {
        let Session { strings, ast, types, diagnostics, .. } = session;
        let mut lexer = Lexer::new(reader, strings, diagnostics);
        let current = lexer.next_spanned();
        let next = lexer.next_spanned();
        Self { lexer, ast, types, current, next, position: 0, depth: 0 }
    }

    // ─── Entry points ────────────────────────────────────────────────────────

    /// `module = use* extern* let*`
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn parse_program(&mut self) -> NodeId {
        let span = self.span();
        let mut module = Module::default();

        while self.check(TokenKind::Use) {
            if let Some(id) = self.parse_item(Self::parse_use) { module.uses.push(id); }
        }
        while self.check(TokenKind::Extern) {
            if let Some(id) = self.parse_item(Self::parse_extern) { module.externs.push(id); }
        }
        while !self.check(TokenKind::Eof) {
            if let Some(id) = self.parse_item(Self::parse_module_let) { module.decls.push(id); }
        }

        tracing::debug!(
            uses = module.uses.len(),
            externs = module.externs.len(),
            decls = module.decls.len(),
            "parsed module"
        );
        self.ast.push(NodeKind::Module(module), span)
    }

    /// A single statement, with an optional trailing `;`.
    pub fn parse_statement(&mut self) -> NodeId {
        let span = self.span();
        let stmt = self.parse_stmt();
        self.eat(TokenKind::Semicolon);
        self.or_empty(stmt, span)
    }

    pub fn parse_expression(&mut self) -> NodeId {
        let span = self.span();
        let expr = self.parse_expr();
        self.or_empty(expr, span)
    }

    pub fn at_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    // ─── Module items ────────────────────────────────────────────────────────

    /// Runs one module-level production, resynchronizing on failure and
    /// skipping a token if nothing was consumed.
    fn parse_item(&mut self, parse: fn(&mut Self) -> PResult<NodeId>) -> Option<NodeId> {
        let before = self.position;
        let result = parse(self);
        if result.is_err() { self.recover(); }
        if self.position == before { self.advance(); }
        result.ok()
    }

    /// `use path (as alias)? ;`
    fn parse_use(&mut self) -> PResult<NodeId> {
        let span = self.expect(TokenKind::Use)?;
        let path = self.expect_ident()?;
        let alias = if self.eat(TokenKind::As) { Some(self.expect_ident()?) } else { None };
        self.expect(TokenKind::Semicolon)?;
        Ok(self.ast.push(NodeKind::Use(Use { path, alias }), span))
    }

    /// `extern name : type ;`
    fn parse_extern(&mut self) -> PResult<NodeId> {
        let span = self.expect(TokenKind::Extern)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(self.ast.push(NodeKind::Extern(Extern { name, ty }), span))
    }

    fn parse_module_let(&mut self) -> PResult<NodeId> {
        let id = self.parse_let(true)?;
        let value_is_fn = self.ast.let_decl(id).is_some_and(|decl| self.ast.is_fn_literal(decl.value));
        if value_is_fn {
            self.eat(TokenKind::Semicolon);
        } else {
            self.expect(TokenKind::Semicolon)?;
        }
        Ok(id)
    }

    /// `pub? let mut? name (: type)? = expr`
    fn parse_let(&mut self, module_level: bool) -> PResult<NodeId> {
        let span = self.span();
        let public = module_level && self.eat(TokenKind::Pub);
        self.expect(TokenKind::Let)?;
        let mutable = !module_level && self.eat(TokenKind::Mut);
        let name = self.expect_ident()?;
        let annotated = if self.eat(TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        self.expect(TokenKind::Assign)?;
        let value = match (annotated, self.kind()) {
            (Some(expected), TokenKind::Fn) => self.parse_fn(Some(expected))?,
            _ => self.parse_expr()?,
        };

        let ty = annotated.or_else(|| self.ast.ty(value));
        Ok(self.ast.push(NodeKind::Let(Let { public, mutable, name, ty, value }), span))
    }

    // ─── Statements and blocks ───────────────────────────────────────────────

    fn parse_stmt(&mut self) -> PResult<NodeId> {
        if self.check(TokenKind::Let) {
            self.nested(|p| p.parse_let(false))
        } else {
            self.parse_expr()
        }
    }

    /// `{ stmt (; stmt)* }`. Reaching `}` directly appends an empty expression.
    #[tracing::instrument(level = "trace", skip_all)]
    fn parse_block(&mut self) -> PResult<NodeId> {
        let span = self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();

        loop {
            while self.eat(TokenKind::Semicolon) {}
            if self.check(TokenKind::RBrace) {
                let at = self.span();
                stmts.push(self.ast.push_expr(Expr::new(ExprKind::Empty), at));
                break;
            }
            if self.check(TokenKind::Eof) {
                return Err(self.missing("`}`"));
            }

            let before = self.position;
            let stmt_span = self.span();
            match self.parse_stmt() {
                Ok(stmt) => {
                    stmts.push(stmt);
                    if self.check(TokenKind::RBrace) { break; }
                    if self.needs_semicolon(stmt) && self.expect(TokenKind::Semicolon).is_err() {
                        self.recover();
                    }
                }
                Err(Reported) => {
                    stmts.push(self.ast.push_expr(Expr::new(ExprKind::Empty), stmt_span));
                    self.recover();
                    if self.position == before { self.advance(); }
                }
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(self.ast.push_expr(Expr::new(ExprKind::Block { stmts }), span))
    }

    fn needs_semicolon(&self, stmt: NodeId) -> bool {
        !matches!(
            self.ast.expr(stmt),
            Some(Expr { kind: ExprKind::Block { .. } | ExprKind::If { .. }, .. })
        )
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> PResult<NodeId> {
        self.nested(|p| match p.kind() {
            TokenKind::LBrace => p.parse_block(),
            TokenKind::Fn => p.parse_fn(None),
            TokenKind::If => p.parse_if(),
            _ => p.parse_assignment(),
        })
    }

    /// `fn ( name : type, ... ) (-> type)? block`
    ///
    /// An omitted return type is `nil`, unless `expected` is a function type
    /// with the same parameters, in which case its return type is used.
    #[tracing::instrument(level = "trace", skip_all)]
    fn parse_fn(&mut self, expected: Option<TypeId>) -> PResult<NodeId> {
        let span = self.expect(TokenKind::Fn)?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param_span = self.span();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Colon)?;
                let ty = self.parse_type()?;
                params.push(Param { name, ty, span: param_span });
                if !self.eat(TokenKind::Comma) { break; }
            }
        }
        self.expect(TokenKind::RParen)?;
        let param_types: Vec<TypeId> = params.iter().map(|p| p.ty).collect();
        let ret = if self.eat(TokenKind::Arrow) {
            self.parse_type()?
        } else {
            expected
                .and_then(|ty| self.types.as_func(ty))
                .filter(|(expected_params, _)| *expected_params == param_types.as_slice())
                .map_or(self.types.nil(), |(_, ret)| ret)
        };

        // The signature is known before the body, so recursive references can be typed.
        let ty = self.types.func(param_types, ret);
        let body = self.parse_block()?;
        Ok(self.ast.push_expr(Expr::typed(ExprKind::Fn { params, body }, ty), span))
    }

    /// `if expr block (else (if | block))?`
    fn parse_if(&mut self) -> PResult<NodeId> {
        let span = self.expect(TokenKind::If)?;
        let test = self.parse_expr()?;
        let con = self.parse_block()?;
        let alt = if self.eat(TokenKind::Else) {
            match self.kind() {
                TokenKind::If => Some(self.nested(Self::parse_if)?),
                TokenKind::LBrace => Some(self.parse_block()?),
                _ => return Err(self.unexpected("`if` or `{`")),
            }
        } else {
            None
        };
        Ok(self.ast.push_expr(Expr::new(ExprKind::If { test, con, alt }), span))
    }

    fn parse_assignment(&mut self) -> PResult<NodeId> {
        let left = self.parse_conditional()?;
        let Some(op) = AssignOp::from_token(self.kind()) else { return Ok(left) };
        self.advance();
        let right = self.parse_expr()?;
        Ok(self.push_at(left, ExprKind::Assignment { op, left, right }))
    }

    fn parse_conditional(&mut self) -> PResult<NodeId> {
        let test = self.parse_logical_or()?;
        if !self.eat(TokenKind::Question) { return Ok(test); }
        let con = self.nested(Self::parse_assignment)?;
        self.expect(TokenKind::Colon)?;
        let alt = self.nested(Self::parse_assignment)?;
        Ok(self.push_at(test, ExprKind::Conditional { test, con, alt }))
    }

    fn parse_logical_or(&mut self) -> PResult<NodeId> {
        let mut left = self.parse_logical_and()?;
        while self.eat(TokenKind::PipePipe) {
            let right = self.parse_logical_and()?;
            left = self.push_at(left, ExprKind::Logical { op: LogicalOp::Or, left, right });
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> PResult<NodeId> {
        let mut left = self.parse_bit_or()?;
        while self.eat(TokenKind::AmpAmp) {
            let right = self.parse_bit_or()?;
            left = self.push_at(left, ExprKind::Logical { op: LogicalOp::And, left, right });
        }
        Ok(left)
    }

    fn parse_bit_or(&mut self) -> PResult<NodeId> {
        self.parse_binary_level(&[TokenKind::Pipe], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> PResult<NodeId> {
        self.parse_binary_level(&[TokenKind::Caret], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> PResult<NodeId> {
        self.parse_binary_level(&[TokenKind::Amp], Self::parse_equality)
    }

    /// Equality does not chain: `a == b == c` stops after `a == b`.
    fn parse_equality(&mut self) -> PResult<NodeId> {
        let left = self.parse_relational()?;
        let op = match self.kind() {
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::Ne,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_relational()?;
        Ok(self.push_at(left, ExprKind::Binary { op, left, right }))
    }

    fn parse_relational(&mut self) -> PResult<NodeId> {
        self.parse_binary_level(
            &[TokenKind::Lt, TokenKind::LtEq, TokenKind::GtEq, TokenKind::Gt],
            Self::parse_shift,
        )
    }

    fn parse_shift(&mut self) -> PResult<NodeId> {
        self.parse_binary_level(&[TokenKind::Shl, TokenKind::Shr], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> PResult<NodeId> {
        self.parse_binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> PResult<NodeId> {
        self.parse_binary_level(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::parse_exponential,
        )
    }

    /// Left-associative loop over one precedence level.
    fn parse_binary_level(
        &mut self,
        ops: &[TokenKind],
        operand: fn(&mut Self) -> PResult<NodeId>,
    ) -> PResult<NodeId> {
        let mut left = operand(self)?;
        while ops.contains(&self.kind()) {
            let Some(op) = BinaryOp::from_token(self.kind()) else { break };
            self.advance();
            let right = operand(self)?;
            left = self.push_at(left, ExprKind::Binary { op, left, right });
        }
        Ok(left)
    }

    /// `**` is right-associative: `a ** b ** c` is `a ** (b ** c)`.
    fn parse_exponential(&mut self) -> PResult<NodeId> {
        let base = self.parse_unary()?;
        if !self.eat(TokenKind::StarStar) { return Ok(base); }
        let exponent = self.nested(Self::parse_exponential)?;
        Ok(self.push_at(base, ExprKind::Binary { op: BinaryOp::Exp, left: base, right: exponent }))
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        let Some(op) = UnaryOp::from_token(self.kind()) else { return self.parse_postfix() };
        let (_, span) = self.advance();
        let operand = self.nested(Self::parse_unary)?;
        Ok(self.ast.push_expr(Expr::new(ExprKind::Unary { op, operand }), span))
    }

    /// `primary ( .name | [expr] | (args) )*`
    fn parse_postfix(&mut self) -> PResult<NodeId> {
        let mut expr = self.parse_primary()?;
        loop {
            let kind = match self.kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident()?;
                    ExprKind::Member { object: expr, property: Property::Named(name) }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    ExprKind::Member { object: expr, property: Property::Index(index) }
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_comma_list(TokenKind::RParen, Self::parse_expr)?;
                    ExprKind::Call { callee: expr, args }
                }
                _ => break,
            };
            expr = self.push_at(expr, kind);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        match self.kind() {
            TokenKind::Ident => {
                let span = self.span();
                let ident = self.expect_ident()?;
                Ok(self.ast.push_expr(Expr::new(ExprKind::Ident(ident)), span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            kind if kind.is_literal() || kind == TokenKind::LBracket => self.parse_literal(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Basic or array literal, optionally followed by `: type`.
    fn parse_literal(&mut self) -> PResult<NodeId> {
        let span = self.span();
        let (id, is_string) = if self.eat(TokenKind::LBracket) {
            let elements = self.parse_comma_list(TokenKind::RBracket, Self::parse_expr)?;
            let id = self.ast.push_expr(Expr::new(ExprKind::Literal(Literal::Array { elements })), span);
            (id, false)
        } else {
            let (token, _) = self.advance();
            let ty = match token.kind {
                TokenKind::Numeric => Some(self.types.int()),
                TokenKind::True | TokenKind::False => Some(self.types.bool()),
                _ => None,
            };
            let expr = Expr { ty, kind: ExprKind::Literal(Literal::Basic(token)) };
            (self.ast.push_expr(expr, span), token.kind == TokenKind::Str)
        };

        // `c ? 1 : 2` must not read `: 2` as an annotation.
        if self.check(TokenKind::Colon) && starts_type(self.next.0.kind) {
            self.advance();
            let ty = self.parse_type()?;
            if let Some(expr) = self.ast.expr_mut(id) { expr.ty = Some(ty); }
        } else if is_string {
            self.lexer.diagnostics().report(
                ErrorCode::P003,
                span,
                "string literal needs a type annotation",
            );
            return Err(Reported);
        }
        Ok(id)
    }

    /// Items separated by `,` up to and including `close`.
    fn parse_comma_list(
        &mut self,
        close: TokenKind,
        item: fn(&mut Self) -> PResult<NodeId>,
    ) -> PResult<Vec<NodeId>> {
        let mut items = Vec::new();
        if !self.check(close) {
            loop {
                items.push(item(self)?);
                if !self.eat(TokenKind::Comma) { break; }
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    // ─── Types ───────────────────────────────────────────────────────────────

    /// `int | bool | nil | [] type | fn ( type, ... ) (-> type)?`
    fn parse_type(&mut self) -> PResult<TypeId> {
        self.nested(|p| match p.kind() {
            TokenKind::TInt => { p.advance(); Ok(p.types.int()) }
            TokenKind::TBool => { p.advance(); Ok(p.types.bool()) }
            TokenKind::TNil => { p.advance(); Ok(p.types.nil()) }
            TokenKind::LBracket => {
                p.advance();
                p.expect(TokenKind::RBracket)?;
                let elem = p.parse_type()?;
                Ok(p.types.array(elem))
            }
            TokenKind::Fn => {
                p.advance();
                p.expect(TokenKind::LParen)?;
                let mut params = Vec::new();
                if !p.check(TokenKind::RParen) {
                    loop {
                        params.push(p.parse_type()?);
                        if !p.eat(TokenKind::Comma) { break; }
                    }
                }
                p.expect(TokenKind::RParen)?;
                let ret = if p.eat(TokenKind::Arrow) { p.parse_type()? } else { p.types.nil() };
                Ok(p.types.func(params, ret))
            }
            _ => Err(p.unexpected("type")),
        })
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    /// Runs `parse` one level deeper; past `MAX_NESTING` reports P004 instead.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            let span = self.span();
            self.lexer.diagnostics().report(
                ErrorCode::P004,
                span,
                format!("expression nests deeper than {MAX_NESTING} levels"),
            );
            return Err(Reported);
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn push_at(&mut self, anchor: NodeId, kind: ExprKind) -> NodeId {
        let span = self.ast.span(anchor);
        self.ast.push_expr(Expr::new(kind), span)
    }

    fn or_empty(&mut self, result: PResult<NodeId>, span: Span) -> NodeId {
        match result {
            Ok(id) => id,
            Err(Reported) => {
                self.recover();
                self.ast.push_expr(Expr::new(ExprKind::Empty), span)
            }
        }
    }

    fn kind(&self) -> TokenKind {
        self.current.0.kind
    }

    fn span(&self) -> Span {
        self.current.1
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn advance(&mut self) -> (Token, Span) {
        let next = self.lexer.next_spanned();
        let following = std::mem::replace(&mut self.next, next);
        self.position += 1;
        std::mem::replace(&mut self.current, following)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Span> {
        if self.check(kind) {
            Ok(self.advance().1)
        } else {
            Err(self.missing(&format!("`{}`", kind.describe())))
        }
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        match self.current.0 {
            Token { kind: TokenKind::Ident, text: Some(name) } => {
                self.advance();
                Ok(Ident::new(name))
            }
            _ => Err(self.missing("identifier")),
        }
    }

    fn found(&self) -> String {
        match self.kind() {
            TokenKind::Eof => "end of file".to_owned(),
            _ => format!("`{}`", self.current.0.stringify(self.lexer.strings())),
        }
    }

    /// P002: a specific token was required here.
    fn missing(&mut self, expected: &str) -> Reported {
        let message = format!("expected {expected}, found {}", self.found());
        let span = self.span();
        self.lexer.diagnostics().report(ErrorCode::P002, span, message);
        Reported
    }

    /// P001: the current token cannot start the production.
    fn unexpected(&mut self, expected: &str) -> Reported {
        let message = format!("unexpected {}, expected {expected}", self.found());
        let span = self.span();
        self.lexer.diagnostics().report(ErrorCode::P001, span, message);
        Reported
    }

    /// Skips to just past the next `;`, or up to a token that can start an item or close a block.
    fn recover(&mut self) {
        loop {
            match self.kind() {
                TokenKind::Semicolon => { self.advance(); return; }
                TokenKind::Eof
                | TokenKind::RBrace
                | TokenKind::Let
                | TokenKind::Pub
                | TokenKind::Extern
                | TokenKind::Use => return,
                _ => { self.advance(); }
            }
        }
    }
}

fn starts_type(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::TInt | TokenKind::TBool | TokenKind::TNil | TokenKind::Fn | TokenKind::LBracket
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
