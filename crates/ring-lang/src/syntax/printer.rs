//! Indented AST dump used by `Config::print_ast`.

use std::fmt::Write;

use crate::session::Session;
use crate::syntax::ast::*;

pub fn dump(session: &Session, root: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let node = session.ast.get(id);
        let _ = write!(out, "{:indent$}{} @{}", "", label(session, &node.kind), node.span, indent = depth * 2);
        if let Some(ty) = session.ast.ty(id) {
            let _ = write!(out, " : {}", session.type_name(ty));
        }
        out.push('\n');
        stack.extend(session.ast.children(id).into_iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

fn label(session: &Session, kind: &NodeKind) -> String {
    let name = |ident: &Ident| session.name(ident.name).to_owned();
    match kind {
        NodeKind::Module(_) => "Module".to_owned(),
        NodeKind::Use(u) => match u.alias {
            Some(alias) => format!("Use {} as {}", name(&u.path), name(&alias)),
            None => format!("Use {}", name(&u.path)),
        },
        NodeKind::Extern(e) => format!("Extern {}: {}", name(&e.name), session.type_name(e.ty)),
        NodeKind::Let(decl) => {
            let mut text = String::from("Let ");
            if decl.public { text.push_str("pub "); }
            if decl.mutable { text.push_str("mut "); }
            text.push_str(&name(&decl.name));
            text
        }
        NodeKind::Expr(expr) => match &expr.kind {
            ExprKind::Empty => "Empty".to_owned(),
            ExprKind::Block { .. } => "Block".to_owned(),
            ExprKind::Fn { params, .. } => {
                let params: Vec<String> = params.iter().map(|p| name(&p.name)).collect();
                format!("Fn({})", params.join(", "))
            }
            ExprKind::If { .. } => "If".to_owned(),
            ExprKind::Ident(ident) => format!("Ident {}", name(ident)),
            ExprKind::Literal(Literal::Basic(token)) => {
                format!("Literal {}", token.stringify(&session.strings))
            }
            ExprKind::Literal(Literal::Array { .. }) => "ArrayLiteral".to_owned(),
            ExprKind::Member { property: Property::Named(field), .. } => format!("Member .{}", name(field)),
            ExprKind::Member { property: Property::Index(_), .. } => "Index".to_owned(),
            ExprKind::Call { .. } => "Call".to_owned(),
            ExprKind::Unary { op, .. } => format!("Unary {}", op.as_str()),
            ExprKind::Binary { op, .. } => format!("Binary {}", op.as_str()),
            ExprKind::Logical { op, .. } => format!("Logical {}", op.as_str()),
            ExprKind::Conditional { .. } => "Conditional".to_owned(),
            ExprKind::Assignment { op, .. } => format!("Assignment {}", op.as_str()),
        },
    }
}
