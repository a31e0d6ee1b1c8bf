//! Pass 1: parent linking.

use crate::syntax::ast::{AstArena, NodeId};
use crate::syntax::visit::{Flow, Visitor};

/// Records each node's parent from a stack of in-progress ancestors.
pub struct ParentLinker<'a> {
    ast: &'a mut AstArena,
    stack: Vec<NodeId>,
}

impl<'a> ParentLinker<'a> {
    pub fn new(ast: &'a mut AstArena) -> Self {
        Self { ast, stack: Vec::new() }
    }
}

impl Visitor for ParentLinker<'_> {
    fn ast(&self) -> &AstArena {
        self.ast
    }

    fn enter(&mut self, id: NodeId) -> Flow {
        // A subtree root keeps the parent it was given by an earlier run.
        if let Some(&parent) = self.stack.last() {
            self.ast.get_mut(id).parent = Some(parent);
        }
        self.stack.push(id);
        Flow::Continue
    }

    fn leave(&mut self, _id: NodeId) -> Flow {
        self.stack.pop();
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::syntax::parser::Parser;
    use crate::syntax::reader::Reader;
    use crate::syntax::visit::walk;

    #[test]
    fn links_every_node_but_the_root() {
        let mut session = Session::default();
        let root = Parser::new(&mut session, Reader::new("let f = fn(a: int) { a + 1 };")).parse_program();
        walk(&mut ParentLinker::new(&mut session.ast), root);

        assert_eq!(session.ast.parent(root), None);
        for node in session.ast.iter().filter(|n| n.id != root) {
            assert!(node.parent.is_some(), "node {} has no parent", node.id);
        }
        for node in session.ast.iter() {
            for child in session.ast.children(node.id) {
                assert_eq!(session.ast.parent(child), Some(node.id));
            }
        }
    }

    #[test]
    fn subtree_root_keeps_existing_parent() {
        let mut session = Session::default();
        let root = Parser::new(&mut session, Reader::new("let x = { 1 };")).parse_program();
        walk(&mut ParentLinker::new(&mut session.ast), root);
        let decl = session.ast.children(root)[0];
        let block = session.ast.children(decl)[0];

        walk(&mut ParentLinker::new(&mut session.ast), block);
        assert_eq!(session.ast.parent(block), Some(decl));
    }
}
