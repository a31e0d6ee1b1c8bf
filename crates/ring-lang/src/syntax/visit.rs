//! Generic pre/post-order traversal over the arena.

use crate::syntax::ast::{AstArena, NodeId};

/// Returned from visitor hooks to steer the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// From `enter`: do not descend, but still call `leave` for this node.
    SkipChildren,
    /// Abort the whole walk.
    Stop,
}

pub trait Visitor {
    fn ast(&self) -> &AstArena;

    fn enter(&mut self, _id: NodeId) -> Flow {
        Flow::Continue
    }

    fn leave(&mut self, _id: NodeId) -> Flow {
        Flow::Continue
    }
}

/// Walks the subtree rooted at `id`. Children are re-read from the arena
/// after `enter`, so hooks may rewrite node annotations freely.
///
/// The walk keeps its own stack, so left-deep operator chains of any length
/// are safe to visit.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, id: NodeId) -> Flow {
    // (node, its children, index of the next child to enter)
    let mut stack: Vec<(NodeId, Vec<NodeId>, usize)> = Vec::new();
    let mut entering = Some(id);

    loop {
        if let Some(node) = entering.take() {
            let children = match visitor.enter(node) {
                Flow::Stop => return Flow::Stop,
                Flow::SkipChildren => Vec::new(),
                Flow::Continue => visitor.ast().children(node),
            };
            stack.push((node, children, 0));
        }

        let Some((node, children, next)) = stack.last_mut() else { return Flow::Continue };
        if let Some(&child) = children.get(*next) {
            *next += 1;
            entering = Some(child);
            continue;
        }

        let node = *node;
        stack.pop();
        if visitor.leave(node) == Flow::Stop {
            return Flow::Stop;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::syntax::parser::Parser;
    use crate::syntax::reader::Reader;

    /// Records the enter/leave order as `+id` / `-id`.
    struct Recorder<'a> {
        ast: &'a AstArena,
        events: Vec<String>,
        skip: Option<NodeId>,
        stop_at: Option<NodeId>,
    }

    impl Visitor for Recorder<'_> {
        fn ast(&self) -> &AstArena {
            self.ast
        }

        fn enter(&mut self, id: NodeId) -> Flow {
            self.events.push(format!("+{id}"));
            if Some(id) == self.stop_at { return Flow::Stop; }
            if Some(id) == self.skip { Flow::SkipChildren } else { Flow::Continue }
        }

        fn leave(&mut self, id: NodeId) -> Flow {
            self.events.push(format!("-{id}"));
            Flow::Continue
        }
    }

    fn parse(src: &str) -> (Session, NodeId) {
        let mut session = Session::default();
        let root = Parser::new(&mut session, Reader::new(src)).parse_expression();
        (session, root)
    }

    #[test]
    fn pre_and_post_order() {
        // nodes: 0 = a, 1 = b, 2 = a + b
        let (session, root) = parse("a + b");
        let mut rec = Recorder { ast: &session.ast, events: vec![], skip: None, stop_at: None };
        assert_eq!(walk(&mut rec, root), Flow::Continue);
        assert_eq!(rec.events, ["+2", "+0", "-0", "+1", "-1", "-2"]);
    }

    #[test]
    fn skip_children_still_leaves() {
        let (session, root) = parse("a + b");
        let mut rec = Recorder { ast: &session.ast, events: vec![], skip: Some(root), stop_at: None };
        walk(&mut rec, root);
        assert_eq!(rec.events, ["+2", "-2"]);
    }

    #[test]
    fn stop_aborts_everything() {
        let (session, root) = parse("a + b");
        let first = session.ast.children(root)[0];
        let mut rec = Recorder { ast: &session.ast, events: vec![], skip: None, stop_at: Some(first) };
        assert_eq!(walk(&mut rec, root), Flow::Stop);
        assert_eq!(rec.events, ["+2", "+0"]);
    }

    #[test]
    fn nested_children_are_visited_in_source_order() {
        // nodes: 0 = a, 1 = b, 2 = a + b, 3 = c, 4 = (a + b) * c
        let (session, root) = parse("(a + b) * c");
        let mut rec = Recorder { ast: &session.ast, events: vec![], skip: None, stop_at: None };
        walk(&mut rec, root);
        assert_eq!(rec.events, ["+4", "+2", "+0", "-0", "+1", "-1", "-2", "+3", "-3", "-4"]);
    }

    #[test]
    fn long_left_chain_does_not_recurse() {
        let src = format!("a{}", " + a".repeat(50_000));
        let (session, root) = parse(&src);
        let mut rec = Recorder { ast: &session.ast, events: vec![], skip: None, stop_at: None };
        assert_eq!(walk(&mut rec, root), Flow::Continue);
        assert_eq!(rec.events.len(), 2 * session.ast.len());
        assert_eq!(rec.events.first().map(String::as_str), Some(format!("+{root}").as_str()));
        assert_eq!(rec.events.last().map(String::as_str), Some(format!("-{root}").as_str()));
    }
}
