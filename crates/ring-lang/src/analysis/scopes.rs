use std::collections::HashMap;

use crate::analysis::symbols::SymbolId;
use crate::intern::NameId;
use crate::syntax::ast::NodeId;

id_type! {
    /// Handle into the [`ScopeTable`].
    ScopeId
}

// ─── Scope ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    /// The module or block that opened this scope.
    pub node: NodeId,
    /// Recorded for consumers; lookup escalates through the AST instead.
    pub parent: Option<ScopeId>,
    names: HashMap<NameId, SymbolId>,
}

impl Scope {
    /// Returns the existing binding if `name` is already declared here.
    pub fn declare(&mut self, name: NameId, symbol: SymbolId) -> Result<(), SymbolId> {
        if let Some(&existing) = self.names.get(&name) {
            return Err(existing);
        }
        self.names.insert(name, symbol);
        Ok(())
    }

    pub fn get(&self, name: NameId) -> Option<SymbolId> {
        self.names.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ─── ScopeTable ───────────────────────────────────────────────────────────────

/// All scopes of a session plus the scope <-> opening-node bijection.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
    by_node: HashMap<NodeId, ScopeId>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scope opened by `node`, creating it on first request.
    /// The flag is `true` when the scope was created by this call.
    pub fn get_or_create(&mut self, node: NodeId, parent: Option<ScopeId>) -> (ScopeId, bool) {
        if let Some(&id) = self.by_node.get(&node) {
            return (id, false);
        }
        let id = ScopeId::from_index(self.scopes.len());
        self.scopes.push(Scope { id, node, parent, names: HashMap::new() });
        self.by_node.insert(node, id);
        tracing::debug!(scope = %id, node = %node, "opened scope");
        (id, true)
    }

    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.by_node.get(&node).copied()
    }

    pub fn node_of(&self, scope: ScopeId) -> NodeId {
        self.get(scope).node
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
