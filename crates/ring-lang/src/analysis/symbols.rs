use crate::analysis::scopes::ScopeId;
use crate::intern::NameId;
use crate::syntax::ast::NodeId;
use crate::types::TypeId;

id_type! {
    /// Handle into the [`SymbolTable`].
    SymbolId
}

// ─── Symbol ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Extern,
    Let,
    Param,
}

/// Opaque slot a code generator attaches to a symbol (a value or function handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendValue(pub u64);

#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    /// Declaring node: the `let` or `extern`, or the function literal for parameters.
    pub node: Option<NodeId>,
    pub name: NameId,
    pub scope: ScopeId,
    /// `None` until the type checker infers it.
    pub ty: Option<TypeId>,
    pub kind: SymbolKind,
    pub backend: Option<BackendValue>,
}

// ─── SymbolTable ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        name: NameId,
        scope: ScopeId,
        node: Option<NodeId>,
        ty: Option<TypeId>,
        kind: SymbolKind,
    ) -> SymbolId {
        let id = SymbolId::from_index(self.symbols.len());
        self.symbols.push(Symbol { id, node, name, scope, ty, kind, backend: None });
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn set_backend(&mut self, id: SymbolId, value: BackendValue) {
        self.get_mut(id).backend = Some(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
