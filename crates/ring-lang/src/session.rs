//! Session-wide state shared by every stage of one compilation.

use crate::analysis::scopes::ScopeTable;
use crate::analysis::symbols::SymbolTable;
use crate::config::Config;
use crate::error::Diagnostics;
use crate::intern::{NameId, StringInterner};
use crate::syntax::ast::{AstArena, NodeId};
use crate::types::{TypeId, TypeInterner};

#[derive(Debug, Default)]
pub struct Session {
    pub config: Config,
    pub strings: StringInterner,
    pub ast: AstArena,
    pub types: TypeInterner,
    pub scopes: ScopeTable,
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
    /// The module-level `let` bound to the configured entry-point name.
    pub entry_point: Option<NodeId>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config, ..Self::default() }
    }

    /// True when `name` spells the configured entry point.
    pub fn is_entry_name(&self, name: NameId) -> bool {
        self.strings.resolve(name) == self.config.entry_point
    }

    pub fn name(&self, name: NameId) -> &str {
        self.strings.resolve(name)
    }

    pub fn type_name(&self, ty: TypeId) -> String {
        self.types.display(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_follows_config() {
        let mut session = Session::new(Config::default().with_entry_point("start"));
        let start = session.strings.intern("start");
        let main = session.strings.intern("main");
        assert!(session.is_entry_name(start));
        assert!(!session.is_entry_name(main));
    }

    #[test]
    fn starts_empty() {
        let session = Session::default();
        assert!(session.ast.is_empty());
        assert!(session.scopes.is_empty());
        assert!(session.symbols.is_empty());
        assert_eq!(session.types.len(), 3);
        assert_eq!(session.entry_point, None);
    }
}
