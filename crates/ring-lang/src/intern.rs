//! String interning for identifiers and literal text.

use std::collections::HashMap;

id_type! {
    /// Handle to an interned string.
    StrId
}

/// A name is an interned identifier spelling.
pub type NameId = StrId;

/// Deduplicates source fragments into dense `StrId` handles, assigned in first-seen order.
#[derive(Debug, Default)]
pub struct StringInterner {
    ids: HashMap<String, StrId>,
    strings: Vec<String>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> StrId {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = StrId::from_index(self.strings.len());
        self.strings.push(text.to_owned());
        self.ids.insert(text.to_owned(), id);
        id
    }

    /// Looks a string up without inserting it.
    pub fn get(&self, text: &str) -> Option<StrId> {
        self.ids.get(text).copied()
    }

    pub fn resolve(&self, id: StrId) -> &str {
        &self.strings[id.index()]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
