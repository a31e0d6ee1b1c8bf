use std::collections::HashMap;

use super::{PrimType, Type, TypeId};

/// Session-wide type table. The three primitives are interned up front.
#[derive(Debug)]
pub struct TypeInterner {
    types: Vec<Type>,
    ids: HashMap<Type, TypeId>,
    nil: TypeId,
    int: TypeId,
    bool: TypeId,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let placeholder = TypeId::from_index(0);
        let mut table = Self {
            types: Vec::new(),
            ids: HashMap::new(),
            nil: placeholder,
            int: placeholder,
            bool: placeholder,
        };
        table.nil = table.intern(Type::Prim(PrimType::Nil));
        table.int = table.intern(Type::Prim(PrimType::Int));
        table.bool = table.intern(Type::Prim(PrimType::Bool));
        table
    }

    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.ids.get(&ty) {
            return id;
        }
        let id = TypeId::from_index(self.types.len());
        tracing::trace!(%id, "interned new type");
        self.types.push(ty.clone());
        self.ids.insert(ty, id);
        id
    }

    pub fn prim(&self, prim: PrimType) -> TypeId {
        match prim {
            PrimType::Nil  => self.nil,
            PrimType::Int  => self.int,
            PrimType::Bool => self.bool,
        }
    }

    pub fn nil(&self) -> TypeId { self.nil }
    pub fn int(&self) -> TypeId { self.int }
    pub fn bool(&self) -> TypeId { self.bool }

    pub fn func(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.intern(Type::Func { params, ret })
    }

    pub fn array(&mut self, elem: TypeId) -> TypeId {
        self.intern(Type::Array { elem })
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// Parameter and return types of a function type.
    pub fn as_func(&self, id: TypeId) -> Option<(&[TypeId], TypeId)> {
        match self.get(id) {
            Type::Func { params, ret } => Some((params, *ret)),
            _ => None,
        }
    }

    pub fn array_elem(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Array { elem } => Some(*elem),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Source-syntax rendering, e.g. `fn(int, []bool) -> nil`.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Prim(prim) => prim.as_str().to_owned(),
            Type::Array { elem } => format!("[]{}", self.display(*elem)),
            Type::Func { params, ret } => {
                let params: Vec<String> = params.iter().map(|p| self.display(*p)).collect();
                format!("fn({}) -> {}", params.join(", "), self.display(*ret))
            }
        }
    }
}
