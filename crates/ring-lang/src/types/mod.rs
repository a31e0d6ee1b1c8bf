//! Structural types. Every distinct type is interned once, so type equality is handle equality.

pub mod interner;

pub use interner::TypeInterner;

id_type! {
    /// Handle to an interned [`Type`].
    TypeId
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimType {
    Nil,
    Int,
    Bool,
}

impl PrimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nil  => "nil",
            Self::Int  => "int",
            Self::Bool => "bool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Prim(PrimType),
    Func { params: Vec<TypeId>, ret: TypeId },
    Array { elem: TypeId },
}
