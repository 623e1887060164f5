use crate::method::MethodId;
use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub u32);

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    pub id: VarId,
    pub name: String,
    pub method: MethodId,
    pub ty: Option<Type>,
}

impl Var {
    pub fn new(id: VarId, name: impl Into<String>, method: MethodId, ty: Option<Type>) -> Self {
        Self {
            id,
            name: name.into(),
            method,
            ty,
        }
    }

    pub fn is_this(&self) -> bool {
        self.name == "this"
    }
}
