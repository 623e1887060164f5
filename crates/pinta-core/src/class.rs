use crate::method::{MethodId, Subsignature};
use crate::types::Type;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub u32);

impl FieldId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub super_class: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub is_application: bool,
    pub fields: Vec<FieldId>,
    pub methods: IndexMap<Subsignature, MethodId>,
}

impl Class {
    pub fn new(id: ClassId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            super_class: None,
            interfaces: Vec::new(),
            is_interface: false,
            is_abstract: false,
            is_application: true,
            fields: Vec::new(),
            methods: IndexMap::new(),
        }
    }

    pub fn declared_method(&self, subsignature: &Subsignature) -> Option<MethodId> {
        self.methods.get(subsignature).copied()
    }

    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.methods.values().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub declaring_class: ClassId,
    pub ty: Type,
    pub is_static: bool,
}
