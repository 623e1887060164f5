use crate::class::ClassId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    Class(ClassId),
    Array(Box<Type>),
}

impl Type {
    pub fn array_of(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_))
    }

    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            Type::Class(id) => Some(*id),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            Type::Array(elem) => 1 + elem.dimensions(),
            _ => 0,
        }
    }

    pub fn base_type(&self) -> &Type {
        match self {
            Type::Array(elem) => elem.base_type(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(PrimitiveType::Boolean),
            "byte" => Ok(PrimitiveType::Byte),
            "char" => Ok(PrimitiveType::Char),
            "short" => Ok(PrimitiveType::Short),
            "int" => Ok(PrimitiveType::Int),
            "long" => Ok(PrimitiveType::Long),
            "float" => Ok(PrimitiveType::Float),
            "double" => Ok(PrimitiveType::Double),
            _ => Err(()),
        }
    }
}

// "A[][]" -> ("A", 2)
pub fn split_type_name(name: &str) -> (&str, usize) {
    let mut base = name.trim();
    let mut dims = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped.trim_end();
        dims += 1;
    }
    (base, dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_type_name() {
        assert_eq!(split_type_name("A"), ("A", 0));
        assert_eq!(split_type_name("int[]"), ("int", 1));
        assert_eq!(split_type_name("Object[][]"), ("Object", 2));
    }

    #[test]
    fn test_array_helpers() {
        let ty = Type::array_of(Type::array_of(Type::Class(ClassId(3))));
        assert_eq!(ty.dimensions(), 2);
        assert_eq!(ty.base_type(), &Type::Class(ClassId(3)));
        assert!(ty.is_reference());
        assert!(!Type::Primitive(PrimitiveType::Int).is_reference());
    }
}
