use crate::class::ClassId;
use crate::stmt::Stmt;
use crate::types::Type;
use crate::values::VarId;
use crate::{IrError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId(pub u32);

impl MethodId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method{}", self.0)
    }
}

// Method name plus parameter types, e.g. `foo(A,int[])`. Return types are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subsignature(String);

impl Subsignature {
    pub fn new<S: AsRef<str>>(name: &str, param_types: &[S]) -> Self {
        let params: Vec<&str> = param_types.iter().map(|p| p.as_ref().trim()).collect();
        Subsignature(format!("{}({})", name.trim(), params.join(",")))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = || IrError::InvalidSubsignature(text.to_string());
        let open = text.find('(').ok_or_else(invalid)?;
        let inner = text
            .get(open + 1..)
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let name = text[..open].trim();
        if name.is_empty() || inner.contains('(') || inner.contains(')') {
            return Err(invalid());
        }
        let params: Vec<&str> = inner
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        Ok(Subsignature::new(name, &params))
    }

    pub fn name(&self) -> &str {
        match self.0.find('(') {
            Some(open) => &self.0[..open],
            None => &self.0,
        }
    }

    pub fn param_names(&self) -> Vec<&str> {
        let inner = self
            .0
            .find('(')
            .and_then(|open| self.0[open + 1..].strip_suffix(')'))
            .unwrap_or("");
        inner.split(',').filter(|p| !p.is_empty()).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subsignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Symbolic reference carried by a call site; resolved against the hierarchy at analysis time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub class: ClassId,
    pub subsignature: Subsignature,
}

impl MethodRef {
    pub fn new(class: ClassId, subsignature: Subsignature) -> Self {
        Self {
            class,
            subsignature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub id: MethodId,
    pub name: String,
    pub declaring_class: ClassId,
    pub subsignature: Subsignature,
    pub param_types: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_native: bool,
    pub ir: Option<MethodIr>,
}

impl Method {
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_instance(&self) -> bool {
        !self.is_static
    }

    pub fn has_body(&self) -> bool {
        self.ir.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodIr {
    pub this: Option<VarId>,
    pub params: Vec<VarId>,
    pub vars: Vec<VarId>,
    pub stmts: Vec<Stmt>,
    pub return_vars: Vec<VarId>,
}

impl MethodIr {
    pub fn param(&self, index: usize) -> Option<VarId> {
        self.params.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsignature_normalizes_whitespace() {
        let parsed = Subsignature::parse(" foo( A , int[] ) ").unwrap();
        assert_eq!(parsed.as_str(), "foo(A,int[])");
        assert_eq!(parsed.name(), "foo");
        assert_eq!(parsed.param_names(), vec!["A", "int[]"]);
    }

    #[test]
    fn test_subsignature_without_params() {
        let parsed = Subsignature::parse("<init>()").unwrap();
        assert_eq!(parsed, Subsignature::new::<&str>("<init>", &[]));
        assert!(parsed.param_names().is_empty());
    }

    #[test]
    fn test_invalid_subsignature() {
        assert!(Subsignature::parse("foo").is_err());
        assert!(Subsignature::parse("(A)").is_err());
        assert!(Subsignature::parse("foo(A))").is_err());
    }
}
