use crate::class::FieldId;
use crate::method::{MethodId, MethodRef};
use crate::types::Type;
use crate::values::VarId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallSiteId(pub u32);

impl CallSiteId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CallSiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cs{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    New {
        lhs: VarId,
        ty: Type,
    },
    Copy {
        lhs: VarId,
        rhs: VarId,
    },
    LoadStatic {
        lhs: VarId,
        field: FieldId,
    },
    StoreStatic {
        field: FieldId,
        rhs: VarId,
    },
    LoadField {
        lhs: VarId,
        base: VarId,
        field: FieldId,
    },
    StoreField {
        base: VarId,
        field: FieldId,
        rhs: VarId,
    },
    // Array indexes are kept only for printing; all elements share one pointer per array object.
    LoadArray {
        lhs: VarId,
        base: VarId,
        index: String,
    },
    StoreArray {
        base: VarId,
        index: String,
        rhs: VarId,
    },
    Invoke(CallSiteId),
    Return {
        value: Option<VarId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CallKind {
    Static,
    Special,
    Virtual,
    Interface,
    Dynamic,
}

impl CallKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CallKind::Static => "static",
            CallKind::Special => "special",
            CallKind::Virtual => "virtual",
            CallKind::Interface => "interface",
            CallKind::Dynamic => "dynamic",
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            CallKind::Static => "invokestatic",
            CallKind::Special => "invokespecial",
            CallKind::Virtual => "invokevirtual",
            CallKind::Interface => "invokeinterface",
            CallKind::Dynamic => "invokedynamic",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvokeExp {
    Static {
        method: MethodRef,
        args: Vec<VarId>,
    },
    Special {
        base: VarId,
        method: MethodRef,
        args: Vec<VarId>,
    },
    Virtual {
        base: VarId,
        method: MethodRef,
        args: Vec<VarId>,
    },
    Interface {
        base: VarId,
        method: MethodRef,
        args: Vec<VarId>,
    },
    Dynamic {
        method: MethodRef,
        args: Vec<VarId>,
    },
}

impl InvokeExp {
    pub fn kind(&self) -> CallKind {
        match self {
            InvokeExp::Static { .. } => CallKind::Static,
            InvokeExp::Special { .. } => CallKind::Special,
            InvokeExp::Virtual { .. } => CallKind::Virtual,
            InvokeExp::Interface { .. } => CallKind::Interface,
            InvokeExp::Dynamic { .. } => CallKind::Dynamic,
        }
    }

    pub fn base(&self) -> Option<VarId> {
        match self {
            InvokeExp::Special { base, .. }
            | InvokeExp::Virtual { base, .. }
            | InvokeExp::Interface { base, .. } => Some(*base),
            InvokeExp::Static { .. } | InvokeExp::Dynamic { .. } => None,
        }
    }

    pub fn method_ref(&self) -> &MethodRef {
        match self {
            InvokeExp::Static { method, .. }
            | InvokeExp::Special { method, .. }
            | InvokeExp::Virtual { method, .. }
            | InvokeExp::Interface { method, .. }
            | InvokeExp::Dynamic { method, .. } => method,
        }
    }

    pub fn args(&self) -> &[VarId] {
        match self {
            InvokeExp::Static { args, .. }
            | InvokeExp::Special { args, .. }
            | InvokeExp::Virtual { args, .. }
            | InvokeExp::Interface { args, .. }
            | InvokeExp::Dynamic { args, .. } => args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoke {
    pub id: CallSiteId,
    pub container: MethodId,
    pub index: usize,
    pub result: Option<VarId>,
    pub exp: InvokeExp,
}

impl Invoke {
    pub fn kind(&self) -> CallKind {
        self.exp.kind()
    }
}
