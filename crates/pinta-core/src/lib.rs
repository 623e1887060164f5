/*! Core IR model and whole-program pointer analysis.
 *
 * Answering "which objects can this variable hold" and "which methods can this call reach" needs
 * the whole program at once. This crate provides the object-oriented IR those questions are asked
 * about, the class hierarchy that resolves method dispatch, and the Andersen-style engine that
 * computes points-to sets and the call graph together.
 */

pub mod analysis;
pub mod builder;
pub mod class;
pub mod format;
pub mod hierarchy;
pub mod method;
pub mod persist;
pub mod program;
pub mod stmt;
pub mod types;
pub mod values;

pub use builder::{ClassBuilder, MethodBuilder, ProgramBuilder};
pub use class::{Class, ClassId, Field, FieldId};
pub use hierarchy::ClassHierarchy;
pub use method::{Method, MethodId, MethodIr, MethodRef, Subsignature};
pub use program::{Program, VarUses};
pub use stmt::{CallKind, CallSiteId, Invoke, InvokeExp, Stmt};
pub use types::{PrimitiveType, Type};
pub use values::{Var, VarId};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("Unknown class: {0}")]
    UnknownClass(String),
    #[error("Class {0} is referenced but never defined")]
    UndefinedClass(String),
    #[error("Duplicate class: {0}")]
    DuplicateClass(String),
    #[error("Duplicate member {member} in class {class}")]
    DuplicateMember { class: String, member: String },
    #[error("Unknown field {field} in class {class}")]
    UnknownField { class: String, field: String },
    #[error("Unknown method {subsignature} in class {class}")]
    UnknownMethod { class: String, subsignature: String },
    #[error("Unknown type: {0}")]
    UnknownType(String),
    #[error("Cyclic class hierarchy at {0}")]
    CyclicHierarchy(String),
    #[error("Invalid subsignature: {0}")]
    InvalidSubsignature(String),
    #[error("Invalid statement in {method}: {message}")]
    InvalidStatement { method: String, message: String },
    #[error("No entry method: {0}")]
    NoEntryMethod(String),
    #[error("Dangling {kind} id {index}")]
    DanglingId { kind: String, index: usize },
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
