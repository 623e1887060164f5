/*! Fluent API for constructing programs.
 *
 * Statements name their variables, fields and classes by string; the builder interns variables
 * per method, declares classes on first reference and resolves field references once every class
 * is known. `build()` validates the whole program and computes the indexes the analysis relies on.
 */

pub mod class_builder;
pub mod method_builder;

pub use class_builder::ClassBuilder;
pub use method_builder::MethodBuilder;

use crate::class::{Class, ClassId, Field, FieldId};
use crate::hierarchy::ROOT_CLASS;
use crate::method::{Method, MethodId, MethodIr, Subsignature};
use crate::program::Program;
use crate::stmt::{Invoke, Stmt};
use crate::types::{split_type_name, PrimitiveType, Type};
use crate::values::{Var, VarId};
use crate::{IrError, Result};
use method_builder::{FieldRef, PendingBody, PendingStmt};
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Default)]
pub struct ProgramBuilder {
    classes: Vec<Class>,
    defined: Vec<bool>,
    class_index: FxHashMap<String, ClassId>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    bodies: Vec<Option<PendingBody>>,
    vars: Vec<Var>,
    call_sites: Vec<Invoke>,
    entry: Option<(String, String)>,
    errors: Vec<IrError>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&mut self, name: &str) -> ClassBuilder<'_> {
        let id = self.class_ref(name);
        if self.defined[id.index()] {
            self.errors.push(IrError::DuplicateClass(name.to_string()));
        }
        self.defined[id.index()] = true;
        ClassBuilder::new(id, self)
    }

    pub fn interface(&mut self, name: &str) -> ClassBuilder<'_> {
        let mut class = self.class(name);
        class.interface();
        class
    }

    pub fn entry(&mut self, class: &str, subsignature: &str) -> &mut Self {
        self.entry = Some((class.to_string(), subsignature.to_string()));
        self
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_index.get(name).copied()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.class_id(name)
            .map(|id| self.defined[id.index()])
            .unwrap_or(false)
    }

    // Declares the class on first reference; it must be defined before `build()`.
    pub(crate) fn class_ref(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_index.get(name) {
            return *id;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(Class::new(id, name));
        self.defined.push(false);
        self.class_index.insert(name.to_string(), id);
        id
    }

    pub(crate) fn resolve_type(&mut self, name: &str) -> Result<Type> {
        let (base, dims) = split_type_name(name);
        let valid_name = base
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.');
        if base.is_empty() || !valid_name || (base == "void" && dims > 0) {
            return Err(IrError::UnknownType(name.to_string()));
        }
        let mut ty = if base == "void" {
            Type::Void
        } else if let Ok(primitive) = base.parse::<PrimitiveType>() {
            Type::Primitive(primitive)
        } else {
            Type::Class(self.class_ref(base))
        };
        for _ in 0..dims {
            ty = Type::array_of(ty);
        }
        Ok(ty)
    }

    pub(crate) fn class_data_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.index()]
    }

    pub(crate) fn class_name(&self, id: ClassId) -> &str {
        &self.classes[id.index()].name
    }

    pub(crate) fn add_field(&mut self, class: ClassId, name: &str, ty: &str, is_static: bool) {
        let duplicate = self.classes[class.index()]
            .fields
            .iter()
            .any(|f| self.fields[f.index()].name == name);
        if duplicate {
            self.errors.push(IrError::DuplicateMember {
                class: self.class_name(class).to_string(),
                member: name.to_string(),
            });
            return;
        }
        let ty = match self.resolve_type(ty) {
            Ok(ty) => ty,
            Err(error) => {
                self.errors.push(error);
                return;
            }
        };
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(Field {
            id,
            name: name.to_string(),
            declaring_class: class,
            ty,
            is_static,
        });
        self.classes[class.index()].fields.push(id);
    }

    pub(crate) fn reserve_method(&mut self, class: ClassId, name: &str) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(Method {
            id,
            name: name.to_string(),
            declaring_class: class,
            subsignature: Subsignature::new::<&str>(name, &[]),
            param_types: Vec::new(),
            return_type: Type::Void,
            is_static: false,
            is_abstract: false,
            is_native: false,
            ir: None,
        });
        self.bodies.push(None);
        id
    }

    pub(crate) fn method_data_mut(&mut self, id: MethodId) -> &mut Method {
        &mut self.methods[id.index()]
    }

    pub(crate) fn set_body(&mut self, id: MethodId, body: PendingBody) {
        self.bodies[id.index()] = Some(body);
    }

    pub(crate) fn new_var(&mut self, method: MethodId, name: &str, ty: Option<Type>) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(Var::new(id, name, method, ty));
        id
    }

    pub(crate) fn set_var_type(&mut self, var: VarId, ty: Type) {
        self.vars[var.index()].ty = Some(ty);
    }

    pub(crate) fn push_call_site(&mut self, invoke: Invoke) {
        self.call_sites.push(invoke);
    }

    pub(crate) fn next_call_site(&self) -> u32 {
        self.call_sites.len() as u32
    }

    pub fn build(mut self) -> Result<Program> {
        if let Some(error) = self.errors.first() {
            return Err(error.clone());
        }

        for (index, defined) in self.defined.iter_mut().enumerate() {
            if *defined {
                continue;
            }
            let class = &mut self.classes[index];
            if class.name == ROOT_CLASS {
                class.is_application = false;
                *defined = true;
            } else {
                return Err(IrError::UndefinedClass(class.name.clone()));
            }
        }

        if let Some(root) = self.class_id(ROOT_CLASS) {
            for class in &mut self.classes {
                if class.id != root && !class.is_interface && class.super_class.is_none() {
                    class.super_class = Some(root);
                }
            }
        }
        self.check_acyclic()?;

        for index in 0..self.methods.len() {
            let Some(body) = self.bodies[index].take() else {
                continue;
            };
            let ir = self.lower_body(MethodId(index as u32), body)?;
            self.methods[index].ir = Some(ir);
        }

        let entry = self.resolve_entry()?;
        debug!(
            classes = self.classes.len(),
            methods = self.methods.len(),
            vars = self.vars.len(),
            "built program"
        );
        Ok(Program::from_parts(
            self.classes,
            self.fields,
            self.methods,
            self.vars,
            self.call_sites,
            entry,
        ))
    }

    fn check_acyclic(&self) -> Result<()> {
        for class in &self.classes {
            let mut steps = 0;
            let mut current = class.super_class;
            while let Some(id) = current {
                steps += 1;
                if steps > self.classes.len() {
                    return Err(IrError::CyclicHierarchy(class.name.clone()));
                }
                current = self.classes[id.index()].super_class;
            }
        }
        Ok(())
    }

    fn lookup_field(&self, field: &FieldRef) -> Option<FieldId> {
        let mut current = Some(field.class);
        while let Some(id) = current {
            let class = &self.classes[id.index()];
            if let Some(found) = class
                .fields
                .iter()
                .copied()
                .find(|f| self.fields[f.index()].name == field.name)
            {
                return Some(found);
            }
            current = class.super_class;
        }
        None
    }

    fn resolve_field(&self, method: MethodId, field: &FieldRef, is_static: bool) -> Result<FieldId> {
        let id = self.lookup_field(field).ok_or_else(|| IrError::UnknownField {
            class: self.class_name(field.class).to_string(),
            field: field.name.clone(),
        })?;
        if self.fields[id.index()].is_static != is_static {
            let actual = if is_static { "an instance" } else { "a static" };
            return Err(IrError::InvalidStatement {
                method: self.method_label(method),
                message: format!(
                    "<{}: {}> is {} field",
                    self.class_name(field.class),
                    field.name,
                    actual
                ),
            });
        }
        Ok(id)
    }

    fn lower_body(&self, method: MethodId, body: PendingBody) -> Result<MethodIr> {
        let mut stmts = Vec::with_capacity(body.stmts.len());
        let mut return_vars = Vec::new();
        for pending in body.stmts {
            let stmt = match pending {
                PendingStmt::Ready(stmt) => stmt,
                PendingStmt::LoadStatic { lhs, field } => Stmt::LoadStatic {
                    lhs,
                    field: self.resolve_field(method, &field, true)?,
                },
                PendingStmt::StoreStatic { field, rhs } => Stmt::StoreStatic {
                    field: self.resolve_field(method, &field, true)?,
                    rhs,
                },
                PendingStmt::LoadField { lhs, base, field } => Stmt::LoadField {
                    lhs,
                    base,
                    field: self.resolve_field(method, &field, false)?,
                },
                PendingStmt::StoreField { base, field, rhs } => Stmt::StoreField {
                    base,
                    field: self.resolve_field(method, &field, false)?,
                    rhs,
                },
            };
            if let Stmt::Return { value: Some(var) } = &stmt {
                if !return_vars.contains(var) {
                    return_vars.push(*var);
                }
            }
            stmts.push(stmt);
        }
        Ok(MethodIr {
            this: body.this,
            params: body.params,
            vars: body.vars,
            stmts,
            return_vars,
        })
    }

    fn resolve_entry(&self) -> Result<MethodId> {
        if let Some((class, subsignature)) = &self.entry {
            let label = format!("<{}: {}>", class, subsignature);
            let subsignature = Subsignature::parse(subsignature)?;
            let class = self
                .class_id(class)
                .ok_or_else(|| IrError::NoEntryMethod(label.clone()))?;
            return self.classes[class.index()]
                .declared_method(&subsignature)
                .ok_or(IrError::NoEntryMethod(label));
        }

        let mut candidates = self
            .methods
            .iter()
            .filter(|m| m.is_static && m.name == "main" && m.ir.is_some())
            .filter(|m| {
                self.classes[m.declaring_class.index()].declared_method(&m.subsignature)
                    == Some(m.id)
            });
        match (candidates.next(), candidates.next()) {
            (Some(main), None) => Ok(main.id),
            (Some(_), Some(_)) => Err(IrError::NoEntryMethod(
                "several static main methods; declare the entry explicitly".to_string(),
            )),
            (None, _) => Err(IrError::NoEntryMethod("no static main method".to_string())),
        }
    }

    pub(crate) fn method_label(&self, method: MethodId) -> String {
        let method = &self.methods[method.index()];
        format!(
            "<{}: {}>",
            self.class_name(method.declaring_class),
            method.subsignature
        )
    }
}
