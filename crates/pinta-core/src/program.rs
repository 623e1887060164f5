use crate::class::{Class, ClassId, Field, FieldId};
use crate::hierarchy::ClassHierarchy;
use crate::method::{Method, MethodId, Subsignature};
use crate::stmt::{CallSiteId, Invoke, Stmt};
use crate::types::Type;
use crate::values::{Var, VarId};
use crate::{IrError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// Statements that use a variable as the base of a field/array access or as a call receiver.
// The solver revisits these whenever new objects reach the variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarUses {
    pub load_fields: Vec<(VarId, FieldId)>,
    pub store_fields: Vec<(FieldId, VarId)>,
    pub load_arrays: Vec<VarId>,
    pub store_arrays: Vec<VarId>,
    pub invokes: Vec<CallSiteId>,
}

impl VarUses {
    pub fn is_empty(&self) -> bool {
        self.load_fields.is_empty()
            && self.store_fields.is_empty()
            && self.load_arrays.is_empty()
            && self.store_arrays.is_empty()
            && self.invokes.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ProgramParts")]
pub struct Program {
    classes: Vec<Class>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    vars: Vec<Var>,
    call_sites: Vec<Invoke>,
    entry: MethodId,
    #[serde(skip)]
    class_index: FxHashMap<String, ClassId>,
    #[serde(skip)]
    var_uses: Vec<VarUses>,
    #[serde(skip)]
    pub(crate) direct_subclasses: Vec<Vec<ClassId>>,
    #[serde(skip)]
    pub(crate) direct_subinterfaces: Vec<Vec<ClassId>>,
    #[serde(skip)]
    pub(crate) direct_implementors: Vec<Vec<ClassId>>,
}

#[derive(Deserialize)]
struct ProgramParts {
    classes: Vec<Class>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    vars: Vec<Var>,
    call_sites: Vec<Invoke>,
    entry: MethodId,
}

impl TryFrom<ProgramParts> for Program {
    type Error = IrError;

    fn try_from(parts: ProgramParts) -> Result<Self> {
        parts.check_ids()?;
        Ok(Program::from_parts(
            parts.classes,
            parts.fields,
            parts.methods,
            parts.vars,
            parts.call_sites,
            parts.entry,
        ))
    }
}

fn check_id(kind: &str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(IrError::DanglingId {
            kind: kind.to_string(),
            index,
        })
    }
}

impl ProgramParts {
    // Deserialized programs are untrusted: every cross reference must land inside its table
    // before the indexes are built.
    fn check_ids(&self) -> Result<()> {
        let class = |id: ClassId| check_id("class", id.index(), self.classes.len());
        let field = |id: FieldId| check_id("field", id.index(), self.fields.len());
        let method = |id: MethodId| check_id("method", id.index(), self.methods.len());
        let var = |id: VarId| check_id("var", id.index(), self.vars.len());
        let call_site = |id: CallSiteId| check_id("call site", id.index(), self.call_sites.len());
        let ty = |ty: &Type| match ty.base_type() {
            Type::Class(id) => class(*id),
            _ => Ok(()),
        };
        let at = |kind: &str, actual: usize, expected: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(IrError::DanglingId {
                    kind: kind.to_string(),
                    index: actual,
                })
            }
        };

        method(self.entry)?;
        for (i, c) in self.classes.iter().enumerate() {
            at("class", c.id.index(), i)?;
            c.super_class.map_or(Ok(()), class)?;
            c.interfaces.iter().try_for_each(|&id| class(id))?;
            c.fields.iter().try_for_each(|&id| field(id))?;
            c.methods.values().try_for_each(|&id| method(id))?;
        }
        for (i, f) in self.fields.iter().enumerate() {
            at("field", f.id.index(), i)?;
            class(f.declaring_class)?;
            ty(&f.ty)?;
        }
        for (i, m) in self.methods.iter().enumerate() {
            at("method", m.id.index(), i)?;
            class(m.declaring_class)?;
            m.param_types.iter().try_for_each(ty)?;
            ty(&m.return_type)?;
            let Some(ir) = &m.ir else { continue };
            ir.this.map_or(Ok(()), var)?;
            ir.params
                .iter()
                .chain(&ir.vars)
                .chain(&ir.return_vars)
                .try_for_each(|&id| var(id))?;
            for stmt in &ir.stmts {
                match stmt {
                    Stmt::New { lhs, ty: new_ty } => {
                        var(*lhs)?;
                        ty(new_ty)?;
                    }
                    Stmt::Copy { lhs, rhs } => {
                        var(*lhs)?;
                        var(*rhs)?;
                    }
                    Stmt::LoadStatic { lhs, field: f } => {
                        var(*lhs)?;
                        field(*f)?;
                    }
                    Stmt::StoreStatic { field: f, rhs } => {
                        field(*f)?;
                        var(*rhs)?;
                    }
                    Stmt::LoadField { lhs, base, field: f } => {
                        var(*lhs)?;
                        var(*base)?;
                        field(*f)?;
                    }
                    Stmt::StoreField { base, field: f, rhs } => {
                        var(*base)?;
                        field(*f)?;
                        var(*rhs)?;
                    }
                    Stmt::LoadArray { lhs, base, .. } => {
                        var(*lhs)?;
                        var(*base)?;
                    }
                    Stmt::StoreArray { base, rhs, .. } => {
                        var(*base)?;
                        var(*rhs)?;
                    }
                    Stmt::Invoke(id) => call_site(*id)?,
                    Stmt::Return { value } => value.map_or(Ok(()), var)?,
                }
            }
        }
        for (i, v) in self.vars.iter().enumerate() {
            at("var", v.id.index(), i)?;
            method(v.method)?;
            v.ty.as_ref().map_or(Ok(()), ty)?;
        }
        for (i, invoke) in self.call_sites.iter().enumerate() {
            at("call site", invoke.id.index(), i)?;
            method(invoke.container)?;
            invoke.result.map_or(Ok(()), var)?;
            invoke.exp.base().map_or(Ok(()), var)?;
            invoke.exp.args().iter().try_for_each(|&id| var(id))?;
            class(invoke.exp.method_ref().class)?;
        }
        Ok(())
    }
}

impl Program {
    pub(crate) fn from_parts(
        classes: Vec<Class>,
        fields: Vec<Field>,
        methods: Vec<Method>,
        vars: Vec<Var>,
        call_sites: Vec<Invoke>,
        entry: MethodId,
    ) -> Self {
        let mut program = Program {
            classes,
            fields,
            methods,
            vars,
            call_sites,
            entry,
            class_index: FxHashMap::default(),
            var_uses: Vec::new(),
            direct_subclasses: Vec::new(),
            direct_subinterfaces: Vec::new(),
            direct_implementors: Vec::new(),
        };
        program.build_indexes();
        program
    }

    fn build_indexes(&mut self) {
        self.class_index = self
            .classes
            .iter()
            .map(|class| (class.name.clone(), class.id))
            .collect();

        let class_count = self.classes.len();
        self.direct_subclasses = vec![Vec::new(); class_count];
        self.direct_subinterfaces = vec![Vec::new(); class_count];
        self.direct_implementors = vec![Vec::new(); class_count];
        for class in &self.classes {
            if let Some(super_class) = class.super_class {
                self.direct_subclasses[super_class.index()].push(class.id);
            }
            for iface in &class.interfaces {
                if class.is_interface {
                    self.direct_subinterfaces[iface.index()].push(class.id);
                } else {
                    self.direct_implementors[iface.index()].push(class.id);
                }
            }
        }

        self.var_uses = vec![VarUses::default(); self.vars.len()];
        for method in &self.methods {
            let Some(ir) = &method.ir else { continue };
            for stmt in &ir.stmts {
                match stmt {
                    Stmt::LoadField { lhs, base, field } => {
                        self.var_uses[base.index()].load_fields.push((*lhs, *field));
                    }
                    Stmt::StoreField { base, field, rhs } => {
                        self.var_uses[base.index()].store_fields.push((*field, *rhs));
                    }
                    Stmt::LoadArray { lhs, base, .. } => {
                        self.var_uses[base.index()].load_arrays.push(*lhs);
                    }
                    Stmt::StoreArray { base, rhs, .. } => {
                        self.var_uses[base.index()].store_arrays.push(*rhs);
                    }
                    Stmt::Invoke(cs) => {
                        if let Some(base) = self.call_sites[cs.index()].exp.base() {
                            self.var_uses[base.index()].invokes.push(*cs);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    pub fn entry(&self) -> MethodId {
        self.entry
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id.index()]
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id.index()]
    }

    pub fn var(&self, id: VarId) -> &Var {
        &self.vars[id.index()]
    }

    pub fn call_site(&self, id: CallSiteId) -> &Invoke {
        &self.call_sites[id.index()]
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn vars(&self) -> &[Var] {
        &self.vars
    }

    pub fn call_sites(&self) -> &[Invoke] {
        &self.call_sites
    }

    pub fn var_uses(&self, var: VarId) -> &VarUses {
        &self.var_uses[var.index()]
    }

    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.class_index.get(name).copied()
    }

    pub fn get_class(&self, name: &str) -> Option<&Class> {
        self.class_by_name(name).map(|id| self.class(id))
    }

    pub fn hierarchy(&self) -> ClassHierarchy<'_> {
        ClassHierarchy::new(self)
    }

    // Looks the field up in `class` and then its superclasses.
    pub fn lookup_field(&self, class: ClassId, name: &str) -> Option<FieldId> {
        let mut current = Some(class);
        while let Some(id) = current {
            let class = self.class(id);
            if let Some(field) = class
                .fields
                .iter()
                .copied()
                .find(|f| self.field(*f).name == name)
            {
                return Some(field);
            }
            current = class.super_class;
        }
        None
    }

    pub fn lookup_method(&self, class_name: &str, subsignature: &str) -> Option<MethodId> {
        let subsignature = Subsignature::parse(subsignature).ok()?;
        self.get_class(class_name)?.declared_method(&subsignature)
    }

    // Resolves a `<Class: name(T1,T2)>` signature to the method declared there.
    pub fn method_by_signature(&self, signature: &str) -> Result<MethodId> {
        let invalid = || IrError::InvalidSubsignature(signature.to_string());
        let inner = signature
            .trim()
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .ok_or_else(invalid)?;
        let (class_name, subsignature) = inner.split_once(':').ok_or_else(invalid)?;
        let class_name = class_name.trim();
        let class = self
            .get_class(class_name)
            .ok_or_else(|| IrError::UnknownClass(class_name.to_string()))?;
        let subsignature = Subsignature::parse(subsignature)?;
        class
            .declared_method(&subsignature)
            .ok_or_else(|| IrError::UnknownMethod {
                class: class_name.to_string(),
                subsignature: subsignature.to_string(),
            })
    }

    pub fn lookup_var(&self, method: MethodId, name: &str) -> Option<VarId> {
        self.method(method)
            .ir
            .as_ref()?
            .vars
            .iter()
            .copied()
            .find(|v| self.var(*v).name == name)
    }

    pub fn is_application_method(&self, method: MethodId) -> bool {
        self.class(self.method(method).declaring_class).is_application
    }

    pub fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Primitive(p) => p.name().to_string(),
            Type::Class(id) => self.class(*id).name.clone(),
            Type::Array(elem) => format!("{}[]", self.type_name(elem)),
        }
    }

    pub fn number_of_statements(&self) -> usize {
        self.methods
            .iter()
            .filter_map(|m| m.ir.as_ref())
            .map(|ir| ir.stmts.len())
            .sum()
    }
}
