use super::ProgramBuilder;
use crate::class::ClassId;
use crate::method::{MethodId, MethodRef, Subsignature};
use crate::stmt::{CallKind, CallSiteId, Invoke, InvokeExp, Stmt};
use crate::types::Type;
use crate::values::VarId;
use crate::{IrError, Result};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub(crate) struct FieldRef {
    pub class: ClassId,
    pub name: String,
}

// Field accesses stay symbolic until every class and field has been declared.
#[derive(Debug, Clone)]
pub(crate) enum PendingStmt {
    Ready(Stmt),
    LoadStatic {
        lhs: VarId,
        field: FieldRef,
    },
    StoreStatic {
        field: FieldRef,
        rhs: VarId,
    },
    LoadField {
        lhs: VarId,
        base: VarId,
        field: FieldRef,
    },
    StoreField {
        base: VarId,
        field: FieldRef,
        rhs: VarId,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct PendingBody {
    pub this: Option<VarId>,
    pub params: Vec<VarId>,
    pub vars: Vec<VarId>,
    pub stmts: Vec<PendingStmt>,
}

pub struct MethodBuilder<'a> {
    method: MethodId,
    class: ClassId,
    builder: &'a mut ProgramBuilder,
    vars: IndexMap<String, VarId>,
    params: Vec<VarId>,
    param_types: Vec<Type>,
    return_type: Type,
    is_static: bool,
    is_abstract: bool,
    is_native: bool,
    stmts: Vec<PendingStmt>,
    error: Option<IrError>,
}

impl<'a> MethodBuilder<'a> {
    pub(crate) fn new(class: ClassId, name: &str, builder: &'a mut ProgramBuilder) -> Self {
        let method = builder.reserve_method(class, name);
        Self {
            method,
            class,
            builder,
            vars: IndexMap::new(),
            params: Vec::new(),
            param_types: Vec::new(),
            return_type: Type::Void,
            is_static: false,
            is_abstract: false,
            is_native: false,
            stmts: Vec::new(),
            error: None,
        }
    }

    pub fn id(&self) -> MethodId {
        self.method
    }

    pub fn param(&mut self, name: &str, ty: &str) -> &mut Self {
        let Some(ty) = self.resolve_type(ty) else {
            return self;
        };
        if self.vars.contains_key(name) {
            self.fail(format!("duplicate parameter {}", name));
            return self;
        }
        let var = self.var(name);
        self.builder.set_var_type(var, ty.clone());
        self.params.push(var);
        self.param_types.push(ty);
        self
    }

    pub fn returns(&mut self, ty: &str) -> &mut Self {
        if let Some(ty) = self.resolve_type(ty) {
            self.return_type = ty;
        }
        self
    }

    pub fn static_(&mut self) -> &mut Self {
        self.is_static = true;
        self
    }

    pub fn abstract_(&mut self) -> &mut Self {
        self.is_abstract = true;
        self
    }

    pub fn native(&mut self) -> &mut Self {
        self.is_native = true;
        self
    }

    pub fn var(&mut self, name: &str) -> VarId {
        if let Some(var) = self.vars.get(name) {
            return *var;
        }
        let var = self.builder.new_var(self.method, name, None);
        self.vars.insert(name.to_string(), var);
        var
    }

    pub fn new_object(&mut self, lhs: &str, ty: &str) -> &mut Self {
        let Some(ty) = self.resolve_type(ty) else {
            return self;
        };
        if !ty.is_reference() {
            self.fail(format!("cannot allocate non-reference type {}", self.type_label(&ty)));
            return self;
        }
        let lhs = self.var(lhs);
        self.push(Stmt::New { lhs, ty })
    }

    pub fn copy(&mut self, lhs: &str, rhs: &str) -> &mut Self {
        let lhs = self.var(lhs);
        let rhs = self.var(rhs);
        self.push(Stmt::Copy { lhs, rhs })
    }

    pub fn load_static(&mut self, lhs: &str, class: &str, field: &str) -> &mut Self {
        let lhs = self.var(lhs);
        let field = self.field_ref(class, field);
        self.stmts.push(PendingStmt::LoadStatic { lhs, field });
        self
    }

    pub fn store_static(&mut self, class: &str, field: &str, rhs: &str) -> &mut Self {
        let field = self.field_ref(class, field);
        let rhs = self.var(rhs);
        self.stmts.push(PendingStmt::StoreStatic { field, rhs });
        self
    }

    pub fn load_field(&mut self, lhs: &str, base: &str, class: &str, field: &str) -> &mut Self {
        let lhs = self.var(lhs);
        let base = self.var(base);
        let field = self.field_ref(class, field);
        self.stmts.push(PendingStmt::LoadField { lhs, base, field });
        self
    }

    pub fn store_field(&mut self, base: &str, class: &str, field: &str, rhs: &str) -> &mut Self {
        let base = self.var(base);
        let field = self.field_ref(class, field);
        let rhs = self.var(rhs);
        self.stmts.push(PendingStmt::StoreField { base, field, rhs });
        self
    }

    pub fn load_array(&mut self, lhs: &str, base: &str, index: &str) -> &mut Self {
        let lhs = self.var(lhs);
        let base = self.var(base);
        self.push(Stmt::LoadArray {
            lhs,
            base,
            index: index.to_string(),
        })
    }

    pub fn store_array(&mut self, base: &str, index: &str, rhs: &str) -> &mut Self {
        let base = self.var(base);
        let rhs = self.var(rhs);
        self.push(Stmt::StoreArray {
            base,
            index: index.to_string(),
            rhs,
        })
    }

    pub fn invoke_static(
        &mut self,
        result: Option<&str>,
        class: &str,
        subsignature: &str,
        args: &[&str],
    ) -> &mut Self {
        self.invoke(CallKind::Static, result, None, class, subsignature, args)
    }

    pub fn invoke_special(
        &mut self,
        result: Option<&str>,
        base: &str,
        class: &str,
        subsignature: &str,
        args: &[&str],
    ) -> &mut Self {
        self.invoke(CallKind::Special, result, Some(base), class, subsignature, args)
    }

    pub fn invoke_virtual(
        &mut self,
        result: Option<&str>,
        base: &str,
        class: &str,
        subsignature: &str,
        args: &[&str],
    ) -> &mut Self {
        self.invoke(CallKind::Virtual, result, Some(base), class, subsignature, args)
    }

    pub fn invoke_interface(
        &mut self,
        result: Option<&str>,
        base: &str,
        class: &str,
        subsignature: &str,
        args: &[&str],
    ) -> &mut Self {
        self.invoke(CallKind::Interface, result, Some(base), class, subsignature, args)
    }

    pub fn invoke(
        &mut self,
        kind: CallKind,
        result: Option<&str>,
        base: Option<&str>,
        class: &str,
        subsignature: &str,
        args: &[&str],
    ) -> &mut Self {
        let subsignature = match Subsignature::parse(subsignature) {
            Ok(subsignature) => subsignature,
            Err(error) => {
                self.error.get_or_insert(error);
                return self;
            }
        };
        let method = MethodRef::new(self.builder.class_ref(class), subsignature);
        let result = result.map(|name| self.var(name));
        let args: Vec<VarId> = args.iter().map(|name| self.var(name)).collect();
        let base = base.map(|name| self.var(name));

        let exp = match (kind, base) {
            (CallKind::Static, None) => InvokeExp::Static { method, args },
            (CallKind::Dynamic, None) => InvokeExp::Dynamic { method, args },
            (CallKind::Special, Some(base)) => InvokeExp::Special { base, method, args },
            (CallKind::Virtual, Some(base)) => InvokeExp::Virtual { base, method, args },
            (CallKind::Interface, Some(base)) => InvokeExp::Interface { base, method, args },
            (kind, _) => {
                let expectation = match kind {
                    CallKind::Static | CallKind::Dynamic => "takes no receiver",
                    _ => "needs a receiver",
                };
                self.fail(format!("{} {}", kind.keyword(), expectation));
                return self;
            }
        };

        let id = CallSiteId(self.builder.next_call_site());
        self.builder.push_call_site(Invoke {
            id,
            container: self.method,
            index: self.stmts.len(),
            result,
            exp,
        });
        self.push(Stmt::Invoke(id))
    }

    pub fn return_var(&mut self, name: &str) -> &mut Self {
        let value = Some(self.var(name));
        self.push(Stmt::Return { value })
    }

    pub fn return_void(&mut self) -> &mut Self {
        self.push(Stmt::Return { value: None })
    }

    pub fn build(mut self) -> Result<MethodId> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        let param_names: Vec<String> = self
            .param_types
            .iter()
            .map(|ty| self.type_label(ty))
            .collect();
        let name = self.builder.method_data_mut(self.method).name.clone();
        let subsignature = Subsignature::new(&name, &param_names);

        let class = self.builder.class_data_mut(self.class);
        if class.methods.contains_key(&subsignature) {
            let class_name = class.name.clone();
            return Err(IrError::DuplicateMember {
                class: class_name,
                member: subsignature.to_string(),
            });
        }
        class.methods.insert(subsignature.clone(), self.method);
        self.builder.method_data_mut(self.method).subsignature = subsignature;

        let has_body = !self.is_abstract && !self.is_native;
        if !has_body && !self.stmts.is_empty() {
            return Err(self.invalid("abstract and native methods have no body"));
        }
        if self.is_static && self.vars.contains_key("this") {
            return Err(self.invalid("static methods have no this"));
        }

        let this = if has_body && !self.is_static {
            let this = self.var("this");
            self.builder.set_var_type(this, Type::Class(self.class));
            Some(this)
        } else {
            None
        };

        let method = self.builder.method_data_mut(self.method);
        method.param_types = std::mem::take(&mut self.param_types);
        method.return_type = self.return_type.clone();
        method.is_static = self.is_static;
        method.is_abstract = self.is_abstract;
        method.is_native = self.is_native;

        if has_body {
            let body = PendingBody {
                this,
                params: std::mem::take(&mut self.params),
                vars: self.vars.values().copied().collect(),
                stmts: std::mem::take(&mut self.stmts),
            };
            self.builder.set_body(self.method, body);
        }
        Ok(self.method)
    }

    fn push(&mut self, stmt: Stmt) -> &mut Self {
        self.stmts.push(PendingStmt::Ready(stmt));
        self
    }

    fn field_ref(&mut self, class: &str, name: &str) -> FieldRef {
        FieldRef {
            class: self.builder.class_ref(class),
            name: name.to_string(),
        }
    }

    fn resolve_type(&mut self, name: &str) -> Option<Type> {
        match self.builder.resolve_type(name) {
            Ok(ty) => Some(ty),
            Err(error) => {
                self.error.get_or_insert(error);
                None
            }
        }
    }

    fn type_label(&self, ty: &Type) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Primitive(p) => p.name().to_string(),
            Type::Class(id) => self.builder.class_name(*id).to_string(),
            Type::Array(elem) => format!("{}[]", self.type_label(elem)),
        }
    }

    fn invalid(&self, message: &str) -> IrError {
        IrError::InvalidStatement {
            method: self.builder.method_label(self.method),
            message: message.to_string(),
        }
    }

    fn fail(&mut self, message: String) {
        let error = self.invalid(&message);
        self.error.get_or_insert(error);
    }
}
