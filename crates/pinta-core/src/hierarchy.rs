use crate::class::ClassId;
use crate::method::{MethodId, MethodRef, Subsignature};
use crate::program::Program;
use crate::types::Type;
use indexmap::IndexSet;
use std::collections::VecDeque;

pub const ROOT_CLASS: &str = "Object";

#[derive(Clone, Copy)]
pub struct ClassHierarchy<'p> {
    program: &'p Program,
}

impl<'p> ClassHierarchy<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    pub fn super_class(&self, class: ClassId) -> Option<ClassId> {
        self.program.class(class).super_class
    }

    pub fn interfaces(&self, class: ClassId) -> &'p [ClassId] {
        &self.program.class(class).interfaces
    }

    pub fn direct_subclasses(&self, class: ClassId) -> &'p [ClassId] {
        &self.program.direct_subclasses[class.index()]
    }

    pub fn direct_subinterfaces(&self, class: ClassId) -> &'p [ClassId] {
        &self.program.direct_subinterfaces[class.index()]
    }

    pub fn direct_implementors(&self, class: ClassId) -> &'p [ClassId] {
        &self.program.direct_implementors[class.index()]
    }

    pub fn declared_method(&self, class: ClassId, subsignature: &Subsignature) -> Option<MethodId> {
        self.program.class(class).declared_method(subsignature)
    }

    // Static resolution of a call site's target: the class itself, its superclasses, then
    // every superinterface.
    pub fn resolve_method(&self, method_ref: &MethodRef) -> Option<MethodId> {
        let subsignature = &method_ref.subsignature;
        let mut current = Some(method_ref.class);
        while let Some(class) = current {
            if let Some(method) = self.declared_method(class, subsignature) {
                return Some(method);
            }
            current = self.super_class(class);
        }
        self.superinterfaces_of(method_ref.class)
            .into_iter()
            .find_map(|iface| self.declared_method(iface, subsignature))
    }

    // Finds the concrete method invoked on an object whose runtime class is `class`.
    // Abstract declarations are skipped; interface default methods are the last resort.
    pub fn dispatch(&self, class: ClassId, subsignature: &Subsignature) -> Option<MethodId> {
        let mut current = Some(class);
        while let Some(id) = current {
            if let Some(method) = self.declared_method(id, subsignature) {
                if !self.program.method(method).is_abstract {
                    return Some(method);
                }
            }
            current = self.super_class(id);
        }
        self.superinterfaces_of(class)
            .into_iter()
            .filter_map(|iface| self.declared_method(iface, subsignature))
            .find(|method| !self.program.method(*method).is_abstract)
    }

    pub fn dispatch_type(&self, ty: &Type, subsignature: &Subsignature) -> Option<MethodId> {
        match ty {
            Type::Class(class) => self.dispatch(*class, subsignature),
            Type::Array(_) => {
                let root = self.program.class_by_name(ROOT_CLASS)?;
                self.dispatch(root, subsignature)
            }
            Type::Void | Type::Primitive(_) => None,
        }
    }

    // Every interface reachable from `class` through its superclass chain, breadth first.
    pub fn superinterfaces_of(&self, class: ClassId) -> IndexSet<ClassId> {
        let mut result = IndexSet::new();
        let mut queue = VecDeque::new();
        let mut current = Some(class);
        while let Some(id) = current {
            queue.extend(self.interfaces(id).iter().copied());
            current = self.super_class(id);
        }
        while let Some(iface) = queue.pop_front() {
            if result.insert(iface) {
                queue.extend(self.interfaces(iface).iter().copied());
            }
        }
        result
    }

    // The class itself plus every transitive subclass; for interfaces also every
    // subinterface and implementor (and their subclasses).
    pub fn sub_classes_of(&self, class: ClassId) -> IndexSet<ClassId> {
        let mut result = IndexSet::new();
        let mut queue = VecDeque::from([class]);
        while let Some(id) = queue.pop_front() {
            if !result.insert(id) {
                continue;
            }
            queue.extend(self.direct_subclasses(id).iter().copied());
            if self.program.class(id).is_interface {
                queue.extend(self.direct_subinterfaces(id).iter().copied());
                queue.extend(self.direct_implementors(id).iter().copied());
            }
        }
        result
    }

    pub fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup {
            return true;
        }
        let mut current = self.super_class(sub);
        while let Some(id) = current {
            if id == sup {
                return true;
            }
            current = self.super_class(id);
        }
        self.superinterfaces_of(sub).contains(&sup)
    }
}
