use crate::class::ClassId;
use crate::method::MethodId;
use crate::program::Program;
use crate::types::Type;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjId(pub u32);

impl ObjId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllocSite {
    pub method: MethodId,
    pub index: usize,
}

// An abstract object. Allocation-site objects remember where they were created; merged objects
// stand for every allocation of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obj {
    pub id: ObjId,
    pub ty: Type,
    pub site: Option<AllocSite>,
    pub container_class: Option<ClassId>,
}

impl Obj {
    pub fn container_method(&self) -> Option<MethodId> {
        self.site.map(|site| site.method)
    }

    pub fn describe(&self, program: &Program) -> String {
        let ty = program.type_name(&self.ty);
        match self.site {
            Some(site) => format!(
                "NewObj{{{}[{}]:{}}}",
                crate::format::format_method(program, site.method),
                site.index,
                ty
            ),
            None => format!("MergedObj{{{}}}", ty),
        }
    }
}

pub trait HeapModel {
    fn name(&self) -> &'static str;

    fn obj_for(&mut self, program: &Program, site: AllocSite, ty: &Type) -> ObjId;

    fn obj(&self, id: ObjId) -> &Obj;

    fn objects(&self) -> &[Obj];

    fn into_objects(self: Box<Self>) -> Vec<Obj>;
}

#[derive(Debug, Default)]
pub struct AllocationSiteModel {
    objects: Vec<Obj>,
    by_site: FxHashMap<AllocSite, ObjId>,
}

impl AllocationSiteModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HeapModel for AllocationSiteModel {
    fn name(&self) -> &'static str {
        "alloc-site"
    }

    fn obj_for(&mut self, program: &Program, site: AllocSite, ty: &Type) -> ObjId {
        if let Some(id) = self.by_site.get(&site) {
            return *id;
        }
        let id = ObjId(self.objects.len() as u32);
        self.objects.push(Obj {
            id,
            ty: ty.clone(),
            site: Some(site),
            container_class: Some(program.method(site.method).declaring_class),
        });
        self.by_site.insert(site, id);
        id
    }

    fn obj(&self, id: ObjId) -> &Obj {
        &self.objects[id.index()]
    }

    fn objects(&self) -> &[Obj] {
        &self.objects
    }

    fn into_objects(self: Box<Self>) -> Vec<Obj> {
        self.objects
    }
}

#[derive(Debug, Default)]
pub struct TypeBasedModel {
    objects: Vec<Obj>,
    by_type: FxHashMap<Type, ObjId>,
}

impl TypeBasedModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HeapModel for TypeBasedModel {
    fn name(&self) -> &'static str {
        "type"
    }

    fn obj_for(&mut self, _program: &Program, _site: AllocSite, ty: &Type) -> ObjId {
        if let Some(id) = self.by_type.get(ty) {
            return *id;
        }
        let id = ObjId(self.objects.len() as u32);
        self.objects.push(Obj {
            id,
            ty: ty.clone(),
            site: None,
            container_class: None,
        });
        self.by_type.insert(ty.clone(), id);
        id
    }

    fn obj(&self, id: ObjId) -> &Obj {
        &self.objects[id.index()]
    }

    fn objects(&self) -> &[Obj] {
        &self.objects
    }

    fn into_objects(self: Box<Self>) -> Vec<Obj> {
        self.objects
    }
}
