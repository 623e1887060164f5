use super::heap::ObjId;
use crate::method::MethodId;
use crate::stmt::CallSiteId;
use crate::types::Type;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u32);

impl ContextId {
    pub const EMPTY: ContextId = ContextId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_empty(self) -> bool {
        self == ContextId::EMPTY
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextElement {
    CallSite(CallSiteId),
    Object(ObjId),
    Type(Type),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Context(Vec<ContextElement>);

impl Context {
    pub fn elements(&self) -> &[ContextElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Contexts are interned; `ContextId::EMPTY` is always the empty context.
#[derive(Debug, Clone)]
pub struct ContextManager {
    contexts: IndexSet<Context, FxBuildHasher>,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextManager {
    pub fn new() -> Self {
        let mut contexts = IndexSet::with_hasher(FxBuildHasher);
        contexts.insert(Context::default());
        Self { contexts }
    }

    pub fn intern(&mut self, context: Context) -> ContextId {
        let (index, _) = self.contexts.insert_full(context);
        ContextId(index as u32)
    }

    pub fn get(&self, id: ContextId) -> &Context {
        &self.contexts[id.index()]
    }

    // Appends `element` to `parent` and keeps the most recent `limit` elements.
    pub fn append(&mut self, parent: ContextId, element: ContextElement, limit: usize) -> ContextId {
        if limit == 0 {
            return ContextId::EMPTY;
        }
        let parent = self.get(parent).elements();
        let keep = parent.len().min(limit - 1);
        let mut elements = Vec::with_capacity(keep + 1);
        elements.extend_from_slice(&parent[parent.len() - keep..]);
        elements.push(element);
        self.intern(Context(elements))
    }

    pub fn truncate(&mut self, context: ContextId, limit: usize) -> ContextId {
        let elements = self.get(context).elements();
        if elements.len() <= limit {
            return context;
        }
        let kept = elements[elements.len() - limit..].to_vec();
        self.intern(Context(kept))
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CsObj {
    pub context: ContextId,
    pub obj: ObjId,
}

impl CsObj {
    pub fn new(context: ContextId, obj: ObjId) -> Self {
        Self { context, obj }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CsMethod {
    pub context: ContextId,
    pub method: MethodId,
}

impl CsMethod {
    pub fn new(context: ContextId, method: MethodId) -> Self {
        Self { context, method }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CsCallSite {
    pub context: ContextId,
    pub call_site: CallSiteId,
}

impl CsCallSite {
    pub fn new(context: ContextId, call_site: CallSiteId) -> Self {
        Self { context, call_site }
    }
}
