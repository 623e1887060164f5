use super::context::{ContextElement, ContextId, ContextManager, CsObj};
use super::heap::Obj;
use super::ConfigError;
use crate::stmt::CallSiteId;
use crate::types::Type;
use indexmap::IndexMap;

// Computes the contexts of callees and of freshly allocated objects.
pub trait ContextSelector {
    fn name(&self) -> String;

    fn select_static(
        &self,
        contexts: &mut ContextManager,
        caller: ContextId,
        call_site: CallSiteId,
    ) -> ContextId;

    fn select_instance(
        &self,
        contexts: &mut ContextManager,
        caller: ContextId,
        call_site: CallSiteId,
        recv: CsObj,
        recv_obj: &Obj,
    ) -> ContextId;

    fn select_heap(&self, contexts: &mut ContextManager, method_context: ContextId) -> ContextId;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InsensitiveSelector;

impl ContextSelector for InsensitiveSelector {
    fn name(&self) -> String {
        "ci".to_string()
    }

    fn select_static(&self, _: &mut ContextManager, _: ContextId, _: CallSiteId) -> ContextId {
        ContextId::EMPTY
    }

    fn select_instance(
        &self,
        _: &mut ContextManager,
        _: ContextId,
        _: CallSiteId,
        _: CsObj,
        _: &Obj,
    ) -> ContextId {
        ContextId::EMPTY
    }

    fn select_heap(&self, _: &mut ContextManager, _: ContextId) -> ContextId {
        ContextId::EMPTY
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CallSiteSelector {
    limit: usize,
}

impl CallSiteSelector {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl ContextSelector for CallSiteSelector {
    fn name(&self) -> String {
        format!("{}-call", self.limit)
    }

    fn select_static(
        &self,
        contexts: &mut ContextManager,
        caller: ContextId,
        call_site: CallSiteId,
    ) -> ContextId {
        contexts.append(caller, ContextElement::CallSite(call_site), self.limit)
    }

    fn select_instance(
        &self,
        contexts: &mut ContextManager,
        caller: ContextId,
        call_site: CallSiteId,
        _recv: CsObj,
        _recv_obj: &Obj,
    ) -> ContextId {
        self.select_static(contexts, caller, call_site)
    }

    fn select_heap(&self, contexts: &mut ContextManager, method_context: ContextId) -> ContextId {
        contexts.truncate(method_context, self.limit - 1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ObjectSelector {
    limit: usize,
}

impl ObjectSelector {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl ContextSelector for ObjectSelector {
    fn name(&self) -> String {
        format!("{}-obj", self.limit)
    }

    // Static callees have no receiver and inherit the caller's context.
    fn select_static(&self, _: &mut ContextManager, caller: ContextId, _: CallSiteId) -> ContextId {
        caller
    }

    fn select_instance(
        &self,
        contexts: &mut ContextManager,
        _caller: ContextId,
        _call_site: CallSiteId,
        recv: CsObj,
        _recv_obj: &Obj,
    ) -> ContextId {
        contexts.append(recv.context, ContextElement::Object(recv.obj), self.limit)
    }

    fn select_heap(&self, contexts: &mut ContextManager, method_context: ContextId) -> ContextId {
        contexts.truncate(method_context, self.limit - 1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypeSelector {
    limit: usize,
}

impl TypeSelector {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl ContextSelector for TypeSelector {
    fn name(&self) -> String {
        format!("{}-type", self.limit)
    }

    fn select_static(&self, _: &mut ContextManager, caller: ContextId, _: CallSiteId) -> ContextId {
        caller
    }

    // The type element is the class containing the receiver's allocation site. Merged objects
    // have no site and contribute their own type.
    fn select_instance(
        &self,
        contexts: &mut ContextManager,
        _caller: ContextId,
        _call_site: CallSiteId,
        recv: CsObj,
        recv_obj: &Obj,
    ) -> ContextId {
        let ty = match recv_obj.container_class {
            Some(class) => Type::Class(class),
            None => recv_obj.ty.clone(),
        };
        contexts.append(recv.context, ContextElement::Type(ty), self.limit)
    }

    fn select_heap(&self, contexts: &mut ContextManager, method_context: ContextId) -> ContextId {
        contexts.truncate(method_context, self.limit - 1)
    }
}

pub type SelectorConstructor = fn(usize) -> Box<dyn ContextSelector>;

// Maps the kind in a `k-kind` selector name to its constructor.
pub struct SelectorRegistry {
    constructors: IndexMap<String, SelectorConstructor>,
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("call", |k| -> Box<dyn ContextSelector> {
            Box::new(CallSiteSelector::new(k))
        });
        registry.register("obj", |k| -> Box<dyn ContextSelector> {
            Box::new(ObjectSelector::new(k))
        });
        registry.register("type", |k| -> Box<dyn ContextSelector> {
            Box::new(TypeSelector::new(k))
        });
        registry
    }
}

impl SelectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    pub fn register(&mut self, kind: &str, constructor: SelectorConstructor) -> &mut Self {
        self.constructors.insert(kind.to_string(), constructor);
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        self.create(name).map(|_| ())
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn ContextSelector>, ConfigError> {
        let name = name.trim();
        if name == "ci" {
            return Ok(Box::new(InsensitiveSelector));
        }
        let (limit, kind) = name
            .split_once('-')
            .ok_or_else(|| ConfigError::UnknownSelector(name.to_string()))?;
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| ConfigError::UnknownSelector(name.to_string()))?;
        let limit: usize = limit
            .parse()
            .map_err(|_| ConfigError::InvalidContextLimit(name.to_string()))?;
        if limit == 0 {
            return Err(ConfigError::InvalidContextLimit(name.to_string()));
        }
        Ok(constructor(limit))
    }
}
