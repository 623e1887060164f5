use super::callgraph::{CiCallGraph, CsCallGraph};
use super::context::{Context, ContextElement, ContextId, ContextManager, CsObj};
use super::heap::{Obj, ObjId};
use super::options::AnalysisOptions;
use super::pointer::{Pointer, PointerFlowGraph};
use super::points_to::PointsToSet;
use crate::class::FieldId;
use crate::format::{format_call_site, format_field};
use crate::program::Program;
use crate::values::VarId;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverStatistics {
    pub reachable_methods: usize,
    pub cs_methods: usize,
    pub call_edges: usize,
    pub cs_call_edges: usize,
    pub pointers: usize,
    pub pfg_edges: usize,
    pub objects: usize,
    pub contexts: usize,
    pub processed_entries: usize,
    pub elapsed: Duration,
}

type ObjSet = IndexSet<ObjId>;

// Read-only view over a finished run. Context-sensitive facts are available as computed;
// the per-variable and per-field queries merge all contexts.
pub struct PointerAnalysisResult<'p> {
    program: &'p Program,
    options: AnalysisOptions,
    pfg: PointerFlowGraph,
    objects: Vec<Obj>,
    contexts: ContextManager,
    cs_call_graph: CsCallGraph,
    call_graph: CiCallGraph,
    var_points_to: IndexMap<VarId, ObjSet>,
    static_field_points_to: IndexMap<FieldId, ObjSet>,
    instance_field_points_to: IndexMap<(ObjId, FieldId), ObjSet>,
    array_index_points_to: IndexMap<ObjId, ObjSet>,
    field_cache: RefCell<FxHashMap<(VarId, FieldId), Vec<ObjId>>>,
    statistics: SolverStatistics,
}

impl<'p> PointerAnalysisResult<'p> {
    pub(crate) fn new(
        program: &'p Program,
        options: AnalysisOptions,
        pfg: PointerFlowGraph,
        objects: Vec<Obj>,
        contexts: ContextManager,
        cs_call_graph: CsCallGraph,
        mut statistics: SolverStatistics,
    ) -> Self {
        let call_graph = cs_call_graph.to_context_insensitive();
        statistics.reachable_methods = call_graph.number_of_methods();
        statistics.call_edges = call_graph.number_of_edges();

        let mut var_points_to: IndexMap<VarId, ObjSet> = IndexMap::new();
        let mut static_field_points_to: IndexMap<FieldId, ObjSet> = IndexMap::new();
        let mut instance_field_points_to: IndexMap<(ObjId, FieldId), ObjSet> = IndexMap::new();
        let mut array_index_points_to: IndexMap<ObjId, ObjSet> = IndexMap::new();
        for (id, pointer) in pfg.pointers() {
            let pts = pfg.points_to(id);
            if pts.is_empty() {
                continue;
            }
            let target = match *pointer {
                Pointer::Var { var, .. } => var_points_to.entry(var).or_default(),
                Pointer::StaticField(field) => static_field_points_to.entry(field).or_default(),
                Pointer::InstanceField { base, field } => instance_field_points_to
                    .entry((base.obj, field))
                    .or_default(),
                Pointer::ArrayIndex(array) => array_index_points_to.entry(array.obj).or_default(),
            };
            target.extend(pts.iter().map(|obj| obj.obj));
        }

        Self {
            program,
            options,
            pfg,
            objects,
            contexts,
            cs_call_graph,
            call_graph,
            var_points_to,
            static_field_points_to,
            instance_field_points_to,
            array_index_points_to,
            field_cache: RefCell::new(FxHashMap::default()),
            statistics,
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    pub fn pfg(&self) -> &PointerFlowGraph {
        &self.pfg
    }

    pub fn call_graph(&self) -> &CiCallGraph {
        &self.call_graph
    }

    pub fn cs_call_graph(&self) -> &CsCallGraph {
        &self.cs_call_graph
    }

    pub fn into_call_graph(self) -> CiCallGraph {
        self.call_graph
    }

    pub fn objects(&self) -> &[Obj] {
        &self.objects
    }

    pub fn obj(&self, id: ObjId) -> &Obj {
        &self.objects[id.index()]
    }

    pub fn context(&self, id: ContextId) -> &Context {
        self.contexts.get(id)
    }

    pub fn number_of_contexts(&self) -> usize {
        self.contexts.len()
    }

    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.var_points_to.keys().copied()
    }

    pub fn static_fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.static_field_points_to.keys().copied()
    }

    pub fn instance_fields(&self) -> impl Iterator<Item = (ObjId, FieldId)> + '_ {
        self.instance_field_points_to.keys().copied()
    }

    pub fn array_objects(&self) -> impl Iterator<Item = ObjId> + '_ {
        self.array_index_points_to.keys().copied()
    }

    pub fn points_to_var(&self, var: VarId) -> Vec<ObjId> {
        sorted(self.var_points_to.get(&var))
    }

    // Context-sensitive points-to set of one variable pointer, if the pointer exists.
    pub fn points_to_cs_var(&self, context: ContextId, var: VarId) -> Option<&PointsToSet> {
        self.pfg
            .lookup(&Pointer::Var { context, var })
            .map(|id| self.pfg.points_to(id))
    }

    pub fn points_to_static(&self, field: FieldId) -> Vec<ObjId> {
        if !self.program.field(field).is_static {
            warn!(
                field = %format_field(self.program, field),
                "static-field query on an instance field"
            );
        }
        sorted(self.static_field_points_to.get(&field))
    }

    pub fn points_to_instance_field(&self, obj: ObjId, field: FieldId) -> Vec<ObjId> {
        sorted(self.instance_field_points_to.get(&(obj, field)))
    }

    pub fn points_to_array(&self, array: ObjId) -> Vec<ObjId> {
        sorted(self.array_index_points_to.get(&array))
    }

    // Join of `o.field` over every object `o` the base variable may hold; cached per pair.
    pub fn points_to_field(&self, base: VarId, field: FieldId) -> Vec<ObjId> {
        if self.program.field(field).is_static {
            warn!(
                field = %format_field(self.program, field),
                "instance-field query on a static field"
            );
        }
        if let Some(cached) = self.field_cache.borrow().get(&(base, field)) {
            return cached.clone();
        }
        let mut joined = IndexSet::new();
        if let Some(bases) = self.var_points_to.get(&base) {
            for obj in bases {
                if let Some(pts) = self.instance_field_points_to.get(&(*obj, field)) {
                    joined.extend(pts.iter().copied());
                }
            }
        }
        let joined = sorted(Some(&joined));
        self.field_cache
            .borrow_mut()
            .insert((base, field), joined.clone());
        joined
    }

    pub fn may_alias(&self, a: VarId, b: VarId) -> bool {
        match (self.var_points_to.get(&a), self.var_points_to.get(&b)) {
            (Some(left), Some(right)) => left.iter().any(|obj| right.contains(obj)),
            _ => false,
        }
    }

    pub fn format_obj(&self, obj: ObjId) -> String {
        self.obj(obj).describe(self.program)
    }

    pub fn format_context(&self, context: ContextId) -> String {
        let elements: Vec<String> = self
            .context(context)
            .elements()
            .iter()
            .map(|element| match element {
                ContextElement::CallSite(call_site) => format_call_site(self.program, *call_site),
                ContextElement::Object(obj) => self.format_obj(*obj),
                ContextElement::Type(ty) => self.program.type_name(ty),
            })
            .collect();
        format!("[{}]", elements.join(", "))
    }

    pub fn format_cs_obj(&self, obj: CsObj) -> String {
        format!("{}:{}", self.format_context(obj.context), self.format_obj(obj.obj))
    }
}

fn sorted(set: Option<&ObjSet>) -> Vec<ObjId> {
    let mut objs: Vec<ObjId> = set.map(|s| s.iter().copied().collect()).unwrap_or_default();
    objs.sort();
    objs
}
