use super::callgraph::{CsCallGraph, Edge};
use super::context::{ContextId, ContextManager, CsCallSite, CsMethod, CsObj};
use super::heap::{AllocSite, HeapModel};
use super::options::AnalysisOptions;
use super::pointer::{Pointer, PointerFlowGraph, PointerId};
use super::points_to::PointsToSet;
use super::result::{PointerAnalysisResult, SolverStatistics};
use super::selector::ContextSelector;
use super::work_list::WorkList;
use crate::class::FieldId;
use crate::format::{format_call_site, format_method};
use crate::hierarchy::ClassHierarchy;
use crate::program::Program;
use crate::stmt::{CallSiteId, InvokeExp, Stmt};
use crate::values::VarId;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverPhase {
    Uninitialized,
    Initialized,
    Propagating,
    Fixpoint,
}

pub struct Solver<'p> {
    program: &'p Program,
    hierarchy: ClassHierarchy<'p>,
    options: AnalysisOptions,
    selector: Box<dyn ContextSelector>,
    heap: Box<dyn HeapModel>,
    contexts: ContextManager,
    pfg: PointerFlowGraph,
    work_list: WorkList,
    call_graph: CsCallGraph,
    pending_methods: VecDeque<CsMethod>,
    phase: SolverPhase,
    processed_entries: usize,
    started: Option<Instant>,
}

impl<'p> Solver<'p> {
    pub fn new(
        program: &'p Program,
        options: AnalysisOptions,
        selector: Box<dyn ContextSelector>,
        heap: Box<dyn HeapModel>,
    ) -> Self {
        Self {
            program,
            hierarchy: program.hierarchy(),
            options,
            selector,
            heap,
            contexts: ContextManager::new(),
            pfg: PointerFlowGraph::new(),
            work_list: WorkList::new(),
            call_graph: CsCallGraph::new(),
            pending_methods: VecDeque::new(),
            phase: SolverPhase::Uninitialized,
            processed_entries: 0,
            started: None,
        }
    }

    pub fn phase(&self) -> SolverPhase {
        self.phase
    }

    pub fn pfg(&self) -> &PointerFlowGraph {
        &self.pfg
    }

    pub fn call_graph(&self) -> &CsCallGraph {
        &self.call_graph
    }

    pub fn contexts(&self) -> &ContextManager {
        &self.contexts
    }

    pub fn work_list(&self) -> &WorkList {
        &self.work_list
    }

    pub fn solve(mut self) -> PointerAnalysisResult<'p> {
        self.initialize();
        while self.step() {}
        self.finish()
    }

    // Makes the entry method reachable in the empty context.
    pub fn initialize(&mut self) {
        if self.phase != SolverPhase::Uninitialized {
            return;
        }
        self.started = Some(Instant::now());
        info!(
            selector = %self.selector.name(),
            heap_model = self.heap.name(),
            entry = %format_method(self.program, self.program.entry()),
            "pointer analysis started"
        );
        let entry = CsMethod::new(ContextId::EMPTY, self.program.entry());
        self.call_graph.add_entry_method(entry);
        self.add_reachable(entry);
        self.drain_reachable();
        self.phase = SolverPhase::Initialized;
    }

    // Processes one work-list entry. Returns false once the fixpoint is reached.
    pub fn step(&mut self) -> bool {
        if self.phase == SolverPhase::Uninitialized {
            self.initialize();
        }
        let Some((pointer, pts)) = self.work_list.poll_entry() else {
            self.phase = SolverPhase::Fixpoint;
            return false;
        };
        self.phase = SolverPhase::Propagating;
        self.processed_entries += 1;

        let delta = self.propagate(pointer, &pts);
        if !delta.is_empty() {
            if let Pointer::Var { context, var } = *self.pfg.pointer(pointer) {
                self.process_var_delta(context, var, &delta);
            }
        }
        self.drain_reachable();
        true
    }

    // Adds the new part of `incoming` to the pointer and forwards only that part.
    pub fn propagate(&mut self, pointer: PointerId, incoming: &PointsToSet) -> PointsToSet {
        let delta = incoming.diff(self.pfg.points_to(pointer));
        if delta.is_empty() {
            return delta;
        }
        trace!(pointer = %pointer, size = delta.len(), "propagate");
        self.pfg.points_to_mut(pointer).add_all(&delta);
        for successor in self.pfg.successors_of(pointer) {
            self.work_list.add_entry(successor, delta.clone());
        }
        delta
    }

    // A new edge immediately receives whatever the source already points to.
    pub fn add_pfg_edge(&mut self, source: PointerId, target: PointerId) {
        if self.pfg.add_edge(source, target) {
            let pts = self.pfg.points_to(source);
            if !pts.is_empty() {
                self.work_list.add_entry(target, pts.clone());
            }
        }
    }

    pub fn var_pointer(&mut self, context: ContextId, var: VarId) -> PointerId {
        self.pfg.get_or_create(Pointer::Var { context, var })
    }

    fn static_field_pointer(&mut self, field: FieldId) -> PointerId {
        self.pfg.get_or_create(Pointer::StaticField(field))
    }

    fn instance_field_pointer(&mut self, base: CsObj, field: FieldId) -> PointerId {
        self.pfg.get_or_create(Pointer::InstanceField { base, field })
    }

    fn array_index_pointer(&mut self, array: CsObj) -> PointerId {
        self.pfg.get_or_create(Pointer::ArrayIndex(array))
    }

    fn add_reachable(&mut self, method: CsMethod) {
        if self.call_graph.add_reachable_method(method) {
            debug!(
                method = %format_method(self.program, method.method),
                context = %method.context,
                "new reachable method"
            );
            self.pending_methods.push_back(method);
        }
    }

    fn drain_reachable(&mut self) {
        while let Some(method) = self.pending_methods.pop_front() {
            self.process_method(method);
        }
    }

    fn process_method(&mut self, cs_method: CsMethod) {
        let program = self.program;
        let Some(ir) = &program.method(cs_method.method).ir else {
            return;
        };
        let context = cs_method.context;
        for (index, stmt) in ir.stmts.iter().enumerate() {
            match stmt {
                Stmt::New { lhs, ty } => {
                    let site = AllocSite {
                        method: cs_method.method,
                        index,
                    };
                    let obj = self.heap.obj_for(program, site, ty);
                    let heap_context = self.selector.select_heap(&mut self.contexts, context);
                    let pointer = self.var_pointer(context, *lhs);
                    self.work_list.add_entry(
                        pointer,
                        PointsToSet::singleton(CsObj::new(heap_context, obj)),
                    );
                }
                Stmt::Copy { lhs, rhs } => {
                    let source = self.var_pointer(context, *rhs);
                    let target = self.var_pointer(context, *lhs);
                    self.add_pfg_edge(source, target);
                }
                Stmt::LoadStatic { lhs, field } => {
                    let source = self.static_field_pointer(*field);
                    let target = self.var_pointer(context, *lhs);
                    self.add_pfg_edge(source, target);
                }
                Stmt::StoreStatic { field, rhs } => {
                    let source = self.var_pointer(context, *rhs);
                    let target = self.static_field_pointer(*field);
                    self.add_pfg_edge(source, target);
                }
                Stmt::Invoke(call_site) => {
                    self.call_graph
                        .add_call_site(cs_method, CsCallSite::new(context, *call_site));
                    self.process_static_call(cs_method, *call_site);
                }
                // Field and array accesses wait for objects to reach their base variable.
                Stmt::LoadField { .. }
                | Stmt::StoreField { .. }
                | Stmt::LoadArray { .. }
                | Stmt::StoreArray { .. }
                | Stmt::Return { .. } => {}
            }
        }
    }

    fn process_static_call(&mut self, caller: CsMethod, call_site: CallSiteId) {
        let program = self.program;
        let invoke = program.call_site(call_site);
        match &invoke.exp {
            InvokeExp::Static { method, .. } => {
                let Some(callee) = self.hierarchy.resolve_method(method) else {
                    warn!(
                        call_site = %format_call_site(program, call_site),
                        "unresolved static call"
                    );
                    return;
                };
                let callee_context =
                    self.selector
                        .select_static(&mut self.contexts, caller.context, call_site);
                self.add_call_edge(Edge::new(
                    invoke.kind(),
                    caller,
                    CsCallSite::new(caller.context, call_site),
                    CsMethod::new(callee_context, callee),
                ));
            }
            InvokeExp::Dynamic { .. } => {
                debug!(
                    call_site = %format_call_site(program, call_site),
                    "dynamic call left unresolved"
                );
            }
            InvokeExp::Special { .. } | InvokeExp::Virtual { .. } | InvokeExp::Interface { .. } => {}
        }
    }

    fn process_var_delta(&mut self, context: ContextId, var: VarId, delta: &PointsToSet) {
        let program = self.program;
        let uses = program.var_uses(var);
        if uses.is_empty() {
            return;
        }
        for obj in delta.iter() {
            for (lhs, field) in &uses.load_fields {
                let source = self.instance_field_pointer(obj, *field);
                let target = self.var_pointer(context, *lhs);
                self.add_pfg_edge(source, target);
            }
            for (field, rhs) in &uses.store_fields {
                let source = self.var_pointer(context, *rhs);
                let target = self.instance_field_pointer(obj, *field);
                self.add_pfg_edge(source, target);
            }
            for lhs in &uses.load_arrays {
                let source = self.array_index_pointer(obj);
                let target = self.var_pointer(context, *lhs);
                self.add_pfg_edge(source, target);
            }
            for rhs in &uses.store_arrays {
                let source = self.var_pointer(context, *rhs);
                let target = self.array_index_pointer(obj);
                self.add_pfg_edge(source, target);
            }
            for call_site in &uses.invokes {
                self.process_instance_call(context, obj, *call_site);
            }
        }
    }

    fn process_instance_call(&mut self, context: ContextId, recv: CsObj, call_site: CallSiteId) {
        let program = self.program;
        let invoke = program.call_site(call_site);
        let method_ref = invoke.exp.method_ref();
        let callee = match &invoke.exp {
            InvokeExp::Special { .. } => self
                .hierarchy
                .dispatch(method_ref.class, &method_ref.subsignature),
            InvokeExp::Virtual { .. } | InvokeExp::Interface { .. } => {
                let recv_type = &self.heap.obj(recv.obj).ty;
                self.hierarchy
                    .dispatch_type(recv_type, &method_ref.subsignature)
            }
            InvokeExp::Static { .. } | InvokeExp::Dynamic { .. } => None,
        };
        let Some(callee) = callee else {
            trace!(
                call_site = %format_call_site(program, call_site),
                "no dispatch target"
            );
            return;
        };

        let callee_context = self.selector.select_instance(
            &mut self.contexts,
            context,
            call_site,
            recv,
            self.heap.obj(recv.obj),
        );
        if let Some(this) = program.method(callee).ir.as_ref().and_then(|ir| ir.this) {
            let pointer = self.var_pointer(callee_context, this);
            self.work_list
                .add_entry(pointer, PointsToSet::singleton(recv));
        }
        self.add_call_edge(Edge::new(
            invoke.kind(),
            CsMethod::new(context, invoke.container),
            CsCallSite::new(context, call_site),
            CsMethod::new(callee_context, callee),
        ));
    }

    // Arguments and returns are wired only when the edge is new.
    fn add_call_edge(&mut self, edge: Edge<CsCallSite, CsMethod>) {
        if !self.call_graph.add_edge(edge) {
            return;
        }
        let program = self.program;
        debug!(
            call_site = %format_call_site(program, edge.call_site.call_site),
            callee = %format_method(program, edge.callee.method),
            kind = %edge.kind,
            "new call edge"
        );
        self.add_reachable(edge.callee);

        let Some(callee_ir) = &program.method(edge.callee.method).ir else {
            return;
        };
        let invoke = program.call_site(edge.call_site.call_site);
        let caller_context = edge.call_site.context;
        let callee_context = edge.callee.context;
        for (arg, param) in invoke.exp.args().iter().zip(&callee_ir.params) {
            let source = self.var_pointer(caller_context, *arg);
            let target = self.var_pointer(callee_context, *param);
            self.add_pfg_edge(source, target);
        }
        if let Some(result) = invoke.result {
            let target = self.var_pointer(caller_context, result);
            for ret in &callee_ir.return_vars {
                let source = self.var_pointer(callee_context, *ret);
                self.add_pfg_edge(source, target);
            }
        }
    }

    fn finish(self) -> PointerAnalysisResult<'p> {
        let statistics = SolverStatistics {
            reachable_methods: 0,
            cs_methods: self.call_graph.number_of_methods(),
            call_edges: 0,
            cs_call_edges: self.call_graph.number_of_edges(),
            pointers: self.pfg.number_of_pointers(),
            pfg_edges: self.pfg.number_of_edges(),
            objects: self.heap.objects().len(),
            contexts: self.contexts.len(),
            processed_entries: self.processed_entries,
            elapsed: self.started.map(|s| s.elapsed()).unwrap_or_default(),
        };
        PointerAnalysisResult::new(
            self.program,
            self.options,
            self.pfg,
            self.heap.into_objects(),
            self.contexts,
            self.call_graph,
            statistics,
        )
    }
}
