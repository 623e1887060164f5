/*! Inclusion-based pointer analysis with on-the-fly call graph construction.
 *
 * Which methods a virtual call reaches depends on which objects its receiver holds, and which
 * objects a variable holds depends on which methods are reachable. The solver computes both at
 * once: it propagates points-to deltas along a pointer flow graph that grows as new receivers,
 * field bases and array bases are discovered. Context sensitivity is a pluggable selector
 * (insensitive, k-call-site, k-object, k-type); the insensitive variant is the same engine with
 * every context empty.
 */

pub mod callgraph;
pub mod context;
pub mod heap;
pub mod options;
pub mod pointer;
pub mod points_to;
pub mod result;
pub mod selector;
pub mod solver;
pub mod work_list;

pub use callgraph::{
    CallGraph, CallGraphAlgorithm, CallGraphBuilder, ChaBuilder, CiCallGraph, CsCallGraph, Edge,
    PtaBuilder,
};
pub use context::{Context, ContextElement, ContextId, ContextManager, CsCallSite, CsMethod, CsObj};
pub use heap::{AllocSite, AllocationSiteModel, HeapModel, Obj, ObjId, TypeBasedModel};
pub use options::{AnalysisOptions, HeapModelKind};
pub use pointer::{Pointer, PointerFlowGraph, PointerId};
pub use points_to::PointsToSet;
pub use result::{PointerAnalysisResult, SolverStatistics};
pub use selector::{
    CallSiteSelector, ContextSelector, InsensitiveSelector, ObjectSelector, SelectorRegistry,
    TypeSelector,
};
pub use solver::{Solver, SolverPhase};
pub use work_list::WorkList;

use crate::format::format_method;
use crate::program::Program;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown context selector: {0}")]
    UnknownSelector(String),
    #[error("Invalid context limit in selector {0}")]
    InvalidContextLimit(String),
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("Invalid value {value:?} for option {key}")]
    InvalidOptionValue { key: String, value: String },
    #[error("Unknown heap model: {0}")]
    UnknownHeapModel(String),
    #[error("Unknown call graph algorithm: {0}")]
    UnknownCallGraphAlgorithm(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Entry method {0} has no body")]
    NoEntryMethod(String),
}

pub struct PointerAnalysis {
    options: AnalysisOptions,
    registry: SelectorRegistry,
}

impl PointerAnalysis {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            registry: SelectorRegistry::default(),
        }
    }

    pub fn ci() -> Self {
        Self::new(AnalysisOptions::default())
    }

    pub fn with_registry(mut self, registry: SelectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    // Configuration and entry are checked before any solving starts.
    pub fn solver<'p>(&self, program: &'p Program) -> Result<Solver<'p>, AnalysisError> {
        let selector = self.registry.create(&self.options.cs)?;
        let entry = program.entry();
        if !program.method(entry).has_body() {
            return Err(AnalysisError::NoEntryMethod(format_method(program, entry)));
        }
        Ok(Solver::new(
            program,
            self.options.clone(),
            selector,
            self.options.heap_model.create(),
        ))
    }

    pub fn analyze<'p>(
        &self,
        program: &'p Program,
    ) -> Result<PointerAnalysisResult<'p>, AnalysisError> {
        let result = self.solver(program)?.solve();
        let stats = result.statistics();
        info!(
            cs = %self.options.cs,
            reachable_methods = stats.reachable_methods,
            cs_methods = stats.cs_methods,
            call_edges = stats.call_edges,
            pointers = stats.pointers,
            pfg_edges = stats.pfg_edges,
            objects = stats.objects,
            contexts = stats.contexts,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "pointer analysis finished"
        );
        Ok(result)
    }
}
