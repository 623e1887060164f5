use super::{CallGraphBuilder, CiCallGraph, Edge};
use crate::analysis::AnalysisError;
use crate::hierarchy::ClassHierarchy;
use crate::method::MethodId;
use crate::program::Program;
use crate::stmt::{InvokeExp, Stmt};
use indexmap::IndexSet;
use std::collections::VecDeque;
use tracing::{debug, info};

// Class hierarchy analysis: a virtual call may reach the override in every subclass of the
// declared receiver class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaBuilder;

impl ChaBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(hierarchy: &ClassHierarchy<'_>, exp: &InvokeExp) -> IndexSet<MethodId> {
        let method_ref = exp.method_ref();
        let subsignature = &method_ref.subsignature;
        let mut targets = IndexSet::new();
        match exp {
            InvokeExp::Static { .. } => {
                targets.extend(hierarchy.resolve_method(method_ref));
            }
            InvokeExp::Special { .. } => {
                targets.extend(hierarchy.dispatch(method_ref.class, subsignature));
            }
            InvokeExp::Virtual { .. } | InvokeExp::Interface { .. } => {
                for class in hierarchy.sub_classes_of(method_ref.class) {
                    targets.extend(hierarchy.dispatch(class, subsignature));
                }
            }
            InvokeExp::Dynamic { .. } => {}
        }
        targets
    }
}

impl CallGraphBuilder for ChaBuilder {
    fn name(&self) -> &'static str {
        "cha"
    }

    fn build(&self, program: &Program) -> Result<CiCallGraph, AnalysisError> {
        let hierarchy = program.hierarchy();
        let entry = program.entry();
        let mut call_graph = CiCallGraph::new();
        call_graph.add_entry_method(entry);
        call_graph.add_reachable_method(entry);

        let mut queue = VecDeque::from([entry]);
        while let Some(method) = queue.pop_front() {
            let Some(ir) = &program.method(method).ir else {
                continue;
            };
            for stmt in &ir.stmts {
                let Stmt::Invoke(call_site) = stmt else {
                    continue;
                };
                call_graph.add_call_site(method, *call_site);
                let invoke = program.call_site(*call_site);
                for callee in Self::resolve(&hierarchy, &invoke.exp) {
                    let edge = Edge::new(invoke.kind(), method, *call_site, callee);
                    if call_graph.add_edge(edge) && call_graph.add_reachable_method(callee) {
                        debug!(callee = %crate::format::format_method(program, callee), "cha reached");
                        queue.push_back(callee);
                    }
                }
            }
        }

        info!(
            methods = call_graph.number_of_methods(),
            edges = call_graph.number_of_edges(),
            "cha call graph built"
        );
        Ok(call_graph)
    }
}
