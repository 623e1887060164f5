/*! Call graphs and the builders that produce them.
 *
 * The same container holds the context-sensitive graph grown by the pointer analysis and the
 * context-insensitive graphs consumers work with; `map` projects one onto the other. Builders
 * share one trait so callers do not care whether CHA or the pointer analysis answered.
 */

pub mod builder;
pub mod cha;

pub use builder::{CallGraphAlgorithm, CallGraphBuilder, PtaBuilder};
pub use cha::ChaBuilder;

use super::context::{CsCallSite, CsMethod};
use crate::method::MethodId;
use crate::stmt::{CallKind, CallSiteId};
use indexmap::{IndexMap, IndexSet};
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge<CS, M> {
    pub kind: CallKind,
    pub caller: M,
    pub call_site: CS,
    pub callee: M,
}

impl<CS, M> Edge<CS, M> {
    pub fn new(kind: CallKind, caller: M, call_site: CS, callee: M) -> Self {
        Self {
            kind,
            caller,
            call_site,
            callee,
        }
    }
}

pub type CiCallGraph = CallGraph<CallSiteId, MethodId>;
pub type CsCallGraph = CallGraph<CsCallSite, CsMethod>;

#[derive(Debug, Clone)]
pub struct CallGraph<CS, M>
where
    CS: Copy + Eq + Hash,
    M: Copy + Eq + Hash,
{
    entry_methods: IndexSet<M>,
    reachable_methods: IndexSet<M>,
    edges: IndexSet<Edge<CS, M>>,
    call_sites_in: IndexMap<M, IndexSet<CS>>,
    callees: IndexMap<CS, IndexSet<M>>,
    callers: IndexMap<M, IndexSet<CS>>,
}

impl<CS, M> Default for CallGraph<CS, M>
where
    CS: Copy + Eq + Hash,
    M: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self {
            entry_methods: IndexSet::new(),
            reachable_methods: IndexSet::new(),
            edges: IndexSet::new(),
            call_sites_in: IndexMap::new(),
            callees: IndexMap::new(),
            callers: IndexMap::new(),
        }
    }
}

impl<CS, M> CallGraph<CS, M>
where
    CS: Copy + Eq + Hash,
    M: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry_method(&mut self, method: M) {
        self.entry_methods.insert(method);
    }

    pub fn add_reachable_method(&mut self, method: M) -> bool {
        self.reachable_methods.insert(method)
    }

    pub fn add_call_site(&mut self, container: M, call_site: CS) {
        self.call_sites_in
            .entry(container)
            .or_default()
            .insert(call_site);
    }

    pub fn add_edge(&mut self, edge: Edge<CS, M>) -> bool {
        if !self.edges.insert(edge) {
            return false;
        }
        self.add_call_site(edge.caller, edge.call_site);
        self.callees
            .entry(edge.call_site)
            .or_default()
            .insert(edge.callee);
        self.callers
            .entry(edge.callee)
            .or_default()
            .insert(edge.call_site);
        true
    }

    pub fn contains(&self, method: M) -> bool {
        self.reachable_methods.contains(&method)
    }

    pub fn has_edge(&self, edge: &Edge<CS, M>) -> bool {
        self.edges.contains(edge)
    }

    pub fn callees_of(&self, call_site: CS) -> impl Iterator<Item = M> + '_ {
        self.callees
            .get(&call_site)
            .into_iter()
            .flat_map(|callees| callees.iter().copied())
    }

    pub fn callers_of(&self, method: M) -> impl Iterator<Item = CS> + '_ {
        self.callers
            .get(&method)
            .into_iter()
            .flat_map(|callers| callers.iter().copied())
    }

    pub fn call_sites_in(&self, method: M) -> impl Iterator<Item = CS> + '_ {
        self.call_sites_in
            .get(&method)
            .into_iter()
            .flat_map(|sites| sites.iter().copied())
    }

    pub fn edges_out_of(&self, call_site: CS) -> impl Iterator<Item = &Edge<CS, M>> + '_ {
        self.edges.iter().filter(move |edge| edge.call_site == call_site)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge<CS, M>> + '_ {
        self.edges.iter()
    }

    pub fn entry_methods(&self) -> impl Iterator<Item = M> + '_ {
        self.entry_methods.iter().copied()
    }

    pub fn reachable_methods(&self) -> impl Iterator<Item = M> + '_ {
        self.reachable_methods.iter().copied()
    }

    pub fn number_of_methods(&self) -> usize {
        self.reachable_methods.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    // Projects every node and edge; edges that become equal collapse into one.
    pub fn map<CS2, M2>(
        &self,
        map_call_site: impl Fn(CS) -> CS2,
        map_method: impl Fn(M) -> M2,
    ) -> CallGraph<CS2, M2>
    where
        CS2: Copy + Eq + Hash,
        M2: Copy + Eq + Hash,
    {
        let mut mapped = CallGraph::new();
        for method in self.entry_methods() {
            mapped.add_entry_method(map_method(method));
        }
        for method in self.reachable_methods() {
            mapped.add_reachable_method(map_method(method));
        }
        for (method, sites) in &self.call_sites_in {
            for site in sites {
                mapped.add_call_site(map_method(*method), map_call_site(*site));
            }
        }
        for edge in self.edges() {
            mapped.add_edge(Edge::new(
                edge.kind,
                map_method(edge.caller),
                map_call_site(edge.call_site),
                map_method(edge.callee),
            ));
        }
        mapped
    }
}

impl CsCallGraph {
    pub fn to_context_insensitive(&self) -> CiCallGraph {
        self.map(|site| site.call_site, |method| method.method)
    }
}
