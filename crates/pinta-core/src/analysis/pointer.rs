use super::context::{ContextId, CsObj};
use super::points_to::PointsToSet;
use crate::class::FieldId;
use crate::values::VarId;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u32);

impl PointerId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pointer {
    Var { context: ContextId, var: VarId },
    StaticField(FieldId),
    InstanceField { base: CsObj, field: FieldId },
    ArrayIndex(CsObj),
}

// Nodes are interned by payload, so each pointer exists once and keeps its id for the whole run.
#[derive(Debug, Clone, Default)]
pub struct PointerFlowGraph {
    pointers: IndexSet<Pointer, FxBuildHasher>,
    points_to: Vec<PointsToSet>,
    successors: Vec<IndexSet<PointerId, FxBuildHasher>>,
    edge_count: usize,
}

impl PointerFlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, pointer: Pointer) -> PointerId {
        let (index, inserted) = self.pointers.insert_full(pointer);
        if inserted {
            self.points_to.push(PointsToSet::new());
            self.successors.push(IndexSet::default());
        }
        PointerId(index as u32)
    }

    pub fn lookup(&self, pointer: &Pointer) -> Option<PointerId> {
        self.pointers
            .get_index_of(pointer)
            .map(|index| PointerId(index as u32))
    }

    pub fn pointer(&self, id: PointerId) -> &Pointer {
        &self.pointers[id.index()]
    }

    pub fn add_edge(&mut self, source: PointerId, target: PointerId) -> bool {
        let added = self.successors[source.index()].insert(target);
        if added {
            self.edge_count += 1;
        }
        added
    }

    pub fn has_edge(&self, source: PointerId, target: PointerId) -> bool {
        self.successors[source.index()].contains(&target)
    }

    pub fn successors_of(&self, pointer: PointerId) -> impl Iterator<Item = PointerId> + '_ {
        self.successors[pointer.index()].iter().copied()
    }

    pub fn points_to(&self, pointer: PointerId) -> &PointsToSet {
        &self.points_to[pointer.index()]
    }

    pub(crate) fn points_to_mut(&mut self, pointer: PointerId) -> &mut PointsToSet {
        &mut self.points_to[pointer.index()]
    }

    pub fn pointers(&self) -> impl Iterator<Item = (PointerId, &Pointer)> + '_ {
        self.pointers
            .iter()
            .enumerate()
            .map(|(index, pointer)| (PointerId(index as u32), pointer))
    }

    pub fn number_of_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edge_count
    }
}
