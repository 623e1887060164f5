use super::fixtures::{boxes, main_var};
use crate::analysis::{
    AnalysisOptions, ContextId, CsObj, ObjId, PointerAnalysis, Pointer, PointerFlowGraph,
    PointsToSet, SolverPhase, WorkList,
};
use crate::class::FieldId;
use crate::values::VarId;
use pretty_assertions::assert_eq;

fn obj(id: u32) -> CsObj {
    CsObj::new(ContextId::EMPTY, ObjId(id))
}

#[test]
fn test_pointers_are_interned() {
    let mut pfg = PointerFlowGraph::new();
    let var = Pointer::Var {
        context: ContextId::EMPTY,
        var: VarId(3),
    };
    let first = pfg.get_or_create(var);
    let field = pfg.get_or_create(Pointer::StaticField(FieldId(0)));
    let again = pfg.get_or_create(var);

    assert_eq!(first, again);
    assert_ne!(first, field);
    assert_eq!(pfg.number_of_pointers(), 2);
    assert_eq!(pfg.lookup(&var), Some(first));
    assert_eq!(pfg.pointer(field), &Pointer::StaticField(FieldId(0)));
}

#[test]
fn test_edges_are_added_once() {
    let mut pfg = PointerFlowGraph::new();
    let a = pfg.get_or_create(Pointer::StaticField(FieldId(0)));
    let b = pfg.get_or_create(Pointer::StaticField(FieldId(1)));

    assert!(pfg.add_edge(a, b));
    assert!(!pfg.add_edge(a, b));
    assert_eq!(pfg.successors_of(a).collect::<Vec<_>>(), vec![b]);
    assert_eq!(pfg.number_of_edges(), 1);
    assert!(pfg.has_edge(a, b));
    assert!(!pfg.has_edge(b, a));
}

#[test]
fn test_points_to_delta() {
    let mut pts = PointsToSet::singleton(obj(1));
    let incoming: PointsToSet = [obj(1), obj(2), obj(3)].into_iter().collect();

    let delta = incoming.diff(&pts);
    assert_eq!(delta.iter().collect::<Vec<_>>(), vec![obj(2), obj(3)]);

    let added = pts.add_all(&incoming);
    assert_eq!(added, delta);
    assert_eq!(pts.len(), 3);
    assert!(pts.add_all(&incoming).is_empty());
    assert!(incoming.is_subset(&pts));
}

#[test]
fn test_work_list_is_fifo() {
    let mut pfg = PointerFlowGraph::new();
    let a = pfg.get_or_create(Pointer::StaticField(FieldId(0)));
    let b = pfg.get_or_create(Pointer::StaticField(FieldId(1)));
    let mut work_list = WorkList::new();
    work_list.add_entry(a, PointsToSet::singleton(obj(0)));
    work_list.add_entry(b, PointsToSet::singleton(obj(1)));

    assert_eq!(work_list.len(), 2);
    assert_eq!(work_list.poll_entry().map(|(p, _)| p), Some(a));
    assert_eq!(work_list.poll_entry().map(|(p, _)| p), Some(b));
    assert!(work_list.poll_entry().is_none());
    assert!(work_list.is_empty());
}

#[test]
fn test_points_to_sets_only_grow() {
    let program = boxes();
    let analysis = PointerAnalysis::new(AnalysisOptions::with_cs("1-obj"));
    let mut solver = analysis.solver(&program).unwrap();
    assert_eq!(solver.phase(), SolverPhase::Uninitialized);
    solver.initialize();
    assert_eq!(solver.phase(), SolverPhase::Initialized);

    let mut snapshot: Vec<PointsToSet> = Vec::new();
    let mut steps = 0;
    while solver.step() {
        steps += 1;
        let pfg = solver.pfg();
        for (index, before) in snapshot.iter().enumerate() {
            let id = crate::analysis::PointerId(index as u32);
            assert!(before.is_subset(pfg.points_to(id)));
        }
        snapshot = (0..pfg.number_of_pointers())
            .map(|index| pfg.points_to(crate::analysis::PointerId(index as u32)).clone())
            .collect();
    }
    assert!(steps > 0);
    assert_eq!(solver.phase(), SolverPhase::Fixpoint);
}

#[test]
fn test_repropagation_at_fixpoint_is_a_no_op() {
    let program = boxes();
    let analysis = PointerAnalysis::ci();
    let mut solver = analysis.solver(&program).unwrap();
    while solver.step() {}

    let x1 = main_var(&program, "x1");
    let pointer = solver.var_pointer(ContextId::EMPTY, x1);
    let pts = solver.pfg().points_to(pointer).clone();
    assert!(!pts.is_empty());

    let delta = solver.propagate(pointer, &pts);
    assert!(delta.is_empty());
    assert!(solver.work_list().is_empty());
}

#[test]
fn test_new_edge_pushes_existing_facts() {
    let program = boxes();
    let analysis = PointerAnalysis::ci();
    let mut solver = analysis.solver(&program).unwrap();
    while solver.step() {}

    let o1 = main_var(&program, "o1");
    let b1 = main_var(&program, "b1");
    let source = solver.var_pointer(ContextId::EMPTY, o1);
    let target = solver.var_pointer(ContextId::EMPTY, b1);
    solver.add_pfg_edge(source, target);

    assert_eq!(solver.work_list().len(), 1);
    solver.add_pfg_edge(source, target);
    assert_eq!(solver.work_list().len(), 1);
    while solver.step() {}
    assert!(solver
        .pfg()
        .points_to(source)
        .is_subset(solver.pfg().points_to(target)));
}
