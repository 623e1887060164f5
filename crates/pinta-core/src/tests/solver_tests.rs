use super::fixtures::{analyze, animals, boxes, call_sites_of, copy_chain, identity, main_var, pts_types};
use crate::analysis::{
    AnalysisError, AnalysisOptions, ConfigError, ContextElement, ContextId, HeapModelKind,
    PointerAnalysis,
};
use crate::builder::ProgramBuilder;
use crate::format::format_method;
use pretty_assertions::assert_eq;

#[test]
fn test_copy_chain() {
    let program = copy_chain();
    let result = analyze(&program, "ci");

    let a = main_var(&program, "a");
    let c = main_var(&program, "c");
    assert_eq!(pts_types(&result, c), vec!["A"]);
    assert_eq!(result.points_to_var(a), result.points_to_var(c));
    assert_eq!(result.statistics().objects, 1);
}

#[test]
fn test_field_store_then_load() {
    let mut builder = ProgramBuilder::new();
    builder.class("O").field("f", "P");
    builder.class("P");
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_()
            .new_object("x", "O")
            .new_object("y", "P")
            .store_field("x", "O", "f", "y")
            .load_field("z", "x", "O", "f")
            .return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    let result = analyze(&program, "ci");

    let y = main_var(&program, "y");
    let z = main_var(&program, "z");
    assert_eq!(result.points_to_var(z), result.points_to_var(y));
    assert_eq!(pts_types(&result, z), vec!["P"]);
}

#[test]
fn test_arrays_share_one_index_pointer() {
    let mut builder = ProgramBuilder::new();
    builder.class("A");
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_()
            .new_object("arr", "A[]")
            .new_object("o", "A")
            .store_array("arr", "0", "o")
            .load_array("e", "arr", "*")
            .return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    let result = analyze(&program, "ci");

    let arr = main_var(&program, "arr");
    let e = main_var(&program, "e");
    assert_eq!(pts_types(&result, arr), vec!["A[]"]);
    assert_eq!(pts_types(&result, e), vec!["A"]);
    let array = result.points_to_var(arr)[0];
    assert_eq!(result.points_to_array(array), result.points_to_var(e));
}

#[test]
fn test_static_fields_flow_between_methods() {
    let mut builder = ProgramBuilder::new();
    builder.class("A");
    {
        let mut class = builder.class("Main");
        class.static_field("cache", "A");
        let mut store = class.method("store");
        store.static_()
            .new_object("o", "A")
            .store_static("Main", "cache", "o")
            .return_void();
        store.build().unwrap();
        let mut main = class.method("main");
        main.static_()
            .invoke_static(None, "Main", "store()", &[])
            .load_static("m", "Main", "cache")
            .return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    let result = analyze(&program, "ci");

    let m = main_var(&program, "m");
    assert_eq!(pts_types(&result, m), vec!["A"]);
}

#[test]
fn test_virtual_call_resolves_each_receiver_type() {
    let program = animals();
    let result = analyze(&program, "ci");
    let call_site = call_sites_of(&program, program.entry())[0];

    let mut callees: Vec<String> = result
        .call_graph()
        .callees_of(call_site)
        .map(|m| format_method(&program, m))
        .collect();
    callees.sort();
    assert_eq!(callees, vec!["<Cat: speak()>", "<Dog: speak()>"]);
    assert_eq!(result.call_graph().number_of_edges(), 2);
    assert_eq!(result.call_graph().number_of_methods(), 3);
}

#[test]
fn test_this_receives_only_dispatched_objects() {
    let program = animals();
    let result = analyze(&program, "ci");
    let dog_speak = program.lookup_method("Dog", "speak()").unwrap();
    let this = program.method(dog_speak).ir.as_ref().unwrap().this.unwrap();

    assert_eq!(pts_types(&result, this), vec!["Dog"]);
}

#[test]
fn test_context_insensitive_merges_boxes() {
    let program = boxes();
    let result = analyze(&program, "ci");

    assert_eq!(pts_types(&result, main_var(&program, "x1")), vec!["A", "B"]);
    assert_eq!(pts_types(&result, main_var(&program, "x2")), vec!["A", "B"]);
}

#[test]
fn test_object_sensitivity_separates_boxes() {
    let program = boxes();
    let result = analyze(&program, "1-obj");

    assert_eq!(pts_types(&result, main_var(&program, "x1")), vec!["A"]);
    assert_eq!(pts_types(&result, main_var(&program, "x2")), vec!["B"]);

    let set = program.lookup_method("Box", "set(Object)").unwrap();
    let contexts: Vec<_> = result
        .cs_call_graph()
        .reachable_methods()
        .filter(|m| m.method == set)
        .collect();
    assert_eq!(contexts.len(), 2);
    for cs_method in contexts {
        let elements = result.context(cs_method.context).elements();
        assert!(matches!(elements, [ContextElement::Object(_)]));
    }
}

#[test]
fn test_call_site_sensitivity_separates_boxes() {
    let program = boxes();
    let result = analyze(&program, "1-call");

    assert_eq!(pts_types(&result, main_var(&program, "x1")), vec!["A"]);
    assert_eq!(pts_types(&result, main_var(&program, "x2")), vec!["B"]);
}

#[test]
fn test_type_sensitivity_merges_boxes_allocated_in_one_class() {
    let program = boxes();
    let result = analyze(&program, "1-type");

    assert_eq!(pts_types(&result, main_var(&program, "x1")), vec!["A", "B"]);
}

#[test]
fn test_static_calls_split_by_call_site_only() {
    let program = identity();

    let call = analyze(&program, "1-call");
    assert_eq!(pts_types(&call, main_var(&program, "r1")), vec!["A"]);
    assert_eq!(pts_types(&call, main_var(&program, "r2")), vec!["B"]);

    let obj = analyze(&program, "1-obj");
    assert_eq!(pts_types(&obj, main_var(&program, "r1")), vec!["A", "B"]);
}

#[test]
fn test_repeated_dispatch_wires_parameters_once() {
    let mut builder = ProgramBuilder::new();
    builder.class("Object");
    {
        let mut class = builder.class("Sink");
        let mut take = class.method("take");
        take.param("v", "Object").return_void();
        take.build().unwrap();
    }
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_()
            .new_object("s1", "Sink")
            .new_object("s2", "Sink")
            .new_object("arg", "Object")
            .copy("s", "s1")
            .copy("s", "s2")
            .invoke_virtual(None, "s", "Sink", "take(Object)", &["arg"])
            .return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    let result = analyze(&program, "ci");

    let call_site = call_sites_of(&program, program.entry())[0];
    assert_eq!(result.call_graph().callees_of(call_site).count(), 1);

    let arg = main_var(&program, "arg");
    let pointer = result
        .pfg()
        .lookup(&crate::analysis::Pointer::Var {
            context: ContextId::EMPTY,
            var: arg,
        })
        .unwrap();
    assert_eq!(result.pfg().successors_of(pointer).count(), 1);

    let take = program.lookup_method("Sink", "take(Object)").unwrap();
    let this = program.method(take).ir.as_ref().unwrap().this.unwrap();
    assert_eq!(result.points_to_var(this).len(), 2);
}

#[test]
fn test_abstract_target_contributes_no_callee() {
    let mut builder = ProgramBuilder::new();
    {
        let mut class = builder.class("Shape");
        class.abstract_();
        let mut area = class.method("area");
        area.abstract_();
        area.build().unwrap();
    }
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_()
            .new_object("s", "Shape")
            .invoke_virtual(None, "s", "Shape", "area()", &[])
            .return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    let result = analyze(&program, "ci");

    assert_eq!(result.call_graph().number_of_edges(), 0);
    assert_eq!(result.call_graph().number_of_methods(), 1);
}

#[test]
fn test_special_call_dispatches_on_declared_class() {
    let mut builder = ProgramBuilder::new();
    {
        let mut class = builder.class("Base");
        let mut init = class.method("<init>");
        init.return_void();
        init.build().unwrap();
    }
    {
        let mut class = builder.class("Derived");
        class.extends("Base");
        let mut init = class.method("<init>");
        init.invoke_special(None, "this", "Base", "<init>()", &[])
            .return_void();
        init.build().unwrap();
    }
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_()
            .new_object("d", "Derived")
            .invoke_special(None, "d", "Derived", "<init>()", &[])
            .return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    let result = analyze(&program, "ci");

    let mut reached: Vec<String> = result
        .call_graph()
        .reachable_methods()
        .map(|m| format_method(&program, m))
        .collect();
    reached.sort();
    assert_eq!(
        reached,
        vec!["<Base: <init>()>", "<Derived: <init>()>", "<Main: main()>"]
    );
    let base_init = program.lookup_method("Base", "<init>()").unwrap();
    let this = program.method(base_init).ir.as_ref().unwrap().this.unwrap();
    assert_eq!(pts_types(&result, this), vec!["Derived"]);
}

#[test]
fn test_type_heap_model_merges_allocations() {
    let program = boxes();
    let options = AnalysisOptions {
        heap_model: HeapModelKind::Type,
        ..AnalysisOptions::default()
    };
    let result = PointerAnalysis::new(options).analyze(&program).unwrap();

    let b1 = main_var(&program, "b1");
    let b2 = main_var(&program, "b2");
    assert_eq!(result.points_to_var(b1), result.points_to_var(b2));
    assert_eq!(result.statistics().objects, 3);
}

#[test]
fn test_unknown_selector_fails_before_solving() {
    let program = copy_chain();
    let err = PointerAnalysis::new(AnalysisOptions::with_cs("2-heap"))
        .analyze(&program)
        .err()
        .unwrap();
    assert_eq!(
        err,
        AnalysisError::Config(ConfigError::UnknownSelector("2-heap".to_string()))
    );
}

#[test]
fn test_native_entry_is_rejected() {
    let mut builder = ProgramBuilder::new();
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_().native();
        main.build().unwrap();
    }
    builder.entry("Main", "main()");
    let program = builder.build().unwrap();
    let err = PointerAnalysis::ci().analyze(&program).err().unwrap();
    assert!(matches!(err, AnalysisError::NoEntryMethod(_)));
}

#[test]
fn test_independent_runs_share_the_program() {
    let program = boxes();
    let (ci, cs) = std::thread::scope(|scope| {
        let ci = scope.spawn(|| {
            let result = analyze(&program, "ci");
            pts_types(&result, main_var(&program, "x1"))
        });
        let cs = scope.spawn(|| {
            let result = analyze(&program, "2-obj");
            pts_types(&result, main_var(&program, "x1"))
        });
        (ci.join().unwrap(), cs.join().unwrap())
    });
    assert_eq!(ci, vec!["A", "B"]);
    assert_eq!(cs, vec!["A"]);
}
