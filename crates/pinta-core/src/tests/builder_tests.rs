use super::fixtures::{boxes, copy_chain, main_var};
use crate::builder::ProgramBuilder;
use crate::persist::{program_from_json, program_to_json};
use crate::stmt::Stmt;
use crate::types::Type;
use crate::IrError;
use pretty_assertions::assert_eq;

#[test]
fn test_copy_chain_program() {
    let program = copy_chain();
    let main = program.method(program.entry());

    assert_eq!(main.subsignature.as_str(), "main()");
    assert!(main.is_static);
    let ir = main.ir.as_ref().unwrap();
    assert_eq!(ir.stmts.len(), 4);
    assert_eq!(ir.this, None);
    assert!(matches!(ir.stmts[0], Stmt::New { .. }));
    assert_eq!(ir.stmts[3], Stmt::Return { value: None });
    assert!(ir.return_vars.is_empty());
}

#[test]
fn test_instance_methods_get_this() {
    let program = boxes();
    let box_class = program.get_class("Box").unwrap();
    let get = program.lookup_method("Box", "get()").unwrap();
    let ir = program.method(get).ir.as_ref().unwrap();

    let this = ir.this.unwrap();
    assert_eq!(program.var(this).name, "this");
    assert_eq!(program.var(this).ty, Some(Type::Class(box_class.id)));
    assert_eq!(ir.return_vars.len(), 1);
    assert_eq!(program.var(ir.return_vars[0]).name, "r");
}

#[test]
fn test_object_becomes_implicit_superclass() {
    let program = boxes();
    let object = program.class_by_name("Object").unwrap();
    let box_class = program.get_class("Box").unwrap();

    assert_eq!(box_class.super_class, Some(object));
    assert_eq!(program.class(object).super_class, None);
}

#[test]
fn test_referenced_object_is_synthesized_as_library() {
    let mut builder = ProgramBuilder::new();
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_().new_object("o", "Object").return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    let object = program.get_class("Object").unwrap();

    assert!(!object.is_application);
    assert!(program.get_class("Main").unwrap().is_application);
}

#[test]
fn test_var_uses_index() {
    let program = boxes();
    let b1 = main_var(&program, "b1");
    let uses = program.var_uses(b1);

    assert_eq!(uses.invokes.len(), 2);
    assert!(uses.load_fields.is_empty());

    let set = program.lookup_method("Box", "set(Object)").unwrap();
    let this = program.method(set).ir.as_ref().unwrap().this.unwrap();
    assert_eq!(program.var_uses(this).store_fields.len(), 1);
}

#[test]
fn test_undefined_class() {
    let mut builder = ProgramBuilder::new();
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_().new_object("g", "Ghost").return_void();
        main.build().unwrap();
    }
    let err = builder.build().unwrap_err();
    assert_eq!(err, IrError::UndefinedClass("Ghost".to_string()));
}

#[test]
fn test_duplicate_class() {
    let mut builder = ProgramBuilder::new();
    builder.class("A");
    builder.class("A");
    let err = builder.build().unwrap_err();
    assert_eq!(err, IrError::DuplicateClass("A".to_string()));
}

#[test]
fn test_duplicate_method() {
    let mut builder = ProgramBuilder::new();
    let mut class = builder.class("A");
    let mut first = class.method("foo");
    first.param("x", "int");
    first.build().unwrap();
    let mut second = class.method("foo");
    second.param("y", "int");
    let err = second.build().unwrap_err();
    assert!(matches!(err, IrError::DuplicateMember { .. }));
}

#[test]
fn test_unknown_field() {
    let mut builder = ProgramBuilder::new();
    builder.class("A");
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_()
            .new_object("a", "A")
            .load_field("x", "a", "A", "missing")
            .return_void();
        main.build().unwrap();
    }
    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        IrError::UnknownField {
            class: "A".to_string(),
            field: "missing".to_string()
        }
    );
}

#[test]
fn test_inherited_field_resolves_to_declaring_class() {
    let mut builder = ProgramBuilder::new();
    builder.class("Base").field("f", "Base");
    builder.class("Derived").extends("Base");
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_()
            .new_object("d", "Derived")
            .store_field("d", "Derived", "f", "d")
            .return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    let ir = program.method(program.entry()).ir.as_ref().unwrap();
    let Stmt::StoreField { field, .. } = &ir.stmts[1] else {
        panic!("expected a field store");
    };
    let base = program.class_by_name("Base").unwrap();
    assert_eq!(program.field(*field).declaring_class, base);
}

#[test]
fn test_static_access_to_instance_field() {
    let mut builder = ProgramBuilder::new();
    builder.class("A").field("f", "A");
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_().load_static("x", "A", "f").return_void();
        main.build().unwrap();
    }
    let err = builder.build().unwrap_err();
    assert!(matches!(err, IrError::InvalidStatement { .. }));
}

#[test]
fn test_missing_entry() {
    let mut builder = ProgramBuilder::new();
    builder.class("A");
    let err = builder.build().unwrap_err();
    assert!(matches!(err, IrError::NoEntryMethod(_)));
}

#[test]
fn test_explicit_entry() {
    let mut builder = ProgramBuilder::new();
    {
        let mut class = builder.class("App");
        let mut run = class.method("run");
        run.static_().return_void();
        run.build().unwrap();
    }
    builder.entry("App", "run()");
    let program = builder.build().unwrap();
    assert_eq!(program.method(program.entry()).name, "run");
}

#[test]
fn test_abstract_method_without_body() {
    let mut builder = ProgramBuilder::new();
    let mut class = builder.class("Shape");
    class.abstract_();
    let mut area = class.method("area");
    area.abstract_().new_object("x", "Shape");
    let err = area.build().unwrap_err();
    assert!(matches!(err, IrError::InvalidStatement { .. }));
}

#[test]
fn test_invoke_kind_needs_receiver() {
    let mut builder = ProgramBuilder::new();
    let mut class = builder.class("Main");
    let mut main = class.method("main");
    main.static_()
        .invoke(crate::stmt::CallKind::Virtual, None, None, "Main", "foo()", &[]);
    assert!(matches!(
        main.build().unwrap_err(),
        IrError::InvalidStatement { .. }
    ));
}

#[test]
fn test_cyclic_hierarchy() {
    let mut builder = ProgramBuilder::new();
    builder.class("A").extends("B");
    builder.class("B").extends("A");
    let err = builder.build().unwrap_err();
    assert!(matches!(err, IrError::CyclicHierarchy(_)));
}

#[test]
fn test_method_by_signature() {
    let program = boxes();
    let set = program.method_by_signature("<Box: set(Object)>").unwrap();
    assert_eq!(program.method(set).name, "set");

    assert_eq!(
        program.method_by_signature("<Crate: set(Object)>"),
        Err(IrError::UnknownClass("Crate".to_string()))
    );
    assert!(matches!(
        program.method_by_signature("<Box: put(Object)>"),
        Err(IrError::UnknownMethod { .. })
    ));
    assert!(program.method_by_signature("Box.set").is_err());
}

#[test]
fn test_json_roundtrip_rebuilds_indexes() {
    let program = boxes();
    let json = program_to_json(&program).unwrap();
    let loaded = program_from_json(&json).unwrap();

    assert_eq!(loaded.classes(), program.classes());
    assert_eq!(loaded.entry(), program.entry());
    assert_eq!(loaded.class_by_name("Box"), program.class_by_name("Box"));
    let b1 = main_var(&program, "b1");
    assert_eq!(loaded.var_uses(b1), program.var_uses(b1));
    let object = loaded.class_by_name("Object").unwrap();
    assert_eq!(
        loaded.hierarchy().direct_subclasses(object),
        program.hierarchy().direct_subclasses(object)
    );
}

#[test]
fn test_json_with_dangling_ids_is_rejected() {
    let program = boxes();
    let json = program_to_json(&program).unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["classes"][0]["super_class"] = serde_json::json!(99);
    let err = program_from_json(&value.to_string()).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("Dangling class id 99"));

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["entry"] = serde_json::json!(1000);
    assert!(program_from_json(&value.to_string()).is_err());

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["vars"][0]["method"] = serde_json::json!(1000);
    assert!(program_from_json(&value.to_string()).is_err());
}
