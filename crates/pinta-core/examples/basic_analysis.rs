use pinta_core::analysis::{AnalysisOptions, PointerAnalysis};
use pinta_core::builder::ProgramBuilder;
use pinta_core::format::{format_method, format_var};

fn main() {
    println!("Building a two-box program...\n");

    let mut builder = ProgramBuilder::new();
    builder.class("Object");
    builder.class("Apple");
    builder.class("Pear");
    {
        let mut class = builder.class("Box");
        class.field("item", "Object");
        let mut set = class.method("set");
        set.param("v", "Object")
            .store_field("this", "Box", "item", "v")
            .return_void();
        set.build().unwrap();
        let mut get = class.method("get");
        get.returns("Object")
            .load_field("r", "this", "Box", "item")
            .return_var("r");
        get.build().unwrap();
    }
    {
        let mut class = builder.class("Main");
        let mut main = class.method("main");
        main.static_()
            .new_object("b1", "Box")
            .new_object("b2", "Box")
            .new_object("a", "Apple")
            .new_object("p", "Pear")
            .invoke_virtual(None, "b1", "Box", "set(Object)", &["a"])
            .invoke_virtual(None, "b2", "Box", "set(Object)", &["p"])
            .invoke_virtual(Some("x"), "b1", "Box", "get()", &[])
            .return_void();
        main.build().unwrap();
    }
    let program = builder.build().unwrap();
    println!(
        "Classes: {}, methods: {}, statements: {}",
        program.classes().len(),
        program.methods().len(),
        program.number_of_statements()
    );

    for cs in ["ci", "1-obj", "1-call"] {
        let result = PointerAnalysis::new(AnalysisOptions::with_cs(cs))
            .analyze(&program)
            .unwrap();
        let x = program.lookup_var(program.entry(), "x").unwrap();

        println!("\n=== {} ===", cs);
        let objs: Vec<String> = result
            .points_to_var(x)
            .into_iter()
            .map(|obj| result.format_obj(obj))
            .collect();
        println!("{} -> [{}]", format_var(&program, x), objs.join(", "));
        println!("Reachable methods:");
        for method in result.call_graph().reachable_methods() {
            println!("  - {}", format_method(&program, method));
        }
        let stats = result.statistics();
        println!(
            "Pointers: {}, PFG edges: {}, contexts: {}",
            stats.pointers, stats.pfg_edges, stats.contexts
        );
    }
}
