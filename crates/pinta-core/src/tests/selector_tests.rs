use super::fixtures::{boxes, main_var, pts_types};
use crate::analysis::{
    AnalysisError, AnalysisOptions, CallSiteSelector, ConfigError, ContextElement, ContextId,
    ContextManager, ContextSelector, CsObj, HeapModelKind, InsensitiveSelector, Obj, ObjId,
    ObjectSelector, PointerAnalysis, SelectorRegistry, TypeSelector,
};
use crate::class::ClassId;
use crate::stmt::CallSiteId;
use crate::types::Type;
use pretty_assertions::assert_eq;

fn receiver(id: u32, container: Option<ClassId>) -> Obj {
    Obj {
        id: ObjId(id),
        ty: Type::Class(ClassId(9)),
        site: None,
        container_class: container,
    }
}

#[test]
fn test_empty_context_is_canonical() {
    let mut contexts = ContextManager::new();
    assert!(contexts.get(ContextId::EMPTY).is_empty());
    let c1 = contexts.append(ContextId::EMPTY, ContextElement::CallSite(CallSiteId(1)), 0);
    assert_eq!(c1, ContextId::EMPTY);
    assert_eq!(contexts.truncate(ContextId::EMPTY, 2), ContextId::EMPTY);
    assert_eq!(contexts.len(), 1);
}

#[test]
fn test_one_call_truncation_keeps_latest_site() {
    let mut contexts = ContextManager::new();
    let c1 = contexts.append(ContextId::EMPTY, ContextElement::CallSite(CallSiteId(1)), 1);
    let c1_c2 = contexts.append(c1, ContextElement::CallSite(CallSiteId(2)), 1);
    let c2 = contexts.append(ContextId::EMPTY, ContextElement::CallSite(CallSiteId(2)), 1);

    assert_eq!(c1_c2, c2);
    assert_ne!(c1, c2);
}

#[test]
fn test_two_call_keeps_two_elements() {
    let mut contexts = ContextManager::new();
    let mut context = ContextId::EMPTY;
    for site in 1..=3 {
        context = contexts.append(context, ContextElement::CallSite(CallSiteId(site)), 2);
    }
    assert_eq!(
        contexts.get(context).elements(),
        &[
            ContextElement::CallSite(CallSiteId(2)),
            ContextElement::CallSite(CallSiteId(3))
        ]
    );
    let truncated = contexts.truncate(context, 1);
    assert_eq!(
        contexts.get(truncated).elements(),
        &[ContextElement::CallSite(CallSiteId(3))]
    );
}

#[test]
fn test_insensitive_selector_is_always_empty() {
    let mut contexts = ContextManager::new();
    let selector = InsensitiveSelector;
    let recv = receiver(0, None);
    let callee = selector.select_instance(
        &mut contexts,
        ContextId::EMPTY,
        CallSiteId(4),
        CsObj::new(ContextId::EMPTY, ObjId(0)),
        &recv,
    );
    assert_eq!(callee, ContextId::EMPTY);
    assert_eq!(selector.select_static(&mut contexts, callee, CallSiteId(4)), ContextId::EMPTY);
    assert_eq!(selector.select_heap(&mut contexts, callee), ContextId::EMPTY);
}

#[test]
fn test_object_selector_uses_receiver_heap_context() {
    let mut contexts = ContextManager::new();
    let selector = ObjectSelector::new(2);
    let heap = contexts.append(ContextId::EMPTY, ContextElement::Object(ObjId(7)), 2);
    let caller = contexts.append(ContextId::EMPTY, ContextElement::Object(ObjId(5)), 2);
    let recv = receiver(3, None);

    let callee = selector.select_instance(
        &mut contexts,
        caller,
        CallSiteId(0),
        CsObj::new(heap, ObjId(3)),
        &recv,
    );
    assert_eq!(
        contexts.get(callee).elements(),
        &[ContextElement::Object(ObjId(7)), ContextElement::Object(ObjId(3))]
    );
    assert_eq!(selector.select_static(&mut contexts, caller, CallSiteId(0)), caller);

    let heap_context = selector.select_heap(&mut contexts, callee);
    assert_eq!(
        contexts.get(heap_context).elements(),
        &[ContextElement::Object(ObjId(3))]
    );
}

#[test]
fn test_type_selector_uses_allocation_container() {
    let mut contexts = ContextManager::new();
    let selector = TypeSelector::new(1);
    let recv = receiver(3, Some(ClassId(2)));

    let callee = selector.select_instance(
        &mut contexts,
        ContextId::EMPTY,
        CallSiteId(0),
        CsObj::new(ContextId::EMPTY, ObjId(3)),
        &recv,
    );
    assert_eq!(
        contexts.get(callee).elements(),
        &[ContextElement::Type(Type::Class(ClassId(2)))]
    );
    assert_eq!(selector.select_heap(&mut contexts, callee), ContextId::EMPTY);
}

#[test]
fn test_call_site_selector_heap_context() {
    let mut contexts = ContextManager::new();
    let selector = CallSiteSelector::new(2);
    let callee = selector.select_static(&mut contexts, ContextId::EMPTY, CallSiteId(8));
    let heap = selector.select_heap(&mut contexts, callee);
    assert_eq!(heap, callee);
    assert_eq!(selector.name(), "2-call");
}

#[test]
fn test_registry_parses_selector_names() {
    let registry = SelectorRegistry::default();
    assert_eq!(registry.create("ci").unwrap().name(), "ci");
    assert_eq!(registry.create("1-call").unwrap().name(), "1-call");
    assert_eq!(registry.create("2-obj").unwrap().name(), "2-obj");
    assert_eq!(registry.create("3-type").unwrap().name(), "3-type");
    assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["call", "obj", "type"]);
}

#[test]
fn test_registry_rejects_unknown_selectors() {
    let registry = SelectorRegistry::default();
    assert!(matches!(registry.create("2-heap"), Err(ConfigError::UnknownSelector(_))));
    assert!(matches!(registry.create("obj"), Err(ConfigError::UnknownSelector(_))));
    assert!(matches!(registry.create("x-obj"), Err(ConfigError::InvalidContextLimit(_))));
    assert!(matches!(registry.create("0-call"), Err(ConfigError::InvalidContextLimit(_))));
}

#[test]
fn test_registry_accepts_custom_kinds() {
    let mut registry = SelectorRegistry::empty();
    registry.register("site", |k| -> Box<dyn ContextSelector> {
        Box::new(CallSiteSelector::new(k))
    });
    assert_eq!(registry.create("1-site").unwrap().name(), "1-call");
    assert!(registry.create("1-call").is_err());

    let program = boxes();
    let options = AnalysisOptions::with_cs("1-site");
    assert!(matches!(
        PointerAnalysis::new(options.clone()).analyze(&program),
        Err(AnalysisError::Config(ConfigError::UnknownSelector(_)))
    ));
    let result = PointerAnalysis::new(options)
        .with_registry(registry)
        .analyze(&program)
        .unwrap();
    assert_eq!(pts_types(&result, main_var(&program, "x1")), vec!["A"]);
    assert_eq!(pts_types(&result, main_var(&program, "x2")), vec!["B"]);
}

#[test]
fn test_options_parse() {
    let options = AnalysisOptions::parse("cs:2-obj; heap-model:type ;only-app:true").unwrap();
    assert_eq!(options.cs, "2-obj");
    assert_eq!(options.heap_model, HeapModelKind::Type);
    assert!(options.only_app);
    assert_eq!(options.to_string(), "cs:2-obj;heap-model:type;only-app:true");

    let defaults = AnalysisOptions::parse("").unwrap();
    assert_eq!(defaults, AnalysisOptions::default());
    assert!(defaults.is_context_insensitive());
}

#[test]
fn test_options_errors() {
    assert_eq!(
        AnalysisOptions::parse("speed:fast"),
        Err(ConfigError::UnknownOption("speed".to_string()))
    );
    assert!(matches!(
        AnalysisOptions::parse("only-app:maybe"),
        Err(ConfigError::InvalidOptionValue { .. })
    ));
    assert!(matches!(
        AnalysisOptions::parse("heap-model:region"),
        Err(ConfigError::UnknownHeapModel(_))
    ));
    assert!(matches!(
        AnalysisOptions::parse("cs"),
        Err(ConfigError::InvalidOptionValue { .. })
    ));
}

#[test]
fn test_options_deserialize() {
    let options: AnalysisOptions =
        serde_json::from_str(r#"{"cs": "1-call", "only-app": true}"#).unwrap();
    assert_eq!(options.cs, "1-call");
    assert_eq!(options.heap_model, HeapModelKind::AllocSite);
    assert!(options.only_app);
}
