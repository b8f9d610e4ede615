// function_env.rs: function call environments, locals, receiver and invoker selection

mod common;

use cadence_runtime::{
    Continuation, Environment, FunctionCallEnv, HostEmbedding, InvokeError, Invoker,
    InvokerClass, InvokerSelector, JumpError, JumpKind, SourceLocation, Type, Value,
    RECEIVER_KEY,
};
use common::{child_of, loc, top_level, ForeignInvoker};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use std::sync::{Arc, Mutex};
use std::thread;

fn is_default_invoker(invoker: &Arc<dyn Invoker>) -> bool {
    format!("{:?}", invoker).starts_with("DefaultInvoker")
}

fn is_sandbox_invoker(invoker: &Arc<dyn Invoker>) -> bool {
    format!("{:?}", invoker).starts_with("SandboxInvoker")
}

fn same_instance(a: &Arc<dyn Invoker>, b: &Arc<dyn Invoker>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_top_level_frame_owner_and_invoker() {
    let env = top_level(Value::object("Script", 1));

    assert_eq!(env.closure_owner(), Value::object("Script", 1));
    assert_eq!(env.invoker().class(), InvokerClass::Unrestricted);
    assert!(is_default_invoker(env.invoker()));
}

#[test]
fn test_declare_then_set() {
    let mut env = top_level(Value::object("Script", 1));

    env.declare_variable(Type::class("Integer"), "x");
    assert_eq!(env.local_variable("x"), Value::Null);

    env.set_local_variable("x", Value::Number(5.0));
    assert_eq!(env.local_variable("x"), Value::Number(5.0));
    assert_eq!(env.declared_type("x"), Some(&Type::class("Integer")));
}

#[test]
fn test_child_of_unrestricted_is_unrestricted() {
    let parent = top_level(Value::object("Script", 1));
    let child = child_of(&parent, Value::Null);

    assert_eq!(child.invoker().class(), InvokerClass::Unrestricted);
    assert!(!same_instance(child.invoker(), parent.invoker()));
}

#[test]
fn test_child_of_restricted_is_restricted_with_fresh_instance() {
    let foreign: Arc<dyn Invoker> = Arc::new(ForeignInvoker(InvokerClass::Restricted));
    let mut parent = top_level(Value::object("Script", 1));
    parent.set_invoker(Some(foreign.as_ref()));

    assert!(is_sandbox_invoker(parent.invoker()));
    assert!(!same_instance(parent.invoker(), &foreign));

    let child = child_of(&parent, Value::Null);

    assert_eq!(child.invoker().class(), InvokerClass::Restricted);
    assert!(is_sandbox_invoker(child.invoker()));
    assert!(!same_instance(child.invoker(), parent.invoker()));
}

#[test]
fn test_restriction_propagates_through_call_chain() {
    let mut root = top_level(Value::Null);
    root.set_invoker(Some(&ForeignInvoker(InvokerClass::Restricted)));

    let a = child_of(&root, Value::Null);
    let b = child_of(&a, Value::Null);
    let c = child_of(&b, Value::Null);

    assert_eq!(c.invoker().class(), InvokerClass::Restricted);
    assert_eq!(c.stack_trace().depth(), 4);
}

// ============================================================================
// Receiver
// ============================================================================

#[rstest]
#[case::object(Value::object("Script", 42))]
#[case::null(Value::Null)]
#[case::string(Value::string("receiver"))]
fn test_closure_owner_is_receiver(#[case] receiver: Value) {
    let env = top_level(receiver.clone());

    assert_eq!(env.closure_owner(), receiver);
    assert!(env.has_local(RECEIVER_KEY));
}

#[test]
fn test_receiver_visible_as_local() {
    let env = top_level(Value::object("Script", 9));
    assert_eq!(env.local_variable("this"), Value::object("Script", 9));
}

// ============================================================================
// Locals and declared types
// ============================================================================

#[test]
fn test_missing_variable_reads_null() {
    let env = top_level(Value::Null);

    assert_eq!(env.local_variable("nope"), Value::Null);
    assert!(!env.has_local("nope"));
}

#[test]
fn test_declare_resets_previous_value() {
    let mut env = top_level(Value::Null);

    env.set_local_variable("count", Value::Number(3.0));
    env.declare_variable(Type::Number, "count");

    assert_eq!(env.local_variable("count"), Value::Null);
    assert!(env.has_local("count"));
}

#[test]
fn test_set_does_not_declare() {
    let mut env = top_level(Value::Null);

    env.set_local_variable("it", Value::string("implicit"));

    assert_eq!(env.local_variable("it"), Value::string("implicit"));
    assert!(!env.types().contains_key("it"));
}

#[test]
fn test_redeclare_keeps_single_type_entry() {
    let mut env = top_level(Value::Null);

    env.declare_variable(Type::Number, "v");
    env.declare_variable(Type::String, "v");

    assert_eq!(env.types().len(), 1);
    assert_eq!(env.declared_type("v"), Some(&Type::String));
}

#[test]
fn test_with_local_count_behaves_like_new() {
    let mut sized = FunctionCallEnv::with_local_count(
        common::embedding(),
        None,
        Continuation::halt(),
        loc(1),
        Value::object("Script", 1),
        8,
    );

    for i in 0..8 {
        let name = format!("v{}", i);
        sized.declare_variable(Type::Number, &name);
        sized.set_local_variable(&name, Value::Number(i as f64));
    }

    assert_eq!(sized.types().len(), 8);
    assert_eq!(sized.local_variable("v7"), Value::Number(7.0));
    assert_eq!(sized.closure_owner(), Value::object("Script", 1));
}

#[test]
fn test_types_mut_is_shared_with_declarations() {
    let mut env = top_level(Value::Null);

    env.types_mut().insert("external".to_string(), Type::Bool);

    assert_eq!(env.declared_type("external"), Some(&Type::Bool));
    assert!(!env.has_local("external"));
}

// ============================================================================
// Invoker selection
// ============================================================================

#[rstest]
#[case::restricted(InvokerClass::Restricted)]
#[case::unrestricted(InvokerClass::Unrestricted)]
fn test_set_invoker_never_stores_incoming(#[case] class: InvokerClass) {
    let mut env = top_level(Value::Null);
    let incoming: Arc<dyn Invoker> = Arc::new(ForeignInvoker(class));

    env.set_invoker(Some(incoming.as_ref()));

    assert_eq!(env.invoker().class(), class);
    assert!(!same_instance(env.invoker(), &incoming));
    assert!(is_default_invoker(env.invoker()) || is_sandbox_invoker(env.invoker()));
}

#[test]
fn test_set_invoker_none_falls_back_to_unrestricted() {
    let mut env = top_level(Value::Null);
    env.set_invoker(Some(&ForeignInvoker(InvokerClass::Restricted)));

    env.set_invoker(None);

    assert!(is_default_invoker(env.invoker()));
}

#[test]
fn test_reassigning_same_class_installs_new_instance() {
    let mut env = top_level(Value::Null);
    let before = Arc::clone(env.invoker());

    env.set_invoker(Some(before.as_ref()));

    assert_eq!(env.invoker().class(), InvokerClass::Unrestricted);
    assert!(!same_instance(env.invoker(), &before));
}

#[test]
fn test_installed_invoker_dispatches_through_embedding() {
    let mut env = top_level(Value::Null);
    env.set_invoker(Some(&ForeignInvoker(InvokerClass::Restricted)));

    let result = env
        .invoker()
        .method_call(&Value::string("x"), "toUpperCase", &[]);

    // locked-down embedding denies everything
    assert!(matches!(result, Err(InvokeError::Rejected { .. })));
}

/// Embedding that sandboxes every frame regardless of its caller
#[derive(Debug)]
struct AlwaysRestricted(HostEmbedding);

impl InvokerSelector for AlwaysRestricted {
    fn classify(&self, _incoming: Option<&dyn Invoker>) -> InvokerClass {
        InvokerClass::Restricted
    }

    fn install_for(&self, class: InvokerClass) -> Arc<dyn Invoker> {
        self.0.install_for(class)
    }
}

#[test]
fn test_custom_selector_overrides_classification() {
    let selector: Arc<dyn InvokerSelector> =
        Arc::new(AlwaysRestricted(HostEmbedding::locked_down()));

    let mut env = FunctionCallEnv::new(selector, None, Continuation::halt(), loc(1), Value::Null);
    assert_eq!(env.invoker().class(), InvokerClass::Restricted);

    env.set_invoker(Some(&ForeignInvoker(InvokerClass::Unrestricted)));
    assert_eq!(env.invoker().class(), InvokerClass::Restricted);
}

// ============================================================================
// Continuations, traces and jumps
// ============================================================================

#[test]
fn test_return_continuation_is_owned_by_frame() {
    let env = FunctionCallEnv::new(
        common::embedding(),
        None,
        Continuation::new("add-one", |v| match v {
            Value::Number(n) => Value::Number(n + 1.0),
            other => other,
        }),
        loc(3),
        Value::Null,
    );

    assert_eq!(env.return_continuation().label(), "add-one");
    assert_eq!(
        env.return_continuation().resume(Value::Number(1.0)),
        Value::Number(2.0)
    );
}

#[test]
fn test_stack_trace_innermost_first() {
    let parent = top_level(Value::Null);
    let child = FunctionCallEnv::new(
        common::embedding(),
        Some(&parent),
        Continuation::halt(),
        SourceLocation::new("lib.cad", 20),
        Value::Null,
    );

    assert_eq!(
        child.stack_trace().to_vec(),
        vec![SourceLocation::new("lib.cad", 20), loc(1)]
    );
    assert_eq!(child.location(), &SourceLocation::new("lib.cad", 20));
}

#[test]
fn test_child_outlives_parent() {
    let child = {
        let parent = top_level(Value::object("Script", 1));
        child_of(&parent, Value::object("Helper", 2))
    };

    assert_eq!(child.closure_owner(), Value::object("Helper", 2));
    assert_eq!(child.stack_trace().depth(), 2);
}

#[rstest]
#[case(JumpKind::Break, None)]
#[case(JumpKind::Continue, Some("outer"))]
fn test_jumps_do_not_cross_call_boundary(#[case] kind: JumpKind, #[case] label: Option<&str>) {
    let env = top_level(Value::Null);

    let err = env.jump_target(kind, label).unwrap_err();

    assert_eq!(
        err,
        JumpError::Unexpected {
            kind,
            label: label.map(str::to_string),
            location: loc(1),
        }
    );
    assert_eq!(err.to_string(), format!("unexpected {} at main.cad:1", kind));
}

#[test]
fn test_frame_mutable_from_another_thread() {
    let shared = Arc::new(Mutex::new(top_level(Value::object("Script", 1))));

    let worker = {
        let shared = Arc::clone(&shared);
        thread::spawn(move || {
            let mut env = shared.lock().unwrap();
            env.declare_variable(Type::Number, "total");
            env.set_local_variable("total", Value::Number(10.0));
        })
    };
    worker.join().unwrap();

    let env = shared.lock().unwrap();
    assert_eq!(env.local_variable("total"), Value::Number(10.0));
    assert_eq!(env.closure_owner(), Value::object("Script", 1));
}

// ============================================================================
// Properties
// ============================================================================

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1.0e6..1.0e6f64).prop_map(Value::Number),
        "[a-z]{0,6}".prop_map(Value::string),
        (0u64..1000).prop_map(|id| Value::object("Script", id)),
    ]
}

fn arb_type() -> impl Strategy<Value = Type> {
    prop_oneof![
        Just(Type::Number),
        Just(Type::String),
        Just(Type::Bool),
        Just(Type::Dynamic),
        "[A-Z][a-z]{0,5}".prop_map(Type::Class),
    ]
}

proptest! {
    #[test]
    fn prop_receiver_is_closure_owner(receiver in arb_value(), count in 0usize..16) {
        let env = FunctionCallEnv::with_local_count(
            common::embedding(),
            None,
            Continuation::halt(),
            loc(1),
            receiver.clone(),
            count,
        );
        prop_assert_eq!(env.closure_owner(), receiver);
    }

    #[test]
    fn prop_declare_resets_value(
        name in "[a-z_][a-z0-9_]{0,8}",
        ty in arb_type(),
        prior in arb_value(),
    ) {
        let mut env = top_level(Value::Null);
        env.set_local_variable(&name, prior);
        env.declare_variable(ty, &name);
        prop_assert_eq!(env.local_variable(&name), Value::Null);
    }

    #[test]
    fn prop_set_without_declare(name in "[a-z_][a-z0-9_]{0,8}", value in arb_value()) {
        let mut env = top_level(Value::Null);
        env.set_local_variable(&name, value.clone());
        prop_assert_eq!(env.local_variable(&name), value);
        prop_assert!(!env.types().contains_key(&name));
    }

    #[test]
    fn prop_redeclare_last_type_wins(
        name in "[a-z_][a-z0-9_]{0,8}",
        first in arb_type(),
        second in arb_type(),
    ) {
        let mut env = top_level(Value::Null);
        env.declare_variable(first, &name);
        env.declare_variable(second.clone(), &name);
        prop_assert_eq!(env.types().len(), 1);
        prop_assert_eq!(env.declared_type(&name), Some(&second));
    }

    #[test]
    fn prop_installed_invoker_matches_class(restricted in any::<bool>()) {
        let class = if restricted { InvokerClass::Restricted } else { InvokerClass::Unrestricted };
        let mut env = top_level(Value::Null);
        env.set_invoker(Some(&ForeignInvoker(class)));
        prop_assert_eq!(env.invoker().class(), class);
        prop_assert!(is_default_invoker(env.invoker()) != is_sandbox_invoker(env.invoker()));
    }
}
