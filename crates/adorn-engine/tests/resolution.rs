//! Integration tests for two-phase wrap resolution
//!
//! Covers bare versus configured application, the immediate type wrap, the
//! double-ambiguity preference for the factory reading and its single retry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use adorn_engine::{
    once, ClassDecorator, Decorator, Error, FuncDecorator, Args, Function, TypeObject, Value, WrapRole,
};

fn role_of(value: &Value) -> WrapRole {
    value
        .downcast_object::<Decorator>()
        .expect("expected a decorator object")
        .role()
}

fn add_one() -> Function {
    Function::new("add_one", "calc", |args| {
        args.expect_positional("add_one", 1)?;
        Ok(Value::Int(args.positional()[0].expect_int()? + 1))
    })
}

/// Prefixes string results with a configurable tag
fn tagger() -> FuncDecorator {
    FuncDecorator::new("tagger", |func, config| {
        let tag = match config.first() {
            Some(Value::Function(callback)) => callback.call(Args::new())?.expect_str()?.to_string(),
            Some(other) => other.expect_str()?.to_string(),
            None => "tag".to_string(),
        };
        let inner = func.clone();
        Ok(Value::Function(Function::wrapping(func, move |args| {
            let result = inner.call(args)?;
            Ok(Value::from(format!("{tag}:{}", result.expect_str()?)))
        })))
    })
}

#[test]
fn test_type_only_behavior_wraps_bare_type_immediately() {
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hook_calls);
    let register = ClassDecorator::new("register", move |ty, config| {
        config.expect_empty("register")?;
        counter.fetch_add(1, Ordering::SeqCst);
        ty.define("registered", true);
        Ok(Value::Type(ty.clone()))
    });

    let model = TypeObject::builder("User", "app.models").build();
    let result = register.decorate(Args::one(model.clone())).unwrap();

    // the wrapped type itself, not a decorator waiting for a second call
    let wrapped = result.as_type().expect("expected a type");
    assert_eq!(wrapped.id(), model.id());
    assert_eq!(wrapped.get_attr("registered").unwrap(), Value::from(true));
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_type_only_behavior_with_failing_immediate_wrap_becomes_factory() {
    let register = ClassDecorator::new("register", |ty, config| {
        config.expect_positional("register", 1)?;
        ty.define("table", config.positional()[0].clone());
        Ok(Value::Type(ty.clone()))
    });

    let table_name = TypeObject::builder("TableName", "app.models").build();
    let dec = register.decorate(Args::one(table_name.clone())).unwrap();
    assert_eq!(role_of(&dec), WrapRole::Factory);

    let model = TypeObject::builder("User", "app.models").build();
    let wrapped = dec.call(Args::one(model.clone())).unwrap();
    assert_eq!(wrapped.as_type().unwrap().id(), model.id());
    assert_eq!(model.get_attr("table").unwrap(), Value::Type(table_name));
}

#[test]
fn test_function_only_behavior_treats_callback_as_configuration() {
    let callback = Function::new("current_tag", "app", |_| Ok(Value::from("beta")));
    let greet = Function::new("greet", "app", |_| Ok(Value::from("hello")));

    let dec = tagger().decorate(Args::one(callback)).unwrap();
    assert_eq!(role_of(&dec), WrapRole::Unresolved);

    let wrapped = dec.call(Args::one(greet.clone())).unwrap();
    assert_eq!(role_of(&dec), WrapRole::Factory);

    let wrapped = wrapped.as_function().expect("expected a function").clone();
    assert_eq!(wrapped.identity(), greet.identity());
    assert_eq!(wrapped.call(Args::new()).unwrap(), Value::from("beta:hello"));
}

#[test]
fn test_function_only_behavior_treats_type_as_configuration() {
    let ty = TypeObject::builder("Marker", "app").build();
    let dec = tagger().decorate(Args::one(ty)).unwrap();
    assert_eq!(role_of(&dec), WrapRole::Factory);
}

#[test]
fn test_bare_and_empty_configuration_are_equivalent() {
    let bare = once(Args::one(add_one())).unwrap();
    let configured = once(Args::new()).unwrap().call(Args::one(add_one())).unwrap();

    assert_eq!(role_of(&bare), WrapRole::Unresolved);
    assert!(configured.as_function().is_some());

    for n in [1, 2, 1, 40] {
        assert_eq!(
            bare.call(Args::one(n)).unwrap(),
            configured.call(Args::one(n)).unwrap()
        );
    }
    assert_eq!(role_of(&bare), WrapRole::Direct);
}

#[test]
fn test_ambiguous_factory_failure_retries_direct() {
    // `apply` receives a lone function: first read as a factory call, which
    // the memoizer rejects because it takes no configuration
    let describe = Function::new("describe", "app", |args| {
        let target = args.positional()[0].expect_function()?;
        Ok(Value::from(format!("fn {}", target.name())))
    });
    let memoized = once(Args::one(describe)).unwrap();

    let result = memoized.call(Args::one(add_one())).unwrap();
    assert_eq!(result, Value::from("fn add_one"));
    assert_eq!(role_of(&memoized), WrapRole::Direct);

    // confirmed: later calls go straight to the wrapped function
    let again = memoized.call(Args::one(add_one())).unwrap();
    assert_eq!(again, Value::from("fn add_one"));
}

#[test]
fn test_exhausted_resolution_surfaces_factory_failure() {
    let strict = FuncDecorator::new("strict", |func, config| {
        config.expect_empty("strict")?;
        Ok(Value::Function(func.clone()))
    });
    let no_args = Function::new("ping", "app", |args| {
        args.expect_empty("ping")?;
        Ok(Value::from("pong"))
    });

    let dec = strict.decorate(Args::one(no_args)).unwrap();
    let err = dec.call(Args::one(add_one())).unwrap_err();

    assert_eq!(err.to_string(), "strict() expects no arguments, got 1");
    match err {
        Error::AmbiguousResolutionExhausted { preferred, alternate } => {
            assert!(matches!(*preferred, Error::Arity { .. }));
            assert_eq!(alternate.to_string(), "ping() expects no arguments, got 1");
        }
        other => panic!("expected exhausted resolution, got {other:?}"),
    }
}

#[test]
fn test_factory_with_invalid_target() {
    let dec = once(Args::new()).unwrap();
    let err = dec.call(Args::one(42)).unwrap_err();
    assert!(matches!(err, Error::InvalidTarget { found: "int" }));

    let err = dec.call(Args::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidTarget { .. }));
}

#[test]
fn test_unsupported_kind_without_ambiguity_is_surfaced() {
    let dec = tagger().decorate(Args::one("v1")).unwrap();
    let ty = TypeObject::builder("Page", "app").build();
    let err = dec.call(Args::one(ty)).unwrap_err();
    assert_eq!(err.to_string(), "decorator tagger does not support type decoration");
}

#[test]
fn test_attribute_access_confirms_direct() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let area = Function::new("area", "geometry", move |args| {
        counter.fetch_add(1, Ordering::SeqCst);
        let this = args.positional()[0].expect_instance()?;
        let side = this.get_attr("side")?.expect_int()?;
        Ok(Value::Int(side * side))
    });

    let dec = once(Args::one(area.clone())).unwrap();
    let square = TypeObject::builder("Square", "geometry").member("area", dec.clone()).build();

    let small = square.instantiate(Args::new()).unwrap();
    small.set_attr("side", 3).unwrap();
    let big = square.instantiate(Args::new()).unwrap();
    big.set_attr("side", 10).unwrap();

    assert_eq!(small.call_method("area", Args::new()).unwrap(), Value::from(9));
    assert_eq!(role_of(&dec), WrapRole::Direct);
    assert_eq!(big.call_method("area", Args::new()).unwrap(), Value::from(100));
    assert_eq!(small.call_method("area", Args::new()).unwrap(), Value::from(9));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // read through the type: the unbound wrapper, carrying the original identity
    let unbound = square.get_attr("area").unwrap();
    let unbound = unbound.as_function().expect("expected a function");
    assert!(!unbound.is_bound());
    assert_eq!(unbound.identity(), area.identity());
}

#[test]
fn test_decorator_exposes_target_identity() {
    let target = add_one();
    let dec = once(Args::one(target.clone())).unwrap();
    assert_eq!(dec.identity(), Some(target.identity()));

    let factory = once(Args::new()).unwrap();
    assert_eq!(factory.identity(), None);
}

#[test]
fn test_instance_value_shadows_decorated_method() {
    let label = Function::new("label", "shop", |_| Ok(Value::from("item")));
    let dec = tagger().decorate(Args::one(label)).unwrap();
    let item = TypeObject::builder("Item", "shop").member("label", dec).build();
    let i = item.instantiate(Args::new()).unwrap();
    assert_eq!(i.call_method("label", Args::new()).unwrap(), Value::from("tag:item"));

    i.set_attr("label", "custom").unwrap();
    assert_eq!(i.get_attr("label").unwrap(), Value::from("custom"));

    i.del_attr("label").unwrap();
    assert_eq!(i.call_method("label", Args::new()).unwrap(), Value::from("tag:item"));
    assert!(matches!(i.del_attr("label"), Err(Error::AttributeMissing { .. })));
}

#[test]
fn test_replacement_type_presents_decorated_identity() {
    let swap = ClassDecorator::new("swap", |_ty, _config| {
        Ok(Value::Type(TypeObject::builder("Replacement", "elsewhere").build()))
    });
    let user = TypeObject::builder("User", "accounts").build();

    let wrapped = swap.decorate(Args::one(user.clone())).unwrap();
    let wrapped = wrapped.as_type().expect("expected a type");
    assert_eq!(wrapped.name(), "User");
    assert_eq!(wrapped.module(), "accounts");
    assert_eq!(wrapped.identity(), user.identity());
    assert!(wrapped.instantiate(Args::new()).is_ok());
}
