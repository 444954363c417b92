//! Target classification
//!
//! Decides whether a value can be a wrap target and whether a set of
//! decorator arguments could plausibly *be* the target rather than
//! configuration. A single bare function or type argument is the only
//! ambiguous shape: by arity alone it cannot be told apart from a
//! one-argument configuration that happens to be callable.

use adorn_sdk::{Args, TargetKind, Value};

/// Classify a value as a function, a type, or neither
pub fn classify(value: &Value) -> TargetKind {
    value.kind()
}

/// Check if a value is a function or a type
pub fn is_wrappable(value: &Value) -> bool {
    classify(value) != TargetKind::Neither
}

/// True when `args` is exactly one positional argument, no named
/// arguments, and that argument is of a kind `accepts` allows
pub fn is_plausible_wrap_target(args: &Args, accepts: impl Fn(TargetKind) -> bool) -> bool {
    if args.positional().len() != 1 || !args.named_args().is_empty() {
        return false;
    }
    match args.first().map(classify) {
        Some(TargetKind::Neither) | None => false,
        Some(kind) => accepts(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adorn_sdk::{Function, TypeObject};

    fn any_kind(_: TargetKind) -> bool {
        true
    }

    fn func() -> Value {
        Value::from(Function::new("f", "tests", |_| Ok(Value::Null)))
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&func()), TargetKind::Function);
        let ty = TypeObject::builder("T", "tests").build();
        assert_eq!(classify(&Value::from(ty)), TargetKind::Type);
        assert_eq!(classify(&Value::from("f")), TargetKind::Neither);
        assert!(!is_wrappable(&Value::Null));
    }

    #[test]
    fn test_single_function_is_plausible() {
        assert!(is_plausible_wrap_target(&Args::one(func()), any_kind));
    }

    #[test]
    fn test_shapes_that_are_not_plausible() {
        assert!(!is_plausible_wrap_target(&Args::new(), any_kind));
        assert!(!is_plausible_wrap_target(&Args::one(func()).with(func()), any_kind));
        assert!(!is_plausible_wrap_target(&Args::one(func()).named("k", 1), any_kind));
        assert!(!is_plausible_wrap_target(&Args::one("not a target"), any_kind));
    }

    #[test]
    fn test_accepts_restricts_kinds() {
        let functions_only = |kind| kind == TargetKind::Function;
        let ty = TypeObject::builder("T", "tests").build();
        assert!(is_plausible_wrap_target(&Args::one(func()), functions_only));
        assert!(!is_plausible_wrap_target(&Args::one(ty), functions_only));
    }
}
