//! Per-argument memoization
//!
//! The wrapped function runs once for each distinct argument signature;
//! later calls with structurally equal arguments return the stored result.
//! Results live as long as the decorator application and are never evicted.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use adorn_sdk::{Args, Function, Object, Result, TargetKind, Value};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::dispatch::{Behavior, DispatchResult, HookContext};
use crate::resolver::{DecorationRequest, Decorator};

/// Callable identity plus a handle-free projection of the call's arguments.
///
/// Functions, types and instances are keyed by their ids, which are never
/// reused, so a key does not keep a receiver or argument alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    callable: u64,
    positional: Vec<KeyPart>,
    named: Vec<(String, KeyPart)>,
}

impl MemoKey {
    /// Key for calling `callable` with `args`
    pub fn new(callable: &Function, args: &Args) -> Self {
        Self {
            callable: callable.id(),
            positional: args.positional().iter().map(KeyPart::from).collect(),
            named: args
                .named_args()
                .iter()
                .map(|(name, value)| (name.clone(), KeyPart::from(value)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(Arc<str>),
    List(Vec<KeyPart>),
    Function { id: u64, receiver: Option<Box<KeyPart>> },
    Type(u64),
    Instance(u64),
    Object(ObjectKey),
}

impl From<&Value> for KeyPart {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => KeyPart::Null,
            Value::Bool(b) => KeyPart::Bool(*b),
            Value::Int(i) => KeyPart::Int(*i),
            Value::Float(f) => KeyPart::Float(f.to_bits()),
            Value::Str(s) => KeyPart::Str(Arc::clone(s)),
            Value::List(items) => KeyPart::List(items.iter().map(KeyPart::from).collect()),
            Value::Function(f) => KeyPart::Function {
                id: f.id(),
                receiver: f.receiver().map(|r| Box::new(KeyPart::from(r))),
            },
            Value::Type(t) => KeyPart::Type(t.id()),
            Value::Instance(i) => KeyPart::Instance(i.id()),
            Value::Object(obj) => KeyPart::Object(ObjectKey(Arc::downgrade(obj))),
        }
    }
}

/// Objects have no id; the weak handle pins the allocation, not the
/// object, so its address stays unique while the key exists
#[derive(Clone)]
struct ObjectKey(Weak<dyn Object>);

impl PartialEq for ObjectKey {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ObjectKey {}

impl Hash for ObjectKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0.as_ptr() as *const u8 as usize).hash(state);
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<object {:p}>", self.0.as_ptr() as *const u8)
    }
}

/// Stored results of one decorator application
#[derive(Default)]
pub struct MemoStore {
    results: Mutex<FxHashMap<MemoKey, Value>>,
}

impl MemoStore {
    /// Look up a stored result
    pub fn get(&self, key: &MemoKey) -> Option<Value> {
        self.results.lock().get(key).cloned()
    }

    /// Store a result, replacing any previous one
    pub fn insert(&self, key: MemoKey, value: Value) {
        self.results.lock().insert(key, value);
    }

    /// Number of stored results
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}

/// The `once` behavior: functions only, no configuration
#[derive(Default, Clone)]
pub struct Once {
    store: Arc<MemoStore>,
}

impl Once {
    /// A memoizer with an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared result store
    pub fn store(&self) -> &Arc<MemoStore> {
        &self.store
    }
}

impl Behavior for Once {
    fn name(&self) -> &str {
        "once"
    }

    fn accepts(&self, kind: TargetKind) -> bool {
        kind == TargetKind::Function
    }

    fn wrap_function(&self, func: &Function, cx: &HookContext<'_>) -> DispatchResult {
        if let Err(err) = cx.expect_no_config() {
            return DispatchResult::Failed(err);
        }

        let original = func.clone();
        let store = Arc::clone(&self.store);
        let wrapper = Function::wrapping(func, move |args: Args| {
            let key = MemoKey::new(&original, &args);
            if let Some(hit) = store.get(&key) {
                trace!(function = %original.name(), "memo hit");
                return Ok(hit);
            }
            // computed outside the lock: racing first calls may both run
            let value = original.call(args)?;
            store.insert(key, value.clone());
            Ok(value)
        });
        DispatchResult::Wrapped(Value::Function(wrapper))
    }
}

/// `once` decorator expression
#[track_caller]
pub fn once(args: Args) -> Result<Value> {
    Decorator::construct(Arc::new(Once::new()), DecorationRequest::new(args))
}
