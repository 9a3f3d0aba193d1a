//! # Context Accumulator
//!
//! The key/value bag threaded through an action. Each invocation starts with
//! an empty [`Context`]; middleware enrich it by continuing with a partial
//! context (a *patch*) which is shallow-merged into the accumulator. Later
//! keys overwrite earlier keys of the same name.
//!
//! Values are type-erased and shared behind an [`Arc`], so cloning a context
//! is cheap and never clones the stored values themselves.
//!
//! ```rust,ignore
//! let patch = Context::new().with("user_id", 42_u64).with("role", "admin");
//! ctx.merge(patch);
//!
//! assert_eq!(ctx.get::<u64>("user_id"), Some(&42));
//! ```

use crate::message::Message;
use std::{any::Any, collections::HashMap, fmt, sync::Arc};

type Value = Arc<dyn Any + Send + Sync>;

/// A string-keyed bag of type-erased values.
#[derive(Clone, Default)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for constructing patches.
    pub fn with<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning `true` if an existing key was overwritten.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        self.values.insert(key.into(), Arc::new(value)).is_some()
    }

    /// Get a typed reference to the value stored under `key`.
    ///
    /// Returns `None` if the key is absent or holds a value of another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        let value = self.values.get(key)?;
        (**value).downcast_ref::<T>()
    }

    /// Whether a value is stored under `key`, whatever its type.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove the value under `key`, returning `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Shallow-merge `patch` into this context.
    ///
    /// Every key of the patch replaces the same-named key here; keys absent
    /// from the patch are left untouched.
    pub fn merge(&mut self, patch: Context) {
        self.values.extend(patch.values);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}

/// The value handed to every step: the action input plus the context
/// accumulated so far.
#[derive(Debug, Clone)]
pub struct Request<In> {
    /// The input the action was called with.
    pub input: In,
    /// Context accumulated from all previous steps.
    pub context: Context,
}

impl<In: Message> Request<In> {
    /// Create a request with an empty context.
    pub fn new(input: In) -> Self {
        Self {
            input,
            context: Context::new(),
        }
    }

    /// Split the request into its input and context.
    pub fn into_parts(self) -> (In, Context) {
        (self.input, self.context)
    }
}
