use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::builtins;
use crate::value::Value;

/// Failure reported by a host identifier resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ResolveError(pub String);

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        ResolveError(message.into())
    }
}

/// Host function callable from expressions. Receives already-evaluated arguments.
pub type NativeFunction = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Synchronous identifier lookup supplied by the host.
///
/// Implemented for every `Fn(&str) -> Result<Value, ResolveError>`.
pub trait IdentifierResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Value, ResolveError>;
}

impl<F> IdentifierResolver for F
where
    F: Fn(&str) -> Result<Value, ResolveError> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Result<Value, ResolveError> {
        self(name)
    }
}

/// Asynchronous identifier lookup supplied by the host.
///
/// Implemented for every `Fn(String) -> impl Future<Output = Result<Value, ResolveError>>`.
#[async_trait]
pub trait AsyncIdentifierResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Value, ResolveError>;
}

#[async_trait]
impl<F, Fut> AsyncIdentifierResolver for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ResolveError>> + Send + 'static,
{
    async fn resolve(&self, name: &str) -> Result<Value, ResolveError> {
        self(name.to_string()).await
    }
}

/// Where identifier values come from during one evaluation.
#[derive(Clone)]
pub enum IdentifierSource {
    /// Fixed bindings; unknown names are `null`.
    Static(HashMap<String, Value>),
    /// Called for every reached identifier that is not a built-in.
    Sync(Arc<dyn IdentifierResolver>),
    /// Awaited for every reached identifier that is not a built-in.
    Async(Arc<dyn AsyncIdentifierResolver>),
}

impl IdentifierSource {
    pub fn from_map<K, V>(bindings: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        IdentifierSource::Static(
            bindings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn resolver(resolver: impl IdentifierResolver + 'static) -> Self {
        IdentifierSource::Sync(Arc::new(resolver))
    }

    pub fn async_resolver(resolver: impl AsyncIdentifierResolver + 'static) -> Self {
        IdentifierSource::Async(Arc::new(resolver))
    }
}

impl Default for IdentifierSource {
    fn default() -> Self {
        IdentifierSource::Static(HashMap::new())
    }
}

impl fmt::Debug for IdentifierSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierSource::Static(map) => f.debug_tuple("Static").field(map).finish(),
            IdentifierSource::Sync(_) => f.write_str("Sync(..)"),
            IdentifierSource::Async(_) => f.write_str("Async(..)"),
        }
    }
}

/// Outcome of looking a name up without calling a resolver.
pub(crate) enum Lookup {
    Bound(Value),
    Sync(Arc<dyn IdentifierResolver>),
    Async(Arc<dyn AsyncIdentifierResolver>),
}

/// Bindings for one evaluation: identifiers, functions and the usage log.
///
/// # Examples
///
/// ```
/// use mace_lang::{EvalContext, IdentifierSource, Value};
///
/// let ctx = EvalContext::new()
///     .with_identifiers(IdentifierSource::from_map([("price", 12.0)]))
///     .with_function("double", |args: &[Value]| {
///         Value::Number(args.first().map_or(0.0, Value::as_number) * 2.0)
///     })
///     .track_identifiers();
/// assert!(ctx.identifiers_order().is_some());
/// ```
#[derive(Clone)]
pub struct EvalContext {
    globals: HashMap<String, Value>,
    functions: HashMap<String, NativeFunction>,
    identifiers: IdentifierSource,
    identifiers_order: Option<Vec<String>>,
    seen: HashSet<String>,
}

impl EvalContext {
    /// Context with the built-in constants and functions pre-seeded.
    pub fn new() -> Self {
        EvalContext {
            globals: builtins::identifiers(),
            functions: builtins::functions(),
            ..Self::bare()
        }
    }

    /// Context without any built-ins.
    pub fn bare() -> Self {
        EvalContext {
            globals: HashMap::new(),
            functions: HashMap::new(),
            identifiers: IdentifierSource::default(),
            identifiers_order: None,
            seen: HashSet::new(),
        }
    }

    pub fn with_identifiers(mut self, identifiers: IdentifierSource) -> Self {
        self.identifiers = identifiers;
        self
    }

    /// Registers an infallible host function, replacing any built-in of the same name.
    pub fn with_function<F>(self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.with_fallible_function(name, move |args: &[Value]| Ok(function(args)))
    }

    /// Registers a host function whose error aborts the evaluation.
    pub fn with_fallible_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Records the names of identifiers reached during evaluation.
    pub fn track_identifiers(mut self) -> Self {
        self.identifiers_order = Some(Vec::new());
        self.seen.clear();
        self
    }

    /// Names reached so far, in first-reached order, when tracking is enabled.
    pub fn identifiers_order(&self) -> Option<&[String]> {
        self.identifiers_order.as_deref()
    }

    /// Takes the usage log, leaving an empty one in place.
    pub fn take_identifiers_order(&mut self) -> Option<Vec<String>> {
        self.seen.clear();
        self.identifiers_order.as_mut().map(std::mem::take)
    }

    pub fn function(&self, name: &str) -> Option<NativeFunction> {
        self.functions.get(name).cloned()
    }

    /// Finds a value for `name` without calling a resolver.
    ///
    /// Static bindings first, then built-in constants; anything else is
    /// logged (when tracking) and left to the identifier source.
    pub(crate) fn lookup(&mut self, name: &str) -> Lookup {
        if let IdentifierSource::Static(map) = &self.identifiers {
            if let Some(value) = map.get(name) {
                return Lookup::Bound(value.clone());
            }
        }
        if let Some(value) = self.globals.get(name) {
            return Lookup::Bound(value.clone());
        }

        if let Some(order) = self.identifiers_order.as_mut() {
            if self.seen.insert(name.to_string()) {
                order.push(name.to_string());
            }
        }

        match &self.identifiers {
            IdentifierSource::Static(_) => Lookup::Bound(Value::Null),
            IdentifierSource::Sync(resolver) => Lookup::Sync(Arc::clone(resolver)),
            IdentifierSource::Async(resolver) => Lookup::Async(Arc::clone(resolver)),
        }
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalContext")
            .field("identifiers", &self.identifiers)
            .field("functions", &self.functions.len())
            .field("identifiers_order", &self.identifiers_order)
            .finish()
    }
}
