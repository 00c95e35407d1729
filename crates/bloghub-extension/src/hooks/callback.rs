//! Hook callbacks: arity-tagged functions and their registration records.
//!
//! A callback declares how many positional arguments it wants by the
//! constructor it is built with. The dispatcher always offers the full
//! argument list and the callback receives only the leading
//! `accepted_args` values.

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde_json::Value;

use bloghub_core::error::AppResult;

/// Future returned by every hook callback.
pub type HookFuture = BoxFuture<'static, AppResult<Value>>;

/// Default callback priority.
pub const DEFAULT_PRIORITY: i32 = 10;

type NullaryFn = dyn Fn() -> HookFuture + Send + Sync;
type UnaryFn = dyn Fn(Value) -> HookFuture + Send + Sync;
type BinaryFn = dyn Fn(Value, Value) -> HookFuture + Send + Sync;
type VariadicFn = dyn Fn(HookArgs) -> HookFuture + Send + Sync;

#[derive(Clone)]
enum HookFnKind {
    Nullary(Arc<NullaryFn>),
    Unary(Arc<UnaryFn>),
    Binary(Arc<BinaryFn>),
    Variadic(Arc<VariadicFn>),
}

/// A hook callback function.
///
/// Cloning is cheap and preserves identity: two `HookFn` values are the same
/// function for removal purposes exactly when one is a clone of the other.
#[derive(Clone)]
pub struct HookFn {
    kind: HookFnKind,
}

impl HookFn {
    /// Creates a callback that takes no arguments.
    pub fn nullary<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Value>> + Send + 'static,
    {
        Self {
            kind: HookFnKind::Nullary(Arc::new(move || f().boxed())),
        }
    }

    /// Creates a callback that takes the first argument (the filtered value
    /// for `filter`, the first argument for `exec`).
    pub fn unary<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Value>> + Send + 'static,
    {
        Self {
            kind: HookFnKind::Unary(Arc::new(move |a| f(a).boxed())),
        }
    }

    /// Creates a callback that takes the first two arguments.
    pub fn binary<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Value>> + Send + 'static,
    {
        Self {
            kind: HookFnKind::Binary(Arc::new(move |a, b| f(a, b).boxed())),
        }
    }

    /// Creates a callback that receives every offered argument.
    pub fn variadic<F, Fut>(f: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Value>> + Send + 'static,
    {
        Self {
            kind: HookFnKind::Variadic(Arc::new(move |args| f(args).boxed())),
        }
    }

    /// Synchronous variant of [`HookFn::nullary`].
    pub fn nullary_sync<F>(f: F) -> Self
    where
        F: Fn() -> AppResult<Value> + Send + Sync + 'static,
    {
        Self::nullary(move || future::ready(f()))
    }

    /// Synchronous variant of [`HookFn::unary`].
    pub fn unary_sync<F>(f: F) -> Self
    where
        F: Fn(Value) -> AppResult<Value> + Send + Sync + 'static,
    {
        Self::unary(move |a| future::ready(f(a)))
    }

    /// Synchronous variant of [`HookFn::binary`].
    pub fn binary_sync<F>(f: F) -> Self
    where
        F: Fn(Value, Value) -> AppResult<Value> + Send + Sync + 'static,
    {
        Self::binary(move |a, b| future::ready(f(a, b)))
    }

    /// Synchronous variant of [`HookFn::variadic`].
    pub fn variadic_sync<F>(f: F) -> Self
    where
        F: Fn(HookArgs) -> AppResult<Value> + Send + Sync + 'static,
    {
        Self::variadic(move |args| future::ready(f(args)))
    }

    /// Returns the number of arguments the function declares.
    pub fn declared_arity(&self) -> Arity {
        match &self.kind {
            HookFnKind::Nullary(_) => Arity::Fixed(0),
            HookFnKind::Unary(_) => Arity::Fixed(1),
            HookFnKind::Binary(_) => Arity::Fixed(2),
            HookFnKind::Variadic(_) => Arity::Unbounded,
        }
    }

    /// Returns `true` if both handles refer to the same function.
    pub fn ptr_eq(&self, other: &HookFn) -> bool {
        match (&self.kind, &other.kind) {
            (HookFnKind::Nullary(a), HookFnKind::Nullary(b)) => Arc::ptr_eq(a, b),
            (HookFnKind::Unary(a), HookFnKind::Unary(b)) => Arc::ptr_eq(a, b),
            (HookFnKind::Binary(a), HookFnKind::Binary(b)) => Arc::ptr_eq(a, b),
            (HookFnKind::Variadic(a), HookFnKind::Variadic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Invokes the function with an already truncated argument list.
    ///
    /// Fixed-arity functions cannot observe how many arguments were passed;
    /// a parameter position with no argument receives `Value::Null`.
    fn invoke(&self, args: HookArgs) -> HookFuture {
        let mut values = args.0.into_iter();
        match &self.kind {
            HookFnKind::Nullary(f) => f(),
            HookFnKind::Unary(f) => f(values.next().unwrap_or(Value::Null)),
            HookFnKind::Binary(f) => {
                let first = values.next().unwrap_or(Value::Null);
                let second = values.next().unwrap_or(Value::Null);
                f(first, second)
            }
            HookFnKind::Variadic(f) => f(HookArgs(values.collect())),
        }
    }
}

impl fmt::Debug for HookFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match &self.kind {
            HookFnKind::Nullary(_) => "nullary",
            HookFnKind::Unary(_) => "unary",
            HookFnKind::Binary(_) => "binary",
            HookFnKind::Variadic(_) => "variadic",
        };
        f.debug_struct("HookFn").field("kind", &variant).finish()
    }
}

/// How many leading arguments a callback receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// At most this many arguments.
    Fixed(usize),
    /// Every offered argument.
    Unbounded,
}

impl Arity {
    /// Returns how many of `offered` arguments are passed through.
    pub fn take(self, offered: usize) -> usize {
        match self {
            Self::Fixed(n) => n.min(offered),
            Self::Unbounded => offered,
        }
    }
}

/// Positional arguments delivered to a variadic callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookArgs(Vec<Value>);

impl HookArgs {
    /// Wraps a list of arguments.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Consumes the wrapper and returns the arguments.
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for HookArgs {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for HookArgs {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Opaque identifier of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(pub(crate) u64);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb-{}", self.0)
    }
}

/// Registration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookOptions {
    /// Ordering key, lower runs earlier.
    pub priority: i32,
    /// Overrides the function's declared arity when set.
    pub accepted_args: Option<usize>,
}

impl HookOptions {
    /// Options with the given priority and the declared arity.
    pub fn priority(priority: i32) -> Self {
        Self {
            priority,
            accepted_args: None,
        }
    }

    /// Sets the number of accepted arguments.
    pub fn accepted_args(mut self, accepted_args: usize) -> Self {
        self.accepted_args = Some(accepted_args);
        self
    }
}

impl Default for HookOptions {
    fn default() -> Self {
        Self::priority(DEFAULT_PRIORITY)
    }
}

/// A registered callback.
#[derive(Debug, Clone)]
pub struct Callback {
    pub(crate) id: CallbackId,
    pub(crate) func: HookFn,
    pub(crate) priority: i32,
    pub(crate) accepted_args: Arity,
}

impl Callback {
    /// Returns the registration identifier.
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Returns the registered function.
    pub fn func(&self) -> &HookFn {
        &self.func
    }

    /// Returns the priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns how many arguments this callback receives.
    pub fn accepted_args(&self) -> Arity {
        self.accepted_args
    }

    /// Calls the function with the leading `accepted_args` of `offered`.
    pub fn call(&self, mut offered: Vec<Value>) -> HookFuture {
        offered.truncate(self.accepted_args.take(offered.len()));
        self.func.invoke(HookArgs(offered))
    }
}
