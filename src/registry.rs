use crate::{
    error::{BoxError, CallSite, EvaluationError, RegistryError},
    value::{Primitive, Value, ValueKind},
};
use itertools::Itertools;
use std::{
    collections::HashMap,
    fmt::{Debug, Display, Formatter},
    marker::PhantomData,
};
use tracing::trace;

/// The parameter and result kinds of a registered function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    parameters: Vec<ValueKind>,
    returns: ValueKind,
}

impl Signature {
    pub fn new(parameters: Vec<ValueKind>, returns: ValueKind) -> Self {
        Self {
            parameters,
            returns,
        }
    }

    #[inline]
    pub fn parameters(&self) -> &[ValueKind] {
        &self.parameters
    }

    #[inline]
    pub fn returns(&self) -> ValueKind {
        self.returns
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the arguments have exactly the expected count and kinds.
    pub fn accepts(&self, arguments: &[Value]) -> bool {
        self.parameters.len() == arguments.len()
            && self
                .parameters
                .iter()
                .zip(arguments)
                .all(|(expected, argument)| *expected == argument.kind())
    }
}

impl Display for Signature {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "({}) -> {}",
            self.parameters.iter().join(", "),
            self.returns
        )
    }
}

/// The type-erased body of a registered function.
///
/// Arguments reaching a handler have already been checked against its [`Signature`].
pub trait Handler<E>: Send + Sync {
    fn call(&self, evaluator: &mut E, arguments: Vec<Value>) -> Result<Value, BoxError>;
}

/// A function callable by name from a compiled program.
pub struct Function<E> {
    signature: Signature,
    handler: Box<dyn Handler<E>>,
}

impl<E> Function<E> {
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn call(
        &self,
        name: &str,
        evaluator: &mut E,
        arguments: Vec<Value>,
    ) -> Result<Value, EvaluationError> {
        if !self.signature.accepts(&arguments) {
            return Err(EvaluationError::ArgumentMismatch {
                function: name.to_string(),
                expected: self.signature.parameters.clone(),
                actual: arguments.iter().map(Value::kind).collect(),
            });
        }

        trace!(function = name, arguments = %arguments.iter().join(", "), "calling");
        let value = self
            .handler
            .call(evaluator, arguments)
            .map_err(|source| EvaluationError::Evaluator {
                site: CallSite::Function(name.to_string()),
                source,
            })?;
        if value.kind() != self.signature.returns {
            return Err(EvaluationError::ResultTypeUnsupported {
                function: name.to_string(),
                expected: self.signature.returns,
                actual: value.kind(),
            });
        }
        Ok(value)
    }
}

impl<E> Debug for Function<E> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Function")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Conversion of a typed closure into a [`Function`].
///
/// Implemented for closures taking the evaluator followed by up to four [`Primitive`]
/// arguments and returning `Result<R, Err>` where `R` is a [`Primitive`] too. The signature is
/// derived from the closure's types.
pub trait IntoFunction<E, Args> {
    fn into_function(self) -> Function<E>;
}

struct Typed<F, Args> {
    function: F,
    _arguments: PhantomData<fn(Args)>,
}

macro_rules! impl_typed_function {
    ($($kind:ident $argument:ident),*) => {
        impl<E, F, R, Er, $($kind,)*> Handler<E> for Typed<F, ($($kind,)*)>
        where
            F: Fn(&mut E, $($kind),*) -> Result<R, Er> + Send + Sync,
            R: Primitive,
            Er: Into<BoxError>,
            $($kind: Primitive,)*
        {
            #[allow(unused_mut, unused_variables)]
            fn call(&self, evaluator: &mut E, arguments: Vec<Value>) -> Result<Value, BoxError> {
                let mut arguments = arguments.into_iter();
                $(
                    let $argument = arguments
                        .next()
                        .and_then($kind::from_value)
                        .ok_or_else(|| BoxError::from("argument does not match the signature"))?;
                )*
                (self.function)(evaluator, $($argument),*)
                    .map(Primitive::into_value)
                    .map_err(Into::into)
            }
        }

        impl<E, F, R, Er, $($kind,)*> IntoFunction<E, ($($kind,)*)> for F
        where
            F: Fn(&mut E, $($kind),*) -> Result<R, Er> + Send + Sync + 'static,
            R: Primitive + 'static,
            Er: Into<BoxError> + 'static,
            $($kind: Primitive + 'static,)*
        {
            fn into_function(self) -> Function<E> {
                Function {
                    signature: Signature::new(vec![$($kind::KIND),*], R::KIND),
                    handler: Box::new(Typed {
                        function: self,
                        _arguments: PhantomData::<fn(($($kind,)*))>,
                    }),
                }
            }
        }
    };
}

impl_typed_function!();
impl_typed_function!(A a);
impl_typed_function!(A a, B b);
impl_typed_function!(A a, B b, C c);
impl_typed_function!(A a, B b, C c, D d);

struct Dynamic<F, Er> {
    function: F,
    _error: PhantomData<fn() -> Er>,
}

impl<E, F, Er> Handler<E> for Dynamic<F, Er>
where
    F: Fn(&mut E, Vec<Value>) -> Result<Value, Er> + Send + Sync,
    Er: Into<BoxError>,
{
    fn call(&self, evaluator: &mut E, arguments: Vec<Value>) -> Result<Value, BoxError> {
        (self.function)(evaluator, arguments).map_err(Into::into)
    }
}

/// The named functions an evaluator exposes to filter expressions.
///
/// Functions are looked up by their exact name when a `Call` element runs; nothing is resolved
/// at compile time, so the same [`crate::Program`] can be evaluated against different
/// registries.
///
/// # Examples
///
/// ```rust
/// use postfix_filter::{FunctionRegistry, Signature, Value, ValueKind};
/// use std::convert::Infallible;
///
/// struct Line(String);
///
/// let mut functions = FunctionRegistry::new();
/// functions
///     .register("StartsWith", |line: &mut Line, prefix: String| {
///         Ok::<_, Infallible>(line.0.starts_with(&prefix))
///     })
///     .unwrap();
/// functions
///     .register_dynamic(
///         "Length",
///         Signature::new(vec![], ValueKind::Integer),
///         |line: &mut Line, _: Vec<Value>| Ok::<_, Infallible>(Value::Integer(line.0.len() as i64)),
///     )
///     .unwrap();
///
/// assert!(functions.contains("StartsWith"));
/// assert!(functions.register("Length", |_: &mut Line| Ok::<_, Infallible>(true)).is_err());
/// ```
pub struct FunctionRegistry<E> {
    by_names: HashMap<String, Function<E>>,
}

impl<E> FunctionRegistry<E> {
    pub fn new() -> Self {
        Self {
            by_names: HashMap::new(),
        }
    }

    /// Register a typed closure under `name`.
    pub fn register<Args, H>(&mut self, name: &str, handler: H) -> Result<&mut Self, RegistryError>
    where
        H: IntoFunction<E, Args>,
    {
        self.insert(name, handler.into_function())
    }

    /// Register a closure working on raw [`Value`]s.
    ///
    /// The arguments are checked against `signature` before the closure runs; returning a value
    /// of another kind than [`Signature::returns()`] fails the evaluation.
    pub fn register_dynamic<F, Er>(
        &mut self,
        name: &str,
        signature: Signature,
        handler: F,
    ) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&mut E, Vec<Value>) -> Result<Value, Er> + Send + Sync + 'static,
        Er: Into<BoxError> + 'static,
    {
        let function = Function {
            signature,
            handler: Box::new(Dynamic {
                function: handler,
                _error: PhantomData,
            }),
        };
        self.insert(name, function)
    }

    fn insert(&mut self, name: &str, function: Function<E>) -> Result<&mut Self, RegistryError> {
        if self.by_names.contains_key(name) {
            return Err(RegistryError::AlreadyPresent(name.to_string()));
        }

        trace!(function = name, signature = %function.signature, "registered");
        self.by_names.insert(name.to_string(), function);
        Ok(self)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Function<E>> {
        self.by_names.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.by_names.contains_key(name)
    }

    /// Registered names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        self.by_names.keys().map(String::as_str).sorted().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_names.is_empty()
    }
}

impl<E> Default for FunctionRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Debug for FunctionRegistry<E> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_map()
            .entries(
                self.by_names
                    .iter()
                    .sorted_by(|(left, _), (right, _)| left.cmp(right))
                    .map(|(name, function)| (name, &function.signature)),
            )
            .finish()
    }
}
