use crate::{
    compiler,
    element::Program,
    error::{EvaluationError, FilterError},
    evaluation::{self, Evaluator},
    limits::Limits,
    parser,
    registry::FunctionRegistry,
};
use tracing::debug;

/// A compiled filter expression, ready to be evaluated any number of times.
///
/// See the [module documentation] for the grammar of the expressions.
///
/// [module documentation]: index.html
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    expression: Option<String>,
    program: Program,
}

impl Filter {
    /// Parse and compile `expression` with the default [`Limits`].
    ///
    /// Line breaks are removed before parsing so that an expression can span several lines.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use postfix_filter::Filter;
    ///
    /// let filter = Filter::new(r#""gosyu" && Not("nezumi")"#).unwrap();
    /// assert_eq!(r#""gosyu","nezumi",Not(1),and"#, filter.program().to_string());
    /// ```
    ///
    /// Operators other than `&&`, `||` and unary `-` are rejected:
    ///
    /// ```rust
    /// use postfix_filter::{CompileError, Filter, FilterError};
    ///
    /// let result = Filter::new(r#""A" + "B""#);
    /// assert!(matches!(
    ///     result,
    ///     Err(FilterError::Compile(CompileError::UnsupportedConstruct(_)))
    /// ));
    /// ```
    pub fn new(expression: &str) -> Result<Self, FilterError> {
        Self::with_limits(expression, &Limits::default())
    }

    /// Parse and compile `expression` within the given [`Limits`].
    pub fn with_limits(expression: &str, limits: &Limits) -> Result<Self, FilterError> {
        let root = parser::parse(expression, limits)?;
        let program = compiler::compile_with_limits(&root, limits)?;
        debug!(expression, elements = program.len(), "filter built");
        Ok(Self {
            expression: Some(expression.to_string()),
            program,
        })
    }

    /// Wrap a program that was built by hand or compiled earlier.
    pub fn from_program(program: Program) -> Self {
        Self {
            expression: None,
            program,
        }
    }

    /// The expression the filter was compiled from, `None` for [`Filter::from_program()`].
    #[inline]
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    #[inline]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Evaluate the filter against one evaluator.
    ///
    /// Concurrent evaluations of the same filter are fine as long as each one gets its own
    /// evaluator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use postfix_filter::{BoxError, Evaluator, Filter, FunctionRegistry};
    /// use std::convert::Infallible;
    ///
    /// struct Line(String);
    ///
    /// impl Evaluator for Line {
    ///     fn eval_string(&mut self, value: &str) -> Result<bool, BoxError> {
    ///         Ok(self.0.contains(value))
    ///     }
    ///
    ///     fn eval_int(&mut self, value: i64) -> Result<bool, BoxError> {
    ///         Ok(self.0.contains(&value.to_string()))
    ///     }
    ///
    ///     fn eval_float(&mut self, value: f64) -> Result<bool, BoxError> {
    ///         Ok(self.0.contains(&value.to_string()))
    ///     }
    /// }
    ///
    /// let mut functions = FunctionRegistry::new();
    /// functions
    ///     .register("Not", |line: &mut Line, needle: String| {
    ///         Ok::<_, Infallible>(!line.0.contains(&needle))
    ///     })
    ///     .unwrap();
    ///
    /// let filter = Filter::new(r#""gosyu" && Not("nezumi")"#).unwrap();
    /// let mut line = Line("gosyu nezumi".to_string());
    /// assert!(!filter.evaluate(&functions, &mut line).unwrap());
    /// let mut line = Line("gosyu".to_string());
    /// assert!(filter.evaluate(&functions, &mut line).unwrap());
    /// ```
    #[inline]
    pub fn evaluate<E: Evaluator>(
        &self,
        functions: &FunctionRegistry<E>,
        evaluator: &mut E,
    ) -> Result<bool, EvaluationError> {
        evaluation::evaluate(&self.program, functions, evaluator)
    }
}

impl TryFrom<&str> for Filter {
    type Error = FilterError;

    fn try_from(expression: &str) -> Result<Self, Self::Error> {
        Self::new(expression)
    }
}

impl From<Program> for Filter {
    fn from(program: Program) -> Self {
        Self::from_program(program)
    }
}
