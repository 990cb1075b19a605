//! Compile boolean filter expressions into postfix programs and evaluate them on a value stack.
//!
//! An expression such as `"gosyu" && Not("nezumi")` is parsed, compiled once into a
//! [`Program`] (a flat sequence of [`Element`]s in postfix order) and then evaluated against
//! as many inputs as needed. What a literal or a named function *means* is left to the caller:
//! the [`Evaluator`] trait resolves literals and a [`FunctionRegistry`] holds the named
//! functions.
//!
//! # Examples
//!
//! Matching lines of text by substring containment:
//!
//! ```
//! use postfix_filter::{BoxError, Evaluator, Filter, FunctionRegistry};
//! use std::convert::Infallible;
//!
//! // The evaluator holds the line currently being matched
//! struct Line(String);
//!
//! impl Evaluator for Line {
//!     fn eval_string(&mut self, value: &str) -> Result<bool, BoxError> {
//!         Ok(self.0.contains(value))
//!     }
//!
//!     fn eval_int(&mut self, value: i64) -> Result<bool, BoxError> {
//!         Ok(self.0.contains(&value.to_string()))
//!     }
//!
//!     fn eval_float(&mut self, value: f64) -> Result<bool, BoxError> {
//!         Ok(self.0.contains(&format!("{value:.6}")))
//!     }
//! }
//!
//! // Register the functions the expressions can call
//! let mut functions = FunctionRegistry::new();
//! functions
//!     .register("Not", |line: &mut Line, needle: String| {
//!         Ok::<_, Infallible>(!line.0.contains(&needle))
//!     })?;
//!
//! // Compile the expression once
//! let filter = Filter::new(r#"("A" && "B") || Not("error")"#)?;
//!
//! // Evaluate it against every line
//! let matches: Vec<&str> = ["AB", "error: A", "warning"]
//!     .into_iter()
//!     .filter(|line| {
//!         filter
//!             .evaluate(&functions, &mut Line(line.to_string()))
//!             .unwrap_or(false)
//!     })
//!     .collect();
//! assert_eq!(vec!["AB", "warning"], matches);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Domain Specific Language (DSL)
//!
//! The expressions follow a small, C-like grammar:
//!
//! * Literals: strings (`"text"` with the usual escapes, or raw `` `text` ``), decimal integers
//!   (`42`), floats (`1.5`, `1e3`) and booleans (`true`, `false`);
//! * Function calls: `Name(argument, ...)` where the name may be qualified (`text.Contains`)
//!   and every argument is itself an expression;
//! * Boolean operators: `&&` and `||`, `&&` binding tighter than `||`, both left-associative;
//! * Unary negation of numbers: `-5`, `-(1.5)`;
//! * Parentheses to group sub-expressions.
//!
//! Line breaks are ignored, so an expression can span several lines. Other operators (`+`,
//! `==`, `!`, ...) are recognized by the parser but rejected when compiling.
//!
//! As an example, the following would all be valid expressions:
//!
//! ```text
//! "A" && "B"
//! "gosyu" && Not("nezumi")
//! (StartsWith("GET") || StartsWith("POST")) && Status(-1)
//! ```
//!
//! # Evaluation
//!
//! The program runs on a stack in a single pass:
//!
//! * Literals are pushed unresolved;
//! * `&&` and `||` resolve **both** operands, the left one first, and push the combined
//!   boolean. There is no short-circuit: functions with side effects always run;
//! * Resolving a boolean is immediate, strings, integers and floats are handed to
//!   [`Evaluator::eval_string()`], [`Evaluator::eval_int()`] and [`Evaluator::eval_float()`];
//! * Calls pop their arguments, are checked against the [`Signature`] of the registered
//!   function and push its result;
//! * The single value left at the end is resolved into the verdict.
//!
//! A [`Filter`] is immutable and can be shared between threads; an evaluator usually holds
//! per-input state, so each concurrent evaluation needs its own.
mod ast;
mod compiler;
mod element;
mod error;
mod evaluation;
mod filter;
mod lexer;
mod limits;
mod parser;
mod registry;
#[cfg(test)]
mod test_utils;
mod value;

pub use crate::{
    ast::{BinaryOperator, Literal, Node, TreeNode, UnaryOperator},
    compiler::{compile, compile_with_limits},
    element::{Element, Program, StackDefect},
    error::{
        BoxError, CallSite, CompileError, EvaluationError, FilterError, ParserError,
        RegistryError, SyntaxError,
    },
    evaluation::{evaluate, Evaluator},
    filter::Filter,
    lexer::LexicalError,
    limits::Limits,
    parser::{normalize, parse},
    registry::{Function, FunctionRegistry, Handler, IntoFunction, Signature},
    value::{Primitive, Value, ValueKind},
};
