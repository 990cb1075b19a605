use crate::{element::Element, lexer::LexicalError, value::ValueKind};
use itertools::Itertools;
use thiserror::Error;

/// An error returned by a caller supplied hook or function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParserError {
    #[error("failed to lex the expression at offset {position} with {error}")]
    Lexical {
        error: LexicalError,
        position: usize,
    },
    #[error("expected {expected}, found {found} at offset {position}")]
    Unexpected {
        expected: &'static str,
        found: String,
        position: usize,
    },
    #[error("expression nests deeper than {limit} levels at offset {position}")]
    TooDeep { limit: usize, position: usize },
}

/// The raw expression does not belong to the filter grammar.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot parse {expression:?}: {cause}")]
pub struct SyntaxError {
    pub expression: String,
    #[source]
    pub cause: ParserError,
}

/// The parsed tree contains something the compiler does not turn into a [`crate::Program`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("unsupported {0}")]
    UnsupportedConstruct(String),
    #[error("unsupported {kind} literal {text}")]
    UnsupportedLiteral { kind: &'static str, text: String },
    #[error("malformed {kind} literal {text}: {reason}")]
    MalformedLiteral {
        kind: &'static str,
        text: String,
        reason: String,
    },
    #[error("program exceeds the limit of {limit} elements")]
    ProgramTooLong { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("function {0} has already been registered")]
    AlreadyPresent(String),
}

/// Where a caller supplied error came from.
#[derive(Debug, Clone, PartialEq)]
pub enum CallSite {
    /// One of the literal resolution hooks, with the operand it was given.
    Hook { hook: &'static str, operand: String },
    /// A function dispatched from a `Call` element.
    Function(String),
}

impl std::fmt::Display for CallSite {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hook { hook, operand } => write!(formatter, "{hook}({operand})"),
            Self::Function(name) => write!(formatter, "function {name}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("{element} at position {position} requires {required} operands but the stack holds {available}")]
    StackUnderflow {
        element: Element,
        position: usize,
        required: usize,
        available: usize,
    },
    #[error("program must leave exactly one value on the stack, found {remaining}")]
    StackCorrupt { remaining: usize },
    #[error("cannot negate a {0} value")]
    NotNumeric(ValueKind),
    #[error("function not found: {0}")]
    FunctionNotFound(String),
    #[error("function {function} expects ({}) but was called with ({})", .expected.iter().join(", "), .actual.iter().join(", "))]
    ArgumentMismatch {
        function: String,
        expected: Vec<ValueKind>,
        actual: Vec<ValueKind>,
    },
    #[error("function {function} declared a {expected} result but returned a {actual}")]
    ResultTypeUnsupported {
        function: String,
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("{site} failed: {source}")]
    Evaluator {
        site: CallSite,
        #[source]
        source: BoxError,
    },
}

/// Any error produced while building or running a [`crate::Filter`].
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
