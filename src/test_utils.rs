pub mod ast {
    macro_rules! or {
        ($left:expr, $right:expr) => {
            $crate::ast::Node::Binary(
                $crate::ast::BinaryOperator::Or,
                Box::new($left),
                Box::new($right),
            )
        };
    }

    macro_rules! and {
        ($left:expr, $right:expr) => {
            $crate::ast::Node::Binary(
                $crate::ast::BinaryOperator::And,
                Box::new($left),
                Box::new($right),
            )
        };
    }

    macro_rules! binary {
        ($operator:expr, $left:expr, $right:expr) => {
            $crate::ast::Node::Binary($operator, Box::new($left), Box::new($right))
        };
    }

    macro_rules! neg {
        ($value:expr) => {
            $crate::ast::Node::Unary($crate::ast::UnaryOperator::Negate, Box::new($value))
        };
    }

    macro_rules! unary {
        ($operator:expr, $value:expr) => {
            $crate::ast::Node::Unary($operator, Box::new($value))
        };
    }

    macro_rules! call {
        ($name:expr $(, $argument:expr)* $(,)?) => {
            $crate::ast::Node::Call {
                name: $name.to_string(),
                arguments: vec![$($argument),*],
            }
        };
    }

    /// A double-quoted string literal; the quotes are added around `$value`.
    macro_rules! string {
        ($value:expr) => {
            $crate::ast::Node::Literal($crate::ast::Literal::String(format!("\"{}\"", $value)))
        };
    }

    macro_rules! integer {
        ($text:expr) => {
            $crate::ast::Node::Literal($crate::ast::Literal::Integer($text.to_string()))
        };
    }

    macro_rules! float {
        ($text:expr) => {
            $crate::ast::Node::Literal($crate::ast::Literal::Float($text.to_string()))
        };
    }

    macro_rules! boolean {
        ($value:expr) => {
            $crate::ast::Node::Literal($crate::ast::Literal::Boolean($value))
        };
    }

    macro_rules! identifier {
        ($name:expr) => {
            $crate::ast::Node::Identifier($name.to_string())
        };
    }

    pub(crate) use and;
    pub(crate) use binary;
    pub(crate) use boolean;
    pub(crate) use call;
    pub(crate) use float;
    pub(crate) use identifier;
    pub(crate) use integer;
    pub(crate) use neg;
    pub(crate) use or;
    pub(crate) use string;
    pub(crate) use unary;
}

pub mod elements {
    macro_rules! string {
        ($value:expr) => {
            $crate::element::Element::LitString($value.to_string())
        };
    }

    macro_rules! call {
        ($name:expr, $arity:expr) => {
            $crate::element::Element::Call {
                name: $name.to_string(),
                arity: $arity,
            }
        };
    }

    pub(crate) use call;
    pub(crate) use string;
}

pub mod evaluators {
    use crate::{
        error::BoxError,
        evaluation::Evaluator,
        registry::FunctionRegistry,
    };
    use std::convert::Infallible;

    /// Matches literals by substring containment against one line of text.
    #[derive(Debug, Default)]
    pub struct TextEvaluator {
        pub text: String,
        pub calls: Vec<String>,
    }

    impl TextEvaluator {
        pub fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                calls: Vec::new(),
            }
        }

        pub fn functions() -> FunctionRegistry<Self> {
            let mut functions = FunctionRegistry::new();
            functions
                .register("Not", |evaluator: &mut Self, needle: String| {
                    evaluator.calls.push(format!("Not({needle})"));
                    Ok::<_, Infallible>(!evaluator.text.contains(&needle))
                })
                .unwrap();
            functions
        }
    }

    impl Evaluator for TextEvaluator {
        fn eval_string(&mut self, value: &str) -> Result<bool, BoxError> {
            self.calls.push(format!("eval_string({value})"));
            Ok(self.text.contains(value))
        }

        fn eval_int(&mut self, value: i64) -> Result<bool, BoxError> {
            self.calls.push(format!("eval_int({value})"));
            Ok(self.text.contains(&value.to_string()))
        }

        fn eval_float(&mut self, value: f64) -> Result<bool, BoxError> {
            self.calls.push(format!("eval_float({value})"));
            Ok(self.text.contains(&format!("{value:.6}")))
        }
    }

    /// Evaluator exposing the `mustTrue*`/`mustFalse*` fixture functions.
    #[derive(Debug, Default)]
    pub struct FixtureEvaluator {
        pub calls: Vec<String>,
    }

    impl FixtureEvaluator {
        pub fn functions() -> FunctionRegistry<Self> {
            let mut functions = FunctionRegistry::new();
            functions
                .register("mustTrueWithArg1", |evaluator: &mut Self, value: String| {
                    evaluator.calls.push(format!("mustTrueWithArg1({value})"));
                    Ok::<_, Infallible>(true)
                })
                .unwrap();
            functions
                .register("mustFalseWithArg1", |evaluator: &mut Self, value: String| {
                    evaluator.calls.push(format!("mustFalseWithArg1({value})"));
                    Ok::<_, Infallible>(false)
                })
                .unwrap();
            functions
                .register("mustTrueWithIntArg1", |_: &mut Self, _: i64| {
                    Ok::<_, Infallible>(true)
                })
                .unwrap();
            functions
                .register("mustTrueWithFloatArg1", |_: &mut Self, _: f64| {
                    Ok::<_, Infallible>(true)
                })
                .unwrap();
            functions
                .register("mustTrueWithBoolArg1", |_: &mut Self, value: bool| {
                    Ok::<_, Infallible>(value)
                })
                .unwrap();
            functions
                .register("mustTrueWithoutArg", |_: &mut Self| Ok::<_, Infallible>(true))
                .unwrap();
            functions
                .register("fail", |_: &mut Self, reason: String| {
                    Err::<bool, BoxError>(reason.into())
                })
                .unwrap();
            functions
        }
    }

    impl Evaluator for FixtureEvaluator {
        fn eval_string(&mut self, value: &str) -> Result<bool, BoxError> {
            self.calls.push(format!("eval_string({value})"));
            Ok(true)
        }

        fn eval_int(&mut self, value: i64) -> Result<bool, BoxError> {
            self.calls.push(format!("eval_int({value})"));
            Ok(true)
        }

        fn eval_float(&mut self, value: f64) -> Result<bool, BoxError> {
            self.calls.push(format!("eval_float({value})"));
            Ok(false)
        }
    }
}
