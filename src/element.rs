use crate::value::Value;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// A single instruction of a compiled [`Program`].
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    And,
    Or,
    Neg,
    Call { name: String, arity: usize },
    LitString(String),
    LitInt(i64),
    LitFloat(f64),
    LitBool(bool),
}

impl Element {
    /// Number of values the element pops from the stack.
    #[inline]
    pub fn arity(&self) -> usize {
        match self {
            Self::And | Self::Or => 2,
            Self::Neg => 1,
            Self::Call { arity, .. } => *arity,
            Self::LitString(_) | Self::LitInt(_) | Self::LitFloat(_) | Self::LitBool(_) => 0,
        }
    }

    /// The value pushed by a literal element, `None` for operators.
    pub fn literal(&self) -> Option<Value> {
        match self {
            Self::LitString(value) => Some(Value::String(value.clone())),
            Self::LitInt(value) => Some(Value::Integer(*value)),
            Self::LitFloat(value) => Some(Value::Float(*value)),
            Self::LitBool(value) => Some(Value::Boolean(*value)),
            Self::And | Self::Or | Self::Neg | Self::Call { .. } => None,
        }
    }
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        match value {
            Value::String(value) => Self::LitString(value),
            Value::Integer(value) => Self::LitInt(value),
            Value::Float(value) => Self::LitFloat(value),
            Value::Boolean(value) => Self::LitBool(value),
        }
    }
}

impl Display for Element {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::And => write!(formatter, "and"),
            Self::Or => write!(formatter, "or"),
            Self::Neg => write!(formatter, "-"),
            Self::Call { name, arity } => write!(formatter, "{name}({arity})"),
            Self::LitString(value) => write!(formatter, "{value:?}"),
            Self::LitInt(value) => write!(formatter, "{value}"),
            Self::LitFloat(value) => write!(formatter, "{value:?}"),
            Self::LitBool(value) => write!(formatter, "{value}"),
        }
    }
}

/// Where a hand-built [`Program`] stops being executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackDefect {
    Underflow {
        position: usize,
        required: usize,
        available: usize,
    },
    Remaining(usize),
}

/// A compiled filter: its elements in postfix order.
///
/// A program never changes once built and holds no external resources, so the same program
/// can be evaluated any number of times, from any number of threads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    elements: Vec<Element>,
}

impl Program {
    /// Wrap elements that did not come from the compiler.
    ///
    /// Nothing is checked here; [`Program::validate()`] reports whether the stream can run and
    /// evaluation re-checks every step anyway.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use postfix_filter::{Element, Program};
    ///
    /// let program = Program::from_elements(vec![Element::LitBool(true), Element::And]);
    /// assert!(program.validate().is_err());
    /// ```
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Simulate the stack depth without evaluating anything.
    ///
    /// Succeeds with the deepest stack reached when every element finds enough operands and
    /// exactly one value is left at the end.
    pub fn validate(&self) -> Result<usize, StackDefect> {
        let mut depth = 0usize;
        let mut deepest = 0usize;
        for (position, element) in self.elements.iter().enumerate() {
            let required = element.arity();
            if depth < required {
                return Err(StackDefect::Underflow {
                    position,
                    required,
                    available: depth,
                });
            }
            depth = depth - required + 1;
            deepest = deepest.max(depth);
        }

        match depth {
            1 => Ok(deepest),
            remaining => Err(StackDefect::Remaining(remaining)),
        }
    }

    pub(crate) fn push(&mut self, element: Element) {
        self.elements.push(element);
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl Display for Program {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(formatter, "{}", self.elements.iter().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_display_every_element() {
        assert_eq!("and", Element::And.to_string());
        assert_eq!("or", Element::Or.to_string());
        assert_eq!("-", Element::Neg.to_string());
        assert_eq!(
            "Not(1)",
            Element::Call {
                name: "Not".to_string(),
                arity: 1
            }
            .to_string()
        );
        assert_eq!(r#""A""#, Element::LitString("A".to_string()).to_string());
        assert_eq!("5", Element::LitInt(5).to_string());
        assert_eq!("1.5", Element::LitFloat(1.5).to_string());
        assert_eq!("false", Element::LitBool(false).to_string());
    }

    #[test]
    fn can_display_a_program_in_postfix_order() {
        let program = Program::from_elements(vec![
            Element::LitString("A".to_string()),
            Element::LitString("B".to_string()),
            Element::And,
        ]);

        assert_eq!(r#""A","B",and"#, program.to_string());
    }

    #[test]
    fn can_convert_values_back_into_literal_elements() {
        assert_eq!(Element::LitInt(-5), Element::from(Value::Integer(-5)));
        assert_eq!(Element::LitBool(true), Element::from(Value::Boolean(true)));
        assert_eq!(
            Some(Value::Float(1.5)),
            Element::LitFloat(1.5).literal()
        );
        assert_eq!(None, Element::Neg.literal());
    }

    #[test]
    fn return_the_deepest_stack_of_a_valid_program() {
        let program = Program::from_elements(vec![
            Element::LitString("A".to_string()),
            Element::LitString("B".to_string()),
            Element::LitString("C".to_string()),
            Element::Call {
                name: "f".to_string(),
                arity: 2,
            },
            Element::Or,
        ]);

        assert_eq!(Ok(3), program.validate());
    }

    #[test]
    fn report_the_first_underflow() {
        let program = Program::from_elements(vec![
            Element::LitBool(true),
            Element::Neg,
            Element::Or,
        ]);

        assert_eq!(
            Err(StackDefect::Underflow {
                position: 2,
                required: 2,
                available: 1
            }),
            program.validate()
        );
    }

    #[test]
    fn report_the_values_left_on_the_stack() {
        let program =
            Program::from_elements(vec![Element::LitBool(true), Element::LitBool(false)]);

        assert_eq!(Err(StackDefect::Remaining(2)), program.validate());
    }

    #[test]
    fn report_an_empty_program_as_leaving_nothing() {
        assert_eq!(Err(StackDefect::Remaining(0)), Program::default().validate());
    }

    #[test]
    fn allow_calls_without_arguments() {
        let program = Program::from_elements(vec![Element::Call {
            name: "mustTrueWithoutArg".to_string(),
            arity: 0,
        }]);

        assert_eq!(Ok(1), program.validate());
    }
}
