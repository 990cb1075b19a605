use std::fmt::{Display, Formatter};

pub type TreeNode = Box<Node>;

/// The parsed form of an expression.
///
/// The tree is deliberately wider than what the compiler accepts: every operator the lexer
/// knows about gets a node so that rejecting it can name the operator.
///
/// A chain such as `a || b || c` nests one level per operand, so dropping, comparing and
/// displaying a tree walk it with an explicit stack instead of recursing.
#[derive(Debug)]
pub enum Node {
    Binary(BinaryOperator, TreeNode, TreeNode),
    Unary(UnaryOperator, TreeNode),
    Call { name: String, arguments: Vec<Node> },
    Literal(Literal),
    Identifier(String),
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum BinaryOperator {
    And,
    Or,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Add,
    Subtract,
    BitOr,
    BitXor,
    Multiply,
    Divide,
    Remainder,
    BitAnd,
}

impl BinaryOperator {
    /// Binding power, higher binds tighter.
    #[inline]
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Equal
            | Self::NotEqual
            | Self::LessThan
            | Self::LessThanEqual
            | Self::GreaterThan
            | Self::GreaterThanEqual => 3,
            Self::Add | Self::Subtract | Self::BitOr | Self::BitXor => 4,
            Self::Multiply | Self::Divide | Self::Remainder | Self::BitAnd => 5,
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        let symbol = match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Remainder => "%",
            Self::BitAnd => "&",
        };
        write!(formatter, "{symbol}")
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
    BitNot,
}

impl Display for UnaryOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        let symbol = match self {
            Self::Negate => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::BitNot => "^",
        };
        write!(formatter, "{symbol}")
    }
}

/// A literal exactly as written in the source.
#[derive(PartialEq, Clone, Debug)]
pub enum Literal {
    String(String),
    RawString(String),
    Integer(String),
    Float(String),
    Imaginary(String),
    Char(String),
    Boolean(bool),
}

impl Display for Literal {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::String(text)
            | Self::RawString(text)
            | Self::Integer(text)
            | Self::Float(text)
            | Self::Imaginary(text)
            | Self::Char(text) => write!(formatter, "{text}"),
            Self::Boolean(value) => write!(formatter, "{value}"),
        }
    }
}

impl Node {
    /// Leaf left behind when the children of a node are moved out.
    #[inline]
    fn hollow() -> Self {
        Self::Identifier(String::new())
    }

    /// Move the direct children into `into`, leaving leaves behind.
    fn take_children(&mut self, into: &mut Vec<Node>) {
        match self {
            Self::Binary(_, left, right) => {
                into.push(std::mem::replace(left.as_mut(), Self::hollow()));
                into.push(std::mem::replace(right.as_mut(), Self::hollow()));
            }
            Self::Unary(_, operand) => into.push(std::mem::replace(operand.as_mut(), Self::hollow())),
            Self::Call { arguments, .. } => into.append(arguments),
            Self::Literal(_) | Self::Identifier(_) => {}
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_children(&mut pending);
        }
    }
}

enum Rebuild<'a> {
    Enter(&'a Node),
    Binary(BinaryOperator),
    Unary(UnaryOperator),
    Call(&'a str, usize),
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let mut steps = vec![Rebuild::Enter(self)];
        let mut built: Vec<Node> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Rebuild::Enter(Self::Binary(operator, left, right)) => steps.extend([
                    Rebuild::Binary(*operator),
                    Rebuild::Enter(right),
                    Rebuild::Enter(left),
                ]),
                Rebuild::Enter(Self::Unary(operator, operand)) => {
                    steps.extend([Rebuild::Unary(*operator), Rebuild::Enter(operand)])
                }
                Rebuild::Enter(Self::Call { name, arguments }) => {
                    steps.push(Rebuild::Call(name, arguments.len()));
                    steps.extend(arguments.iter().rev().map(Rebuild::Enter));
                }
                Rebuild::Enter(Self::Literal(literal)) => built.push(Self::Literal(literal.clone())),
                Rebuild::Enter(Self::Identifier(name)) => built.push(Self::Identifier(name.clone())),
                Rebuild::Binary(operator) => {
                    let right = built.pop().unwrap_or_else(Self::hollow);
                    let left = built.pop().unwrap_or_else(Self::hollow);
                    built.push(Self::Binary(operator, Box::new(left), Box::new(right)));
                }
                Rebuild::Unary(operator) => {
                    let operand = built.pop().unwrap_or_else(Self::hollow);
                    built.push(Self::Unary(operator, Box::new(operand)));
                }
                Rebuild::Call(name, arity) => {
                    let arguments = built.split_off(built.len().saturating_sub(arity));
                    built.push(Self::Call {
                        name: name.to_string(),
                        arguments,
                    });
                }
            }
        }
        built.pop().unwrap_or_else(Self::hollow)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            match (left, right) {
                (
                    Self::Binary(operator, left_operand, right_operand),
                    Self::Binary(other_operator, other_left, other_right),
                ) if operator == other_operator => {
                    pending.push((left_operand.as_ref(), other_left.as_ref()));
                    pending.push((right_operand.as_ref(), other_right.as_ref()));
                }
                (Self::Unary(operator, operand), Self::Unary(other_operator, other_operand))
                    if operator == other_operator =>
                {
                    pending.push((operand.as_ref(), other_operand.as_ref()));
                }
                (
                    Self::Call { name, arguments },
                    Self::Call {
                        name: other_name,
                        arguments: other_arguments,
                    },
                ) if name == other_name && arguments.len() == other_arguments.len() => {
                    pending.extend(arguments.iter().zip(other_arguments));
                }
                (Self::Literal(literal), Self::Literal(other_literal)) if literal == other_literal => {}
                (Self::Identifier(name), Self::Identifier(other_name)) if name == other_name => {}
                _ => return false,
            }
        }
        true
    }
}

enum Piece<'a> {
    Node(&'a Node),
    Operator(BinaryOperator),
    Text(&'static str),
}

impl Display for Node {
    /// Fully parenthesized rendering which parses back into the same tree.
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        let mut pending = vec![Piece::Node(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => formatter.write_str(text)?,
                Piece::Operator(operator) => write!(formatter, " {operator} ")?,
                Piece::Node(Self::Binary(operator, left, right)) => {
                    formatter.write_str("(")?;
                    pending.extend([
                        Piece::Text(")"),
                        Piece::Node(right),
                        Piece::Operator(*operator),
                        Piece::Node(left),
                    ]);
                }
                Piece::Node(Self::Unary(operator, operand)) => {
                    write!(formatter, "({operator}")?;
                    pending.extend([Piece::Text(")"), Piece::Node(operand)]);
                }
                Piece::Node(Self::Call { name, arguments }) => {
                    write!(formatter, "{name}(")?;
                    pending.push(Piece::Text(")"));
                    for (index, argument) in arguments.iter().enumerate().rev() {
                        pending.push(Piece::Node(argument));
                        if index > 0 {
                            pending.push(Piece::Text(", "));
                        }
                    }
                }
                Piece::Node(Self::Literal(literal)) => write!(formatter, "{literal}")?,
                Piece::Node(Self::Identifier(name)) => formatter.write_str(name)?,
            }
        }
        Ok(())
    }
}
