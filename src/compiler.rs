use crate::{
    ast::{BinaryOperator, Literal, Node, UnaryOperator},
    element::{Element, Program},
    error::CompileError,
    limits::Limits,
};
use tracing::debug;

/// Compile a parsed expression into a postfix [`Program`] without any limit.
#[inline]
pub fn compile(root: &Node) -> Result<Program, CompileError> {
    compile_with_limits(root, &Limits::default())
}

/// Compile a parsed expression into a postfix [`Program`].
///
/// Children are emitted before their parent, arguments from left to right. A node is checked
/// when it is left, so the first offending node in post-order is the one reported.
pub fn compile_with_limits(root: &Node, limits: &Limits) -> Result<Program, CompileError> {
    let mut compiler = Compiler {
        program: Program::default(),
        max_length: limits.max_program_length(),
    };
    compiler.visit(root)?;
    debug!(elements = compiler.program.len(), program = %compiler.program, "compiled");
    Ok(compiler.program)
}

struct Compiler {
    program: Program,
    max_length: Option<usize>,
}

/// Pending work of the post-order traversal.
enum Step<'a> {
    Visit(&'a Node),
    Binary(BinaryOperator),
    Unary(UnaryOperator),
    Call(&'a str, usize),
}

impl Compiler {
    /// Post-order traversal driven by an explicit stack, so that long `&&`/`||` chains do not
    /// grow the call stack.
    fn visit(&mut self, root: &Node) -> Result<(), CompileError> {
        let mut steps = vec![Step::Visit(root)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(Node::Binary(operator, left, right)) => {
                    steps.extend([Step::Binary(*operator), Step::Visit(right), Step::Visit(left)]);
                }
                Step::Visit(Node::Unary(operator, operand)) => {
                    steps.extend([Step::Unary(*operator), Step::Visit(operand)]);
                }
                Step::Visit(Node::Call { name, arguments }) => {
                    steps.push(Step::Call(name, arguments.len()));
                    steps.extend(arguments.iter().rev().map(Step::Visit));
                }
                Step::Visit(Node::Literal(literal)) => {
                    let element = literal_element(literal)?;
                    self.emit(element)?;
                }
                Step::Visit(Node::Identifier(name)) => {
                    return Err(CompileError::UnsupportedConstruct(format!(
                        "identifier {name}"
                    )))
                }
                Step::Binary(BinaryOperator::And) => self.emit(Element::And)?,
                Step::Binary(BinaryOperator::Or) => self.emit(Element::Or)?,
                Step::Binary(other) => {
                    return Err(CompileError::UnsupportedConstruct(format!(
                        "binary operator {other}"
                    )))
                }
                Step::Unary(UnaryOperator::Negate) => self.emit(Element::Neg)?,
                Step::Unary(other) => {
                    return Err(CompileError::UnsupportedConstruct(format!(
                        "unary operator {other}"
                    )))
                }
                Step::Call(name, arity) => self.emit(Element::Call {
                    name: name.to_string(),
                    arity,
                })?,
            }
        }
        Ok(())
    }

    fn emit(&mut self, element: Element) -> Result<(), CompileError> {
        if let Some(limit) = self.max_length {
            if self.program.len() >= limit {
                return Err(CompileError::ProgramTooLong { limit });
            }
        }
        self.program.push(element);
        Ok(())
    }
}

fn literal_element(literal: &Literal) -> Result<Element, CompileError> {
    match literal {
        Literal::String(text) => unquote(text)
            .map(Element::LitString)
            .map_err(|reason| malformed("string", text, reason)),
        Literal::RawString(text) => {
            let inner = text
                .strip_prefix('`')
                .and_then(|rest| rest.strip_suffix('`'))
                .ok_or_else(|| malformed("raw string", text, "missing back-quotes".to_string()))?;
            Ok(Element::LitString(inner.replace('\r', "")))
        }
        Literal::Integer(text) => text
            .parse::<i64>()
            .map(Element::LitInt)
            .map_err(|error| malformed("integer", text, error.to_string())),
        Literal::Float(text) => text
            .parse::<f64>()
            .map(Element::LitFloat)
            .map_err(|error| malformed("float", text, error.to_string())),
        Literal::Imaginary(text) => Err(CompileError::UnsupportedLiteral {
            kind: "imaginary",
            text: text.clone(),
        }),
        Literal::Char(text) => Err(CompileError::UnsupportedLiteral {
            kind: "char",
            text: text.clone(),
        }),
        Literal::Boolean(value) => Ok(Element::LitBool(*value)),
    }
}

#[inline]
fn malformed(kind: &'static str, text: &str, reason: String) -> CompileError {
    CompileError::MalformedLiteral {
        kind,
        text: text.to_string(),
        reason,
    }
}

/// Strip the double quotes of a string literal and resolve its escape sequences.
fn unquote(text: &str) -> Result<String, String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| "missing double quotes".to_string())?;

    let mut value = String::with_capacity(inner.len());
    let mut characters = inner.chars();
    while let Some(character) = characters.next() {
        if character != '\\' {
            value.push(character);
            continue;
        }

        let escaped = characters
            .next()
            .ok_or_else(|| "unterminated escape sequence".to_string())?;
        let resolved = match escaped {
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            'x' => hexadecimal(&mut characters, 2)?,
            'u' => hexadecimal(&mut characters, 4)?,
            'U' => hexadecimal(&mut characters, 8)?,
            other => return Err(format!("unknown escape sequence \\{other}")),
        };
        value.push(resolved);
    }
    Ok(value)
}

fn hexadecimal(characters: &mut std::str::Chars, digits: usize) -> Result<char, String> {
    let code: String = characters.by_ref().take(digits).collect();
    if code.len() != digits {
        return Err(format!("escape sequence needs {digits} hexadecimal digits"));
    }
    u32::from_str_radix(&code, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid escape sequence {code}"))
}
