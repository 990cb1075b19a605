use crate::{
    element::{Element, Program},
    error::{BoxError, CallSite, EvaluationError},
    registry::FunctionRegistry,
    value::Value,
};
use tracing::{debug, trace};

/// The caller supplied capability a [`Program`] is evaluated against.
///
/// The three hooks turn a literal left as an operand of `&&`/`||` (or as the whole expression)
/// into a verdict, e.g. "does the current line contain this string?". Named functions are
/// registered separately in a [`FunctionRegistry`].
///
/// An evaluator usually carries the state of a single evaluation (the line being matched), so
/// the same instance must not be shared between concurrent evaluations; build one per thread
/// instead.
pub trait Evaluator {
    fn eval_string(&mut self, value: &str) -> Result<bool, BoxError>;

    fn eval_int(&mut self, value: i64) -> Result<bool, BoxError>;

    fn eval_float(&mut self, value: f64) -> Result<bool, BoxError>;
}

/// Run `program` on a value stack and return the verdict left on it.
///
/// Both operands of `&&` and `||` are always resolved, left first: there is no short-circuit,
/// so functions with side effects always run.
pub fn evaluate<E: Evaluator>(
    program: &Program,
    functions: &FunctionRegistry<E>,
    evaluator: &mut E,
) -> Result<bool, EvaluationError> {
    let mut stack: Vec<Value> = Vec::with_capacity(program.len());
    for (position, element) in program.iter().enumerate() {
        trace!(position, %element, depth = stack.len(), "executing");
        require(&stack, element, position)?;
        match element {
            Element::LitString(value) => stack.push(Value::String(value.clone())),
            Element::LitInt(value) => stack.push(Value::Integer(*value)),
            Element::LitFloat(value) => stack.push(Value::Float(*value)),
            Element::LitBool(value) => stack.push(Value::Boolean(*value)),
            Element::And | Element::Or => {
                let available = stack.len();
                let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                    return Err(underflow(element, position, available));
                };
                let a = resolve(a, evaluator)?;
                let b = resolve(b, evaluator)?;
                let result = match element {
                    Element::And => a && b,
                    _ => a || b,
                };
                stack.push(Value::Boolean(result));
            }
            Element::Neg => {
                let Some(value) = stack.pop() else {
                    return Err(underflow(element, position, 0));
                };
                stack.push(negate(value)?);
            }
            Element::Call { name, arity } => {
                let arguments = stack.split_off(stack.len() - arity);
                let function = functions
                    .get(name)
                    .ok_or_else(|| EvaluationError::FunctionNotFound(name.clone()))?;
                let value = function.call(name, evaluator, arguments)?;
                stack.push(value);
            }
        }
    }

    let remaining = stack.len();
    match stack.pop() {
        Some(value) if remaining == 1 => {
            let result = resolve(value, evaluator)?;
            debug!(result, elements = program.len(), "evaluated");
            Ok(result)
        }
        _ => Err(EvaluationError::StackCorrupt { remaining }),
    }
}

#[inline]
fn require(stack: &[Value], element: &Element, position: usize) -> Result<(), EvaluationError> {
    if stack.len() < element.arity() {
        return Err(underflow(element, position, stack.len()));
    }
    Ok(())
}

fn underflow(element: &Element, position: usize, available: usize) -> EvaluationError {
    EvaluationError::StackUnderflow {
        element: element.clone(),
        position,
        required: element.arity(),
        available,
    }
}

fn negate(value: Value) -> Result<Value, EvaluationError> {
    match value {
        Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
        Value::Float(value) => Ok(Value::Float(-value)),
        other => Err(EvaluationError::NotNumeric(other.kind())),
    }
}

/// Turn a stack value into a verdict, asking the evaluator for anything but a boolean.
fn resolve<E: Evaluator>(value: Value, evaluator: &mut E) -> Result<bool, EvaluationError> {
    let (hook, result) = match &value {
        Value::Boolean(value) => return Ok(*value),
        Value::String(text) => ("eval_string", evaluator.eval_string(text)),
        Value::Integer(number) => ("eval_int", evaluator.eval_int(*number)),
        Value::Float(number) => ("eval_float", evaluator.eval_float(*number)),
    };
    result.map_err(|source| EvaluationError::Evaluator {
        site: CallSite::Hook {
            hook,
            operand: value.to_string(),
        },
        source,
    })
}
