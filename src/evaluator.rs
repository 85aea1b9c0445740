use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    ast::{AccessorKey, BinOp, Expr, UnaryOp},
    builtins,
    context::{EvalContext, Lookup},
    number,
    value::{ObjectMap, Value},
};

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The host resolver failed for an identifier
    #[error("failed to resolve identifier '{name}': {message}")]
    Resolver { name: String, message: String },

    /// Property access on a value that has no properties
    #[error("access error: {message}")]
    Access { message: String },

    /// A host or built-in function returned an error
    #[error("function '{name}' failed: {message}")]
    Function { name: String, message: String },

    /// Synchronous evaluation reached an asynchronous resolver that did not
    /// complete immediately
    #[error("identifier '{name}' is resolved asynchronously; use evaluate_async")]
    Suspended { name: String },
}

type EvalFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, EvalError>> + Send + 'a>>;

/// Tree-walking evaluator.
///
/// There is a single walker; it only ever suspends while awaiting an
/// asynchronous identifier resolver. [`Evaluator::evaluate`] drives it
/// without an executor, which completes as long as no resolver is pending.
pub struct Evaluator<'c> {
    context: &'c mut EvalContext,
    suspended_on: Option<String>,
}

impl<'c> Evaluator<'c> {
    pub fn new(context: &'c mut EvalContext) -> Self {
        Evaluator {
            context,
            suspended_on: None,
        }
    }

    /// Evaluate without an async runtime.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        let mut cx = Context::from_waker(Waker::noop());
        let poll = self.eval(expr).as_mut().poll(&mut cx);

        match poll {
            Poll::Ready(result) => result,
            Poll::Pending => {
                let name = self.suspended_on.take().unwrap_or_default();
                warn!(identifier = %name, "asynchronous resolver pending during synchronous evaluation");
                Err(EvalError::Suspended { name })
            }
        }
    }

    pub async fn evaluate_async(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.eval(expr).await
    }

    fn eval<'a>(&'a mut self, expr: &'a Expr) -> EvalFuture<'a> {
        Box::pin(async move {
            match expr {
                Expr::Literal(value) => Ok(value.clone()),
                Expr::Array(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(self.eval(item).await?);
                    }
                    Ok(Value::Array(values))
                }
                Expr::Object(entries) => {
                    let mut map = ObjectMap::new();
                    for (key, expr) in entries {
                        let value = self.eval(expr).await?;
                        map.insert(key.clone(), value);
                    }
                    Ok(Value::Object(map))
                }
                Expr::Identifier(name) => self.resolve(name).await,
                Expr::Unary { ops, operand } => {
                    let value = self.eval(operand).await?;
                    Ok(ops.iter().rev().fold(value, |acc, op| apply_unary(*op, &acc)))
                }
                Expr::Binary { head, tail } => {
                    let mut acc = self.eval(head).await?;
                    for (op, rhs) in tail {
                        acc = if op.short_circuits() {
                            // a truthy left decides `||`, a falsy one decides `&&`
                            if acc.is_truthy() == matches!(op, BinOp::Or) {
                                acc
                            } else {
                                self.eval(rhs).await?
                            }
                        } else {
                            let right = self.eval(rhs).await?;
                            apply_binary(*op, &acc, &right)
                        };
                    }
                    Ok(acc)
                }
                Expr::Conditional {
                    test,
                    when_true,
                    when_false,
                } => {
                    let test_value = self.eval(test).await?;
                    if !test_value.is_truthy() {
                        return self.eval(when_false).await;
                    }
                    match when_true {
                        Some(branch) => self.eval(branch).await,
                        None => Ok(test_value),
                    }
                }
                Expr::Accessor { base, keys } => {
                    let mut current = self.eval(base).await?;
                    for key in keys {
                        let key = match key {
                            AccessorKey::Literal(name) => Value::String(name.clone()),
                            AccessorKey::Computed(expr) => self.eval(expr).await?,
                        };
                        current = access(&current, &key)?;
                    }
                    Ok(current)
                }
                Expr::Call { name, args } => {
                    let Some(function) = self.context.function(name) else {
                        debug!(function = %name, "unknown function evaluates to null");
                        return Ok(Value::Null);
                    };
                    let mut values = Vec::with_capacity(args.len());
                    for arg in args {
                        values.push(self.eval(arg).await?);
                    }
                    function(&values).map_err(|message| EvalError::Function {
                        name: name.clone(),
                        message,
                    })
                }
                Expr::UnionType(members) => {
                    let mut records = Vec::with_capacity(members.len());
                    for member in members {
                        records.push(self.eval(member).await?);
                    }
                    Ok(Value::Array(records))
                }
                Expr::SingleType {
                    name,
                    config,
                    fullname,
                    template,
                } => {
                    let config = match config {
                        Some(config) => self.eval(config).await?,
                        None => Value::Object(ObjectMap::new()),
                    };
                    let mut arguments = Vec::with_capacity(template.len());
                    for argument in template {
                        arguments.push(self.eval(argument).await?);
                    }

                    let mut record = ObjectMap::new();
                    record.insert("name".to_string(), Value::from(name.as_str()));
                    record.insert("config".to_string(), config);
                    record.insert("fullname".to_string(), Value::from(fullname.as_str()));
                    record.insert("template".to_string(), Value::Array(arguments));
                    Ok(Value::Object(record))
                }
            }
        })
    }

    async fn resolve(&mut self, name: &str) -> Result<Value, EvalError> {
        let failed = |e: crate::context::ResolveError| {
            debug!(identifier = %name, error = %e, "identifier resolver failed");
            EvalError::Resolver {
                name: name.to_string(),
                message: e.0,
            }
        };

        match self.context.lookup(name) {
            Lookup::Bound(value) => Ok(value),
            Lookup::Sync(resolver) => {
                debug!(identifier = %name, "resolving identifier");
                resolver.resolve(name).map_err(failed)
            }
            Lookup::Async(resolver) => {
                debug!(identifier = %name, "resolving identifier asynchronously");
                self.suspended_on = Some(name.to_string());
                let result = resolver.resolve(name).await;
                self.suspended_on = None;
                result.map_err(failed)
            }
        }
    }
}

pub fn apply_unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::BitNot => Value::Number(!number::to_int32(value.as_number()) as f64),
        UnaryOp::Not => Value::Boolean(!value.is_truthy()),
        UnaryOp::Plus => Value::Number(value.as_number()),
        UnaryOp::Minus => Value::Number(-value.as_number()),
    }
}

fn concatenates(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Array(_) | Value::Object(_))
}

/// Applies a binary operator to two evaluated operands.
///
/// `&&` and `||` return the deciding operand; the evaluator never calls
/// this for them when the right side can be skipped.
pub fn apply_binary(op: BinOp, left: &Value, right: &Value) -> Value {
    let int32 = |v: &Value| number::to_int32(v.as_number());
    let shift = |v: &Value| number::to_uint32(v.as_number()) & 31;

    match op {
        BinOp::Or => {
            if left.is_truthy() { left.clone() } else { right.clone() }
        }
        BinOp::And => {
            if left.is_truthy() { right.clone() } else { left.clone() }
        }
        BinOp::Add if concatenates(left) || concatenates(right) => {
            Value::String(format!("{}{}", left.as_string(), right.as_string()))
        }
        BinOp::Add => Value::Number(left.as_number() + right.as_number()),
        BinOp::Subtract => Value::Number(left.as_number() - right.as_number()),
        BinOp::Multiply => Value::Number(left.as_number() * right.as_number()),
        BinOp::Divide => Value::Number(left.as_number() / right.as_number()),
        BinOp::Modulo => Value::Number(left.as_number() % right.as_number()),
        BinOp::Power => Value::Number(builtins::pow(left.as_number(), right.as_number())),
        BinOp::BitAnd => Value::Number((int32(left) & int32(right)) as f64),
        BinOp::BitOr => Value::Number((int32(left) | int32(right)) as f64),
        BinOp::BitXor => Value::Number((int32(left) ^ int32(right)) as f64),
        BinOp::ShiftLeft => Value::Number(int32(left).wrapping_shl(shift(right)) as f64),
        BinOp::ShiftRight => Value::Number(int32(left).wrapping_shr(shift(right)) as f64),
        BinOp::UnsignedShiftRight => Value::Number(
            number::to_uint32(left.as_number()).wrapping_shr(shift(right)) as f64,
        ),
        BinOp::Equal => Value::Boolean(left.loose_eq(right)),
        BinOp::NotEqual => Value::Boolean(!left.loose_eq(right)),
        BinOp::StrictEqual => Value::Boolean(left.strict_eq(right)),
        BinOp::StrictNotEqual => Value::Boolean(!left.strict_eq(right)),
        BinOp::LessThan => Value::Boolean(left.compare(right).is_some_and(|o| o.is_lt())),
        BinOp::LessEqual => Value::Boolean(left.compare(right).is_some_and(|o| o.is_le())),
        BinOp::GreaterThan => Value::Boolean(left.compare(right).is_some_and(|o| o.is_gt())),
        BinOp::GreaterEqual => Value::Boolean(left.compare(right).is_some_and(|o| o.is_ge())),
    }
}

/// Array index denoted by a key, if it is a canonical non-negative integer.
fn index_of(key: &Value) -> Option<usize> {
    let n = match key {
        Value::Number(n) => *n,
        Value::String(s) => {
            let n = number::str_to_number(s);
            if number::format_number(n) != *s {
                return None;
            }
            n
        }
        _ => return None,
    };
    (n >= 0.0 && n.trunc() == n).then_some(n as usize)
}

/// One accessor step. Missing properties are `null`; reading from `null`
/// is an error.
pub fn access(target: &Value, key: &Value) -> Result<Value, EvalError> {
    let value = match target {
        Value::Null => {
            return Err(EvalError::Access {
                message: format!("cannot read property '{}' of null", key.as_string()),
            });
        }
        Value::Array(items) => match key.as_str() {
            Some("length") => Value::from(items.len()),
            _ => index_of(key)
                .and_then(|i| items.get(i).cloned())
                .unwrap_or_default(),
        },
        Value::String(s) => match key.as_str() {
            Some("length") => Value::from(s.chars().count()),
            _ => index_of(key)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::String(c.to_string()))
                .unwrap_or_default(),
        },
        Value::Object(map) => map.get(&key.as_string()).cloned().unwrap_or_default(),
        Value::Boolean(_) | Value::Number(_) => Value::Null,
    };
    Ok(value)
}
