//! Tree-walking evaluator and builtin functions.

use std::cmp::Ordering;

use datadict_core::{DataDict, DataObj, Value};

use crate::error::{ExprError, Result};
use crate::parser::{BinOp, CmpOp, Expr, UnOp};

/// Where names are resolved.
pub trait Namespace {
    fn resolve(&self, name: &str) -> std::result::Result<Value, datadict_core::Error>;
}

impl Namespace for DataDict {
    /// Names resolve with `get` semantics: prototype fallback and computed
    /// entries both apply.
    fn resolve(&self, name: &str) -> std::result::Result<Value, datadict_core::Error> {
        self.get(name)
    }
}

impl Namespace for DataObj {
    fn resolve(&self, name: &str) -> std::result::Result<Value, datadict_core::Error> {
        self.attr(name)
    }
}

/// Evaluate `expr` against `ns`.
pub fn eval<N: Namespace + ?Sized>(expr: &Expr, ns: &N) -> Result<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Name(name) => Ok(ns.resolve(name)?),
        Expr::List(items) => Ok(Value::Array(
            items
                .iter()
                .map(|e| eval(e, ns))
                .collect::<Result<Vec<_>>>()?,
        )),
        Expr::Unary(op, operand) => unary(*op, eval(operand, ns)?),
        Expr::Binary(left, op, right) => binary(eval(left, ns)?, *op, eval(right, ns)?),
        Expr::Compare(first, rest) => {
            let mut left = eval(first, ns)?;
            for (op, right) in rest {
                let right = eval(right, ns)?;
                if !compare(&left, *op, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
        Expr::And(left, right) => {
            let left = eval(left, ns)?;
            if left.is_truthy() {
                eval(right, ns)
            } else {
                Ok(left)
            }
        }
        Expr::Or(left, right) => {
            let left = eval(left, ns)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                eval(right, ns)
            }
        }
        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|e| eval(e, ns))
                .collect::<Result<Vec<_>>>()?;
            call(name, args)
        }
        Expr::Index(target, index) => subscript(eval(target, ns)?, eval(index, ns)?),
        Expr::Member(target, member) => match eval(target, ns)? {
            Value::Map(mut map) => map
                .remove(member)
                .ok_or_else(|| datadict_core::Error::key_not_found(member.as_str()).into()),
            other => Err(ExprError::eval(format!(
                "'{}' value has no member '{}'",
                other.type_name(),
                member
            ))),
        },
    }
}

/// Numbers as seen by arithmetic: bools count as integers.
enum Num {
    Int(i64),
    Float(f64),
}

fn num(v: &Value) -> Option<Num> {
    match v {
        Value::Bool(b) => Some(Num::Int(*b as i64)),
        Value::Integer(i) => Some(Num::Int(*i)),
        Value::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

fn unsupported(op: &str, left: &Value, right: &Value) -> ExprError {
    ExprError::eval(format!(
        "unsupported operand types for {}: '{}' and '{}'",
        op,
        left.type_name(),
        right.type_name()
    ))
}

fn overflow() -> ExprError {
    ExprError::eval("integer overflow")
}

fn zero_division() -> ExprError {
    ExprError::eval("division by zero")
}

fn unary(op: UnOp, v: Value) -> Result<Value> {
    match (op, num(&v)) {
        (UnOp::Not, _) => Ok(Value::Bool(!v.is_truthy())),
        (UnOp::Neg, Some(Num::Int(i))) => i.checked_neg().map(Value::Integer).ok_or_else(overflow),
        (UnOp::Neg, Some(Num::Float(f))) => Ok(Value::Float(-f)),
        (UnOp::Pos, Some(Num::Int(i))) => Ok(Value::Integer(i)),
        (UnOp::Pos, Some(Num::Float(f))) => Ok(Value::Float(f)),
        (_, None) => Err(ExprError::eval(format!(
            "bad operand type for unary operator: '{}'",
            v.type_name()
        ))),
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::FloorDiv => "//",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
    }
}

fn binary(left: Value, op: BinOp, right: Value) -> Result<Value> {
    match (num(&left), num(&right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => int_arith(a, op, b),
        (Some(a), Some(b)) => {
            let a = match a {
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
            };
            let b = match b {
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
            };
            float_arith(a, op, b)
        }
        _ => sequence_arith(left, op, right),
    }
}

fn int_arith(a: i64, op: BinOp, b: i64) -> Result<Value> {
    let v = match op {
        BinOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinOp::Div => return float_arith(a as f64, op, b as f64),
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(zero_division());
            }
            let q = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                q - 1
            } else {
                q
            }
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(zero_division());
            }
            // MIN % -1 is the only overflowing case, and its remainder is 0
            let r = a.checked_rem(b).unwrap_or(0);
            if r != 0 && ((r < 0) != (b < 0)) {
                r + b
            } else {
                r
            }
        }
        BinOp::Pow => {
            if b < 0 {
                return float_arith(a as f64, op, b as f64);
            }
            let exp = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exp).ok_or_else(overflow)?
        }
    };
    Ok(Value::Integer(v))
}

fn float_arith(a: f64, op: BinOp, b: f64) -> Result<Value> {
    let v = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(zero_division());
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(zero_division());
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(zero_division());
            }
            a - b * (a / b).floor()
        }
        BinOp::Pow => a.powf(b),
    };
    Ok(Value::Float(v))
}

/// Longest string (in bytes) or list a repetition may produce.
const MAX_REPEAT_LEN: usize = 1 << 24;

/// Result length of repeating `len` items `times` times; negative counts
/// give an empty result.
fn repeat_len(len: usize, times: i64) -> Result<usize> {
    let times = usize::try_from(times).unwrap_or(0);
    match len.checked_mul(times) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(times),
        _ => Err(ExprError::eval("repeated sequence is too long")),
    }
}

fn repeat<T: Clone>(items: &[T], times: i64) -> Result<Vec<T>> {
    let times = repeat_len(items.len(), times)?;
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    Ok(out)
}

fn sequence_arith(left: Value, op: BinOp, right: Value) -> Result<Value> {
    match (op, &left, &right) {
        (BinOp::Add, Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (BinOp::Add, Value::Array(a), Value::Array(b)) => {
            let mut out = a.clone();
            out.extend(b.iter().cloned());
            Ok(Value::Array(out))
        }
        (BinOp::Mul, Value::String(s), Value::Integer(n))
        | (BinOp::Mul, Value::Integer(n), Value::String(s)) => {
            Ok(Value::String(s.repeat(repeat_len(s.len(), *n)?)))
        }
        (BinOp::Mul, Value::Array(a), Value::Integer(n))
        | (BinOp::Mul, Value::Integer(n), Value::Array(a)) => Ok(Value::Array(repeat(a, *n)?)),
        _ => Err(unsupported(op_symbol(op), &left, &right)),
    }
}

fn cmp_symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
    }
}

fn equal(left: &Value, right: &Value) -> bool {
    match (num(left), num(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
        (Some(a), Some(b)) => as_float(a) == as_float(b),
        _ => left == right,
    }
}

fn as_float(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (num(left), num(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => Some(a.cmp(&b)),
        (Some(a), Some(b)) => as_float(a).partial_cmp(&as_float(b)),
        _ => match (left, right) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        },
    }
}

fn compare(left: &Value, op: CmpOp, right: &Value) -> Result<bool> {
    match op {
        CmpOp::Eq => return Ok(equal(left, right)),
        CmpOp::Ne => return Ok(!equal(left, right)),
        _ => {}
    }
    let both_comparable = matches!((num(left), num(right)), (Some(_), Some(_)))
        || matches!((left, right), (Value::String(_), Value::String(_)));
    if !both_comparable {
        return Err(ExprError::eval(format!(
            "'{}' not supported between '{}' and '{}'",
            cmp_symbol(op),
            left.type_name(),
            right.type_name()
        )));
    }
    // NaN compares false everywhere
    let Some(ord) = ordering(left, right) else {
        return Ok(false);
    };
    Ok(match op {
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Le => ord != Ordering::Greater,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Ge => ord != Ordering::Less,
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
    })
}

fn normalize_index(index: &Value, len: usize) -> Result<usize> {
    let i = match num(index) {
        Some(Num::Int(i)) => i,
        _ => {
            return Err(ExprError::eval(format!(
                "indices must be integers, not '{}'",
                index.type_name()
            )))
        }
    };
    let len = len as i64;
    let resolved = if i < 0 { i + len } else { i };
    if resolved < 0 || resolved >= len {
        return Err(ExprError::eval("index out of range"));
    }
    Ok(resolved as usize)
}

fn subscript(target: Value, index: Value) -> Result<Value> {
    match target {
        Value::Array(mut items) => {
            let i = normalize_index(&index, items.len())?;
            Ok(items.swap_remove(i))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = normalize_index(&index, chars.len())?;
            Ok(Value::String(chars[i].to_string()))
        }
        Value::Map(mut map) => match index {
            Value::String(key) => map
                .remove(&key)
                .ok_or_else(|| datadict_core::Error::key_not_found(key).into()),
            other => Err(ExprError::eval(format!(
                "map keys are strings, not '{}'",
                other.type_name()
            ))),
        },
        other => Err(ExprError::eval(format!(
            "'{}' value is not subscriptable",
            other.type_name()
        ))),
    }
}

fn arity(name: &str, args: &[Value], expected: &'static str, ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ExprError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        })
    }
}

fn float_arg(name: &str, v: &Value) -> Result<f64> {
    v.as_f64()
        .or_else(|| v.as_bool().map(|b| b as i64 as f64))
        .ok_or_else(|| {
            ExprError::eval(format!(
                "{}() needs a number, not '{}'",
                name,
                v.type_name()
            ))
        })
}

fn math(name: &str, args: &[Value], f: fn(f64) -> f64, domain: fn(f64) -> bool) -> Result<Value> {
    arity(name, args, "1", args.len() == 1)?;
    let x = float_arg(name, &args[0])?;
    if !domain(x) {
        return Err(ExprError::eval("math domain error"));
    }
    Ok(Value::Float(f(x)))
}

fn extreme(name: &str, args: Vec<Value>, want: Ordering) -> Result<Value> {
    let items = match args.len() {
        0 => return Err(ExprError::Arity {
            name: name.to_string(),
            expected: "at least 1",
            got: 0,
        }),
        1 => match args.into_iter().next() {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => Vec::new(),
        },
        _ => args,
    };
    let mut iter = items.into_iter();
    let mut best = iter
        .next()
        .ok_or_else(|| ExprError::eval(format!("{}() arg is an empty sequence", name)))?;
    for item in iter {
        let ord = ordering(&item, &best).ok_or_else(|| {
            ExprError::eval(format!(
                "{}() cannot compare '{}' and '{}'",
                name,
                item.type_name(),
                best.type_name()
            ))
        })?;
        if ord == want {
            best = item;
        }
    }
    Ok(best)
}

/// An integral float as an integer, if it fits.
fn float_to_int(x: f64) -> Result<Value> {
    // 2^63; the i64 range is [-2^63, 2^63)
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if x.is_finite() && (-LIMIT..LIMIT).contains(&x) {
        Ok(Value::Integer(x as i64))
    } else {
        Err(ExprError::eval("cannot convert float to integer"))
    }
}

fn round(args: &[Value]) -> Result<Value> {
    arity("round", args, "1 or 2", matches!(args.len(), 1 | 2))?;
    let digits = match args.get(1) {
        None | Some(Value::Null) => None,
        Some(Value::Integer(n)) => Some(*n),
        Some(other) => {
            return Err(ExprError::eval(format!(
                "round() digits must be an integer, not '{}'",
                other.type_name()
            )))
        }
    };
    match (&args[0], digits) {
        (Value::Integer(i), _) => Ok(Value::Integer(*i)),
        (v, None) => {
            float_to_int(float_arg("round", v)?.round_ties_even())
        }
        (v, Some(n)) => {
            let x = float_arg("round", v)?;
            let scale = 10f64.powi(i32::try_from(n).unwrap_or(i32::MAX));
            Ok(Value::Float((x * scale).round_ties_even() / scale))
        }
    }
}

fn int(args: &[Value]) -> Result<Value> {
    arity("int", args, "1", args.len() == 1)?;
    match &args[0] {
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Bool(b) => Ok(Value::Integer(*b as i64)),
        Value::Float(f) => float_to_int(f.trunc()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| ExprError::eval(format!("invalid literal for int(): '{}'", s))),
        other => Err(ExprError::eval(format!(
            "int() argument must be a number or string, not '{}'",
            other.type_name()
        ))),
    }
}

fn float(args: &[Value]) -> Result<Value> {
    arity("float", args, "1", args.len() == 1)?;
    match &args[0] {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ExprError::eval(format!("could not convert string to float: '{}'", s))),
        other => Ok(Value::Float(float_arg("float", other)?)),
    }
}

fn call(name: &str, args: Vec<Value>) -> Result<Value> {
    log::trace!("call {}() with {} argument(s)", name, args.len());
    match name {
        "abs" => {
            arity(name, &args, "1", args.len() == 1)?;
            match num(&args[0]) {
                Some(Num::Int(i)) => i.checked_abs().map(Value::Integer).ok_or_else(overflow),
                Some(Num::Float(f)) => Ok(Value::Float(f.abs())),
                None => Err(ExprError::eval(format!(
                    "bad operand type for abs(): '{}'",
                    args[0].type_name()
                ))),
            }
        }
        "min" => extreme(name, args, Ordering::Less),
        "max" => extreme(name, args, Ordering::Greater),
        "len" => {
            arity(name, &args, "1", args.len() == 1)?;
            match &args[0] {
                Value::String(s) => Ok(Value::from(s.chars().count())),
                Value::Array(a) => Ok(Value::from(a.len())),
                Value::Map(m) => Ok(Value::from(m.len())),
                Value::Object(o) => match o.array_meta() {
                    Some(meta) => Ok(Value::from(meta.shape.first().copied().unwrap_or(0))),
                    None => Err(ExprError::eval("object has no len()")),
                },
                other => Err(ExprError::eval(format!(
                    "object of type '{}' has no len()",
                    other.type_name()
                ))),
            }
        }
        "round" => round(&args),
        "int" => int(&args),
        "float" => float(&args),
        "str" => {
            arity(name, &args, "1", args.len() == 1)?;
            Ok(Value::String(args[0].to_string()))
        }
        "sqrt" => math(name, &args, f64::sqrt, |x| x >= 0.0),
        "exp" => math(name, &args, f64::exp, |_| true),
        "log" => {
            arity(name, &args, "1 or 2", matches!(args.len(), 1 | 2))?;
            let x = float_arg(name, &args[0])?;
            if x <= 0.0 {
                return Err(ExprError::eval("math domain error"));
            }
            match args.get(1) {
                None => Ok(Value::Float(x.ln())),
                Some(base) => {
                    let base = float_arg(name, base)?;
                    if base <= 0.0 || base == 1.0 {
                        return Err(ExprError::eval("math domain error"));
                    }
                    Ok(Value::Float(x.ln() / base.ln()))
                }
            }
        }
        "sin" => math(name, &args, f64::sin, f64::is_finite),
        "cos" => math(name, &args, f64::cos, f64::is_finite),
        "tan" => math(name, &args, f64::tan, f64::is_finite),
        _ => Err(ExprError::UnknownFunction {
            name: name.to_string(),
        }),
    }
}
