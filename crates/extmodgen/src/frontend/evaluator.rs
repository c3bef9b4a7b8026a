//! Constant folding for module and class level bindings
//!
//! Only the value kinds a generated module can embed are produced. Anything
//! else is reported back so the caller can decide whether to skip the binding
//! or reject it.

use ruff_python_ast::{self as ast, Expr, Number, Operator, UnaryOp};

use crate::{literal::LiteralValue, types::FxIndexMap};

/// Names bound to constants in one scope
pub(crate) type Bindings = FxIndexMap<String, LiteralValue>;

/// Longest string a repetition may fold into
const MAX_FOLDED_STR_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EvalError {
    /// The expression is not a constant; the binding is silently dropped.
    Skip(&'static str),
    /// The value can never be embedded, wherever it appears.
    Reject(&'static str),
}

impl EvalError {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Skip(kind) | Self::Reject(kind) => kind,
        }
    }

    /// Inside a tuple every failure is fatal.
    fn nested(self) -> Self {
        Self::Reject(self.kind())
    }
}

type Evaluated = Result<LiteralValue, EvalError>;

/// Evaluate `expr`, resolving names through `scopes` innermost first.
pub(crate) fn evaluate(expr: &Expr, scopes: &[&Bindings]) -> Evaluated {
    match expr {
        Expr::NoneLiteral(_) => Ok(LiteralValue::None),
        Expr::BooleanLiteral(ast::ExprBooleanLiteral { value, .. }) => {
            Ok(LiteralValue::Bool(*value))
        }
        Expr::NumberLiteral(ast::ExprNumberLiteral { value, .. }) => match value {
            Number::Int(int) => int
                .as_i64()
                .map(LiteralValue::Int)
                .ok_or(EvalError::Reject("int")),
            Number::Float(value) => Ok(LiteralValue::Float(*value)),
            Number::Complex { .. } => Err(EvalError::Skip("complex")),
        },
        Expr::StringLiteral(ast::ExprStringLiteral { value, .. }) => {
            Ok(LiteralValue::Str(value.to_str().to_owned()))
        }
        Expr::Tuple(ast::ExprTuple { elts, .. }) => elts
            .iter()
            .map(|elt| evaluate(elt, scopes).map_err(EvalError::nested))
            .collect::<Result<Vec<_>, _>>()
            .map(LiteralValue::Tuple),
        Expr::Name(ast::ExprName { id, .. }) => scopes
            .iter()
            .find_map(|scope| scope.get(id.as_str()))
            .cloned()
            .ok_or(EvalError::Skip("name")),
        Expr::UnaryOp(ast::ExprUnaryOp { op, operand, .. }) => {
            unary(*op, evaluate(operand, scopes)?)
        }
        Expr::BinOp(ast::ExprBinOp {
            left, op, right, ..
        }) => binary(*op, evaluate(left, scopes)?, evaluate(right, scopes)?),
        other => Err(EvalError::Skip(expr_kind(other))),
    }
}

/// Python type name of an expression that is not folded
fn expr_kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::List(_) | Expr::ListComp(_) => "list",
        Expr::Dict(_) | Expr::DictComp(_) => "dict",
        Expr::Set(_) | Expr::SetComp(_) => "set",
        Expr::BytesLiteral(_) => "bytes",
        Expr::FString(_) => "f-string",
        Expr::Lambda(_) => "function",
        Expr::Call(_) => "call",
        Expr::EllipsisLiteral(_) => "ellipsis",
        _ => "expression",
    }
}

fn truthy(value: &LiteralValue) -> bool {
    match value {
        LiteralValue::None => false,
        LiteralValue::Bool(value) => *value,
        LiteralValue::Int(value) => *value != 0,
        LiteralValue::Float(value) => *value != 0.0,
        LiteralValue::Str(value) => !value.is_empty(),
        LiteralValue::Tuple(items) => !items.is_empty(),
    }
}

/// Numeric view of a value; `bool` behaves as `int`
enum Num {
    Int(i64),
    Float(f64),
}

fn as_num(value: &LiteralValue) -> Option<Num> {
    match value {
        LiteralValue::Bool(value) => Some(Num::Int(i64::from(*value))),
        LiteralValue::Int(value) => Some(Num::Int(*value)),
        LiteralValue::Float(value) => Some(Num::Float(*value)),
        _ => None,
    }
}

fn unary(op: UnaryOp, operand: LiteralValue) -> Evaluated {
    if op == UnaryOp::Not {
        return Ok(LiteralValue::Bool(!truthy(&operand)));
    }
    let num = as_num(&operand).ok_or(EvalError::Skip("expression"))?;
    match (op, num) {
        (UnaryOp::USub, Num::Int(value)) => value
            .checked_neg()
            .map(LiteralValue::Int)
            .ok_or(EvalError::Reject("int")),
        (UnaryOp::USub, Num::Float(value)) => Ok(LiteralValue::Float(-value)),
        (UnaryOp::UAdd, Num::Int(value)) => Ok(LiteralValue::Int(value)),
        (UnaryOp::UAdd, Num::Float(value)) => Ok(LiteralValue::Float(value)),
        (UnaryOp::Invert, Num::Int(value)) => Ok(LiteralValue::Int(!value)),
        _ => Err(EvalError::Skip("expression")),
    }
}

fn binary(op: Operator, left: LiteralValue, right: LiteralValue) -> Evaluated {
    match (op, &left, &right) {
        (Operator::Add, LiteralValue::Str(a), LiteralValue::Str(b)) => {
            Ok(LiteralValue::Str(format!("{a}{b}")))
        }
        (Operator::Add, LiteralValue::Tuple(a), LiteralValue::Tuple(b)) => {
            Ok(LiteralValue::Tuple(a.iter().chain(b).cloned().collect()))
        }
        (Operator::Mult, LiteralValue::Str(s), count) | (Operator::Mult, count, LiteralValue::Str(s)) => {
            match as_num(count) {
                Some(Num::Int(n)) => {
                    let times = usize::try_from(n).unwrap_or_default();
                    match s.len().checked_mul(times) {
                        Some(len) if len <= MAX_FOLDED_STR_LEN => {
                            Ok(LiteralValue::Str(s.repeat(times)))
                        }
                        _ => Err(EvalError::Skip("expression")),
                    }
                }
                _ => Err(EvalError::Skip("expression")),
            }
        }
        _ => match (as_num(&left), as_num(&right)) {
            (Some(a), Some(b)) => arithmetic(op, a, b),
            _ => Err(EvalError::Skip("expression")),
        },
    }
}

fn arithmetic(op: Operator, left: Num, right: Num) -> Evaluated {
    if let (Num::Int(a), Num::Int(b)) = (&left, &right) {
        let result = match op {
            Operator::Add => a.checked_add(*b),
            Operator::Sub => a.checked_sub(*b),
            Operator::Mult => a.checked_mul(*b),
            _ => return Err(EvalError::Skip("expression")),
        };
        return result.map(LiteralValue::Int).ok_or(EvalError::Reject("int"));
    }
    let as_float = |num: Num| match num {
        Num::Int(value) => value as f64,
        Num::Float(value) => value,
    };
    let (a, b) = (as_float(left), as_float(right));
    match op {
        Operator::Add => Ok(LiteralValue::Float(a + b)),
        Operator::Sub => Ok(LiteralValue::Float(a - b)),
        Operator::Mult => Ok(LiteralValue::Float(a * b)),
        _ => Err(EvalError::Skip("expression")),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ruff_python_parser::parse_expression;

    use super::*;

    fn eval_in(source: &str, scopes: &[&Bindings]) -> Evaluated {
        let parsed = parse_expression(source).expect("Failed to parse");
        evaluate(&parsed.into_expr(), scopes)
    }

    fn eval(source: &str) -> Evaluated {
        eval_in(source, &[])
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("None"), Ok(LiteralValue::None));
        assert_eq!(eval("True"), Ok(LiteralValue::Bool(true)));
        assert_eq!(eval("42"), Ok(LiteralValue::Int(42)));
        assert_eq!(eval("2.5"), Ok(LiteralValue::Float(2.5)));
        assert_eq!(eval("'a' 'b'"), Ok(LiteralValue::Str("ab".to_owned())));
    }

    #[test]
    fn test_arithmetic_folding() {
        assert_eq!(eval("-3"), Ok(LiteralValue::Int(-3)));
        assert_eq!(eval("1 + 2 * 3"), Ok(LiteralValue::Int(7)));
        assert_eq!(eval("1 + 0.5"), Ok(LiteralValue::Float(1.5)));
        assert_eq!(eval("True + 1"), Ok(LiteralValue::Int(2)));
        assert_eq!(eval("not ()"), Ok(LiteralValue::Bool(true)));
        assert_eq!(eval("~0"), Ok(LiteralValue::Int(-1)));
        assert_eq!(
            eval("'ab' + 'c' * 2"),
            Ok(LiteralValue::Str("abcc".to_owned()))
        );
    }

    #[test]
    fn test_tuples_nest() {
        assert_eq!(
            eval("(1, (2, 'x')) + (None,)"),
            Ok(LiteralValue::Tuple(vec![
                LiteralValue::Int(1),
                LiteralValue::Tuple(vec![LiteralValue::Int(2), LiteralValue::Str("x".into())]),
                LiteralValue::None,
            ]))
        );
    }

    #[test]
    fn test_names_resolve_innermost_first() {
        let mut module = Bindings::default();
        module.insert("A".to_owned(), LiteralValue::Int(1));
        module.insert("B".to_owned(), LiteralValue::Int(2));
        let mut class = Bindings::default();
        class.insert("A".to_owned(), LiteralValue::Int(10));
        assert_eq!(
            eval_in("A + B", &[&class, &module]),
            Ok(LiteralValue::Int(12))
        );
        assert_eq!(eval_in("C", &[&class, &module]), Err(EvalError::Skip("name")));
    }

    #[test]
    fn test_unsupported_kinds() {
        assert_eq!(eval("[1, 2]"), Err(EvalError::Skip("list")));
        assert_eq!(eval("{'a': 1}"), Err(EvalError::Skip("dict")));
        assert_eq!(eval("b'raw'"), Err(EvalError::Skip("bytes")));
        assert_eq!(eval("len('x')"), Err(EvalError::Skip("call")));
        assert_eq!(eval("3 / 2"), Err(EvalError::Skip("expression")));
    }

    #[test]
    fn test_unsupported_kind_inside_tuple_is_rejected() {
        assert_eq!(eval("(1, [2])"), Err(EvalError::Reject("list")));
        assert_eq!(eval("((1, {2}),)"), Err(EvalError::Reject("set")));
    }

    #[test]
    fn test_out_of_range_integers_are_rejected() {
        assert_eq!(eval("2 ** 70"), Err(EvalError::Skip("expression")));
        assert_eq!(eval("123456789012345678901234567890"), Err(EvalError::Reject("int")));
        assert_eq!(
            eval("9223372036854775807 + 1"),
            Err(EvalError::Reject("int"))
        );
    }

    #[test]
    fn test_string_repetition_is_bounded() {
        assert_eq!(eval("'-' * 3"), Ok(LiteralValue::Str("---".to_owned())));
        assert_eq!(eval("'ab' * -1"), Ok(LiteralValue::Str(String::new())));
        assert_eq!(
            eval("'ab' * 9223372036854775807"),
            Err(EvalError::Skip("expression"))
        );
        assert_eq!(eval("'x' * 100000"), Err(EvalError::Skip("expression")));
    }
}
