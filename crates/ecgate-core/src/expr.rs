//! Condition expressions
//!
//! Designers write conditions as short JavaScript-flavoured expressions such
//! as `target.hpRate() < 0.5 && !subject.isStateAffected(4)`. Evaluation is
//! sandboxed: the only names in scope are the units bound in the
//! [`EvalContext`] and a fixed set of builtins. Nothing can be assigned.
//!
//! Builtins:
//! - `switch(id)`, `$gameSwitches.value(id)`: current switch value
//! - `variable(id)`, `$gameVariables.value(id)`: current variable value
//! - `min`, `max`, `abs`, `floor`, `ceil`, `round`, also as `Math.*`

use crate::parser;
use crate::{Battler, ExprError, SwitchTable, Value, VariableTable};
use std::cmp::Ordering;
use std::fmt;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::StrictEq | BinaryOp::StrictNe => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }
}

/// A parsed condition expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value
    Literal(Value),
    /// A bound name (`subject`, `target`) or builtin namespace
    Ident(String),
    /// `object.name`
    Member(Box<Expr>, String),
    /// `object[index]`
    Index(Box<Expr>, Box<Expr>),
    /// `callee(args)`
    Call(Box<Expr>, Vec<Expr>),
    /// `!a`, `-a`, `+a`
    Unary(UnaryOp, Box<Expr>),
    /// `a op b`
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `cond ? a : b`
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// Names and tables visible to an expression
pub struct EvalContext<'a> {
    /// The acting unit, bound as `subject`
    pub subject: &'a dyn Battler,
    /// The affected unit, bound as `target` when present
    pub target: Option<&'a dyn Battler>,
    /// Switches for `switch(id)`
    pub switches: &'a dyn SwitchTable,
    /// Variables for `variable(id)`
    pub variables: &'a dyn VariableTable,
}

impl<'a> EvalContext<'a> {
    /// Create a context with no target
    pub fn new(
        subject: &'a dyn Battler,
        switches: &'a dyn SwitchTable,
        variables: &'a dyn VariableTable,
    ) -> Self {
        Self {
            subject,
            target: None,
            switches,
            variables,
        }
    }

    /// Bind the target unit
    pub fn with_target(mut self, target: &'a dyn Battler) -> Self {
        self.target = Some(target);
        self
    }
}

/// Intermediate result: either a plain value or a bound unit
#[derive(Clone)]
enum Operand<'a> {
    Value(Value),
    Unit(&'a dyn Battler),
}

impl fmt::Debug for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(v) => write!(f, "{:?}", v),
            Operand::Unit(unit) => write!(f, "Unit({})", unit.name()),
        }
    }
}

impl Operand<'_> {
    fn is_truthy(&self) -> bool {
        match self {
            Operand::Value(v) => v.is_truthy(),
            Operand::Unit(_) => true,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Operand::Value(v) => v.type_name(),
            Operand::Unit(_) => "unit",
        }
    }

    fn into_value(self) -> Value {
        match self {
            Operand::Value(v) => v,
            Operand::Unit(unit) => Value::String(unit.name().to_string()),
        }
    }
}

impl Expr {
    /// Parse an expression from source text
    pub fn parse(source: &str) -> Result<Expr, ExprError> {
        parser::parse(source)
    }

    /// Evaluate to a value. A unit result evaluates to its name.
    pub fn eval(&self, ctx: &EvalContext) -> Result<Value, ExprError> {
        Ok(self.operand(ctx)?.into_value())
    }

    /// Evaluate and apply truthiness; units are truthy
    pub fn eval_bool(&self, ctx: &EvalContext) -> Result<bool, ExprError> {
        Ok(self.operand(ctx)?.is_truthy())
    }

    fn operand<'a>(&self, ctx: &EvalContext<'a>) -> Result<Operand<'a>, ExprError> {
        match self {
            Expr::Literal(v) => Ok(Operand::Value(v.clone())),
            Expr::Ident(name) => match name.as_str() {
                "subject" => Ok(Operand::Unit(ctx.subject)),
                "target" => ctx
                    .target
                    .map(Operand::Unit)
                    .ok_or_else(|| ExprError::Undefined("target".to_string())),
                _ => Err(ExprError::Undefined(name.clone())),
            },
            Expr::Member(object, name) => {
                let object = object.operand(ctx)?;
                member(&object, name)
            }
            Expr::Index(object, index) => {
                let object = object.operand(ctx)?;
                let index = index.operand(ctx)?.into_value();
                match object {
                    Operand::Unit(unit) => {
                        let name = index.to_string();
                        Ok(Operand::Value(unit.property(&name).unwrap_or(Value::Null)))
                    }
                    Operand::Value(value) => Ok(Operand::Value(index_value(&value, &index)?)),
                }
            }
            Expr::Call(callee, args) => {
                let args = args
                    .iter()
                    .map(|a| a.operand(ctx).map(Operand::into_value))
                    .collect::<Result<Vec<_>, _>>()?;
                call(callee, &args, ctx).map(Operand::Value)
            }
            Expr::Unary(op, inner) => {
                let v = inner.operand(ctx)?;
                let result = match op {
                    UnaryOp::Not => Value::Bool(!v.is_truthy()),
                    UnaryOp::Neg => match to_number(&v)? {
                        Value::Int(i) => i
                            .checked_neg()
                            .map(Value::Int)
                            .unwrap_or(Value::Float(-(i as f64))),
                        other => Value::Float(-other.as_float().unwrap_or(f64::NAN)),
                    },
                    UnaryOp::Plus => to_number(&v)?,
                };
                Ok(Operand::Value(result))
            }
            Expr::Binary(BinaryOp::And, a, b) => {
                let va = a.operand(ctx)?;
                if va.is_truthy() {
                    b.operand(ctx)
                } else {
                    Ok(va)
                }
            }
            Expr::Binary(BinaryOp::Or, a, b) => {
                let va = a.operand(ctx)?;
                if va.is_truthy() {
                    Ok(va)
                } else {
                    b.operand(ctx)
                }
            }
            Expr::Binary(op, a, b) => {
                let va = a.operand(ctx)?;
                let vb = b.operand(ctx)?;
                binary(*op, &va, &vb).map(Operand::Value)
            }
            Expr::Conditional(cond, then, otherwise) => {
                if cond.operand(ctx)?.is_truthy() {
                    then.operand(ctx)
                } else {
                    otherwise.operand(ctx)
                }
            }
        }
    }
}

fn member<'a>(object: &Operand<'a>, name: &str) -> Result<Operand<'a>, ExprError> {
    match object {
        Operand::Unit(unit) => Ok(Operand::Value(unit.property(name).unwrap_or(Value::Null))),
        Operand::Value(Value::Null) => Err(ExprError::TypeError {
            expected: format!("object with property '{}'", name),
            got: "null".to_string(),
        }),
        Operand::Value(value) => {
            let result = match (value, name) {
                (Value::String(s), "length") => Value::Int(s.chars().count() as i64),
                (Value::List(list), "length") => Value::Int(list.len() as i64),
                (Value::Map(map), _) => map.get(name).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            };
            Ok(Operand::Value(result))
        }
    }
}

fn index_value(value: &Value, index: &Value) -> Result<Value, ExprError> {
    let result = match value {
        Value::List(list) => index
            .as_int()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| list.get(i).cloned())
            .unwrap_or(Value::Null),
        Value::String(s) => index
            .as_int()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null),
        Value::Map(map) => map.get(&index.to_string()).cloned().unwrap_or(Value::Null),
        Value::Null => {
            return Err(ExprError::TypeError {
                expected: "indexable value".to_string(),
                got: "null".to_string(),
            })
        }
        _ => Value::Null,
    };
    Ok(result)
}

fn call(callee: &Expr, args: &[Value], ctx: &EvalContext) -> Result<Value, ExprError> {
    match callee {
        Expr::Ident(name) => builtin(name, args, ctx),
        Expr::Member(object, method) => {
            if let Expr::Ident(namespace) = object.as_ref() {
                match (namespace.as_str(), method.as_str()) {
                    ("Math", _) => return builtin(method, args, ctx),
                    ("$gameSwitches", "value") => return builtin("switch", args, ctx),
                    ("$gameVariables", "value") => return builtin("variable", args, ctx),
                    _ => {}
                }
            }
            match object.operand(ctx)? {
                Operand::Unit(unit) => unit.call(method, args),
                other => Err(ExprError::NotAFunction {
                    receiver: other.type_name().to_string(),
                    name: method.clone(),
                }),
            }
        }
        _ => Err(ExprError::NotAFunction {
            receiver: "expression".to_string(),
            name: "(call)".to_string(),
        }),
    }
}

fn builtin(name: &str, args: &[Value], ctx: &EvalContext) -> Result<Value, ExprError> {
    match name {
        "switch" => {
            arity(name, args, 1)?;
            Ok(Value::Bool(ctx.switches.value(int_arg(&args[0])?)))
        }
        "variable" => {
            arity(name, args, 1)?;
            Ok(ctx.variables.value(int_arg(&args[0])?))
        }
        "min" | "max" => {
            if args.is_empty() {
                return Err(ExprError::Arity {
                    name: name.to_string(),
                    expected: 1,
                    got: 0,
                });
            }
            let mut best = number_arg(&args[0])?;
            for arg in &args[1..] {
                let candidate = number_arg(arg)?;
                let ordering = compare_numbers(&candidate, &best);
                let better = if name == "min" {
                    ordering == Some(Ordering::Less)
                } else {
                    ordering == Some(Ordering::Greater)
                };
                if better {
                    best = candidate;
                }
            }
            Ok(best)
        }
        "abs" => {
            arity(name, args, 1)?;
            Ok(match number_arg(&args[0])? {
                Value::Int(i) => i
                    .checked_abs()
                    .map(Value::Int)
                    .unwrap_or(Value::Float((i as f64).abs())),
                other => Value::Float(other.as_float().unwrap_or(f64::NAN).abs()),
            })
        }
        "floor" | "ceil" | "round" => {
            arity(name, args, 1)?;
            let f = number_arg(&args[0])?.as_float().unwrap_or(f64::NAN);
            let rounded = match name {
                "floor" => f.floor(),
                "ceil" => f.ceil(),
                _ => (f + 0.5).floor(),
            };
            Ok(Value::number(rounded))
        }
        _ => Err(ExprError::Undefined(name.to_string())),
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), ExprError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ExprError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        })
    }
}

fn int_arg(value: &Value) -> Result<i64, ExprError> {
    match to_number(&Operand::Value(value.clone()))? {
        Value::Int(i) => Ok(i),
        other => Ok(other.as_float().unwrap_or(0.0).trunc() as i64),
    }
}

fn number_arg(value: &Value) -> Result<Value, ExprError> {
    to_number(&Operand::Value(value.clone()))
}

fn to_number(v: &Operand) -> Result<Value, ExprError> {
    let number = match v {
        Operand::Value(value) => value.to_number(),
        Operand::Unit(_) => None,
    };
    number.ok_or_else(|| ExprError::TypeError {
        expected: "number".to_string(),
        got: v.type_name().to_string(),
    })
}

fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        _ => a.as_float()?.partial_cmp(&b.as_float()?),
    }
}

fn strict_equal(a: &Operand, b: &Operand) -> bool {
    match (a, b) {
        (Operand::Unit(x), Operand::Unit(y)) => std::ptr::addr_eq(*x, *y),
        (Operand::Value(x), Operand::Value(y)) => match (x, y) {
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                compare_numbers(x, y) == Some(Ordering::Equal)
            }
            _ => x == y,
        },
        _ => false,
    }
}

fn loose_equal(a: &Operand, b: &Operand) -> bool {
    if strict_equal(a, b) {
        return true;
    }
    match (a, b) {
        (Operand::Value(x), Operand::Value(y)) => {
            let scalar = |v: &Value| {
                matches!(
                    v,
                    Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
                )
            };
            if !scalar(x) || !scalar(y) {
                return false;
            }
            match (to_number(a), to_number(b)) {
                (Ok(nx), Ok(ny)) => compare_numbers(&nx, &ny) == Some(Ordering::Equal),
                _ => false,
            }
        }
        _ => false,
    }
}

fn binary(op: BinaryOp, a: &Operand, b: &Operand) -> Result<Value, ExprError> {
    match op {
        BinaryOp::StrictEq => Ok(Value::Bool(strict_equal(a, b))),
        BinaryOp::StrictNe => Ok(Value::Bool(!strict_equal(a, b))),
        BinaryOp::Eq => Ok(Value::Bool(loose_equal(a, b))),
        BinaryOp::Ne => Ok(Value::Bool(!loose_equal(a, b))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (a, b) {
                (Operand::Value(Value::String(x)), Operand::Value(Value::String(y))) => {
                    Some(x.cmp(y))
                }
                _ => compare_numbers(&to_number(a)?, &to_number(b)?),
            };
            let result = match ordering {
                None => false,
                Some(o) => match op {
                    BinaryOp::Lt => o == Ordering::Less,
                    BinaryOp::Le => o != Ordering::Greater,
                    BinaryOp::Gt => o == Ordering::Greater,
                    _ => o != Ordering::Less,
                },
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => {
            let is_string = |v: &Operand| matches!(v, Operand::Value(Value::String(_)));
            if is_string(a) || is_string(b) {
                let text = format!("{}{}", a.clone().into_value(), b.clone().into_value());
                return Ok(Value::String(text));
            }
            arithmetic(a, b, i64::checked_add, |x, y| x + y)
        }
        BinaryOp::Sub => arithmetic(a, b, i64::checked_sub, |x, y| x - y),
        BinaryOp::Mul => arithmetic(a, b, i64::checked_mul, |x, y| x * y),
        BinaryOp::Div => {
            let x = to_number(a)?.as_float().unwrap_or(f64::NAN);
            let y = to_number(b)?.as_float().unwrap_or(f64::NAN);
            if y == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            Ok(Value::number(x / y))
        }
        BinaryOp::Rem => {
            let x = to_number(a)?;
            let y = to_number(b)?;
            if y.as_float() == Some(0.0) {
                return Err(ExprError::DivisionByZero);
            }
            match (x, y) {
                (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.checked_rem(y).unwrap_or(0))),
                (x, y) => Ok(Value::Float(
                    x.as_float().unwrap_or(f64::NAN) % y.as_float().unwrap_or(f64::NAN),
                )),
            }
        }
        // Only reached when both sides are already evaluated
        BinaryOp::And => Ok(if a.is_truthy() { b } else { a }.clone().into_value()),
        BinaryOp::Or => Ok(if a.is_truthy() { a } else { b }.clone().into_value()),
    }
}

fn arithmetic(
    a: &Operand,
    b: &Operand,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, ExprError> {
    let x = to_number(a)?;
    let y = to_number(b)?;
    if let (Value::Int(i), Value::Int(j)) = (&x, &y) {
        if let Some(result) = int_op(*i, *j) {
            return Ok(Value::Int(result));
        }
    }
    Ok(Value::Float(float_op(
        x.as_float().unwrap_or(f64::NAN),
        y.as_float().unwrap_or(f64::NAN),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Switches, Unit, Variables};

    struct Fixture {
        subject: Unit,
        target: Unit,
        switches: Switches,
        variables: Variables,
    }

    impl Fixture {
        fn new() -> Self {
            let mut switches = Switches::new();
            switches.set(3, true);
            let mut variables = Variables::new();
            variables.set(1, 15);
            Self {
                subject: Unit::actor("Harold").with("hp", 120i64).with("mhp", 200i64),
                target: Unit::enemy("Slime").with("hp", 30i64).with("mhp", 30i64),
                switches,
                variables,
            }
        }

        fn ctx(&self) -> EvalContext<'_> {
            EvalContext::new(&self.subject, &self.switches, &self.variables)
                .with_target(&self.target)
        }

        fn eval(&self, source: &str) -> Result<Value, ExprError> {
            Expr::parse(source)?.eval(&self.ctx())
        }
    }

    #[test]
    fn test_arithmetic() {
        let f = Fixture::new();
        assert_eq!(f.eval("1 + 2 * 3").unwrap(), Value::Int(7));
        assert_eq!(f.eval("7 / 2").unwrap(), Value::Float(3.5));
        assert_eq!(f.eval("8 / 2").unwrap(), Value::Int(4));
        assert_eq!(f.eval("7 % 3").unwrap(), Value::Int(1));
        assert_eq!(f.eval("-(2 - 5)").unwrap(), Value::Int(3));
        assert_eq!(f.eval("'hp: ' + 5").unwrap(), Value::from("hp: 5"));
        assert_eq!(f.eval("1 / 0"), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn test_comparison_and_equality() {
        let f = Fixture::new();
        assert_eq!(f.eval("3 > 2").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("2 >= 2.0").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("1 === 1.0").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("'1' === 1").unwrap(), Value::Bool(false));
        assert_eq!(f.eval("'1' == 1").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("true == 1").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("null == 0").unwrap(), Value::Bool(false));
        assert_eq!(f.eval("'abc' < 'abd'").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_logical_short_circuit() {
        let f = Fixture::new();
        assert_eq!(f.eval("false && nothing").unwrap(), Value::Bool(false));
        assert_eq!(f.eval("true || nothing").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("0 || 'fallback'").unwrap(), Value::from("fallback"));
        assert_eq!(f.eval("true ? 1 : nothing").unwrap(), Value::Int(1));
        assert!(f.eval("true && nothing").is_err());
    }

    #[test]
    fn test_units() {
        let f = Fixture::new();
        assert_eq!(f.eval("target.hpRate() === 1").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("subject.hp > target.hp").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("subject['hp']").unwrap(), Value::Int(120));
        assert_eq!(f.eval("subject.name").unwrap(), Value::from("Harold"));
        assert_eq!(f.eval("subject.atk").unwrap(), Value::Null);
        assert_eq!(f.eval("subject === subject").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("subject === target").unwrap(), Value::Bool(false));
        assert!(Expr::parse("target").unwrap().eval_bool(&f.ctx()).unwrap());
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let f = Fixture::new();
        let ctx = EvalContext::new(&f.subject, &f.switches, &f.variables);
        let expr = Expr::parse("target.hp > 0").unwrap();
        assert_eq!(
            expr.eval(&ctx),
            Err(ExprError::Undefined("target".to_string()))
        );
    }

    #[test]
    fn test_builtins() {
        let f = Fixture::new();
        assert_eq!(f.eval("switch(3)").unwrap(), Value::Bool(true));
        assert_eq!(f.eval("$gameSwitches.value(4)").unwrap(), Value::Bool(false));
        assert_eq!(f.eval("variable(1) + 1").unwrap(), Value::Int(16));
        assert_eq!(f.eval("$gameVariables.value(2)").unwrap(), Value::Int(0));
        assert_eq!(f.eval("max(1, 5, 3)").unwrap(), Value::Int(5));
        assert_eq!(f.eval("Math.min(2, 0.5)").unwrap(), Value::Float(0.5));
        assert_eq!(f.eval("floor(2.7)").unwrap(), Value::Int(2));
        assert_eq!(f.eval("Math.round(2.5)").unwrap(), Value::Int(3));
        assert_eq!(f.eval("abs(-4)").unwrap(), Value::Int(4));
    }

    #[test]
    fn test_runtime_errors() {
        let f = Fixture::new();
        assert_eq!(
            f.eval("bogus(1)"),
            Err(ExprError::Undefined("bogus".to_string()))
        );
        assert_eq!(
            f.eval("window.alert"),
            Err(ExprError::Undefined("window".to_string()))
        );
        assert!(matches!(
            f.eval("subject.fly()"),
            Err(ExprError::NotAFunction { .. })
        ));
        assert!(matches!(
            f.eval("subject.atk.value"),
            Err(ExprError::TypeError { .. })
        ));
        assert!(matches!(f.eval("switch()"), Err(ExprError::Arity { .. })));
    }
}
