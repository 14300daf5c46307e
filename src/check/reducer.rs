use crate::core::{PropError, Value};
use std::fmt;

/// Binary operator folded over a compound check's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reducer {
    And,
    Or,
    Add,
    Sub,
}

impl Reducer {
    /// Operator symbol used in the printable form.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Add => "+",
            Self::Sub => "-",
        }
    }

    /// Associative reducers splice same-kind operands into one flat node.
    pub fn is_flattenable(self) -> bool {
        !matches!(self, Self::Sub)
    }

    /// Combine two partial results.
    ///
    /// `And`/`Or` are logical on two bools and bitwise on integers. `Add`
    /// sums numbers and concatenates strings and lists; `Sub` is numeric
    /// only. Bools count as the integers 0 and 1 whenever they meet a
    /// number. Integer arithmetic that overflows widens to float.
    pub fn apply(self, lhs: Value, rhs: Value) -> Result<Value, PropError> {
        let result = match (self, &lhs, &rhs) {
            (Self::And, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(*a && *b)),
            (Self::Or, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(*a || *b)),
            (Self::Add, Value::Str(a), Value::Str(b)) => Some(Value::Str(format!("{a}{b}"))),
            (Self::Add, Value::List(a), Value::List(b)) => {
                Some(Value::List(a.iter().chain(b).cloned().collect()))
            }
            _ => match (integral(&lhs), integral(&rhs)) {
                (Some(a), Some(b)) => Some(self.on_integers(a, b)),
                _ => self.on_floats(&lhs, &rhs),
            },
        };
        result.ok_or_else(|| PropError::UnsupportedOperands {
            op: self.symbol(),
            lhs: lhs.type_name().to_string(),
            rhs: rhs.type_name().to_string(),
        })
    }

    fn on_integers(self, a: i64, b: i64) -> Value {
        match self {
            Self::And => Value::Int(a & b),
            Self::Or => Value::Int(a | b),
            Self::Add => a
                .checked_add(b)
                .map_or(Value::Float(a as f64 + b as f64), Value::Int),
            Self::Sub => a
                .checked_sub(b)
                .map_or(Value::Float(a as f64 - b as f64), Value::Int),
        }
    }

    fn on_floats(self, lhs: &Value, rhs: &Value) -> Option<Value> {
        let (a, b) = (numeric(lhs)?, numeric(rhs)?);
        match self {
            Self::Add => Some(Value::Float(a + b)),
            Self::Sub => Some(Value::Float(a - b)),
            Self::And | Self::Or => None,
        }
    }
}

/// Integer view; bools are 0 and 1.
fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Int(i) => Some(*i),
        _ => None,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    integral(value).map(|i| i as f64).or_else(|| value.as_f64())
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
