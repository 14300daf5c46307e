//! Check expression trees.
//!
//! A [`Check`] is evaluated against an input of type `I` and produces a
//! [`Value`]. Leaves are constants ([`Check::K`]) or labelled probes; a
//! compound node folds its children through a [`Reducer`].
//!
//! Chaining an associative reducer never nests: `a & b & c` is a single node
//! with three children no matter how it is parenthesized.
//!
//! # Example
//!
//! ```rust
//! use propstate::check::Check;
//! use propstate::Value;
//!
//! let at = |i: usize| {
//!     Check::probe(format!("at({i})"), move |items: &Vec<i64>| Ok(Value::Int(items[i])))
//! };
//! let sum = at(0) + at(1) + at(2) + 10;
//!
//! assert_eq!(sum.checks().len(), 4);
//! assert_eq!(sum.to_string(), "(at(0) + at(1) + at(2) + K(10))");
//! assert_eq!(sum.check(&vec![1, 3, 7]).unwrap(), Value::Int(21));
//! ```

mod reducer;

pub use reducer::Reducer;

use crate::core::{PropError, Value};
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, Sub};
use std::sync::Arc;

type ProbeFn<I> = dyn Fn(&I) -> Result<Value, PropError> + Send + Sync;

/// A check expression over inputs of type `I`.
pub enum Check<I: ?Sized> {
    /// Constant leaf; ignores its input.
    K(Value),
    Probe(Probe<I>),
    Compound(Compound<I>),
}

/// Labelled leaf that reads something from the input.
pub struct Probe<I: ?Sized> {
    label: String,
    f: Arc<ProbeFn<I>>,
}

impl<I: ?Sized> Probe<I> {
    /// Text shown for this leaf in the printable form.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Reducer applied over two or more children.
pub struct Compound<I: ?Sized> {
    op: Reducer,
    checks: Vec<Check<I>>,
}

impl<I: ?Sized> Compound<I> {
    /// Reducer folded over the children.
    pub fn op(&self) -> Reducer {
        self.op
    }

    /// Children, in evaluation order.
    pub fn checks(&self) -> &[Check<I>] {
        &self.checks
    }
}

impl<I: ?Sized> Check<I> {
    /// A constant leaf.
    pub fn k(value: impl Into<Value>) -> Self {
        Self::K(value.into())
    }

    /// A labelled leaf computing a value from the input. Errors propagate out
    /// of [`check`](Self::check).
    pub fn probe<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&I) -> Result<Value, PropError> + Send + Sync + 'static,
    {
        Self::Probe(Probe {
            label: label.into(),
            f: Arc::new(f),
        })
    }

    /// A compound node with `checks` as its children, in order.
    ///
    /// Fails with [`PropError::TooFewChecks`] for fewer than two children.
    pub fn compound<C>(op: Reducer, checks: impl IntoIterator<Item = C>) -> Result<Self, PropError>
    where
        C: Into<Check<I>>,
    {
        let checks: Vec<Check<I>> = checks.into_iter().map(Into::into).collect();
        if checks.len() < 2 {
            return Err(PropError::TooFewChecks {
                found: checks.len(),
            });
        }
        Ok(Self::Compound(Compound { op, checks }))
    }

    /// Combine two operands under `op`.
    ///
    /// When `op` is flattenable, an operand that is already an `op` node
    /// contributes its children instead of itself.
    pub fn make(op: Reducer, lhs: impl Into<Check<I>>, rhs: impl Into<Check<I>>) -> Self {
        let mut checks = Vec::new();
        for operand in [lhs.into(), rhs.into()] {
            match operand {
                Self::Compound(compound) if op.is_flattenable() && compound.op == op => {
                    checks.extend(compound.checks);
                }
                other => checks.push(other),
            }
        }
        Self::Compound(Compound { op, checks })
    }

    /// Evaluate against `input`.
    ///
    /// Compound nodes fold left to right, starting from the first child's
    /// result.
    pub fn check(&self, input: &I) -> Result<Value, PropError> {
        match self {
            Self::K(value) => Ok(value.clone()),
            Self::Probe(probe) => (probe.f)(input),
            Self::Compound(compound) => {
                let mut children = compound.checks.iter();
                let mut result = match children.next() {
                    Some(first) => first.check(input)?,
                    None => return Err(PropError::TooFewChecks { found: 0 }),
                };
                for child in children {
                    result = compound.op.apply(result, child.check(input)?)?;
                }
                Ok(result)
            }
        }
    }

    /// Children of a compound node; empty for leaves.
    pub fn checks(&self) -> &[Check<I>] {
        match self {
            Self::Compound(compound) => compound.checks(),
            _ => &[],
        }
    }

    /// Reducer of a compound node; `None` for leaves.
    pub fn op(&self) -> Option<Reducer> {
        match self {
            Self::Compound(compound) => Some(compound.op),
            _ => None,
        }
    }

    /// The constant of a `K` leaf.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::K(value) => Some(value),
            _ => None,
        }
    }
}

/// Logical/bitwise and; flattens.
pub fn and_of<I: ?Sized>(lhs: impl Into<Check<I>>, rhs: impl Into<Check<I>>) -> Check<I> {
    Check::make(Reducer::And, lhs, rhs)
}

/// Logical/bitwise or; flattens.
pub fn or_of<I: ?Sized>(lhs: impl Into<Check<I>>, rhs: impl Into<Check<I>>) -> Check<I> {
    Check::make(Reducer::Or, lhs, rhs)
}

/// Sum or concatenation; flattens.
pub fn add_of<I: ?Sized>(lhs: impl Into<Check<I>>, rhs: impl Into<Check<I>>) -> Check<I> {
    Check::make(Reducer::Add, lhs, rhs)
}

/// Never flattens: `a - b - c` is `((a - b) - c)`.
pub fn sub_of<I: ?Sized>(lhs: impl Into<Check<I>>, rhs: impl Into<Check<I>>) -> Check<I> {
    Check::make(Reducer::Sub, lhs, rhs)
}

impl<I: ?Sized> Clone for Check<I> {
    fn clone(&self) -> Self {
        match self {
            Self::K(value) => Self::K(value.clone()),
            Self::Probe(probe) => Self::Probe(Probe {
                label: probe.label.clone(),
                f: Arc::clone(&probe.f),
            }),
            Self::Compound(compound) => Self::Compound(Compound {
                op: compound.op,
                checks: compound.checks.clone(),
            }),
        }
    }
}

impl<I: ?Sized> fmt::Display for Check<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::K(value) => write!(f, "K({value})"),
            Self::Probe(probe) => f.write_str(&probe.label),
            Self::Compound(compound) => {
                f.write_str("(")?;
                for (i, check) in compound.checks.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", compound.op)?;
                    }
                    write!(f, "{check}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl<I: ?Sized> fmt::Debug for Check<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<I: ?Sized> From<Value> for Check<I> {
    fn from(value: Value) -> Self {
        Self::K(value)
    }
}

macro_rules! constant_check {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<I: ?Sized> From<$ty> for Check<I> {
                fn from(value: $ty) -> Self {
                    Self::K(Value::from(value))
                }
            }
        )*
    };
}

constant_check!(bool, i32, i64, f64, &str, String);

impl<I: ?Sized, R: Into<Check<I>>> BitAnd<R> for Check<I> {
    type Output = Check<I>;

    fn bitand(self, rhs: R) -> Check<I> {
        and_of(self, rhs)
    }
}

impl<I: ?Sized, R: Into<Check<I>>> BitOr<R> for Check<I> {
    type Output = Check<I>;

    fn bitor(self, rhs: R) -> Check<I> {
        or_of(self, rhs)
    }
}

impl<I: ?Sized, R: Into<Check<I>>> Add<R> for Check<I> {
    type Output = Check<I>;

    fn add(self, rhs: R) -> Check<I> {
        add_of(self, rhs)
    }
}

impl<I: ?Sized, R: Into<Check<I>>> Sub<R> for Check<I> {
    type Output = Check<I>;

    fn sub(self, rhs: R) -> Check<I> {
        sub_of(self, rhs)
    }
}
