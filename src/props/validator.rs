//! Composable one-argument predicates.
//!
//! Validators combine with `&`, `|` and `!` (or the equivalent
//! [`and_of`], [`or_of`], [`not_of`] builders). Combinators always evaluate
//! both operands, left before right, so predicates with side effects run a
//! predictable number of times.

use crate::check::Check;
use crate::core::{Value, ValueType};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

type Predicate = dyn Fn(&Value) -> bool + Send + Sync;

/// A shareable predicate over [`Value`]s.
///
/// # Example
///
/// ```rust
/// use propstate::props::{Cmp, Validator};
/// use propstate::Value;
///
/// let in_range = Cmp::ge(0) & Cmp::le(100);
/// assert!(in_range.test(&Value::Int(0)));
/// assert!(!in_range.test(&Value::Int(101)));
///
/// let odd = Validator::new(|v: &Value| v.as_i64().is_some_and(|i| i % 2 == 1));
/// assert!((in_range & odd).test(&Value::Int(7)));
/// ```
#[derive(Clone)]
pub struct Validator(Arc<Predicate>);

impl Validator {
    /// Wrap a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Run the predicate on `value`.
    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }

    /// Accept values for which `check` evaluates truthy. Evaluation errors
    /// reject.
    pub fn from_check(check: Check<Value>) -> Self {
        Self::new(move |value| check.check(value).is_ok_and(|result| result.is_truthy()))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

impl<F> From<F> for Validator
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    fn from(predicate: F) -> Self {
        Self::new(predicate)
    }
}

/// Both predicates hold. Evaluates `lhs` then `rhs` unconditionally.
pub fn and_of(lhs: impl Into<Validator>, rhs: impl Into<Validator>) -> Validator {
    let (lhs, rhs) = (lhs.into(), rhs.into());
    Validator::new(move |value| {
        let left = lhs.test(value);
        let right = rhs.test(value);
        left && right
    })
}

/// Either predicate holds. Evaluates `lhs` then `rhs` unconditionally.
pub fn or_of(lhs: impl Into<Validator>, rhs: impl Into<Validator>) -> Validator {
    let (lhs, rhs) = (lhs.into(), rhs.into());
    Validator::new(move |value| {
        let left = lhs.test(value);
        let right = rhs.test(value);
        left || right
    })
}

/// The predicate does not hold.
pub fn not_of(inner: impl Into<Validator>) -> Validator {
    let inner = inner.into();
    Validator::new(move |value| !inner.test(value))
}

impl<R: Into<Validator>> BitAnd<R> for Validator {
    type Output = Validator;

    fn bitand(self, rhs: R) -> Validator {
        and_of(self, rhs)
    }
}

impl<R: Into<Validator>> BitOr<R> for Validator {
    type Output = Validator;

    fn bitor(self, rhs: R) -> Validator {
        or_of(self, rhs)
    }
}

impl Not for Validator {
    type Output = Validator;

    fn not(self) -> Validator {
        not_of(self)
    }
}

/// Relational operator used by [`Cmp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// Operator symbol for display.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// The binop itself: `lhs <op> rhs`. Incomparable operands are false.
    pub fn apply(self, lhs: &Value, rhs: &Value) -> bool {
        let Some(ordering) = lhs.compare(rhs) else {
            return false;
        };
        match self {
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Comparison validators against a constant: `Cmp::gt(10)` accepts values
/// strictly greater than 10.
pub struct Cmp;

impl Cmp {
    /// Compare candidates against `constant` with `op`.
    pub fn new(op: CmpOp, constant: impl Into<Value>) -> Validator {
        let constant = constant.into();
        Validator::new(move |value| op.apply(value, &constant))
    }

    /// Accepts values strictly less than `constant`.
    pub fn lt(constant: impl Into<Value>) -> Validator {
        Self::new(CmpOp::Lt, constant)
    }

    /// Accepts values less than or equal to `constant`.
    pub fn le(constant: impl Into<Value>) -> Validator {
        Self::new(CmpOp::Le, constant)
    }

    /// Accepts values strictly greater than `constant`.
    pub fn gt(constant: impl Into<Value>) -> Validator {
        Self::new(CmpOp::Gt, constant)
    }

    /// Accepts values greater than or equal to `constant`.
    pub fn ge(constant: impl Into<Value>) -> Validator {
        Self::new(CmpOp::Ge, constant)
    }
}

/// Accepts only null.
pub fn none() -> Validator {
    Validator::new(Value::is_null)
}

/// Accepts falsy values, null included.
pub fn empty() -> Validator {
    Validator::new(|value| !value.is_truthy())
}

/// Accepts values equal to one of `allowed`.
pub fn is_in<I, V>(allowed: I) -> Validator
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    Validator::new(move |value| allowed.contains(value))
}

/// Accepts values of runtime type `kind`.
pub fn of_type(kind: ValueType) -> Validator {
    Validator::new(move |value| kind.matches(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn counting(result: bool) -> (Validator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let validator = Validator::new(move |_| {
            seen.fetch_add(1, AtomicOrdering::SeqCst);
            result
        });
        (validator, calls)
    }

    #[test]
    fn basic_validator_wraps_predicate() {
        let val = Validator::new(|v: &Value| v.as_i64() == Some(2));
        assert!(!val.test(&Value::Int(1)));
        assert!(val.test(&Value::Int(2)));
    }

    #[test]
    fn and_or_not_truth_tables() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let (lhs, _) = counting(a);
            let (rhs, _) = counting(b);
            assert_eq!((lhs.clone() & rhs.clone()).test(&Value::Null), a && b);
            assert_eq!((lhs.clone() | rhs).test(&Value::Null), a || b);
            assert_eq!((!lhs).test(&Value::Null), !a);
        }
    }

    #[test]
    fn combinators_evaluate_both_sides() {
        let (lhs, lhs_calls) = counting(false);
        let (rhs, rhs_calls) = counting(true);

        assert!(!and_of(lhs.clone(), rhs.clone()).test(&Value::Int(1)));
        assert!(or_of(rhs, lhs).test(&Value::Int(1)));

        assert_eq!(lhs_calls.load(AtomicOrdering::SeqCst), 2);
        assert_eq!(rhs_calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn combinators_evaluate_left_first() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let record = |tag: &'static str| {
            let order = Arc::clone(&order);
            Validator::new(move |_| {
                order.lock().unwrap().push(tag);
                true
            })
        };

        (record("left") & record("right")).test(&Value::Null);
        (record("left") | record("right")).test(&Value::Null);

        assert_eq!(*order.lock().unwrap(), vec!["left", "right", "left", "right"]);
    }

    #[test]
    fn plain_functions_combine_with_validators() {
        let val = Validator::new(|v: &Value| v.as_i64() == Some(2));
        let either = val | (|v: &Value| v.as_i64() == Some(3));

        assert!(!either.test(&Value::Int(1)));
        assert!(either.test(&Value::Int(2)));
        assert!(either.test(&Value::Int(3)));
    }

    #[test]
    fn cmp_boundaries() {
        let gt = Cmp::gt(10);
        assert!(!gt.test(&Value::Int(10)));
        assert!(gt.test(&Value::Int(11)));

        let ge = Cmp::ge(10);
        assert!(!ge.test(&Value::Int(9)));
        assert!(ge.test(&Value::Int(10)));

        let lt = Cmp::lt(10);
        assert!(!lt.test(&Value::Int(10)));
        assert!(lt.test(&Value::Int(9)));

        let le = Cmp::le(10);
        assert!(!le.test(&Value::Int(11)));
        assert!(le.test(&Value::Int(10)));
    }

    #[test]
    fn cmp_with_explicit_op() {
        let validator = Cmp::new(CmpOp::Gt, 10);
        assert!(!validator.test(&Value::Int(10)));
        assert!(validator.test(&Value::Float(10.5)));
        assert!(!validator.test(&Value::from("11")));
        assert_eq!(CmpOp::Ge.to_string(), ">=");
    }

    #[test]
    fn composed_ranges() {
        let not_between = Cmp::gt(7) | Cmp::lt(3);
        assert!(not_between.test(&Value::Int(2)));
        assert!(!not_between.test(&Value::Int(3)));
        assert!(!not_between.test(&Value::Int(7)));
        assert!(not_between.test(&Value::Int(8)));
    }

    #[test]
    fn none_and_empty_constants() {
        assert!(none().test(&Value::Null));
        for value in [Value::Int(1), Value::Int(0), Value::from(""), Value::List(vec![])] {
            assert!(!none().test(&value));
        }

        assert!(empty().test(&Value::Null));
        assert!(empty().test(&Value::Int(0)));
        assert!(empty().test(&Value::from("")));
        assert!(empty().test(&Value::List(vec![])));
        assert!(!empty().test(&Value::Int(1)));
        assert!(!empty().test(&Value::from("str")));
        assert!(!empty().test(&Value::List(vec![Value::Int(1)])));
    }

    #[test]
    fn is_in_checks_membership() {
        let validator = is_in([10, 20, 30]);
        for (candidate, expected) in [(10, true), (11, false), (20, true), (21, false), (30, true)] {
            assert_eq!(validator.test(&Value::Int(candidate)), expected, "{candidate}");
        }
    }

    #[test]
    fn checks_convert_by_truthiness() {
        let double = Check::probe("double", |v: &Value| match v.as_i64() {
            Some(i) => Ok(Value::Int(i * 2)),
            None => Err(crate::core::PropError::NotConfigured),
        });
        let validator = Validator::from_check(double - 4);

        assert!(!validator.test(&Value::Int(2)));
        assert!(validator.test(&Value::Int(3)));
        assert!(!validator.test(&Value::from("x")));
    }

    #[test]
    fn non_empty_string_or_none() {
        let validator = none() | (!empty() & of_type(ValueType::Str));
        assert!(validator.test(&Value::Null));
        assert!(validator.test(&Value::from("name")));
        assert!(!validator.test(&Value::from("")));
        assert!(!validator.test(&Value::Int(1)));
    }
}
