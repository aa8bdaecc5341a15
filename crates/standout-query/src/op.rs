//! Operators used by constraints.
//!
//! Each constraint family has its own operator enum, so an operator can only
//! ever be paired with the constraint kind it makes sense for.

use std::cmp::Ordering;
use std::fmt;

/// Comparison operator for [`ConstraintKind::Comparison`](crate::ConstraintKind::Comparison).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl CompareOp {
    /// Returns `true` for `Eq` and `Ne`, the operators governed by [`Equality`].
    pub fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    /// Evaluates the operator given the ordering of `field` relative to `value`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How `Eq`/`Ne` comparisons decide that two values are the same.
///
/// The two notions differ for types whose `PartialEq` is stricter than their
/// ordering (for instance a case-insensitive ordering over strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Equality {
    /// `PartialEq::eq`.
    #[default]
    Value,
    /// `partial_cmp(..) == Some(Equal)`.
    Ordering,
}

/// Membership operator for [`ConstraintKind::Array`](crate::ConstraintKind::Array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayOp {
    /// Collection field includes one given value.
    Contains,
    /// Collection field includes at least one of the given values.
    ContainsAny,
    /// Scalar field is one of the given values.
    In,
    /// Scalar field is none of the given values.
    NotIn,
}

impl ArrayOp {
    /// Returns `true` if the operator reads a collection field.
    pub fn is_collection_op(self) -> bool {
        matches!(self, ArrayOp::Contains | ArrayOp::ContainsAny)
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayOp::Contains => "contains",
            ArrayOp::ContainsAny => "containsAny",
            ArrayOp::In => "in",
            ArrayOp::NotIn => "notIn",
        }
    }
}

impl fmt::Display for ArrayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical combinator for [`ConstraintKind::Compound`](crate::ConstraintKind::Compound).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    /// Every child matches.
    And,
    /// At least one child matches.
    Or,
    /// The single child does not match.
    Not,
}

impl LogicOp {
    /// Checks a child count against this operator's arity.
    ///
    /// Returns the expected-arity description on failure.
    pub(crate) fn check_arity(self, count: usize) -> std::result::Result<(), &'static str> {
        match self {
            LogicOp::And | LogicOp::Or if count == 0 => Err("at least one"),
            LogicOp::Not if count != 1 => Err("exactly one"),
            _ => Ok(()),
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            LogicOp::And => "and",
            LogicOp::Or => "or",
            LogicOp::Not => "not",
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
