//! Constraint types for query predicates.
//!
//! A [`Constraint`] is an immutable yes/no question about one item. Field
//! values are read through typed extractor closures bound when the constraint
//! is built, so comparisons are checked by the compiler rather than at
//! evaluation time.
//!
//! Every constructor validates its arguments eagerly: an invalid range or a
//! compound with the wrong number of children is rejected before any data is
//! touched.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{BoxError, ConfigurationError, QueryError, Result};
use crate::op::{ArrayOp, CompareOp, Equality, LogicOp};

type Test<T> = Arc<dyn Fn(&T) -> Result<bool> + Send + Sync>;
type BoolExtractor<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type DateExtractor<T> = Arc<dyn Fn(&T) -> DateTime<Utc> + Send + Sync>;

/// The closed set of constraint variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Boolean field equals an expected value.
    Boolean,
    /// Ordered field compared against a value.
    Comparison,
    /// Ordered field within inclusive bounds.
    Range,
    /// Instant within inclusive bounds, optionally by date only.
    DateRange,
    /// Set membership on a scalar or collection field.
    Array,
    /// Logical combination of child constraints.
    Compound,
    /// Caller-supplied predicate.
    Custom,
}

/// A single filter predicate over items of type `T`.
///
/// # Example
///
/// ```
/// use standout_query::Constraint;
///
/// struct Product {
///     price: u32,
///     tags: Vec<String>,
/// }
///
/// let cheap_sale = Constraint::and(vec![
///     Constraint::lt(100, |p: &Product| p.price),
///     Constraint::contains("sale".to_string(), |p: &Product| p.tags.clone()),
/// ])
/// .unwrap();
///
/// let item = Product { price: 40, tags: vec!["sale".into()] };
/// assert!(cheap_sale.matches(&item).unwrap());
/// ```
pub struct Constraint<T> {
    kind: Kind<T>,
}

enum Kind<T> {
    Boolean {
        expected: bool,
        extractor: BoolExtractor<T>,
    },
    Comparison {
        op: CompareOp,
        equality: Equality,
        value: String,
        test: Test<T>,
    },
    Range {
        min: String,
        max: String,
        test: Test<T>,
    },
    DateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        ignore_time: bool,
        extractor: DateExtractor<T>,
    },
    Array {
        op: ArrayOp,
        values: String,
        test: Test<T>,
    },
    Compound {
        op: LogicOp,
        children: Vec<Constraint<T>>,
    },
    Custom {
        label: Option<String>,
        test: Test<T>,
    },
}

impl<T: 'static> Constraint<T> {
    // ========================================================================
    // Boolean
    // ========================================================================

    /// Matches when the extracted flag equals `expected`.
    pub fn boolean<E>(expected: bool, extractor: E) -> Self
    where
        E: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Constraint {
            kind: Kind::Boolean {
                expected,
                extractor: Arc::new(extractor),
            },
        }
    }

    /// Matches when the extracted flag is `true`.
    pub fn is<E>(extractor: E) -> Self
    where
        E: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::boolean(true, extractor)
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Compares the extracted field against `value` with `op`.
    ///
    /// `Eq` and `Ne` use value equality (`PartialEq`); the ordering operators
    /// use `PartialOrd`. Values that do not order against each other (such as
    /// `NaN`) never satisfy an ordering operator.
    pub fn compare<F, E>(op: CompareOp, value: F, extractor: E) -> Self
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        Self::compare_with(op, Equality::Value, value, extractor)
    }

    /// Like [`compare`](Self::compare), choosing how `Eq`/`Ne` decide equality.
    pub fn compare_with<F, E>(op: CompareOp, equality: Equality, value: F, extractor: E) -> Self
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        let label = format!("{value:?}");
        let test = move |item: &T| -> Result<bool> {
            Ok(compare_field(op, equality, &extractor(item), &value))
        };
        Constraint {
            kind: Kind::Comparison {
                op,
                equality,
                value: label,
                test: Arc::new(test),
            },
        }
    }

    /// Field equals `value`.
    pub fn eq<F, E>(value: F, extractor: E) -> Self
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        Self::compare(CompareOp::Eq, value, extractor)
    }

    /// Field does not equal `value`.
    pub fn ne<F, E>(value: F, extractor: E) -> Self
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        Self::compare(CompareOp::Ne, value, extractor)
    }

    /// Field is greater than `value`.
    pub fn gt<F, E>(value: F, extractor: E) -> Self
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        Self::compare(CompareOp::Gt, value, extractor)
    }

    /// Field is greater than or equal to `value`.
    pub fn gte<F, E>(value: F, extractor: E) -> Self
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        Self::compare(CompareOp::Gte, value, extractor)
    }

    /// Field is less than `value`.
    pub fn lt<F, E>(value: F, extractor: E) -> Self
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        Self::compare(CompareOp::Lt, value, extractor)
    }

    /// Field is less than or equal to `value`.
    pub fn lte<F, E>(value: F, extractor: E) -> Self
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        Self::compare(CompareOp::Lte, value, extractor)
    }

    // ========================================================================
    // Ranges
    // ========================================================================

    /// Matches when `min <= field <= max`.
    ///
    /// Fails with [`ConfigurationError::InvalidRange`] unless `min <= max`.
    pub fn range<F, E>(min: F, max: F, extractor: E) -> Result<Self>
    where
        F: PartialOrd + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        if !matches!(min.partial_cmp(&max), Some(Ordering::Less | Ordering::Equal)) {
            return Err(ConfigurationError::InvalidRange {
                min: format!("{min:?}"),
                max: format!("{max:?}"),
            }
            .into());
        }

        let (min_label, max_label) = (format!("{min:?}"), format!("{max:?}"));
        let test = move |item: &T| -> Result<bool> {
            let field = extractor(item);
            Ok(min <= field && field <= max)
        };
        Ok(Constraint {
            kind: Kind::Range {
                min: min_label,
                max: max_label,
                test: Arc::new(test),
            },
        })
    }

    /// Matches when the extracted instant lies in `[start, end]`.
    ///
    /// With `ignore_time`, the field and both bounds are truncated to their
    /// UTC calendar date before comparing.
    pub fn date_range<E>(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        ignore_time: bool,
        extractor: E,
    ) -> Result<Self>
    where
        E: Fn(&T) -> DateTime<Utc> + Send + Sync + 'static,
    {
        if start > end {
            return Err(ConfigurationError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            }
            .into());
        }
        Ok(Constraint {
            kind: Kind::DateRange {
                start,
                end,
                ignore_time,
                extractor: Arc::new(extractor),
            },
        })
    }

    // ========================================================================
    // Array membership
    // ========================================================================

    /// Collection field includes `value`.
    pub fn contains<F, I, E>(value: F, extractor: E) -> Self
    where
        F: PartialEq + fmt::Debug + Send + Sync + 'static,
        I: IntoIterator<Item = F>,
        E: Fn(&T) -> I + Send + Sync + 'static,
    {
        let label = format!("{value:?}");
        let test = move |item: &T| -> Result<bool> {
            Ok(extractor(item).into_iter().any(|v| v == value))
        };
        Self::array(ArrayOp::Contains, label, test)
    }

    /// Collection field includes at least one of `values`.
    pub fn contains_any<F, I, E>(values: impl IntoIterator<Item = F>, extractor: E) -> Self
    where
        F: PartialEq + fmt::Debug + Send + Sync + 'static,
        I: IntoIterator<Item = F>,
        E: Fn(&T) -> I + Send + Sync + 'static,
    {
        let values: Vec<F> = values.into_iter().collect();
        let label = format!("{values:?}");
        let test = move |item: &T| -> Result<bool> {
            Ok(extractor(item).into_iter().any(|v| values.contains(&v)))
        };
        Self::array(ArrayOp::ContainsAny, label, test)
    }

    /// Scalar field is one of `values`.
    pub fn is_in<F, E>(values: impl IntoIterator<Item = F>, extractor: E) -> Self
    where
        F: PartialEq + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        let values: Vec<F> = values.into_iter().collect();
        let label = format!("{values:?}");
        let test = move |item: &T| -> Result<bool> {
            Ok(values.contains(&extractor(item)))
        };
        Self::array(ArrayOp::In, label, test)
    }

    /// Scalar field is none of `values`.
    pub fn not_in<F, E>(values: impl IntoIterator<Item = F>, extractor: E) -> Self
    where
        F: PartialEq + fmt::Debug + Send + Sync + 'static,
        E: Fn(&T) -> F + Send + Sync + 'static,
    {
        let values: Vec<F> = values.into_iter().collect();
        let label = format!("{values:?}");
        let test = move |item: &T| -> Result<bool> {
            Ok(!values.contains(&extractor(item)))
        };
        Self::array(ArrayOp::NotIn, label, test)
    }

    fn array<P>(op: ArrayOp, values: String, test: P) -> Self
    where
        P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
    {
        Constraint {
            kind: Kind::Array {
                op,
                values,
                test: Arc::new(test),
            },
        }
    }

    // ========================================================================
    // Custom predicates
    // ========================================================================

    /// Matches when `predicate` returns `true`.
    pub fn custom<P>(predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Constraint {
            kind: Kind::Custom {
                label: None,
                test: Arc::new(move |item: &T| -> Result<bool> { Ok(predicate(item)) }),
            },
        }
    }

    /// Matches when a fallible `predicate` returns `Ok(true)`.
    ///
    /// An `Err` aborts evaluation and surfaces as [`QueryError::Extractor`].
    pub fn try_custom<P, X>(predicate: P) -> Self
    where
        P: Fn(&T) -> std::result::Result<bool, X> + Send + Sync + 'static,
        X: Into<BoxError>,
    {
        let test = move |item: &T| -> Result<bool> {
            predicate(item).map_err(|e| QueryError::Extractor(e.into()))
        };
        Constraint {
            kind: Kind::Custom {
                label: None,
                test: Arc::new(test),
            },
        }
    }

    /// Matches when the extracted string matches the regular expression.
    ///
    /// The pattern is compiled here; an invalid pattern is a configuration error.
    pub fn pattern<S, E>(pattern: &str, extractor: E) -> Result<Self>
    where
        S: AsRef<str>,
        E: Fn(&T) -> S + Send + Sync + 'static,
    {
        let regex = Regex::new(pattern).map_err(ConfigurationError::from)?;
        let label = format!("pattern /{}/", regex.as_str());
        let test = move |item: &T| -> Result<bool> {
            Ok(regex.is_match(extractor(item).as_ref()))
        };
        Ok(Constraint {
            kind: Kind::Custom {
                label: Some(label),
                test: Arc::new(test),
            },
        })
    }
}

impl<T> Constraint<T> {
    // ========================================================================
    // Compound
    // ========================================================================

    /// Combines `children` with `op`.
    ///
    /// `And`/`Or` need at least one child and `Not` exactly one; anything else
    /// fails with [`ConfigurationError::ChildCount`].
    pub fn compound(op: LogicOp, children: Vec<Constraint<T>>) -> Result<Self> {
        op.check_arity(children.len())
            .map_err(|expected| ConfigurationError::ChildCount {
                op,
                expected,
                actual: children.len(),
            })?;
        Ok(Constraint {
            kind: Kind::Compound { op, children },
        })
    }

    /// All of `children` match.
    pub fn and(children: Vec<Constraint<T>>) -> Result<Self> {
        Self::compound(LogicOp::And, children)
    }

    /// Any of `children` matches.
    pub fn or(children: Vec<Constraint<T>>) -> Result<Self> {
        Self::compound(LogicOp::Or, children)
    }

    /// `child` does not match.
    pub fn not(child: Constraint<T>) -> Self {
        Constraint {
            kind: Kind::Compound {
                op: LogicOp::Not,
                children: vec![child],
            },
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Evaluates this constraint against one item.
    ///
    /// Compound children are evaluated left to right: `and` stops at the first
    /// non-match, `or` at the first match. Errors from fallible predicates are
    /// returned unchanged.
    pub fn matches(&self, item: &T) -> Result<bool> {
        match &self.kind {
            Kind::Boolean {
                expected,
                extractor,
            } => Ok(extractor(item) == *expected),
            Kind::Comparison { test, .. }
            | Kind::Range { test, .. }
            | Kind::Array { test, .. }
            | Kind::Custom { test, .. } => test(item),
            Kind::DateRange {
                start,
                end,
                ignore_time,
                extractor,
            } => {
                let field = extractor(item);
                if *ignore_time {
                    let day = field.date_naive();
                    Ok(start.date_naive() <= day && day <= end.date_naive())
                } else {
                    Ok(*start <= field && field <= *end)
                }
            }
            Kind::Compound { op, children } => match op {
                LogicOp::And => all_match(children, item),
                LogicOp::Or => any_match(children, item),
                // arity is checked at construction, so this negates the only child
                LogicOp::Not => Ok(!all_match(children, item)?),
            },
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Renders this constraint tree for diagnostics, e.g. `and(lt 100, is true)`.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Returns which variant this constraint is.
    pub fn kind(&self) -> ConstraintKind {
        match &self.kind {
            Kind::Boolean { .. } => ConstraintKind::Boolean,
            Kind::Comparison { .. } => ConstraintKind::Comparison,
            Kind::Range { .. } => ConstraintKind::Range,
            Kind::DateRange { .. } => ConstraintKind::DateRange,
            Kind::Array { .. } => ConstraintKind::Array,
            Kind::Compound { .. } => ConstraintKind::Compound,
            Kind::Custom { .. } => ConstraintKind::Custom,
        }
    }

    /// Returns the child constraints of a compound, or an empty slice.
    pub fn children(&self) -> &[Constraint<T>] {
        match &self.kind {
            Kind::Compound { children, .. } => children,
            _ => &[],
        }
    }

    /// Returns the logical operator of a compound.
    pub fn logic_op(&self) -> Option<LogicOp> {
        match &self.kind {
            Kind::Compound { op, .. } => Some(*op),
            _ => None,
        }
    }
}

fn all_match<T>(children: &[Constraint<T>], item: &T) -> Result<bool> {
    for child in children {
        if !child.matches(item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_match<T>(children: &[Constraint<T>], item: &T) -> Result<bool> {
    for child in children {
        if child.matches(item)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn compare_field<F: PartialOrd>(op: CompareOp, equality: Equality, field: &F, value: &F) -> bool {
    match (op, equality) {
        (CompareOp::Eq, Equality::Value) => field == value,
        (CompareOp::Ne, Equality::Value) => field != value,
        _ => field
            .partial_cmp(value)
            .is_some_and(|ordering| op.eval_ordering(ordering)),
    }
}

impl<T> Clone for Constraint<T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            Kind::Boolean {
                expected,
                extractor,
            } => Kind::Boolean {
                expected: *expected,
                extractor: Arc::clone(extractor),
            },
            Kind::Comparison {
                op,
                equality,
                value,
                test,
            } => Kind::Comparison {
                op: *op,
                equality: *equality,
                value: value.clone(),
                test: Arc::clone(test),
            },
            Kind::Range { min, max, test } => Kind::Range {
                min: min.clone(),
                max: max.clone(),
                test: Arc::clone(test),
            },
            Kind::DateRange {
                start,
                end,
                ignore_time,
                extractor,
            } => Kind::DateRange {
                start: *start,
                end: *end,
                ignore_time: *ignore_time,
                extractor: Arc::clone(extractor),
            },
            Kind::Array { op, values, test } => Kind::Array {
                op: *op,
                values: values.clone(),
                test: Arc::clone(test),
            },
            Kind::Compound { op, children } => Kind::Compound {
                op: *op,
                children: children.clone(),
            },
            Kind::Custom { label, test } => Kind::Custom {
                label: label.clone(),
                test: Arc::clone(test),
            },
        };
        Constraint { kind }
    }
}

impl<T> fmt::Display for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Boolean { expected, .. } => write!(f, "is {expected}"),
            Kind::Comparison {
                op,
                equality,
                value,
                ..
            } => match equality {
                Equality::Ordering if op.is_equality() => write!(f, "{op} {value} (by ordering)"),
                _ => write!(f, "{op} {value}"),
            },
            Kind::Range { min, max, .. } => write!(f, "range [{min}, {max}]"),
            Kind::DateRange {
                start,
                end,
                ignore_time,
                ..
            } => {
                if *ignore_time {
                    write!(f, "dates [{}, {}]", start.date_naive(), end.date_naive())
                } else {
                    write!(f, "dates [{}, {}]", start.to_rfc3339(), end.to_rfc3339())
                }
            }
            Kind::Array { op, values, .. } => write!(f, "{op} {values}"),
            Kind::Compound { op, children } => {
                write!(f, "{op}(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
            Kind::Custom { label, .. } => write!(f, "{}", label.as_deref().unwrap_or("custom")),
        }
    }
}

impl<T> fmt::Debug for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constraint")
            .field(&self.kind())
            .field(&self.to_string())
            .finish()
    }
}
