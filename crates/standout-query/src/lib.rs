//! Query - Composable constraints and a filter pipeline for in-memory collections.
//!
//! Query filters a slice of typed records against composable predicates,
//! optionally narrows it with a case-insensitive text search, sorts it by an
//! extracted key, and paginates the result. It supports:
//!
//! - Typed extractors: fields are read through closures, checked at compile time
//! - Constraint variants: boolean, comparison, range, date range, membership, custom
//! - Compound constraints: AND, OR, NOT trees with short-circuit evaluation
//! - Stable single-key sorting, ascending or descending
//! - Pagination with limit and offset, fused into the scan when possible
//! - Cooperative yielding so large scans don't monopolize the caller's thread
//!
//! # Quick Start
//!
//! ```rust
//! use standout_query::{Constraint, Pipeline};
//!
//! #[derive(Debug)]
//! struct Product {
//!     name: String,
//!     price: u32,
//!     tags: Vec<String>,
//! }
//!
//! let products = vec![
//!     Product { name: "Red Shoe".into(), price: 10, tags: vec!["sale".into()] },
//!     Product { name: "Blue Hat".into(), price: 200, tags: vec!["new".into()] },
//!     Product { name: "Green Shoe".into(), price: 50, tags: vec!["sale".into(), "new".into()] },
//! ];
//!
//! let pipeline = Pipeline::builder(|p: &Product| [p.name.clone()])
//!     .constraint(Constraint::lt(100, |p: &Product| p.price))
//!     .constraint(Constraint::contains_any(["sale".to_string()], |p: &Product| p.tags.clone()))
//!     .sort_by(|p: &Product| p.price)
//!     .descending()
//!     .limit(10)
//!     .build()
//!     .unwrap();
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let results = runtime.block_on(pipeline.filter_and_sort(&products)).unwrap();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].name, "Green Shoe");
//! ```
//!
//! # Pipeline Semantics
//!
//! Each invocation is stateless and runs these stages in order:
//!
//! ```text
//! match = (all root constraints match, left to right)
//!       ∧ (search term is blank, OR some search field contains it)
//! result = paginate(sort(matches))
//! ```
//!
//! - **No sort key, limit set**: one pass that skips `offset` matches and stops
//!   as soon as `limit` results are collected.
//! - **Otherwise**: every match is collected, stable-sorted if a key is set,
//!   then `offset`/`limit` are applied.
//!
//! # Constraint Variants
//!
//! | Variant | Constructors |
//! |---------|--------------|
//! | Boolean | `boolean`, `is` |
//! | Comparison | `compare`, `compare_with`, `eq`, `ne`, `gt`, `gte`, `lt`, `lte` |
//! | Range | `range` |
//! | DateRange | `date_range` |
//! | Array | `contains`, `contains_any`, `is_in`, `not_in` |
//! | Compound | `compound`, `and`, `or`, `not` |
//! | Custom | `custom`, `try_custom`, `pattern` |
//!
//! # Errors
//!
//! Invalid configurations (inverted ranges, wrong compound arity, bad regex
//! patterns) are rejected by the constructors. During execution, a failing
//! predicate or an incomparable sort key aborts the call; see [`QueryError`].

mod constraint;
mod error;
mod observer;
mod op;
mod ordering;
mod pipeline;
mod search;

// Re-export public API
pub use constraint::{Constraint, ConstraintKind};
pub use error::{BoxError, ConfigurationError, QueryError, Result};
pub use observer::{Observer, PipelineEvent, ScanPath};
pub use op::{ArrayOp, CompareOp, Equality, LogicOp};
pub use ordering::{compare_keys, Dir, SortKey};
pub use pipeline::{Pipeline, PipelineBuilder, DEFAULT_YIELD_INTERVAL};
pub use search::SearchTerm;
