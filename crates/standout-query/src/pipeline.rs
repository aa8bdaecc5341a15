//! Pipeline builder and executor.
//!
//! A [`Pipeline`] bundles everything one query needs: root constraints, an
//! optional search term, an optional sort key, and pagination. Running it is
//! a linear staged computation:
//!
//! ```text
//! Scan (constraints, then search) -> Sort (if keyed) -> Paginate
//! ```
//!
//! When there is no sort key but a limit is set, scan and paginate are fused
//! into one pass that stops as soon as the page is full. Otherwise every match
//! is collected first, since a global sort needs all of them.
//!
//! Execution is `async` only so the scan can hand control back to the
//! caller's scheduler every few hundred items. No threads are spawned and the
//! yields never change the result.

use tracing::{debug, trace};

use crate::constraint::Constraint;
use crate::error::{ConfigurationError, Result};
use crate::observer::{Observer, PipelineEvent, ScanPath};
use crate::ordering::{Dir, SortKey};
use crate::search::{SearchFields, SearchTerm};

/// Number of scanned items between cooperative yields.
pub const DEFAULT_YIELD_INTERVAL: usize = 500;

/// An immutable, validated query over items of type `T`.
///
/// # Example
///
/// ```
/// use standout_query::{Constraint, Pipeline};
///
/// #[derive(Debug, PartialEq)]
/// struct Product {
///     name: String,
///     price: u32,
/// }
///
/// let products = vec![
///     Product { name: "Red Shoe".into(), price: 10 },
///     Product { name: "Blue Hat".into(), price: 200 },
///     Product { name: "Green Shoe".into(), price: 50 },
/// ];
///
/// let pipeline = Pipeline::builder(|p: &Product| [p.name.clone()])
///     .constraint(Constraint::lt(100, |p: &Product| p.price))
///     .search("shoe")
///     .sort_by(|p: &Product| p.price)
///     .descending()
///     .build()
///     .unwrap();
///
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let results = runtime.block_on(pipeline.filter_and_sort(&products)).unwrap();
/// assert_eq!(results[0].name, "Green Shoe");
/// assert_eq!(results[1].name, "Red Shoe");
/// ```
pub struct Pipeline<T> {
    constraints: Vec<Constraint<T>>,
    search: Option<SearchTerm>,
    search_fields: SearchFields<T>,
    sort_key: Option<SortKey<T>>,
    dir: Dir,
    limit: Option<usize>,
    offset: Option<usize>,
    yield_every: usize,
    observer: Option<Observer>,
}

/// Fluent builder for [`Pipeline`].
pub struct PipelineBuilder<T> {
    constraints: Vec<Constraint<T>>,
    search: Option<String>,
    search_fields: SearchFields<T>,
    sort_key: Option<SortKey<T>>,
    dir: Dir,
    limit: Option<usize>,
    offset: Option<usize>,
    yield_every: usize,
    observer: Option<Observer>,
}

impl<T: 'static> Pipeline<T> {
    /// Starts building a pipeline.
    ///
    /// `search_fields` returns the strings an item is searched by. It is
    /// required even when no search term is set, so a term can be added
    /// without rebuilding the rest of the configuration.
    pub fn builder<E, I, S>(search_fields: E) -> PipelineBuilder<T>
    where
        E: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PipelineBuilder {
            constraints: Vec::new(),
            search: None,
            search_fields: SearchFields::new(search_fields),
            sort_key: None,
            dir: Dir::Asc,
            limit: None,
            offset: None,
            yield_every: DEFAULT_YIELD_INTERVAL,
            observer: None,
        }
    }
}

impl<T: 'static> PipelineBuilder<T> {
    // ========================================================================
    // Filtering
    // ========================================================================

    /// Adds a root constraint. Root constraints are AND-ed in order.
    pub fn constraint(mut self, constraint: Constraint<T>) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds several root constraints.
    pub fn constraints<I>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = Constraint<T>>,
    {
        self.constraints.extend(constraints);
        self
    }

    /// Sets the search term. A blank term disables searching.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Sorts matches by the extracted key.
    pub fn sort_by<K, E>(mut self, extractor: E) -> Self
    where
        K: PartialOrd + 'static,
        E: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sort_key = Some(SortKey::new(extractor));
        self
    }

    /// Sets the sort direction.
    pub fn order(mut self, dir: Dir) -> Self {
        self.dir = dir;
        self
    }

    /// Sets the sort direction from an `ascending` flag.
    pub fn ascending(self, ascending: bool) -> Self {
        self.order(Dir::from_ascending(ascending))
    }

    /// Sorts largest first.
    pub fn descending(self) -> Self {
        self.order(Dir::Desc)
    }

    // ========================================================================
    // Limits
    // ========================================================================

    /// Sets the maximum number of results to return.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the number of matches to skip.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    // ========================================================================
    // Scheduling and diagnostics
    // ========================================================================

    /// Sets how many items are scanned between cooperative yields.
    pub fn yield_every(mut self, n: usize) -> Self {
        self.yield_every = n;
        self
    }

    /// Installs a callback receiving [`PipelineEvent`]s for each invocation.
    pub fn observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.observer = Some(std::sync::Arc::new(observer));
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Validates the configuration and freezes it.
    pub fn build(self) -> Result<Pipeline<T>> {
        if self.yield_every == 0 {
            return Err(ConfigurationError::ZeroYieldInterval.into());
        }
        Ok(Pipeline {
            constraints: self.constraints,
            search: self.search.as_deref().and_then(SearchTerm::new),
            search_fields: self.search_fields,
            sort_key: self.sort_key,
            dir: self.dir,
            limit: self.limit,
            offset: self.offset,
            yield_every: self.yield_every,
            observer: self.observer,
        })
    }
}

impl<T> Pipeline<T> {
    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the root constraints.
    pub fn constraints(&self) -> &[Constraint<T>] {
        &self.constraints
    }

    /// Returns the normalized search term, if searching is enabled.
    pub fn search_term(&self) -> Option<&SearchTerm> {
        self.search.as_ref()
    }

    /// Returns `true` if a sort key is configured.
    pub fn is_sorted(&self) -> bool {
        self.sort_key.is_some()
    }

    /// Returns the sort direction.
    pub fn dir(&self) -> Dir {
        self.dir
    }

    /// Returns the limit, if set.
    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the offset, if set.
    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    /// Returns the yield interval.
    pub fn get_yield_every(&self) -> usize {
        self.yield_every
    }

    /// Returns the strategy an invocation over a non-empty input will use.
    pub fn scan_path(&self) -> ScanPath {
        match (&self.sort_key, self.limit) {
            (None, Some(_)) => ScanPath::Fast,
            _ => ScanPath::General,
        }
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests one item against the root constraints and the search term.
    ///
    /// Constraints are checked in order and the first failure short-circuits,
    /// so the search fields are only extracted for items that pass them.
    pub fn matches(&self, item: &T) -> Result<bool> {
        for constraint in &self.constraints {
            if !constraint.matches(item)? {
                return Ok(false);
            }
        }
        Ok(match &self.search {
            Some(term) => self.search_fields.matches(item, term),
            None => true,
        })
    }

    /// Filters, sorts and paginates `items`, returning references into it.
    ///
    /// The input is never modified. The first error from a predicate aborts
    /// the whole call.
    pub async fn filter_and_sort<'a>(&self, items: &'a [T]) -> Result<Vec<&'a T>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let path = self.scan_path();
        debug!(
            path = %path,
            total = items.len(),
            constraints = self.constraints.len(),
            search = self.search.is_some(),
            "Running filter pipeline"
        );
        self.emit(&PipelineEvent::Started {
            path,
            total: items.len(),
        });

        match (path, self.limit) {
            (ScanPath::Fast, Some(limit)) => self.scan_page(items, limit).await,
            _ => self.scan_all(items).await,
        }
    }

    /// Like [`filter_and_sort`](Self::filter_and_sort), cloning the results.
    pub async fn filter_and_sort_cloned(&self, items: &[T]) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let results = self.filter_and_sort(items).await?;
        Ok(results.into_iter().cloned().collect())
    }

    /// Counts every match, ignoring sort and pagination.
    pub async fn count(&self, items: &[T]) -> Result<usize> {
        let mut count = 0;
        for (index, item) in items.iter().enumerate() {
            self.checkpoint(index).await;
            if self.matches(item)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Fast path: one pass, skipping `offset` matches and stopping at `limit`.
    async fn scan_page<'a>(&self, items: &'a [T], limit: usize) -> Result<Vec<&'a T>> {
        let offset = self.offset.unwrap_or(0);
        let mut results = Vec::with_capacity(limit.min(items.len()));
        let mut matched = 0;
        let mut scanned = 0;

        if limit > 0 {
            for (index, item) in items.iter().enumerate() {
                self.checkpoint(index).await;
                scanned += 1;
                if !self.matches(item)? {
                    continue;
                }
                matched += 1;
                if matched > offset {
                    results.push(item);
                    if results.len() == limit {
                        break;
                    }
                }
            }
        }

        self.finish(ScanPath::Fast, scanned, matched, results.len());
        Ok(results)
    }

    /// General path: collect every match, sort if keyed, then paginate.
    async fn scan_all<'a>(&self, items: &'a [T]) -> Result<Vec<&'a T>> {
        let mut matches = Vec::new();
        for (index, item) in items.iter().enumerate() {
            self.checkpoint(index).await;
            if self.matches(item)? {
                matches.push(item);
            }
        }
        let matched = matches.len();

        if let Some(key) = &self.sort_key {
            key.sort(&mut matches, self.dir)?;
            debug!(count = matched, dir = %self.dir, "Sorted matches");
            self.emit(&PipelineEvent::Sorted { count: matched });
            self.yield_now(items.len()).await;
        }

        let results = paginate(matches, self.offset.unwrap_or(0), self.limit);
        self.finish(ScanPath::General, items.len(), matched, results.len());
        Ok(results)
    }

    async fn checkpoint(&self, index: usize) {
        if index > 0 && index % self.yield_every == 0 {
            self.yield_now(index).await;
        }
    }

    async fn yield_now(&self, scanned: usize) {
        trace!(scanned, "Yielding to scheduler");
        self.emit(&PipelineEvent::Yielded { scanned });
        tokio::task::yield_now().await;
    }

    fn finish(&self, path: ScanPath, scanned: usize, matched: usize, returned: usize) {
        debug!(path = %path, scanned, matched, returned, "Filter pipeline finished");
        self.emit(&PipelineEvent::Finished {
            path,
            scanned,
            matched,
            returned,
        });
    }

    fn emit(&self, event: &PipelineEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }
}

/// Drops the first `offset` items and keeps at most `limit` of the rest.
fn paginate<'a, T>(mut items: Vec<&'a T>, offset: usize, limit: Option<usize>) -> Vec<&'a T> {
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Pipeline {
            constraints: self.constraints.clone(),
            search: self.search.clone(),
            search_fields: self.search_fields.clone(),
            sort_key: self.sort_key.clone(),
            dir: self.dir,
            limit: self.limit,
            offset: self.offset,
            yield_every: self.yield_every,
            observer: self.observer.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("constraints", &self.constraints)
            .field("search", &self.search)
            .field("sort_key", &self.sort_key)
            .field("dir", &self.dir)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("yield_every", &self.yield_every)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
