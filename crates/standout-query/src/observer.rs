//! Per-invocation diagnostics.
//!
//! A pipeline reports what it is doing to an optional observer passed in
//! through its builder. Nothing here is global; two pipelines never share an
//! observer unless the caller hands them the same one.

use std::fmt;
use std::sync::Arc;

/// Which scan strategy an invocation took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanPath {
    /// Single pass with pagination fused in, stopping once the page is full.
    Fast,
    /// Collect every match, then sort and paginate.
    General,
}

impl ScanPath {
    /// Returns the display name of this path.
    pub fn as_str(self) -> &'static str {
        match self {
            ScanPath::Fast => "fast",
            ScanPath::General => "general",
        }
    }
}

impl fmt::Display for ScanPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Something a pipeline did during one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Scanning is about to begin.
    Started { path: ScanPath, total: usize },
    /// Control was handed back to the scheduler after `scanned` items.
    Yielded { scanned: usize },
    /// Matches were sorted.
    Sorted { count: usize },
    /// The invocation produced its result.
    Finished {
        path: ScanPath,
        scanned: usize,
        matched: usize,
        returned: usize,
    },
}

/// Callback receiving [`PipelineEvent`]s.
pub type Observer = Arc<dyn Fn(&PipelineEvent) + Send + Sync>;
