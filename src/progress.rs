//! Progress state exposed to an external reporting layer.

use crate::sorted_run::SortedRun;

/// Phase of a sort
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Reading the header and resolving the key column
    ResolvingKey,
    /// Writing sorted runs
    GeneratingRuns,
    /// Merging runs into the output
    Merging,
    /// The output is in place
    Done,
}

/// Receives progress notifications during a sort. All methods default to doing nothing.
///
/// # Examples
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use csv_file_sort::progress::SortObserver;
/// use csv_file_sort::sorted_run::SortedRun;
///
/// #[derive(Default)]
/// struct RunCounter {
///     runs: AtomicUsize,
/// }
///
/// impl SortObserver for RunCounter {
///     fn on_run_created(&self, _run: &SortedRun) {
///         self.runs.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait SortObserver {
    /// Called when the sort enters `phase`
    fn on_phase(&self, _phase: Phase) {}

    /// Called after each run is written
    fn on_run_created(&self, _run: &SortedRun) {}

    /// Called once the merge wrote `records` data records
    fn on_merged(&self, _records: u64) {}
}

/// Observer that ignores all notifications
pub struct NoopObserver;

impl SortObserver for NoopObserver {}
