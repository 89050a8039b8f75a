use crate::storage::RunId;

/// A run written by the run generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortedRun {
    run: RunId,
    records: usize,
}

impl SortedRun {
    pub(crate) fn new(run: RunId, records: usize) -> SortedRun {
        SortedRun {
            run,
            records,
        }
    }

    /// Storage identifier of this run
    pub fn run(&self) -> RunId {
        self.run
    }

    /// Number of records in this run
    pub fn records(&self) -> usize {
        self.records
    }
}
