use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::Path;

use csv::{StringRecord, WriterBuilder};
use tempfile::{Builder, NamedTempFile};

use crate::config::Config;
use crate::error::{Result, SortError};
use crate::key::Key;
use crate::order::Comparator;
use crate::progress::SortObserver;
use crate::run_cursor::RunCursor;
use crate::run_generator::discard_runs;
use crate::sorted_run::SortedRun;
use crate::storage::RunStorage;

/// Head record of one run waiting in the merge queue
struct FrontierEntry {
    key: Key,
    record: StringRecord,
    ordinal: usize,
    compare: Comparator,
}

impl FrontierEntry {
    fn new(
        key_index: usize,
        record: StringRecord,
        ordinal: usize,
        compare: Comparator,
    ) -> FrontierEntry {
        FrontierEntry {
            key: Key::coerce_field(record.get(key_index)),
            record,
            ordinal,
            compare,
        }
    }
}

impl Eq for FrontierEntry {}

impl PartialEq<Self> for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd<Self> for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    // comparison is flipped to work with BinaryHeap (Max Heap), equal keys pop from the earlier run
    fn cmp(&self, other: &Self) -> Ordering {
        (self.compare)(&other.key, &self.key)
            .then_with(|| other.ordinal.cmp(&self.ordinal))
    }
}

/// K-way merge of sorted runs into the output file
pub(crate) struct Merger<'a> {
    config: &'a Config,
    storage: &'a dyn RunStorage,
    observer: &'a dyn SortObserver,
}

impl<'a> Merger<'a> {
    pub(crate) fn new(
        config: &'a Config,
        storage: &'a dyn RunStorage,
        observer: &'a dyn SortObserver,
    ) -> Merger<'a> {
        Merger {
            config,
            storage,
            observer,
        }
    }

    /// Merge `runs` into `output` and return the number of records written.
    ///
    /// The runs are removed whether or not the merge succeeds. The output is written to a
    /// temporary file next to `output` and renamed into place only after every run was removed,
    /// so a failed sort never leaves a new output behind.
    pub(crate) fn merge(
        &self,
        runs: &[SortedRun],
        key_index: usize,
        header: &StringRecord,
        output: &Path,
    ) -> Result<u64> {
        log::info!("Merging {} runs into {}", runs.len(), output.to_string_lossy());
        let merged = self.merge_runs(runs, key_index, header, output);
        let cleanup = discard_runs(self.storage, runs);
        match (merged, cleanup) {
            (Err(e), _) => {
                log::warn!("Merge into {} failed: {}", output.to_string_lossy(), e);
                Err(e)
            }
            (Ok(_), Some(e)) => {
                log::warn!(
                    "Run cleanup failed, {} is left untouched: {}",
                    output.to_string_lossy(),
                    e
                );
                Err(e)
            }
            (Ok((records, merged_file)), None) => {
                merged_file.persist(output).map_err(|e| {
                    let context = format!("rename merged output to {}", output.to_string_lossy());
                    SortError::io(context, e.error)
                })?;
                log::info!("Finished merging runs, merged length: {} records", records);
                self.observer.on_merged(records);
                Ok(records)
            }
        }
    }

    /// Merge into a temporary file next to `output`, the caller decides whether to persist it
    fn merge_runs(
        &self,
        runs: &[SortedRun],
        key_index: usize,
        header: &StringRecord,
        output: &Path,
    ) -> Result<(u64, NamedTempFile)> {
        let compare = self.config.order().comparator();
        let mut cursors: Vec<Option<RunCursor>> = Vec::with_capacity(runs.len());
        let mut frontier: BinaryHeap<FrontierEntry> = BinaryHeap::with_capacity(runs.len());
        for (ordinal, sorted_run) in runs.iter().enumerate() {
            let mut cursor =
                RunCursor::open(self.storage, sorted_run.run(), self.config.delimiter())?;
            match cursor.next_record()? {
                Some(record) => {
                    frontier.push(FrontierEntry::new(key_index, record, ordinal, compare));
                    cursors.push(Some(cursor));
                }
                None => cursors.push(None),
            }
        }

        let merged_file = self.create_output_tmp(output)?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.config.delimiter())
            .from_writer(merged_file);
        writer
            .write_record(header)
            .map_err(|e| SortError::csv("write header", e))?;

        let mut merged: u64 = 0;
        while let Some(entry) = frontier.pop() {
            writer
                .write_record(&entry.record)
                .map_err(|e| SortError::csv("write merged record", e))?;
            merged += 1;

            let next = match cursors[entry.ordinal].as_mut() {
                Some(cursor) => cursor.next_record()?,
                None => None,
            };
            match next {
                Some(record) => {
                    frontier.push(FrontierEntry::new(key_index, record, entry.ordinal, compare))
                }
                // exhausted, close the run early
                None => cursors[entry.ordinal] = None,
            }
        }

        writer
            .flush()
            .map_err(|e| SortError::io("flush merged output", e))?;
        let merged_file = writer.into_inner().map_err(|e| {
            let error = std::io::Error::new(e.error().kind(), e.error().to_string());
            SortError::io("flush merged output", error)
        })?;
        Ok((merged, merged_file))
    }

    fn create_output_tmp(&self, output: &Path) -> Result<NamedTempFile> {
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        Builder::new()
            .prefix(".merged-")
            .suffix(self.config.tmp_suffix())
            .tempfile_in(&dir)
            .map_err(|e| {
                SortError::io(format!("create merged output in {}", dir.to_string_lossy()), e)
            })
    }
}
