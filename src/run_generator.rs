use std::cmp::min;
use std::path::Path;

use csv::{StringRecord, WriterBuilder};

use crate::config::Config;
use crate::error::{Result, SortError};
use crate::input::InputReader;
use crate::key::Key;
use crate::progress::SortObserver;
use crate::sorted_run::SortedRun;
use crate::storage::RunStorage;

/// Runs written for one input and the header read from it
#[derive(Debug)]
pub(crate) struct GeneratedRuns {
    runs: Vec<SortedRun>,
    header: StringRecord,
    records: u64,
}

impl GeneratedRuns {
    pub(crate) fn runs(&self) -> &Vec<SortedRun> {
        &self.runs
    }

    pub(crate) fn header(&self) -> &StringRecord {
        &self.header
    }

    pub(crate) fn records(&self) -> u64 {
        self.records
    }
}

const INITIAL_BATCH_ALLOCATION: usize = 4096;

/// Splits the input into sorted runs of at most `batch_capacity` records
pub(crate) struct RunGenerator<'a> {
    config: &'a Config,
    storage: &'a dyn RunStorage,
    observer: &'a dyn SortObserver,
}

impl<'a> RunGenerator<'a> {
    pub(crate) fn new(
        config: &'a Config,
        storage: &'a dyn RunStorage,
        observer: &'a dyn SortObserver,
    ) -> RunGenerator<'a> {
        RunGenerator {
            config,
            storage,
            observer,
        }
    }

    /// Write the sorted runs for `input`. On failure every run written so far is removed.
    pub(crate) fn generate(&self, input: &Path, key_index: usize) -> Result<GeneratedRuns> {
        log::info!(
            "Start generating runs from {}, batch capacity: {}",
            input.to_string_lossy(),
            self.config.batch_capacity()
        );
        let mut reader = InputReader::open(input, self.config.delimiter())?;
        let header = reader.header().clone();

        let mut runs = Vec::new();
        match self.scan(&mut reader, key_index, &mut runs) {
            Ok(records) => {
                log::info!("Finish generating runs, runs: {}, records: {}", runs.len(), records);
                Ok(
                    GeneratedRuns {
                        runs,
                        header,
                        records,
                    }
                )
            }
            Err(e) => {
                log::warn!("Run generation failed, removing {} runs: {}", runs.len(), e);
                discard_runs(self.storage, &runs);
                Err(e)
            }
        }
    }

    fn scan(
        &self,
        reader: &mut InputReader,
        key_index: usize,
        runs: &mut Vec<SortedRun>,
    ) -> Result<u64> {
        let batch_capacity = self.config.batch_capacity();
        // the batch grows as records arrive, a huge capacity must not be allocated up front
        let mut batch: Vec<(Key, StringRecord)> =
            Vec::with_capacity(min(batch_capacity, INITIAL_BATCH_ALLOCATION));
        let mut records: u64 = 0;
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let key = Key::coerce_field(record.get(key_index));
            batch.push((key, std::mem::take(&mut record)));
            records += 1;
            if batch.len() >= batch_capacity {
                self.flush(&mut batch, runs)?;
            }
        }
        if !batch.is_empty() {
            self.flush(&mut batch, runs)?;
        }
        Ok(records)
    }

    fn flush(&self, batch: &mut Vec<(Key, StringRecord)>, runs: &mut Vec<SortedRun>) -> Result<()> {
        let compare = self.config.order().comparator();
        // sort_by is stable, equal keys keep their input order
        batch.sort_by(|a, b| compare(&a.0, &b.0));

        let (run, run_writer) = self.storage.create()?;
        let sorted_run = SortedRun::new(run, batch.len());
        runs.push(sorted_run);

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.config.delimiter())
            .from_writer(run_writer);
        for (_key, record) in batch.drain(..) {
            writer
                .write_record(&record)
                .map_err(|e| SortError::csv(format!("write {}", run), e))?;
        }
        writer
            .flush()
            .map_err(|e| SortError::io(format!("flush {}", run), e))?;

        log::debug!("Flushed {}, records: {}", run, sorted_run.records());
        self.observer.on_run_created(&sorted_run);
        Ok(())
    }
}

/// Remove `runs`, logging failures. Returns the first failure.
pub(crate) fn discard_runs(storage: &dyn RunStorage, runs: &[SortedRun]) -> Option<SortError> {
    let mut first_error = None;
    for sorted_run in runs {
        if let Err(e) = storage.remove(sorted_run.run()) {
            log::warn!("Failed to remove {}: {}", sorted_run.run(), e);
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }
    first_error
}
