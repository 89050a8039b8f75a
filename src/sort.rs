use std::cmp::{max, min, Ordering};
use std::path::PathBuf;
use std::sync::Arc;

use csv::StringRecord;
use rlimit::{getrlimit, Resource, setrlimit};

use crate::config::Config;
use crate::error::Result;
use crate::field::Field;
use crate::key::Key;
use crate::merge::Merger;
use crate::order::Order;
use crate::progress::{NoopObserver, Phase, SortObserver};
use crate::input::InputReader;
use crate::run_generator::RunGenerator;
use crate::storage::{RunStorage, TempDirStorage};

/// Outcome of a successful sort
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSummary {
    /// Number of runs written during run generation
    pub runs: usize,
    /// Number of data records written to the output
    pub records: u64,
}

/// Sort a CSV file by one key column
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use csv_file_sort::order::Order;
/// use csv_file_sort::sort::Sort;
///
/// fn sort_by_price(
///     input: PathBuf,
///     output: PathBuf,
///     tmp: PathBuf,
/// ) -> Result<(), csv_file_sort::error::SortError> {
///     let mut csv_file_sort = Sort::new(input, output, "price");
///     csv_file_sort.with_order(Order::Desc);
///     // number of records held in memory and written to each intermediate run
///     csv_file_sort.with_batch_capacity(100_000);
///     // directory for intermediate runs. The default is std::env::temp_dir(), for large files
///     // a dedicated directory on the same file system as the output is recommended.
///     csv_file_sort.with_tmp_dir(tmp);
///     csv_file_sort.sort()?;
///     Ok(())
/// }
/// ```
pub struct Sort {
    input: PathBuf,
    output: PathBuf,
    key: Field,
    order: Order,
    batch_capacity: usize,
    delimiter: u8,
    tmp: PathBuf,
    storage: Option<Arc<dyn RunStorage>>,
    observer: Arc<dyn SortObserver>,
}

impl Sort {
    /// Create a default Sort definition.
    ///
    /// * `key` is a column name or a zero based column index, see [Field]
    /// * the default order is [Order::Asc]
    /// * the default batch capacity is 1000 records
    /// * the default delimiter is ','
    /// * intermediate runs are written to std::env::temp_dir()
    ///
    /// The Sort implementation will increase the file descriptor rlimit to accommodate all runs
    /// being open during the merge.
    pub fn new(input: PathBuf, output: PathBuf, key: impl Into<Field>) -> Sort {
        Sort {
            input,
            output,
            key: key.into(),
            order: Order::Asc,
            batch_capacity: 1000,
            delimiter: b',',
            tmp: std::env::temp_dir(),
            storage: None,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Set [Order]
    pub fn with_order(&mut self, order: Order) {
        self.order = order
    }

    /// Set the number of records sorted in memory and written to each run. The default is 1000.
    pub fn with_batch_capacity(&mut self, batch_capacity: usize) {
        self.batch_capacity = batch_capacity;
    }

    /// Set the field delimiter. The default is ','
    pub fn with_delimiter(&mut self, delimiter: u8) {
        self.delimiter = delimiter
    }

    /// Set directory for intermediate runs. By default use std::env::temp_dir()
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = tmp;
    }

    /// Store intermediate runs in `storage` instead of the tmp directory
    pub fn with_storage(&mut self, storage: Arc<dyn RunStorage>) {
        self.storage = Some(storage);
    }

    /// Report progress to `observer`
    pub fn with_observer(&mut self, observer: Arc<dyn SortObserver>) {
        self.observer = observer;
    }

    /// Sort the input into the output.
    ///
    /// No intermediate run survives this call. On failure the output path is left untouched.
    pub fn sort(&self) -> Result<SortSummary> {
        log::info!(
            "Start sort of {} by {}, order: {:?}",
            self.input.to_string_lossy(),
            self.key,
            self.order
        );
        let result = self.internal_sort();
        match &result {
            Ok(summary) => {
                log::info!("Finish sort, runs: {}, records: {}", summary.runs, summary.records)
            }
            Err(e) => log::error!("Sort of {} failed: {}", self.input.to_string_lossy(), e),
        }
        result
    }

    /// Check whether the input is already sorted by the key in the configured order
    pub fn check(&self) -> Result<bool> {
        let config = self.create_config();
        let compare = config.order().comparator();
        let mut reader = InputReader::open(&self.input, config.delimiter())?;
        let key_index = self.key.resolve(reader.header())?;

        let mut previous: Option<Key> = None;
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let current = Key::coerce_field(record.get(key_index));
            if let Some(previous) = &previous {
                if compare(previous, &current) == Ordering::Greater {
                    return Ok(false);
                }
            }
            previous = Some(current);
        }
        Ok(true)
    }

    fn create_config(&self) -> Config {
        Config::new(
            self.tmp.clone(),
            "run-".to_string(),
            ".run".to_string(),
            self.delimiter,
            max(self.batch_capacity, 1),
            self.order,
        )
    }

    fn internal_sort(&self) -> Result<SortSummary> {
        let config = self.create_config();
        let observer = self.observer.as_ref();

        observer.on_phase(Phase::ResolvingKey);
        let key_index = {
            let reader = InputReader::open(&self.input, config.delimiter())?;
            self.key.resolve(reader.header())?
        };
        log::info!("Resolved key {} to column {}", self.key, key_index);

        let storage: Arc<dyn RunStorage> = match &self.storage {
            Some(storage) => storage.clone(),
            None => Arc::new(
                TempDirStorage::new(config.tmp().clone(), config.tmp_prefix(), config.tmp_suffix())
            ),
        };

        observer.on_phase(Phase::GeneratingRuns);
        let generated = RunGenerator::new(&config, storage.as_ref(), observer)
            .generate(&self.input, key_index)?;

        observer.on_phase(Phase::Merging);
        let restore = Self::raise_nofile_limit(generated.runs().len());
        let merged = Merger::new(&config, storage.as_ref(), observer)
            .merge(generated.runs(), key_index, generated.header(), &self.output);
        if let Some((soft, hard)) = restore {
            log::info!("Restore rlimit NOFILE, soft: {}, hard: {}", soft, hard);
            if let Err(e) = setrlimit(Resource::NOFILE, soft, hard) {
                log::warn!("Failed to restore rlimit NOFILE: {}", e);
            }
        }
        let records = merged?;
        debug_assert_eq!(records, generated.records());

        observer.on_phase(Phase::Done);
        Ok(
            SortSummary {
                runs: generated.runs().len(),
                records,
            }
        )
    }

    /// Raise the soft NOFILE limit so every run can be open at once. Returns the limits to restore.
    /// Failures are logged, the merge reports its own error if it runs out of descriptors.
    fn raise_nofile_limit(runs: usize) -> Option<(u64, u64)> {
        let (current_soft, current_hard) = match getrlimit(Resource::NOFILE) {
            Ok(limits) => limits,
            Err(e) => {
                log::warn!("getrlimit NOFILE failed: {}", e);
                return None;
            }
        };
        log::info!("Current rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
        let new_soft = min(max((runs + 256) as u64, current_soft), current_hard);
        if new_soft == current_soft {
            return None;
        }
        log::info!("Set new rlimit NOFILE, soft: {}, hard: {}", new_soft, current_hard);
        match setrlimit(Resource::NOFILE, new_soft, current_hard) {
            Ok(()) => Some((current_soft, current_hard)),
            Err(e) => {
                log::warn!("setrlimit NOFILE failed: {}", e);
                None
            }
        }
    }
}
