//! This crate implements an external sort for CSV and other delimited files that are too large to
//! be sorted in memory.
//!
//! The first row of the input is the header. The remaining records are sorted by one key column,
//! given by name or by zero based index, in ascending or descending order. Key values that parse as
//! numbers are compared numerically, all other values are compared as text, and numbers sort before
//! text. Records with equal keys keep their input order.
//!
//! The sort runs in two phases. The input is read in batches of a bounded number of records, each
//! batch is sorted in memory and written to a run. The runs are then merged with a priority queue
//! into the output, which is written next to the destination and renamed into place once every run
//! is removed. Runs never outlive the sort, whether it succeeds or fails.
//!
//! A blank line in the input is a record with one empty field. That is a valid record only when
//! the header has a single column, otherwise it is reported as malformed.
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use csv_file_sort::sort::Sort;
//!
//! fn sort_by_value(
//!     input: PathBuf,
//!     output: PathBuf,
//!     tmp: PathBuf,
//! ) -> Result<(), csv_file_sort::error::SortError> {
//!     let mut csv_file_sort = Sort::new(input, output, "value");
//!
//!     // set the number of records sorted in memory at a time. Each batch becomes one run.
//!     csv_file_sort.with_batch_capacity(100_000);
//!
//!     // set the directory for intermediate runs. The default is the system temp dir -
//!     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
//!     // directory for intermediate files, preferably on the same file system as the output.
//!     csv_file_sort.with_tmp_dir(tmp);
//!
//!     let summary = csv_file_sort.sort()?;
//!     log::info!("sorted {} records using {} runs", summary.records, summary.runs);
//!     Ok(())
//! }
//! ```
//!

pub(crate) mod config;
pub(crate) mod input;
pub(crate) mod merge;
pub(crate) mod run_cursor;
pub(crate) mod run_generator;

pub mod error;
pub mod field;
pub mod key;
pub mod order;
pub mod progress;
pub mod sort;
pub mod sorted_run;
pub mod storage;
