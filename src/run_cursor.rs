use csv::{ReaderBuilder, StringRecord};

use crate::error::{Result, SortError};
use crate::storage::{RunId, RunStorage};

/// Sequential reader over one run
pub(crate) struct RunCursor {
    run: RunId,
    reader: csv::Reader<Box<dyn std::io::Read>>,
}

impl RunCursor {
    pub(crate) fn open(storage: &dyn RunStorage, run: RunId, delimiter: u8) -> Result<RunCursor> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .from_reader(storage.open(run)?);
        Ok(
            RunCursor {
                run,
                reader,
            }
        )
    }

    /// The next record, or `None` once the run is exhausted
    pub(crate) fn next_record(&mut self) -> Result<Option<StringRecord>> {
        let mut record = StringRecord::new();
        let more = self.reader
            .read_record(&mut record)
            .map_err(|e| SortError::csv(format!("read {}", self.run), e))?;
        if more {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }
}
