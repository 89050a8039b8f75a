//! Reading the input file.
//!
//! The csv reader skips blank lines without reporting them. [InputReader] notices them and keeps
//! every line accountable: with a single column a blank line is a record holding one empty field,
//! with more columns it is a malformed record.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{Result, SortError};

const QUOTE: u8 = b'"';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BlankLine {
    offset: u64,
    line: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Passes bytes through to the csv reader and records where blank lines start.
///
/// Quoting is followed the way the csv reader follows it, so line breaks inside quoted fields are
/// not taken for blank lines.
struct BlankLineTracker<R> {
    inner: R,
    delimiter: u8,
    state: ScanState,
    offset: u64,
    line: u64,
    line_start: u64,
    line_empty: bool,
    blanks: Rc<RefCell<VecDeque<BlankLine>>>,
}

impl<R: Read> BlankLineTracker<R> {
    fn new(
        inner: R,
        delimiter: u8,
        blanks: Rc<RefCell<VecDeque<BlankLine>>>,
    ) -> BlankLineTracker<R> {
        BlankLineTracker {
            inner,
            delimiter,
            state: ScanState::FieldStart,
            offset: 0,
            line: 1,
            line_start: 0,
            line_empty: true,
            blanks,
        }
    }

    fn scan(&mut self, b: u8) {
        let line_end = match self.state {
            ScanState::Quoted => {
                if b == QUOTE {
                    self.state = ScanState::QuoteInQuoted;
                }
                false
            }
            ScanState::FieldStart | ScanState::Unquoted | ScanState::QuoteInQuoted => {
                if b == b'\n' {
                    true
                } else {
                    self.state = if b == self.delimiter {
                        ScanState::FieldStart
                    } else if b == QUOTE && self.state != ScanState::Unquoted {
                        ScanState::Quoted
                    } else if b == b'\r' {
                        self.state
                    } else {
                        ScanState::Unquoted
                    };
                    false
                }
            }
        };

        if b == b'\n' {
            if line_end {
                if self.line_empty {
                    let blank = BlankLine { offset: self.line_start, line: self.line };
                    self.blanks.borrow_mut().push_back(blank);
                }
                self.state = ScanState::FieldStart;
                self.line_start = self.offset + 1;
                self.line_empty = true;
            }
            self.line += 1;
        } else if b != b'\r' {
            self.line_empty = false;
        }
    }
}

impl<R: Read> Read for BlankLineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &b in &buf[..n] {
            self.scan(b);
            self.offset += 1;
        }
        Ok(n)
    }
}

/// Reader over the data records of the input, the header is read on open
pub(crate) struct InputReader {
    reader: csv::Reader<BlankLineTracker<File>>,
    header: StringRecord,
    blanks: Rc<RefCell<VecDeque<BlankLine>>>,
    consumed: u64,
    pending: Option<StringRecord>,
    done: bool,
}

impl InputReader {
    /// Open `input` and read its header.
    ///
    /// A missing file is reported as [SortError::NotFound], a file without a header as
    /// [SortError::EmptyInput].
    pub(crate) fn open(input: &Path, delimiter: u8) -> Result<InputReader> {
        let file = File::open(input).map_err(|e| SortError::open_input(input, e))?;
        let blanks = Rc::new(RefCell::new(VecDeque::new()));
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(BlankLineTracker::new(file, delimiter, blanks.clone()));
        let header = reader
            .headers()
            .map_err(|e| {
                SortError::csv(format!("read header of {}", input.to_string_lossy()), e)
            })?
            .clone();
        if header.is_empty() {
            return Err(SortError::EmptyInput { path: input.to_string_lossy().to_string() });
        }

        // blank lines before the header are not data
        let consumed = reader.position().byte();
        blanks.borrow_mut().retain(|blank| blank.offset >= consumed);
        Ok(
            InputReader {
                reader,
                header,
                blanks,
                consumed,
                pending: None,
                done: false,
            }
        )
    }

    pub(crate) fn header(&self) -> &StringRecord {
        &self.header
    }

    /// Read the next data record in input order, returns false once the input is exhausted
    pub(crate) fn read_record(&mut self, record: &mut StringRecord) -> Result<bool> {
        loop {
            let blank = {
                let mut blanks = self.blanks.borrow_mut();
                match blanks.front().copied() {
                    Some(blank) if blank.offset < self.consumed => blanks.pop_front(),
                    _ => None,
                }
            };
            if let Some(blank) = blank {
                return self.blank_record(blank, record);
            }

            if let Some(pending) = self.pending.take() {
                *record = pending;
                return Ok(true);
            }

            if self.done {
                return Ok(false);
            }

            let more = self.reader
                .read_record(record)
                .map_err(|e| SortError::csv("read input record", e))?;
            self.consumed = self.reader.position().byte();
            if more {
                self.pending = Some(std::mem::take(record));
            } else {
                self.done = true;
            }
        }
    }

    fn blank_record(&self, blank: BlankLine, record: &mut StringRecord) -> Result<bool> {
        if self.header.len() == 1 {
            *record = StringRecord::from(vec![""]);
            Ok(true)
        } else {
            Err(
                SortError::MalformedRecord {
                    line: blank.line,
                    expected: self.header.len(),
                    found: 0,
                }
            )
        }
    }
}
