//! Storage for sorted runs.
//!
//! Runs are written once by the run generator, read once by the merger and then removed. The
//! [RunStorage] capability is handed to both phases so the sort never reaches for process wide
//! temporary state on its own. [TempDirStorage] keeps runs as uniquely named files in a directory,
//! [MemoryStorage] keeps them in memory.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::Builder;

use crate::error::{Result, SortError};

/// Identifier of a run within one [RunStorage]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    pub fn new(id: u64) -> RunId {
        RunId(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Creates, opens and removes runs.
pub trait RunStorage {
    /// Create a new empty run and return a writer for it. The writer must be flushed before the
    /// run is opened for reading.
    fn create(&self) -> Result<(RunId, Box<dyn Write>)>;

    /// Open an existing run for sequential reading
    fn open(&self, run: RunId) -> Result<Box<dyn Read>>;

    /// Remove a run
    fn remove(&self, run: RunId) -> Result<()>;
}

/// Runs stored as files in a directory
pub struct TempDirStorage {
    tmp: PathBuf,
    tmp_prefix: String,
    tmp_suffix: String,
    next: Cell<u64>,
    paths: RefCell<HashMap<RunId, PathBuf>>,
}

impl TempDirStorage {
    pub fn new(tmp: PathBuf, tmp_prefix: &str, tmp_suffix: &str) -> TempDirStorage {
        TempDirStorage {
            tmp,
            tmp_prefix: tmp_prefix.to_string(),
            tmp_suffix: tmp_suffix.to_string(),
            next: Cell::new(0),
            paths: RefCell::new(HashMap::new()),
        }
    }

    /// Path of a live run
    pub fn path(&self, run: RunId) -> Option<PathBuf> {
        self.paths.borrow().get(&run).cloned()
    }

    fn unknown(run: RunId) -> SortError {
        SortError::Storage {
            run,
            reason: "unknown run".to_string(),
        }
    }
}

impl RunStorage for TempDirStorage {
    fn create(&self) -> Result<(RunId, Box<dyn Write>)> {
        let tmp_file = Builder::new()
            .prefix(&self.tmp_prefix)
            .suffix(&self.tmp_suffix)
            .tempfile_in(&self.tmp)
            .map_err(|e| {
                SortError::io(format!("create run in {}", self.tmp.to_string_lossy()), e)
            })?;
        let (file, path) = tmp_file
            .keep()
            .map_err(|e| SortError::io("persist run", e.error))?;

        let run = RunId::new(self.next.get());
        self.next.set(run.id() + 1);
        log::debug!("Created {} at {}", run, path.to_string_lossy());
        self.paths.borrow_mut().insert(run, path);
        Ok((run, Box::new(BufWriter::new(file))))
    }

    fn open(&self, run: RunId) -> Result<Box<dyn Read>> {
        let path = self.path(run).ok_or_else(|| Self::unknown(run))?;
        let file = File::open(&path)
            .map_err(|e| SortError::io(format!("open {} at {}", run, path.to_string_lossy()), e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    /// Remove the run file. A file that is already gone counts as removed. On any other failure
    /// the run stays registered so the removal can be retried.
    fn remove(&self, run: RunId) -> Result<()> {
        let path = self.path(run).ok_or_else(|| Self::unknown(run))?;
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{} at {} was already removed", run, path.to_string_lossy());
            }
            Err(e) => {
                let context = format!("remove {} at {}", run, path.to_string_lossy());
                return Err(SortError::io(context, e));
            }
        }
        self.paths.borrow_mut().remove(&run);
        Ok(())
    }
}

type MemoryRuns = Arc<Mutex<BTreeMap<RunId, Vec<u8>>>>;

/// Runs held in memory.
///
/// Clones share the same runs, so a caller can keep a clone to inspect what a sort left behind.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    runs: MemoryRuns,
    next: Arc<Mutex<u64>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    /// Identifiers of the runs currently held
    pub fn runs(&self) -> Vec<RunId> {
        match self.runs.lock() {
            Ok(runs) => runs.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        }
    }

    fn poisoned(run: RunId) -> SortError {
        SortError::Storage {
            run,
            reason: "memory storage lock poisoned".to_string(),
        }
    }
}

impl RunStorage for MemoryStorage {
    fn create(&self) -> Result<(RunId, Box<dyn Write>)> {
        let mut next = self.next.lock().map_err(|_| Self::poisoned(RunId::new(0)))?;
        let run = RunId::new(*next);
        *next += 1;
        self.runs.lock().map_err(|_| Self::poisoned(run))?.insert(run, Vec::new());
        Ok((run, Box::new(MemoryRunWriter { runs: self.runs.clone(), run })))
    }

    fn open(&self, run: RunId) -> Result<Box<dyn Read>> {
        let runs = self.runs.lock().map_err(|_| Self::poisoned(run))?;
        let bytes = runs.get(&run).cloned().ok_or_else(|| SortError::Storage {
            run,
            reason: "unknown run".to_string(),
        })?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn remove(&self, run: RunId) -> Result<()> {
        let mut runs = self.runs.lock().map_err(|_| Self::poisoned(run))?;
        runs.remove(&run).map(|_| ()).ok_or_else(|| SortError::Storage {
            run,
            reason: "unknown run".to_string(),
        })
    }
}

struct MemoryRunWriter {
    runs: MemoryRuns,
    run: RunId,
}

impl Write for MemoryRunWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut runs = self.runs.lock().map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::Other, "memory storage lock poisoned")
        })?;
        let bytes = runs.get_mut(&self.run).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{} was removed", self.run))
        })?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
