use std::fmt::{Display, Formatter};

use csv::StringRecord;

use crate::error::{Result, SortError};

/// Identifies the key column of a sort.
///
/// The column is named by its header value or by its zero based position, and resolved once
/// against the header before any run is written.
///
/// # Examples
/// ```
/// use csv_file_sort::field::Field;
/// let by_name = Field::from("price");
/// let by_index = Field::from(2usize);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// Column name as it appears in the header
    Name(String),
    /// Zero based column index
    Index(usize),
}

impl Field {
    /// Resolve this field to a column index in `header`
    pub fn resolve(&self, header: &StringRecord) -> Result<usize> {
        match self {
            Field::Name(name) => header
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| {
                    let columns = header.iter().collect::<Vec<&str>>().join(", ");
                    SortError::InvalidKey {
                        key: self.to_string(),
                        reason: format!("no such column in header [{}]", columns),
                    }
                }),
            Field::Index(index) => {
                if *index < header.len() {
                    Ok(*index)
                } else {
                    Err(
                        SortError::InvalidKey {
                            key: self.to_string(),
                            reason: format!(
                                "index out of range, header has {} columns",
                                header.len()
                            ),
                        }
                    )
                }
            }
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Name(name) => write!(f, "{}", name),
            Field::Index(index) => write!(f, "#{}", index),
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::Name(name.to_string())
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::Name(name)
    }
}

impl From<usize> for Field {
    fn from(index: usize) -> Self {
        Field::Index(index)
    }
}
