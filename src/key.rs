use std::cmp::Ordering;
use std::str::FromStr;

/// Comparable representation of a key field.
///
/// Numbers sort before text. Two numbers compare numerically with NaN below every other number,
/// two texts compare lexicographically.
#[derive(Debug, Clone)]
pub enum Key {
    /// The field parsed as a floating point number
    Number(f64),
    /// The field as read
    Text(String),
}

impl Key {
    /// Coerce a raw field value into a [Key].
    ///
    /// Leading and trailing blanks are ignored when parsing the number. When parsing fails the
    /// raw text is kept unchanged. This never fails.
    ///
    /// # Examples
    /// ```
    /// use csv_file_sort::key::Key;
    /// assert!(Key::coerce("2") < Key::coerce("10"));
    /// assert!(Key::coerce("10") < Key::coerce("abc"));
    /// ```
    pub fn coerce(raw: &str) -> Key {
        match f64::from_str(raw.trim()) {
            Ok(n) => Key::Number(n),
            Err(_) => Key::Text(raw.to_string()),
        }
    }

    /// Coerce an optional field, a missing field is treated as empty text
    pub fn coerce_field(raw: Option<&str>) -> Key {
        Key::coerce(raw.unwrap_or(""))
    }

    fn cmp_numbers(a: f64, b: f64) -> Ordering {
        if a.is_nan() && b.is_nan() {
            Ordering::Equal
        } else if !a.is_nan() && b.is_nan() {
            Ordering::Greater
        } else if a.is_nan() && !b.is_nan() {
            Ordering::Less
        } else {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }
}

impl Eq for Key {}

impl PartialEq<Self> for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd<Self> for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Number(a), Key::Number(b)) => Self::cmp_numbers(*a, *b),
            (Key::Number(_), Key::Text(_)) => Ordering::Less,
            (Key::Text(_), Key::Number(_)) => Ordering::Greater,
            (Key::Text(a), Key::Text(b)) => a.as_str().cmp(b.as_str()),
        }
    }
}
