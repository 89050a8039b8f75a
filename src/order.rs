use std::cmp::Ordering;

use crate::key::Key;

/// Key comparison selected once per sort
pub type Comparator = fn(&Key, &Key) -> Ordering;

/// Sort order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending, smallest key first
    #[default]
    Asc,
    /// Descending, largest key first
    Desc,
}

impl Order {
    /// Order from an `ascending` flag
    pub fn from_ascending(ascending: bool) -> Order {
        if ascending {
            Order::Asc
        } else {
            Order::Desc
        }
    }

    /// The comparator for this order. `Less` means the first key is emitted first.
    pub fn comparator(&self) -> Comparator {
        match self {
            Order::Asc => ascending,
            Order::Desc => descending,
        }
    }
}

fn ascending(a: &Key, b: &Key) -> Ordering {
    a.cmp(b)
}

fn descending(a: &Key, b: &Key) -> Ordering {
    b.cmp(a)
}
