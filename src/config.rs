use std::path::PathBuf;

use crate::order::Order;

#[derive(Clone, Debug)]
pub(crate) struct Config {
    tmp: PathBuf,
    tmp_prefix: String,
    tmp_suffix: String,
    delimiter: u8,
    batch_capacity: usize,
    order: Order,
}

impl Config {
    pub(crate) fn new(
        tmp: PathBuf,
        tmp_prefix: String,
        tmp_suffix: String,
        delimiter: u8,
        batch_capacity: usize,
        order: Order,
    ) -> Config {
        Config {
            tmp,
            tmp_prefix,
            tmp_suffix,
            delimiter,
            batch_capacity,
            order,
        }
    }

    pub(crate) fn tmp(&self) -> &PathBuf {
        &self.tmp
    }

    pub(crate) fn tmp_prefix(&self) -> &String {
        &self.tmp_prefix
    }

    pub(crate) fn tmp_suffix(&self) -> &String {
        &self.tmp_suffix
    }

    pub(crate) fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub(crate) fn batch_capacity(&self) -> usize {
        self.batch_capacity
    }

    pub(crate) fn order(&self) -> Order {
        self.order
    }
}
