//! Offset arithmetic for the archive layout
//!
//! ```text
//! 0               header (magic, count, version)
//! 16              count * entry descriptor
//! 16 + 256*count  data block
//! ```
use crate::{Error, ENTRY_SIZE, HEADER_SIZE, NAME_MAX};

/// Size of `count` entry descriptors
pub fn entries_size(count: u32) -> Result<usize, Error> {
    usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(ENTRY_SIZE))
        .ok_or(Error::Overflow)
}

/// Size of the header and `count` entry descriptors
pub fn entries_table_size(count: u32) -> Result<usize, Error> {
    entries_size(count)?
        .checked_add(HEADER_SIZE)
        .ok_or(Error::Overflow)
}

/// Position of the data block in the file
pub fn data_block_start(count: u32) -> Result<usize, Error> {
    entries_table_size(count)
}

/// Position of the descriptor for entry `index`
pub fn entry_start(index: u32) -> Result<usize, Error> {
    entries_table_size(index)
}

/// Names are stored behind a one byte length and may not exceed [`NAME_MAX`]
pub fn check_name(name: &[u8]) -> Result<(), Error> {
    if name.len() > NAME_MAX {
        Err(Error::NameTooLong(name.len()))
    } else {
        Ok(())
    }
}
