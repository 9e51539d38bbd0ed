//! Core data types and codec for the brarchive format.
//!
//! An archive is a 16 byte [`Header`], followed by one 256 byte [`Entry`]
//! descriptor per file, followed by the data block holding every file's
//! contents back to back. All integers are little-endian.
#![no_std]
extern crate alloc;

use core::mem;

pub use crate::archive::{ArchiveEntry, ArchiveView, Entries};
pub use crate::builder::{serialize, ArchiveBuilder, ArchiveFile};
pub use crate::entry::Entry;
pub use crate::error::{Corruption, Error};
pub use crate::filter::{basename, NameFilter};
pub use crate::header::{Header, MAGIC, VERSION};

mod archive;
mod builder;
pub mod codec;
mod entry;
mod error;
mod filter;
mod header;
pub mod layout;

pub const HEADER_SIZE: usize = mem::size_of::<Header>();
pub const ENTRY_SIZE: usize = mem::size_of::<Entry>();
/// Longest name a descriptor can hold, in bytes
pub const NAME_MAX: usize = 247;

/// Parse raw archive bytes, validating the header
pub fn parse(data: &[u8]) -> Result<ArchiveView<'_>, Error> {
    ArchiveView::parse(data)
}
