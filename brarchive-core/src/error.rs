use core::error;
use core::fmt::{Display, Formatter, Result};

use bytemuck::PodCastError;

use crate::NAME_MAX;

/// What exactly is wrong with a single entry of an otherwise readable archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corruption {
    /// The descriptor itself extends past the end of the archive
    DescriptorOutOfBounds,
    /// The stored name length is larger than [`NAME_MAX`]
    NameLength(u8),
    /// The content range extends past the end of the data block
    ContentOutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Cast(PodCastError),
    /// The buffer cannot hold a header; carries the buffer length
    TooSmall(usize),
    BadMagic(u64),
    UnsupportedVersion(u32),
    /// Entry-level damage; callers may skip the entry and carry on
    CorruptEntry { index: u32, kind: Corruption },
    /// A name of this many bytes does not fit in a descriptor
    NameTooLong(usize),
    Overflow,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> Result {
        use Error::*;

        match self {
            Cast(err) => write!(f, "Cast: {:?}", err),
            TooSmall(len) => write!(f, "Archive too small ({} bytes)", len),
            BadMagic(magic) => write!(f, "Invalid magic number: 0x{:016x}", magic),
            UnsupportedVersion(version) => write!(f, "Unsupported version: {}", version),
            CorruptEntry { index, kind } => match kind {
                Corruption::DescriptorOutOfBounds => {
                    write!(f, "Archive corrupted: entry {} out of bounds", index)
                }
                Corruption::NameLength(len) => {
                    write!(f, "Invalid name length {} in entry {}", len, index)
                }
                Corruption::ContentOutOfBounds => {
                    write!(f, "Archive corrupted: contents of entry {} out of bounds", index)
                }
            },
            NameTooLong(len) => write!(f, "File name too long: {} > {} bytes", len, NAME_MAX),
            Overflow => write!(f, "Overflow"),
        }
    }
}

impl error::Error for Error {}

impl From<PodCastError> for Error {
    fn from(err: PodCastError) -> Error {
        Error::Cast(err)
    }
}
