//! The packed structs represent the on-disk format of brarchive
use core::fmt::{self, Display};

use bytemuck::{Pod, Zeroable};

use crate::codec::{Le32, Le64};
use crate::{layout, Error, HEADER_SIZE};

/// Identifies a brarchive file
pub const MAGIC: u64 = 0x267052A0B125277D;
/// The only format version this crate reads and writes
pub const VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Header {
    /// Always [`MAGIC`]
    pub magic: Le64,
    /// Count of Entry structs, which starts immediately after header struct
    pub count: Le32,
    /// Format version, see [`VERSION`]
    pub version: Le32,
}

impl Header {
    pub fn new(count: u32) -> Header {
        Header {
            magic: Le64::new(MAGIC),
            count: Le32::new(count),
            version: Le32::new(VERSION),
        }
    }

    /// Parse header from the start of raw archive data, checking the magic
    /// and version
    pub fn parse(data: &[u8]) -> Result<&Header, Error> {
        let bytes = data.get(..HEADER_SIZE).ok_or(Error::TooSmall(data.len()))?;
        let header: &Header = bytemuck::try_from_bytes(bytes)?;

        if header.magic.get() != MAGIC {
            return Err(Error::BadMagic(header.magic.get()));
        }
        if header.version.get() != VERSION {
            return Err(Error::UnsupportedVersion(header.version.get()));
        }
        Ok(header)
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }

    pub fn version(&self) -> u32 {
        self.version.get()
    }

    /// Retrieve the size of the entries
    pub fn entries_size(&self) -> Result<usize, Error> {
        layout::entries_size(self.count())
    }

    /// Retrieve the size of the Header and its entries, which is where the
    /// data block begins
    pub fn total_size(&self) -> Result<usize, Error> {
        layout::data_block_start(self.count())
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "magic=0x{:016x} count={} version={}",
            self.magic.get(),
            self.count(),
            self.version()
        )
    }
}
