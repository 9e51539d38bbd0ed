//! The packed structs represent the on-disk format of brarchive
use core::fmt::{self, Display};

use bytemuck::{Pod, Zeroable};

use crate::codec::Le32;
use crate::{layout, Error, NAME_MAX};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Entry {
    /// Number of meaningful bytes in `name`
    pub name_len: u8,
    /// Length-prefixed, zero padded path of the file
    pub name: [u8; NAME_MAX],
    /// Offset of file data, relative to the start of the data block
    pub offset: Le32,
    /// Size in bytes of the file data in the data block
    pub size: Le32,
}

impl Entry {
    pub fn new(name: &[u8], offset: u32, size: u32) -> Result<Entry, Error> {
        layout::check_name(name)?;

        let mut entry = Entry::zeroed();
        entry.name_len = name.len() as u8;
        entry.name[..name.len()].copy_from_slice(name);
        entry.offset = Le32::new(offset);
        entry.size = Le32::new(size);
        Ok(entry)
    }

    pub fn offset(&self) -> u32 {
        self.offset.get()
    }

    pub fn size(&self) -> u32 {
        self.size.get()
    }

    /// Retrieve the name, or `None` if the stored length is out of range
    pub fn name_bytes(&self) -> Option<&[u8]> {
        self.name.get(..usize::from(self.name_len))
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name_bytes().unwrap_or_default();
        write!(
            f,
            "name={:?} offset={} size={}",
            alloc::string::String::from_utf8_lossy(name),
            self.offset(),
            self.size()
        )
    }
}
