use alloc::string::String;
use alloc::vec::Vec;

use log::warn;

use crate::{layout, Entry, Error, Header};

/// A file on its way into an archive
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Relative path stored in the descriptor, `/` separated
    pub name: Vec<u8>,
    pub contents: Vec<u8>,
}

impl ArchiveFile {
    /// Fails with [`Error::NameTooLong`] for names that do not fit in a
    /// descriptor
    pub fn new(name: impl Into<Vec<u8>>, contents: impl Into<Vec<u8>>) -> Result<ArchiveFile, Error> {
        let name = name.into();
        layout::check_name(&name)?;
        Ok(ArchiveFile {
            name,
            contents: contents.into(),
        })
    }
}

/// Builder pattern for constructing archives. Holds the files in insertion
/// order and consumes itself to produce the archive bytes.
///
/// # Example
/// ```
/// use brarchive_core::{ArchiveBuilder, ArchiveView};
///
/// let mut builder = ArchiveBuilder::new();
/// builder
///     .file("a.txt", &b"hi"[..]).unwrap()
///     .file("sub/b.txt", &b"yo"[..]).unwrap();
/// let archive = builder.write_archive().unwrap();
///
/// let view = ArchiveView::parse(&archive).unwrap();
/// let entry = view.entry(1).unwrap();
/// assert_eq!(entry.name(), b"sub/b.txt");
/// assert_eq!(entry.contents().unwrap(), b"yo");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ArchiveBuilder {
    files: Vec<ArchiveFile>,
}

impl ArchiveBuilder {
    pub fn new() -> ArchiveBuilder {
        ArchiveBuilder::default()
    }

    pub fn push(&mut self, file: ArchiveFile) -> &mut ArchiveBuilder {
        self.files.push(file);
        self
    }

    /// Add a file with the given stored name
    pub fn file(
        &mut self,
        name: impl Into<Vec<u8>>,
        contents: impl Into<Vec<u8>>,
    ) -> Result<&mut ArchiveBuilder, Error> {
        Ok(self.push(ArchiveFile::new(name, contents)?))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consume this `ArchiveBuilder`, producing the archive bytes
    pub fn write_archive(self) -> Result<Vec<u8>, Error> {
        serialize(&self.files)
    }
}

/// Lay out `files` as a complete archive: header, one descriptor per file in
/// the given order, then the contents back to back.
///
/// Files whose name does not fit in a descriptor are left out with a
/// warning. Fails with [`Error::Overflow`] when an offset or size cannot be
/// stored in 32 bits.
pub fn serialize(files: &[ArchiveFile]) -> Result<Vec<u8>, Error> {
    let files: Vec<&ArchiveFile> = files
        .iter()
        .filter(|file| match layout::check_name(&file.name) {
            Ok(()) => true,
            Err(err) => {
                warn!("{}, skipping: {}", err, String::from_utf8_lossy(&file.name));
                false
            }
        })
        .collect();

    let count = u32::try_from(files.len()).map_err(|_| Error::Overflow)?;
    let data_start = layout::data_block_start(count)?;

    let mut entries = Vec::with_capacity(files.len());
    let mut data_size: usize = 0;
    for file in &files {
        let offset = u32::try_from(data_size).map_err(|_| Error::Overflow)?;
        let size = u32::try_from(file.contents.len()).map_err(|_| Error::Overflow)?;
        entries.push(Entry::new(&file.name, offset, size)?);
        data_size = data_size
            .checked_add(file.contents.len())
            .ok_or(Error::Overflow)?;
    }

    let total_size = data_start.checked_add(data_size).ok_or(Error::Overflow)?;
    let mut archive = Vec::with_capacity(total_size);
    archive.extend_from_slice(bytemuck::bytes_of(&Header::new(count)));
    archive.extend_from_slice(bytemuck::cast_slice(&entries));
    for file in &files {
        archive.extend_from_slice(&file.contents);
    }
    debug_assert_eq!(archive.len(), total_size);

    Ok(archive)
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{serialize, ArchiveBuilder, ArchiveFile};
    use crate::test::{archive, ENTRY1, ENTRY1_NAME, ENTRY2, ENTRY2_NAME};
    use crate::{ArchiveView, Error, HEADER_SIZE, NAME_MAX};

    #[test]
    fn matches_hand_built_archive() {
        let mut builder = ArchiveBuilder::new();
        builder
            .file(ENTRY1_NAME, ENTRY1)
            .unwrap()
            .file(ENTRY2_NAME, ENTRY2)
            .unwrap();
        assert_eq!(builder.write_archive().unwrap(), archive());
    }

    #[test]
    fn empty_archive_is_just_a_header() {
        let archive = serialize(&[]).unwrap();
        assert_eq!(archive.len(), HEADER_SIZE);

        let view = ArchiveView::parse(&archive).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.entries().count(), 0);
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let files = vec![
            ArchiveFile::new("z", "1").unwrap(),
            ArchiveFile::new("a", "22").unwrap(),
            ArchiveFile::new("z", "333").unwrap(),
        ];
        let archive = serialize(&files).unwrap();
        let view = ArchiveView::parse(&archive).unwrap();

        let read: Vec<(&[u8], &[u8])> = view
            .entries()
            .map(|res| {
                let entry = res.unwrap();
                (entry.name(), entry.contents().unwrap())
            })
            .collect();
        let expected: [(&[u8], &[u8]); 3] = [(b"z", b"1"), (b"a", b"22"), (b"z", b"333")];
        assert_eq!(read, expected);
        assert_eq!(view.entry(2).unwrap().entry().offset(), 3);
        assert_eq!(view.data_block(), b"122333");
    }

    #[test]
    fn skips_long_names() {
        let files = vec![
            ArchiveFile {
                name: vec![b'x'; NAME_MAX + 1],
                contents: b"dropped".to_vec(),
            },
            ArchiveFile::new("kept", "yes").unwrap(),
        ];
        let archive = serialize(&files).unwrap();
        let view = ArchiveView::parse(&archive).unwrap();

        assert_eq!(view.count(), 1);
        let entry = view.entry(0).unwrap();
        assert_eq!(entry.name(), b"kept");
        assert_eq!(entry.entry().offset(), 0);
        assert_eq!(view.data_block(), b"yes");
    }

    #[test]
    fn rejects_long_names_up_front() {
        let name = vec![b'x'; NAME_MAX + 1];
        assert_eq!(
            ArchiveFile::new(name, "").unwrap_err(),
            Error::NameTooLong(NAME_MAX + 1)
        );
    }
}
