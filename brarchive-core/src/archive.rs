use core::fmt::{self, Display};
use core::iter::FusedIterator;

use crate::{layout, Corruption, Entry, Error, Header, NameFilter, ENTRY_SIZE};

/// A parsed archive borrowing the raw archive bytes.
///
/// Parsing only validates the header. Descriptors and contents are checked
/// when they are accessed, so a single damaged entry never hides the others.
#[derive(Clone, Copy, Debug)]
pub struct ArchiveView<'a> {
    data: &'a [u8],
    header: Header,
    /// `None` when the data block start is not addressable at all
    data_start: Option<usize>,
}

impl<'a> ArchiveView<'a> {
    pub fn parse(data: &'a [u8]) -> Result<ArchiveView<'a>, Error> {
        let header = *Header::parse(data)?;
        Ok(ArchiveView {
            data,
            header,
            data_start: header.total_size().ok(),
        })
    }

    /// Number of entries the header claims
    pub fn count(&self) -> u32 {
        self.header.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Bytes following the descriptor table. Empty when the table is
    /// truncated.
    pub fn data_block(&self) -> &'a [u8] {
        self.data_start
            .and_then(|start| self.data.get(start..))
            .unwrap_or_default()
    }

    /// Retrieve the descriptor at `index`, checking that it lies inside the
    /// archive and has a valid name length
    pub fn entry(&self, index: u32) -> Result<ArchiveEntry<'a>, Error> {
        let out_of_bounds = Error::CorruptEntry {
            index,
            kind: Corruption::DescriptorOutOfBounds,
        };
        if index >= self.count() {
            return Err(out_of_bounds);
        }

        let start = layout::entry_start(index).map_err(|_| out_of_bounds)?;
        let bytes = start
            .checked_add(ENTRY_SIZE)
            .and_then(|end| self.data.get(start..end))
            .ok_or(out_of_bounds)?;
        let entry: &'a Entry = bytemuck::try_from_bytes(bytes)?;

        let name = entry.name_bytes().ok_or(Error::CorruptEntry {
            index,
            kind: Corruption::NameLength(entry.name_len),
        })?;

        Ok(ArchiveEntry {
            index,
            entry,
            name,
            view: *self,
        })
    }

    /// Iterate all entries in stored order
    pub fn entries(&self) -> Entries<'a> {
        Entries {
            view: *self,
            next: 0,
            done: false,
        }
    }

    /// Iterate entries whose name passes `filter`. Damaged entries are
    /// always yielded since their names cannot be trusted.
    pub fn matching<'p, P: AsRef<[u8]>>(
        &self,
        filter: NameFilter,
        patterns: &'p [P],
    ) -> impl Iterator<Item = Result<ArchiveEntry<'a>, Error>> + 'p
    where
        'a: 'p,
    {
        self.entries().filter(move |res| match res {
            Ok(entry) => filter.matches(entry.name(), patterns),
            Err(_) => true,
        })
    }
}

impl Display for ArchiveView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} size={}", self.header, self.data.len())
    }
}

/// A descriptor that passed validation, together with access to its contents
#[derive(Clone, Copy, Debug)]
pub struct ArchiveEntry<'a> {
    index: u32,
    entry: &'a Entry,
    name: &'a [u8],
    view: ArchiveView<'a>,
}

impl<'a> ArchiveEntry<'a> {
    pub fn entry(&self) -> &'a Entry {
        self.entry
    }

    pub fn name(&self) -> &'a [u8] {
        self.name
    }

    /// Retrieve the file data, checking it against the end of the archive.
    /// Ranges of different entries are allowed to overlap.
    pub fn contents(&self) -> Result<&'a [u8], Error> {
        let start = usize::try_from(self.entry.offset()).ok();
        let size = usize::try_from(self.entry.size()).ok();

        self.view
            .data_start
            .zip(start)
            .and_then(|(data_start, start)| data_start.checked_add(start))
            .zip(size)
            .and_then(|(start, size)| Some(start..start.checked_add(size)?))
            .and_then(|range| self.view.data.get(range))
            .ok_or(Error::CorruptEntry {
                index: self.index,
                kind: Corruption::ContentOutOfBounds,
            })
    }
}

/// Iterator over the entries of an [`ArchiveView`].
///
/// Yields an `Err` for each damaged entry and keeps going. Descriptors are
/// stored back to back, so after the first one that runs past the end of the
/// archive all later ones do as well; that one is reported and iteration
/// ends.
#[derive(Clone, Debug)]
pub struct Entries<'a> {
    view: ArchiveView<'a>,
    next: u32,
    done: bool,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<ArchiveEntry<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next >= self.view.count() {
            return None;
        }

        let res = self.view.entry(self.next);
        self.next += 1;
        if let Err(Error::CorruptEntry {
            kind: Corruption::DescriptorOutOfBounds,
            ..
        }) = res
        {
            self.done = true;
        }
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = self.view.count() - self.next;
        (0, usize::try_from(remaining).ok())
    }
}

impl FusedIterator for Entries<'_> {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::ArchiveView;
    use crate::test::{archive, ENTRY1, ENTRY1_NAME, ENTRY2, ENTRY2_NAME};
    use crate::{Corruption, Error, NameFilter, ENTRY_SIZE, HEADER_SIZE};

    fn corrupt(index: u32, kind: Corruption) -> Error {
        Error::CorruptEntry { index, kind }
    }

    #[test]
    fn read_entries() {
        let data = archive();
        let view = ArchiveView::parse(&data).unwrap();
        assert_eq!(view.count(), 2);

        let entries = view.entries().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(entries[0].name(), ENTRY1_NAME);
        assert_eq!(entries[0].contents(), Ok(ENTRY1));
        assert_eq!(entries[1].name(), ENTRY2_NAME);
        assert_eq!(entries[1].contents(), Ok(ENTRY2));
        assert_eq!(entries[1].entry().offset() as usize, ENTRY1.len());
    }

    #[test]
    fn data_block() {
        let data = archive();
        let view = ArchiveView::parse(&data).unwrap();
        assert_eq!(view.data_block(), &data[HEADER_SIZE + 2 * ENTRY_SIZE..]);
        assert_eq!(view.data_block().len(), ENTRY1.len() + ENTRY2.len());
    }

    #[test]
    fn bad_name_len_is_skippable() {
        let mut data = archive();
        data[HEADER_SIZE] = 250;
        let view = ArchiveView::parse(&data).unwrap();

        let res: Vec<_> = view.entries().collect();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].as_ref().unwrap_err(), &corrupt(0, Corruption::NameLength(250)));
        assert_eq!(res[1].as_ref().unwrap().name(), ENTRY2_NAME);
    }

    #[test]
    fn contents_out_of_bounds() {
        let mut data = archive();
        // Grow the first entry's size past the end of the data block
        let size_at = HEADER_SIZE + 252;
        data[size_at..size_at + 4].copy_from_slice(&1000u32.to_le_bytes());
        let view = ArchiveView::parse(&data).unwrap();

        let entries = view.entries().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(entries[0].contents(), Err(corrupt(0, Corruption::ContentOutOfBounds)));
        assert_eq!(entries[1].contents(), Ok(ENTRY2));
    }

    #[test]
    fn overlapping_contents() {
        let mut data = archive();
        // Point the second entry at exactly the first entry's data
        let offset_at = HEADER_SIZE + ENTRY_SIZE + 248;
        data[offset_at..offset_at + 4].copy_from_slice(&0u32.to_le_bytes());
        data[offset_at + 4..offset_at + 8].copy_from_slice(&(ENTRY1.len() as u32).to_le_bytes());
        let view = ArchiveView::parse(&data).unwrap();

        let first = view.entry(0).unwrap();
        let second = view.entry(1).unwrap();
        assert_eq!(second.contents(), Ok(ENTRY1));
        assert_eq!(first.contents(), second.contents());

        // A range inside another entry's data is fine too
        data[offset_at..offset_at + 4].copy_from_slice(&5u32.to_le_bytes());
        data[offset_at + 4..offset_at + 8].copy_from_slice(&10u32.to_le_bytes());
        let view = ArchiveView::parse(&data).unwrap();
        assert_eq!(view.entry(1).unwrap().contents(), Ok(&ENTRY1[5..15]));
    }

    #[test]
    fn truncated_table() {
        let data = archive();
        let view = ArchiveView::parse(&data[..HEADER_SIZE + ENTRY_SIZE + 10]).unwrap();

        let res: Vec<_> = view.entries().collect();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].as_ref().unwrap().name(), ENTRY1_NAME);
        assert_eq!(res[0].as_ref().unwrap().contents(), Err(corrupt(0, Corruption::ContentOutOfBounds)));
        assert_eq!(res[1].as_ref().unwrap_err(), &corrupt(1, Corruption::DescriptorOutOfBounds));
        assert!(view.data_block().is_empty());
    }

    #[test]
    fn huge_count_stops_after_first_missing_descriptor() {
        let mut data = archive();
        data[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        let view = ArchiveView::parse(&data).unwrap();

        let res: Vec<_> = view.entries().collect();
        assert_eq!(res.len(), 3);
        assert!(res[0].is_ok());
        assert!(res[1].is_ok());
        assert_eq!(res[2].as_ref().unwrap_err(), &corrupt(2, Corruption::DescriptorOutOfBounds));
    }

    #[test]
    fn matching() {
        let data = archive();
        let view = ArchiveView::parse(&data).unwrap();

        let names: Vec<_> = view
            .matching(NameFilter::Basename, &["randomjson.json"])
            .map(|res| res.unwrap().name())
            .collect();
        assert_eq!(names, [ENTRY2_NAME]);

        assert_eq!(view.matching(NameFilter::Exact, &["randomjson.json"]).count(), 0);
        assert_eq!(view.matching::<&str>(NameFilter::Exact, &[]).count(), 2);
    }
}
