//! Extention traits for base types defined in `brarchive-core`.
use std::path::{Component, Path, PathBuf};

use brarchive_core::ArchiveEntry;

use crate::Error;

pub trait EntryExt {
    fn check_path(&self) -> Result<PathBuf, Error>;
}

#[cfg(unix)]
fn name_to_path(name: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Path::new(OsStr::from_bytes(name)).to_path_buf()
}

#[cfg(not(unix))]
fn name_to_path(name: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(name).into_owned())
}

impl EntryExt for ArchiveEntry<'_> {
    /// Iterate the components of the stored name and ensure that there are no
    /// non-normal components, so the entry stays below the output directory.
    fn check_path(&self) -> Result<PathBuf, Error> {
        let path = name_to_path(self.name());
        if path.components().next().is_none() {
            return Err(Error::InvalidPath {
                entry: path,
                component: PathBuf::new(),
            });
        }

        for component in path.components() {
            match component {
                Component::Normal(_) => {}
                invalid => {
                    let bad_component: &Path = invalid.as_ref();
                    return Err(Error::InvalidPath {
                        entry: path.clone(),
                        component: bad_component.to_path_buf(),
                    });
                }
            }
        }
        Ok(path)
    }
}
