use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::{wrap_io_err, Error};

/// A regular file found while walking a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the walked directory, `/` separated
    pub name: Vec<u8>,
    /// Where to read the contents from
    pub path: PathBuf,
}

/// Everything the archive operations need from the outside world
pub trait Filesystem {
    /// Recursively find the regular files below `root`, depth first, in an
    /// order that is stable for a given tree. Symlinks and special files are
    /// ignored.
    fn collect(&self, root: &Path) -> Result<Vec<SourceFile>, Error>;

    fn read_whole_file(&self, path: &Path) -> Result<Vec<u8>, Error>;

    /// Replace the contents of `path` with `data`
    fn write_whole_file(&self, path: &Path, data: &[u8]) -> Result<(), Error>;

    /// Create `path` and all of its parents
    fn ensure_directory(&self, path: &Path) -> Result<(), Error>;
}

/// [`Filesystem`] backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

/// Temporary file next to `target` that is renamed over it once complete
fn temp_path(target: &Path) -> PathBuf {
    let file_name = target.file_name().unwrap_or_else(|| OsStr::new("archive"));
    let mut tmp_name = OsStr::new(".brarchive.").to_os_string();
    tmp_name.push(file_name);
    target.with_file_name(tmp_name)
}

impl Filesystem for LocalFs {
    fn collect(&self, root: &Path) -> Result<Vec<SourceFile>, Error> {
        let mut files = Vec::new();

        // Sort each folder's entries by the file name so that the same tree
        // always produces the same archive
        let walk = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for res in walk {
            let entry = match res {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(wrap_io_err!(root, "Walk directory")(io::Error::from(err)));
                }
                Err(err) => {
                    warn!("Failed to read {}, skipping: {}", display_walk_path(&err), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let name = path_to_name(relative);
            debug!("found {}", entry.path().display());
            files.push(SourceFile {
                name,
                path: entry.into_path(),
            });
        }

        Ok(files)
    }

    fn read_whole_file(&self, path: &Path) -> Result<Vec<u8>, Error> {
        fs::read(path).map_err(wrap_io_err!(path, "Read file"))
    }

    fn write_whole_file(&self, path: &Path, data: &[u8]) -> Result<(), Error> {
        let target = resolve_link(path)?;
        let tmp = temp_path(&target);
        fs::write(&tmp, data).map_err(wrap_io_err!(tmp, "Write file"))?;

        if let Err(err) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(wrap_io_err!(target, "Replace file")(err));
        }
        Ok(())
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), Error> {
        fs::create_dir_all(path).map_err(wrap_io_err!(path, "Create directory"))
    }
}

/// Follow `path` when it is a symlink so that the rename replaces the file it
/// points to and leaves the link in place
fn resolve_link(path: &Path) -> Result<PathBuf, Error> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(wrap_io_err!(path, "Resolve link"))
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn display_walk_path(err: &walkdir::Error) -> String {
    err.path()
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}

/// Join the components of a relative path with `/`, independent of the
/// platform separator
pub fn path_to_name(path: &Path) -> Vec<u8> {
    let mut name = Vec::new();
    for component in path.components() {
        if !name.is_empty() {
            name.push(b'/');
        }
        name.extend_from_slice(&os_bytes(component.as_os_str()));
    }
    name
}

#[cfg(unix)]
pub fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;

    Cow::Borrowed(s.as_bytes())
}

#[cfg(not(unix))]
pub fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    match s.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{path_to_name, temp_path, Filesystem, LocalFs};

    #[test]
    fn names_use_forward_slashes() {
        let path: std::path::PathBuf = ["sub", "dir", "b.txt"].iter().collect();
        assert_eq!(path_to_name(&path), b"sub/dir/b.txt");
        assert_eq!(path_to_name(Path::new("a.txt")), b"a.txt");
    }

    #[test]
    fn temp_file_is_a_sibling() {
        assert_eq!(
            temp_path(Path::new("out/pack.brarchive")),
            Path::new("out/.brarchive.pack.brarchive")
        );
    }

    #[test]
    fn collect_is_sorted_and_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sub/deeper")).unwrap();
        fs::create_dir(tmp.path().join("empty")).unwrap();
        fs::write(tmp.path().join("z.txt"), "z").unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::write(tmp.path().join("sub/deeper/c.txt"), "c").unwrap();
        fs::write(tmp.path().join("sub/b.txt"), "b").unwrap();

        let files = LocalFs.collect(tmp.path()).unwrap();
        let names: Vec<&[u8]> = files.iter().map(|file| &file.name[..]).collect();
        let expected: [&[u8]; 4] = [b"a.txt", b"sub/b.txt", b"sub/deeper/c.txt", b"z.txt"];
        assert_eq!(names, expected);
        assert_eq!(files[1].path, tmp.path().join("sub/b.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn collect_ignores_symlinks() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("real"), "data").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("link")).unwrap();

        let files = LocalFs.collect(tmp.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, b"real");
    }

    #[test]
    fn collect_missing_root_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(LocalFs.collect(&tmp.path().join("missing")).is_err());
    }

    #[test]
    fn write_replaces_without_leftovers() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("file");
        fs::write(&target, "old contents").unwrap();

        LocalFs.write_whole_file(&target, b"new").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn write_goes_through_symlinks() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("store")).unwrap();
        let real = tmp.path().join("store/real.brarchive");
        let link = tmp.path().join("link.brarchive");
        fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        LocalFs.write_whole_file(&link, b"new").unwrap();
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&real).unwrap(), b"new");
        assert_eq!(fs::read(&link).unwrap(), b"new");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 2);
        assert_eq!(fs::read_dir(tmp.path().join("store")).unwrap().count(), 1);
    }
}
