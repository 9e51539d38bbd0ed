//! Operations on `.brarchive` files: create from a directory, list, extract,
//! print and delete. The on-disk format itself lives in `brarchive-core`.
mod bin;
pub mod ext;
mod fs;
mod report;

pub use bin::*;
pub use fs::*;
pub use report::*;

pub use brarchive_core::{ArchiveBuilder, ArchiveFile, ArchiveView, NameFilter};

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Settings shared by every operation, taken from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Don't report the archive that was created
    pub silent: bool,
    /// Print a line for every extracted or deleted entry
    pub verbose: bool,
}

#[derive(thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] brarchive_core::Error),

    #[error("{context}{}", display_path(.path))]
    Io {
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
        context: &'static str,
    },

    #[error("Invalid path component {component:?} in entry {entry:?}")]
    InvalidPath { entry: PathBuf, component: PathBuf },

    #[error("No files found in directory: {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("No files deleted (files not found in archive)")]
    NothingDeleted,
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(": {}", path.display()),
        None => String::new(),
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;

        let mut source = self.source();
        while let Some(err) = source {
            writeln!(f, "\tCaused by: {err}")?;
            source = err.source();
        }
        Ok(())
    }
}

/// Build a closure turning an [`io::Error`] into an [`Error::Io`], with an
/// optional path.
#[macro_export]
macro_rules! wrap_io_err {
    ($path:expr, $context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: Some(::std::convert::AsRef::<::std::path::Path>::as_ref(&$path).to_path_buf()),
            context: $context,
        }
    };
    ($context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: None,
            context: $context,
        }
    };
}
