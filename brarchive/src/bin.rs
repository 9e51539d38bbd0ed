use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use brarchive_core::{ArchiveBuilder, ArchiveFile, ArchiveView, NameFilter};
use log::{debug, info, warn};

use crate::ext::EntryExt;
use crate::{wrap_io_err, Error, Filesystem, Options, Report};

fn read_archive<F: Filesystem>(fs: &F, archive_path: &Path) -> Result<Vec<u8>, Error> {
    let data = fs.read_whole_file(archive_path)?;
    debug!("read {} bytes from {}", data.len(), archive_path.display());
    Ok(data)
}

fn parse_archive<'a>(data: &'a [u8], archive_path: &Path) -> Result<ArchiveView<'a>, Error> {
    let view = ArchiveView::parse(data)?;
    debug!("{}: {}", archive_path.display(), view);
    Ok(view)
}

/// Archive every regular file below `folder` into a new archive at
/// `archive_path`, replacing whatever was there.
pub fn create<F: Filesystem, W: Write>(
    fs: &F,
    archive_path: impl AsRef<Path>,
    folder: impl AsRef<Path>,
    options: Options,
    out: &mut W,
) -> Result<Report, Error> {
    let archive_path = archive_path.as_ref();
    let folder = folder.as_ref();
    let mut report = Report::default();

    let mut builder = ArchiveBuilder::new();
    for source in fs.collect(folder)? {
        if let Err(err) = brarchive_core::layout::check_name(&source.name) {
            report.skip(Some(&source.name), err);
            continue;
        }

        let contents = fs.read_whole_file(&source.path)?;
        debug!("adding {} ({} bytes)", source.path.display(), contents.len());
        report.done(&source.name);
        builder.push(ArchiveFile {
            name: source.name,
            contents,
        });
    }

    if builder.is_empty() {
        return Err(Error::EmptyInput(folder.to_path_buf()));
    }

    let count = builder.len();
    let archive = builder.write_archive()?;
    fs.write_whole_file(archive_path, &archive)?;
    info!("wrote {} entries to {}", count, archive_path.display());

    if !options.silent {
        writeln!(out, "Created archive: {} ({} files)", archive_path.display(), count)
            .map_err(wrap_io_err!("Write output"))?;
    }
    Ok(report)
}

/// Write the name of every entry matching `filters` on its own line
pub fn list<F: Filesystem, W: Write, P: AsRef<[u8]>>(
    fs: &F,
    archive_path: impl AsRef<Path>,
    filters: &[P],
    out: &mut W,
) -> Result<Report, Error> {
    let archive_path = archive_path.as_ref();
    let data = read_archive(fs, archive_path)?;
    let view = parse_archive(&data, archive_path)?;
    let mut report = Report::default();

    for res in view.matching(NameFilter::Basename, filters) {
        let entry = match res {
            Ok(entry) => entry,
            Err(err) => {
                report.skip(None, err);
                continue;
            }
        };
        out.write_all(entry.name())
            .and_then(|()| out.write_all(b"\n"))
            .map_err(wrap_io_err!("Write output"))?;
        report.done(entry.name());
    }
    Ok(report)
}

/// Write the entries matching `filters` below `output_dir`, or below the
/// current directory when there is none. When several entries share a name,
/// the first one that can be written wins.
pub fn extract<F: Filesystem, W: Write, P: AsRef<[u8]>>(
    fs: &F,
    archive_path: impl AsRef<Path>,
    output_dir: Option<&Path>,
    filters: &[P],
    options: Options,
    out: &mut W,
) -> Result<Report, Error> {
    let archive_path = archive_path.as_ref();
    let data = read_archive(fs, archive_path)?;
    let view = parse_archive(&data, archive_path)?;

    let base_dir = output_dir.unwrap_or_else(|| Path::new(""));
    if let Some(dir) = output_dir {
        fs.ensure_directory(dir)?;
    }

    let mut report = Report::default();
    let mut seen: HashSet<&[u8]> = HashSet::new();
    for res in view.matching(NameFilter::Basename, filters) {
        let entry = match res {
            Ok(entry) => entry,
            Err(err) => {
                report.skip(None, err);
                continue;
            }
        };
        let name = entry.name();
        if seen.contains(name) {
            debug!("{} already extracted", String::from_utf8_lossy(name));
            continue;
        }

        let relative = match entry.check_path() {
            Ok(relative) => relative,
            Err(err) => {
                report.skip(Some(name), err);
                continue;
            }
        };
        let contents = match entry.contents() {
            Ok(contents) => contents,
            Err(err) => {
                report.skip(Some(name), err);
                continue;
            }
        };

        let target = base_dir.join(relative);
        let written = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs.ensure_directory(parent),
            _ => Ok(()),
        }
        .and_then(|()| fs.write_whole_file(&target, contents));
        if let Err(err) = written {
            report.skip(Some(name), err);
            continue;
        }

        seen.insert(name);
        report.done(name);
        if options.verbose {
            out.write_all(b"x - ")
                .and_then(|()| out.write_all(name))
                .and_then(|()| out.write_all(b"\n"))
                .map_err(wrap_io_err!("Write output"))?;
        }
    }

    info!("extracted {} entries from {}", report.entries.len(), archive_path.display());
    Ok(report)
}

/// Write the contents of the entries matching `filters` to `out`, back to
/// back. When several entries share a name, only the first readable one is
/// printed.
pub fn print<F: Filesystem, W: Write, P: AsRef<[u8]>>(
    fs: &F,
    archive_path: impl AsRef<Path>,
    filters: &[P],
    out: &mut W,
) -> Result<Report, Error> {
    let archive_path = archive_path.as_ref();
    let data = read_archive(fs, archive_path)?;
    let view = parse_archive(&data, archive_path)?;
    let mut report = Report::default();

    let mut seen: HashSet<&[u8]> = HashSet::new();
    for res in view.matching(NameFilter::Basename, filters) {
        let entry = match res {
            Ok(entry) => entry,
            Err(err) => {
                report.skip(None, err);
                continue;
            }
        };
        if seen.contains(entry.name()) {
            continue;
        }

        match entry.contents() {
            Ok(contents) => {
                out.write_all(contents).map_err(wrap_io_err!("Write output"))?;
                seen.insert(entry.name());
                report.done(entry.name());
            }
            Err(err) => report.skip(Some(entry.name()), err),
        }
    }
    out.flush().map_err(wrap_io_err!("Write output"))?;
    Ok(report)
}

/// Remove every entry whose stored name equals one of `names` and rewrite
/// the archive from the remaining entries.
///
/// Nothing is written when no entry matched. Entries that cannot be read are
/// dropped from the rewritten archive.
pub fn delete<F: Filesystem, W: Write, P: AsRef<[u8]>>(
    fs: &F,
    archive_path: impl AsRef<Path>,
    names: &[P],
    options: Options,
    out: &mut W,
) -> Result<Report, Error> {
    if names.is_empty() {
        return Err(Error::NothingDeleted);
    }

    let archive_path = archive_path.as_ref();
    let data = read_archive(fs, archive_path)?;
    let view = parse_archive(&data, archive_path)?;
    let mut report = Report::default();

    let mut kept = ArchiveBuilder::new();
    for res in view.entries() {
        let entry = match res {
            Ok(entry) => entry,
            Err(err) => {
                report.skip(None, err);
                continue;
            }
        };

        if NameFilter::Exact.matches(entry.name(), names) {
            report.done(entry.name());
            continue;
        }
        match entry.contents() {
            Ok(contents) => {
                kept.push(ArchiveFile {
                    name: entry.name().to_vec(),
                    contents: contents.to_vec(),
                });
            }
            Err(err) => report.skip(Some(entry.name()), err),
        }
    }

    if report.entries.is_empty() {
        return Err(Error::NothingDeleted);
    }
    if kept.is_empty() {
        warn!("All files deleted, archive will be empty");
    }

    let archive = kept.write_archive()?;
    fs.write_whole_file(archive_path, &archive)?;
    info!("deleted {} entries from {}", report.entries.len(), archive_path.display());

    if options.verbose {
        for name in &report.entries {
            writeln!(out, "d - {}", name).map_err(wrap_io_err!("Write output"))?;
        }
    }
    Ok(report)
}
