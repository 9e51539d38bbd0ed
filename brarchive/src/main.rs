use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context};
use brarchive::{create, delete, extract, list, os_bytes, print, LocalFs, Options};
use clap::{crate_description, crate_name, crate_version, App, Arg, ArgGroup};
use env_logger::Env;

/// Accept the historic `ar` style where the operation letters come without a
/// leading dash, as in `br-ar rcv out.brarchive dir`
fn historic_args() -> Vec<OsString> {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    if let Some(first) = args.get_mut(1) {
        if !first.to_string_lossy().starts_with('-') {
            let mut dashed = OsString::from("-");
            dashed.push(&*first);
            *first = dashed;
        }
    }
    args
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    let matches = App::new(crate_name!())
        .bin_name("br-ar")
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::with_name("create")
                .help("Create an archive from a directory")
                .short("r"),
        )
        .arg(
            Arg::with_name("list")
                .help("List the names of the archived files")
                .short("t"),
        )
        .arg(
            Arg::with_name("extract")
                .help("Extract archived files")
                .short("x"),
        )
        .arg(
            Arg::with_name("print")
                .help("Write the contents of archived files to stdout")
                .short("p"),
        )
        .arg(
            Arg::with_name("delete")
                .help("Delete files from the archive")
                .short("d"),
        )
        .group(
            ArgGroup::with_name("operation")
                .args(&["create", "list", "extract", "print", "delete"])
                .required(true),
        )
        .arg(
            Arg::with_name("silent")
                .help("Don't report the created archive")
                .short("c"),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Report every extracted or deleted file")
                .short("v"),
        )
        .arg(
            Arg::with_name("output")
                .help("Directory to extract to (defaults to '.')")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("DIR")
                .requires("extract"),
        )
        .arg(
            Arg::with_name("archive")
                .help("Archive file")
                .required(true)
                .index(1)
                .value_name("ARCHIVE"),
        )
        .arg(
            Arg::with_name("files")
                .help("Directory to archive, or names to select")
                .multiple(true)
                .index(2)
                .value_name("FILE"),
        )
        .get_matches_from(historic_args());

    let options = Options {
        silent: matches.is_present("silent"),
        verbose: matches.is_present("verbose"),
    };
    let archive = matches
        .value_of_os("archive")
        .map(Path::new)
        .context("no archive given")?;
    let files: Vec<&OsStr> = matches
        .values_of_os("files")
        .map(|values| values.collect())
        .unwrap_or_default();
    let names: Vec<Cow<[u8]>> = files.iter().map(|file| os_bytes(file)).collect();

    let fs = LocalFs;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if matches.is_present("create") {
        let [folder] = files.as_slice() else {
            bail!("create takes exactly one directory");
        };
        create(&fs, archive, folder, options, &mut out)?;
    } else if matches.is_present("list") {
        list(&fs, archive, &names, &mut out)?;
    } else if matches.is_present("extract") {
        let output_dir = matches.value_of_os("output").map(Path::new);
        extract(&fs, archive, output_dir, &names, options, &mut out)?;
    } else if matches.is_present("print") {
        print(&fs, archive, &names, &mut out)?;
    } else if matches.is_present("delete") {
        if names.is_empty() {
            bail!("delete takes at least one name");
        }
        delete(&fs, archive, &names, options, &mut out)?;
    }

    out.flush().context("flush stdout")?;
    Ok(())
}
