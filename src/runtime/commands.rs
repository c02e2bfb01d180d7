use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing::{info, warn};

use crate::config::Settings;
use crate::library;
use crate::store::RecordStore;
use crate::transfer::{apply_import, read_import, write_export};

use super::startup::{open_store, prefs_file};

pub const USAGE: &str = "usage: sonata [add <path>... | import <file> | export <file>]";

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// No arguments: start the terminal player.
    Tui,
    Add(Vec<PathBuf>),
    Import(PathBuf),
    Export(PathBuf),
    Help,
}

fn single_path(name: &str, mut rest: impl Iterator<Item = String>) -> anyhow::Result<PathBuf> {
    let Some(path) = rest.next() else {
        bail!("{name} needs a file\n{USAGE}");
    };
    if rest.next().is_some() {
        bail!("{name} takes exactly one file\n{USAGE}");
    }
    Ok(PathBuf::from(path))
}

/// Parse the arguments after the program name.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Command> {
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Ok(Command::Tui);
    };
    match first.as_str() {
        "add" => {
            let paths: Vec<PathBuf> = args.map(PathBuf::from).collect();
            if paths.is_empty() {
                bail!("add needs at least one path\n{USAGE}");
            }
            Ok(Command::Add(paths))
        }
        "import" => single_path("import", args).map(Command::Import),
        "export" => single_path("export", args).map(Command::Export),
        "-h" | "--help" | "help" => Ok(Command::Help),
        other => bail!("unknown command `{other}`\n{USAGE}"),
    }
}

/// Run a non-interactive command against the library on disk.
pub fn run_command(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Tui => super::run(settings),
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Add(paths) => {
            let store = open_store(settings)?;
            let found = library::ingest(&paths, &settings.library);
            let mut added = 0usize;
            for item in found {
                store
                    .put_payload(&item.track.id, &item.payload)
                    .and_then(|()| store.put_track(&item.track))
                    .with_context(|| format!("cannot store {}", item.track.name))?;
                added += 1;
            }
            info!(added, "ingested from command line");
            println!("added {added} track(s)");
            Ok(())
        }
        Command::Import(path) => {
            let plan = read_import(&path)
                .with_context(|| format!("cannot import {}", path.display()))?;
            let store = open_store(settings)?;
            let summary = apply_import(&store, plan)?;

            let prefs = prefs_file(settings);
            let mut current = prefs.load();
            current.active_playlist_id = summary.active_playlist_id;
            if let Err(e) = prefs.save(&current) {
                warn!(error = %e, "cannot save preferences");
            }
            println!(
                "imported {} track(s), {} playlist(s)",
                summary.tracks, summary.playlists
            );
            Ok(())
        }
        Command::Export(path) => {
            let store = open_store(settings)?;
            let active = prefs_file(settings).load().active_playlist_id;
            let file = write_export(&store, active.as_ref(), &path)
                .with_context(|| format!("cannot export to {}", path.display()))?;
            println!(
                "exported {} track(s), {} playlist(s) to {}",
                file.tracks.len(),
                file.playlists.len(),
                path.display()
            );
            Ok(())
        }
    }
}
