use std::io::Write;

use anyhow::{bail, Context};
use logstream_store::{LogStore, LogStoreConfig, DELIMITER};
use tracing::debug;

use crate::config::Command;

/// Execute `command`, writing its output to `out`
pub fn run<W: Write>(command: &Command, config: &LogStoreConfig, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Info { path } => {
            let store = open_existing(path, config)?;
            writeln!(out, "{store}")?;
        }

        Command::Append { path, payloads } => {
            if let Some(bad) = payloads.iter().find(|p| p.as_bytes().contains(&DELIMITER)) {
                bail!("payload {bad:?} contains a newline, which would split the record");
            }
            let mut store = LogStore::open_with_config(path, config.clone())
                .with_context(|| format!("opening {}", path.display()))?;
            for payload in payloads {
                let index = store.append(payload.as_bytes())?;
                writeln!(out, "{index}")?;
            }
            store.close()?;
        }

        Command::Get { path, index } => {
            let mut store = open_existing(path, config)?;
            let entry = store.entry(*index)?;
            writeln!(out, "{}", String::from_utf8_lossy(&entry))?;
        }

        Command::Last { path } => {
            let store = open_existing(path, config)?;
            match store.last_index() {
                Some(index) => writeln!(
                    out,
                    "{index}\t{}",
                    String::from_utf8_lossy(&store.last_entry())
                )?,
                None => bail!("log {} is empty", path.display()),
            }
        }

        Command::Dump { path, from } => {
            let mut store = open_existing(path, config)?;
            let Some(start) = (*from).or(store.start_index()) else {
                debug!(path = %path.display(), "Nothing to dump");
                return Ok(());
            };
            for (i, entry) in store.entries_from(start)?.iter().enumerate() {
                let index = start + i as u64;
                writeln!(out, "{index}\t{}", String::from_utf8_lossy(entry))?;
            }
        }
    }
    Ok(())
}

/// Inspection commands never create a log file
fn open_existing(path: &std::path::Path, config: &LogStoreConfig) -> anyhow::Result<LogStore> {
    let config = config.clone().with_create_if_missing(false);
    LogStore::open_with_config(path, config).with_context(|| format!("opening {}", path.display()))
}
