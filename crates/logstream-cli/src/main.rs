use std::io;

use clap::Parser;
use logstream_cli::{run, Cli};
use logstream_logging::LogStreamSubscriberBuilder;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let _guard = LogStreamSubscriberBuilder::new()
        .with_config(config.logging.clone())
        .try_init()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli.command, &config.store, &mut out)
}
