use crate::applet::Applet;
use anyhow::{Context, Error as Anyhow};
use clap::Parser;
use std::{cmp::min, fs::File, io::stderr, path::PathBuf, sync::Mutex};
use tracing::{instrument, Level};
use tracing_subscriber::fmt::{format::FmtSpan, layer};
use tracing_subscriber::{filter::Targets, prelude::*, registry, util::SubscriberInitExt};

/// Chess for two players sharing a terminal.
#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// Verbosity level.
    #[clap(short, long)]
    #[cfg_attr(not(debug_assertions), clap(default_value_t = Level::WARN))]
    #[cfg_attr(debug_assertions, clap(default_value_t = Level::INFO))]
    verbosity: Level,

    /// Write logs to this file rather than interleaving them with the board.
    #[clap(short, long)]
    log: Option<PathBuf>,

    #[clap(subcommand)]
    applet: Option<Applet>,
}

impl Cli {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let filter = Targets::new()
            .with_target("chess", self.verbosity)
            .with_target("lib", self.verbosity)
            .with_default(min(Level::WARN, self.verbosity));

        let events = layer().with_span_events(FmtSpan::CLOSE);

        match &self.log {
            None => registry()
                .with(filter)
                .with(events.pretty().with_writer(stderr))
                .init(),

            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create `{}`", path.display()))?;

                registry()
                    .with(filter)
                    .with(events.with_ansi(false).with_writer(Mutex::new(file)))
                    .init()
            }
        }

        self.applet.unwrap_or_default().execute()
    }
}
