use crate::io::Terminal;
use crate::render::Diagram;
use anyhow::Error as Anyhow;
use clap::Parser;
use humantime_serde::re::humantime::format_rfc3339_seconds;
use lib::chess::Game;
use lib::record::Record;
use std::io::{stdin, stdout, Read, Write};
use std::path::PathBuf;
use tracing::{instrument, warn};

/// Steps through a stored game move by move.
#[derive(Debug, Parser)]
pub struct Replay {
    /// Draw the board with letters instead of chess figurines.
    #[clap(long)]
    ascii: bool,

    /// The file the game is stored in.
    file: PathBuf,
}

impl Replay {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let record = Record::load(&self.file)?;
        let game = record.replay()?;

        if game.summary() != record.result {
            warn!(recorded = %record.result, replayed = %game.summary(), "result mismatch");
        }

        let mut term = Terminal::new(stdout(), stdin());
        self.show(&record, &game, &mut term)?;

        Ok(())
    }

    fn show<W: Write, R: Read>(
        &self,
        record: &Record,
        game: &Game,
        term: &mut Terminal<W, R>,
    ) -> Result<(), Anyhow> {
        term.send(format_args!(
            "{} (white) vs {} (black), {}",
            record.white,
            record.black,
            format_rfc3339_seconds(record.date)
        ))?;

        let mut replay = Game::new();
        term.send(Diagram::new(*replay.board(), self.ascii))?;

        for (i, m) in game.history().iter().enumerate() {
            replay.apply(m.whence(), m.whither())?;
            term.send(format_args!("{}. {}", i + 1, m))?;
            term.send(Diagram::new(*replay.board(), self.ascii))?;
        }

        term.send(game.summary())?;

        Ok(())
    }
}
