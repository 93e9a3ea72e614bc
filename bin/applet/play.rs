use crate::io::Terminal;
use crate::render::{Countdown, Diagram};
use anyhow::Error as Anyhow;
use clap::Parser;
use lib::chess::{Color, Game, GameStatus, Move, Square};
use lib::clock::{Chessclock, Clock, TimeControl};
use lib::record::Record;
use std::fmt::Write as _;
use std::io::{self, stdin, stdout, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Commands understood at the move prompt.
#[derive(Debug, Clone, Eq, PartialEq, Parser)]
#[clap(
    name = "",
    multicall = true,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
enum Cmd {
    /// Move a piece, e.g. `move e2 e4` or simply `e2 e4`.
    Move {
        /// The square the piece moves from.
        whence: Square,
        /// The square the piece moves to.
        whither: Square,
    },

    /// List the legal moves of the side to move.
    Moves,

    /// Leave the game.
    Quit,
}

/// Plays a game between two people sharing the terminal.
#[derive(Debug, Parser)]
pub struct Play {
    /// The name of the player with the white pieces.
    #[clap(short, long, default_value = "White")]
    white: String,

    /// The name of the player with the black pieces.
    #[clap(short, long, default_value = "Black")]
    black: String,

    /// The time control.
    #[clap(short, long, default_value_t)]
    clock: TimeControl,

    /// Play without a clock.
    #[clap(long, conflicts_with = "clock")]
    no_clock: bool,

    /// Resume the game stored in this file.
    #[clap(short, long)]
    load: Option<PathBuf>,

    /// Store the game in this file once it's over or abandoned.
    #[clap(short, long)]
    save: Option<PathBuf>,

    /// Draw the board with letters instead of chess figurines.
    #[clap(long)]
    ascii: bool,
}

impl Default for Play {
    fn default() -> Self {
        Play {
            white: "White".into(),
            black: "Black".into(),
            clock: TimeControl::default(),
            no_clock: false,
            load: None,
            save: None,
            ascii: false,
        }
    }
}

impl Play {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let game = match &self.load {
            None => Game::new(),
            Some(path) => Record::load(path)?.replay()?,
        };

        let mut game = if self.no_clock {
            game
        } else {
            game.with_clock(Chessclock::new(self.clock))
        };

        if let Some(clock) = game.clock() {
            info!(control = %clock.control(), "clock started");
        }

        let mut term = Terminal::new(stdout(), stdin());
        self.run(&mut game, &mut term)?;

        if let Some(path) = &self.save {
            Record::new(&game, &self.white, &self.black).save(path)?;
        }

        info!(result = %game.summary(), moves = game.history().len(), "game ended");

        Ok(())
    }

    /// Prompts the players for moves until the game is over or abandoned.
    fn run<C, W, R>(&self, game: &mut Game<C>, term: &mut Terminal<W, R>) -> io::Result<()>
    where
        C: Clock,
        W: Write,
        R: Read,
    {
        loop {
            term.send(Diagram::new(*game.board(), self.ascii))?;
            term.send(self.banner(game))?;

            if game.status().is_terminal() {
                return Ok(());
            }

            let line = match term.prompt(format_args!("{} > ", self.name(game.turn())))? {
                None => return Ok(()),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => line,
            };

            let (whence, whither) = match line.parse::<Move>() {
                Ok(m) => (m.whence(), m.whither()),
                Err(_) => match Cmd::try_parse_from(line.split_whitespace()) {
                    Ok(Cmd::Move { whence, whither }) => (whence, whither),
                    Ok(Cmd::Quit) => return Ok(()),
                    Ok(Cmd::Moves) => {
                        let moves: Vec<_> = game.moves().iter().map(Move::to_string).collect();
                        term.send(moves.join(" "))?;
                        continue;
                    }
                    Err(e) => {
                        term.send(e)?;
                        continue;
                    }
                },
            };

            if let Err(e) = game.apply(whence, whither) {
                debug!(%e, "move rejected");
                term.send(e)?;
            }
        }
    }

    fn name(&self, side: Color) -> &str {
        match side {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// Whose turn it is, or how the game ended, followed by the clocks.
    fn banner<C: Clock>(&self, game: &Game<C>) -> String {
        let turn = game.turn();

        let mut banner = match game.status() {
            GameStatus::InProgress => format!("{} ({}) to move", self.name(turn), turn),
            GameStatus::Check => format!("{} ({}) to move, in check", self.name(turn), turn),
            _ => game.summary(),
        };

        if let Some(clock) = game.clock() {
            for side in Color::iter() {
                let remaining = Countdown(clock.remaining(side));
                write!(banner, " | {} {}", self.name(side), remaining).ok();
            }
        }

        banner
    }
}
