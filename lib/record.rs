use crate::chess::{Game, Move, MoveError, ParseMoveError};
use crate::clock::Clock;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use std::{fmt, fs, io, path::Path, str::FromStr};
use tracing::{info, instrument};

/// A persistent record of a finished or interrupted [`Game`].
///
/// Moves are stored as pairs of squares, e.g. `"e2 e4"`, and the game is
/// reconstructed by replaying them from the starting position.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename = "game")]
pub struct Record {
    /// When the record was made.
    #[serde(with = "humantime_serde")]
    pub date: SystemTime,

    /// The name of the White player.
    pub white: String,

    /// The name of the Black player.
    pub black: String,

    /// A human-readable summary of the state of the game.
    pub result: String,

    /// The moves played, oldest first.
    pub moves: Vec<String>,
}

/// The reason why storing, loading, or replaying a [`Record`] failed.
#[derive(Debug, Display, Error)]
pub enum RecordError {
    #[display(fmt = "failed to access the game record")]
    Io(io::Error),

    #[display(fmt = "failed to parse the game record")]
    Parse(ron::de::SpannedError),

    #[display(fmt = "failed to serialize the game record")]
    Serialize(ron::Error),

    #[display(fmt = "move #{} `{}` is malformed", ply, text)]
    InvalidMove {
        ply: usize,
        text: String,
        source: ParseMoveError,
    },

    #[display(fmt = "move #{} cannot be replayed", ply)]
    Replay { ply: usize, source: MoveError },
}

impl From<io::Error> for RecordError {
    fn from(e: io::Error) -> Self {
        RecordError::Io(e)
    }
}

impl From<ron::de::SpannedError> for RecordError {
    fn from(e: ron::de::SpannedError) -> Self {
        RecordError::Parse(e)
    }
}

impl From<ron::Error> for RecordError {
    fn from(e: ron::Error) -> Self {
        RecordError::Serialize(e)
    }
}

impl Record {
    /// Records the current state of a [`Game`].
    pub fn new<C: Clock>(game: &Game<C>, white: &str, black: &str) -> Self {
        Record {
            date: SystemTime::now(),
            white: white.into(),
            black: black.into(),
            result: game.summary(),
            moves: game
                .history()
                .iter()
                .map(|m| format!("{} {}", m.whence(), m.whither()))
                .collect(),
        }
    }

    /// Replays the recorded moves against a new [`Game`].
    ///
    /// Nothing is returned unless every move replays successfully.
    #[instrument(level = "debug", skip(self), err, fields(moves = self.moves.len()))]
    pub fn replay(&self) -> Result<Game, RecordError> {
        let mut game = Game::new();

        for (i, text) in self.moves.iter().enumerate() {
            let ply = i + 1;

            let m: Move = text.parse().map_err(|source| RecordError::InvalidMove {
                ply,
                text: text.clone(),
                source,
            })?;

            game.apply(m.whence(), m.whither())
                .map_err(|source| RecordError::Replay { ply, source })?;
        }

        Ok(game)
    }

    /// Writes this record to a file, replacing it if it exists.
    #[instrument(level = "debug", skip(self), err)]
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let pretty = ron::ser::PrettyConfig::default();
        fs::write(path, ron::ser::to_string_pretty(self, pretty)?)?;
        info!(path = %path.display(), moves = self.moves.len(), "saved game");
        Ok(())
    }

    /// Reads a record from a file.
    #[instrument(level = "debug", err)]
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let record: Record = fs::read_to_string(path)?.parse()?;
        info!(path = %path.display(), moves = record.moves.len(), "loaded game");
        Ok(record)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = ron::ser::PrettyConfig::default();
        let s = ron::ser::to_string_pretty(self, pretty).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for Record {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}
