use derive_more::Display;

/// The lifecycle state of a [`Game`][`crate::chess::Game`].
///
/// Only [`GameStatus::InProgress`] and [`GameStatus::Check`] accept further moves.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum GameStatus {
    #[display(fmt = "in progress")]
    InProgress,
    #[display(fmt = "check")]
    Check,
    #[display(fmt = "checkmate")]
    Checkmate,
    #[display(fmt = "stalemate")]
    Stalemate,
    #[display(fmt = "draw")]
    Draw,
    #[display(fmt = "time out")]
    TimeOut,
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::InProgress
    }
}

impl GameStatus {
    /// Whether the game is over.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress | GameStatus::Check)
    }
}
