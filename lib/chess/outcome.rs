use super::Color;
use derive_more::Display;

/// How a game between two players ended.
///
/// Prints as the sentence shown to the players once the game is over.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Outcome {
    /// The side that delivered checkmate.
    #[display(fmt = "{} wins by checkmate", _0)]
    Checkmate(Color),

    /// The side whose clock ran out.
    #[display(fmt = "{} ran out of time, {} wins", _0, "!*_0")]
    LossOnTime(Color),

    #[display(fmt = "draw by stalemate")]
    Stalemate,

    /// Fifty moves by each side without a capture or a pawn move.
    #[display(fmt = "draw by the fifty-move rule")]
    DrawBy50MoveRule,
}

impl Outcome {
    /// Whether the outcome is a [draw] and neither side has won.
    ///
    /// [draw]: https://www.chessprogramming.org/Draw
    pub fn is_draw(&self) -> bool {
        !self.is_decisive()
    }

    /// Whether the outcome is a decisive and one of the sides has won.
    pub fn is_decisive(&self) -> bool {
        matches!(self, Outcome::Checkmate(_) | Outcome::LossOnTime(_))
    }

    /// The winning side, if the outcome is [decisive](`Self::is_decisive`).
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate(c) => Some(c),
            Outcome::LossOnTime(c) => Some(!c),
            _ => None,
        }
    }
}
