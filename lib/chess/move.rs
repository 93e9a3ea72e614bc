use crate::chess::{ParseRoleError, ParseSquareError, Role, Square};
use derive_more::{Constructor, DebugCustom, Display, Error, From};
use std::fmt::{self, Formatter};
use std::str::FromStr;

/// A chess move.
#[derive(DebugCustom, Copy, Clone, Eq, PartialEq, Hash, Constructor)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[debug(fmt = "Move(\"{}\")", self)]
pub struct Move {
    whence: Square,
    whither: Square,
    promotion: Option<Role>,
}

impl Move {
    /// The source [`Square`].
    pub fn whence(&self) -> Square {
        self.whence
    }

    /// The destination [`Square`].
    pub fn whither(&self) -> Square {
        self.whither
    }

    /// The [`Role`] a pawn was promoted to, if any.
    pub fn promotion(&self) -> Option<Role> {
        self.promotion
    }
}

/// Prints the move in coordinate notation, e.g. `e2e4` or `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.whence, self.whither)?;

        if let Some(r) = self.promotion {
            write!(f, "{}", r)?;
        }

        Ok(())
    }
}

/// The reason why parsing [`Move`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseMoveError {
    #[display(fmt = "expected two squares, optionally followed by a promotion")]
    InvalidLength,

    #[display(fmt = "invalid square; {}", _0)]
    InvalidSquare(ParseSquareError),

    #[display(fmt = "invalid promotion; {}", _0)]
    InvalidPromotion(ParseRoleError),
}

/// Parses coordinate notation, either as a single word (`e2e4`, `e7e8q`) or
/// as separate words for each square and the promotion (`e2 e4`, `e7 e8 q`).
impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();

        let (whence, whither, promotion) = match *words.as_slice() {
            [m] if m.len() == 4 || m.len() == 5 => match (m.get(..2), m.get(2..4), m.get(4..)) {
                (Some(a), Some(b), Some(r)) => (a, b, r),
                _ => return Err(ParseMoveError::InvalidLength),
            },
            [a, b] if a.len() == 2 && b.len() == 2 => (a, b, ""),
            [a, b, r] if a.len() == 2 && b.len() == 2 => (a, b, r),
            _ => return Err(ParseMoveError::InvalidLength),
        };

        Ok(Move {
            whence: whence.parse()?,
            whither: whither.parse()?,
            promotion: match promotion {
                "" => None,
                r => Some(r.parse()?),
            },
        })
    }
}
