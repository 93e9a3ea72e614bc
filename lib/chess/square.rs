use derive_more::{DebugCustom, Display, Error};
use std::fmt::{self, Formatter};
use std::str::FromStr;

/// A square of the chess board.
///
/// Row 0 is the eighth rank, as seen from White's side of the board, and
/// column 0 is the `a` file.
#[derive(DebugCustom, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[debug(fmt = "{}", self)]
pub struct Square {
    #[cfg_attr(test, strategy(0u8..8))]
    row: u8,
    #[cfg_attr(test, strategy(0u8..8))]
    col: u8,
}

impl Square {
    /// Constructs [`Square`] from a row and a column, if both are on the board.
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Square { row, col })
        } else {
            None
        }
    }

    /// Constructs [`Square`] from a row and a column.
    ///
    /// # Panics
    ///
    /// Panics if either is not in the range (0..=7).
    pub fn at(row: u8, col: u8) -> Self {
        Square::new(row, col).unwrap()
    }

    /// This square's row in the range (0..=7), 0 being the eighth rank.
    pub fn row(&self) -> u8 {
        self.row
    }

    /// This square's column in the range (0..=7), 0 being the `a` file.
    pub fn col(&self) -> u8 {
        self.col
    }

    /// The square displaced by the given number of rows and columns, if still on the board.
    pub fn offset(&self, rows: i8, cols: i8) -> Option<Self> {
        let row = u8::try_from((self.row as i8).checked_add(rows)?).ok()?;
        let col = u8::try_from((self.col as i8).checked_add(cols)?).ok()?;
        Square::new(row, col)
    }

    /// Returns an iterator over all squares, row by row starting at `a8`.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0u8..64).map(|i| Square {
            row: i / 8,
            col: i % 8,
        })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.col);
        let rank = char::from(b'8' - self.row);
        write!(f, "{}{}", file, rank)
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum ParseSquareError {
    #[display(fmt = "expected a file followed by a rank, got `{}`", _0)]
    InvalidLength(#[error(not(source))] String),

    #[display(fmt = "expected file in the range `('a'..='h')`, got `{}`", _0)]
    InvalidFile(#[error(not(source))] char),

    #[display(fmt = "expected rank in the range `('1'..='8')`, got `{}`", _0)]
    InvalidRank(#[error(not(source))] char),
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();

        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file, rank),
            _ => return Err(ParseSquareError::InvalidLength(s.into())),
        };

        if !('a'..='h').contains(&file) {
            return Err(ParseSquareError::InvalidFile(file));
        }

        if !('1'..='8').contains(&rank) {
            return Err(ParseSquareError::InvalidRank(rank));
        }

        Ok(Square {
            row: b'8' - rank as u8,
            col: file as u8 - b'a',
        })
    }
}
