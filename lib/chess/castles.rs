use crate::chess::{Color, Square};
use bitflags::bitflags;
use derive_more::{Display, Error};
use std::fmt::{self, Formatter, Write};
use std::str::FromStr;

bitflags! {
    /// The castling rights in a chess [`Position`][`crate::chess::Position`].
    ///
    /// Rights are only ever revoked, never granted back.
    pub struct Castles: u8 {
        const WHITE_SHORT = 0b0001;
        const WHITE_LONG =  0b0010;
        const BLACK_SHORT = 0b0100;
        const BLACK_LONG =  0b1000;
    }
}

impl Castles {
    /// The kingside castling right of the given side.
    pub fn short(side: Color) -> Self {
        match side {
            Color::White => Castles::WHITE_SHORT,
            Color::Black => Castles::BLACK_SHORT,
        }
    }

    /// The queenside castling right of the given side.
    pub fn long(side: Color) -> Self {
        match side {
            Color::White => Castles::WHITE_LONG,
            Color::Black => Castles::BLACK_LONG,
        }
    }

    /// Whether the given side has kingside castling rights.
    pub fn has_short(&self, side: Color) -> bool {
        self.contains(Castles::short(side))
    }

    /// Whether the given side has queenside castling rights.
    pub fn has_long(&self, side: Color) -> bool {
        self.contains(Castles::long(side))
    }

    /// The original square of the king of the given side.
    pub fn king_square(side: Color) -> Square {
        Square::at(side.back_row(), 4)
    }

    /// The original square of the kingside rook of the given side.
    pub fn short_rook_square(side: Color) -> Square {
        Square::at(side.back_row(), 7)
    }

    /// The original square of the queenside rook of the given side.
    pub fn long_rook_square(side: Color) -> Square {
        Square::at(side.back_row(), 0)
    }
}

/// All rights are available at the start of the game.
impl Default for Castles {
    fn default() -> Self {
        Castles::all()
    }
}

/// The rights lost once anything moves from or onto the given [`Square`].
impl From<Square> for Castles {
    fn from(sq: Square) -> Self {
        Color::iter().fold(Castles::empty(), |rights, side| {
            if sq == Castles::king_square(side) {
                rights | Castles::short(side) | Castles::long(side)
            } else if sq == Castles::short_rook_square(side) {
                rights | Castles::short(side)
            } else if sq == Castles::long_rook_square(side) {
                rights | Castles::long(side)
            } else {
                rights
            }
        })
    }
}

/// Prints the rights like FEN does, e.g. `KQkq`, or `-` if there are none.
impl fmt::Display for Castles {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_char('-');
        }

        for (right, c) in [
            (Castles::WHITE_SHORT, 'K'),
            (Castles::WHITE_LONG, 'Q'),
            (Castles::BLACK_SHORT, 'k'),
            (Castles::BLACK_LONG, 'q'),
        ] {
            if self.contains(right) {
                f.write_char(c)?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing [`Castles`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse castling rights, expected `-` or a subset of `KQkq`")]
pub struct ParseCastlesError;

impl FromStr for Castles {
    type Err = ParseCastlesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Castles::empty());
        }

        let mut castles = Castles::empty();

        for c in s.chars() {
            let right = match c {
                'K' => Castles::WHITE_SHORT,
                'Q' => Castles::WHITE_LONG,
                'k' => Castles::BLACK_SHORT,
                'q' => Castles::BLACK_LONG,
                _ => return Err(ParseCastlesError),
            };

            if castles.contains(right) {
                return Err(ParseCastlesError);
            }

            castles |= right;
        }

        if castles.is_empty() {
            Err(ParseCastlesError)
        } else {
            Ok(castles)
        }
    }
}
