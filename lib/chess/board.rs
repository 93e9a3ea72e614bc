use crate::chess::{Color, Piece, Role, Square};
use arrayvec::ArrayVec;
use derive_more::{DebugCustom, Display, Error};
use std::fmt::{self, Formatter};
use std::ops::{Deref, Index};
use std::str::FromStr;

/// The chess board.
///
/// Pure piece placement, it knows nothing about the rules of the game.
#[derive(DebugCustom, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[debug(fmt = "Board(\"{}\")", self)]
pub struct Board([[Option<Piece>; 8]; 8]);

/// The standard starting position.
impl Default for Board {
    fn default() -> Self {
        use Role::*;
        let back = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = Board::empty();
        for c in Color::iter() {
            for (col, &r) in (0u8..).zip(back.iter()) {
                board.0[c.back_row() as usize][col as usize] = Some(Piece(c, r));
                board.0[c.pawn_row() as usize][col as usize] = Some(Piece(c, Pawn));
            }
        }

        board
    }
}

impl Board {
    /// A board without pieces.
    pub fn empty() -> Self {
        Board([[None; 8]; 8])
    }

    /// The [`Piece`] on the given [`Square`], if any.
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.0[sq.row() as usize][sq.col() as usize]
    }

    /// Places a [`Piece`] on the given [`Square`], or clears it.
    pub fn set(&mut self, sq: Square, p: Option<Piece>) {
        self.0[sq.row() as usize][sq.col() as usize] = p;
    }

    /// Whether the given [`Square`] is empty.
    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Moves whatever stands on `whence` to `whither`, leaving `whence` empty.
    ///
    /// No rules are checked, a piece on `whither` is simply overwritten.
    pub fn relocate(&mut self, whence: Square, whither: Square) {
        let p = self.get(whence);
        self.set(whither, p);
        self.set(whence, None);
    }

    /// Relocates a piece until the returned guard is dropped.
    ///
    /// Every square touched is restored to its exact prior contents when the
    /// [`Speculation`] goes out of scope, even while unwinding.
    pub fn speculate(&mut self, whence: Square, whither: Square) -> Speculation<'_> {
        let mut saved = ArrayVec::new();
        saved.push((whence, self.get(whence)));
        saved.push((whither, self.get(whither)));
        self.relocate(whence, whither);
        Speculation { board: self, saved }
    }

    /// An iterator over all pieces on the board.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|sq| Some((sq, self.get(sq)?)))
    }

    /// [`Square`]s occupied by a [`Color`].
    pub fn by_color(&self, c: Color) -> impl Iterator<Item = Square> + '_ {
        self.iter()
            .filter(move |(_, p)| p.color() == c)
            .map(|(sq, _)| sq)
    }

    /// [`Square`] occupied by the king of a [`Color`], if any.
    pub fn king(&self, c: Color) -> Option<Square> {
        let king = Piece(c, Role::King);
        self.iter().find(|&(_, p)| p == king).map(|(sq, _)| sq)
    }
}

/// Retrieves the [`Piece`] at a given [`Square`], if any.
impl Index<Square> for Board {
    type Output = Option<Piece>;

    fn index(&self, sq: Square) -> &Self::Output {
        &self.0[sq.row() as usize][sq.col() as usize]
    }
}

/// A temporary relocation on a [`Board`], see [`Board::speculate`].
#[derive(Debug)]
pub struct Speculation<'a> {
    board: &'a mut Board,
    saved: ArrayVec<(Square, Option<Piece>), 3>,
}

impl Speculation<'_> {
    /// Also clears a third [`Square`] for the duration of the speculation.
    ///
    /// # Panics
    ///
    /// Panics if called more than once on the same speculation.
    pub fn remove(mut self, sq: Square) -> Self {
        self.saved.push((sq, self.board.get(sq)));
        self.board.set(sq, None);
        self
    }
}

impl Deref for Speculation<'_> {
    type Target = Board;

    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl Drop for Speculation<'_> {
    fn drop(&mut self) {
        for &(sq, p) in self.saved.iter().rev() {
            self.board.set(sq, p);
        }
    }
}

/// Prints the piece placement one rank per line segment, from the eighth rank
/// down, with runs of empty squares collapsed into digits.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (row, squares) in self.0.iter().enumerate() {
            if row > 0 {
                f.write_str("/")?;
            }

            let mut skip = 0;
            for p in squares {
                match p {
                    None => skip += 1,
                    Some(p) => {
                        if skip > 0 {
                            write!(f, "{}", skip)?;
                            skip = 0;
                        }

                        write!(f, "{}", p)?;
                    }
                }
            }

            if skip > 0 {
                write!(f, "{}", skip)?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing [`Board`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse board, expected eight ranks of pieces and empty squares")]
pub struct ParseBoardError;

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Board::empty();
        let ranks: Vec<_> = s.split('/').collect();

        if ranks.len() != 8 {
            return Err(ParseBoardError);
        }

        for (row, rank) in ranks.into_iter().enumerate() {
            let mut col = 0;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    col += skip as usize;
                } else {
                    let mut buffer = [0; 4];
                    let p = c.encode_utf8(&mut buffer).parse().map_err(|_| ParseBoardError)?;
                    *board.0[row].get_mut(col).ok_or(ParseBoardError)? = Some(p);
                    col += 1;
                }
            }

            if col != 8 {
                return Err(ParseBoardError);
            }
        }

        Ok(board)
    }
}
