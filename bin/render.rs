use derive_more::Constructor;
use lib::chess::{Board, Square};
use std::fmt::{self, Display};
use std::time::Duration;

/// A text diagram of the [`Board`], White at the bottom.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Constructor)]
pub struct Diagram {
    board: Board,
    ascii: bool,
}

impl Diagram {
    fn files(f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "  ")?;
        for file in 'a'..='h' {
            write!(f, "   {}", file)?;
        }

        Ok(())
    }
}

impl Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Diagram::files(f)?;
        writeln!(f)?;
        writeln!(f, "   +---+---+---+---+---+---+---+---+")?;

        for row in 0..8 {
            let rank = 8 - row;
            write!(f, " {} |", rank)?;

            for col in 0..8 {
                match self.board[Square::at(row, col)] {
                    Some(p) if self.ascii => write!(f, " {} |", p)?,
                    Some(p) => write!(f, " {} |", p.glyph())?,
                    None => write!(f, "   |")?,
                }
            }

            writeln!(f, " {}", rank)?;
            writeln!(f, "   +---+---+---+---+---+---+---+---+")?;
        }

        Diagram::files(f)
    }
}

/// Time left on a clock, as `mm:ss`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Countdown(pub Duration);

impl Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let secs = self.0.as_secs();
        write!(f, "{:02}:{:02}", secs / 60, secs % 60)
    }
}
