use crate::chess::{destinations, Board, Castles, Color, Move, Piece, Role, Square};
use crate::chess::{ParseBoardError, ParseCastlesError, ParseSquareError};
use derive_more::{DebugCustom, Display, Error, From};
use proptest::sample::{Selector, SelectorStrategy};
use proptest::{prelude::*, strategy::Map};
use std::ops::Range;
use std::str::FromStr;

/// Represents an illegal move in a given [`Position`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[display(fmt = "moving from `{_0}` to `{_1}` is illegal in this position")]
pub struct IllegalMove(pub Square, pub Square);

/// The reason why a [`Position`] cannot be set up.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum IllegalPosition {
    #[display(fmt = "the {} king is missing", _0)]
    MissingKing(#[error(not(source))] Color),

    #[display(fmt = "there is more than one {} king", _0)]
    TooManyKings(#[error(not(source))] Color),

    #[display(fmt = "pawns cannot stand on the first or eighth rank")]
    PawnsOnBackRank,

    #[display(fmt = "the {} king is in check, but it's not its turn", _0)]
    OppositeCheck(#[error(not(source))] Color),

    #[display(fmt = "castling rights `{}` require the king and rook on their original squares", _0)]
    InvalidCastlingRights(#[error(not(source))] Castles),

    #[display(fmt = "`{}` is not a valid en passant target square", _0)]
    InvalidEnPassantSquare(#[error(not(source))] Square),
}

/// The state of the rules of chess at some point of a game.
///
/// Beyond the [`Board`], it tracks whose turn it is, castling rights, the en
/// passant target square and the move counters.
#[derive(DebugCustom, Clone, Eq, PartialEq, Hash)]
#[debug(fmt = "Position(\"{}\")", self)]
pub struct Position {
    board: Board,
    turn: Color,
    castles: Castles,
    en_passant: Option<Square>,
    halfmoves: u32,
    fullmoves: u32,
}

/// The standard starting position.
impl Default for Position {
    fn default() -> Self {
        Position {
            board: Board::default(),
            turn: Color::White,
            castles: Castles::all(),
            en_passant: None,
            halfmoves: 0,
            fullmoves: 1,
        }
    }
}

/// Positions reached by playing a random number of legal moves from the start.
impl Arbitrary for Position {
    type Parameters = ();
    type Strategy = Map<(Range<usize>, SelectorStrategy), fn((usize, Selector)) -> Position>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0..64, any::<Selector>()).prop_map(|(plies, selector)| {
            let mut pos = Position::default();

            for _ in 0..plies {
                match selector.try_select(pos.moves()) {
                    None => break,
                    Some(m) => {
                        if pos.play(m.whence(), m.whither()).is_err() {
                            break;
                        }
                    }
                }
            }

            pos
        })
    }
}

impl Position {
    /// Sets up a [`Position`] from its parts.
    ///
    /// Fails unless each side has exactly one king, pawns are off the back
    /// ranks, the side that just moved is not in check, castling rights match
    /// the placement of kings and rooks, and the en passant target square sits
    /// right behind a pawn that could have just advanced two squares.
    pub fn new(
        board: Board,
        turn: Color,
        castles: Castles,
        en_passant: Option<Square>,
        halfmoves: u32,
        fullmoves: u32,
    ) -> Result<Self, IllegalPosition> {
        for c in Color::iter() {
            match board.iter().filter(|&(_, p)| p == Piece(c, Role::King)).count() {
                0 => return Err(IllegalPosition::MissingKing(c)),
                1 => {}
                _ => return Err(IllegalPosition::TooManyKings(c)),
            }
        }

        let on_back_rank = |sq: Square| sq.row() == 0 || sq.row() == 7;
        if board.iter().any(|(sq, p)| p.role() == Role::Pawn && on_back_rank(sq)) {
            return Err(IllegalPosition::PawnsOnBackRank);
        }

        for c in Color::iter() {
            let rights = [
                (Castles::short(c), Castles::short_rook_square(c)),
                (Castles::long(c), Castles::long_rook_square(c)),
            ];

            for (right, rook) in rights {
                if castles.contains(right)
                    && (board[Castles::king_square(c)] != Some(Piece(c, Role::King))
                        || board[rook] != Some(Piece(c, Role::Rook)))
                {
                    return Err(IllegalPosition::InvalidCastlingRights(castles));
                }
            }
        }

        if let Some(ep) = en_passant {
            let mover = !turn;
            let pushed = ep.offset(mover.forward(), 0);
            let is_behind_pawn = pushed.map_or(false, |sq| board[sq] == Some(Piece(mover, Role::Pawn)));
            let is_on_skipped_row = ep.row() as i8 == mover.pawn_row() as i8 + mover.forward();

            if !board.is_empty(ep) || !is_on_skipped_row || !is_behind_pawn {
                return Err(IllegalPosition::InvalidEnPassantSquare(ep));
            }
        }

        let pos = Position {
            board,
            turn,
            castles,
            en_passant,
            halfmoves,
            fullmoves: fullmoves.max(1),
        };

        if pos.is_check(!turn) {
            return Err(IllegalPosition::OppositeCheck(!turn));
        }

        Ok(pos)
    }

    /// The current piece placement.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The castling rights still available.
    pub fn castles(&self) -> Castles {
        self.castles
    }

    /// The [en passant] target square, if the last move was a pawn double step.
    ///
    /// [en passant]: https://www.chessprogramming.org/En_passant
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// The number of halfmoves since the last capture or pawn advance.
    pub fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    /// The current move number, starting at 1 and incremented after Black moves.
    pub fn fullmoves(&self) -> u32 {
        self.fullmoves
    }

    /// Whether the king of `side` is attacked by any enemy piece.
    ///
    /// # Panics
    ///
    /// Panics if `side` has no king on the board.
    pub fn is_check(&self, side: Color) -> bool {
        is_attacked(&self.board, side)
    }

    /// Whether moving the piece on `whence` to `whither` would leave its own
    /// king in check.
    ///
    /// The move is tried out on the board and undone before returning. If
    /// `whither` holds a piece of the same color, nothing can move and this is
    /// whether that piece's side is in check right now; likewise for the side
    /// to move if `whence` is empty.
    pub fn would_leave_in_check(&mut self, whence: Square, whither: Square) -> bool {
        let side = match (self.board[whence], self.board[whither]) {
            (Some(p), Some(q)) if p.color() == q.color() => return self.is_check(p.color()),
            (Some(p), _) => p.color(),
            (None, _) => return self.is_check(self.turn),
        };

        let captured = self.en_passant_capture(whence, whither);
        let speculation = self.board.speculate(whence, whither);

        match captured {
            None => is_attacked(&speculation, side),
            Some(sq) => is_attacked(&speculation.remove(sq), side),
        }
    }

    /// Whether the side to move may move the piece on `whence` to `whither`.
    pub fn is_legal(&mut self, whence: Square, whither: Square) -> bool {
        self.is_legal_for(self.turn, whence, whither)
    }

    /// Whether `side` has at least one legal move.
    pub fn has_legal_move(&mut self, side: Color) -> bool {
        for whence in self.board.by_color(side).collect::<Vec<_>>() {
            if Square::iter().any(|whither| self.is_legal_for(side, whence, whither)) {
                return true;
            }
        }

        false
    }

    /// All legal moves of the side to move.
    ///
    /// Pawns reaching the last rank are always promoted to a queen.
    pub fn moves(&mut self) -> Vec<Move> {
        let mut moves = Vec::new();

        for whence in self.board.by_color(self.turn).collect::<Vec<_>>() {
            let mut candidates = destinations(&self.board, whence, self.en_passant);

            if self.board[whence] == Some(Piece(self.turn, Role::King)) {
                candidates.extend([2, -2].into_iter().filter_map(|cols| whence.offset(0, cols)));
            }

            for whither in candidates {
                if self.is_legal(whence, whither) {
                    moves.push(Move::new(whence, whither, self.promotion(whence, whither)));
                }
            }
        }

        moves
    }

    /// Plays a move, if legal.
    ///
    /// Captures, en passant, castling, promotion, castling rights, the move
    /// counters and the turn are all updated accordingly. The position is left
    /// untouched if the move is illegal.
    pub fn play(&mut self, whence: Square, whither: Square) -> Result<Move, IllegalMove> {
        if !self.is_legal(whence, whither) {
            return Err(IllegalMove(whence, whither));
        }

        let Some(Piece(color, role)) = self.board[whence] else {
            return Err(IllegalMove(whence, whither));
        };

        let promotion = self.promotion(whence, whither);
        let en_passant = self.en_passant_capture(whence, whither);
        let is_capture = self.board[whither].is_some() || en_passant.is_some();

        if let Some(sq) = en_passant {
            self.board.set(sq, None);
        }

        self.en_passant = match role {
            Role::Pawn if whence.row().abs_diff(whither.row()) == 2 => {
                Square::new((whence.row() + whither.row()) / 2, whence.col())
            }
            _ => None,
        };

        if self.is_castling(whence, whither) {
            let (rook, col) = if whither.col() > whence.col() {
                (Castles::short_rook_square(color), 5)
            } else {
                (Castles::long_rook_square(color), 3)
            };

            self.board.relocate(rook, Square::at(whence.row(), col));
        }

        self.castles -= Castles::from(whence) | Castles::from(whither);
        self.board.relocate(whence, whither);

        if let Some(r) = promotion {
            self.board.set(whither, Some(Piece(color, r)));
        }

        if role == Role::Pawn || is_capture {
            self.halfmoves = 0;
        } else {
            self.halfmoves += 1;
        }

        if color == Color::Black {
            self.fullmoves += 1;
        }

        self.turn = !color;

        Ok(Move::new(whence, whither, promotion))
    }

    fn is_legal_for(&mut self, side: Color, whence: Square, whither: Square) -> bool {
        let role = match self.board[whence] {
            Some(Piece(c, r)) if c == side => r,
            _ => return false,
        };

        if matches!(self.board[whither], Some(p) if p.color() == side) {
            return false;
        }

        let is_reachable = if role == Role::King && self.is_castling(whence, whither) {
            self.can_castle(side, whence, whither)
        } else {
            let en_passant = self.en_passant.filter(|_| side == self.turn);
            destinations(&self.board, whence, en_passant).contains(&whither)
        };

        is_reachable && !self.would_leave_in_check(whence, whither)
    }

    /// Whether this is a king stepping two squares sideways from its original square.
    fn is_castling(&self, whence: Square, whither: Square) -> bool {
        match self.board[whence] {
            Some(Piece(c, Role::King)) => {
                whence == Castles::king_square(c)
                    && whither.row() == whence.row()
                    && whither.col().abs_diff(whence.col()) == 2
            }
            _ => false,
        }
    }

    /// Whether `side` may castle, ignoring whether the king's destination is attacked.
    fn can_castle(&mut self, side: Color, whence: Square, whither: Square) -> bool {
        let (right, rook) = if whither.col() > whence.col() {
            (Castles::short(side), Castles::short_rook_square(side))
        } else {
            (Castles::long(side), Castles::long_rook_square(side))
        };

        if !self.castles.contains(right) || self.board[rook] != Some(Piece(side, Role::Rook)) {
            return false;
        }

        let (lo, hi) = (whence.col().min(rook.col()), whence.col().max(rook.col()));
        if (lo + 1..hi).any(|col| !self.board.is_empty(Square::at(whence.row(), col))) {
            return false;
        }

        if self.is_check(side) {
            return false;
        }

        let transit = Square::at(whence.row(), (whence.col() + whither.col()) / 2);
        !self.would_leave_in_check(whence, transit)
    }

    /// The square of the pawn captured en passant by this move, if any.
    fn en_passant_capture(&self, whence: Square, whither: Square) -> Option<Square> {
        match self.board[whence] {
            Some(Piece(_, Role::Pawn))
                if Some(whither) == self.en_passant && whence.col() != whither.col() =>
            {
                Square::new(whence.row(), whither.col())
            }
            _ => None,
        }
    }

    /// The role a pawn automatically promotes to by this move, if any.
    fn promotion(&self, whence: Square, whither: Square) -> Option<Role> {
        match self.board[whence] {
            Some(Piece(c, Role::Pawn)) if whither.row() == c.promotion_row() => Some(Role::Queen),
            _ => None,
        }
    }
}

fn is_attacked(board: &Board, side: Color) -> bool {
    let king = match board.king(side) {
        Some(sq) => sq,
        None => panic!("the {} king is missing", side),
    };

    board
        .by_color(!side)
        .any(|sq| destinations(board, sq, None).contains(&king))
}

/// Prints the position like [FEN] does.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let turn = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };

        write!(f, "{} {} {} ", self.board, turn, self.castles)?;

        match self.en_passant {
            Some(sq) => write!(f, "{} ", sq)?,
            None => f.write_str("- ")?,
        }

        write!(f, "{} {}", self.halfmoves, self.fullmoves)
    }
}

/// The reason why parsing [`Position`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParsePositionError {
    #[display(fmt = "expected placement, side to move, castling rights, en passant square, halfmoves and fullmoves")]
    InvalidSyntax,

    #[display(fmt = "{}", _0)]
    InvalidBoard(ParseBoardError),

    #[display(fmt = "{}", _0)]
    InvalidCastles(ParseCastlesError),

    #[display(fmt = "{}", _0)]
    InvalidSquare(ParseSquareError),

    #[display(fmt = "{}", _0)]
    IllegalPosition(IllegalPosition),
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<_> = s.split_whitespace().collect();

        let &[board, turn, castles, en_passant, halfmoves, fullmoves] = fields.as_slice() else {
            return Err(ParsePositionError::InvalidSyntax);
        };

        let turn = match turn {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(ParsePositionError::InvalidSyntax),
        };

        let en_passant = match en_passant {
            "-" => None,
            sq => Some(sq.parse()?),
        };

        let halfmoves = halfmoves.parse().map_err(|_| ParsePositionError::InvalidSyntax)?;
        let fullmoves = fullmoves.parse().map_err(|_| ParsePositionError::InvalidSyntax)?;

        Ok(Position::new(
            board.parse()?,
            turn,
            castles.parse()?,
            en_passant,
            halfmoves,
            fullmoves,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_strategy::proptest;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn pos(fen: &str) -> Position {
        fen.parse().unwrap()
    }

    #[test]
    fn default_position_is_the_start_of_the_game() {
        let pos = Position::default();
        assert_eq!(pos.board(), &Board::default());
        assert_eq!(pos.turn(), Color::White);
        assert_eq!(pos.castles(), Castles::all());
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.halfmoves(), 0);
        assert_eq!(pos.fullmoves(), 1);
    }

    #[test]
    fn default_position_prints_like_fen() {
        assert_eq!(
            Position::default().to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[proptest]
    fn parsing_printed_position_is_an_identity(pos: Position) {
        assert_eq!(pos.to_string().parse(), Ok(pos));
    }

    #[test]
    fn parsing_position_validates_the_setup() {
        use IllegalPosition::*;

        let cases = [
            ("8/8/8/8/8/8/8/4K3 w - - 0 1", MissingKing(Color::Black)),
            ("4k3/8/8/8/8/8/8/3KK3 w - - 0 1", TooManyKings(Color::White)),
            ("4k2P/8/8/8/8/8/8/4K3 w - - 0 1", PawnsOnBackRank),
            ("4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1", OppositeCheck(Color::Black)),
            ("4k3/8/8/8/8/8/8/4K3 w K - 0 1", InvalidCastlingRights(Castles::WHITE_SHORT)),
            ("4k3/8/8/8/8/8/8/4K3 w - e6 0 1", InvalidEnPassantSquare(sq("e6"))),
        ];

        for (fen, e) in cases {
            assert_eq!(fen.parse::<Position>(), Err(e.into()), "{}", fen);
        }
    }

    #[test]
    fn parsing_position_fails_for_malformed_fields() {
        assert_eq!("".parse::<Position>(), Err(ParsePositionError::InvalidSyntax));

        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1".parse::<Position>(),
            Err(ParsePositionError::InvalidSyntax)
        );

        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3 w - - x 1".parse::<Position>(),
            Err(ParsePositionError::InvalidSyntax)
        );

        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w X - 0 1".parse::<Position>(),
            Err(ParsePositionError::InvalidCastles(_))
        ));
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let moves: HashSet<_> = Position::default()
            .moves()
            .into_iter()
            .map(|m| m.to_string())
            .collect();

        assert_eq!(moves.len(), 20);
        assert!(moves.contains("e2e4"));
        assert!(moves.contains("g1f3"));
        assert!(!moves.contains("e1g1"));
    }

    #[proptest]
    fn moves_are_all_legal(mut pos: Position) {
        for m in pos.moves() {
            assert!(pos.is_legal(m.whence(), m.whither()));
        }
    }

    #[proptest]
    fn has_legal_move_agrees_with_moves(mut pos: Position) {
        let turn = pos.turn();
        assert_eq!(pos.has_legal_move(turn), !pos.moves().is_empty());
    }

    #[proptest]
    fn legality_checks_leave_the_position_untouched(
        mut pos: Position,
        whence: Square,
        whither: Square,
    ) {
        let before = pos.clone();
        pos.is_legal(whence, whither);
        pos.would_leave_in_check(whence, whither);
        pos.has_legal_move(Color::White);
        pos.has_legal_move(Color::Black);
        assert_eq!(pos, before);
    }

    #[proptest]
    fn legal_moves_never_leave_the_king_in_check(
        #[filter(!#pos.clone().moves().is_empty())] mut pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves());
        let turn = pos.turn();
        assert_eq!(pos.play(m.whence(), m.whither()), Ok(m));
        assert!(!pos.is_check(turn));
    }

    #[proptest]
    fn playing_illegal_move_leaves_position_untouched(
        mut pos: Position,
        whence: Square,
        #[filter(!#pos.clone().is_legal(#whence, #whither))] whither: Square,
    ) {
        let before = pos.clone();
        assert_eq!(pos.play(whence, whither), Err(IllegalMove(whence, whither)));
        assert_eq!(pos, before);
    }

    #[proptest]
    fn playing_a_move_passes_the_turn(
        #[filter(!#pos.clone().moves().is_empty())] mut pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves());
        let before = pos.clone();
        assert_eq!(pos.play(m.whence(), m.whither()), Ok(m));

        assert_eq!(pos.turn(), !before.turn());
        assert!(before.castles().contains(pos.castles()));

        let expected = before.fullmoves() + (before.turn() == Color::Black) as u32;
        assert_eq!(pos.fullmoves(), expected);
    }

    #[proptest]
    fn pawn_moves_and_captures_reset_the_halfmove_clock(
        #[filter(!#pos.clone().moves().is_empty())] mut pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves());
        let before = pos.clone();
        assert_eq!(pos.play(m.whence(), m.whither()), Ok(m));

        let is_pawn = before.board()[m.whence()].map(|p| p.role()) == Some(Role::Pawn);
        let is_capture = before.board().iter().count() > pos.board().iter().count();

        if is_pawn || is_capture {
            assert_eq!(pos.halfmoves(), 0);
        } else {
            assert_eq!(pos.halfmoves(), before.halfmoves() + 1);
        }
    }

    #[test]
    fn double_step_sets_en_passant_square() {
        let mut pos = Position::default();
        assert_eq!(pos.play(sq("e2"), sq("e4")), Ok(Move::new(sq("e2"), sq("e4"), None)));
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        assert_eq!(pos.turn(), Color::Black);
        assert_eq!(pos.halfmoves(), 0);
        assert_eq!(pos.fullmoves(), 1);

        assert!(pos.play(sq("g8"), sq("f6")).is_ok());
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.halfmoves(), 1);
        assert_eq!(pos.fullmoves(), 2);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut pos = pos("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1");
        assert!(pos.play(sq("d7"), sq("d5")).is_ok());
        assert_eq!(pos.en_passant(), Some(sq("d6")));

        assert!(pos.play(sq("e5"), sq("d6")).is_ok());
        assert_eq!(pos.board()[sq("d6")], Some(Piece(Color::White, Role::Pawn)));
        assert_eq!(pos.board()[sq("d5")], None);
        assert_eq!(pos.board()[sq("e5")], None);
        assert_eq!(pos.halfmoves(), 0);
    }

    #[test]
    fn en_passant_expires_after_one_move() {
        let mut pos = pos("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1");
        assert!(pos.play(sq("d7"), sq("d5")).is_ok());
        assert!(pos.play(sq("e1"), sq("e2")).is_ok());
        assert!(pos.play(sq("e8"), sq("e7")).is_ok());
        assert_eq!(pos.play(sq("e5"), sq("d6")), Err(IllegalMove(sq("e5"), sq("d6"))));
    }

    #[test]
    fn en_passant_cannot_expose_the_king_along_the_rank() {
        let mut pos = pos("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1");
        assert!(!pos.is_legal(sq("b5"), sq("c6")));
    }

    #[test]
    fn pawn_reaching_last_rank_becomes_a_queen() {
        let mut pos = pos("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let m = pos.play(sq("a7"), sq("a8"));
        assert_eq!(m, Ok(Move::new(sq("a7"), sq("a8"), Some(Role::Queen))));
        assert_eq!(pos.board()[sq("a8")], Some(Piece(Color::White, Role::Queen)));
        assert!(pos.is_check(Color::Black));
    }

    #[test]
    fn castling_moves_both_king_and_rook() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(pos.play(sq("e1"), sq("g1")).is_ok());
        assert_eq!(pos.board()[sq("g1")], Some(Piece(Color::White, Role::King)));
        assert_eq!(pos.board()[sq("f1")], Some(Piece(Color::White, Role::Rook)));
        assert_eq!(pos.board()[sq("h1")], None);
        assert_eq!(pos.castles(), Castles::long(Color::Black) | Castles::short(Color::Black));

        assert!(pos.play(sq("e8"), sq("c8")).is_ok());
        assert_eq!(pos.board()[sq("c8")], Some(Piece(Color::Black, Role::King)));
        assert_eq!(pos.board()[sq("d8")], Some(Piece(Color::Black, Role::Rook)));
        assert_eq!(pos.board()[sq("a8")], None);
        assert_eq!(pos.castles(), Castles::empty());
    }

    #[test]
    fn castling_requires_the_right() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/R3K2R w Qkq - 0 1");
        assert!(!pos.is_legal(sq("e1"), sq("g1")));
        assert!(pos.is_legal(sq("e1"), sq("c1")));
    }

    #[test]
    fn castling_requires_empty_squares_between_king_and_rook() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1");
        assert!(!pos.is_legal(sq("e1"), sq("g1")));
        assert!(!pos.is_legal(sq("e1"), sq("c1")));
    }

    #[test]
    fn castling_is_illegal_out_of_check() {
        let mut pos = pos("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(!pos.is_legal(sq("e1"), sq("g1")));
        assert!(!pos.is_legal(sq("e1"), sq("c1")));
    }

    #[test]
    fn castling_is_illegal_through_check() {
        let mut pos = pos("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!pos.is_legal(sq("e1"), sq("g1")));
        assert!(pos.is_legal(sq("e1"), sq("c1")));
    }

    #[test]
    fn castling_is_illegal_into_check() {
        let mut pos = pos("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!pos.is_legal(sq("e1"), sq("g1")));
        assert!(pos.is_legal(sq("e1"), sq("c1")));
    }

    #[test]
    fn king_or_rook_moves_revoke_castling_rights() {
        let mut pos = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(pos.play(sq("h1"), sq("h2")).is_ok());
        assert_eq!(pos.castles(), Castles::all() - Castles::WHITE_SHORT);

        assert!(pos.play(sq("e8"), sq("e7")).is_ok());
        assert_eq!(pos.castles(), Castles::WHITE_LONG);
    }

    #[test]
    fn capturing_a_rook_in_its_corner_revokes_castling_rights() {
        let mut pos = pos("r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1");
        assert!(pos.play(sq("g2"), sq("a8")).is_ok());
        assert_eq!(pos.castles(), Castles::WHITE_SHORT | Castles::WHITE_LONG | Castles::BLACK_SHORT);
        assert!(!pos.is_legal(sq("e8"), sq("c8")));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut pos = pos("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(pos.would_leave_in_check(sq("e2"), sq("c3")));
        assert!(!pos.is_legal(sq("e2"), sq("c3")));
        assert!(pos.is_legal(sq("e1"), sq("d1")));
    }

    #[test]
    fn check_is_not_left_by_moves_that_move_nothing() {
        let mut pos = Position::default();
        assert!(!pos.would_leave_in_check(sq("d1"), sq("e1")));
        assert!(!pos.would_leave_in_check(sq("e4"), sq("e1")));
        assert_eq!(pos, Position::default());

        let mut checked = self::pos("4k3/8/8/8/8/8/8/r3K2R w K - 0 1");
        assert!(checked.would_leave_in_check(sq("h1"), sq("e1")));
        assert!(checked.would_leave_in_check(sq("c5"), sq("e1")));
    }

    #[test]
    fn king_cannot_step_into_check() {
        let mut pos = pos("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
        assert!(!pos.is_check(Color::White));
        assert!(!pos.is_legal(sq("e1"), sq("d1")));
        assert!(pos.is_legal(sq("e1"), sq("d2")));
    }

    #[test]
    fn moves_of_the_wrong_side_are_illegal() {
        let mut pos = Position::default();
        assert!(!pos.is_legal(sq("e7"), sq("e5")));
        assert!(!pos.is_legal(sq("e4"), sq("e5")));
        assert!(!pos.is_legal(sq("a1"), sq("a2")));
    }

    #[test]
    fn checkmated_side_has_no_legal_move() {
        let mut pos = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(pos.is_check(Color::White));
        assert!(!pos.has_legal_move(Color::White));
        assert!(pos.moves().is_empty());
    }

    #[test]
    fn stalemated_side_has_no_legal_move() {
        let mut pos = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(!pos.is_check(Color::Black));
        assert!(!pos.has_legal_move(Color::Black));
    }

    #[test]
    #[should_panic]
    fn is_check_panics_without_a_king() {
        let mut board = Board::default();
        board.set(sq("e1"), None);
        is_attacked(&board, Color::White);
    }
}
