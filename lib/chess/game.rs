use crate::chess::{Board, Castles, Color, GameStatus, IllegalMove, Move, Outcome, Position, Square};
use crate::clock::{Chessclock, Clock};
use derive_more::{Display, Error};
use tracing::{debug, field::display, instrument, warn, Span};

/// The reason why a move was rejected by a [`Game`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum MoveError {
    #[display(fmt = "the game is already over")]
    GameAlreadyOver,

    #[display(fmt = "the {} player ran out of time", _0)]
    TimeExpired(#[error(not(source))] Color),

    #[display(fmt = "{}", _0)]
    IllegalMove(IllegalMove),
}

impl From<IllegalMove> for MoveError {
    fn from(e: IllegalMove) -> Self {
        MoveError::IllegalMove(e)
    }
}

/// A chess game between two players sharing the same board.
///
/// Moves are validated against the rules of chess and, if a [`Clock`] is
/// attached, against the time left to the side to move.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game<C = Chessclock> {
    position: Position,
    history: Vec<Move>,
    status: GameStatus,
    clock: Option<C>,
}

impl Game {
    /// Starts a game from the standard starting position, without a clock.
    pub fn new() -> Self {
        Self::from_position(Position::default())
    }

    /// Replays a sequence of moves from the starting position.
    ///
    /// Fails on the first move the game rejects.
    pub fn replay<I: IntoIterator<Item = Move>>(moves: I) -> Result<Self, MoveError> {
        let mut game = Game::new();

        for m in moves {
            game.apply(m.whence(), m.whither())?;
        }

        Ok(game)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Game<C> {
    /// Starts a game from an arbitrary [`Position`], without a clock.
    ///
    /// The game may be over before it even begins.
    pub fn from_position(mut position: Position) -> Self {
        let status = evaluate(&mut position);

        Game {
            position,
            history: Vec::new(),
            status,
            clock: None,
        }
    }

    /// Attaches a [`Clock`] to this game and starts it for the side to move.
    pub fn with_clock<D: Clock>(self, mut clock: D) -> Game<D> {
        clock.start(self.position.turn());

        Game {
            position: self.position,
            history: self.history,
            status: self.status,
            clock: Some(clock),
        }
    }

    /// The current [`GameStatus`].
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// The current piece placement.
    pub fn board(&self) -> &Board {
        self.position.board()
    }

    /// The current [`Position`].
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The moves played so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// The castling rights still available.
    pub fn castles(&self) -> Castles {
        self.position.castles()
    }

    /// The en passant target square, if any.
    pub fn en_passant(&self) -> Option<Square> {
        self.position.en_passant()
    }

    /// The number of halfmoves since the last capture or pawn advance.
    pub fn halfmoves(&self) -> u32 {
        self.position.halfmoves()
    }

    /// The current move number.
    pub fn fullmoves(&self) -> u32 {
        self.position.fullmoves()
    }

    /// The attached [`Clock`], if any.
    pub fn clock(&self) -> Option<&C> {
        self.clock.as_ref()
    }

    /// The [`Outcome`] of the game, if it's over.
    pub fn outcome(&self) -> Option<Outcome> {
        let turn = self.turn();

        match self.status {
            GameStatus::Checkmate => Some(Outcome::Checkmate(!turn)),
            GameStatus::TimeOut => Some(Outcome::LossOnTime(turn)),
            GameStatus::Stalemate => Some(Outcome::Stalemate),
            GameStatus::Draw => Some(Outcome::DrawBy50MoveRule),
            GameStatus::InProgress | GameStatus::Check => None,
        }
    }

    /// A short human-readable summary of the state of the game.
    pub fn summary(&self) -> String {
        match (self.status, self.outcome()) {
            (_, Some(o)) => o.to_string(),
            (GameStatus::Check, None) => format!("{} is in check", self.turn()),
            (_, None) => format!("{} to move", self.turn()),
        }
    }

    /// All legal moves of the side to move, none if the game is over.
    pub fn moves(&mut self) -> Vec<Move> {
        if self.status.is_terminal() {
            Vec::new()
        } else {
            self.position.moves()
        }
    }

    /// Plays the piece on `whence` to `whither` on behalf of the side to move.
    ///
    /// A rejected move leaves the game untouched, except that running out of
    /// time ends the game.
    #[instrument(level = "debug", skip(self), fields(turn = %self.turn(), status))]
    pub fn apply(&mut self, whence: Square, whither: Square) -> Result<Move, MoveError> {
        if self.status.is_terminal() {
            debug!(status = %self.status, "rejected move after the game ended");
            return Err(MoveError::GameAlreadyOver);
        }

        let turn = self.turn();

        if let Some(clock) = &self.clock {
            if clock.is_expired(turn) {
                warn!(%turn, "flag fell");
                self.status = GameStatus::TimeOut;
                Span::current().record("status", display(self.status));
                return Err(MoveError::TimeExpired(turn));
            }
        }

        let m = match self.position.play(whence, whither) {
            Ok(m) => m,
            Err(e) => {
                debug!(error = %e, "rejected illegal move");
                return Err(e.into());
            }
        };

        if let Some(clock) = &mut self.clock {
            let elapsed = clock.switch_turn(turn);
            debug!(?elapsed, remaining = ?clock.remaining(turn));
        }

        self.history.push(m);
        self.status = evaluate(&mut self.position);
        Span::current().record("status", display(self.status));

        Ok(m)
    }
}

/// The status of the game for the side to move in `pos`.
fn evaluate(pos: &mut Position) -> GameStatus {
    let turn = pos.turn();

    match (pos.is_check(turn), pos.has_legal_move(turn)) {
        (true, false) => GameStatus::Checkmate,
        (true, true) => GameStatus::Check,
        (false, false) => GameStatus::Stalemate,
        (false, true) if pos.halfmoves() >= 50 => GameStatus::Draw,
        (false, true) => GameStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Piece, Role};
    use crate::clock::MockClock;
    use mockall::predicate::*;
    use std::time::Duration;
    use test_strategy::proptest;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(game: &mut Game<impl Clock>, moves: &[&str]) {
        for m in moves {
            let m: Move = m.parse().unwrap();
            assert_eq!(game.apply(m.whence(), m.whither()), Ok(m));
        }
    }

    #[test]
    fn new_game_starts_in_progress() {
        let game = Game::new();
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.board(), &Board::default());
        assert!(game.history().is_empty());
        assert_eq!(game.castles(), Castles::all());
        assert_eq!(game.en_passant(), None);
        assert_eq!(game.halfmoves(), 0);
        assert_eq!(game.fullmoves(), 1);
        assert_eq!(game.clock(), None);
        assert_eq!(game.outcome(), None);
        assert_eq!(game.summary(), "white to move");
    }

    #[test]
    fn opening_move_is_recorded() {
        let mut game = Game::new();
        play(&mut game, &["e2e4"]);

        assert_eq!(game.board()[sq("e4")], Some(Piece(Color::White, Role::Pawn)));
        assert_eq!(game.board()[sq("e2")], None);
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.en_passant(), Some(sq("e3")));
        assert_eq!(game.history(), &[Move::new(sq("e2"), sq("e4"), None)]);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = Game::new();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);

        assert_eq!(game.status(), GameStatus::Checkmate);
        assert_eq!(game.outcome(), Some(Outcome::Checkmate(Color::Black)));
        assert_eq!(game.summary(), "black wins by checkmate");
        assert!(game.moves().is_empty());

        let before = game.clone();
        assert_eq!(game.apply(sq("a2"), sq("a3")), Err(MoveError::GameAlreadyOver));
        assert_eq!(game, before);
    }

    #[test]
    fn check_is_reported() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "f7f6", "d1h5"]);
        assert_eq!(game.status(), GameStatus::Check);
        assert_eq!(game.summary(), "black is in check");
    }

    #[test]
    fn stalemate_is_a_draw() {
        let pos = "7k/8/4Q3/6K1/8/8/8/8 w - - 0 1".parse().unwrap();
        let mut game = Game::<Chessclock>::from_position(pos);
        play(&mut game, &["e6f7"]);

        assert_eq!(game.status(), GameStatus::Stalemate);
        assert_eq!(game.outcome(), Some(Outcome::Stalemate));
        assert!(game.outcome().map_or(false, |o| o.is_draw()));
    }

    #[test]
    fn fifty_moves_without_progress_is_a_draw() {
        let pos = "7k/8/8/8/8/8/8/R6K w - - 49 80".parse().unwrap();
        let mut game = Game::<Chessclock>::from_position(pos);
        assert_eq!(game.status(), GameStatus::InProgress);

        play(&mut game, &["a1a2"]);
        assert_eq!(game.halfmoves(), 50);
        assert_eq!(game.status(), GameStatus::Draw);
        assert_eq!(game.outcome(), Some(Outcome::DrawBy50MoveRule));
    }

    #[test]
    fn game_may_be_over_from_the_start() {
        let pos = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let game = Game::<Chessclock>::from_position(pos);
        assert_eq!(game.status(), GameStatus::Stalemate);
    }

    #[proptest]
    fn illegal_move_leaves_game_untouched(
        pos: Position,
        whence: Square,
        #[filter(!#pos.clone().is_legal(#whence, #whither))] whither: Square,
    ) {
        let mut game = Game::<Chessclock>::from_position(pos);
        let before = game.clone();

        let expected = if game.status().is_terminal() {
            MoveError::GameAlreadyOver
        } else {
            IllegalMove(whence, whither).into()
        };

        assert_eq!(game.apply(whence, whither), Err(expected));
        assert_eq!(game, before);
    }

    #[proptest]
    fn legal_move_is_appended_to_history(
        #[filter(!#pos.clone().moves().is_empty())] pos: Position,
        selector: proptest::sample::Selector,
    ) {
        let mut game = Game::<Chessclock>::from_position(pos);
        let m = selector.select(game.position.clone().moves());

        if !game.status().is_terminal() {
            assert_eq!(game.apply(m.whence(), m.whither()), Ok(m));
            assert_eq!(game.history(), &[m]);
        }
    }

    #[test]
    fn replay_reproduces_the_game() {
        let moves: Vec<Move> = ["e2e4", "e7e5", "g1f3", "b8c6"]
            .into_iter()
            .map(|m| m.parse().unwrap())
            .collect();

        let game = Game::replay(moves.clone()).unwrap();
        assert_eq!(game.history(), moves);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.fullmoves(), 3);
    }

    #[test]
    fn replay_fails_on_the_first_rejected_move() {
        let moves = [Move::new(sq("e2"), sq("e5"), None)];
        assert_eq!(
            Game::replay(moves),
            Err(MoveError::IllegalMove(IllegalMove(sq("e2"), sq("e5"))))
        );
    }

    #[test]
    fn attaching_a_clock_starts_it_for_the_side_to_move() {
        let mut clock = MockClock::new();
        clock.expect_start().once().with(eq(Color::White)).return_const(());

        let game = Game::new().with_clock(clock);
        assert!(game.clock().is_some());
    }

    #[test]
    fn clock_switches_turn_after_each_move() {
        let mut clock = MockClock::new();
        clock.expect_start().return_const(());
        clock.expect_is_expired().return_const(false);
        clock.expect_remaining().return_const(Duration::from_secs(60));
        clock
            .expect_switch_turn()
            .once()
            .with(eq(Color::White))
            .return_const(Duration::from_secs(3));

        let mut game = Game::new().with_clock(clock);
        play(&mut game, &["e2e4"]);
    }

    #[test]
    fn expired_clock_ends_the_game() {
        let mut clock = MockClock::new();
        clock.expect_start().return_const(());
        clock.expect_is_expired().with(eq(Color::White)).return_const(true);
        clock.expect_switch_turn().never();

        let mut game = Game::new().with_clock(clock);
        assert_eq!(game.apply(sq("e2"), sq("e4")), Err(MoveError::TimeExpired(Color::White)));
        assert_eq!(game.status(), GameStatus::TimeOut);
        assert_eq!(game.outcome(), Some(Outcome::LossOnTime(Color::White)));
        assert!(game.history().is_empty());
        assert_eq!(game.board(), &Board::default());

        assert_eq!(game.apply(sq("e2"), sq("e4")), Err(MoveError::GameAlreadyOver));
    }

    #[test]
    fn illegal_move_does_not_touch_the_clock() {
        let mut clock = MockClock::new();
        clock.expect_start().return_const(());
        clock.expect_is_expired().return_const(false);
        clock.expect_switch_turn().never();

        let mut game = Game::new().with_clock(clock);
        assert!(game.apply(sq("e2"), sq("e5")).is_err());
        assert_eq!(game.status(), GameStatus::InProgress);
    }
}
