use crate::chess::{Board, Color, Piece, Role, Square};
use arrayvec::ArrayVec;

/// The pseudo-legal destinations of a single piece.
///
/// A queen in the middle of an otherwise empty board reaches 27 squares, the most of any piece.
pub type Destinations = ArrayVec<Square, 27>;

const KNIGHT: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ORTHOGONALS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// The [pseudo-legal] destinations of the piece on `whence`, if any.
///
/// Destinations obey the movement, blocking and capture rules of the piece,
/// but may leave its own king in check. Castling is not included.
///
/// [pseudo-legal]: https://www.chessprogramming.org/Pseudo-Legal_Move
pub fn destinations(board: &Board, whence: Square, en_passant: Option<Square>) -> Destinations {
    let mut moves = Destinations::new();

    if let Some(Piece(color, role)) = board[whence] {
        match role {
            Role::Pawn => pawn(board, whence, color, en_passant, &mut moves),
            Role::Knight => leap(board, whence, color, &KNIGHT, &mut moves),
            Role::Bishop => slide(board, whence, color, &DIAGONALS, &mut moves),
            Role::Rook => slide(board, whence, color, &ORTHOGONALS, &mut moves),
            Role::Queen => {
                slide(board, whence, color, &DIAGONALS, &mut moves);
                slide(board, whence, color, &ORTHOGONALS, &mut moves);
            }
            Role::King => leap(board, whence, color, &KING, &mut moves),
        }
    }

    moves
}

fn is_enemy(board: &Board, sq: Square, color: Color) -> bool {
    matches!(board[sq], Some(p) if p.color() != color)
}

fn pawn(
    board: &Board,
    whence: Square,
    color: Color,
    en_passant: Option<Square>,
    moves: &mut Destinations,
) {
    let forward = color.forward();

    if let Some(one) = whence.offset(forward, 0).filter(|&sq| board.is_empty(sq)) {
        moves.push(one);

        if whence.row() == color.pawn_row() {
            if let Some(two) = one.offset(forward, 0).filter(|&sq| board.is_empty(sq)) {
                moves.push(two);
            }
        }
    }

    for side in [-1, 1] {
        if let Some(sq) = whence.offset(forward, side) {
            if is_enemy(board, sq, color) || (en_passant == Some(sq) && board.is_empty(sq)) {
                moves.push(sq);
            }
        }
    }
}

fn leap(
    board: &Board,
    whence: Square,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut Destinations,
) {
    for &(rows, cols) in offsets {
        if let Some(sq) = whence.offset(rows, cols) {
            if board.is_empty(sq) || is_enemy(board, sq, color) {
                moves.push(sq);
            }
        }
    }
}

fn slide(
    board: &Board,
    whence: Square,
    color: Color,
    directions: &[(i8, i8)],
    moves: &mut Destinations,
) {
    for &(rows, cols) in directions {
        let mut ray = whence.offset(rows, cols);

        while let Some(sq) = ray {
            if board.is_empty(sq) {
                moves.push(sq);
            } else {
                if is_enemy(board, sq, color) {
                    moves.push(sq);
                }

                break;
            }

            ray = sq.offset(rows, cols);
        }
    }
}
