use crate::chess::{Board, Castles, Color, File, Move, MoveKind, Piece, Rank, Role, Square};
use arrayvec::ArrayVec;

const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const OMNIDIRECTIONAL: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const KNIGHT: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// The most squares any piece can reach, a queen in the middle of an empty board.
const MAX_REACH: usize = 27;

/// The files the king crosses when castling, its destination last,
/// and the files that must be vacant between king and rook.
struct Wing {
    rook: File,
    transit: [File; 3],
    vacant: &'static [File],
}

const SHORT: Wing = Wing {
    rook: File::H,
    transit: [File::E, File::F, File::G],
    vacant: &[File::F, File::G],
};

const LONG: Wing = Wing {
    rook: File::A,
    transit: [File::E, File::D, File::C],
    vacant: &[File::B, File::C, File::D],
};

/// The direction pawns of a [`Color`] advance to.
fn forward(side: Color) -> i8 {
    match side {
        Color::White => 1,
        Color::Black => -1,
    }
}

fn leap(whence: Square, offsets: &[(i8, i8)]) -> ArrayVec<Square, MAX_REACH> {
    offsets
        .iter()
        .filter_map(|&(df, dr)| whence.offset(df, dr))
        .collect()
}

fn slide(board: &Board, whence: Square, directions: &[(i8, i8)]) -> ArrayVec<Square, MAX_REACH> {
    let mut squares = ArrayVec::new();

    for &(df, dr) in directions {
        let mut sq = whence;
        while let Some(next) = sq.offset(df, dr) {
            squares.push(next);
            if !board.is_empty(next) {
                break;
            }

            sq = next;
        }
    }

    squares
}

/// The [`Square`]s a [`Piece`] standing on `whence` attacks.
///
/// Sliding pieces attack up to and including the first occupied square in each
/// direction, regardless of its color. Pawns attack diagonally forward, whether
/// or not there's something to capture.
pub fn attacks(board: &Board, whence: Square, piece: Piece) -> ArrayVec<Square, MAX_REACH> {
    match piece.role() {
        Role::Pawn => leap(whence, &[(-1, forward(piece.color())), (1, forward(piece.color()))]),
        Role::Knight => leap(whence, &KNIGHT),
        Role::Bishop => slide(board, whence, &DIAGONAL),
        Role::Rook => slide(board, whence, &ORTHOGONAL),
        Role::Queen => slide(board, whence, &OMNIDIRECTIONAL),
        Role::King => leap(whence, &OMNIDIRECTIONAL),
    }
}

/// An iterator over the [`Square`]s from where pieces of a [`Color`] attack `sq`.
pub fn attackers(board: &Board, sq: Square, side: Color) -> impl Iterator<Item = Square> + '_ {
    board
        .by_color(side)
        .filter(move |&(whence, p)| attacks(board, whence, p).contains(&sq))
        .map(|(whence, _)| whence)
}

/// Whether any piece of a [`Color`] attacks `sq`.
pub fn is_attacked(board: &Board, sq: Square, side: Color) -> bool {
    attackers(board, sq, side).next().is_some()
}

/// The moves the piece standing on `whence` can make.
///
/// These obey the movement geometry of each [`Role`] and are blocked by other pieces,
/// but may leave the mover's own king in check.
/// The castling rights and en passant square are those of the side to move.
pub fn candidates(
    board: &Board,
    whence: Square,
    castles: Castles,
    en_passant: Option<Square>,
) -> ArrayVec<Move, MAX_REACH> {
    let piece = match board[whence] {
        Some(p) => p,
        None => return ArrayVec::new(),
    };

    let mut moves: ArrayVec<_, MAX_REACH> = match piece.role() {
        Role::Pawn => return pawn(board, whence, piece.color(), en_passant),
        _ => attacks(board, whence, piece)
            .into_iter()
            .filter_map(|whither| match board[whither] {
                None => Some(Move::with_kind(whence, whither, None, MoveKind::empty())),
                Some(p) if p.color() != piece.color() => {
                    Some(Move::with_kind(whence, whither, None, MoveKind::CAPTURE))
                }
                Some(_) => None,
            })
            .collect(),
    };

    if piece.role() == Role::King {
        moves.extend(castling(board, whence, piece, castles));
    }

    moves
}

fn pawn(
    board: &Board,
    whence: Square,
    side: Color,
    en_passant: Option<Square>,
) -> ArrayVec<Move, MAX_REACH> {
    let mut moves = ArrayVec::new();
    let dr = forward(side);

    let mut push = |whither: Square, kind: MoveKind| {
        if whither.rank() == Rank::promotion(side) {
            for r in Role::PROMOTIONS {
                moves.push(Move::with_kind(whence, whither, Some(r), kind | MoveKind::PROMOTION));
            }
        } else {
            moves.push(Move::with_kind(whence, whither, None, kind));
        }
    };

    if let Some(one) = whence.offset(0, dr).filter(|&sq| board.is_empty(sq)) {
        push(one, MoveKind::empty());

        if whence.rank() == Rank::pawns(side) {
            if let Some(two) = one.offset(0, dr).filter(|&sq| board.is_empty(sq)) {
                push(two, MoveKind::empty());
            }
        }
    }

    for whither in attacks(board, whence, Piece::new(side, Role::Pawn)) {
        match board[whither] {
            Some(p) if p.color() != side => push(whither, MoveKind::CAPTURE),
            None if Some(whither) == en_passant => {
                let victim = Square::new(whither.file(), whence.rank());
                if board[victim].map(|p| (p.color(), p.role())) == Some((!side, Role::Pawn)) {
                    push(whither, MoveKind::CAPTURE | MoveKind::EN_PASSANT);
                }
            }
            _ => {}
        }
    }

    moves
}

fn castling(
    board: &Board,
    whence: Square,
    king: Piece,
    castles: Castles,
) -> impl Iterator<Item = Move> + '_ {
    let side = king.color();
    let home = Rank::home(side);

    [(SHORT, Castles::short(side)), (LONG, Castles::long(side))]
        .into_iter()
        .filter(move |(_, right)| castles.contains(*right))
        .filter(move |_| whence == Square::new(File::E, home) && !king.has_moved())
        .filter(move |(wing, _)| {
            let rook = board[Square::new(wing.rook, home)];
            rook.map_or(false, |r| {
                r.color() == side && r.role() == Role::Rook && !r.has_moved()
            })
        })
        .filter(move |(wing, _)| wing.vacant.iter().all(|&f| board.is_empty(Square::new(f, home))))
        .filter(move |(wing, _)| {
            let mut transit = wing.transit.iter().map(|&f| Square::new(f, home));
            transit.all(|sq| !is_attacked(board, sq, !side))
        })
        .map(move |(wing, _)| {
            let whither = Square::new(wing.transit[2], home);
            Move::with_kind(whence, whither, None, MoveKind::CASTLE)
        })
}

/// Where the rook moves from and to, given a castling [`Move`].
pub fn castling_rook(m: &Move) -> Option<(Square, Square)> {
    if !m.is_castle() {
        return None;
    }

    let home = m.whence().rank();
    [SHORT, LONG]
        .into_iter()
        .find(|wing| m.whither().file() == wing.transit[2])
        .map(|wing| (Square::new(wing.rook, home), Square::new(wing.transit[1], home)))
}
