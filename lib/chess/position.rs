use crate::chess::{attackers, candidates, castling_rook, is_attacked};
use crate::chess::{Board, Castles, Color, File, Move, Piece, Rank, Role, Square};
use derive_more::{Display, Error};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, num::NonZeroU32, str::FromStr};
use tracing::instrument;

/// Represents an illegal [`Move`] in a given [`Position`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "move `{_0}` is illegal in this position")]
pub struct IllegalMove(#[error(not(source))] pub Move);

/// What identifies a [`Position`] for the purposes of detecting repetitions.
///
/// Two positions share a fingerprint if they have the same pieces on the same squares,
/// the same side to move, the same castling rights and the same en passant square.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Fingerprint {
    placement: [Option<(Color, Role)>; 64],
    turn: Color,
    castles: Castles,
    en_passant: Option<Square>,
}

/// Whether the king of a [`Color`] is attacked on the given [`Board`].
///
/// A side without a king is never in check.
pub fn is_in_check(board: &Board, side: Color) -> bool {
    board
        .king(side)
        .map_or(false, |sq| is_attacked(board, sq, !side))
}

/// Moves pieces around as if [`Move`] was played, without validating it.
fn displace(board: &mut Board, m: &Move) {
    let piece = match board.remove(m.whence()) {
        Some(p) => p,
        None => return,
    };

    if m.is_en_passant() {
        board.remove(Square::new(m.whither().file(), m.whence().rank()));
    }

    if let Some((whence, whither)) = castling_rook(m) {
        if let Some(rook) = board.remove(whence) {
            board.place(whither, rook.with_moved(true));
        }
    }

    let piece = m.promotion().map_or(piece, |r| piece.with_role(r));
    board.place(m.whither(), piece.with_moved(true));
}

/// The current position on the chess board.
///
/// A snapshot of everything the rules need to know to generate moves,
/// except for the history of previous positions, which is kept by the [`Game`][`crate::chess::Game`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    board: Board,
    turn: Color,
    castles: Castles,
    en_passant: Option<Square>,
    halfmoves: u32,
    fullmoves: NonZeroU32,
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
            fullmoves: NonZeroU32::MIN,
        }
    }
}

impl Position {
    /// The arrangement of pieces on the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The remaining castling rights.
    pub fn castles(&self) -> Castles {
        self.castles
    }

    /// The square a pawn skipped over in the last move, if it advanced two squares.
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// The number of halfmoves since the last capture or pawn advance.
    ///
    /// It resets to 0 whenever a piece is captured or a pawn is moved.
    pub fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    /// The current move number since the start of the game.
    ///
    /// It starts at 1, and is incremented after every move by black.
    pub fn fullmoves(&self) -> NonZeroU32 {
        self.fullmoves
    }

    /// This position's [`Fingerprint`].
    pub fn fingerprint(&self) -> Fingerprint {
        let mut placement = [None; 64];
        for (sq, p) in self.board.iter() {
            placement[sq.index()] = Some((p.color(), p.role()));
        }

        Fingerprint {
            placement,
            turn: self.turn,
            castles: self.castles,
            en_passant: self.en_passant,
        }
    }

    /// The moves pieces of a [`Color`] could make if it were their turn,
    /// disregarding whether they leave their own king in check.
    ///
    /// Moves are produced in ascending order of their source [`Square`].
    /// Only the side to move may capture en passant.
    pub fn pseudo_legal_moves(&self, side: Color) -> Vec<Move> {
        let en_passant = self.en_passant.filter(|_| side == self.turn);
        self.board
            .by_color(side)
            .flat_map(|(sq, _)| candidates(&self.board, sq, self.castles, en_passant))
            .collect()
    }

    /// The [pseudo-legal moves](`Self::pseudo_legal_moves`) of a [`Color`]
    /// that don't leave its own king in check.
    pub fn legal_moves(&self, side: Color) -> Vec<Move> {
        let mut moves = self.pseudo_legal_moves(side);
        moves.retain(|m| {
            let mut board = self.board;
            displace(&mut board, m);
            !is_in_check(&board, side)
        });

        moves
    }

    /// The legal moves of the side to move.
    pub fn moves(&self) -> Vec<Move> {
        self.legal_moves(self.turn)
    }

    /// From where pieces of a [`Color`] attack the given [`Square`].
    pub fn attackers(&self, sq: Square, side: Color) -> Vec<Square> {
        attackers(&self.board, sq, side).collect()
    }

    /// From where the opponent is giving check to the king of the side to move.
    pub fn checkers(&self) -> Vec<Square> {
        match self.board.king(self.turn) {
            Some(sq) => self.attackers(sq, !self.turn),
            None => Vec::new(),
        }
    }

    /// Whether this position is a [check].
    ///
    /// [check]: https://www.chessprogramming.org/Check
    pub fn is_check(&self) -> bool {
        is_in_check(&self.board, self.turn)
    }

    /// Whether this position is a [checkmate].
    ///
    /// [checkmate]: https://www.chessprogramming.org/Checkmate
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.moves().is_empty()
    }

    /// Whether this position is a [stalemate].
    ///
    /// [stalemate]: https://www.chessprogramming.org/Stalemate
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.moves().is_empty()
    }

    /// Whether the game is a draw by the [50-move rule].
    ///
    /// [50-move rule]: https://en.wikipedia.org/wiki/Fifty-move_rule
    pub fn is_draw_by_fifty_move_rule(&self) -> bool {
        self.halfmoves >= 100
    }

    /// Whether neither side has enough material left to ever deliver checkmate.
    ///
    /// That is the case if, besides the kings, there's at most a single knight or bishop
    /// left on the board, or only bishops that all stand on squares of the same color.
    pub fn is_material_insufficient(&self) -> bool {
        let pieces: Vec<_> = self
            .board
            .iter()
            .filter(|(_, p)| p.role() != Role::King)
            .collect();

        match pieces.as_slice() {
            [] => true,
            [(_, p)] => matches!(p.role(), Role::Knight | Role::Bishop),
            [(sq, _), ..] => pieces
                .iter()
                .all(|(s, p)| p.role() == Role::Bishop && s.is_light() == sq.is_light()),
        }
    }

    /// Finds the legal move that corresponds to a [`Move`].
    ///
    /// The move matches if it agrees on the source and destination squares, as well
    /// as on the promotion, which defaults to a queen if left unspecified.
    /// Its [`MoveKind`][`crate::chess::MoveKind`] must either be unknown or match exactly.
    pub fn resolve(&self, m: Move) -> Result<Move, IllegalMove> {
        self.moves()
            .into_iter()
            .find(|l| {
                let promotion = match m.promotion() {
                    None if l.is_promotion() => Some(Role::Queen),
                    p => p,
                };

                l.whence() == m.whence()
                    && l.whither() == m.whither()
                    && l.promotion() == promotion
                    && (m.kind().is_empty() || m.kind() == l.kind())
            })
            .ok_or(IllegalMove(m))
    }

    /// The piece a [`Move`] takes in this position, if any.
    ///
    /// En passant takes the pawn beside the source square rather than on the destination.
    pub fn captured(&self, m: &Move) -> Option<Piece> {
        if m.is_en_passant() {
            self.board[Square::new(m.whither().file(), m.whence().rank())]
        } else if m.is_capture() {
            self.board[m.whither()]
        } else {
            None
        }
    }

    /// Play a [`Move`] if legal in this position.
    ///
    /// Returns the move actually played, with its [`MoveKind`][`crate::chess::MoveKind`] resolved.
    #[instrument(level = "trace", skip(self), ret(Display), err)]
    pub fn play(&mut self, m: Move) -> Result<Move, IllegalMove> {
        let m = self.resolve(m)?;
        self.apply(&m);
        Ok(m)
    }

    /// Updates the position with a legal [`Move`].
    fn apply(&mut self, m: &Move) {
        let is_pawn = self.board[m.whence()].map(|p| p.role()) == Some(Role::Pawn);

        displace(&mut self.board, m);
        self.castles
            .remove(Castles::revoked_by(m.whence()) | Castles::revoked_by(m.whither()));

        let dr = m.whither().rank() - m.whence().rank();
        self.en_passant = match dr {
            2 | -2 if is_pawn => m.whence().offset(0, dr / 2),
            _ => None,
        };

        if is_pawn || m.is_capture() {
            self.halfmoves = 0;
        } else {
            self.halfmoves = self.halfmoves.saturating_add(1);
        }

        if self.turn == Color::Black {
            self.fullmoves = self.fullmoves.saturating_add(1);
        }

        self.turn = !self.turn;
    }

    /// Counts the leaf nodes of the game tree down to the given depth.
    ///
    /// See [perft](https://www.chessprogramming.org/Perft).
    pub fn perft(&self, depth: u8) -> usize {
        match depth {
            0 => 1,
            1 => self.moves().len(),
            _ => self
                .moves()
                .iter()
                .map(|m| {
                    let mut next = self.clone();
                    next.apply(m);
                    next.perft(depth - 1)
                })
                .sum(),
        }
    }
}

/// Prints the position in [FEN] notation.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let turn = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };

        write!(f, "{} {} {} ", self.board, turn, self.castles)?;

        match self.en_passant {
            Some(sq) => write!(f, "{}", sq)?,
            None => f.write_str("-")?,
        }

        write!(f, " {} {}", self.halfmoves, self.fullmoves)
    }
}

/// The reason why parsing the FEN string failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum ParseFenError {
    #[display(fmt = "syntax error at the piece placement field")]
    InvalidPlacement,
    #[display(fmt = "syntax error at the side to move field")]
    InvalidTurn,
    #[display(fmt = "syntax error at the castling rights field")]
    InvalidCastlingRights,
    #[display(fmt = "syntax error at the en passant square field")]
    InvalidEnPassantSquare,
    #[display(fmt = "syntax error at the halfmove clock field")]
    InvalidHalfmoveClock,
    #[display(fmt = "syntax error at the fullmove counter field")]
    InvalidFullmoves,
    #[display(fmt = "expected either 4 or 6 space separated fields")]
    InvalidSyntax,
    #[display(fmt = "each side must have exactly one king")]
    InvalidKings,
}

impl FromStr for Position {
    type Err = ParseFenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParseFenError::*;

        let fields: Vec<_> = s.split_whitespace().collect();
        let (placement, turn, castles, en_passant, clocks) = match fields.as_slice() {
            [p, t, c, e] => (*p, *t, *c, *e, None),
            [p, t, c, e, h, f] => (*p, *t, *c, *e, Some((*h, *f))),
            _ => return Err(InvalidSyntax),
        };

        let mut board: Board = placement.parse().map_err(|_| InvalidPlacement)?;

        for side in Color::iter() {
            if board.by_color(side).filter(|(_, p)| p.role() == Role::King).count() != 1 {
                return Err(InvalidKings);
            }
        }

        let turn = match turn {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(InvalidTurn),
        };

        let castles = castles.parse().map_err(|_| InvalidCastlingRights)?;
        let castles = settle(&mut board, castles);

        let en_passant = match en_passant {
            "-" => None,
            sq => {
                let sq: Square = sq.parse().map_err(|_| InvalidEnPassantSquare)?;
                let rank = match turn {
                    Color::White => Rank::Sixth,
                    Color::Black => Rank::Third,
                };

                if sq.rank() != rank {
                    return Err(InvalidEnPassantSquare);
                }

                Some(sq)
            }
        };

        let (halfmoves, fullmoves) = match clocks {
            None => (0, NonZeroU32::MIN),
            Some((h, f)) => (
                h.parse().map_err(|_| InvalidHalfmoveClock)?,
                f.parse().map_err(|_| InvalidFullmoves)?,
            ),
        };

        Ok(Position {
            board,
            turn,
            castles,
            en_passant,
            halfmoves,
            fullmoves,
        })
    }
}

/// Marks pieces that must have moved to get where they are,
/// returning the castling rights the placement actually supports.
fn settle(board: &mut Board, castles: Castles) -> Castles {
    let mut supported = Castles::empty();

    for side in Color::iter() {
        let home = Rank::home(side);
        let king = Square::new(File::E, home);
        let holds = |sq: Square, role: Role| {
            board[sq].map(|p| (p.color(), p.role())) == Some((side, role))
        };

        for (rook, right) in [(File::H, Castles::short(side)), (File::A, Castles::long(side))] {
            if castles.contains(right)
                && holds(king, Role::King)
                && holds(Square::new(rook, home), Role::Rook)
            {
                supported |= right;
            }
        }
    }

    let pieces: Vec<_> = board.iter().collect();
    for (sq, p) in pieces {
        let moved = match p.role() {
            Role::Pawn => sq.rank() != Rank::pawns(p.color()),
            Role::King => (supported & Castles::of(p.color())).is_empty(),
            Role::Rook => (supported & Castles::revoked_by(sq)).is_empty(),
            _ => false,
        };

        board.place(sq, p.with_moved(moved));
    }

    supported
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for Position {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::{prelude::*, sample::Selector};

        (0..128usize, any::<Selector>())
            .prop_map(|(plies, selector)| {
                let mut pos = Position::default();
                for _ in 0..plies {
                    match selector.try_select(pos.moves()) {
                        None => break,
                        Some(m) => pos.apply(&m),
                    }
                }

                pos
            })
            .no_shrink()
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::MoveKind;
    use proptest::{prop_assume, sample::Selector};
    use shakmaty as sm;
    use std::collections::HashSet;
    use test_strategy::proptest;

    fn fen(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn default_position_is_the_starting_position() {
        let pos = Position::default();
        assert_eq!(
            pos.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );

        assert_eq!(pos.moves().len(), 20);
    }

    #[test]
    fn starting_position_parsed_from_fen_equals_default() {
        assert_eq!(
            fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Position::default()
        );
    }

    #[proptest]
    fn legal_moves_never_leave_own_king_in_check(pos: Position) {
        for m in pos.moves() {
            let mut next = pos.clone();
            assert_eq!(next.play(m), Ok(m));
            assert!(!is_in_check(next.board(), pos.turn()));
        }
    }

    #[proptest]
    fn legal_moves_are_pseudo_legal(pos: Position, c: Color) {
        let pseudo: HashSet<_> = pos.pseudo_legal_moves(c).into_iter().collect();
        assert!(pos.legal_moves(c).iter().all(|m| pseudo.contains(m)));
    }

    #[proptest]
    fn pseudo_legal_moves_are_ordered_by_source_square(pos: Position, c: Color) {
        let moves = pos.pseudo_legal_moves(c);
        assert!(moves.windows(2).all(|w| w[0].whence() <= w[1].whence()));
    }

    #[proptest]
    fn opponent_never_captures_en_passant(pos: Position) {
        assert!(pos.legal_moves(!pos.turn()).iter().all(|m| !m.is_en_passant()));
    }

    #[proptest]
    fn checkmate_implies_check(pos: Position) {
        assert!(!pos.is_checkmate() || pos.is_check());
    }

    #[proptest]
    fn checkmate_and_stalemate_are_mutually_exclusive(pos: Position) {
        assert!(!(pos.is_checkmate() && pos.is_stalemate()));
    }

    #[proptest]
    fn checkmate_or_stalemate_iff_no_legal_moves(pos: Position) {
        assert_eq!(pos.is_checkmate() || pos.is_stalemate(), pos.moves().is_empty());
    }

    #[proptest]
    fn checkers_attack_the_king(pos: Position) {
        assert_eq!(pos.is_check(), !pos.checkers().is_empty());

        for sq in pos.checkers() {
            assert_eq!(pos.board()[sq].map(|p| p.color()), Some(!pos.turn()));
        }
    }

    #[proptest]
    fn legal_move_alternates_turn(
        #[filter(!#pos.moves().is_empty())] mut pos: Position,
        selector: Selector,
    ) {
        let turn = pos.turn();
        let m = selector.select(pos.moves());
        pos.play(m)?;
        assert_eq!(pos.turn(), !turn);
    }

    #[proptest]
    fn legal_move_displaces_exactly_the_moving_pieces(
        #[filter(!#pos.moves().is_empty())] pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves());
        let mut next = pos.clone();
        next.play(m)?;

        let occupant = |p: &Position, s: Square| p.board()[s].map(|p| (p.color(), p.role()));
        let changed: HashSet<_> = Square::iter()
            .filter(|&s| occupant(&pos, s) != occupant(&next, s))
            .collect();

        let mut expected = HashSet::from([m.whence(), m.whither()]);
        if let Some((a, b)) = castling_rook(&m) {
            expected.extend([a, b]);
        }

        if m.is_en_passant() {
            expected.insert(Square::new(m.whither().file(), m.whence().rank()));
        }

        assert_eq!(changed, expected);
    }

    #[proptest]
    fn captures_reduce_opponent_material(
        #[filter(#pos.moves().iter().any(Move::is_capture))] pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves().into_iter().filter(Move::is_capture));
        let mut next = pos.clone();
        next.play(m)?;

        let opponent = |p: &Position| p.board().by_color(!pos.turn()).count();
        assert_eq!(opponent(&next) + 1, opponent(&pos));
        assert_eq!(next.halfmoves(), 0);
    }

    #[proptest]
    fn castles_move_the_king_by_two_files(pos: Position) {
        for m in pos.moves().into_iter().filter(Move::is_castle) {
            assert_eq!(pos.board()[m.whence()].map(|p| p.role()), Some(Role::King));
            assert_eq!(m.whence().rank(), m.whither().rank());
            assert_eq!((m.whence().file() - m.whither().file()).abs(), 2);
            assert!(!m.is_capture() && !m.is_promotion());
        }
    }

    #[proptest]
    fn illegal_move_fails_without_changing_position(
        mut pos: Position,
        #[filter(#pos.resolve(#m).is_err())] m: Move,
    ) {
        let before = pos.clone();
        assert_eq!(pos.play(m), Err(IllegalMove(m)));
        assert_eq!(pos, before);
    }

    #[proptest]
    fn move_without_kind_resolves_to_the_legal_move(
        #[filter(!#pos.moves().is_empty())] pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves());
        let bare = Move::new(m.whence(), m.whither(), m.promotion());
        assert_eq!(pos.resolve(bare), Ok(m));
    }

    #[proptest]
    fn move_with_wrong_kind_is_illegal(
        #[filter(!#pos.moves().is_empty())] pos: Position,
        selector: Selector,
        #[strategy(1u8..16)] bits: u8,
    ) {
        let m = selector.select(pos.moves());
        let kind = MoveKind::from_bits_truncate(bits);
        prop_assume!(kind != m.kind());

        let wrong = Move::with_kind(m.whence(), m.whither(), m.promotion(), kind);
        assert_eq!(pos.resolve(wrong), Err(IllegalMove(wrong)));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let mut pos = fen("8/P7/8/8/8/8/8/k6K w - - 0 1");
        let m = pos.play(Move::new(sq("a7"), sq("a8"), None)).unwrap();
        assert_eq!(m.promotion(), Some(Role::Queen));
        assert_eq!(pos.board()[sq("a8")].map(|p| p.role()), Some(Role::Queen));
    }

    #[test]
    fn under_promotion_is_honored() {
        let mut pos = fen("8/P7/8/8/8/8/8/k6K w - - 0 1");
        pos.play(Move::new(sq("a7"), sq("a8"), Some(Role::Knight))).unwrap();
        assert_eq!(pos.board()[sq("a8")].map(|p| p.role()), Some(Role::Knight));
    }

    #[test]
    fn promotion_to_pawn_or_king_is_illegal() {
        let pos = fen("8/P7/8/8/8/8/8/k6K w - - 0 1");
        for r in [Role::Pawn, Role::King] {
            let m = Move::new(sq("a7"), sq("a8"), Some(r));
            assert_eq!(pos.resolve(m), Err(IllegalMove(m)));
        }
    }

    #[test]
    fn promotion_on_non_promoting_move_is_illegal() {
        let pos = Position::default();
        let m = Move::new(sq("e2"), sq("e4"), Some(Role::Queen));
        assert_eq!(pos.resolve(m), Err(IllegalMove(m)));
    }

    #[test]
    fn en_passant_removes_the_pawn_beside() {
        let mut pos = fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let m = pos.play(Move::new(sq("e5"), sq("d6"), None)).unwrap();
        assert!(m.is_en_passant());
        assert_eq!(pos.board()[sq("d5")], None);
        assert_eq!(pos.board()[sq("d6")].map(|p| p.role()), Some(Role::Pawn));
    }

    #[test]
    fn en_passant_captures_the_pawn_beside() {
        let pos = fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let m = pos.resolve(Move::new(sq("e5"), sq("d6"), None)).unwrap();
        assert_eq!(pos.captured(&m), pos.board()[sq("d5")]);
        assert_eq!(pos.captured(&m).map(|p| p.color()), Some(Color::Black));
    }

    #[test]
    fn capture_takes_the_piece_on_the_destination() {
        let pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let m = pos.resolve(Move::new(sq("a1"), sq("a8"), None)).unwrap();
        assert_eq!(pos.captured(&m).map(|p| (p.color(), p.role())), Some((Color::Black, Role::Rook)));

        let m = pos.resolve(Move::new(sq("e1"), sq("g1"), None)).unwrap();
        assert_eq!(pos.captured(&m), None);
    }

    #[proptest]
    fn only_captures_take_pieces(pos: Position, selector: Selector) {
        if let Some(m) = selector.try_select(pos.moves()) {
            assert_eq!(pos.captured(&m).is_some(), m.is_capture());
            if let Some(p) = pos.captured(&m) {
                assert_eq!(p.color(), !pos.turn());
            }
        }
    }

    #[test]
    fn double_push_sets_en_passant_square_for_a_single_ply() {
        let mut pos = Position::default();
        pos.play("e2e4".parse().unwrap()).unwrap();
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        pos.play("g8f6".parse().unwrap()).unwrap();
        assert_eq!(pos.en_passant(), None);
    }

    #[test]
    fn castling_moves_the_rook_and_revokes_rights() {
        let mut pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let m = pos.play(Move::new(sq("e1"), sq("g1"), None)).unwrap();
        assert!(m.is_castle());
        assert_eq!(pos.board()[sq("f1")].map(|p| p.role()), Some(Role::Rook));
        assert_eq!(pos.board()[sq("h1")], None);
        assert_eq!(pos.castles(), Castles::of(Color::Black));
    }

    #[test]
    fn capturing_a_rook_revokes_its_castling_right() {
        let mut pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        pos.play(Move::new(sq("a1"), sq("a8"), None)).unwrap();
        assert_eq!(pos.castles(), Castles::WHITE_SHORT | Castles::BLACK_SHORT);
    }

    #[test]
    fn fullmoves_increment_after_black_moves() {
        let mut pos = Position::default();
        pos.play("e2e4".parse().unwrap()).unwrap();
        assert_eq!(pos.fullmoves().get(), 1);
        pos.play("e7e5".parse().unwrap()).unwrap();
        assert_eq!(pos.fullmoves().get(), 2);
    }

    #[test]
    fn insufficient_material() {
        assert!(fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").is_material_insufficient());
        assert!(fen("8/8/8/4k3/8/8/8/3NK3 w - - 0 1").is_material_insufficient());
        assert!(fen("8/8/8/4k3/8/8/8/3BK3 w - - 0 1").is_material_insufficient());
        assert!(fen("8/8/8/2b1k3/8/8/8/3BK3 w - - 0 1").is_material_insufficient());
        assert!(!fen("8/8/8/3bk3/8/8/8/3BK3 w - - 0 1").is_material_insufficient());
        assert!(!fen("8/8/8/4k3/8/8/8/2NNK3 w - - 0 1").is_material_insufficient());
        assert!(!fen("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1").is_material_insufficient());
    }

    #[test]
    fn parsing_fen_marks_displaced_pieces_as_moved() {
        let pos = fen("4k3/8/8/8/4P3/8/3P4/R3K2R w K - 0 1");
        let moved = |s: &str| pos.board()[sq(s)].map(|p| p.has_moved());
        assert_eq!(moved("e4"), Some(true));
        assert_eq!(moved("d2"), Some(false));
        assert_eq!(moved("e1"), Some(false));
        assert_eq!(moved("h1"), Some(false));
        assert_eq!(moved("a1"), Some(true));
        assert_eq!(moved("e8"), Some(true));
    }

    #[test]
    fn parsing_fen_drops_unsupported_castling_rights() {
        let pos = fen("4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1");
        assert_eq!(pos.castles(), Castles::WHITE_SHORT);
    }

    #[test]
    fn parsing_fen_requires_one_king_per_side() {
        for s in ["8/8/8/8/8/8/8/4K3 w - - 0 1", "k7/8/8/8/8/8/8/3KK3 w - - 0 1"] {
            assert_eq!(s.parse::<Position>(), Err(ParseFenError::InvalidKings));
        }
    }

    #[test]
    fn parsing_fen_validates_en_passant_rank() {
        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3 w - e3 0 1".parse::<Position>(),
            Err(ParseFenError::InvalidEnPassantSquare)
        );
    }

    #[test]
    fn perft_of_the_starting_position() {
        let pos = Position::default();
        assert_eq!(pos.perft(0), 1);
        assert_eq!(pos.perft(1), 20);
        assert_eq!(pos.perft(2), 400);
        assert_eq!(pos.perft(3), 8902);
    }

    #[proptest]
    fn parsing_printed_position_is_an_identity(pos: Position) {
        let parsed: Position = pos.to_string().parse()?;
        assert_eq!(parsed.to_string(), pos.to_string());
        assert_eq!(parsed.fingerprint(), pos.fingerprint());
        assert_eq!(parsed.moves(), pos.moves());
    }

    #[proptest]
    fn parsing_invalid_fen_fails(
        pos: Position,
        #[strategy(..=#pos.to_string().len())] n: usize,
        #[strategy("[^[:ascii:]]+")] r: String,
    ) {
        assert!([&pos.to_string()[..n], &r, &pos.to_string()[n..]]
            .concat()
            .parse::<Position>()
            .is_err());
    }

    #[proptest]
    fn position_serializes_as_fen(pos: Position) {
        let ron = ron::ser::to_string(&pos)?;
        assert_eq!(ron, format!("{:?}", pos.to_string()));
        assert_eq!(ron::de::from_str::<Position>(&ron)?.fingerprint(), pos.fingerprint());
    }

    #[proptest]
    fn rules_agree_with_shakmaty(#[strategy(0..256usize)] plies: usize, selector: Selector) {
        let mut pos = Position::default();
        let mut chess = sm::Chess::default();

        for _ in 0..plies {
            let moves: HashSet<_> = pos.moves().iter().map(Move::to_string).collect();
            let expected: HashSet<_> = sm::Position::legal_moves(&chess)
                .iter()
                .map(|vm| sm::uci::Uci::from_standard(vm).to_string())
                .collect();

            assert_eq!(moves, expected);
            for sq in Square::iter() {
                let expected = sm::Position::board(&chess).piece_at(sq.into());
                assert_eq!(pos.board()[sq].map(sm::Piece::from), expected);
            }

            assert_eq!(pos.turn(), sm::Position::turn(&chess).into());
            assert_eq!(pos.halfmoves(), sm::Position::halfmoves(&chess));
            assert_eq!(pos.fullmoves(), sm::Position::fullmoves(&chess));
            assert_eq!(pos.is_check(), sm::Position::is_check(&chess));
            assert_eq!(pos.is_checkmate(), sm::Position::is_checkmate(&chess));
            assert_eq!(pos.is_stalemate(), sm::Position::is_stalemate(&chess));

            let m = match selector.try_select(pos.moves()) {
                None => break,
                Some(m) => m,
            };

            let uci: sm::uci::Uci = m.to_string().parse()?;
            let vm = uci.to_move(&chess)?;
            sm::Position::play_unchecked(&mut chess, &vm);
            pos.play(m)?;
        }
    }
}
