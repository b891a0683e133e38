use crate::chess::{Color, File, Piece, Rank, Role, Square};
use derive_more::{Display, Error};
use std::fmt::{self, Write};
use std::{ops::Index, str::FromStr};

/// The chess board.
///
/// A plain grid of 64 slots, each holding at most one [`Piece`].
/// It knows nothing about the rules of the game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Board([Option<Piece>; 64]);

/// The standard starting arrangement.
impl Default for Board {
    fn default() -> Self {
        use Role::*;
        let mut board = Board::empty();
        let pieces = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        for side in Color::iter() {
            for (f, role) in File::iter().zip(pieces) {
                board.place(Square::new(f, Rank::home(side)), Piece::new(side, role));
                board.place(Square::new(f, Rank::pawns(side)), Piece::new(side, Pawn));
            }
        }

        board
    }
}

impl Board {
    /// A board with no pieces on it.
    pub fn empty() -> Self {
        Board([None; 64])
    }

    /// Whether the coordinates refer to a square on the board.
    pub fn in_bounds(file: i8, rank: i8) -> bool {
        Square::try_from((file, rank)).is_ok()
    }

    /// The [`Piece`] on the given [`Square`], if any.
    pub fn occupant(&self, sq: Square) -> Option<Piece> {
        self.0[sq.index()]
    }

    /// Whether there's no piece on the given [`Square`].
    pub fn is_empty(&self, sq: Square) -> bool {
        self.occupant(sq).is_none()
    }

    /// Places a [`Piece`] on a [`Square`], returning the piece it displaced, if any.
    pub fn place(&mut self, sq: Square, p: Piece) -> Option<Piece> {
        self.0[sq.index()].replace(p)
    }

    /// Removes the [`Piece`] on a [`Square`], if any.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.0[sq.index()].take()
    }

    /// An iterator over the pieces on the board in ascending [`Square`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|sq| Some((sq, self.occupant(sq)?)))
    }

    /// An iterator over the pieces of a [`Color`] in ascending [`Square`] order.
    pub fn by_color(&self, side: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter().filter(move |(_, p)| p.color() == side)
    }

    /// The [`Square`] occupied by the king of a [`Color`], if any.
    pub fn king(&self, side: Color) -> Option<Square> {
        self.by_color(side)
            .find(|(_, p)| p.role() == Role::King)
            .map(|(sq, _)| sq)
    }
}

/// Retrieves the [`Piece`] at a given [`Square`], if any.
impl Index<Square> for Board {
    type Output = Option<Piece>;

    fn index(&self, sq: Square) -> &Self::Output {
        &self.0[sq.index()]
    }
}

/// Prints the piece placement field of the [FEN] notation.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in Rank::iter().rev() {
            let mut skip = 0;

            for file in File::iter() {
                match self[Square::new(file, r)] {
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

            if r != Rank::First {
                f.write_char('/')?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing the piece placement failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse piece placement")]
pub struct ParseBoardError;

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranks: Vec<_> = s.split('/').rev().collect();
        if ranks.len() != 8 {
            return Err(ParseBoardError);
        }

        let mut board = Board::empty();
        for (r, segment) in Rank::iter().zip(ranks) {
            let mut file = 0;
            for c in segment.chars() {
                let mut buffer = [0; 4];

                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as i8;
                } else if let Ok(p) = c.encode_utf8(&mut buffer).parse::<Piece>() {
                    let f = File::new(file).ok_or(ParseBoardError)?;
                    board.place(Square::new(f, r), p);
                    file += 1;
                } else {
                    return Err(ParseBoardError);
                }

                if file > 8 {
                    return Err(ParseBoardError);
                }
            }

            if file != 8 {
                return Err(ParseBoardError);
            }
        }

        Ok(board)
    }
}
