use crate::chess::{File, ParseFileError, ParseRankError, Rank};
use derive_more::{Display, Error, From};
use shakmaty as sm;
use std::{convert::TryFrom, fmt, str::FromStr};

/// A square on the chess board.
///
/// Squares are ordered by [`File`] first and then by [`Rank`], that is
/// `a1 < a2 < ... < a8 < b1 < ... < h8`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Square {
    file: File,
    rank: Rank,
}

impl Square {
    /// Constructs [`Square`] from a pair of [`File`] and [`Rank`].
    pub fn new(f: File, r: Rank) -> Self {
        Square { file: f, rank: r }
    }

    /// This square's [`File`].
    pub fn file(&self) -> File {
        self.file
    }

    /// This square's [`Rank`].
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// This square's index in the range `(0..64)`, consistent with its ordering.
    pub fn index(&self) -> usize {
        self.file.index() as usize * 8 + self.rank.index() as usize
    }

    /// Returns an iterator over all [`Square`]s in ascending order.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        File::iter().flat_map(|f| Rank::iter().map(move |r| Square::new(f, r)))
    }

    /// The square `df` files and `dr` ranks away, if still on the board.
    pub fn offset(&self, df: i8, dr: i8) -> Option<Self> {
        let f = File::new(self.file.index().checked_add(df)?)?;
        let r = Rank::new(self.rank.index().checked_add(dr)?)?;
        Some(Square::new(f, r))
    }

    /// Whether this is a light square.
    pub fn is_light(&self) -> bool {
        (self.file.index() + self.rank.index()) % 2 == 1
    }
}

/// Represents a coordinate that does not refer to a [`Square`] on the board.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[display(fmt = "coordinate ({file}, {rank}) is off the board")]
pub struct InvalidSquare {
    pub file: i8,
    pub rank: i8,
}

/// Constructs [`Square`] from a pair of file and rank indices.
impl TryFrom<(i8, i8)> for Square {
    type Error = InvalidSquare;

    fn try_from((file, rank): (i8, i8)) -> Result<Self, Self::Error> {
        match (File::new(file), Rank::new(rank)) {
            (Some(f), Some(r)) => Ok(Square::new(f, r)),
            _ => Err(InvalidSquare { file, rank }),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.file, f)?;
        fmt::Display::fmt(&self.rank, f)?;
        Ok(())
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseSquareError {
    #[display(fmt = "failed to parse square")]
    InvalidFile(ParseFileError),
    #[display(fmt = "failed to parse square")]
    InvalidRank(ParseRankError),
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(1).map_or_else(|| s.len(), |(i, _)| i);
        Ok(Square::new(s[..i].parse()?, s[i..].parse()?))
    }
}

#[doc(hidden)]
impl From<Square> for sm::Square {
    fn from(sq: Square) -> Self {
        sm::Square::from_coords(
            sm::File::new(sq.file().index() as u32),
            sm::Rank::new(sq.rank().index() as u32),
        )
    }
}

#[doc(hidden)]
impl From<sm::Square> for Square {
    fn from(sq: sm::Square) -> Self {
        Square::new(
            File::ALL[usize::from(u8::from(sq.file()))],
            Rank::ALL[usize::from(u8::from(sq.rank()))],
        )
    }
}
