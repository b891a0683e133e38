use crate::chess::{ParseSquareError, Role, Square};
use bitflags::bitflags;
use derive_more::{Display, Error, From};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

bitflags! {
    /// Characteristics of a [`Move`] in the context of a [`Position`][`crate::chess::Position`].
    #[derive(Default)]
    pub struct MoveKind: u8 {
        const CAPTURE =     0b0001;
        const CASTLE =      0b0010;
        const EN_PASSANT =  0b0100;
        const PROMOTION =   0b1000;
    }
}

/// A chess move.
///
/// Moves produced by the rules carry their [`MoveKind`], while moves constructed
/// from user input through [`Move::new`] don't, the rules work that out.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Move {
    whence: Square,
    whither: Square,
    promotion: Option<Role>,
    kind: MoveKind,
}

impl Move {
    /// Constructs a [`Move`] with no known [`MoveKind`].
    pub fn new(whence: Square, whither: Square, promotion: Option<Role>) -> Self {
        Move {
            whence,
            whither,
            promotion,
            kind: MoveKind::empty(),
        }
    }

    /// Constructs a [`Move`] of a known [`MoveKind`].
    pub fn with_kind(
        whence: Square,
        whither: Square,
        promotion: Option<Role>,
        kind: MoveKind,
    ) -> Self {
        Move {
            whence,
            whither,
            promotion,
            kind,
        }
    }

    /// The source [`Square`].
    pub fn whence(&self) -> Square {
        self.whence
    }

    /// The destination [`Square`].
    pub fn whither(&self) -> Square {
        self.whither
    }

    /// The [`Role`] a pawn is promoted to, if any.
    pub fn promotion(&self) -> Option<Role> {
        self.promotion
    }

    /// The characteristics of this move.
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Whether this move captures a piece.
    pub fn is_capture(&self) -> bool {
        self.kind.contains(MoveKind::CAPTURE)
    }

    /// Whether this is a castling move.
    pub fn is_castle(&self) -> bool {
        self.kind.contains(MoveKind::CASTLE)
    }

    /// Whether this is an en passant capture.
    pub fn is_en_passant(&self) -> bool {
        self.kind.contains(MoveKind::EN_PASSANT)
    }

    /// Whether this move promotes a pawn.
    pub fn is_promotion(&self) -> bool {
        self.kind.contains(MoveKind::PROMOTION)
    }
}

/// Prints the move in [pure coordinate notation].
///
/// [pure coordinate notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation#Pure_coordinate_notation
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.whence, f)?;
        fmt::Display::fmt(&self.whither, f)?;

        if let Some(r) = self.promotion {
            fmt::Display::fmt(&r, f)?;
        }

        Ok(())
    }
}

/// The reason why parsing [`Move`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseMoveError {
    #[display(fmt = "failed to parse move, invalid square")]
    InvalidSquare(ParseSquareError),
    #[display(fmt = "failed to parse move, invalid promotion")]
    InvalidPromotion,
    #[display(fmt = "failed to parse move, expected pure coordinate notation like `e2e4`")]
    InvalidSyntax,
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(ParseMoveError::InvalidSyntax);
        }

        let promotion = match &s[4..] {
            "" => None,
            r => match r.parse() {
                Ok(r) => Some(r),
                Err(_) => return Err(ParseMoveError::InvalidPromotion),
            },
        };

        Ok(Move::new(s[..2].parse()?, s[2..4].parse()?, promotion))
    }
}

impl Serialize for Move {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Move {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for Move {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;
        (any::<Square>(), any::<Square>(), any::<Option<Role>>())
            .prop_map(|(whence, whither, promotion)| Move::new(whence, whither, promotion))
            .boxed()
    }
}
