use crate::chess::{Color, File, Rank, Square};
use bitflags::bitflags;
use derive_more::{Display, Error};
use std::{fmt, str::FromStr};

bitflags! {
    /// The castling rights in a chess [`Position`][`crate::chess::Position`].
    pub struct Castles: u8 {
        const WHITE_SHORT = 0b0001;
        const WHITE_LONG =  0b0010;
        const BLACK_SHORT = 0b0100;
        const BLACK_LONG =  0b1000;
    }
}

impl Default for Castles {
    fn default() -> Self {
        Castles::all()
    }
}

impl Castles {
    /// The kingside castling right of a [`Color`].
    pub fn short(side: Color) -> Self {
        match side {
            Color::White => Castles::WHITE_SHORT,
            Color::Black => Castles::BLACK_SHORT,
        }
    }

    /// The queenside castling right of a [`Color`].
    pub fn long(side: Color) -> Self {
        match side {
            Color::White => Castles::WHITE_LONG,
            Color::Black => Castles::BLACK_LONG,
        }
    }

    /// Both castling rights of a [`Color`].
    pub fn of(side: Color) -> Self {
        Castles::short(side) | Castles::long(side)
    }

    /// The rights lost once a piece moves from or into the given [`Square`].
    ///
    /// Moving the king loses both rights of its side, while moving or
    /// capturing a rook on its starting corner loses the right on that wing.
    pub fn revoked_by(sq: Square) -> Self {
        Color::iter()
            .filter(|&side| sq.rank() == Rank::home(side))
            .map(|side| match sq.file() {
                File::A => Castles::long(side),
                File::E => Castles::of(side),
                File::H => Castles::short(side),
                _ => Castles::empty(),
            })
            .fold(Castles::empty(), |acc, c| acc | c)
    }
}

/// Prints the castling rights field of the [FEN] notation.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Castles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }

        for (right, c) in [
            (Castles::WHITE_SHORT, 'K'),
            (Castles::WHITE_LONG, 'Q'),
            (Castles::BLACK_SHORT, 'k'),
            (Castles::BLACK_LONG, 'q'),
        ] {
            if self.contains(right) {
                fmt::Write::write_char(f, c)?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing [`Castles`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse castling rights")]
pub struct ParseCastlesError;

impl FromStr for Castles {
    type Err = ParseCastlesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Castles::empty());
        }

        let mut castles = Castles::empty();
        for c in s.chars() {
            let right = match c {
                'K' => Castles::WHITE_SHORT,
                'Q' => Castles::WHITE_LONG,
                'k' => Castles::BLACK_SHORT,
                'q' => Castles::BLACK_LONG,
                _ => return Err(ParseCastlesError),
            };

            if castles.contains(right) {
                return Err(ParseCastlesError);
            }

            castles |= right;
        }

        if castles.is_empty() {
            Err(ParseCastlesError)
        } else {
            Ok(castles)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn castles() -> impl Strategy<Value = Castles> {
        (0u8..16).prop_map(Castles::from_bits_truncate)
    }

    #[proptest]
    fn of_combines_both_wings(c: Color) {
        assert_eq!(Castles::of(c), Castles::short(c) | Castles::long(c));
        assert!((Castles::of(c) & Castles::of(!c)).is_empty());
    }

    #[test]
    fn moving_the_king_revokes_both_rights() {
        assert_eq!(Castles::revoked_by("e1".parse().unwrap()), Castles::of(Color::White));
        assert_eq!(Castles::revoked_by("e8".parse().unwrap()), Castles::of(Color::Black));
    }

    #[test]
    fn moving_a_rook_revokes_the_right_on_its_wing() {
        assert_eq!(Castles::revoked_by("a1".parse().unwrap()), Castles::WHITE_LONG);
        assert_eq!(Castles::revoked_by("h1".parse().unwrap()), Castles::WHITE_SHORT);
        assert_eq!(Castles::revoked_by("a8".parse().unwrap()), Castles::BLACK_LONG);
        assert_eq!(Castles::revoked_by("h8".parse().unwrap()), Castles::BLACK_SHORT);
    }

    #[proptest]
    fn other_squares_revoke_nothing(
        #[filter(![File::A, File::E, File::H].contains(&#sq.file())
            || ![Rank::First, Rank::Eighth].contains(&#sq.rank()))]
        sq: Square,
    ) {
        assert_eq!(Castles::revoked_by(sq), Castles::empty());
    }

    #[test]
    fn all_rights_print_as_kqkq() {
        assert_eq!(Castles::all().to_string(), "KQkq");
        assert_eq!(Castles::empty().to_string(), "-");
    }

    #[proptest]
    fn parsing_printed_castles_is_an_identity(#[strategy(castles())] cr: Castles) {
        assert_eq!(cr.to_string().parse(), Ok(cr));
    }

    #[proptest]
    fn parsing_castles_fails_if_right_is_duplicated(
        #[filter(!#s.is_empty())]
        #[strategy("(KK)?(kk)?(QQ)?(qq)?")]
        s: String,
    ) {
        assert_eq!(Castles::from_str(&s), Err(ParseCastlesError));
    }

    #[proptest]
    fn parsing_castles_fails_for_invalid_string(
        #[strategy(castles())] c: Castles,
        #[strategy(..=#c.to_string().len())] n: usize,
        #[strategy("[^[:ascii:]]+")] r: String,
    ) {
        let s = c.to_string();
        assert_eq!([&s[..n], &r, &s[n..]].concat().parse().ok(), None::<Castles>);
    }
}
