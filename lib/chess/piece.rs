use crate::chess::{Color, ParseRoleError, Role};
use shakmaty as sm;
use std::{fmt, str::FromStr};

/// A chess [piece][`Role`] of a certain [`Color`].
///
/// A piece also remembers whether it has ever left its starting square,
/// which is what castling eligibility hinges on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Piece {
    color: Color,
    role: Role,
    moved: bool,
}

impl Piece {
    /// Constructs a [`Piece`] that has not moved yet.
    pub fn new(color: Color, role: Role) -> Self {
        Piece {
            color,
            role,
            moved: false,
        }
    }

    /// This piece's [`Color`].
    pub fn color(&self) -> Color {
        self.color
    }

    /// This piece's [`Role`].
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this piece has moved since the game started.
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// This piece with the moved flag set to `moved`.
    pub fn with_moved(self, moved: bool) -> Self {
        Piece { moved, ..self }
    }

    /// This piece promoted to another [`Role`].
    pub fn with_role(self, role: Role) -> Self {
        Piece { role, ..self }
    }
}

/// Prints the piece in [FEN] notation, upper case for white and lower case for black.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Color::White => write!(f, "{}", self.role.to_string().to_ascii_uppercase()),
            Color::Black => write!(f, "{}", self.role),
        }
    }
}

impl FromStr for Piece {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = s.to_ascii_lowercase().parse()?;

        if s.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Piece::new(Color::White, role))
        } else {
            Ok(Piece::new(Color::Black, role))
        }
    }
}

#[doc(hidden)]
impl From<Piece> for sm::Piece {
    fn from(p: Piece) -> Self {
        sm::Piece {
            color: p.color().into(),
            role: p.role().into(),
        }
    }
}
