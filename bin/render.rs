use lib::chess::{Board, Color, File, Piece, Rank, Role, Square};
use std::fmt::{self, Write};

/// Draws a [`Board`] with Unicode chess figures, the eighth rank on top.
#[derive(Debug, Copy, Clone)]
pub struct Diagram<'a>(pub &'a Board);

fn figure(p: Piece) -> char {
    use {Color::*, Role::*};
    match (p.color(), p.role()) {
        (White, King) => '♔',
        (White, Queen) => '♕',
        (White, Rook) => '♖',
        (White, Bishop) => '♗',
        (White, Knight) => '♘',
        (White, Pawn) => '♙',
        (Black, King) => '♚',
        (Black, Queen) => '♛',
        (Black, Rook) => '♜',
        (Black, Bishop) => '♝',
        (Black, Knight) => '♞',
        (Black, Pawn) => '♟',
    }
}

impl fmt::Display for Diagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in Rank::iter().rev() {
            write!(f, "{}", r)?;
            for file in File::iter() {
                f.write_char(' ')?;
                f.write_char(self.0[Square::new(file, r)].map_or('·', figure))?;
            }

            f.write_char('\n')?;
        }

        f.write_char(' ')?;
        for file in File::iter() {
            write!(f, " {}", file)?;
        }

        Ok(())
    }
}
