use crate::chess::Color;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The state of a chess game as far as the rules are concerned.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Outcome {
    #[display(fmt = "the game is ongoing")]
    Ongoing,

    #[display(fmt = "the side to move is in check")]
    Check,

    #[display(fmt = "checkmate by the {_0} player")]
    Checkmate(Color),

    #[display(fmt = "stalemate")]
    Stalemate,

    #[display(fmt = "draw by the fifty-move rule")]
    DrawByFiftyMoveRule,

    #[display(fmt = "draw by threefold repetition")]
    DrawByRepetition,

    #[display(fmt = "draw by insufficient material")]
    DrawByInsufficientMaterial,
}

impl Outcome {
    /// Whether the game is over and no further moves may be played.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Ongoing | Outcome::Check)
    }

    /// Whether the outcome is a [draw] and neither side has won.
    ///
    /// [draw]: https://www.chessprogramming.org/Draw
    pub fn is_draw(&self) -> bool {
        self.is_terminal() && !self.is_decisive()
    }

    /// Whether the outcome is a decisive and one of the sides has won.
    pub fn is_decisive(&self) -> bool {
        matches!(self, Outcome::Checkmate(_))
    }

    /// The winning side, if the outcome is [decisive](`Self::is_decisive`).
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn terminal_outcome_is_either_draw_or_decisive(#[filter(#o.is_terminal())] o: Outcome) {
        assert_ne!(o.is_draw(), o.is_decisive());
    }

    #[proptest]
    fn ongoing_game_is_neither_draw_nor_decisive(#[filter(!#o.is_terminal())] o: Outcome) {
        assert!(!o.is_draw());
        assert!(!o.is_decisive());
    }

    #[test]
    fn check_is_not_terminal() {
        assert!(!Outcome::Ongoing.is_terminal());
        assert!(!Outcome::Check.is_terminal());
        assert!(Outcome::Stalemate.is_terminal());
    }

    #[proptest]
    fn neither_side_wins_if_draw(#[filter(#o.is_draw())] o: Outcome) {
        assert_eq!(o.winner(), None);
    }

    #[proptest]
    fn one_side_wins_if_decisive(#[filter(#o.is_decisive())] o: Outcome) {
        assert_ne!(o.winner(), None);
    }

    #[proptest]
    fn side_that_checkmates_wins(c: Color) {
        assert_eq!(Outcome::Checkmate(c).winner(), Some(c));
    }

    #[proptest]
    fn outcome_can_be_deserialized_from_ron(o: Outcome) {
        assert_eq!(ron::de::from_str::<Outcome>(&ron::ser::to_string(&o)?)?, o);
    }
}
