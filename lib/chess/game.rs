use crate::chess::{Board, Color, Fingerprint, IllegalMove, Move, Outcome, Piece, Position};
use derive_more::{Display, Error, From};
use tracing::{debug, instrument};

/// The reason why a [`Move`] was rejected by a [`Game`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum GameError {
    #[display(fmt = "{_0}")]
    IllegalMove(IllegalMove),

    #[display(fmt = "the game is already over, {_0}")]
    #[from(ignore)]
    GameAlreadyOver(#[error(not(source))] Outcome),
}

/// Where a [`Game`] stands from the point of view of whoever plays next.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
pub enum State {
    #[display(fmt = "{_0} to move")]
    Active(Color),

    #[display(fmt = "{_0} to move and in check")]
    Check(Color),

    #[display(fmt = "{_0}")]
    Terminal(Outcome),
}

/// A game of chess.
///
/// Owns the current [`Position`], the moves played so far along with the history
/// of every position they reached, and refuses moves once the game is over.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    initial: Position,
    position: Position,
    moves: Vec<Move>,
    captured: Vec<Piece>,
    history: Vec<Fingerprint>,
    outcome: Outcome,
}

/// A game from the standard starting position.
impl Default for Game {
    fn default() -> Self {
        Game::from(Position::default())
    }
}

/// A game starting from an arbitrary [`Position`].
impl From<Position> for Game {
    fn from(position: Position) -> Self {
        let history = vec![position.fingerprint()];
        let outcome = evaluate(&position, &history);

        Game {
            initial: position.clone(),
            position,
            moves: Vec::new(),
            captured: Vec::new(),
            history,
            outcome,
        }
    }
}

impl Game {
    /// Starts a new game from the standard starting position.
    pub fn new() -> Self {
        Self::default()
    }

    /// The [`Position`] this game started from.
    pub fn initial(&self) -> &Position {
        &self.initial
    }

    /// The current [`Position`].
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The current arrangement of pieces.
    pub fn board(&self) -> &Board {
        self.position.board()
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// The legal moves of a [`Color`] in the current position.
    pub fn legal_moves(&self, side: Color) -> Vec<Move> {
        self.position.legal_moves(side)
    }

    /// The legal moves of the side to move.
    pub fn moves(&self) -> Vec<Move> {
        self.position.moves()
    }

    /// The [`Outcome`] as of the current position.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The current [`State`].
    pub fn state(&self) -> State {
        match self.outcome {
            Outcome::Ongoing => State::Active(self.turn()),
            Outcome::Check => State::Check(self.turn()),
            o => State::Terminal(o),
        }
    }

    /// The moves played so far, as resolved by the rules.
    pub fn played(&self) -> &[Move] {
        &self.moves
    }

    /// The pieces taken so far, in the order they were captured.
    pub fn captured(&self) -> &[Piece] {
        &self.captured
    }

    /// The [`Fingerprint`] of every position reached, starting with the initial one.
    pub fn history(&self) -> &[Fingerprint] {
        &self.history
    }

    /// How many times the current position has been reached, including now.
    pub fn repetitions(&self) -> usize {
        repetitions(&self.position, &self.history)
    }

    /// Play a [`Move`] if legal and the game isn't over yet.
    ///
    /// On failure the game is left untouched.
    #[instrument(level = "trace", skip(self), err)]
    pub fn play(&mut self, m: Move) -> Result<Outcome, GameError> {
        if self.outcome.is_terminal() {
            return Err(GameError::GameAlreadyOver(self.outcome));
        }

        let before = self.position.clone();
        let m = self.position.play(m)?;
        let captured = before.captured(&m);

        self.moves.push(m);
        self.captured.extend(captured);
        self.history.push(self.position.fingerprint());
        debug!(ply = self.moves.len(), %m, position = %self.position);

        let outcome = evaluate(&self.position, &self.history);
        if outcome != self.outcome {
            debug!(from = %self.outcome, to = %outcome, "outcome changed");
        }

        self.outcome = outcome;
        Ok(outcome)
    }

    /// The game that follows from playing a [`Move`], leaving this one untouched.
    pub fn apply(&self, m: Move) -> Result<Game, GameError> {
        let mut next = self.clone();
        next.play(m)?;
        Ok(next)
    }
}

fn repetitions(position: &Position, history: &[Fingerprint]) -> usize {
    let fingerprint = position.fingerprint();
    history.iter().filter(|&&f| f == fingerprint).count()
}

/// Decides the [`Outcome`] of a position given the history that led to it.
fn evaluate(position: &Position, history: &[Fingerprint]) -> Outcome {
    if position.moves().is_empty() {
        if position.is_check() {
            Outcome::Checkmate(!position.turn())
        } else {
            Outcome::Stalemate
        }
    } else if position.is_draw_by_fifty_move_rule() {
        Outcome::DrawByFiftyMoveRule
    } else if repetitions(position, history) >= 3 {
        Outcome::DrawByRepetition
    } else if position.is_material_insufficient() {
        Outcome::DrawByInsufficientMaterial
    } else if position.is_check() {
        Outcome::Check
    } else {
        Outcome::Ongoing
    }
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for Game {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::{prelude::*, sample::Selector};

        (0..128usize, any::<Selector>())
            .prop_map(|(plies, selector)| {
                let mut game = Game::new();
                for _ in 0..plies {
                    if game.outcome().is_terminal() {
                        break;
                    }

                    match selector.try_select(game.moves()) {
                        Some(m) if game.play(m).is_ok() => continue,
                        _ => break,
                    }
                }

                game
            })
            .no_shrink()
            .boxed()
    }
}
