use anyhow::{Context, Error as Anyhow};
use lib::chess::{Game, Move, Outcome, Position};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::instrument;

/// A finished or abandoned game, as the moves played from a starting position.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub position: Position,
    pub moves: Vec<Move>,
    pub outcome: Outcome,
}

/// The record of a [`Game`] so far.
impl From<&Game> for Record {
    fn from(game: &Game) -> Self {
        Record {
            position: game.initial().clone(),
            moves: game.played().to_vec(),
            outcome: game.outcome(),
        }
    }
}

impl Record {
    /// Reads a record in RON format.
    #[instrument(level = "trace", err)]
    pub fn load(path: &Path) -> Result<Self, Anyhow> {
        let ron = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;

        ron::de::from_str(&ron).with_context(|| format!("`{}` is not a game record", path.display()))
    }

    /// Writes this record in RON format.
    #[instrument(level = "trace", skip(self), err)]
    pub fn save(&self, path: &Path) -> Result<(), Anyhow> {
        let ron = ron::ser::to_string_pretty(self, PrettyConfig::default())?;
        fs::write(path, ron).with_context(|| format!("failed to write `{}`", path.display()))
    }
}
