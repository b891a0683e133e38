use crate::{record::Record, render::Diagram};
use anyhow::{Context, Error as Anyhow};
use clap::Parser;
use lib::chess::Game;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Replays a recorded game through the rules and prints where it ends.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Replay {
    /// The game record in RON format.
    path: PathBuf,
}

impl Replay {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let record = Record::load(&self.path)?;
        let mut game = Game::from(record.position.clone());

        for (i, m) in record.moves.iter().enumerate() {
            game.play(*m)
                .with_context(|| format!("failed to replay move #{} `{}`", i + 1, m))?;
        }

        if game.outcome() != record.outcome {
            warn!(recorded = %record.outcome, replayed = %game.outcome(), "outcome mismatch");
        }

        info!(plies = record.moves.len(), position = %game.position());
        println!("{}\n\n{}\n{}", Diagram(game.board()), game.position(), game.outcome());

        Ok(())
    }
}
