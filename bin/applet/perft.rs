use anyhow::Error as Anyhow;
use clap::Parser;
use lib::chess::{Move, Position};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, instrument};

/// Counts the leaf nodes of the game tree, broken down by the first move.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Perft {
    /// How many plies deep to explore.
    depth: u8,

    /// The position to start from in FEN notation.
    #[clap(short, long)]
    fen: Option<Position>,
}

impl Perft {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let pos = self.fen.unwrap_or_default();
        let timer = Instant::now();

        let divide: Vec<(Move, usize)> = match self.depth {
            0 => Vec::new(),
            d => pos
                .moves()
                .into_par_iter()
                .map(|m| -> Result<_, Anyhow> {
                    let mut next = pos.clone();
                    next.play(m)?;
                    Ok((m, next.perft(d - 1)))
                })
                .collect::<Result<_, _>>()?,
        };

        for (m, nodes) in &divide {
            println!("{}: {}", m, nodes);
        }

        let nodes: usize = match self.depth {
            0 => 1,
            _ => divide.iter().map(|(_, n)| n).sum(),
        };

        println!("\n{}", nodes);
        info!(depth = self.depth, nodes, elapsed = ?timer.elapsed());

        Ok(())
    }
}
