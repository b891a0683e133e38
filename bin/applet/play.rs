use crate::{io::Io, record::Record, render::Diagram};
use anyhow::Error as Anyhow;
use clap::Parser;
use lib::chess::{Game, Move, Position, State};
use std::{io, path::PathBuf};
use tracing::{info, instrument, warn};

/// Plays a game of chess between two humans at the terminal.
#[derive(Debug, Default, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Play {
    /// The starting position in FEN notation.
    #[clap(short, long)]
    fen: Option<Position>,

    /// Where to save the record of the game once it's over.
    #[clap(short, long)]
    record: Option<PathBuf>,
}

impl Play {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let mut game = Game::from(self.fen.unwrap_or_default());
        let mut io = Io::new(io::stdout(), io::stdin());

        io.send("Enter moves like `e2e4` or `e7e8q`, `moves` to list them, `quit` to give up.")?;
        io.send(Diagram(game.board()))?;

        loop {
            match game.state() {
                State::Terminal(outcome) => {
                    io.send(outcome)?;
                    break;
                }

                State::Check(side) => io.send(format_args!("{side} is in check"))?,
                State::Active(_) => {}
            }

            let line = match io.prompt(format_args!("{} to move> ", game.turn()))? {
                Some(line) => line,
                None => break,
            };

            match line.trim() {
                "" => continue,
                "quit" => break,
                "moves" => {
                    let legal: Vec<_> = game.moves().iter().map(Move::to_string).collect();
                    io.send(legal.join(" "))?;
                }

                input => match input.parse::<Move>() {
                    Err(e) => io.send(e)?,
                    Ok(m) => match game.play(m) {
                        Err(e) => io.send(e)?,
                        Ok(_) => io.send(Diagram(game.board()))?,
                    },
                },
            }
        }

        info!(plies = game.played().len(), outcome = %game.outcome(), "game finished");

        if let Some(path) = self.record {
            let record = Record::from(&game);

            match record.save(&path) {
                Ok(()) => info!(path = %path.display(), "game recorded"),
                Err(e) => warn!("{:#}", e),
            }
        }

        Ok(())
    }
}
