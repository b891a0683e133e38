use crate::applet::Applet;
use anyhow::Error as Anyhow;
use clap::Parser;
use std::{cmp::min, io::stderr};
use tracing::{instrument, Level};
use tracing_subscriber::fmt::{format::FmtSpan, layer};
use tracing_subscriber::{filter::Targets, prelude::*, registry, util::SubscriberInitExt};

/// Play chess by the rules at the terminal.
#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// How much the rules engine logs to stderr.
    #[clap(short, long)]
    #[cfg_attr(not(debug_assertions), clap(default_value_t = Level::INFO))]
    #[cfg_attr(debug_assertions, clap(default_value_t = Level::DEBUG))]
    verbosity: Level,

    /// Plays a game if omitted.
    #[clap(subcommand)]
    applet: Option<Applet>,
}

impl Cli {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let writer = layer()
            .pretty()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(stderr);

        registry()
            .with(targets(self.verbosity))
            .with(writer)
            .try_init()?;

        self.applet.unwrap_or_default().execute()
    }
}

/// The rules engine and this binary log at `verbosity`, anything else at most warnings.
fn targets(verbosity: Level) -> Targets {
    Targets::new()
        .with_target("cli", verbosity)
        .with_target("lib", verbosity)
        .with_default(min(Level::WARN, verbosity))
}
