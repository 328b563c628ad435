use std::io::{self, BufRead, Write};

use anyhow::Context;
use chansweep_core::Level;
use chansweep_protocol::Request;
use chansweep_session::{ChannelService, SessionRegistry};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_subscriber::EnvFilter;

mod dispatch;

/// Hosts minesweeper games bound to chat channels.
///
/// Reads one JSON request per line from stdin and writes one JSON envelope per line to stdout, logs go to stderr.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Force a seed instead of random, makes every generated board reproducible
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level for start requests that do not name one
    #[arg(short = 'l', long, default_value_t = Level::Beginner)]
    default_level: Level,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(args.verbose.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    log::debug!("seed: {:?}", args.seed);

    let registry = match args.seed {
        Some(seed) => SessionRegistry::with_seed(seed),
        None => SessionRegistry::new(),
    };
    let service = ChannelService::new(registry).with_default_level(args.default_level);

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    log::info!("Ready, default level {}", args.default_level);

    for line in stdin.lines() {
        let line = line.context("Could not read request from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let request = match Request::from_json(&line) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("Skipping request: {}", err);
                continue;
            }
        };

        for envelope in dispatch::dispatch(&service, &request) {
            writeln!(stdout, "{}", envelope.to_json()?).context("Could not write to stdout")?;
        }
        stdout.flush().context("Could not flush stdout")?;
    }

    log::info!("Input closed, {} games still open", service.registry().len());
    Ok(())
}
