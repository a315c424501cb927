use std::io::Write;

use clap::Parser;
use tracing::info;

use buddydb::cli::Args;
use buddydb::command::run_commands;
use buddydb::config::Config;
use buddydb::error::Result;
use buddydb::{input, logging, output, Store};

/// Set up SIGPIPE handling for Unix systems
/// This prevents "broken pipe" errors when output is piped to commands like `head`
#[cfg(unix)]
fn setup_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn setup_sigpipe() {
    // Windows doesn't have SIGPIPE
}

fn main() {
    setup_sigpipe();

    if let Err(e) = run() {
        eprintln!("buddydb: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_args(&args)?;
    logging::init(config.verbosity);

    info!(
        memory_size = config.memory_size,
        hash_size = config.hash_size,
        commands = %config.command_file,
        "starting"
    );

    let mut store = Store::new(config.memory_size, config.hash_size)?;
    let reader = input::open_input(&config)?;
    let mut out = output::open_output(&config)?;

    run_commands(&mut store, reader, &mut out)?;
    out.flush()?;

    Ok(())
}
