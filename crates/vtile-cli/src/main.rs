//! vtile entry point

use anyhow::Result;
use clap::Parser;

use vtile_cli::{Cli, execute};

fn main() -> Result<()> {
    // Usage output counts as a failed run, help included.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };
    execute(cli)?;
    Ok(())
}
