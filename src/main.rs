// src/main.rs

use agentdag::cli;
use agentdag::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let args = cli::parse();
    init_logging(args.log_level)?;
    agentdag::run(args)
}
