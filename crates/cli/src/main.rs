use clap::Parser;
use stylemap_cli::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    run(&cli)?;
    Ok(())
}
