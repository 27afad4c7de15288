use anyhow::Context;
use clap::Parser;
use scriptsync::commands;
use scriptsync::config::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = scriptsync::logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {e}");
    }
    tracing::debug!("scriptsync v{}", scriptsync::VERSION);

    let cwd = std::env::current_dir().context("cannot read the current directory")?;

    if let Err(e) = commands::run(cli, &cwd) {
        eprintln!("{}", commands::describe_error(&e));
        std::process::exit(commands::exit_code(&e));
    }

    Ok(())
}
