use clap::Parser;
use std::error::Error;
use subnet_tool::cli::{run, Cli};
use subnet_tool::config::{Config, LOG_ENV};
use subnet_tool::logging::{self, Verbosity};

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    let verbosity: Verbosity = match config.log.clone().or_else(|| std::env::var(LOG_ENV).ok()) {
        Some(spec) => spec.parse()?,
        None => Verbosity::default(),
    };
    logging::init(config.log4rs_file.as_deref(), &verbosity)?;
    log::info!("#Start main()");

    let stdout = std::io::stdout();
    run(&cli.command, &config, &mut stdout.lock())?;
    Ok(())
}
