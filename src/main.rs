//! Binary entry point: parse the command line, set up logging and the
//! database, then run either a one-shot command or the terminal UI.
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use cli::Cli;
use the_choice::logging::{self, LogTarget};
use the_choice::{db, run_app, App, AppSettings, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.database.as_deref())?;

    match cli.command {
        Some(command) => {
            logging::init(LogTarget::Stderr, cli.verbose)?;
            let conn = db::open(&config.database_path).with_context(|| {
                format!("failed to open {}", config.database_path.display())
            })?;
            cli::run(command, &conn)
        }
        None => {
            logging::init(LogTarget::File(&config.log_path), cli.verbose)?;
            info!(database = %config.database_path.display(), "starting terminal ui");
            let conn = db::open(&config.database_path).with_context(|| {
                format!("failed to open {}", config.database_path.display())
            })?;
            let settings = AppSettings::load_or_create(&conn).context("failed to load settings")?;
            let mut app = App::new(conn, settings)?;
            run_app(&mut app)
        }
    }
}
