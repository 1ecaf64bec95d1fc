mod action;
mod app;
mod cli;
mod components;
mod config;
mod errors;
mod logging;
mod tui;

use clap::Parser;
use color_eyre::Result;

use crate::app::App;
use crate::cli::{Cli, Cmd};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    errors::init()?;
    let args = Cli::parse();
    let config = Config::new(&args)?;

    match args.command_or_default() {
        Cmd::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Cmd::Run => {
            logging::init()?;
            let mut app = App::new(&args, config);
            app.run().await?;
        }
    }
    Ok(())
}
