// src/cli.rs
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pizza_wizard", version, about = "Order your pizza from the terminal")]
pub struct Cli {
    /// Tick rate, i.e. number of ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate, i.e. number of frames per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 30.0)]
    pub frame_rate: f64,

    /// Order endpoint (overrides `order_endpoint` from the config file)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Artificial latency before each validation resolves
    #[arg(long, value_name = "MS")]
    pub validation_delay_ms: Option<u64>,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
    /// Run the interactive order form (default)
    Run,
    /// Print the effective configuration as JSON
    PrintConfig,
}

impl Cli {
    pub fn command_or_default(&self) -> Cmd {
        self.cmd.unwrap_or(Cmd::Run)
    }
}
