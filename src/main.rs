use anyhow::Result;
use clap::Parser;
use riskmap::cli::{Cli, Commands};
use riskmap::commands;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
        } => commands::analyze::handle_analyze(commands::analyze::AnalyzeConfig {
            path,
            format,
            output,
        }),
        Commands::Init { force } => commands::init::init_config(force),
    }
}
