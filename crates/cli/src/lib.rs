pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "quotedraft",
    about = "Quotedraft operator CLI",
    long_about = "Price quotation requests, draft client emails, and inspect configuration.",
    after_help = "Examples:\n  quotedraft --config ops.toml config\n  \
                  quotedraft quote --file request.json --offline"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to load; it must exist when given")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Price a quote request file and print the result with its email draft")]
    Quote {
        #[arg(long, short, help = "Path to a quote request JSON document")]
        file: PathBuf,
        #[arg(long, help = "Always draft from the local templates, even with a credential")]
        offline: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(cli.config.as_deref()),
        Command::Quote { file, offline } => {
            commands::quote::run(&file, offline, cli.config.as_deref())
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
