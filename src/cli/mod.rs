pub mod commands;
pub mod utils;

use clap::{CommandFactory, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::config;
use crate::prompt::{Console, LineConsole, Prompter};

#[derive(Parser)]
#[command(name = "pim")]
#[command(about = "Azure PIM helper - activate and deactivate eligible role assignments")]
#[command(version)]
#[command(after_help = "Run 'pim' with no arguments for a guided menu.")]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Activate eligible role(s)", visible_alias = "a")]
    Activate(commands::activate::ActivateArgs),

    #[command(about = "View your active assignments", visible_alias = "st")]
    Status,

    #[command(about = "Deactivate an assignment", visible_aliases = ["deact", "off"])]
    Deactivate,

    #[command(about = "Show the CLI version", visible_alias = "v")]
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub fn print_help() -> anyhow::Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}

pub fn print_version() {
    println!("pim {}", env!("CARGO_PKG_VERSION"));
}

/// Prompts and progress go to stderr in JSON mode so stdout holds only
/// the JSON document.
pub fn console_for(output_format: OutputFormat) -> Box<dyn Console + Send> {
    match output_format {
        OutputFormat::Json => Box::new(LineConsole::stderr()),
        OutputFormat::Text => Box::new(LineConsole::stdio()),
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let mut console = console_for(output_format);
    let mut prompter = Prompter::new(console.as_mut(), config().prompt);

    match cli.command {
        Some(Commands::Activate(args)) => {
            let options = args.into_options()?;
            commands::activate::handle(options, &mut prompter, output_format).await
        }
        Some(Commands::Status) => commands::status::handle(output_format).await,
        Some(Commands::Deactivate) => commands::deactivate::handle(&mut prompter, output_format).await,
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        None => commands::menu::handle(&mut prompter, output_format).await,
    }
}
