use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tourbot")]
#[command(author, version, about = "Telegram bot for guided excursions with in-chat content editing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Apply pending database migrations and exit
    Migrate,

    /// Dump every excursion with its points and extra parts as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave out draft excursions
        #[arg(long)]
        published_only: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::parse_from(["tourbot"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn export_takes_output_path() {
        let cli = Cli::parse_from(["tourbot", "export", "-o", "dump.json", "--published-only"]);
        match cli.command {
            Some(Commands::Export { output, published_only }) => {
                assert_eq!(output, Some(PathBuf::from("dump.json")));
                assert!(published_only);
            }
            _ => panic!("expected export"),
        }
    }
}
