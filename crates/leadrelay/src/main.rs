// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! leadrelay - WhatsApp lead outreach relay.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod leads;
mod serve;
mod status;
mod verify;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// leadrelay - WhatsApp lead outreach relay.
#[derive(Parser, Debug)]
#[command(name = "leadrelay", version, about, long_about = None)]
struct Cli {
    /// Explicit config file; skips the standard search paths.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook gateway and the recurring campaign.
    Serve,
    /// Print the uncontacted leads the next cycle would use.
    Leads {
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Summarize the status ledger and live campaign counters.
    Status {
        /// Output JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Check WhatsApp, OpenAI, and Trello credentials.
    Verify,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => leadrelay_config::load_and_validate_path(path),
        None => leadrelay_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadrelay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Leads { json }) => leads::run_leads(&config, json).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Verify) => verify::run_verify(&config).await,
        None => {
            println!("leadrelay: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn default_config_is_valid() {
        let config = leadrelay_config::load_and_validate_str("").expect("defaults should validate");
        assert_eq!(config.agent.name, "leadrelay");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["leadrelay", "--config", "/tmp/x.toml", "status", "--json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
        assert!(matches!(cli.command, Some(Commands::Status { json: true, plain: false })));

        let cli = Cli::try_parse_from(["leadrelay", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["leadrelay", "shell"]).is_err());
    }
}
