//! serverinfo client — watch the network speed of many servers at once.

mod commands;
mod poller;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::UnitArg;

#[derive(Parser)]
#[command(name = "serverinfo-client")]
#[command(about = "serverinfo — live network speed of many servers, nload-style")]
#[command(version = serverinfo_core::VERSION)]
struct Cli {
    /// Server registry file (default: ~/.config/serverinfo/servers.txt)
    #[arg(long, global = true, env = "SERVERINFO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live table of every server's incoming/outgoing speed (default)
    Monitor {
        /// Refresh interval in seconds
        #[arg(short, long, default_value_t = commands::monitor::DEFAULT_INTERVAL_SECS)]
        interval: f64,

        /// Unit to request from the servers; values are always shown human-scaled
        #[arg(short, long, value_enum, default_value_t = UnitArg::B)]
        unit: UnitArg,

        /// Server addresses for this run only (saved servers are used when omitted)
        servers: Vec<String>,
    },

    /// List saved servers
    List,

    /// Save a server
    Add {
        /// Server address (e.g. http://192.168.1.10:8765)
        url: String,
    },

    /// Remove a saved server
    Remove {
        /// Server address, or its number from `list`
        url_or_index: String,
    },
}

fn main() {
    // The dashboard owns the terminal, so stay quiet unless asked.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let command = cli.command.unwrap_or(Commands::Monitor {
        interval: commands::monitor::DEFAULT_INTERVAL_SECS,
        unit: UnitArg::B,
        servers: Vec::new(),
    });

    let result = match command {
        Commands::Monitor {
            interval,
            unit,
            servers,
        } => commands::monitor::run(config, interval, unit.into(), &servers),
        Commands::List => commands::list::run(config),
        Commands::Add { url } => commands::add::run(config, &url),
        Commands::Remove { url_or_index } => commands::remove::run(config, &url_or_index),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["serverinfo-client"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn monitor_flags_and_servers() {
        let cli =
            Cli::try_parse_from(["serverinfo-client", "monitor", "-i", "2.5", "-u", "kb", "a", "b"])
                .unwrap();
        match cli.command {
            Some(Commands::Monitor {
                interval,
                unit,
                servers,
            }) => {
                assert_eq!(interval, 2.5);
                assert_eq!(unit, UnitArg::Kb);
                assert_eq!(servers, vec!["a", "b"]);
            }
            _ => panic!("expected monitor"),
        }
    }

    #[test]
    fn unknown_unit_is_rejected() {
        assert!(Cli::try_parse_from(["serverinfo-client", "monitor", "-u", "gb"]).is_err());
    }

    #[test]
    fn remove_takes_index_or_url() {
        let cli = Cli::try_parse_from(["serverinfo-client", "remove", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Remove { ref url_or_index }) if url_or_index == "2"
        ));
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["serverinfo-client", "list", "--config", "/tmp/s.txt"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.txt")));
    }
}
