use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tether_host::{Bridge, ConsoleLevel, ConsoleSink};
use tracing_subscriber::filter::EnvFilter;

mod config;
mod session;

use config::load_config;
use session::Session;

#[derive(Parser)]
#[command(name = "tether", version, about = "Tether guest/host bridge")]
struct Cli {
    /// Path to tether.toml (searched upwards from the current directory by default)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session script (`-` reads from stdin)
    Run {
        script: PathBuf,
        /// Ticks to spend on pending clipboard operations after the script
        #[arg(long)]
        max_ticks: Option<u32>,
        /// Storage profile for `stash` and `restore`
        #[arg(long)]
        profile: Option<String>,
        /// Print each command before running it
        #[arg(long)]
        echo: bool,
    },
    /// List the keys in the configured storage backend
    Keys,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            script,
            max_ticks,
            profile,
            echo,
        } => {
            let mut bridge_config = config.bridge;
            if let Some(profile) = profile {
                bridge_config.location = bridge_config.location.with_profile(profile);
            }
            let bridge = Bridge::from_config(&bridge_config)?.with_console(stdio_console());

            let source = read_script(&script)?;
            let mut session = Session::new(bridge, std::io::stdout().lock())
                .with_max_ticks(max_ticks.unwrap_or(config.session.max_ticks))
                .with_echo(echo || config.session.echo);
            session
                .run_script(&source)
                .with_context(|| format!("When running {}", script.display()))?;
        }
        Commands::Keys => {
            let bridge = Bridge::from_config(&config.bridge)?;
            for key in bridge.storage().keys()? {
                println!("{}", key);
            }
        }
    }

    Ok(())
}

fn stdio_console() -> ConsoleSink {
    ConsoleSink::new(|level, message| match level {
        ConsoleLevel::Warn | ConsoleLevel::Error => eprintln!("{}", message),
        _ => println!("{}", message),
    })
}

fn read_script(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
