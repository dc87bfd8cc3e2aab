//! Keygate CLI - keypad access-control device emulator
//!
//! # Example
//!
//! ```bash
//! # Simulate two entries on the virtual clock
//! keygate simulate --keys 1234123456 --keys 1234000000
//!
//! # Replay a script in real time
//! keygate simulate --script demo.keys --realtime
//!
//! # Machine-readable journal
//! keygate simulate --keys 1234123456 --json
//!
//! # Type entries on stdin
//! keygate interactive
//! ```

mod panel;
mod script;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keygate_access::{CredentialStore, UserTableConfig};
use keygate_emulator::{AttemptRecord, DeviceConfig, DeviceRuntime, RuntimeHandle, Simulation};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::panel::ConsolePanel;
use crate::script::{Step, parse_script, parse_step};

/// How long a key is held when tapped.
const HOLD: Duration = Duration::from_millis(150);

/// Pause after each tap, long enough for the release to be confirmed.
const GAP: Duration = Duration::from_millis(250);

/// Keygate - matrix keypad access-control emulator
#[derive(Parser)]
#[command(name = "keygate")]
#[command(about = "Emulates a 4x4 keypad access-control device")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Device configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User table file (JSON)
    #[arg(long, global = true)]
    users: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run key entries or a script through the device
    Simulate {
        /// Entry to type, e.g. 1234123456 (repeatable)
        #[arg(short, long)]
        keys: Vec<String>,

        /// Key script file
        #[arg(short, long, conflicts_with = "keys")]
        script: Option<PathBuf>,

        /// Run on the wall clock instead of the virtual clock
        #[arg(long)]
        realtime: bool,

        /// Print the attempt journal as JSON
        #[arg(long)]
        json: bool,
    },

    /// Type entries on stdin in real time (one entry or step per line)
    Interactive,

    /// Write the default configuration and user table
    Defaults {
        /// Where to write the device configuration
        #[arg(long, default_value = "keygate.json")]
        config_out: PathBuf,

        /// Where to write the user table
        #[arg(long, default_value = "users.json")]
        users_out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keygate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            keys,
            script,
            realtime,
            json,
        } => {
            let (config, store) = load_device(cli.config.as_deref(), cli.users.as_deref())?;
            let steps = match script {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    parse_script(&text)?
                }
                None => entries_to_steps(&keys, &config)?,
            };

            let journal = if realtime {
                run_realtime(config, store, steps).await?
            } else {
                run_virtual(config, store, &steps)?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&journal)?);
            } else {
                print_journal(&journal);
            }
        }

        Commands::Interactive => {
            let (config, store) = load_device(cli.config.as_deref(), cli.users.as_deref())?;
            let journal = run_interactive(config, store).await?;
            print_journal(&journal);
        }

        Commands::Defaults {
            config_out,
            users_out,
        } => {
            DeviceConfig::default().save(&config_out)?;
            UserTableConfig::default().save(&users_out)?;
            println!("Wrote {} and {}", config_out.display(), users_out.display());
        }
    }

    Ok(())
}

fn load_device(config: Option<&Path>, users: Option<&Path>) -> Result<(DeviceConfig, CredentialStore)> {
    let config = match config {
        Some(path) => DeviceConfig::load(path)?,
        None => DeviceConfig::default(),
    };
    let table = match users {
        Some(path) => UserTableConfig::load(path)?,
        None => UserTableConfig::default(),
    };
    let store = table.into_store(config.lockout_threshold)?;
    info!(users = store.len(), threshold = store.lockout_threshold(), "device loaded");
    Ok((config, store))
}

/// Each entry followed by enough time for its outcome display to end.
fn entries_to_steps(entries: &[String], config: &DeviceConfig) -> Result<Vec<Step>> {
    let settle = config.grant_duration().max(config.deny_duration()) + GAP;
    let mut steps = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        steps.push(parse_step(&format!("enter {entry}"))?);
        steps.push(Step::Wait(settle));
    }
    Ok(steps)
}

fn run_virtual(config: DeviceConfig, store: CredentialStore, steps: &[Step]) -> Result<Vec<AttemptRecord>> {
    let mut sim = Simulation::new(config, store)?.with_timing(HOLD, GAP);
    for step in steps {
        match step {
            Step::Enter(symbols) => {
                for symbol in symbols {
                    sim.tap(*symbol)?;
                }
            }
            Step::Wait(duration) => sim.advance(*duration)?,
            Step::Press(symbols) => sim.press_keys(symbols)?,
            Step::Release => sim.release(),
        }
    }
    Ok(sim.controller().state().journal().iter().copied().collect())
}

async fn run_step(handle: &RuntimeHandle, step: &Step) -> Result<()> {
    match step {
        Step::Enter(symbols) => {
            for symbol in symbols {
                handle.tap(*symbol, HOLD, GAP).await?;
            }
        }
        Step::Wait(duration) => time::sleep(*duration).await,
        Step::Press(symbols) => handle.press_keys(symbols)?,
        Step::Release => handle.release()?,
    }
    Ok(())
}

async fn run_realtime(
    config: DeviceConfig,
    store: CredentialStore,
    steps: Vec<Step>,
) -> Result<Vec<AttemptRecord>> {
    let runtime = DeviceRuntime::new(config, store, ConsolePanel::new().quiet_blink(true));
    let handle = runtime.handle();
    let device = tokio::spawn(runtime.run());

    for step in &steps {
        run_step(&handle, step).await?;
    }
    handle.shutdown()?;

    let controller = device.await??;
    Ok(controller.state().journal().iter().copied().collect())
}

async fn run_interactive(config: DeviceConfig, store: CredentialStore) -> Result<Vec<AttemptRecord>> {
    let runtime = DeviceRuntime::new(config, store, ConsolePanel::new().quiet_blink(true));
    let handle = runtime.handle();
    let device = tokio::spawn(runtime.run());

    println!("Type an entry (e.g. 1234123456) or a step, 'quit' to stop.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "q" {
            break;
        }
        match parse_step(line) {
            Ok(step) => run_step(&handle, &step).await?,
            Err(error) => eprintln!("{error:#}"),
        }
    }
    handle.shutdown()?;

    let controller = device.await??;
    Ok(controller.state().journal().iter().copied().collect())
}

fn print_journal(journal: &[AttemptRecord]) {
    println!("\n=== Attempts ===");
    if journal.is_empty() {
        println!("(none)");
    }
    for record in journal {
        let user = record
            .user_index
            .map_or_else(|| "-".to_string(), |index| index.to_string());
        println!(
            "{:>9.3}s  user {:>2}  {}",
            record.at.as_secs_f64(),
            user,
            record.outcome
        );
    }
}
