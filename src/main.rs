//! PetFeeder — Main Entry Point
//!
//! Hexagonal architecture, single sequential worker.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  DetectorProcess   SqliteStore    HttpActuator   SystemClock   │
//! │  (vision stdout)   (ConfigStore)  (Actuator)     (Clock)       │
//! │  LogEventSink                                                  │
//! │  (EventSink)                                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              GatingService (pure logic)                │    │
//! │  │  Debounce · Interval · Restriction · Dose · Recorder   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use petfeeder::adapters::detector::DetectorProcess;
use petfeeder::adapters::http_actuator::HttpActuator;
use petfeeder::adapters::log_sink::LogEventSink;
use petfeeder::adapters::sqlite::SqliteStore;
use petfeeder::adapters::time::SystemClock;
use petfeeder::app::commands::AppCommand;
use petfeeder::app::ports::Clock;
use petfeeder::app::service::{CommandReply, GatingService};
use petfeeder::config::{validate_config, FeederConfig};
use petfeeder::model::{RestrictionWindow, UserId};

#[derive(Parser)]
#[command(name = "petfeeder", version, about = "Breed-aware automatic pet feeder controller")]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "FEEDER_CONFIG")]
    config: Option<PathBuf>,
    /// SQLite database shared with the dashboard
    #[arg(long, env = "FEEDER_DB")]
    database: Option<PathBuf>,
    /// Motor controller base URL
    #[arg(long, env = "FEEDER_ACTUATOR_URL")]
    actuator_url: Option<String>,
    /// Dashboard user whose settings apply
    #[arg(long, env = "FEEDER_USER_ID")]
    user_id: Option<UserId>,
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the gating loop over the detector's output (default)
    Run {
        /// Read detections from stdin instead of spawning the detector
        #[arg(long)]
        stdin: bool,
    },
    /// Set a user's minimum feeding interval
    SetInterval { user_id: UserId, minutes: u32 },
    /// Set a user's forbidden window, e.g. `set-restriction 1 22:00 03:00`
    SetRestriction {
        user_id: UserId,
        #[arg(value_parser = parse_time_of_day)]
        start: NaiveTime,
        #[arg(value_parser = parse_time_of_day)]
        end: NaiveTime,
    },
    /// Set the dose dispensed for a breed
    SetDose { breed: String, amount: u32 },
    /// Print the detection log
    History {
        /// Only these breeds (repeatable)
        #[arg(long = "breed")]
        breeds: Vec<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List configured breeds and doses
    Breeds,
    /// Dispense now, outside the detection pipeline
    Feed {
        amount: u32,
        /// Ignore the time restriction
        #[arg(long)]
        force: bool,
    },
}

fn parse_time_of_day(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| format!("expected HH:MM: {e}"))
}

fn load_config(cli: &Cli) -> Result<FeederConfig> {
    let mut config = match &cli.config {
        Some(path) => FeederConfig::from_toml_file(path)?,
        None => FeederConfig::default(),
    };
    if let Some(db) = &cli.database {
        config.database_path = db.clone();
    }
    if let Some(url) = &cli.actuator_url {
        config.actuator_url = url.clone();
    }
    if let Some(user) = cli.user_id {
        config.user_id = user;
    }
    validate_config(&config)?;
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config(&cli).context("load configuration")?;
    info!("PetFeeder v{} (user {})", env!("CARGO_PKG_VERSION"), config.user_id);

    // ── 3. Adapters ───────────────────────────────────────────
    let mut store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("open database {}", config.database_path.display()))?;
    let mut actuator = HttpActuator::new(config.actuator_settings())?;
    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();

    // ── 4. Core ───────────────────────────────────────────────
    let mut service = GatingService::new(&config, clock.now());

    let command = match cli.command {
        None | Some(Cmd::Run { stdin: false }) => {
            service.start(&mut sink);
            let mut detector =
                DetectorProcess::spawn(&config.detector_program, &config.detector_args)?;
            let output = detector.take_output()?;
            let result = service.run(output, &clock, &mut store, &mut actuator, &mut sink);
            if result.is_err() {
                if let Err(e) = detector.kill() {
                    warn!("{e}");
                }
            }
            detector.wait()?;
            result?;
            return Ok(());
        }
        Some(Cmd::Run { stdin: true }) => {
            service.start(&mut sink);
            service.run(io::stdin().lock(), &clock, &mut store, &mut actuator, &mut sink)?;
            return Ok(());
        }
        Some(Cmd::SetInterval { user_id, minutes }) => AppCommand::SetInterval { user_id, minutes },
        Some(Cmd::SetRestriction {
            user_id,
            start,
            end,
        }) => AppCommand::SetRestriction {
            user_id,
            window: RestrictionWindow::new(start, end),
        },
        Some(Cmd::SetDose { breed, amount }) => AppCommand::SetDose { breed, amount },
        Some(Cmd::History { breeds, json }) => {
            let reply = service.handle_command(
                AppCommand::History { breeds },
                clock.now(),
                &mut store,
                &mut actuator,
                &mut sink,
            )?;
            if let CommandReply::History(rows) = reply {
                if json {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                } else {
                    for row in rows {
                        println!("{}  {}", row.time.format("%Y-%m-%d %H:%M:%S"), row.breed);
                    }
                }
            }
            return Ok(());
        }
        Some(Cmd::Breeds) => AppCommand::Breeds,
        Some(Cmd::Feed { amount, force }) => AppCommand::Feed { amount, force },
    };

    // ── 5. Administrative command ─────────────────────────────
    match service.handle_command(command, clock.now(), &mut store, &mut actuator, &mut sink)? {
        CommandReply::Done | CommandReply::History(_) => {}
        CommandReply::Breeds(breeds) => {
            for b in breeds {
                println!("{:<24} {}", b.breed, b.default_amount);
            }
        }
        CommandReply::Feed(decision) => {
            println!("{}", decision.outcome());
            if !decision.allow {
                anyhow::bail!("feed refused: {}", decision.reason);
            }
        }
    }
    Ok(())
}
