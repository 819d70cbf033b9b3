//! Failover balancer console.
//!
//! # Architecture Overview
//!
//! ```text
//!   stdin ──▶ console ──time──▶ Dispatcher ──▶ Registry (round-robin, cool-down)
//!               │                   │
//!               │                   └──▶ envelope ──▶ instance inbox ──▶ TimeService
//!               │                                                        │
//!               │◀────────────── reply / failure / Timeout ◀──────────────┘
//!               │
//!               ├──spawn──▶ ServiceManager ──inbox──▶ Dispatcher::register_instance
//!               └──kill───▶ ServiceManager (instance goes silent, stays registered)
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use failover_balancer::config::loader::load_config;
use failover_balancer::config::watcher::ConfigWatcher;
use failover_balancer::config::{BalancerConfig, ConsoleConfig};
use failover_balancer::dispatch::Dispatcher;
use failover_balancer::lifecycle::Shutdown;
use failover_balancer::observability::{logging, metrics};
use failover_balancer::service::ServiceManager;

#[derive(Parser)]
#[command(name = "failover-balancer")]
#[command(about = "Interactive console for the failover load balancer", long_about = None)]
struct Cli {
    /// TOML config file. Dispatch timings are reloaded when it changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Instances to spawn before the prompt (overrides console.initial_instances).
    #[arg(short, long)]
    spawn: Option<usize>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Spawn,
    Kill,
    Time,
    Status,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    fn parse(line: &str) -> Option<Self> {
        let command = match line.trim() {
            "" => return None,
            "spawn" => Command::Spawn,
            "kill" => Command::Kill,
            "time" => Command::Time,
            "status" => Command::Status,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

struct Console {
    dispatcher: Dispatcher<(), SystemTime>,
    manager: ServiceManager,
    config: ConsoleConfig,
}

impl Console {
    async fn execute(&mut self, command: Command) {
        match command {
            Command::Spawn => self.spawn(),
            Command::Kill => {
                if self.manager.kill() {
                    println!("Killed an instance ({} live)", self.manager.live_count());
                } else {
                    println!("No live instances to kill");
                }
            }
            Command::Time => self.time().await,
            Command::Status => self.status(),
            Command::Quit => {}
            Command::Unknown(cmd) => {
                println!("Unknown command: {cmd} Available commands: time, spawn, kill, status, quit");
            }
        }
    }

    fn spawn(&mut self) {
        let inbox = self.manager.spawn();
        let id = self.dispatcher.register_instance(inbox);
        println!("Spawned instance {id}");
    }

    async fn time(&self) {
        let reply = tokio::time::timeout(self.config.request_timeout(), self.dispatcher.request(())).await;
        match reply {
            Ok(Ok(Ok(timestamp))) => println!("{}", format_timestamp(timestamp)),
            Ok(Ok(Err(e))) => println!("{e}"),
            Ok(Err(_)) => println!("Request can not be processed"),
            Err(_) => println!("Timeout"),
        }
    }

    fn status(&self) {
        let registry = self.dispatcher.registry();
        let snapshot = registry.snapshot();
        println!(
            "{} registered, {} disabled, {} live services",
            snapshot.len(),
            registry.disabled_count(),
            self.manager.live_count()
        );
        for status in snapshot {
            match status.disabled_for {
                Some(remaining) => println!("  {}  disabled for {:.1}s", status.id, remaining.as_secs_f64()),
                None => println!("  {}  eligible", status.id),
            }
        }
    }
}

fn format_timestamp(timestamp: SystemTime) -> String {
    match timestamp.duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => format!(
            "{}.{:03} (unix time)",
            since_epoch.as_secs(),
            since_epoch.subsec_millis()
        ),
        Err(_) => format!("{timestamp:?}"),
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("failover-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        response_timeout_ms = config.dispatch.response_timeout_ms,
        disable_interval_ms = config.dispatch.disable_interval_ms,
        inbox_capacity = config.service.inbox_capacity,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    // The watcher handle must outlive the loop or notifications stop.
    let (_watcher, mut config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.dispatch);
            (Some(watcher.run()?), updates)
        }
        None => (None, tokio::sync::mpsc::unbounded_channel().1),
    };

    let shutdown = Shutdown::new();
    let mut console = Console {
        dispatcher: Dispatcher::new(config.dispatch),
        manager: ServiceManager::new(config.service.clone(), shutdown.clone()),
        config: config.console.clone(),
    };

    for _ in 0..cli.spawn.unwrap_or(config.console.initial_instances) {
        console.spawn();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => console.execute(command).await,
                    None => {}
                }
                prompt();
            }
            Some(timings) = config_updates.recv() => {
                console.dispatcher.update_timings(timings);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    shutdown.trigger();
    tracing::info!("Shutdown complete");
    Ok(())
}
