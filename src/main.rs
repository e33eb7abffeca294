/*!
 * OS Scheduling Simulator - Main Entry Point
 *
 * Starts the scheduler loops, redraws the system once per second and reads
 * commands from stdin:
 * - a number creates a process with that many MB
 * - `r` creates a random process, `c` compacts memory, `s` prints JSON
 * - `p` toggles pause, `x` resets, `q` quits
 */

use miette::{IntoDiagnostic, Result};
use os_sim::core::limits::RENDER_INTERVAL;
use os_sim::monitoring::{generate_run_id, run_span};
use os_sim::{init_tracing, parse_memory_request, ProcessManager, SchedulerTask, SimConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn, Instrument};

enum Command {
    Create(String),
    Random,
    Compact,
    Show,
    TogglePause,
    Reset,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "" => None,
            "r" => Some(Command::Random),
            "c" => Some(Command::Compact),
            "s" => Some(Command::Show),
            "p" => Some(Command::TogglePause),
            "x" => Some(Command::Reset),
            "q" => Some(Command::Quit),
            other => Some(Command::Create(other.to_string())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let run_id = generate_run_id();
    run(run_id.clone()).instrument(run_span(&run_id)).await
}

async fn run(run_id: String) -> Result<()> {
    let config = SimConfig::from_env()?;
    info!(run_id = %run_id, "Simulator starting");

    let manager = ProcessManager::builder().with_config(config).build()?;
    let task = SchedulerTask::spawn(manager.clone());

    let snapshot_json = std::env::var("SIM_SNAPSHOT_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let mut render = tokio::time::interval(RENDER_INTERVAL);
    render.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    info!("Type a size in MB to add a process, r/c/s/p/x, or q to quit");

    loop {
        tokio::select! {
            _ = render.tick() => {
                draw(&manager, snapshot_json)?;
            }

            line = lines.next_line(), if stdin_open => {
                match line.into_diagnostic()? {
                    Some(line) => {
                        if !handle(&manager, &task, &line)? {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                break;
            }
        }
    }

    task.shutdown().await;
    info!(stats = ?manager.stats(), "Simulator stopped");
    Ok(())
}

fn draw(manager: &ProcessManager, as_json: bool) -> Result<()> {
    if let Some(advisory) = manager.take_advisory() {
        warn!("{}", advisory);
    }

    let snapshot = manager.snapshot();
    if as_json {
        println!("{}", serde_json::to_string(&snapshot).into_diagnostic()?);
    } else {
        println!("{}", snapshot);
    }
    Ok(())
}

/// Apply one stdin command; returns false to quit
fn handle(manager: &ProcessManager, task: &SchedulerTask, line: &str) -> Result<bool> {
    let Some(command) = Command::parse(line) else {
        return Ok(true);
    };

    match command {
        Command::Create(input) => {
            match parse_memory_request(&input).and_then(|mb| manager.create_process(mb)) {
                Ok(pid) => info!(pid, "Process added"),
                Err(e) => warn!(error = %e, "Process not added"),
            }
        }
        Command::Random => match manager.spawn_random_process() {
            Some(pid) => info!(pid, "Random process added"),
            None => warn!("Process cap reached"),
        },
        Command::Compact => {
            let moved = manager.compact();
            info!(moved, "Memory compacted");
        }
        Command::Show => {
            println!(
                "{}",
                serde_json::to_string_pretty(&manager.snapshot()).into_diagnostic()?
            );
        }
        Command::TogglePause => {
            if task.is_paused() {
                task.resume();
            } else {
                task.pause();
            }
        }
        Command::Reset => manager.reset(),
        Command::Quit => return Ok(false),
    }

    if let Err(e) = manager.verify_invariants() {
        error!(error = %e, "State check failed");
    }
    Ok(true)
}
