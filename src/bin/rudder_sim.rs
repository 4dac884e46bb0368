use colored::*;
use rudder_sim::config::{build_cli, SimConfig};
use rudder_sim::console::spawn_console_reader;
use rudder_sim::emitter::Emitter;
use rudder_sim::protocol::CanFilter;
use rudder_sim::scheduler::{input_channel, Scheduler};
use rudder_sim::transport::{spawn_bus_reader, CanSocket};
use rudder_sim::{ConfigError, SimError, Simulator};
use tokio::io::BufReader;
use tokio::time::Instant;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let matches = build_cli().get_matches();

    let config = match SimConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => fail(&SimError::from(e)),
    };

    // stdout carries the yaw-rate stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.log_level)
        .init();

    if let Err(e) = run(config).await {
        fail(&e);
    }
}

async fn run(config: SimConfig) -> Result<(), SimError> {
    let vessel = config.vessel()?;
    // Same shape as a --vessel file, so it can be copied into one.
    let hull = serde_json::to_string(&vessel.hull).map_err(ConfigError::from)?;
    info!(
        "vessel speed {} kn ({:.3} m/s), hull {}",
        config.speed_knots, vessel.forward_speed, hull
    );

    let socket = CanSocket::open(&config.interface, CanFilter::command_status())?;

    let (tx, rx) = input_channel();
    spawn_bus_reader(socket, tx.clone());
    spawn_console_reader(BufReader::new(tokio::io::stdin()), tx);

    let simulator = Simulator::new(vessel, Instant::now());
    let mut scheduler =
        Scheduler::new(simulator, rx, Emitter::new(std::io::stdout())).with_period(config.period);
    scheduler.run().await
}

fn fail(e: &SimError) -> ! {
    eprintln!("{} {}", "rudder-sim:".red().bold(), e);
    std::process::exit(1);
}
