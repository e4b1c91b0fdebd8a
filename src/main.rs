use anyhow::Result;
use chrono::TimeDelta;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

use traffic_grid::config::{
    SignalMode, SimulationConfig, DEFAULT_DATA_FILE, DEFAULT_TICK_INTERVAL_MS,
};
use traffic_grid::network::{
    sample_network, RoadNetwork, SharedNetwork, DEFAULT_GREEN_DWELL_SECS,
    DEFAULT_SIGNAL_CYCLE_SECS, DEFAULT_SIGNAL_WINDOW_MS,
};
use traffic_grid::service::{SimulationDriver, SnapshotBroadcaster, SnapshotStore, TrafficService};

#[derive(Parser)]
#[command(name = "traffic_grid")]
#[command(about = "Live road network with congestion-aware routing and signal control")]
struct Cli {
    /// Number of simulation steps to run (runs forever if omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Milliseconds between simulation steps
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    interval_ms: u64,

    /// Signal scheduling strategy
    #[arg(long, value_enum, default_value_t = SignalMode::Density)]
    signal_mode: SignalMode,

    /// Signal cycle length for density-driven signals
    #[arg(long, default_value_t = DEFAULT_SIGNAL_CYCLE_SECS)]
    cycle_secs: i64,

    /// Evaluation window at the start of each cycle
    #[arg(long, default_value_t = DEFAULT_SIGNAL_WINDOW_MS)]
    window_ms: i64,

    /// Minimum green time for round-robin signals
    #[arg(long, default_value_t = DEFAULT_GREEN_DWELL_SECS)]
    dwell_secs: i64,

    /// Snapshot file loaded at startup and rewritten after every change
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Do not read or write the snapshot file
    #[arg(long)]
    no_persist: bool,

    /// Seed for reproducible traffic jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Print the route from this intersection after every step (needs --route-to)
    #[arg(long, requires = "route_to")]
    route_from: Option<String>,

    /// Destination for --route-from
    #[arg(long, requires = "route_from")]
    route_to: Option<String>,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            tick_interval: Duration::from_millis(self.interval_ms),
            signal_mode: self.signal_mode,
            signal_cycle: TimeDelta::seconds(self.cycle_secs),
            signal_window: TimeDelta::milliseconds(self.window_ms),
            green_dwell: TimeDelta::seconds(self.dwell_secs),
            seed: self.seed,
            data_file: (!self.no_persist).then(|| self.data_file.clone()),
            ..SimulationConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config();

    let route = cli.route_from.zip(cli.route_to);
    run_headless(&config, cli.ticks, route)
}

/// Load the saved network, or fall back to the sample network
fn load_network(store: Option<&SnapshotStore>) -> RoadNetwork {
    let loaded = match store.map(SnapshotStore::load_network) {
        Some(Ok(network)) => network,
        Some(Err(err)) => {
            warn!("Could not load saved network, starting fresh: {:#}", err);
            None
        }
        None => None,
    };

    match loaded {
        Some(network) if !network.is_empty() => network,
        _ => {
            info!("No existing data found, seeding sample network");
            sample_network()
        }
    }
}

/// Run the simulation without any network surface
fn run_headless(
    config: &SimulationConfig,
    ticks: Option<u64>,
    route: Option<(String, String)>,
) -> Result<()> {
    let store = config.data_file.clone().map(SnapshotStore::new);
    let network = SharedNetwork::new(load_network(store.as_ref()));
    let broadcaster = SnapshotBroadcaster::new();

    if let Some(store) = &store {
        store.save(&network.snapshot())?;
        info!("Saving snapshots to {}", store.path().display());
    }

    let service = TrafficService::new(network.clone(), broadcaster.clone(), store);
    let updates = service.subscribe();

    {
        let network = network.read();
        info!("Total intersections: {}", network.intersection_count());
        info!("Total roads: {}", network.road_count());
    }

    let mut driver = SimulationDriver::new(network, config, broadcaster);
    driver.run(ticks, |driver, _summary| {
        // Drain the broadcast so the subscriber queue does not grow unbounded
        if let Some(snapshot) = updates.try_iter().last() {
            let green: Vec<&str> = snapshot
                .intersections
                .iter()
                .filter(|intersection| intersection.signal_status.is_green())
                .map(|intersection| intersection.id().as_str())
                .collect();
            info!("Step {}: green at [{}]", driver.steps(), green.join(", "));
        }

        if let Some((from, to)) = &route {
            log_route(&service, from, to);
        }
    });

    info!("=== SIMULATION COMPLETE ===");
    Ok(())
}

fn log_route(service: &TrafficService, from: &str, to: &str) {
    match service.route(from, to) {
        Ok(summary) => {
            let segments: Vec<String> = summary
                .segments
                .iter()
                .map(|segment| format!("{}-{} {}", segment.from, segment.to, segment.traffic_status))
                .collect();
            info!(
                "Route {} -> {}: {} (distance {})",
                from,
                to,
                segments.join(", "),
                summary.total_distance
            );
        }
        Err(err) => warn!("Route {} -> {}: {}", from, to, err),
    }
}
