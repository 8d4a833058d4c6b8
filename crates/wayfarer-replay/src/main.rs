use std::{cell::RefCell, fs, path::PathBuf, rc::Rc, time::Duration};

use clap::Parser;
use log::info;
use wayfarer::{Collaborators, Coordinate, Event, EventSender, MapSession, events};

mod scenario;
mod simulated;

use scenario::{Action, Scenario, Step};
use simulated::{
    Console, SharedSummary, SimulatedGeocoder, SimulatedLocation, SimulatedMap, SimulatedRouter,
    Summary,
};

/// Extra time after the last step for in-flight lookups to land.
const SETTLE_MARGIN: Duration = Duration::from_millis(250);

#[derive(Parser)]
struct Cli {
    /// Scenario file in JSON format
    scenario: PathBuf,

    /// Override the geocode throttle distance.
    #[arg(long, value_name = "METERS")]
    min_displacement: Option<f64>,

    /// Write the JSON summary to <FILE> instead of stdout.
    #[arg(short, long)]
    summary: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    let cli = Cli::parse();
    let mut scenario = Scenario::load(&cli.scenario)?;
    if let Some(min_displacement) = cli.min_displacement {
        scenario.config.min_displacement_meters = min_displacement;
        scenario.config.validate()?;
    }
    info!(
        "Replaying {} steps from '{}'",
        scenario.steps.len(),
        cli.scenario.display()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(replay(scenario));

    let json = serde_json::to_string_pretty(&summary)?;
    match cli.summary {
        Some(path) => {
            fs::write(&path, json)?;
            info!("Wrote summary to '{}'", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

async fn replay(scenario: Scenario) -> Summary {
    let summary: SharedSummary = Rc::default();
    let center = Rc::new(RefCell::new(scenario.map_center));
    let (sender, mut handler) = events::channel();

    let services = Collaborators {
        location: Box::new(SimulatedLocation::new(
            scenario.services_enabled,
            scenario.initial_authorization,
            scenario.last_known_location,
            summary.clone(),
        )),
        map: Box::new(SimulatedMap::new(
            center.clone(),
            sender.clone(),
            summary.clone(),
        )),
        geocoder: Box::new(SimulatedGeocoder::new(
            scenario.placemarks.clone(),
            Duration::from_millis(scenario.geocode_latency_ms),
            sender.clone(),
            summary.clone(),
        )),
        router: Box::new(SimulatedRouter::new(
            Duration::from_millis(scenario.route_latency_ms),
            scenario.route_failure.clone(),
            sender.clone(),
            summary.clone(),
        )),
        addresses: Box::new(Console::new(summary.clone())),
        alerts: Box::new(Console::new(summary.clone())),
    };

    let mut session = MapSession::new(scenario.config, services);
    session.start();

    let settle = Duration::from_millis(scenario.max_latency_ms()) + SETTLE_MARGIN;
    tokio::select! {
        _ = handler.run(&mut session) => {}
        _ = drive(&scenario.steps, &center, sender, settle) => {}
    }

    // Whatever landed during the last poll.
    match handler.handle_events(&mut session) {
        Ok(handled) => log::debug!("Handled {handled} trailing events"),
        Err(err) => log::debug!("No trailing events: {err}"),
    }

    drop(session);
    Rc::try_unwrap(summary)
        .map(RefCell::into_inner)
        .unwrap_or_else(|shared| std::mem::take(&mut *shared.borrow_mut()))
}

/// Feed the scenario steps into the event queue, then wait for lookups to settle.
async fn drive(
    steps: &[Step],
    center: &Rc<RefCell<Coordinate>>,
    sender: EventSender,
    settle: Duration,
) {
    for step in steps {
        tokio::time::sleep(Duration::from_millis(step.after_ms)).await;

        let event = match step.action {
            Action::Authorization { state } => Event::AuthorizationChanged(state),
            Action::Location {
                latitude,
                longitude,
            } => Event::LocationUpdated(Coordinate::new(latitude, longitude)),
            Action::Center {
                latitude,
                longitude,
            } => {
                let coordinate = Coordinate::new(latitude, longitude);
                *center.borrow_mut() = coordinate;
                Event::CenterChanged(coordinate)
            }
            Action::Go => Event::GoTriggered,
        };

        if sender.send(event).await.is_err() {
            return;
        }
    }

    tokio::time::sleep(settle).await;
}
